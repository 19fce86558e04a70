//! Unit file placement and per-unit service lifecycle

use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::catalog::ComponentSpec;
use crate::download::AssetFetcher;
use crate::error::{Result, service as service_error};
use crate::system::ServiceManager;

/// Where a component's unit comes from and where it is installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceHandle {
    pub component: &'static str,
    pub unit: String,
    /// Primary source first
    pub sources: Vec<String>,
    pub installed_path: PathBuf,
}

impl ServiceHandle {
    pub fn new(component: &ComponentSpec, unit: &str, sources: Vec<String>, unit_dir: &Path) -> Self {
        Self {
            component: component.name,
            unit: unit.to_string(),
            sources,
            installed_path: unit_dir.join(unit),
        }
    }
}

/// State of a unit after setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReport {
    pub component: &'static str,
    pub unit: String,
    pub active_state: String,
    pub enabled: bool,
}

/// What teardown did for one unit; `false` means the step was not needed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitTeardown {
    pub unit: String,
    pub stopped: bool,
    pub disabled: bool,
    pub removed: bool,
}

/// Fetch, place, reload, enable and start one unit
pub fn setup_service(
    handle: &ServiceHandle,
    fetcher: &dyn AssetFetcher,
    services: &dyn ServiceManager,
    scratch: &Path,
) -> Result<ServiceReport> {
    let unit = handle.unit.as_str();
    let fetched = fetcher
        .fetch(unit, &handle.sources, None, scratch)
        .map_err(|e| service_error::setup_failed(unit, "fetch", e))?;

    place_unit_file(&fetched, &handle.installed_path)
        .map_err(|e| service_error::setup_failed(unit, "place", e))?;
    tracing::debug!(unit, path = %handle.installed_path.display(), "placed unit file");

    services
        .reload()
        .map_err(|e| service_error::setup_failed(unit, "reload", e))?;
    services
        .enable(unit)
        .map_err(|e| service_error::setup_failed(unit, "enable", e))?;
    services
        .start(unit)
        .map_err(|e| service_error::setup_failed(unit, "start", e))?;

    let active_state = services
        .active_state(unit)
        .map_err(|e| service_error::setup_failed(unit, "status", e))?;
    let enabled = services
        .is_enabled(unit)
        .map_err(|e| service_error::setup_failed(unit, "status", e))?;

    Ok(ServiceReport {
        component: handle.component,
        unit: handle.unit.clone(),
        active_state,
        enabled,
    })
}

/// Stop, disable and delete one unit, skipping steps whose precondition is already false
pub fn teardown_service(
    unit: &str,
    services: &dyn ServiceManager,
) -> Result<UnitTeardown> {
    let mut result = UnitTeardown {
        unit: unit.to_string(),
        ..UnitTeardown::default()
    };

    let active = services
        .is_active(unit)
        .map_err(|e| service_error::teardown_failed(unit, "status", e))?;
    if active {
        services
            .stop(unit)
            .map_err(|e| service_error::teardown_failed(unit, "stop", e))?;
        result.stopped = true;
    }

    let enabled = services
        .is_enabled(unit)
        .map_err(|e| service_error::teardown_failed(unit, "status", e))?;
    if enabled {
        services
            .disable(unit)
            .map_err(|e| service_error::teardown_failed(unit, "disable", e))?;
        result.disabled = true;
    }

    let path = services.unit_dir().join(unit);
    match std::fs::remove_file(&path) {
        Ok(()) => result.removed = true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(service_error::teardown_failed(unit, "remove", e)),
    }

    Ok(result)
}

/// Copy `source` to `dest` through a temporary file in the destination directory
fn place_unit_file(source: &Path, dest: &Path) -> io::Result<()> {
    let dir = dest
        .parent()
        .ok_or_else(|| io::Error::other(format!("{} has no parent", dest.display())))?;
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    let mut reader = std::fs::File::open(source)?;
    io::copy(&mut reader, &mut tmp)?;
    tmp.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }

    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}
