//! Installer configuration
//!
//! Settings come from an optional YAML file (`--config`, `SEVPN_INSTALLER_CONFIG`,
//! or `/etc/sevpn-installer/config.yaml`) layered over built-in defaults, with
//! a couple of environment overrides applied last.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, config as config_error};

/// System-wide configuration file, read when present
pub const DEFAULT_CONFIG_PATH: &str = "/etc/sevpn-installer/config.yaml";

/// Configuration file path, used when `--config` is not given
pub const CONFIG_PATH_ENV: &str = "SEVPN_INSTALLER_CONFIG";

/// Overrides `release_url`
pub const RELEASE_URL_ENV: &str = "SEVPN_RELEASE_URL";

/// Overrides `scratch_base`
pub const SCRATCH_DIR_ENV: &str = "SEVPN_SCRATCH_DIR";

const DEFAULT_RELEASE_URL: &str =
    "https://api.github.com/repos/sevpn-deb/softether-deb/releases/latest";
const DEFAULT_MIRROR_PREFIX: &str = "https://ghproxy.net/";
const DEFAULT_UNIT_SOURCE: &str =
    "https://raw.githubusercontent.com/sevpn-deb/softether-deb/main/systemd/";
const DEFAULT_UNIT_FALLBACK: &str = "https://cdn.jsdelivr.net/gh/sevpn-deb/softether-deb@main/systemd/";

/// Installer configuration (config.yaml)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerConfig {
    /// Latest-release metadata endpoint
    pub release_url: String,

    /// Asset filename prefix, assets are matched as `<prefix>-<asset key>_`
    pub package_prefix: String,

    /// Prefixes prepended to every direct asset URL to form fallback mirrors
    pub mirror_prefixes: Vec<String>,

    /// Base URLs for systemd unit files, primary first
    pub unit_sources: Vec<String>,

    pub connect_timeout_secs: u64,

    pub total_timeout_secs: u64,

    /// Directory systemd loads unit files from
    pub unit_dir: PathBuf,

    /// Parent of the per-run scratch directory (system temp dir when unset)
    pub scratch_base: Option<PathBuf>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            release_url: DEFAULT_RELEASE_URL.to_string(),
            package_prefix: "softether".to_string(),
            mirror_prefixes: vec![DEFAULT_MIRROR_PREFIX.to_string()],
            unit_sources: vec![
                DEFAULT_UNIT_SOURCE.to_string(),
                DEFAULT_UNIT_FALLBACK.to_string(),
            ],
            connect_timeout_secs: 20,
            total_timeout_secs: 600,
            unit_dir: PathBuf::from("/etc/systemd/system"),
            scratch_base: None,
        }
    }
}

impl InstallerConfig {
    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_yaml_at(yaml, "<inline>")
    }

    fn from_yaml_at(yaml: &str, origin: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| config_error::parse_failed(origin, e.to_string()))
    }

    /// Load configuration from `explicit`, or the system default path when it exists.
    ///
    /// An explicitly requested file must exist; the default one is optional.
    /// Environment overrides are applied and the result is validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                default.exists().then_some(default)
            }
        };

        let mut config = match path {
            Some(path) => {
                let origin = path.display().to_string();
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| config_error::read_failed(&origin, e.to_string()))?;
                tracing::debug!(path = %origin, "loaded configuration file");
                Self::from_yaml_at(&content, &origin)?
            }
            None => Self::default(),
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(RELEASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.release_url = url;
            }
        }
        if let Ok(dir) = std::env::var(SCRATCH_DIR_ENV) {
            if !dir.trim().is_empty() {
                self.scratch_base = Some(PathBuf::from(dir));
            }
        }
    }

    /// Check the settings the installer cannot run without
    pub fn validate(&self) -> Result<()> {
        if self.release_url.trim().is_empty() {
            return Err(config_error::invalid("release_url must not be empty"));
        }
        if self.package_prefix.trim().is_empty() {
            return Err(config_error::invalid("package_prefix must not be empty"));
        }
        if self.unit_sources.iter().all(|s| s.trim().is_empty()) {
            return Err(config_error::invalid(
                "unit_sources must contain at least one URL",
            ));
        }
        if self.connect_timeout_secs == 0 || self.total_timeout_secs == 0 {
            return Err(config_error::invalid("timeouts must be greater than zero"));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn total_timeout(&self) -> Duration {
        Duration::from_secs(self.total_timeout_secs)
    }

    /// Mirror list for a direct asset URL: the URL itself, then each mirror prefix applied to it
    pub fn mirror_urls(&self, direct_url: &str) -> Vec<String> {
        let mut urls = vec![direct_url.to_string()];
        urls.extend(
            self.mirror_prefixes
                .iter()
                .filter(|p| !p.trim().is_empty())
                .map(|prefix| format!("{prefix}{direct_url}")),
        );
        urls
    }

    /// Source URLs for a unit file, in priority order
    pub fn unit_urls(&self, unit: &str) -> Vec<String> {
        self.unit_sources
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|base| format!("{}/{unit}", base.trim_end_matches('/')))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config_is_valid() {
        let config = InstallerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.connect_timeout(), Duration::from_secs(20));
        assert_eq!(config.total_timeout(), Duration::from_secs(600));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = InstallerConfig::from_yaml(
            r"
release_url: http://localhost:8080/latest
connect_timeout_secs: 5
",
        )
        .unwrap();
        assert_eq!(config.release_url, "http://localhost:8080/latest");
        assert_eq!(config.connect_timeout_secs, 5);
        assert_eq!(config.total_timeout_secs, 600);
        assert_eq!(config.package_prefix, "softether");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(
            InstallerConfig::from_yaml("  \n").unwrap(),
            InstallerConfig::default()
        );
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = InstallerConfig::from_yaml("mirrors: []").unwrap_err();
        assert!(matches!(
            err,
            crate::error::InstallerError::ConfigParseFailed { .. }
        ));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = InstallerConfig {
            total_timeout_secs: 0,
            ..InstallerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_unit_sources() {
        let config = InstallerConfig {
            unit_sources: vec![" ".to_string()],
            ..InstallerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mirror_urls_direct_first() {
        let config = InstallerConfig {
            mirror_prefixes: vec!["https://m1/".to_string(), String::new()],
            ..InstallerConfig::default()
        };
        assert_eq!(
            config.mirror_urls("https://github.com/a/b.deb"),
            vec![
                "https://github.com/a/b.deb".to_string(),
                "https://m1/https://github.com/a/b.deb".to_string(),
            ]
        );
    }

    #[test]
    fn test_unit_urls_join_without_double_slash() {
        let config = InstallerConfig {
            unit_sources: vec!["https://a/systemd/".to_string(), "https://b/units".to_string()],
            ..InstallerConfig::default()
        };
        assert_eq!(
            config.unit_urls("x.service"),
            vec![
                "https://a/systemd/x.service".to_string(),
                "https://b/units/x.service".to_string(),
            ]
        );
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = InstallerConfig::load(Some(&temp.path().join("nope.yaml"))).unwrap_err();
        assert!(matches!(
            err,
            crate::error::InstallerError::ConfigReadFailed { .. }
        ));
    }

    #[test]
    #[serial]
    fn test_env_overrides_file_values() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "release_url: http://from-file/latest\n").unwrap();

        // SAFETY: serialized with other environment tests
        unsafe {
            std::env::set_var(RELEASE_URL_ENV, "http://from-env/latest");
            std::env::set_var(SCRATCH_DIR_ENV, temp.path());
        }
        let config = InstallerConfig::load(Some(&path));
        unsafe {
            std::env::remove_var(RELEASE_URL_ENV);
            std::env::remove_var(SCRATCH_DIR_ENV);
        }

        let config = config.unwrap();
        assert_eq!(config.release_url, "http://from-env/latest");
        assert_eq!(config.scratch_base.as_deref(), Some(temp.path()));
    }
}
