//! The installer run
//!
//! The run proceeds in this order:
//! 1. Check privileges and the terminal before any network access
//! 2. Load configuration and resolve the latest release
//! 3. Show the menu and read one choice
//! 4. Install the mandatory plus selected components, or remove everything
//!
//! A release that cannot be resolved only blocks installing; uninstall works offline.

use std::io::IsTerminal;

use console::Style;

use crate::catalog::{Catalog, MenuChoice};
use crate::cli::Cli;
use crate::config::InstallerConfig;
use crate::download::MirroredDownloader;
use crate::error::{InstallerError, Result};
use crate::http;
use crate::orchestrator::{Orchestrator, ServiceFailure};
use crate::privilege;
use crate::release::{ReleaseInfo, ReleaseResolver};
use crate::scratch::ScratchDir;
use crate::selector;
use crate::system::apt::Apt;
use crate::system::systemd::Systemd;
use crate::ui::display;

/// What the operator asked for, with everything it needs
#[derive(Debug)]
enum Action {
    Install {
        release: ReleaseInfo,
        selected: Vec<&'static str>,
    },
    UninstallAll,
}

/// Pair a menu choice with the resolution result; `None` means exit.
///
/// Installing needs the release, so its resolution error surfaces here.
fn action_for(choice: MenuChoice, release: Result<ReleaseInfo>) -> Result<Option<Action>> {
    match choice {
        MenuChoice::Exit => Ok(None),
        MenuChoice::UninstallAll => Ok(Some(Action::UninstallAll)),
        MenuChoice::Install(selected) => Ok(Some(Action::Install {
            release: release?,
            selected,
        })),
    }
}

/// Run the installer end to end
pub fn run(cli: Cli) -> Result<()> {
    privilege::ensure_root()?;
    selector::ensure_terminal()?;

    let config = InstallerConfig::load(cli.config.as_deref())?;
    let catalog = Catalog::standard(&config.package_prefix);
    let client = http::build_client(&config)?;

    let release = ReleaseResolver::new(&client, &catalog, &config).resolve();
    if let Err(e) = &release {
        tracing::warn!(error = %e, "release unavailable");
        eprintln!(
            "{} {e}",
            Style::new().yellow().bold().apply_to("Warning:")
        );
    }

    let choice = selector::select(&catalog, release.as_ref().ok())?;
    let Some(action) = action_for(choice, release)? else {
        println!("No changes were made.");
        return Ok(());
    };

    let scratch = ScratchDir::create(config.scratch_base.as_deref())?;
    let show_progress = std::io::stderr().is_terminal();
    let downloader = MirroredDownloader::new(&client).with_progress(show_progress);
    let services = Systemd::new(&config.unit_dir);
    let orchestrator = Orchestrator::new(
        &catalog,
        &config,
        scratch.path(),
        &downloader,
        &Apt,
        &services,
    )
    .with_progress(show_progress);

    match action {
        Action::Install { release, selected } => install(&orchestrator, &release, &selected),
        Action::UninstallAll => uninstall(&orchestrator),
    }
}

fn failed_components(failures: &[ServiceFailure]) -> (usize, String) {
    let names: Vec<&str> = failures.iter().map(|failure| failure.component).collect();
    (names.len(), names.join(", "))
}

fn install(orchestrator: &Orchestrator<'_>, release: &ReleaseInfo, selected: &[&str]) -> Result<()> {
    let report = orchestrator.install_all(release, selected)?;
    print!("{}", display::format_install_report(&report, &release.version));

    if report.service_failures.is_empty() {
        println!(
            "{}",
            Style::new().green().bold().apply_to("Installation complete.")
        );
        Ok(())
    } else {
        let (count, units) = failed_components(&report.service_failures);
        Err(InstallerError::ServiceSetupIncomplete { count, units })
    }
}

fn uninstall(orchestrator: &Orchestrator<'_>) -> Result<()> {
    let report = orchestrator.uninstall_all()?;
    print!("{}", display::format_uninstall_report(&report));

    if report.teardown_failures.is_empty() {
        println!(
            "{}",
            Style::new().green().bold().apply_to("Uninstall complete.")
        );
        Ok(())
    } else {
        let (count, units) = failed_components(&report.teardown_failures);
        Err(InstallerError::ServiceTeardownIncomplete { count, units })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{resolve as resolve_error, service as service_error};
    use std::collections::BTreeMap;

    fn unreachable() -> Result<ReleaseInfo> {
        Err(resolve_error::unreachable(
            "http://127.0.0.1:9/releases/latest",
            "connection refused",
        ))
    }

    #[test]
    fn test_uninstall_does_not_need_a_release() {
        let action = action_for(MenuChoice::UninstallAll, unreachable()).unwrap();
        assert!(matches!(action, Some(Action::UninstallAll)));
    }

    #[test]
    fn test_exit_does_not_need_a_release() {
        assert!(action_for(MenuChoice::Exit, unreachable()).unwrap().is_none());
    }

    #[test]
    fn test_install_surfaces_resolution_error() {
        let err = action_for(MenuChoice::Install(vec!["client"]), unreachable()).unwrap_err();
        assert!(matches!(err, InstallerError::ReleaseUnreachable { .. }));
    }

    #[test]
    fn test_install_carries_release_and_selection() {
        let release = ReleaseInfo {
            tag: "v5.02.5187-deb".to_string(),
            version: "5.02.5187".to_string(),
            assets: BTreeMap::new(),
        };
        let action = action_for(MenuChoice::Install(vec!["client", "server"]), Ok(release)).unwrap();
        match action {
            Some(Action::Install { release, selected }) => {
                assert_eq!(release.version, "5.02.5187");
                assert_eq!(selected, vec!["client", "server"]);
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_failed_components_lists_names() {
        let failures = vec![
            ServiceFailure {
                component: "client",
                error: service_error::teardown_failed("softether-vpnclient.service", "stop", "x"),
            },
            ServiceFailure {
                component: "bridge",
                error: service_error::teardown_failed("softether-vpnbridge.service", "remove", "y"),
            },
        ];
        assert_eq!(failed_components(&failures), (2, "client, bridge".to_string()));
    }
}
