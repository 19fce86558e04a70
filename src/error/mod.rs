//! Error types and handling for the installer
//!
//! Uses `thiserror` for error definitions and `miette` for diagnostic codes and help.
//!
//! This module is organized into sub-modules by error domain:
//! - [`resolve`]: Release metadata errors
//! - [`download`]: Mirror download errors
//! - [`package`]: Package manager errors
//! - [`service`]: Service manager errors
//! - [`config`]: Configuration errors
//! - [`fs`]: File system errors

pub mod config;
pub mod download;
pub mod fs;
pub mod package;
pub mod resolve;
pub mod service;


use miette::Diagnostic;
use thiserror::Error;

/// Main error type for installer operations
#[derive(Error, Diagnostic, Debug)]
pub enum InstallerError {
    // Release resolution errors
    #[error("Release metadata unreachable at {url}: {reason}")]
    #[diagnostic(
        code(sevpn::resolve::unreachable),
        help("Check network connectivity or set SEVPN_RELEASE_URL to a reachable endpoint")
    )]
    ReleaseUnreachable { url: String, reason: String },

    #[error("Release metadata request to {url} returned HTTP {status}")]
    #[diagnostic(code(sevpn::resolve::status))]
    ReleaseStatus { url: String, status: u16 },

    #[error("Release metadata is malformed: {reason}")]
    #[diagnostic(code(sevpn::resolve::malformed))]
    ReleaseMalformed { reason: String },

    #[error("Release {tag} has no asset for component '{component}' (expected prefix '{prefix}')")]
    #[diagnostic(
        code(sevpn::resolve::asset_missing),
        help("Partial releases are not supported; wait for the release to be complete")
    )]
    ReleaseAssetMissing {
        tag: String,
        component: String,
        prefix: String,
    },

    // Download errors
    #[error("Failed to download {asset}: all {attempts} mirror(s) failed, last error: {last}")]
    #[diagnostic(
        code(sevpn::download::exhausted),
        help("Configure additional mirror_prefixes or retry later")
    )]
    DownloadFailed {
        asset: String,
        attempts: usize,
        last: String,
    },

    #[error("No download sources configured for {asset}")]
    #[diagnostic(code(sevpn::download::no_sources))]
    NoMirrors { asset: String },

    // Menu errors
    #[error("Invalid choice '{input}': expected a number between 0 and {max}")]
    #[diagnostic(code(sevpn::menu::invalid_choice))]
    InvalidChoice { input: String, max: u32 },

    #[error("Unknown component: {name}")]
    #[diagnostic(code(sevpn::menu::unknown_component))]
    UnknownComponent { name: String },

    // Package errors
    #[error("Failed to install package {package} for component '{component}': {reason}")]
    #[diagnostic(
        code(sevpn::package::install_failed),
        help("Already installed components are kept; run the installer again and choose 'uninstall all' to clean up")
    )]
    PackageInstallFailed {
        component: String,
        package: String,
        reason: String,
    },

    #[error("Failed to remove package {package}: {reason}")]
    #[diagnostic(code(sevpn::package::remove_failed))]
    PackageRemoveFailed { package: String, reason: String },

    #[error("Package manager query failed: {reason}")]
    #[diagnostic(code(sevpn::package::query_failed))]
    PackageQueryFailed { reason: String },

    #[error("Dependency cleanup failed: {reason}")]
    #[diagnostic(code(sevpn::package::cleanup_failed))]
    DependencyCleanupFailed { reason: String },

    // Service errors
    #[error("Failed to set up service {unit} ({step}): {reason}")]
    #[diagnostic(code(sevpn::service::setup_failed))]
    ServiceSetupFailed {
        unit: String,
        step: String,
        reason: String,
    },

    #[error("{count} service(s) could not be set up: {units}")]
    #[diagnostic(
        code(sevpn::service::setup_incomplete),
        help("Packages were installed; inspect the units with 'systemctl status'")
    )]
    ServiceSetupIncomplete { count: usize, units: String },

    #[error("Failed to tear down service {unit} ({step}): {reason}")]
    #[diagnostic(code(sevpn::service::teardown_failed))]
    ServiceTeardownFailed {
        unit: String,
        step: String,
        reason: String,
    },

    #[error("{count} service(s) could not be torn down: {units}")]
    #[diagnostic(
        code(sevpn::service::teardown_incomplete),
        help("Packages were removed; stop and disable the remaining units with 'systemctl'")
    )]
    ServiceTeardownIncomplete { count: usize, units: String },

    #[error("Failed to reload the service manager: {reason}")]
    #[diagnostic(code(sevpn::service::reload_failed))]
    ServiceReloadFailed { reason: String },

    // Environment errors
    #[error("This installer must be run as root")]
    #[diagnostic(
        code(sevpn::privilege::not_root),
        help("Re-run with sudo or as the root user")
    )]
    NotRoot,

    #[error("No interactive terminal available to read the menu choice")]
    #[diagnostic(
        code(sevpn::terminal::unavailable),
        help("Run the installer from an interactive shell, not from a pipe or cron job")
    )]
    TerminalUnavailable,

    // Configuration errors
    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(sevpn::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file {path}: {reason}")]
    #[diagnostic(code(sevpn::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(sevpn::config::invalid))]
    ConfigInvalid { message: String },

    // File system errors
    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(sevpn::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(sevpn::fs::io_error))]
    IoError { message: String },
}

impl InstallerError {
    /// Short category label shown in front of fatal messages, as in `Error [download]: ...`
    pub fn category(&self) -> &'static str {
        match self {
            Self::ReleaseUnreachable { .. }
            | Self::ReleaseStatus { .. }
            | Self::ReleaseMalformed { .. }
            | Self::ReleaseAssetMissing { .. } => "resolve",
            Self::DownloadFailed { .. } | Self::NoMirrors { .. } => "download",
            Self::InvalidChoice { .. } | Self::UnknownComponent { .. } => "menu",
            Self::PackageInstallFailed { .. }
            | Self::PackageRemoveFailed { .. }
            | Self::PackageQueryFailed { .. }
            | Self::DependencyCleanupFailed { .. } => "package",
            Self::ServiceSetupFailed { .. }
            | Self::ServiceSetupIncomplete { .. }
            | Self::ServiceTeardownFailed { .. }
            | Self::ServiceTeardownIncomplete { .. }
            | Self::ServiceReloadFailed { .. } => "service",
            Self::NotRoot => "privilege",
            Self::TerminalUnavailable => "terminal",
            Self::ConfigReadFailed { .. }
            | Self::ConfigParseFailed { .. }
            | Self::ConfigInvalid { .. } => "config",
            Self::FileWriteFailed { .. } | Self::IoError { .. } => "io",
        }
    }
}

impl From<std::io::Error> for InstallerError {
    fn from(err: std::io::Error) -> Self {
        InstallerError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<inquire::InquireError> for InstallerError {
    fn from(err: inquire::InquireError) -> Self {
        match err {
            inquire::InquireError::NotTTY => InstallerError::TerminalUnavailable,
            other => InstallerError::IoError {
                message: other.to_string(),
            },
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, InstallerError>;
