//! Shared blocking HTTP client

use reqwest::blocking::Client;

use crate::config::InstallerConfig;
use crate::error::{Result, fs as fs_error};

pub const USER_AGENT: &str = concat!("sevpn-installer/", env!("CARGO_PKG_VERSION"));

/// Build the client used for release metadata, assets and unit files.
///
/// Connect and total timeouts come from the configuration and apply to every request.
pub fn build_client(config: &InstallerConfig) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(config.connect_timeout())
        .timeout(config.total_timeout())
        .build()
        .map_err(|e| fs_error::io_error(format!("Failed to build HTTP client: {e}")))
}
