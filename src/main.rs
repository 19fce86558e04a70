//! sevpn-installer - SoftEther VPN installer
//!
//! Resolves the latest SoftEther VPN Debian release, downloads its packages
//! through fallback mirrors, and installs or removes the client, server and
//! bridge components together with their systemd units.

use std::fmt::Write as _;

use clap::Parser;
use miette::Diagnostic;

mod catalog;
mod cli;
mod commands;
mod config;
mod download;
mod error;
mod http;
mod logging;
mod orchestrator;
mod privilege;
mod progress;
mod release;
mod scratch;
mod selector;
mod system;
mod ui;

use cli::Cli;
use error::InstallerError;

fn format_error(e: &InstallerError) -> String {
    let mut text = format!("Error [{}]: {e}", e.category());
    if let Some(help) = e.help() {
        let _ = write!(text, "\n  help: {help}");
    }
    text
}

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    if let Err(e) = commands::run::run(cli) {
        tracing::debug!(code = ?e.code().map(|c| c.to_string()), category = e.category(), "run failed");
        eprintln!("{}", format_error(&e));
        std::process::exit(1);
    }
}
