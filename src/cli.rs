//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::CONFIG_PATH_ENV;

/// sevpn-installer - SoftEther VPN installer
///
/// Installs SoftEther VPN Debian packages and their systemd units from the latest release.
#[derive(Parser, Debug)]
#[command(
    name = "sevpn-installer",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Install SoftEther VPN packages and systemd units",
    long_about = "Resolves the latest SoftEther VPN Debian release, downloads the packages \
                  through a list of fallback mirrors, and installs or removes the client, \
                  server and bridge components with their systemd units. \
                  Must be run as root from an interactive terminal.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  sudo sevpn-installer\n    \
                  sudo sevpn-installer --config ./installer.yaml -v\n    \
                  sudo SEVPN_RELEASE_URL=https://mirror.example/latest sevpn-installer\n\n\
                  \x1b[1m\x1b[32mMenu:\x1b[0m\n    \
                  1) client  2) server  3) bridge  4) client + server  5) uninstall all  0) exit"
)]
pub struct Cli {
    /// Configuration file (defaults to /etc/sevpn-installer/config.yaml when present)
    #[arg(long, short = 'c', value_name = "PATH", env = CONFIG_PATH_ENV)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', action = ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parsing_defaults() {
        let cli = Cli::try_parse_from(["sevpn-installer"]).unwrap();
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_parsing_config_and_verbosity() {
        let cli =
            Cli::try_parse_from(["sevpn-installer", "--config", "/tmp/x.yaml", "-vv"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/x.yaml")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_rejects_positional_arguments() {
        assert!(Cli::try_parse_from(["sevpn-installer", "install"]).is_err());
    }
}
