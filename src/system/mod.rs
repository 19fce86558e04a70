//! Package and service manager boundaries
//!
//! The orchestrator only talks to the system through [`PackageManager`] and
//! [`ServiceManager`]; [`apt::Apt`] and [`systemd::Systemd`] implement them by
//! running the native tools.

pub mod apt;
pub mod systemd;

use std::path::Path;
use std::process::Command;

use thiserror::Error;

/// A system command that could not be run or exited unsuccessfully
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}: {detail}")]
    Failed {
        command: String,
        status: String,
        detail: String,
    },
}

/// Outcome of installing a package file
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("unmet dependencies: {0}")]
    UnmetDependencies(String),

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Native package manager operations
pub trait PackageManager {
    /// Install a local package file; `package` is the name it installs as
    fn install_file(&self, package: &str, path: &Path) -> Result<(), PackageError>;

    /// Install whatever dependencies are missing for partially installed packages
    fn repair_dependencies(&self) -> Result<(), CommandError>;

    fn remove(&self, package: &str) -> Result<(), CommandError>;

    /// Fully installed and configured
    fn is_installed(&self, package: &str) -> Result<bool, CommandError>;

    /// Installed in any state, including unpacked or half-configured, so it can be removed
    fn is_present(&self, package: &str) -> Result<bool, CommandError>;

    /// Purge dependencies nothing needs anymore
    fn autoremove(&self) -> Result<(), CommandError>;
}

/// Service manager operations on named units
pub trait ServiceManager {
    /// Directory unit files are placed in
    fn unit_dir(&self) -> &Path;

    fn is_active(&self, unit: &str) -> Result<bool, CommandError>;

    fn is_enabled(&self, unit: &str) -> Result<bool, CommandError>;

    /// Human readable run state, e.g. "active" or "failed"
    fn active_state(&self, unit: &str) -> Result<String, CommandError>;

    fn start(&self, unit: &str) -> Result<(), CommandError>;

    fn stop(&self, unit: &str) -> Result<(), CommandError>;

    fn enable(&self, unit: &str) -> Result<(), CommandError>;

    fn disable(&self, unit: &str) -> Result<(), CommandError>;

    /// Re-read unit files
    fn reload(&self) -> Result<(), CommandError>;
}

/// Captured result of a finished command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub command: String,
    pub success: bool,
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Turn a non-zero exit into a [`CommandError::Failed`]
    pub fn check(self) -> Result<Self, CommandError> {
        if self.success {
            Ok(self)
        } else {
            let detail = if self.stderr.trim().is_empty() {
                self.stdout.trim().to_string()
            } else {
                self.stderr.trim().to_string()
            };
            Err(CommandError::Failed {
                command: self.command,
                status: self.status,
                detail,
            })
        }
    }
}

/// Run `program args...` non-interactively and capture its output
pub fn run_command(program: &str, args: &[&str]) -> Result<CommandOutput, CommandError> {
    let command = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");
    tracing::debug!(command = %command, "running");

    let output = Command::new(program)
        .args(args)
        .env("DEBIAN_FRONTEND", "noninteractive")
        .output()
        .map_err(|source| CommandError::Spawn {
            command: command.clone(),
            source,
        })?;

    let result = CommandOutput {
        command,
        success: output.status.success(),
        status: output.status.to_string(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    tracing::debug!(command = %result.command, status = %result.status, "finished");
    Ok(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command_captures_stdout() {
        let output = run_command("sh", &["-c", "echo hello"]).unwrap();
        assert!(output.success);
        assert_eq!(output.stdout.trim(), "hello");
        assert_eq!(output.command, "sh -c echo hello");
    }

    #[test]
    fn test_check_reports_stderr() {
        let err = run_command("sh", &["-c", "echo oops >&2; exit 3"])
            .unwrap()
            .check()
            .unwrap_err();
        match err {
            CommandError::Failed { detail, .. } => assert_eq!(detail, "oops"),
            CommandError::Spawn { .. } => panic!("expected a failed command"),
        }
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let err = run_command("definitely-not-a-real-program-4242", &[]).unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }
}
