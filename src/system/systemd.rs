//! systemd service manager (`systemctl`)

use std::path::{Path, PathBuf};

use super::{CommandError, ServiceManager, run_command};

/// [`ServiceManager`] backed by `systemctl`
#[derive(Debug, Clone)]
pub struct Systemd {
    unit_dir: PathBuf,
}

impl Systemd {
    pub fn new(unit_dir: impl Into<PathBuf>) -> Self {
        Self {
            unit_dir: unit_dir.into(),
        }
    }

    fn systemctl(&self, args: &[&str]) -> Result<(), CommandError> {
        run_command("systemctl", args)?.check()?;
        Ok(())
    }

    // `--quiet` queries report through the exit status only
    fn query(&self, verb: &str, unit: &str) -> Result<bool, CommandError> {
        Ok(run_command("systemctl", &[verb, "--quiet", unit])?.success)
    }
}

impl ServiceManager for Systemd {
    fn unit_dir(&self) -> &Path {
        &self.unit_dir
    }

    fn is_active(&self, unit: &str) -> Result<bool, CommandError> {
        self.query("is-active", unit)
    }

    fn is_enabled(&self, unit: &str) -> Result<bool, CommandError> {
        self.query("is-enabled", unit)
    }

    fn active_state(&self, unit: &str) -> Result<String, CommandError> {
        // is-active prints the state even when it exits non-zero
        let output = run_command("systemctl", &["is-active", unit])?;
        let state = output.stdout.trim();
        Ok(if state.is_empty() {
            "unknown".to_string()
        } else {
            state.to_string()
        })
    }

    fn start(&self, unit: &str) -> Result<(), CommandError> {
        tracing::info!(unit, "starting service");
        self.systemctl(&["start", unit])
    }

    fn stop(&self, unit: &str) -> Result<(), CommandError> {
        tracing::info!(unit, "stopping service");
        self.systemctl(&["stop", unit])
    }

    fn enable(&self, unit: &str) -> Result<(), CommandError> {
        self.systemctl(&["enable", unit])
    }

    fn disable(&self, unit: &str) -> Result<(), CommandError> {
        self.systemctl(&["disable", unit])
    }

    fn reload(&self) -> Result<(), CommandError> {
        self.systemctl(&["daemon-reload"])
    }
}
