//! Debian package manager (`dpkg` + `apt-get`)

use std::path::Path;

use super::{CommandError, PackageError, PackageManager, run_command};

/// [`PackageManager`] backed by `dpkg`, `dpkg-query` and `apt-get`
#[derive(Debug, Default, Clone, Copy)]
pub struct Apt;

impl PackageManager for Apt {
    fn install_file(&self, package: &str, path: &Path) -> Result<(), PackageError> {
        let path = path.to_string_lossy().into_owned();
        tracing::info!(package, path = %path, "installing package file");
        let output = run_command("dpkg", &["-i", path.as_str()])?;
        if output.success {
            return Ok(());
        }
        if is_unmet_dependency(&output.stderr) || is_unmet_dependency(&output.stdout) {
            return Err(PackageError::UnmetDependencies(
                output.stderr.trim().to_string(),
            ));
        }
        output.check()?;
        Ok(())
    }

    fn repair_dependencies(&self) -> Result<(), CommandError> {
        run_command("apt-get", &["install", "-f", "-y"])?.check()?;
        Ok(())
    }

    fn remove(&self, package: &str) -> Result<(), CommandError> {
        tracing::info!(package, "removing package");
        run_command("apt-get", &["remove", "-y", package])?.check()?;
        Ok(())
    }

    fn is_installed(&self, package: &str) -> Result<bool, CommandError> {
        Ok(query_status(package)?.is_some_and(|status| status_is_installed(&status)))
    }

    fn is_present(&self, package: &str) -> Result<bool, CommandError> {
        Ok(query_status(package)?.is_some_and(|status| status_is_present(&status)))
    }

    fn autoremove(&self) -> Result<(), CommandError> {
        run_command("apt-get", &["autoremove", "-y"])?.check()?;
        Ok(())
    }
}

/// `dpkg-query ${Status}` for a package, `None` when dpkg has never heard of it
fn query_status(package: &str) -> Result<Option<String>, CommandError> {
    let output = run_command("dpkg-query", &["-W", "-f=${Status}", package])?;
    Ok(output.success.then_some(output.stdout))
}

/// Whether dpkg output describes missing dependencies rather than a broken package
fn is_unmet_dependency(output: &str) -> bool {
    output.contains("dependency problems") || output.contains("depends on")
}

/// Whether a `dpkg-query ${Status}` value means fully installed
fn status_is_installed(status: &str) -> bool {
    status.trim().ends_with("install ok installed")
}

/// Whether a `dpkg-query ${Status}` value leaves anything for `apt-get remove` to remove
fn status_is_present(status: &str) -> bool {
    match status.split_whitespace().last() {
        None | Some("not-installed" | "config-files") => false,
        Some(_) => true,
    }
}
