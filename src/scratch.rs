//! Per-run scratch directory for downloaded packages and unit files.
//!
//! The directory name carries the process id plus a random suffix so two
//! concurrent runs never share files, and it is removed when dropped.

use std::env;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{Result, fs as fs_error};

/// Returns a directory path suitable for creating temporary directories.
/// Never returns a relative path, so scratch dirs are never created under the current working
/// directory (e.g. when TMPDIR=tmp).
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        PathBuf::from("/tmp")
    }
}

/// Scratch directory exclusive to one installer run
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create `sevpn-installer-<pid>-XXXXXX` under `base`, or under [`temp_dir_base`]
    pub fn create(base: Option<&Path>) -> Result<Self> {
        let base = base.map_or_else(temp_dir_base, Path::to_path_buf);
        std::fs::create_dir_all(&base).map_err(|e| fs_error::write_failed(base.display(), e))?;

        let prefix = format!("sevpn-installer-{}-", std::process::id());
        let dir = tempfile::Builder::new()
            .prefix(&prefix)
            .tempdir_in(&base)
            .map_err(|e| fs_error::write_failed(base.display(), e))?;
        tracing::debug!(path = %dir.path().display(), "created scratch directory");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_base_is_absolute() {
        assert!(temp_dir_base().is_absolute());
    }

    #[test]
    fn test_scratch_dir_is_pid_qualified_and_removed_on_drop() {
        let base = tempfile::TempDir::new().unwrap();
        let scratch = ScratchDir::create(Some(base.path())).unwrap();
        let path = scratch.path().to_path_buf();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(&format!("sevpn-installer-{}-", std::process::id())));
        assert!(path.is_dir());

        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn test_two_scratch_dirs_do_not_collide() {
        let base = tempfile::TempDir::new().unwrap();
        let first = ScratchDir::create(Some(base.path())).unwrap();
        let second = ScratchDir::create(Some(base.path())).unwrap();
        assert_ne!(first.path(), second.path());
    }
}
