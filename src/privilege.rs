//! Root check run before anything touches the network or the system

use crate::error::{InstallerError, Result};

pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}

/// Fail with [`InstallerError::NotRoot`] unless running with effective uid 0
pub fn ensure_root() -> Result<()> {
    if is_root() {
        Ok(())
    } else {
        Err(InstallerError::NotRoot)
    }
}
