//! Download errors

use super::InstallerError;

/// Creates a mirrors exhausted error
pub fn exhausted(asset: impl Into<String>, attempts: usize, last: impl Into<String>) -> InstallerError {
    InstallerError::DownloadFailed {
        asset: asset.into(),
        attempts,
        last: last.into(),
    }
}
