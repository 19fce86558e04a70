//! Release resolution errors

use super::InstallerError;

/// Creates an unreachable endpoint error
pub fn unreachable(url: impl Into<String>, reason: impl std::fmt::Display) -> InstallerError {
    InstallerError::ReleaseUnreachable {
        url: url.into(),
        reason: reason.to_string(),
    }
}

/// Creates a malformed metadata error
pub fn malformed(reason: impl Into<String>) -> InstallerError {
    InstallerError::ReleaseMalformed {
        reason: reason.into(),
    }
}

/// Creates a missing asset error
pub fn asset_missing(
    tag: impl Into<String>,
    component: impl Into<String>,
    prefix: impl Into<String>,
) -> InstallerError {
    InstallerError::ReleaseAssetMissing {
        tag: tag.into(),
        component: component.into(),
        prefix: prefix.into(),
    }
}
