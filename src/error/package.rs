//! Package manager errors

use super::InstallerError;

/// Creates a package install failed error
pub fn install_failed(
    component: impl Into<String>,
    package: impl Into<String>,
    reason: impl std::fmt::Display,
) -> InstallerError {
    InstallerError::PackageInstallFailed {
        component: component.into(),
        package: package.into(),
        reason: reason.to_string(),
    }
}

/// Creates a package remove failed error
pub fn remove_failed(package: impl Into<String>, reason: impl std::fmt::Display) -> InstallerError {
    InstallerError::PackageRemoveFailed {
        package: package.into(),
        reason: reason.to_string(),
    }
}

/// Creates a package query failed error
pub fn query_failed(reason: impl std::fmt::Display) -> InstallerError {
    InstallerError::PackageQueryFailed {
        reason: reason.to_string(),
    }
}
