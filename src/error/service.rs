//! Service manager errors

use super::InstallerError;

/// Creates a service setup failed error
pub fn setup_failed(
    unit: impl Into<String>,
    step: impl Into<String>,
    reason: impl std::fmt::Display,
) -> InstallerError {
    InstallerError::ServiceSetupFailed {
        unit: unit.into(),
        step: step.into(),
        reason: reason.to_string(),
    }
}

/// Creates a service teardown failed error
pub fn teardown_failed(
    unit: impl Into<String>,
    step: impl Into<String>,
    reason: impl std::fmt::Display,
) -> InstallerError {
    InstallerError::ServiceTeardownFailed {
        unit: unit.into(),
        step: step.into(),
        reason: reason.to_string(),
    }
}

/// Creates a service manager reload error
pub fn reload_failed(reason: impl std::fmt::Display) -> InstallerError {
    InstallerError::ServiceReloadFailed {
        reason: reason.to_string(),
    }
}
