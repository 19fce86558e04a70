//! File system errors

use super::InstallerError;

/// Creates a file write failed error
pub fn write_failed(path: impl std::fmt::Display, reason: impl std::fmt::Display) -> InstallerError {
    InstallerError::FileWriteFailed {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> InstallerError {
    InstallerError::IoError {
        message: message.into(),
    }
}
