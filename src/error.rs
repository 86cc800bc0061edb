//! Error types for the doued service.

use thiserror::Error;

/// Result type alias for doued operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit status for a clean shutdown.
pub const EXIT_OK: i32 = 0;
/// Exit status when another instance holds the lock.
pub const EXIT_ALREADY_RUNNING: i32 = 2;
/// Exit status when the invocation name cannot be used as a service name.
pub const EXIT_INVALID_NAME: i32 = 3;
/// Exit status when the process lacks access to the control interface.
pub const EXIT_PERMISSION_DENIED: i32 = 4;
/// Exit status when the control interface cannot be opened.
pub const EXIT_DEVICE_UNAVAILABLE: i32 = 5;
/// Exit status when the kernel rejects device setup or creation.
pub const EXIT_DEVICE_SETUP: i32 = 6;
/// Exit status for lock file I/O errors.
pub const EXIT_LOCK_FAILED: i32 = 7;
/// Exit status when the interrupt handler cannot be installed.
pub const EXIT_SIGNAL_HANDLER: i32 = 8;
/// Exit status when teardown did not complete cleanly.
pub const EXIT_TEARDOWN_FAILED: i32 = 9;

/// Errors that can occur while provisioning or tearing down the device.
#[derive(Debug, Error)]
pub enum Error {
    /// Another instance already holds the lock token.
    #[error("another {name} may be already running (lock file {path} exists)")]
    AlreadyRunning {
        /// Service name of the instance.
        name: String,
        /// Path of the existing lock token.
        path: String,
    },

    /// The program name cannot be used as a service name.
    #[error("invalid service name: {0}")]
    InvalidServiceName(String),

    /// The operation requires elevated permissions.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The kernel virtual-device control interface could not be opened.
    #[error("device interface unavailable: {0}")]
    DeviceUnavailable(String),

    /// The kernel rejected device configuration or activation.
    #[error("device setup failed: {0}")]
    DeviceSetupFailed(String),

    /// Creating or removing the lock token failed.
    #[error("lock file error: {0}")]
    LockFailed(String),

    /// Installing the interrupt handler failed.
    #[error("failed to install signal handler: {0}")]
    SignalHandler(String),

    /// One or more shutdown steps failed.
    #[error("teardown failed: {0}")]
    TeardownFailed(String),
}

impl Error {
    /// Process exit status associated with this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::AlreadyRunning { .. } => EXIT_ALREADY_RUNNING,
            Error::InvalidServiceName(_) => EXIT_INVALID_NAME,
            Error::PermissionDenied(_) => EXIT_PERMISSION_DENIED,
            Error::DeviceUnavailable(_) => EXIT_DEVICE_UNAVAILABLE,
            Error::DeviceSetupFailed(_) => EXIT_DEVICE_SETUP,
            Error::LockFailed(_) => EXIT_LOCK_FAILED,
            Error::SignalHandler(_) => EXIT_SIGNAL_HANDLER,
            Error::TeardownFailed(_) => EXIT_TEARDOWN_FAILED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            Error::AlreadyRunning {
                name: "doued".into(),
                path: "/tmp/doued.lock".into(),
            },
            Error::InvalidServiceName(String::new()),
            Error::PermissionDenied(String::new()),
            Error::DeviceUnavailable(String::new()),
            Error::DeviceSetupFailed(String::new()),
            Error::LockFailed(String::new()),
            Error::SignalHandler(String::new()),
            Error::TeardownFailed(String::new()),
        ];

        let mut codes: Vec<i32> = errors.iter().map(Error::exit_code).collect();
        assert!(!codes.contains(&EXIT_OK));
        assert!(codes.iter().all(|&code| (2..=9).contains(&code)));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_already_running_message() {
        let err = Error::AlreadyRunning {
            name: "doued".into(),
            path: "/tmp/doued.lock".into(),
        };
        assert_eq!(
            err.to_string(),
            "another doued may be already running (lock file /tmp/doued.lock exists)"
        );
        assert_eq!(err.exit_code(), 2);
    }
}
