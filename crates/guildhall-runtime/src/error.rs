//! Runtime error types.

use thiserror::Error;

/// Errors that can occur while starting or running the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(#[from] guildhall_config::ConfigError),

    /// Storage error.
    #[error("Storage error: {0}")]
    StorageError(#[from] guildhall_storage::StorageError),

    /// Telemetry error.
    #[error("Telemetry error: {0}")]
    TelemetryError(#[from] guildhall_telemetry::TelemetryError),

    /// A store name that cannot be used as a directory name.
    #[error("Invalid store name: {name:?}")]
    InvalidStoreName {
        /// The rejected name.
        name: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The sweeper task ended abnormally.
    #[error("Sweeper task failed: {0}")]
    SweeperFailed(String),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_invalid_store_name() {
        let err = RuntimeError::InvalidStoreName {
            name: "../etc".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid store name: \"../etc\"");
    }

    #[test]
    fn error_from_storage() {
        let err: RuntimeError = guildhall_storage::StorageError::InvalidPageSize(0).into();
        assert!(matches!(err, RuntimeError::StorageError(_)));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RuntimeError>();
    }
}
