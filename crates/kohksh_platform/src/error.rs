//! Platform error types

use thiserror::Error;

/// Shell and native-boundary errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// A native entry point reported failure or panicked
    #[error("Native call `{call}` failed: {message}")]
    Native { call: &'static str, message: String },

    /// Shell configuration could not be loaded or is invalid
    #[error("Invalid shell configuration: {0}")]
    Config(String),

    /// The launch worker thread could not be spawned
    #[error("Failed to spawn launch worker: {0}")]
    Spawn(String),

    /// Lifecycle callback invoked out of order
    #[error("Lifecycle violation: {0}")]
    Lifecycle(String),

    /// The UI thread dropped its receiver
    #[error("UI thread unavailable: {0}")]
    UiUnavailable(String),

    /// Platform not supported on this OS
    #[error("Platform not supported: {0}")]
    Unsupported(String),
}

impl PlatformError {
    /// Wrap a failure reported by a native entry point
    pub fn native(call: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Native {
            call,
            message: err.to_string(),
        }
    }
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
