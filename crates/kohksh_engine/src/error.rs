//! Engine error types

use thiserror::Error;

/// Engine runtime errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// `run` or `start` before `initialize`
    #[error("Engine not initialized")]
    NotInitialized,

    /// `initialize` called twice
    #[error("Engine already initialized")]
    AlreadyInitialized,

    /// Settings failed validation or could not be parsed
    #[error("Invalid engine settings: {0}")]
    InvalidSettings(String),

    /// The game rejected initialization
    #[error("Game error: {0}")]
    Game(String),

    /// The detached engine thread could not be spawned
    #[error("Failed to spawn engine thread: {0}")]
    Spawn(String),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
