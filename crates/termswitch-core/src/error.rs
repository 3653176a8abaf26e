//! Error types for termswitch.

use thiserror::Error;

/// Main error type for termswitch operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Session name is empty or whitespace
    #[error("Invalid session name: {0:?}")]
    InvalidSessionName(String),

    /// A session with this name is already registered
    #[error("Session name already registered: {0}")]
    DuplicateSessionName(String),

    /// The engine factory failed while building a session
    #[error("Failed to construct engine for session '{name}': {reason}")]
    EngineConstruction {
        /// Name the session would have been registered under
        name: String,
        /// Factory failure message
        reason: String,
    },

    /// PTY-related errors
    #[error("PTY error: {0}")]
    PtyError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with custom message
    #[error("{0}")]
    Other(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
