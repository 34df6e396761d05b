//! Error types for fleetlink-state

use thiserror::Error;

/// Errors that can occur in the state persistence layer.
///
/// Persistence failures are fatal to the operation that triggered them: the
/// caller must see the error rather than continue with lifecycle state that
/// was never made durable.
#[derive(Error, Debug)]
pub enum StateError {
    /// Reading or writing the state file failed
    #[error("state file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding the state record failed
    #[error("state record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The stored record does not belong to the requested identity
    #[error("state record for '{identity}' is corrupt: {reason}")]
    Corrupt { identity: String, reason: String },
}

/// Result type for state persistence operations
pub type StateResult<T> = std::result::Result<T, StateError>;
