//! Error types for cuebridge
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for the coordinator
#[derive(Error, Debug)]
pub enum Error {
    /// Audio session configuration errors
    #[error("Session setup error: {0}")]
    Session(String),

    /// Media engine command errors (bad source, decode failure, seek failure)
    #[error("Playback error: {0}")]
    Playback(String),

    /// Credential store errors
    ///
    /// Never surfaces from a load operation (credential failures are
    /// swallowed there); exists for credential store implementations.
    #[error("Credential error: {0}")]
    Credentials(String),

    /// The coordinator task is no longer running
    #[error("Coordinator unavailable: {0}")]
    Channel(String),
}

/// Convenience Result type using the cuebridge Error
pub type Result<T> = std::result::Result<T, Error>;
