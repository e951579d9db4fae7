//! Domain error types

use thiserror::Error;

/// Errors that can occur while loading, planning or keying a transmission
#[derive(Error, Debug)]
pub enum OokError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A keyer call failed while keying run `index` (0-based)
    #[error("Keyer error at run {index}: {cause}")]
    Keyer { index: usize, cause: String },

    /// The final forced shutdown failed
    #[error("Keyer shutdown failed: {0}")]
    Shutdown(String),

    #[error("Radio error: {0}")]
    Radio(String),

    #[error("Serial port error: {0}")]
    Serial(String),

    /// The transmission was cancelled before run `index` completed
    #[error("Transmission cancelled at run {index}")]
    Cancelled { index: usize },
}

/// Result type alias for OOK operations
pub type OokResult<T> = Result<T, OokError>;
