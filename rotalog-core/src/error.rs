/*!
Error types for the Rotalog core engine.
*/

use thiserror::Error;

/// Result type used throughout the Rotalog core.
pub type Result<T> = std::result::Result<T, RotalogError>;

/// Errors that can occur while writing, reading or pruning archives.
#[derive(Error, Debug)]
pub enum RotalogError {
    /// Address has no separator or a non-numeric offset
    #[error("Malformed address: {0}")]
    MalformedAddress(String),

    /// The archive named by an address does not exist (expired or rotated away)
    #[error("Archive file not found: {0}")]
    ArchiveNotFound(String),

    /// The archive was scanned to exhaustion without a matching entry
    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    /// I/O errors during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Compression/decompression errors
    #[error("Compression error: {0}")]
    Compression(String),

    /// Malformed container bytes or an archive too short to append to
    #[error("Corrupt archive: {0}")]
    Corrupt(String),

    /// JSON configuration errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Logging or metrics setup failures
    #[error("Observability error: {0}")]
    Observability(String),
}

impl RotalogError {
    /// Create a new malformed address error
    pub fn malformed_address<S: Into<String>>(msg: S) -> Self {
        Self::MalformedAddress(msg.into())
    }

    /// Create a new compression error
    pub fn compression<S: Into<String>>(msg: S) -> Self {
        Self::Compression(msg.into())
    }

    /// Create a new corrupt archive error
    pub fn corrupt<S: Into<String>>(msg: S) -> Self {
        Self::Corrupt(msg.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new observability error
    pub fn observability<S: Into<String>>(msg: S) -> Self {
        Self::Observability(msg.into())
    }

    /// True for lower-level failures where the record may not be durably stored
    /// or cannot be decoded: I/O, compression and container corruption.
    pub fn is_corruption_or_io(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Compression(_) | Self::Corrupt(_))
    }
}
