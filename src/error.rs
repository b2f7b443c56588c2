//! Error types for marquee.
//!
//! Every fallible operation in the crate returns [`Result`]. Parse failures in
//! source records are deliberately absent from this taxonomy: they are
//! recovered locally by substituting a default value (see [`crate::film`]).

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MarqueeError>;

/// Errors produced by the index store, the engine, and the ingestion helpers.
#[derive(Debug, Error)]
pub enum MarqueeError {
    /// The index location cannot be opened, written, or cleared, or its
    /// contents are corrupt.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A cancellation signal was observed before the operation completed.
    /// Mutations that report this left the committed index untouched.
    #[error("operation cancelled")]
    Cancelled,

    /// The external record source could not be read.
    #[error("ingestion failed: {0}")]
    Ingest(String),

    /// A configuration value was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON (de)serialization of stored documents or the manifest failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MarqueeError {
    /// Create a storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        MarqueeError::StorageUnavailable(msg.into())
    }

    /// Create an ingestion error.
    pub fn ingest<S: Into<String>>(msg: S) -> Self {
        MarqueeError::Ingest(msg.into())
    }

    /// Create a configuration error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        MarqueeError::InvalidConfig(msg.into())
    }

    /// Returns true if this error means the storage backend failed.
    pub fn is_storage(&self) -> bool {
        matches!(self, MarqueeError::StorageUnavailable(_))
    }
}

impl From<std::io::Error> for MarqueeError {
    fn from(err: std::io::Error) -> Self {
        MarqueeError::StorageUnavailable(err.to_string())
    }
}

impl From<csv::Error> for MarqueeError {
    fn from(err: csv::Error) -> Self {
        MarqueeError::Ingest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: MarqueeError = io.into();
        assert!(err.is_storage());
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_constructors() {
        assert!(matches!(
            MarqueeError::ingest("bad row"),
            MarqueeError::Ingest(msg) if msg == "bad row"
        ));
        assert!(matches!(
            MarqueeError::invalid_config("max_hits"),
            MarqueeError::InvalidConfig(_)
        ));
    }
}
