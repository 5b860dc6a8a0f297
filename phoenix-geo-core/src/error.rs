//! Error types for geometry codecs.

use thiserror::Error;

/// Geometry codec errors.
///
/// Every variant aborts the single value being encoded or decoded; callers
/// decide whether to skip the row or fail the whole read.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// WKT text could not be parsed.
    #[error("WKT parse error: {0}")]
    WktParse(String),

    /// WKB bytes could not be parsed.
    #[error("WKB parse error: {0}")]
    WkbParse(String),

    /// Geometry could not be written as WKB.
    #[error("WKB write error: {0}")]
    WkbWrite(String),

    /// Geometry kind or type name the dialect cannot represent.
    #[error("Unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    /// Malformed geohash text.
    #[error("Invalid geohash: {0}")]
    InvalidGeohash(String),
}

impl CodecError {
    /// Create an unsupported geometry error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        CodecError::UnsupportedGeometry(msg.into())
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
