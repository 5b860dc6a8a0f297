//! Error types for phoenix-geo-dialect

use crate::connection::SqlError;
use phoenix_geo_core::CodecError;
use thiserror::Error;

/// Result type alias using DialectError
pub type Result<T> = std::result::Result<T, DialectError>;

/// Dialect errors
#[derive(Error, Debug)]
pub enum DialectError {
    /// Geometry value could not be encoded or decoded
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Statement execution failed on the connection
    #[error(transparent)]
    Sql(#[from] SqlError),

    /// Spatial operator with no SQL mapping
    #[error("Unsupported spatial operator: {operator}")]
    UnsupportedOperator { operator: String },

    /// Unique index requested while the dialect is set to reject them
    #[error("Unique indexes are not supported: {index}")]
    UniqueIndexUnsupported { index: String },

    /// Distance operand that cannot be written as a SQL number
    #[error("Invalid distance for {operator}: {distance}")]
    InvalidDistance { operator: String, distance: f64 },

    /// Feature id not of the form `<type>.<key>`
    #[error("Invalid feature id: {0}")]
    InvalidFid(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl DialectError {
    /// Create an unsupported operator error
    pub fn unsupported_operator(operator: impl Into<String>) -> Self {
        DialectError::UnsupportedOperator {
            operator: operator.into(),
        }
    }

    /// Create an invalid distance error
    pub fn invalid_distance(operator: impl Into<String>, distance: f64) -> Self {
        DialectError::InvalidDistance {
            operator: operator.into(),
            distance,
        }
    }

    /// Create an invalid feature id error
    pub fn invalid_fid(fid: impl Into<String>) -> Self {
        DialectError::InvalidFid(fid.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        DialectError::Config(msg.into())
    }
}
