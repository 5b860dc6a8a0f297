//! Error types for phoenix-geo-functions

use phoenix_geo_core::CodecError;
use thiserror::Error;

/// Result type alias using FunctionError
pub type Result<T> = std::result::Result<T, FunctionError>;

/// Function evaluation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FunctionError {
    /// Wrong number of arguments
    #[error("{function} expects {expected} argument(s), got {actual}")]
    Arity {
        function: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Argument of the right arity but an unusable value
    #[error("Invalid argument to {function}: {message}")]
    Argument {
        function: &'static str,
        message: String,
    },

    /// Name matches no registered function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Geometry text could not be parsed
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl FunctionError {
    /// Create an invalid argument error
    pub fn argument(function: &'static str, message: impl Into<String>) -> Self {
        FunctionError::Argument {
            function,
            message: message.into(),
        }
    }
}
