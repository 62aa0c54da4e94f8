//! Error types for value parsing

use thiserror::Error;

/// Errors produced when a textual value cannot be turned into a typed one
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("Unsupported value for {parameter}: '{value}'")]
    Unsupported { parameter: String, value: String },

    #[error("Invalid number for {parameter}: '{value}'")]
    InvalidNumber { parameter: String, value: String },
}

impl ValueError {
    /// Create an unsupported-value error
    pub fn unsupported(parameter: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Unsupported {
            parameter: parameter.into(),
            value: value.into(),
        }
    }

    /// Create an invalid-number error
    pub fn invalid_number(parameter: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidNumber {
            parameter: parameter.into(),
            value: value.into(),
        }
    }

    /// Name of the parameter the value was supplied for
    pub fn parameter(&self) -> &str {
        match self {
            Self::Unsupported { parameter, .. } | Self::InvalidNumber { parameter, .. } => parameter,
        }
    }
}

/// Result type for value parsing
pub type ValueResult<T> = Result<T, ValueError>;
