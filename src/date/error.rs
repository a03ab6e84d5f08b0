//! Date expression error types

use thiserror::Error;

/// Raised when no date parser accepts a literal
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not parse [{literal}] as date")]
pub struct DateParseError {
    /// The literal that failed to parse
    pub literal: String,
}

impl DateParseError {
    /// Create an error for the given literal
    pub fn new(literal: impl Into<String>) -> Self {
        Self {
            literal: literal.into(),
        }
    }
}

/// Result type for date expression parsing
pub type DateResult<T> = Result<T, DateParseError>;
