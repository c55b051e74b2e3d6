//! Error types for data parsing in tempgopher-types.

use thiserror::Error;

/// Errors that can occur when interpreting thermostat wire values.
///
/// This error type does not include transport errors (those belong in
/// tempgopher-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ParseError {
    /// A temperature value was neither a number nor a numeric string.
    #[error("Invalid temperature: {0:?}")]
    InvalidTemperature(String),
}

/// Result type alias using tempgopher-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
