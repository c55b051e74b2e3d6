//! Error types for tempgopher-core.
//!
//! # Recovery policy
//!
//! | Error | Handling |
//! |-------|----------|
//! | [`Error::Unauthorized`] | Ends the session; the front-end asks for credentials. Never retried. |
//! | [`Error::RequestFailed`] | The current tick or merge is skipped; the previous view stays on screen. Never retried. |
//! | [`Error::Validation`] | The edit stays open so the user can correct the input. |
//! | [`Error::UnknownDevice`] / [`Error::NotEditable`] / [`Error::NoPendingEdit`] | Programming or timing error in the caller; nothing changes. |

use std::fmt;

use thiserror::Error;

use crate::view_model::EditField;

/// Errors produced by the API client and the reconciliation engine.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The server answered 401 or 403.
    #[error("Not authorized (HTTP {status})")]
    Unauthorized { status: u16 },

    /// Transport failure, non-success status, or an undecodable body.
    #[error("Request to {url} failed: {reason}")]
    RequestFailed {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// The configured base URL cannot be used.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// No device with this alias is known to the engine.
    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    /// The device's configuration has not been fetched yet.
    #[error("Device {0} cannot be edited right now")]
    NotEditable(String),

    /// Commit was asked for a device that is not being edited.
    #[error("Device {0} has no pending edit")]
    NoPendingEdit(String),

    /// User input could not be turned into a configuration record.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Whether this error must end the session.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Whether this error is a recoverable request failure.
    #[must_use]
    pub fn is_request_failure(&self) -> bool {
        matches!(self, Self::RequestFailed { .. })
    }

    pub(crate) fn request_failed(url: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self::RequestFailed {
            url: url.to_string(),
            status: None,
            reason: reason.to_string(),
        }
    }
}

/// Problems found when turning an edit buffer into a submission.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be a number, got {input:?}")]
    InvalidNumber { field: EditField, input: String },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: EditField, value: f64 },
}

/// Result type for tempgopher-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(Error::Unauthorized { status: 401 }.is_unauthorized());
        assert!(!Error::Unauthorized { status: 403 }.is_request_failure());

        let failed = Error::request_failed("http://t/api/status/", "connection refused");
        assert!(failed.is_request_failure());
        assert!(!failed.is_unauthorized());
        assert_eq!(
            failed.to_string(),
            "Request to http://t/api/status/ failed: connection refused"
        );
    }

    #[test]
    fn test_edit_state_messages() {
        assert_eq!(
            Error::NotEditable("a".to_string()).to_string(),
            "Device a cannot be edited right now"
        );
        assert_eq!(
            Error::NoPendingEdit("a".to_string()).to_string(),
            "Device a has no pending edit"
        );
    }

    #[test]
    fn test_validation_messages() {
        let err: Error = ValidationError::InvalidNumber {
            field: EditField::HighTemp,
            input: "8o".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "high temperature must be a number, got \"8o\"");

        let err = ValidationError::Negative {
            field: EditField::CoolMinutes,
            value: -1.0,
        };
        assert_eq!(err.to_string(), "cooling minutes must not be negative, got -1");
    }
}
