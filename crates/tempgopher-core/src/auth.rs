//! Credentials attached to API requests.
//!
//! The thermostat server uses HTTP Basic authentication when users are
//! configured and no authentication otherwise. A missing credential is
//! therefore not an error.

use std::fmt;

use base64::prelude::*;

/// An opaque Basic-auth token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    /// Build the token from a user name and password (`base64(user:password)`).
    pub fn from_login(username: &str, password: &str) -> Self {
        Self {
            token: BASE64_STANDARD.encode(format!("{username}:{password}")),
        }
    }

    /// Use an already-encoded token.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("Basic {}", self.token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_token_matches_basic_auth_encoding() {
        let creds = Credentials::from_login("admin", "hunter2");
        assert_eq!(creds.header_value(), "Basic YWRtaW46aHVudGVyMg==");
        assert_eq!(creds, Credentials::from_token("YWRtaW46aHVudGVyMg=="));
    }

    #[test]
    fn test_debug_redacts_token() {
        let creds = Credentials::from_token("c2VjcmV0");
        let printed = format!("{creds:?}");
        assert!(!printed.contains("c2VjcmV0"));
        assert!(printed.contains("redacted"));
    }
}
