//! Bearer token checks for inbound requests
//!
//! Provides functions for:
//! - Extracting the token from an `Authorization` header
//! - Comparing it against the configured shared secret

use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use thiserror::Error;

const BEARER: &str = "bearer";

/// Authentication errors
///
/// Callers only ever see "Unauthorized"; the variants exist for logs.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("No bearer token configured on the server")]
    NotConfigured,

    #[error("Missing authentication: Authorization header required")]
    MissingToken,

    #[error("Invalid bearer token")]
    InvalidToken,
}

/// Extract the token from an `Authorization` header value
///
/// A leading `Bearer` (any case) followed by whitespace is stripped. A header
/// without that prefix is taken whole; a missing header yields "".
pub fn extract_bearer_token(auth_header: Option<&str>) -> &str {
    let header = auth_header.unwrap_or("");

    match (header.get(..BEARER.len()), header.get(BEARER.len()..)) {
        (Some(scheme), Some(rest)) if scheme.eq_ignore_ascii_case(BEARER) => {
            let token = rest.trim_start();
            if token.len() < rest.len() {
                token
            } else {
                header
            }
        }
        _ => header,
    }
}

/// Check a raw `Authorization` header against the expected token
///
/// Fails closed: an unset or empty expected token rejects everything,
/// including requests that carry no token at all.
pub fn authorize(auth_header: Option<&str>, expected: Option<&str>) -> bool {
    match expected {
        Some(expected) if !expected.is_empty() => {
            let token = extract_bearer_token(auth_header);
            token.as_bytes().ct_eq(expected.as_bytes()).into()
        }
        _ => false,
    }
}

/// Gate holding the configured shared secret
#[derive(Debug, Clone, Default)]
pub struct AuthGate {
    token: Option<SecretString>,
}

impl AuthGate {
    /// Create a gate; `None` rejects every request
    pub fn new(token: Option<SecretString>) -> Self {
        Self { token }
    }

    /// Whether a non-empty token is configured
    pub fn is_configured(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().is_empty())
    }

    /// Check a raw `Authorization` header
    pub fn check(&self, auth_header: Option<&str>) -> Result<(), AuthError> {
        let expected = self.token.as_ref().map(|t| t.expose_secret());

        if authorize(auth_header, expected) {
            return Ok(());
        }

        if !self.is_configured() {
            Err(AuthError::NotConfigured)
        } else if extract_bearer_token(auth_header).is_empty() {
            Err(AuthError::MissingToken)
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}
