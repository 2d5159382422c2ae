//! lender-notes - A credential-resolving router for lender application notes
//!
//! Callers name a lending platform, an application and a store. The router
//! picks the credential bucket that belongs to the store, selects the
//! platform's credential pair out of it and hands both to the matching
//! platform adapter. Callers never see or choose platform credentials.

pub mod adapters;
pub mod auth;
pub mod config;
pub mod router;
pub mod server;
pub mod web;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

pub use adapters::AdapterError;
pub use router::Platform;

/// Message returned when any of the three request fields is missing
pub const MISSING_FIELDS_MESSAGE: &str = "platform, applicationId, and storeKey required";

/// Message returned when a failure carries no text of its own
pub const FETCH_FAILED_MESSAGE: &str = "fetch failed";

/// Errors produced by the notes pipeline
///
/// Every variant renders as the one-line message shown to the caller.
#[derive(Error, Debug)]
pub enum RouterError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{}", MISSING_FIELDS_MESSAGE)]
    Validation,

    /// Carries the caller's platform text exactly as received
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Unknown storeKey: {0}")]
    UnknownStore(String),

    /// An alias points at a bucket the vault does not hold
    #[error("Missing credential bucket: {0}")]
    MissingBucket(String),

    #[error("{0}")]
    Adapter(#[from] AdapterError),

    #[error("{0}")]
    Internal(String),
}

/// A secret string that never shows up in `Debug` output
#[derive(Debug, Clone)]
pub struct Secret(SecretString);

impl Secret {
    /// Create a new secret from a string
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// Expose the secret value
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Username/password pair for one platform
///
/// Either half may be absent when the deployment never provisioned it. That
/// is only an error once an adapter actually needs the value.
#[derive(Debug, Clone, Default)]
pub struct CredentialPair {
    pub username: Option<String>,
    pub password: Option<Secret>,
}

impl CredentialPair {
    /// Create a pair from optional parts
    pub fn new(username: Option<String>, password: Option<Secret>) -> Self {
        Self { username, password }
    }

    /// Whether both halves are present
    pub fn is_complete(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

/// Inbound body of `POST /lender-notes`
///
/// Fields are optional here so that shape validation can report the fixed
/// message instead of a deserializer error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub platform: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub application_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub store_key: Option<String>,
}

impl NotesRequest {
    /// Parse a raw request body
    ///
    /// Bodies that are not a JSON object become an empty request.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

/// Read a loosely typed field
///
/// Falsy values (`null`, `false`, `0`, `""`) count as absent. Everything else
/// is rendered the way a JavaScript client would stringify it, so `1e3`
/// becomes "1000" and `true` becomes "true".
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.filter(is_truthy).map(|v| loose_text(&v)))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn loose_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(loose_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(RouterError::Unauthorized.to_string(), "Unauthorized");
        assert_eq!(RouterError::Validation.to_string(), MISSING_FIELDS_MESSAGE);
        assert_eq!(
            RouterError::UnsupportedPlatform("dealertrack".to_string()).to_string(),
            "Unsupported platform: dealertrack"
        );
        assert_eq!(
            RouterError::UnknownStore("Nonexistent Store".to_string()).to_string(),
            "Unknown storeKey: Nonexistent Store"
        );
        assert_eq!(
            RouterError::MissingBucket("LR9_SHARED".to_string()).to_string(),
            "Missing credential bucket: LR9_SHARED"
        );
    }

    #[test]
    fn test_secret_hidden_from_debug() {
        let pair = CredentialPair::new(Some("user".to_string()), Some(Secret::new("hunter2")));
        let debug = format!("{:?}", pair);
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));
        assert_eq!(pair.password.as_ref().unwrap().expose(), "hunter2");
        assert!(pair.is_complete());
    }

    #[test]
    fn test_request_from_body() {
        let req = NotesRequest::from_body(
            br#"{"platform":"CUDL","applicationId":"A-1","storeKey":"LR12-Olathe"}"#,
        );
        assert_eq!(req.platform.as_deref(), Some("CUDL"));
        assert_eq!(req.application_id.as_deref(), Some("A-1"));
        assert_eq!(req.store_key.as_deref(), Some("LR12-Olathe"));
    }

    #[test]
    fn test_request_numeric_application_id() {
        let req = NotesRequest::from_body(br#"{"applicationId": 12345}"#);
        assert_eq!(req.application_id.as_deref(), Some("12345"));
        assert!(req.platform.is_none());
    }

    #[test]
    fn test_request_falsy_values_are_absent() {
        let req = NotesRequest::from_body(
            br#"{"platform": false, "applicationId": 0, "storeKey": ""}"#,
        );
        assert!(req.platform.is_none());
        assert!(req.application_id.is_none());
        assert!(req.store_key.is_none());

        let req = NotesRequest::from_body(br#"{"applicationId": 0.0}"#);
        assert!(req.application_id.is_none());
    }

    #[test]
    fn test_request_loose_values_are_stringified() {
        let req = NotesRequest::from_body(
            br#"{"platform": true, "applicationId": 1e3, "storeKey": ["LR1", 2]}"#,
        );
        assert_eq!(req.platform.as_deref(), Some("true"));
        assert_eq!(req.application_id.as_deref(), Some("1000"));
        assert_eq!(req.store_key.as_deref(), Some("LR1,2"));

        let req = NotesRequest::from_body(br#"{"applicationId": 2.5, "storeKey": {"a": 1}}"#);
        assert_eq!(req.application_id.as_deref(), Some("2.5"));
        assert_eq!(req.store_key.as_deref(), Some("[object Object]"));

        let req = NotesRequest::from_body(br#"{"applicationId": -7}"#);
        assert_eq!(req.application_id.as_deref(), Some("-7"));
    }

    #[test]
    fn test_request_garbage_body() {
        let req = NotesRequest::from_body(b"not json");
        assert!(req.platform.is_none());
        assert!(req.application_id.is_none());
        assert!(req.store_key.is_none());

        let req = NotesRequest::from_body(br#"["cudl", "A-1", "LR1-T-Ford"]"#);
        assert!(req.platform.is_none());
        assert!(req.store_key.is_none());

        let req = NotesRequest::from_body(br#"{"platform": null, "storeKey": null}"#);
        assert!(req.platform.is_none());
        assert!(req.store_key.is_none());
    }
}
