//! Caller authentication
//!
//! Every caller presents one shared bearer token. There is no open mode: a
//! deployment without a configured token rejects every request.

mod middleware;

pub use middleware::{authorize, extract_bearer_token, AuthError, AuthGate};
