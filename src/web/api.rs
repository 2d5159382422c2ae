//! JSON API handlers
//!
//! Every failure is reported as `{ "error": "<message>" }` with a status
//! chosen by error kind; success is `{ "notes": "<text>" }`.

use axum::{
    body::Bytes,
    extract::{Json, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{NotesRequest, RouterError, FETCH_FAILED_MESSAGE};

use super::server::AppState;

/// Read the `Authorization` header; non-UTF-8 values count as absent
fn auth_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

/// Whether the request declares a JSON body
///
/// Only `application/json` (with optional parameters) counts.
fn has_json_body(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            error: if error.is_empty() {
                FETCH_FAILED_MESSAGE.to_string()
            } else {
                error
            },
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiError::new(message))).into_response()
}

/// HTTP status for a pipeline error
fn status_for(error: &RouterError) -> StatusCode {
    match error {
        RouterError::Unauthorized => StatusCode::UNAUTHORIZED,
        RouterError::Validation | RouterError::UnsupportedPlatform(_) => StatusCode::BAD_REQUEST,
        RouterError::UnknownStore(_) => StatusCode::NOT_FOUND,
        RouterError::MissingBucket(_) | RouterError::Adapter(_) | RouterError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for RouterError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            tracing::error!(error = %self, "Notes request failed");
        }
        error_response(status, self.to_string())
    }
}

// ============== Lender Notes ==============

#[derive(Debug, Serialize)]
pub struct NotesResponse {
    pub notes: String,
}

/// Fetch notes for an application
///
/// The body is taken raw so that authentication is decided before any
/// payload problem can be reported. A body not declared as JSON is ignored.
pub async fn api_lender_notes(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = if has_json_body(&headers) {
        NotesRequest::from_body(&body)
    } else {
        NotesRequest::default()
    };

    match state.dispatcher.handle(request, auth_header(&headers)).await {
        Ok(notes) => (StatusCode::OK, Json(NotesResponse { notes })).into_response(),
        Err(e) => e.into_response(),
    }
}

// ============== Health Check ==============

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint (no auth required)
pub async fn api_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
