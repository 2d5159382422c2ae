//! HTTP interface
//!
//! Exposes the notes dispatcher as a JSON API:
//! - `POST /lender-notes`
//! - `GET /health`

mod api;
mod server;

pub use api::{ApiError, HealthResponse, NotesResponse};
pub use server::{build_router, AppState, WebServer};
