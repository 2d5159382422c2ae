//! Web server implementation using Axum

use crate::server::NotesDispatcher;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::api;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<NotesDispatcher>,
}

/// Build the router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/lender-notes", post(api::api_lender_notes))
        .route("/health", get(api::api_health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP server for the notes API
pub struct WebServer {
    bind: SocketAddr,
    app_state: AppState,
}

impl WebServer {
    /// Create a new web server
    pub fn new(bind: SocketAddr, dispatcher: NotesDispatcher) -> Self {
        Self {
            bind,
            app_state: AppState {
                dispatcher: Arc::new(dispatcher),
            },
        }
    }

    /// Run the web server until Ctrl+C
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let router = build_router(self.app_state);
        let listener = tokio::net::TcpListener::bind(self.bind).await?;

        tracing::info!(bind = %self.bind, "lender-notes listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
