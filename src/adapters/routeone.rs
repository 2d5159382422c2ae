//! RouteOne adapter

use super::{AdapterError, HttpNotesClient, NotesAdapter};
use crate::config::AdapterConfig;
use crate::router::Platform;
use crate::CredentialPair;
use async_trait::async_trait;

/// Fetches application notes from RouteOne
pub struct RouteOneAdapter {
    client: HttpNotesClient,
}

impl RouteOneAdapter {
    /// Create a new RouteOne adapter
    pub fn new(config: &AdapterConfig) -> Result<Self, AdapterError> {
        Ok(Self {
            client: HttpNotesClient::new(Platform::RouteOne, config)?,
        })
    }
}

#[async_trait]
impl NotesAdapter for RouteOneAdapter {
    fn platform(&self) -> Platform {
        Platform::RouteOne
    }

    async fn fetch_notes(
        &self,
        application_id: &str,
        credentials: &CredentialPair,
    ) -> Result<String, AdapterError> {
        self.client.fetch(application_id, credentials).await
    }
}
