//! CUDL adapter

use super::{AdapterError, HttpNotesClient, NotesAdapter};
use crate::config::AdapterConfig;
use crate::router::Platform;
use crate::CredentialPair;
use async_trait::async_trait;

/// Fetches application notes from CUDL
pub struct CudlAdapter {
    client: HttpNotesClient,
}

impl CudlAdapter {
    /// Create a new CUDL adapter
    pub fn new(config: &AdapterConfig) -> Result<Self, AdapterError> {
        Ok(Self {
            client: HttpNotesClient::new(Platform::Cudl, config)?,
        })
    }
}

#[async_trait]
impl NotesAdapter for CudlAdapter {
    fn platform(&self) -> Platform {
        Platform::Cudl
    }

    async fn fetch_notes(
        &self,
        application_id: &str,
        credentials: &CredentialPair,
    ) -> Result<String, AdapterError> {
        self.client.fetch(application_id, credentials).await
    }
}
