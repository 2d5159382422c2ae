//! Platform adapters
//!
//! An adapter fetches the notes of one application from one lending
//! platform, given the credential pair the router resolved for it:
//! - RouteOne: `RouteOneAdapter`
//! - CUDL: `CudlAdapter`
//!
//! Adapters are registered in an `AdapterRegistry` keyed by platform, so the
//! dispatcher selects one with a lookup rather than a chain of conditionals.

mod cudl;
mod http;
mod routeone;

pub use cudl::CudlAdapter;
pub use http::HttpNotesClient;
pub use routeone::RouteOneAdapter;

use crate::config::AdaptersConfig;
use crate::router::Platform;
use crate::CredentialPair;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Adapter errors
///
/// The display text is handed to the caller verbatim.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("{0}")]
    MissingCredentials(String),

    #[error("{0} adapter endpoint not configured")]
    NotConfigured(Platform),

    #[error("{platform} request failed: {message}")]
    Http { platform: Platform, message: String },

    #[error("{platform} returned HTTP {status}")]
    Upstream { platform: Platform, status: u16 },

    #[error("{0}")]
    Failed(String),
}

impl AdapterError {
    /// Report a missing credential field for a platform
    pub fn missing_field(platform: Platform, field: &str) -> Self {
        Self::MissingCredentials(format!("{} {} not configured", platform, field))
    }
}

/// A lending platform integration
#[async_trait]
pub trait NotesAdapter: Send + Sync {
    /// The platform this adapter talks to
    fn platform(&self) -> Platform;

    /// Fetch the notes of an application using the given credentials
    async fn fetch_notes(
        &self,
        application_id: &str,
        credentials: &CredentialPair,
    ) -> Result<String, AdapterError>;
}

/// Adapters keyed by platform
///
/// Built once at startup and never mutated.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<Platform, Arc<dyn NotesAdapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in adapters
    pub fn from_config(config: &AdaptersConfig) -> Result<Self, AdapterError> {
        Ok(Self::new()
            .with(Arc::new(RouteOneAdapter::new(&config.routeone)?))
            .with(Arc::new(CudlAdapter::new(&config.cudl)?)))
    }

    /// Register an adapter under its own platform
    pub fn with(mut self, adapter: Arc<dyn NotesAdapter>) -> Self {
        self.adapters.insert(adapter.platform(), adapter);
        self
    }

    /// Get the adapter for a platform
    pub fn get(&self, platform: Platform) -> Option<Arc<dyn NotesAdapter>> {
        self.adapters.get(&platform).cloned()
    }

    /// Registered platforms, sorted
    pub fn platforms(&self) -> Vec<Platform> {
        let mut platforms: Vec<Platform> = self.adapters.keys().copied().collect();
        platforms.sort_unstable();
        platforms
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("platforms", &self.platforms())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Platform);

    #[async_trait]
    impl NotesAdapter for Fixed {
        fn platform(&self) -> Platform {
            self.0
        }

        async fn fetch_notes(
            &self,
            application_id: &str,
            _credentials: &CredentialPair,
        ) -> Result<String, AdapterError> {
            Ok(format!("{}:{}", self.0, application_id))
        }
    }

    #[tokio::test]
    async fn test_registry_lookup() {
        let registry = AdapterRegistry::new()
            .with(Arc::new(Fixed(Platform::RouteOne)))
            .with(Arc::new(Fixed(Platform::Cudl)));

        assert_eq!(registry.platforms(), vec![Platform::RouteOne, Platform::Cudl]);

        let adapter = registry.get(Platform::Cudl).unwrap();
        let notes = adapter
            .fetch_notes("A-1", &CredentialPair::default())
            .await
            .unwrap();
        assert_eq!(notes, "CUDL:A-1");
    }

    #[test]
    fn test_registry_missing_platform() {
        let registry = AdapterRegistry::new().with(Arc::new(Fixed(Platform::RouteOne)));
        assert!(registry.get(Platform::Cudl).is_none());
    }

    #[test]
    fn test_default_registry_has_both_platforms() {
        let registry = AdapterRegistry::from_config(&AdaptersConfig::default()).unwrap();
        assert_eq!(registry.platforms(), Platform::ALL.to_vec());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AdapterError::missing_field(Platform::RouteOne, "username").to_string(),
            "RouteOne username not configured"
        );
        assert_eq!(
            AdapterError::Upstream {
                platform: Platform::Cudl,
                status: 503
            }
            .to_string(),
            "CUDL returned HTTP 503"
        );
    }
}
