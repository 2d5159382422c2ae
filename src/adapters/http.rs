//! HTTP client shared by the platform adapters
//!
//! Each platform is reached through a notes endpoint that takes the
//! application id as a query parameter and authenticates with HTTP Basic
//! credentials taken from the resolved bucket.

use super::AdapterError;
use crate::config::AdapterConfig;
use crate::router::Platform;
use crate::CredentialPair;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Client;
use url::Url;

/// Notes endpoint client for one platform
pub struct HttpNotesClient {
    platform: Platform,
    client: Client,
    notes_url: Option<Url>,
}

impl HttpNotesClient {
    /// Create a client from adapter configuration
    pub fn new(platform: Platform, config: &AdapterConfig) -> Result<Self, AdapterError> {
        let client = Client::builder()
            .user_agent(concat!("lender-notes/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| AdapterError::Failed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            platform,
            client,
            notes_url: config.notes_url.clone(),
        })
    }

    /// Whether an endpoint is configured
    pub fn is_configured(&self) -> bool {
        self.notes_url.is_some()
    }

    /// Build the Basic authorization header value
    fn basic_auth(&self, credentials: &CredentialPair) -> Result<HeaderValue, AdapterError> {
        let username = credentials
            .username
            .as_deref()
            .ok_or_else(|| AdapterError::missing_field(self.platform, "username"))?;
        let password = credentials
            .password
            .as_ref()
            .ok_or_else(|| AdapterError::missing_field(self.platform, "password"))?;

        let encoded = STANDARD.encode(format!("{}:{}", username, password.expose()));
        let mut value = HeaderValue::from_str(&format!("Basic {}", encoded))
            .map_err(|e| AdapterError::Failed(e.to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// Fetch the notes text for an application
    pub async fn fetch(
        &self,
        application_id: &str,
        credentials: &CredentialPair,
    ) -> Result<String, AdapterError> {
        let auth = self.basic_auth(credentials)?;
        let url = self
            .notes_url
            .clone()
            .ok_or(AdapterError::NotConfigured(self.platform))?;

        tracing::debug!(platform = %self.platform, url = %url, "Requesting notes");

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, auth)
            .query(&[("applicationId", application_id)])
            .send()
            .await
            .map_err(|e| AdapterError::Http {
                platform: self.platform,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Upstream {
                platform: self.platform,
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| AdapterError::Http {
            platform: self.platform,
            message: e.to_string(),
        })
    }
}
