//! Notes dispatcher
//!
//! Runs the per-request pipeline: authenticate, validate, normalize the
//! platform, resolve the store's credential bucket, then call the platform's
//! adapter. Each stage short-circuits; nothing after a failed stage runs.

use crate::adapters::{AdapterError, AdapterRegistry};
use crate::auth::AuthGate;
use crate::config::Config;
use crate::router::{CredentialResolver, Platform};
use crate::{NotesRequest, RouterError, FETCH_FAILED_MESSAGE};
use std::sync::Arc;
use tracing::{field, info, warn, Instrument, Span};
use uuid::Uuid;

/// Request fields after shape validation
#[derive(Debug)]
struct ValidatedRequest<'a> {
    platform: &'a str,
    application_id: &'a str,
    store_key: &'a str,
}

impl<'a> ValidatedRequest<'a> {
    fn from_request(request: &'a NotesRequest) -> Result<Self, RouterError> {
        let present = |field: &'a Option<String>| field.as_deref().filter(|v| !v.is_empty());

        match (
            present(&request.platform),
            present(&request.application_id),
            present(&request.store_key),
        ) {
            (Some(platform), Some(application_id), Some(store_key)) => Ok(Self {
                platform,
                application_id,
                store_key,
            }),
            _ => Err(RouterError::Validation),
        }
    }
}

/// Main notes dispatcher
///
/// Holds only immutable state, so one instance is shared by every request.
#[derive(Debug, Clone)]
pub struct NotesDispatcher {
    /// Caller authentication
    gate: AuthGate,
    /// Store key resolution
    resolver: CredentialResolver,
    /// Platform adapters
    adapters: AdapterRegistry,
}

impl NotesDispatcher {
    /// Create a new dispatcher
    pub fn new(gate: AuthGate, resolver: CredentialResolver, adapters: AdapterRegistry) -> Self {
        Self {
            gate,
            resolver,
            adapters,
        }
    }

    /// Build a dispatcher from configuration and the process environment
    ///
    /// Configuration problems that only matter for some requests are logged
    /// here and reported per request later.
    pub fn from_config(config: &Config) -> Result<Self, AdapterError> {
        let vault = config.credential_vault();
        let resolver = CredentialResolver::new(Arc::new(config.stores.clone()), Arc::new(vault));
        let gate = AuthGate::new(config.auth.token.clone());
        let adapters = AdapterRegistry::from_config(&config.adapters)?;

        if !gate.is_configured() {
            warn!(
                env = crate::config::TOKEN_ENV,
                "No bearer token configured; every request will be rejected"
            );
        }

        for (store_key, bucket_id) in resolver.aliases().dangling(resolver.vault()) {
            warn!(store_key, bucket_id, "Store alias points at a missing credential bucket");
        }

        for platform in Platform::ALL {
            if config.adapters.get(platform).notes_url.is_none() {
                warn!(%platform, "Adapter endpoint not configured");
            }
        }

        info!(
            stores = resolver.aliases().len(),
            buckets = resolver.vault().len(),
            "Notes dispatcher ready"
        );

        Ok(Self::new(gate, resolver, adapters))
    }

    /// Handle one notes request
    pub async fn handle(
        &self,
        request: NotesRequest,
        auth_header: Option<&str>,
    ) -> Result<String, RouterError> {
        let span = tracing::info_span!(
            "lender_notes",
            request_id = %Uuid::new_v4(),
            store_key = field::Empty,
            platform = field::Empty,
        );
        let result = self.dispatch(request, auth_header).instrument(span.clone()).await;

        // Server-side failures are logged when the response is built
        if let Err(
            e @ (RouterError::Validation
            | RouterError::UnsupportedPlatform(_)
            | RouterError::UnknownStore(_)),
        ) = &result
        {
            span.in_scope(|| warn!(error = %e, "Rejected request"));
        }
        result
    }

    async fn dispatch(
        &self,
        request: NotesRequest,
        auth_header: Option<&str>,
    ) -> Result<String, RouterError> {
        if let Err(e) = self.gate.check(auth_header) {
            warn!(reason = %e, "Rejected request");
            return Err(RouterError::Unauthorized);
        }

        let request = ValidatedRequest::from_request(&request)?;
        let span = Span::current();
        span.record("store_key", request.store_key);
        span.record("platform", request.platform);

        let platform = Platform::normalize(request.platform);
        let resolved = self.resolver.resolve(request.store_key)?;

        let platform =
            platform.ok_or_else(|| RouterError::UnsupportedPlatform(request.platform.to_string()))?;
        let adapter = self.adapters.get(platform).ok_or_else(|| {
            RouterError::Internal(format!("No adapter registered for {}", platform))
        })?;
        let credentials = resolved.bucket.credentials_for(platform);

        info!(bucket = resolved.bucket_id, "Fetching notes");

        // Run on its own task so a panicking adapter fails only this request.
        let application_id = request.application_id.to_string();
        let task = tokio::spawn(
            async move { adapter.fetch_notes(&application_id, &credentials).await }
                .in_current_span(),
        );

        let notes = match task.await {
            Ok(result) => result?,
            Err(e) => {
                tracing::error!(error = %e, "Adapter task failed");
                return Err(RouterError::Internal(FETCH_FAILED_MESSAGE.to_string()));
            }
        };

        let notes = notes.trim().to_string();
        info!(chars = notes.len(), "Notes fetched");

        Ok(notes)
    }
}
