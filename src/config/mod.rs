//! Configuration system for lender-notes
//!
//! Loads an optional TOML file, then overlays the environment:
//! - `MW_TOKEN`: shared secret callers present as a bearer token
//! - `PORT`: port of the listen address
//! - `ROUTEONE_NOTES_URL`, `CUDL_NOTES_URL`: adapter endpoints
//!
//! Platform credentials are not part of `Config`; they are read into the
//! credential vault using the bucket list configured here.

mod check;
mod types;

pub use check::ConfigCheck;
pub use types::*;

use crate::router::{BucketSpec, CredentialVault, Platform, StoreAliasTable};
use secrecy::SecretString;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use url::Url;

/// Environment variable holding the shared bearer token
pub const TOKEN_ENV: &str = "MW_TOKEN";
/// Environment variable overriding the listen port
pub const PORT_ENV: &str = "PORT";

/// Default adapter request timeout
pub const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Caller authentication
    pub auth: AuthConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Platform adapter endpoints
    pub adapters: AdaptersConfig,
    /// Credential buckets to read from the environment
    pub buckets: Vec<BucketSpec>,
    /// Store key to bucket aliases
    pub stores: StoreAliasTable,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Load configuration from a string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Self::from_raw(raw)
    }

    /// Convert from raw TOML config to validated config
    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let server = raw.server.unwrap_or_default().try_into()?;
        let logging = raw.logging.unwrap_or_default().into();
        let adapters = raw.adapters.unwrap_or_default().try_into()?;

        let buckets = match raw.buckets {
            Some(buckets) => buckets.into_iter().map(BucketSpec::from).collect(),
            None => BucketSpec::defaults(),
        };
        let mut seen = HashSet::new();
        for bucket in &buckets {
            if bucket.id.is_empty() || bucket.env_suffix.is_empty() {
                return Err(ConfigError::Invalid(
                    "Bucket id and env_suffix must not be empty".to_string(),
                ));
            }
            if !seen.insert(bucket.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "Duplicate bucket id: {}",
                    bucket.id
                )));
            }
        }

        let stores = match raw.stores {
            Some(stores) => {
                if stores.keys().any(|k| k.is_empty()) {
                    return Err(ConfigError::Invalid(
                        "Store keys must not be empty".to_string(),
                    ));
                }
                stores.into_iter().collect()
            }
            None => StoreAliasTable::defaults(),
        };

        Ok(Self {
            server,
            auth: AuthConfig::default(),
            logging,
            adapters,
            buckets,
            stores,
        })
    }

    /// Overlay values from the process environment
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_lookup(|name| std::env::var(name).ok())
    }

    /// Overlay values from an arbitrary variable lookup
    ///
    /// Empty values are ignored.
    pub fn with_lookup<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(token) = get(TOKEN_ENV) {
            self.auth.token = Some(SecretString::from(token));
        }

        if let Some(port) = get(PORT_ENV) {
            let port: u16 = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("Invalid {}: {}", PORT_ENV, port)))?;
            self.server.bind.set_port(port);
        }

        for platform in Platform::ALL {
            if let Some(url) = get(AdaptersConfig::url_env(platform).as_str()) {
                self.adapters.get_mut(platform).notes_url = Some(parse_endpoint(&url)?);
            }
        }

        Ok(self)
    }

    /// Read the credential vault for the configured buckets
    pub fn credential_vault(&self) -> CredentialVault {
        CredentialVault::from_env(&self.buckets)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
            adapters: AdaptersConfig::default(),
            buckets: BucketSpec::defaults(),
            stores: StoreAliasTable::defaults(),
        }
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lender-notes")
            .join("config.toml")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

/// Caller authentication
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Expected bearer token; `None` rejects every request
    pub token: Option<SecretString>,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Format: "json" or "pretty"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format
    Pretty,
    /// JSON format
    Json,
}

/// Endpoints of the platform adapters
#[derive(Debug, Clone, Default)]
pub struct AdaptersConfig {
    pub routeone: AdapterConfig,
    pub cudl: AdapterConfig,
}

impl AdaptersConfig {
    /// Configuration for a platform
    pub fn get(&self, platform: Platform) -> &AdapterConfig {
        match platform {
            Platform::RouteOne => &self.routeone,
            Platform::Cudl => &self.cudl,
        }
    }

    fn get_mut(&mut self, platform: Platform) -> &mut AdapterConfig {
        match platform {
            Platform::RouteOne => &mut self.routeone,
            Platform::Cudl => &mut self.cudl,
        }
    }

    /// Environment variable overriding a platform's endpoint
    pub fn url_env(platform: Platform) -> String {
        format!("{}_NOTES_URL", platform.config_key().to_uppercase())
    }
}

/// One platform adapter's endpoint
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Notes endpoint; unset means the adapter fails every call
    pub notes_url: Option<Url>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            notes_url: None,
            timeout: DEFAULT_ADAPTER_TIMEOUT,
        }
    }
}

/// Parse an adapter endpoint, allowing only http and https
pub(crate) fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::Invalid(format!("Invalid adapter URL '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigError::Invalid(format!(
            "Adapter URL scheme '{}' not allowed. Only http and https are permitted.",
            scheme
        ))),
    }
}
