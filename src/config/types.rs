//! Raw configuration types for TOML parsing

use super::*;
use serde::Deserialize;
use std::collections::HashMap;

/// Raw configuration as parsed from TOML
#[derive(Debug, Deserialize)]
pub struct RawConfig {
    pub server: Option<RawServerConfig>,
    pub logging: Option<RawLoggingConfig>,
    pub adapters: Option<RawAdaptersConfig>,
    pub buckets: Option<Vec<RawBucket>>,
    pub stores: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawServerConfig {
    pub bind: Option<String>,
}

impl TryFrom<RawServerConfig> for ServerConfig {
    type Error = ConfigError;

    fn try_from(raw: RawServerConfig) -> Result<Self, Self::Error> {
        let bind = match raw.bind {
            Some(bind) => bind.parse().map_err(|_| {
                ConfigError::Invalid(format!("Invalid bind address: {}", bind))
            })?,
            None => ServerConfig::default().bind,
        };

        Ok(Self { bind })
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawLoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl From<RawLoggingConfig> for LoggingConfig {
    fn from(raw: RawLoggingConfig) -> Self {
        Self {
            level: raw.level.unwrap_or_else(|| "info".to_string()),
            format: match raw.format.as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawAdaptersConfig {
    pub routeone: Option<RawAdapterConfig>,
    pub cudl: Option<RawAdapterConfig>,
}

impl TryFrom<RawAdaptersConfig> for AdaptersConfig {
    type Error = ConfigError;

    fn try_from(raw: RawAdaptersConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            routeone: raw.routeone.unwrap_or_default().try_into()?,
            cudl: raw.cudl.unwrap_or_default().try_into()?,
        })
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawAdapterConfig {
    pub notes_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl TryFrom<RawAdapterConfig> for AdapterConfig {
    type Error = ConfigError;

    fn try_from(raw: RawAdapterConfig) -> Result<Self, Self::Error> {
        let notes_url = raw.notes_url.as_deref().map(parse_endpoint).transpose()?;
        let timeout = match raw.timeout_secs {
            Some(0) => {
                return Err(ConfigError::Invalid(
                    "Adapter timeout_secs must be greater than zero".to_string(),
                ))
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_ADAPTER_TIMEOUT,
        };

        Ok(Self { notes_url, timeout })
    }
}

#[derive(Debug, Deserialize)]
pub struct RawBucket {
    pub id: String,
    /// Defaults to the bucket id
    pub env_suffix: Option<String>,
}

impl From<RawBucket> for BucketSpec {
    fn from(raw: RawBucket) -> Self {
        let env_suffix = raw.env_suffix.unwrap_or_else(|| raw.id.clone());
        BucketSpec::new(raw.id, env_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[server]
bind = "127.0.0.1:8181"

[logging]
level = "debug"
format = "json"

[adapters.routeone]
notes_url = "https://bridge.example.com/routeone"
timeout_secs = 15

[[buckets]]
id = "LR1_SHARED"
env_suffix = "LR1"

[[buckets]]
id = "TEST"

[stores]
"LR1-T-Ford" = "LR1_SHARED"
"LR1 - Commercial" = "LR1_SHARED"
"Automation Test Log" = "TEST"
"#;

        let config = Config::parse(toml).unwrap();
        assert_eq!(config.server.bind.to_string(), "127.0.0.1:8181");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(
            config.adapters.routeone.notes_url.as_ref().map(|u| u.as_str()),
            Some("https://bridge.example.com/routeone")
        );
        assert_eq!(config.adapters.routeone.timeout, Duration::from_secs(15));
        assert!(config.adapters.cudl.notes_url.is_none());
        assert_eq!(config.adapters.cudl.timeout, DEFAULT_ADAPTER_TIMEOUT);
        assert_eq!(
            config.buckets,
            vec![BucketSpec::new("LR1_SHARED", "LR1"), BucketSpec::new("TEST", "TEST")]
        );
        assert_eq!(config.stores.len(), 3);
        assert_eq!(config.stores.resolve("LR1 - Commercial"), Some("LR1_SHARED"));
        assert!(config.auth.token.is_none());
    }

    #[test]
    fn test_minimal_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.bind.to_string(), "0.0.0.0:8080");
        assert_eq!(config.buckets, BucketSpec::defaults());
        assert_eq!(config.stores.len(), 8);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_invalid_bind() {
        let err = Config::parse("[server]\nbind = \"localhost\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_duplicate_bucket() {
        let toml = r#"
[[buckets]]
id = "TEST"

[[buckets]]
id = "TEST"
env_suffix = "OTHER"
"#;
        let err = Config::parse(toml).unwrap_err();
        assert!(err.to_string().contains("Duplicate bucket id: TEST"));
    }

    #[test]
    fn test_bad_adapter_scheme() {
        let toml = r#"
[adapters.cudl]
notes_url = "ftp://bridge.example.com/cudl"
"#;
        assert!(matches!(Config::parse(toml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_timeout() {
        let toml = "[adapters.cudl]\ntimeout_secs = 0\n";
        assert!(matches!(Config::parse(toml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_store_key() {
        let toml = "[stores]\n\"\" = \"TEST\"\n";
        assert!(matches!(Config::parse(toml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            Config::parse("[server"),
            Err(ConfigError::ParseError(_))
        ));
    }
}
