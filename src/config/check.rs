//! Deployment self-check
//!
//! Summarizes what a configuration and credential vault will do at runtime
//! without printing any secret value.

use super::{Config, ConfigError};
use crate::router::{CredentialVault, Platform};
use crate::CredentialPair;
use std::fmt;

/// Report over a configuration and the vault built from it
pub struct ConfigCheck<'a> {
    config: &'a Config,
    vault: &'a CredentialVault,
}

impl<'a> ConfigCheck<'a> {
    /// Create a check
    pub fn new(config: &'a Config, vault: &'a CredentialVault) -> Self {
        Self { config, vault }
    }

    /// Store aliases pointing at buckets the vault lacks
    pub fn dangling(&self) -> Vec<(&'a str, &'a str)> {
        self.config.stores.dangling(self.vault)
    }

    /// Fail when any store alias cannot be resolved
    pub fn verify(&self) -> Result<(), ConfigError> {
        let dangling = self.dangling();
        if dangling.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(format!(
                "{} store alias(es) point at missing credential buckets",
                dangling.len()
            )))
        }
    }
}

fn pair_status(pair: &CredentialPair) -> &'static str {
    match (pair.username.is_some(), pair.password.is_some()) {
        (true, true) => "ok",
        (false, true) => "missing username",
        (true, false) => "missing password",
        (false, false) => "missing",
    }
}

impl fmt::Display for ConfigCheck<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.config;

        let token = if config.auth.token.is_some() {
            "configured"
        } else {
            "NOT CONFIGURED (every request will be rejected)"
        };
        writeln!(f, "Auth token: {}", token)?;
        writeln!(f, "Listen address: {}", config.server.bind)?;

        writeln!(f, "\nAdapters:")?;
        for platform in Platform::ALL {
            let adapter = config.adapters.get(platform);
            match &adapter.notes_url {
                Some(url) => writeln!(
                    f,
                    "  {:<10} {} (timeout {}s)",
                    platform.as_str(),
                    url,
                    adapter.timeout.as_secs()
                )?,
                None => writeln!(f, "  {:<10} not configured", platform.as_str())?,
            }
        }

        writeln!(f, "\nCredential buckets:")?;
        writeln!(f, "  {:<16} {:<18} {:<18}", "BUCKET", "RouteOne", "CUDL")?;
        for spec in &config.buckets {
            if let Some(bucket) = self.vault.get(&spec.id) {
                writeln!(
                    f,
                    "  {:<16} {:<18} {:<18}",
                    spec.id,
                    pair_status(&bucket.credentials_for(Platform::RouteOne)),
                    pair_status(&bucket.credentials_for(Platform::Cudl)),
                )?;
            }
        }

        writeln!(f, "\nStores:")?;
        writeln!(f, "  {:<24} {:<16}", "STORE", "BUCKET")?;
        for (store_key, bucket_id) in config.stores.iter() {
            let marker = if self.vault.contains(bucket_id) {
                ""
            } else {
                "  <- missing bucket"
            };
            writeln!(f, "  {:<24} {:<16}{}", store_key, bucket_id, marker)?;
        }

        if self.dangling().is_empty() {
            writeln!(f, "\nAll store aliases resolve.")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    const VARS: &[(&str, &str)] = &[
        ("MW_TOKEN", "tok-do-not-print"),
        ("RO_USER_LR1", "ro-lr1-user"),
        ("RO_PASS_LR1", "ro-lr1-secret"),
        ("CU_PASS_LR1", "cu-lr1-secret"),
        ("RO_USER_TEST", "ro-test-user"),
        ("RO_PASS_TEST", "ro-test-secret"),
    ];

    #[test]
    fn test_report_hides_secrets() {
        let config = Config::default().with_lookup(env(VARS)).unwrap();
        let vault = CredentialVault::from_lookup(&config.buckets, env(VARS));
        let report = ConfigCheck::new(&config, &vault).to_string();

        for (_, value) in VARS {
            if value.ends_with("secret") || value.starts_with("tok") {
                assert!(!report.contains(value), "leaked {value}");
            }
        }
        assert!(report.contains("Auth token: configured"));
        assert!(report.contains("LR1_SHARED"));
        assert!(report.contains("missing username"));
        assert!(report.contains("All store aliases resolve."));
    }

    #[test]
    fn test_verify_passes_with_default_tables() {
        let config = Config::default();
        let vault = CredentialVault::from_lookup(&config.buckets, env(&[]));
        let check = ConfigCheck::new(&config, &vault);

        assert!(check.dangling().is_empty());
        assert!(check.verify().is_ok());
        assert!(check.to_string().contains("NOT CONFIGURED"));
    }

    #[test]
    fn test_verify_fails_on_dangling_alias() {
        let mut config = Config::default();
        config.stores = config
            .stores
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .chain([("LR3-Retired".to_string(), "LR3_SHARED".to_string())])
            .collect();
        let vault = CredentialVault::from_lookup(&config.buckets, env(&[]));
        let check = ConfigCheck::new(&config, &vault);

        assert_eq!(check.dangling(), vec![("LR3-Retired", "LR3_SHARED")]);
        let err = check.verify().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("1 store alias(es)"));

        let report = check.to_string();
        let line = report
            .lines()
            .find(|l| l.contains("LR3-Retired"))
            .unwrap();
        assert!(line.ends_with("<- missing bucket"));
        assert!(!report.contains("All store aliases resolve."));
    }
}
