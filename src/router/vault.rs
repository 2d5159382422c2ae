//! Process-wide credential buckets
//!
//! Buckets are read from the environment once at startup. Each bucket has an
//! env suffix; the RouteOne pair of bucket `LR1_SHARED` with suffix `LR1`
//! comes from `RO_USER_LR1` / `RO_PASS_LR1`, the CUDL pair from
//! `CU_USER_LR1` / `CU_PASS_LR1`.

use super::Platform;
use crate::{CredentialPair, Secret};
use std::collections::HashMap;

/// Declares a bucket and where its credentials live in the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSpec {
    /// Bucket identifier referenced by store aliases (e.g. `LR1_SHARED`)
    pub id: String,
    /// Suffix of the credential environment variables (e.g. `LR1`)
    pub env_suffix: String,
}

impl BucketSpec {
    /// Create a bucket spec
    pub fn new(id: impl Into<String>, env_suffix: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            env_suffix: env_suffix.into(),
        }
    }

    /// Buckets of the standard deployment
    pub fn defaults() -> Vec<BucketSpec> {
        [
            ("LR1_SHARED", "LR1"),
            ("LR2_SHARED", "LR2"),
            ("LR5_SHARED", "LR5"),
            ("LR7_SHARED", "LR7"),
            ("LR11_SHARED", "LR11"),
            ("LR12_SHARED", "LR12"),
            ("TEST", "TEST"),
        ]
        .into_iter()
        .map(|(id, suffix)| BucketSpec::new(id, suffix))
        .collect()
    }

    /// Environment variable holding the username for a platform
    pub fn username_var(&self, platform: Platform) -> String {
        format!("{}_USER_{}", platform.env_prefix(), self.env_suffix)
    }

    /// Environment variable holding the password for a platform
    pub fn password_var(&self, platform: Platform) -> String {
        format!("{}_PASS_{}", platform.env_prefix(), self.env_suffix)
    }
}

/// Credential pairs of one tenant grouping, keyed by platform
#[derive(Debug, Clone, Default)]
pub struct CredentialBucket {
    pairs: HashMap<Platform, CredentialPair>,
}

impl CredentialBucket {
    /// Create an empty bucket
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pair for a platform
    pub fn with_pair(mut self, platform: Platform, pair: CredentialPair) -> Self {
        self.pairs.insert(platform, pair);
        self
    }

    /// The pair for a platform
    ///
    /// Never fails: a platform the bucket knows nothing about yields an empty
    /// pair, and the adapter decides whether that is fatal.
    pub fn credentials_for(&self, platform: Platform) -> CredentialPair {
        self.pairs.get(&platform).cloned().unwrap_or_default()
    }
}

/// Immutable map of bucket id to credential bucket
#[derive(Debug, Clone, Default)]
pub struct CredentialVault {
    buckets: HashMap<String, CredentialBucket>,
}

impl CredentialVault {
    /// Create an empty vault
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bucket
    pub fn with_bucket(mut self, id: impl Into<String>, bucket: CredentialBucket) -> Self {
        self.buckets.insert(id.into(), bucket);
        self
    }

    /// Build the vault from the process environment
    pub fn from_env(specs: &[BucketSpec]) -> Self {
        Self::from_lookup(specs, |name| std::env::var(name).ok())
    }

    /// Build the vault using an arbitrary variable lookup
    ///
    /// Empty values count as absent.
    pub fn from_lookup<F>(specs: &[BucketSpec], lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: String| lookup(&name).filter(|v| !v.is_empty());

        let buckets = specs
            .iter()
            .map(|spec| {
                let bucket = Platform::ALL
                    .iter()
                    .fold(CredentialBucket::new(), |bucket, &platform| {
                        let pair = CredentialPair::new(
                            get(spec.username_var(platform)),
                            get(spec.password_var(platform)).map(Secret::from),
                        );
                        bucket.with_pair(platform, pair)
                    });
                (spec.id.clone(), bucket)
            })
            .collect();

        Self { buckets }
    }

    /// Look up a bucket by id
    pub fn get(&self, bucket_id: &str) -> Option<&CredentialBucket> {
        self.buckets.get(bucket_id)
    }

    /// Whether a bucket exists
    pub fn contains(&self, bucket_id: &str) -> bool {
        self.buckets.contains_key(bucket_id)
    }

    /// Bucket ids, sorted
    pub fn bucket_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.buckets.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether the vault holds no buckets
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
