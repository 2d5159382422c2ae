//! Store key resolution

use super::{CredentialBucket, CredentialVault};
use crate::RouterError;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Immutable map of store key to bucket id
///
/// Keys match exactly: no trimming, no case folding. Several stores may share
/// one bucket.
#[derive(Debug, Clone, Default)]
pub struct StoreAliasTable {
    aliases: HashMap<String, String>,
}

impl StoreAliasTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an alias
    pub fn with_alias(
        mut self,
        store_key: impl Into<String>,
        bucket_id: impl Into<String>,
    ) -> Self {
        self.aliases.insert(store_key.into(), bucket_id.into());
        self
    }

    /// Stores of the standard deployment
    pub fn defaults() -> Self {
        [
            ("Automation Test Log", "TEST"),
            ("LR1-T-Ford", "LR1_SHARED"),
            ("LR1 - Commercial", "LR1_SHARED"),
            ("LR2-T-Hyundai", "LR2_SHARED"),
            ("LR5-L-Ford", "LR5_SHARED"),
            ("LR7-L-Hyundai", "LR7_SHARED"),
            ("LR11-Montana", "LR11_SHARED"),
            ("LR12-Olathe", "LR12_SHARED"),
        ]
        .into_iter()
        .collect()
    }

    /// Bucket id for a store key
    pub fn resolve(&self, store_key: &str) -> Option<&str> {
        self.aliases.get(store_key).map(String::as_str)
    }

    /// Aliases whose bucket is missing from the vault, sorted by store key
    pub fn dangling(&self, vault: &CredentialVault) -> Vec<(&str, &str)> {
        self.iter()
            .filter(|(_, bucket)| !vault.contains(bucket))
            .collect()
    }

    /// Iterate over `(store_key, bucket_id)` pairs sorted by store key
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect::<BTreeMap<_, _>>()
            .into_iter()
    }

    /// Number of aliases
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StoreAliasTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            aliases: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A bucket found for a store key
#[derive(Debug)]
pub struct ResolvedBucket<'a> {
    pub bucket_id: &'a str,
    pub bucket: &'a CredentialBucket,
}

/// Resolves store keys to credential buckets
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    aliases: Arc<StoreAliasTable>,
    vault: Arc<CredentialVault>,
}

impl CredentialResolver {
    /// Create a new resolver
    pub fn new(aliases: Arc<StoreAliasTable>, vault: Arc<CredentialVault>) -> Self {
        Self { aliases, vault }
    }

    /// Resolve a store key to its bucket
    ///
    /// An unknown store key is the caller's fault; an alias pointing at a
    /// bucket the vault lacks is a deployment fault.
    pub fn resolve(&self, store_key: &str) -> Result<ResolvedBucket<'_>, RouterError> {
        let bucket_id = self
            .aliases
            .resolve(store_key)
            .ok_or_else(|| RouterError::UnknownStore(store_key.to_string()))?;

        let bucket = self
            .vault
            .get(bucket_id)
            .ok_or_else(|| RouterError::MissingBucket(bucket_id.to_string()))?;

        Ok(ResolvedBucket { bucket_id, bucket })
    }

    /// Get a reference to the alias table
    pub fn aliases(&self) -> &StoreAliasTable {
        &self.aliases
    }

    /// Get a reference to the vault
    pub fn vault(&self) -> &CredentialVault {
        &self.vault
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Platform;
    use crate::{CredentialPair, Secret};

    fn resolver() -> CredentialResolver {
        let aliases = StoreAliasTable::new()
            .with_alias("LR1-T-Ford", "LR1_SHARED")
            .with_alias("LR1 - Commercial", "LR1_SHARED")
            .with_alias("Ghost Store", "LR9_SHARED");
        let vault = CredentialVault::new().with_bucket(
            "LR1_SHARED",
            CredentialBucket::new().with_pair(
                Platform::RouteOne,
                CredentialPair::new(Some("ro-lr1".to_string()), Some(Secret::new("pw"))),
            ),
        );
        CredentialResolver::new(Arc::new(aliases), Arc::new(vault))
    }

    #[test]
    fn test_resolve_shared_bucket() {
        let resolver = resolver();
        let a = resolver.resolve("LR1-T-Ford").unwrap();
        let b = resolver.resolve("LR1 - Commercial").unwrap();
        assert_eq!(a.bucket_id, "LR1_SHARED");
        assert_eq!(b.bucket_id, "LR1_SHARED");
        assert_eq!(
            a.bucket.credentials_for(Platform::RouteOne).username.as_deref(),
            Some("ro-lr1")
        );
    }

    #[test]
    fn test_resolve_unknown_store() {
        let err = resolver().resolve("Nonexistent Store").unwrap_err();
        assert!(matches!(err, RouterError::UnknownStore(ref k) if k == "Nonexistent Store"));
    }

    #[test]
    fn test_resolve_is_exact() {
        let resolver = resolver();
        assert!(resolver.resolve("lr1-t-ford").is_err());
        assert!(resolver.resolve(" LR1-T-Ford").is_err());
    }

    #[test]
    fn test_resolve_missing_bucket() {
        let err = resolver().resolve("Ghost Store").unwrap_err();
        assert!(matches!(err, RouterError::MissingBucket(ref b) if b == "LR9_SHARED"));
    }

    #[test]
    fn test_dangling_aliases() {
        let resolver = resolver();
        let dangling = resolver.aliases().dangling(resolver.vault());
        assert_eq!(dangling, vec![("Ghost Store", "LR9_SHARED")]);
    }

    #[test]
    fn test_default_table_matches_default_buckets() {
        let vault = CredentialVault::from_lookup(&crate::router::BucketSpec::defaults(), |_| None);
        let table = StoreAliasTable::defaults();
        assert_eq!(table.len(), 8);
        assert!(table.dangling(&vault).is_empty());
        assert_eq!(table.resolve("Automation Test Log"), Some("TEST"));
        assert_eq!(table.resolve("LR12-Olathe"), Some("LR12_SHARED"));
    }
}
