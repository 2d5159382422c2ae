//! Store routing and credential resolution
//!
//! Handles:
//! - Normalizing free-form platform names
//! - Resolving store keys to credential buckets
//! - Selecting a platform's credential pair from a bucket

mod platform;
mod resolver;
mod vault;

pub use platform::Platform;
pub use resolver::{CredentialResolver, ResolvedBucket, StoreAliasTable};
pub use vault::{BucketSpec, CredentialBucket, CredentialVault};
