//! Store Module
//!
//! Interface to the backing key-value store plus the adapters shipped with
//! the crate: an in-process store and a Redis client.

mod entry;
mod lru;
mod memory;
mod redis;
mod sweeper;

pub use entry::StoredEntry;
pub use lru::LruTracker;
pub use memory::MemoryStore;
pub use self::redis::RedisStore;
pub use sweeper::spawn_sweeper;

use async_trait::async_trait;

use crate::error::{CacheError, Result};
use crate::policy::{Ttl, NAMESPACE_SEPARATOR};

// == Store Adapter ==
/// GET / SET-with-expiry / DELETE over a `(namespace, key)` pair.
///
/// Adapters own their connection state and decide how the pair maps onto a
/// physical key. Expiry is enforced by the store, not by callers.
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    /// Returns the stored bytes, or None on a miss.
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>>;

    /// Writes the bytes; `Ttl::NoExpiry` keeps them until deleted.
    async fn set(&self, namespace: &str, key: &str, value: Vec<u8>, ttl: Ttl) -> Result<()>;

    /// Removes the entry. Deleting an absent key is not an error.
    async fn delete(&self, namespace: &str, key: &str) -> Result<()>;

    /// Removes every entry of a namespace, returning how many were deleted.
    ///
    /// Best-effort and not atomic; adapters without a prefix scan leave the
    /// default.
    async fn delete_namespace(&self, _namespace: &str) -> Result<usize> {
        Err(CacheError::Unsupported("delete_namespace"))
    }

    /// Round trip used for health checks.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    /// Short adapter name for logs.
    fn name(&self) -> &'static str;
}

// == Key Composition ==
/// Builds the physical key `{prefix}{namespace}::{key}`.
pub fn compose_key(prefix: &str, namespace: &str, key: &str) -> String {
    let mut physical =
        String::with_capacity(prefix.len() + namespace.len() + NAMESPACE_SEPARATOR.len() + key.len());
    physical.push_str(prefix);
    physical.push_str(namespace);
    physical.push_str(NAMESPACE_SEPARATOR);
    physical.push_str(key);
    physical
}
