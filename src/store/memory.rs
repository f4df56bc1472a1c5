//! In-Memory Store Module
//!
//! Process-local backing store with TTL expiry and LRU capacity eviction.
//! Useful for single-instance deployments, local development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::error::Result;
use crate::policy::Ttl;
use crate::store::{LruTracker, StoreAdapter, StoredEntry};

type SlotKey = (String, String);

#[derive(Debug, Default)]
struct Slots {
    entries: HashMap<SlotKey, StoredEntry>,
    lru: LruTracker<SlotKey>,
}

impl Slots {
    fn remove(&mut self, slot: &SlotKey) -> bool {
        self.lru.remove(slot);
        self.entries.remove(slot).is_some()
    }
}

// == Memory Store ==
/// Bounded in-process store keyed by `(namespace, key)`.
#[derive(Debug)]
pub struct MemoryStore {
    slots: RwLock<Slots>,
    max_entries: usize,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            slots: RwLock::new(Slots::default()),
            max_entries: max_entries.max(1),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    // == Purge Expired ==
    /// Removes every expired entry, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let mut slots = self.slots.write().await;
        let now = Instant::now();

        let expired: Vec<SlotKey> = slots
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(slot, _)| slot.clone())
            .collect();

        for slot in &expired {
            slots.remove(slot);
        }
        expired.len()
    }

    // == Length ==
    /// Number of held entries, expired ones included until purged.
    pub async fn len(&self) -> usize {
        self.slots.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.entries.is_empty()
    }

    /// Remaining lifetime of an entry, for diagnostics.
    pub async fn ttl_remaining(&self, namespace: &str, key: &str) -> Option<std::time::Duration> {
        let slots = self.slots.read().await;
        slots
            .entries
            .get(&(namespace.to_string(), key.to_string()))
            .and_then(StoredEntry::ttl_remaining)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl StoreAdapter for MemoryStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let slot = (namespace.to_string(), key.to_string());
        // Write lock: a hit refreshes LRU order, an expired hit is dropped
        let mut slots = self.slots.write().await;

        let expired = match slots.entries.get(&slot) {
            None => return Ok(None),
            Some(entry) => entry.is_expired(),
        };
        if expired {
            slots.remove(&slot);
            return Ok(None);
        }

        slots.lru.touch(&slot);
        Ok(slots.entries.get(&slot).map(|entry| entry.value.clone()))
    }

    async fn set(&self, namespace: &str, key: &str, value: Vec<u8>, ttl: Ttl) -> Result<()> {
        let slot = (namespace.to_string(), key.to_string());
        let mut slots = self.slots.write().await;

        if !slots.entries.contains_key(&slot) && slots.entries.len() >= self.max_entries {
            if let Some(evicted) = slots.lru.evict_oldest() {
                slots.entries.remove(&evicted);
                debug!(namespace = %evicted.0, key = %evicted.1, "Evicted least recently used entry");
            }
        }

        slots.entries.insert(slot.clone(), StoredEntry::new(value, ttl));
        slots.lru.touch(&slot);
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<()> {
        let slot = (namespace.to_string(), key.to_string());
        self.slots.write().await.remove(&slot);
        Ok(())
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<usize> {
        let mut slots = self.slots.write().await;
        let before = slots.entries.len();

        slots.entries.retain(|(ns, _), _| ns != namespace);
        slots.lru.remove_where(|(ns, _)| ns == namespace);

        Ok(before - slots.entries.len())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new(100);

        store.set("balance", "acct-1", b"42.5".to_vec(), Ttl::secs(10)).await.unwrap();

        assert_eq!(
            store.get("balance", "acct-1").await.unwrap(),
            Some(b"42.5".to_vec())
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = MemoryStore::new(100);
        assert_eq!(store.get("balance", "nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let store = MemoryStore::new(100);

        store.set("user", "42", b"u".to_vec(), Ttl::NoExpiry).await.unwrap();
        store.set("score", "42", b"s".to_vec(), Ttl::NoExpiry).await.unwrap();

        assert_eq!(store.get("user", "42").await.unwrap(), Some(b"u".to_vec()));
        assert_eq!(store.get("score", "42").await.unwrap(), Some(b"s".to_vec()));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let store = MemoryStore::new(100);

        store.set("user", "1", b"old".to_vec(), Ttl::secs(60)).await.unwrap();
        store.set("user", "1", b"new".to_vec(), Ttl::secs(60)).await.unwrap();

        assert_eq!(store.get("user", "1").await.unwrap(), Some(b"new".to_vec()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_and_delete_missing() {
        let store = MemoryStore::new(100);

        store.set("user", "1", b"v".to_vec(), Ttl::secs(60)).await.unwrap();
        store.delete("user", "1").await.unwrap();
        assert_eq!(store.get("user", "1").await.unwrap(), None);

        // Absent keys delete cleanly
        store.delete("user", "1").await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiration() {
        let store = MemoryStore::new(100);

        store.set("balance", "acct-1", b"v".to_vec(), Ttl::secs(10)).await.unwrap();
        assert!(store.get("balance", "acct-1").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(10)).await;

        assert_eq!(store.get("balance", "acct-1").await.unwrap(), None);
        assert!(store.is_empty().await, "Expired entry should be dropped on read");
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_expiry_persists() {
        let store = MemoryStore::new(100);

        store.set("accountNumber", "u-1", b"v".to_vec(), Ttl::NoExpiry).await.unwrap();
        tokio::time::advance(Duration::from_secs(30 * 24 * 3600)).await;

        assert!(store.get("accountNumber", "u-1").await.unwrap().is_some());
        assert_eq!(store.ttl_remaining("accountNumber", "u-1").await, None);
    }

    #[tokio::test]
    async fn test_lru_eviction_at_capacity() {
        let store = MemoryStore::new(3);

        store.set("ns", "k1", b"1".to_vec(), Ttl::NoExpiry).await.unwrap();
        store.set("ns", "k2", b"2".to_vec(), Ttl::NoExpiry).await.unwrap();
        store.set("ns", "k3", b"3".to_vec(), Ttl::NoExpiry).await.unwrap();

        // Reading k1 makes k2 the oldest
        store.get("ns", "k1").await.unwrap();
        store.set("ns", "k4", b"4".to_vec(), Ttl::NoExpiry).await.unwrap();

        assert_eq!(store.len().await, 3);
        assert!(store.get("ns", "k1").await.unwrap().is_some());
        assert_eq!(store.get("ns", "k2").await.unwrap(), None);
        assert!(store.get("ns", "k4").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_namespace() {
        let store = MemoryStore::new(100);

        store.set("users", "1", b"a".to_vec(), Ttl::NoExpiry).await.unwrap();
        store.set("users:all", "page-1", b"b".to_vec(), Ttl::NoExpiry).await.unwrap();
        store.set("users:all", "page-2", b"c".to_vec(), Ttl::NoExpiry).await.unwrap();

        let removed = store.delete_namespace("users:all").await.unwrap();

        assert_eq!(removed, 2);
        assert_eq!(store.len().await, 1);
        assert!(store.get("users", "1").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let store = MemoryStore::new(100);

        store.set("balance", "a", b"1".to_vec(), Ttl::secs(1)).await.unwrap();
        store.set("user", "b", b"2".to_vec(), Ttl::secs(10)).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.get("user", "b").await.unwrap().is_some());
    }
}
