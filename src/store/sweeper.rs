//! Expiry Sweeper
//!
//! Background task that periodically purges expired entries from a
//! [`MemoryStore`]. Reads already skip expired entries; the sweeper keeps
//! memory from holding entries nobody asks for again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::MemoryStore;

/// Spawns the sweeper. Abort the returned handle on shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(MemoryStore::new(10_000));
/// let sweeper = spawn_sweeper(store.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// sweeper.abort();
/// ```
pub fn spawn_sweeper(store: Arc<MemoryStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(?interval, "Starting expiry sweeper");

        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let removed = store.purge_expired().await;
            if removed > 0 {
                info!(removed, "Expiry sweep removed entries");
            } else {
                debug!("Expiry sweep found nothing to remove");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Ttl;
    use crate::store::StoreAdapter;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_removes_expired_entries() {
        let store = Arc::new(MemoryStore::new(100));
        store
            .set("balance", "expire_soon", b"v".to_vec(), Ttl::secs(1))
            .await
            .unwrap();

        let handle = spawn_sweeper(store.clone(), Duration::from_secs(1));

        // Paused clock auto-advances while the test sleeps
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(store.is_empty().await, "Expired entry should have been swept");
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_preserves_live_entries() {
        let store = Arc::new(MemoryStore::new(100));
        store
            .set("user", "long_lived", b"v".to_vec(), Ttl::secs(3600))
            .await
            .unwrap();

        let handle = spawn_sweeper(store.clone(), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(store.len().await, 1);
        assert!(store.get("user", "long_lived").await.unwrap().is_some());
        handle.abort();
    }

    #[tokio::test]
    async fn test_sweeper_can_be_aborted() {
        let store = Arc::new(MemoryStore::new(100));
        let handle = spawn_sweeper(store, Duration::from_secs(1));

        handle.abort();

        let result = handle.await;
        assert!(result.unwrap_err().is_cancelled());
    }
}
