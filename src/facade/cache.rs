//! Cache Facade
//!
//! Every operation is a single store round trip under a deadline. The
//! degrading variants (`get`, `put`, `evict`, `evict_namespace`) never fail:
//! the cache is advisory and the caller can always fall back to the system
//! of record. The `try_*` variants return the underlying error instead.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::codec::{Cacheable, TypedJsonCodec};
use crate::error::{CacheError, Result};
use crate::facade::{Cached, EvictOutcome, FacadeStats, StatsSnapshot, WriteOutcome};
use crate::policy::{validate_key, validate_namespace, CachePolicy, PolicyRegistry};
use crate::store::StoreAdapter;

/// Deadline applied to each store call unless overridden
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(250);

// == Cache Facade ==
/// Namespaced, typed cache in front of a [`StoreAdapter`].
///
/// Cloning shares the registry, codec, store and counters.
#[derive(Clone)]
pub struct CacheFacade {
    registry: Arc<PolicyRegistry>,
    codec: Arc<TypedJsonCodec>,
    store: Arc<dyn StoreAdapter>,
    timeout: Duration,
    stats: Arc<FacadeStats>,
}

impl CacheFacade {
    // == Constructor ==
    pub fn new(
        registry: Arc<PolicyRegistry>,
        codec: Arc<TypedJsonCodec>,
        store: Arc<dyn StoreAdapter>,
    ) -> Self {
        Self {
            registry,
            codec,
            store,
            timeout: DEFAULT_STORE_TIMEOUT,
            stats: Arc::new(FacadeStats::new()),
        }
    }

    /// Overrides the per-call store deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    pub fn policy(&self, namespace: &str) -> &CachePolicy {
        self.registry.resolve(namespace)
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    // == Get ==
    /// Reads an entry stored as `T`.
    ///
    /// Store failures and timeouts become [`Cached::Miss`]. An entry that does
    /// not decode as `T` is logged, evicted best-effort and reported as a miss.
    pub async fn get<T: Cacheable>(&self, namespace: &str, key: &str) -> Cached<T> {
        match self.try_get(namespace, key).await {
            Ok(found) => {
                match &found {
                    Cached::Hit(_) => self.stats.record_hit(),
                    Cached::Null => self.stats.record_null_hit(),
                    Cached::Miss => self.stats.record_miss(),
                }
                found
            }
            Err(CacheError::Deserialization(reason)) => {
                self.stats.record_corrupt();
                self.stats.record_miss();
                warn!(
                    namespace,
                    key,
                    expected = %T::type_tag(),
                    %reason,
                    "corrupt_entry: evicting entry that failed to decode"
                );
                if let Err(e) = self.try_evict(namespace, key).await {
                    debug!(namespace, key, error = %e, "Could not evict corrupt entry");
                }
                Cached::Miss
            }
            Err(e) => {
                self.stats.record_degraded();
                self.stats.record_miss();
                warn!(namespace, key, error = %e, "Cache read degraded to miss");
                Cached::Miss
            }
        }
    }

    /// Reads an entry stored as `T`, returning failures to the caller.
    pub async fn try_get<T: Cacheable>(&self, namespace: &str, key: &str) -> Result<Cached<T>> {
        validate_namespace(namespace)?;
        validate_key(key)?;

        let bytes = self
            .with_deadline("get", self.store.get(namespace, key))
            .await?;

        match bytes {
            None => Ok(Cached::Miss),
            Some(bytes) => match self.codec.decode::<T>(&bytes)? {
                Some(value) => Ok(Cached::Hit(value)),
                None => Ok(Cached::Null),
            },
        }
    }

    // == Put ==
    /// Writes `value` with the namespace TTL.
    ///
    /// `None` is only written when the namespace caches nulls. Failures are
    /// logged and reported as [`WriteOutcome::Degraded`].
    pub async fn put<T: Cacheable>(
        &self,
        namespace: &str,
        key: &str,
        value: Option<&T>,
    ) -> WriteOutcome {
        match self.try_put(namespace, key, value).await {
            Ok(WriteOutcome::SkippedNull) => {
                self.stats.record_skipped_null();
                WriteOutcome::SkippedNull
            }
            Ok(_) => {
                self.stats.record_write();
                WriteOutcome::Stored
            }
            Err(e) => {
                self.stats.record_degraded();
                warn!(namespace, key, error = %e, "Cache write degraded to no-op");
                WriteOutcome::Degraded
            }
        }
    }

    /// Writes `value` with the namespace TTL, returning failures to the caller.
    ///
    /// Returns [`WriteOutcome::Stored`] or [`WriteOutcome::SkippedNull`]. If the
    /// value cannot be encoded, the existing entry is evicted best-effort before
    /// the encoding error is returned.
    pub async fn try_put<T: Cacheable>(
        &self,
        namespace: &str,
        key: &str,
        value: Option<&T>,
    ) -> Result<WriteOutcome> {
        validate_namespace(namespace)?;
        validate_key(key)?;

        let policy = *self.registry.resolve(namespace);
        if value.is_none() && !policy.cache_nulls() {
            debug!(namespace, key, "Skipping null write");
            return Ok(WriteOutcome::SkippedNull);
        }

        let bytes = match self.codec.encode(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                // A failed overwrite must not leave the previous value readable
                if let Err(evict_err) = self
                    .with_deadline("delete", self.store.delete(namespace, key))
                    .await
                {
                    debug!(namespace, key, error = %evict_err, "Stale entry eviction failed");
                }
                return Err(e);
            }
        };
        self.with_deadline("set", self.store.set(namespace, key, bytes, policy.ttl()))
            .await?;
        Ok(WriteOutcome::Stored)
    }

    // == Evict ==
    /// Removes one entry. Failures are logged and reported as degraded.
    pub async fn evict(&self, namespace: &str, key: &str) -> EvictOutcome {
        match self.try_evict(namespace, key).await {
            Ok(()) => {
                self.stats.record_eviction();
                EvictOutcome::Evicted
            }
            Err(e) => {
                self.stats.record_degraded();
                warn!(namespace, key, error = %e, "Cache eviction degraded to no-op");
                EvictOutcome::Degraded
            }
        }
    }

    pub async fn try_evict(&self, namespace: &str, key: &str) -> Result<()> {
        validate_namespace(namespace)?;
        validate_key(key)?;

        self.with_deadline("delete", self.store.delete(namespace, key))
            .await
    }

    // == Evict Namespace ==
    /// Removes every entry of a namespace, best-effort and not atomic.
    ///
    /// Returns the number of removed entries, or None if the store cannot do
    /// it or failed.
    pub async fn evict_namespace(&self, namespace: &str) -> Option<usize> {
        match self.try_evict_namespace(namespace).await {
            Ok(removed) => {
                self.stats.record_eviction();
                Some(removed)
            }
            Err(CacheError::Unsupported(op)) => {
                info!(namespace, store = self.store.name(), op, "Namespace eviction not supported");
                None
            }
            Err(e) => {
                self.stats.record_degraded();
                warn!(namespace, error = %e, "Namespace eviction degraded to no-op");
                None
            }
        }
    }

    /// Namespace scans can be slow; this call is not bounded by the store deadline.
    pub async fn try_evict_namespace(&self, namespace: &str) -> Result<usize> {
        validate_namespace(namespace)?;
        self.store.delete_namespace(namespace).await
    }

    // == Read Through ==
    /// Returns the cached value, or runs `loader` on a miss and caches its result.
    ///
    /// A cached absence short-circuits to `Ok(None)` without calling the
    /// loader. Loader errors propagate unchanged; cache failures never do.
    pub async fn get_or_load<T, F, Fut, E>(
        &self,
        namespace: &str,
        key: &str,
        loader: F,
    ) -> std::result::Result<Option<T>, E>
    where
        T: Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Option<T>, E>>,
    {
        match self.get::<T>(namespace, key).await {
            Cached::Hit(value) => return Ok(Some(value)),
            Cached::Null => return Ok(None),
            Cached::Miss => {}
        }

        let loaded = loader().await?;
        self.put(namespace, key, loaded.as_ref()).await;
        Ok(loaded)
    }

    // == Health ==
    /// Pings the store within the deadline.
    pub async fn ping(&self) -> Result<()> {
        self.with_deadline("ping", self.store.ping()).await
    }

    async fn with_deadline<R>(
        &self,
        op: &'static str,
        call: impl Future<Output = Result<R>>,
    ) -> Result<R> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout {
                op,
                after: self.timeout,
            }),
        }
    }
}

impl std::fmt::Debug for CacheFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheFacade")
            .field("namespaces", &self.registry.len())
            .field("store", &self.store.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}
