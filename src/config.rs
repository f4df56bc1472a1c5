//! Configuration Module
//!
//! Loads cache settings from environment variables and builds the policy
//! registry, codec and store they describe.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::codec::{TypedJsonCodec, MAX_ENTRY_BYTES};
use crate::error::{CacheError, Result};
use crate::facade::CacheFacade;
use crate::policy::{CachePolicy, PolicyRegistry, PolicyTable, Ttl};
use crate::store::{spawn_sweeper, MemoryStore, RedisStore, StoreAdapter};

/// Cache layer configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Redis URL; None selects the in-memory store
    pub redis_url: Option<String>,
    /// Prefix prepended to every physical key
    pub key_prefix: String,
    /// Deadline for each store call in milliseconds
    pub store_timeout_ms: u64,
    /// TTL in seconds for namespaces missing from the policy table
    pub default_ttl_secs: u64,
    /// Largest encoded entry accepted by the codec
    pub max_entry_bytes: usize,
    /// Capacity of the in-memory store
    pub memory_max_entries: usize,
    /// In-memory expiry sweep interval in seconds
    pub sweep_interval_secs: u64,
    /// JSON policy table; None selects the standard table
    pub policy_file: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_URL` - Redis server URL (default: unset, in-memory store)
    /// - `KEY_PREFIX` - Physical key prefix (default: empty)
    /// - `STORE_TIMEOUT_MS` - Per-call store deadline (default: 250)
    /// - `DEFAULT_TTL_SECS` - TTL for unregistered namespaces (default: 60)
    /// - `MAX_ENTRY_BYTES` - Encoded entry size limit (default: 1 MiB)
    /// - `MEMORY_MAX_ENTRIES` - In-memory store capacity (default: 10000)
    /// - `SWEEP_INTERVAL_SECS` - In-memory expiry sweep interval (default: 1)
    /// - `POLICY_FILE` - Path to a JSON policy table (default: built-in table)
    ///
    /// A `DEFAULT_TTL_SECS` that is set but not a whole number of seconds is a
    /// configuration error, like any other malformed policy.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            redis_url: non_empty_var("REDIS_URL"),
            key_prefix: env::var("KEY_PREFIX").unwrap_or(defaults.key_prefix),
            store_timeout_ms: parsed_var("STORE_TIMEOUT_MS").unwrap_or(defaults.store_timeout_ms),
            default_ttl_secs: policy_var("DEFAULT_TTL_SECS")?.unwrap_or(defaults.default_ttl_secs),
            max_entry_bytes: parsed_var("MAX_ENTRY_BYTES").unwrap_or(defaults.max_entry_bytes),
            memory_max_entries: parsed_var("MEMORY_MAX_ENTRIES")
                .unwrap_or(defaults.memory_max_entries),
            sweep_interval_secs: parsed_var("SWEEP_INTERVAL_SECS")
                .unwrap_or(defaults.sweep_interval_secs),
            policy_file: non_empty_var("POLICY_FILE").map(PathBuf::from),
        })
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    // == Policy Registry ==
    /// Loads and validates the policy table. Errors here are fatal.
    pub fn policy_registry(&self) -> Result<PolicyRegistry> {
        let table = match &self.policy_file {
            Some(path) => PolicyTable::from_path(path)?,
            None => PolicyTable::standard(),
        };
        let default_policy = CachePolicy::with_ttl(Ttl::secs(self.default_ttl_secs))?;
        table.into_registry(default_policy)
    }

    pub fn codec(&self) -> TypedJsonCodec {
        TypedJsonCodec::new(self.max_entry_bytes)
    }

    // == Build Facade ==
    /// Connects the configured store and assembles the facade.
    ///
    /// Connecting to Redis is bounded by the store timeout.
    /// For the in-memory store an expiry sweeper is spawned as well; it runs
    /// for the lifetime of the runtime.
    pub async fn build_facade(&self) -> Result<CacheFacade> {
        let registry = Arc::new(self.policy_registry()?);
        let codec = Arc::new(self.codec());

        let store: Arc<dyn StoreAdapter> = match &self.redis_url {
            Some(url) => {
                let connect = RedisStore::connect(url, self.key_prefix.clone());
                let redis = tokio::time::timeout(self.store_timeout(), connect)
                    .await
                    .map_err(|_| CacheError::Timeout {
                        op: "connect",
                        after: self.store_timeout(),
                    })??;
                Arc::new(redis)
            }
            None => {
                let memory = Arc::new(MemoryStore::new(self.memory_max_entries));
                spawn_sweeper(memory.clone(), Duration::from_secs(self.sweep_interval_secs.max(1)));
                memory
            }
        };

        info!(
            store = store.name(),
            namespaces = registry.len(),
            timeout_ms = self.store_timeout_ms,
            "Cache facade ready"
        );
        Ok(CacheFacade::new(registry, codec, store).with_timeout(self.store_timeout()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: None,
            key_prefix: String::new(),
            store_timeout_ms: 250,
            default_ttl_secs: 60,
            max_entry_bytes: MAX_ENTRY_BYTES,
            memory_max_entries: 10_000,
            sweep_interval_secs: 1,
            policy_file: None,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Like [`parsed_var`], but a value that is set and does not parse is an error.
fn policy_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match non_empty_var(name) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            CacheError::Configuration(format!("{} must be a positive whole number, got `{}`", name, raw))
        }),
        None => Ok(None),
    }
}
