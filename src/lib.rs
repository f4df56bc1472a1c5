//! nscache - namespaced cache policies over a remote key-value store
//!
//! Resolves a per-namespace TTL and null policy, encodes values with an
//! embedded type tag, and delegates storage to a pluggable backing store.
//! Cache failures degrade to misses; they never fail the caller.

pub mod codec;
pub mod config;
pub mod error;
pub mod facade;
pub mod policy;
pub mod store;

pub use codec::{Cacheable, TypedJsonCodec};
pub use config::Config;
pub use error::{CacheError, Result};
pub use facade::{CacheFacade, Cached, EvictOutcome, StatsSnapshot, WriteOutcome};
pub use policy::{CachePolicy, PolicyRegistry, PolicyTable, Ttl};
pub use store::{MemoryStore, RedisStore, StoreAdapter};
