//! Facade Module
//!
//! Public get/put/evict surface composing the policy registry, the codec and
//! a store adapter.

mod cache;
mod lookup;
mod stats;


pub use cache::{CacheFacade, DEFAULT_STORE_TIMEOUT};
pub use lookup::{Cached, EvictOutcome, WriteOutcome};
pub use stats::{FacadeStats, StatsSnapshot};
