//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache layer.
///
/// Everything except [`CacheError::Configuration`] is recoverable: the facade
/// turns it into a miss or a logged no-op instead of surfacing it.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Backing store could not be reached or rejected the command
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Backing store did not answer before the deadline
    #[error("Store operation `{op}` timed out after {after:?}")]
    Timeout { op: &'static str, after: Duration },

    /// Stored bytes are malformed or carry an incompatible type tag
    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    /// Value could not be turned into the wire format
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Encoded entry exceeds the configured size limit
    #[error("Encoded entry is {size} bytes, limit is {limit}")]
    ValueTooLarge { size: usize, limit: usize },

    /// Namespace or key rejected before reaching the store
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Malformed policy table or settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Operation not provided by this store adapter
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}

impl CacheError {
    // == Degradable ==
    /// Returns true when the failure may be swallowed as a miss or no-op.
    pub fn is_degradable(&self) -> bool {
        !matches!(self, CacheError::Configuration(_))
    }

    // == Store Failure ==
    /// Returns true for failures talking to the backing store.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            CacheError::StoreUnavailable(_) | CacheError::Timeout { .. }
        )
    }
}

// == Conversions ==
impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::StoreUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Deserialization(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
