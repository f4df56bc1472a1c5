//! Policy Module
//!
//! Maps cache namespaces to their time-to-live and null-caching behaviour.

mod registry;
mod table;
mod ttl;

pub use registry::{CachePolicy, PolicyRegistry, PolicyRegistryBuilder, DEFAULT_TTL, MAX_TTL};
pub use table::{PolicyTable, PolicyTableEntry, TtlSpec};
pub use ttl::Ttl;

use crate::error::{CacheError, Result};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Separator between namespace and key in physical store keys
pub const NAMESPACE_SEPARATOR: &str = "::";

// == Namespace Validation ==
/// Checks that a namespace can be composed into a physical key unambiguously.
///
/// A namespace must be non-empty, free of whitespace, must not contain the
/// `::` separator and must not end with `:`.
pub fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        return Err(CacheError::InvalidKey("namespace cannot be empty".to_string()));
    }
    if namespace.chars().any(char::is_whitespace) {
        return Err(CacheError::InvalidKey(format!(
            "namespace `{}` contains whitespace",
            namespace
        )));
    }
    if namespace.contains(NAMESPACE_SEPARATOR) || namespace.ends_with(':') {
        return Err(CacheError::InvalidKey(format!(
            "namespace `{}` collides with the `{}` separator",
            namespace, NAMESPACE_SEPARATOR
        )));
    }
    Ok(())
}

// == Key Validation ==
/// Checks an entry key against the length limit.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
