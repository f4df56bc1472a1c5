//! Policy Registry Module
//!
//! Immutable namespace → policy mapping, built once before cache traffic starts.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::error::{CacheError, Result};
use crate::policy::{validate_namespace, Ttl};

/// Default TTL handed to namespaces nobody registered
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Longest finite TTL a policy may carry (100 years)
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

// == Cache Policy ==
/// Expiry and null-handling settings for one namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    ttl: Ttl,
    cache_nulls: bool,
}

impl CachePolicy {
    // == Constructor ==
    /// Creates a policy, rejecting a zero TTL or one longer than [`MAX_TTL`].
    pub fn new(ttl: Ttl, cache_nulls: bool) -> Result<Self> {
        if let Ttl::After(d) = ttl {
            if d.is_zero() {
                return Err(CacheError::Configuration(
                    "ttl must be positive; use Ttl::NoExpiry for persistent entries".to_string(),
                ));
            }
            if d > MAX_TTL {
                return Err(CacheError::Configuration(format!(
                    "ttl {:?} exceeds the maximum of {:?}; use Ttl::NoExpiry for persistent entries",
                    d, MAX_TTL
                )));
            }
        }
        Ok(Self { ttl, cache_nulls })
    }

    /// Policy with the given TTL that never caches absent values.
    pub fn with_ttl(ttl: Ttl) -> Result<Self> {
        Self::new(ttl, false)
    }

    pub fn ttl(&self) -> Ttl {
        self.ttl
    }

    pub fn cache_nulls(&self) -> bool {
        self.cache_nulls
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl: Ttl::After(DEFAULT_TTL),
            cache_nulls: false,
        }
    }
}

// == Policy Registry ==
/// Read-only lookup table from namespace to [`CachePolicy`].
///
/// Safe to share across tasks without synchronization: nothing mutates it
/// after [`PolicyRegistryBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    policies: HashMap<String, CachePolicy>,
    default_policy: CachePolicy,
}

impl PolicyRegistry {
    pub fn builder() -> PolicyRegistryBuilder {
        PolicyRegistryBuilder::default()
    }

    // == Resolve ==
    /// Returns the policy for `namespace`, or the default policy if unregistered.
    ///
    /// Namespaces are case-sensitive.
    pub fn resolve(&self, namespace: &str) -> &CachePolicy {
        self.policies
            .get(namespace)
            .unwrap_or(&self.default_policy)
    }

    pub fn default_policy(&self) -> &CachePolicy {
        &self.default_policy
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.policies.contains_key(namespace)
    }

    /// Registered namespaces in sorted order.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.policies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

// == Builder ==
/// Collects registrations before freezing them into a [`PolicyRegistry`].
#[derive(Debug, Default)]
pub struct PolicyRegistryBuilder {
    policies: HashMap<String, CachePolicy>,
    default_policy: Option<CachePolicy>,
}

impl PolicyRegistryBuilder {
    // == Register ==
    /// Registers a policy. Registering the same namespace again replaces it.
    pub fn register(mut self, namespace: impl Into<String>, policy: CachePolicy) -> Self {
        let namespace = namespace.into();
        if let Some(previous) = self.policies.insert(namespace.clone(), policy) {
            debug!(%namespace, ?previous, ?policy, "Replacing cache policy");
        }
        self
    }

    /// Overrides the policy returned for unregistered namespaces.
    pub fn default_policy(mut self, policy: CachePolicy) -> Self {
        self.default_policy = Some(policy);
        self
    }

    // == Build ==
    /// Validates every namespace and freezes the registry.
    pub fn build(self) -> Result<PolicyRegistry> {
        for namespace in self.policies.keys() {
            validate_namespace(namespace)
                .map_err(|e| CacheError::Configuration(e.to_string()))?;
        }

        Ok(PolicyRegistry {
            policies: self.policies,
            default_policy: self.default_policy.unwrap_or_default(),
        })
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn policy(secs: u64) -> CachePolicy {
        CachePolicy::with_ttl(Ttl::secs(secs)).unwrap()
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let result = CachePolicy::new(Ttl::After(Duration::ZERO), false);
        assert!(matches!(result, Err(CacheError::Configuration(_))));
    }

    #[test]
    fn test_ttl_above_maximum_rejected() {
        let result = CachePolicy::new(Ttl::After(MAX_TTL + Duration::from_secs(1)), false);
        assert!(matches!(result, Err(CacheError::Configuration(_))));

        let at_limit = CachePolicy::with_ttl(Ttl::After(MAX_TTL)).unwrap();
        assert_eq!(at_limit.ttl().as_millis_ceil(), Some(MAX_TTL.as_millis() as u64));
    }

    #[test]
    fn test_no_expiry_accepted() {
        let p = CachePolicy::new(Ttl::NoExpiry, true).unwrap();
        assert_eq!(p.ttl(), Ttl::NoExpiry);
        assert!(p.cache_nulls());
    }

    #[test]
    fn test_resolve_registered() {
        let registry = PolicyRegistry::builder()
            .register("balance", policy(10))
            .register("accountNumber", CachePolicy::with_ttl(Ttl::days(10)).unwrap())
            .build()
            .unwrap();

        assert_eq!(registry.resolve("balance").ttl(), Ttl::secs(10));
        assert_eq!(registry.resolve("accountNumber").ttl(), Ttl::days(10));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_resolve_unregistered_falls_back() {
        let registry = PolicyRegistry::builder()
            .register("balance", policy(10))
            .build()
            .unwrap();

        let fallback = registry.resolve("unknown");
        assert_eq!(fallback, &CachePolicy::default());
        assert_eq!(fallback.ttl(), Ttl::After(DEFAULT_TTL));
        assert!(!fallback.cache_nulls());
    }

    #[test]
    fn test_namespaces_are_case_sensitive() {
        let registry = PolicyRegistry::builder()
            .register("balance", policy(10))
            .build()
            .unwrap();

        assert!(registry.contains("balance"));
        assert!(!registry.contains("Balance"));
        assert_eq!(registry.resolve("Balance"), registry.default_policy());
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = PolicyRegistry::builder()
            .register("user", policy(60))
            .register("user", policy(600))
            .build()
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("user").ttl(), Ttl::secs(600));
    }

    #[test]
    fn test_custom_default_policy() {
        let registry = PolicyRegistry::builder()
            .default_policy(policy(5))
            .build()
            .unwrap();

        assert!(registry.is_empty());
        assert_eq!(registry.resolve("anything").ttl(), Ttl::secs(5));
    }

    #[test]
    fn test_build_rejects_bad_namespace() {
        let result = PolicyRegistry::builder()
            .register("users:", policy(10))
            .build();
        assert!(matches!(result, Err(CacheError::Configuration(_))));
    }

    #[test]
    fn test_namespaces_sorted() {
        let registry = PolicyRegistry::builder()
            .register("user", policy(1))
            .register("balance", policy(1))
            .register("score", policy(1))
            .build()
            .unwrap();

        assert_eq!(registry.namespaces(), vec!["balance", "score", "user"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        // Repeated lookups return the same policy, and anything unregistered
        // gets the default.
        #[test]
        fn prop_resolution_is_deterministic(
            entries in prop::collection::hash_map("[a-z]{1,12}", 1u64..1_000_000, 0..20),
            probe in "[A-Z]{1,12}",
        ) {
            let mut builder = PolicyRegistry::builder();
            for (ns, secs) in &entries {
                builder = builder.register(ns.clone(), policy(*secs));
            }
            let registry = builder.build().unwrap();

            for (ns, secs) in &entries {
                let first = *registry.resolve(ns);
                let second = *registry.resolve(ns);
                prop_assert_eq!(first, second);
                prop_assert_eq!(first.ttl(), Ttl::secs(*secs));
            }

            // Upper-case probes never collide with the lower-case registrations
            prop_assert_eq!(registry.resolve(&probe), registry.default_policy());
        }
    }
}
