//! Policy Table Module
//!
//! Static `(namespace, ttl, cache_nulls)` table loaded once at process start,
//! either from a JSON file or from the built-in standard set.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CacheError, Result};
use crate::policy::{validate_namespace, CachePolicy, PolicyRegistry, Ttl};

const NO_EXPIRY_KEYWORD: &str = "no-expiry";

// == Ttl Spec ==
/// TTL as written in the table: whole seconds, or the `"no-expiry"` keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TtlSpec {
    Seconds(i64),
    Keyword(String),
}

impl TtlSpec {
    fn to_ttl(&self, namespace: &str) -> Result<Ttl> {
        match self {
            TtlSpec::Seconds(secs) if *secs > 0 => Ok(Ttl::secs(*secs as u64)),
            TtlSpec::Seconds(secs) => Err(CacheError::Configuration(format!(
                "namespace `{}` has non-positive ttl {}",
                namespace, secs
            ))),
            TtlSpec::Keyword(word) if word == NO_EXPIRY_KEYWORD => Ok(Ttl::NoExpiry),
            TtlSpec::Keyword(word) => Err(CacheError::Configuration(format!(
                "namespace `{}` has unknown ttl `{}`, expected seconds or `{}`",
                namespace, word, NO_EXPIRY_KEYWORD
            ))),
        }
    }
}

impl From<Ttl> for TtlSpec {
    fn from(ttl: Ttl) -> Self {
        match ttl {
            Ttl::After(d) => TtlSpec::Seconds(i64::try_from(d.as_secs()).unwrap_or(i64::MAX)),
            Ttl::NoExpiry => TtlSpec::Keyword(NO_EXPIRY_KEYWORD.to_string()),
        }
    }
}

// == Table Entry ==
/// One row of the policy table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTableEntry {
    pub namespace: String,
    pub ttl: TtlSpec,
    #[serde(default)]
    pub cache_nulls: bool,
}

impl PolicyTableEntry {
    fn new(namespace: &str, ttl: Ttl) -> Self {
        Self {
            namespace: namespace.to_string(),
            ttl: ttl.into(),
            cache_nulls: false,
        }
    }
}

// == Policy Table ==
/// Unvalidated policy rows; [`PolicyTable::into_registry`] checks them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyTable {
    entries: Vec<PolicyTableEntry>,
}

impl PolicyTable {
    pub fn new(entries: Vec<PolicyTableEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PolicyTableEntry] {
        &self.entries
    }

    // == Parse ==
    /// Parses a JSON array of table rows.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CacheError::Configuration(format!("invalid policy table: {}", e)))
    }

    /// Reads and parses a policy table file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            CacheError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let table = Self::from_json_str(&raw)?;
        info!(path = %path.display(), entries = table.entries.len(), "Policy table loaded");
        Ok(table)
    }

    // == Standard Table ==
    /// Namespaces used by the banking backend this layer was built for.
    ///
    /// Fast-moving balances live for seconds, listings for minutes, and
    /// near-static reference data for days. No namespace caches nulls.
    pub fn standard() -> Self {
        Self::new(vec![
            PolicyTableEntry::new("transactions:user", Ttl::mins(20)),
            PolicyTableEntry::new("transactions:all", Ttl::mins(15)),
            PolicyTableEntry::new("user", Ttl::mins(10)),
            PolicyTableEntry::new("users:all", Ttl::mins(10)),
            PolicyTableEntry::new("balance", Ttl::secs(10)),
            PolicyTableEntry::new("score", Ttl::mins(15)),
            PolicyTableEntry::new("repaylist", Ttl::mins(10)),
            PolicyTableEntry::new("accountNumber", Ttl::days(10)),
            PolicyTableEntry::new("loanApplications:all", Ttl::days(10)),
            PolicyTableEntry::new("pendingapplications:all", Ttl::days(10)),
            PolicyTableEntry::new("UserApprovedLoan", Ttl::days(10)),
            PolicyTableEntry::new("BankAccountResponseDto", Ttl::days(10)),
            PolicyTableEntry::new("accounts:all", Ttl::days(10)),
            PolicyTableEntry::new("existsuser", Ttl::days(10)),
        ])
    }

    // == Into Registry ==
    /// Validates every row and builds the registry.
    ///
    /// Unlike [`crate::policy::PolicyRegistryBuilder::register`], a table may not
    /// name the same namespace twice.
    pub fn into_registry(self, default_policy: CachePolicy) -> Result<PolicyRegistry> {
        let mut seen = HashSet::new();
        let mut builder = PolicyRegistry::builder().default_policy(default_policy);

        for entry in self.entries {
            validate_namespace(&entry.namespace)
                .map_err(|e| CacheError::Configuration(e.to_string()))?;
            if !seen.insert(entry.namespace.clone()) {
                return Err(CacheError::Configuration(format!(
                    "namespace `{}` is listed more than once",
                    entry.namespace
                )));
            }

            let ttl = entry.ttl.to_ttl(&entry.namespace)?;
            let policy = CachePolicy::new(ttl, entry.cache_nulls)?;
            builder = builder.register(entry.namespace, policy);
        }

        builder.build()
    }
}
