//! Redis Store Module
//!
//! Backing store adapter for a remote Redis server.
//!
//! Physical keys are `{prefix}{namespace}::{key}`. Finite TTLs are written
//! with `SET .. PX`, persistent entries with plain `SET`.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{debug, info};

use crate::error::{CacheError, Result};
use crate::policy::{Ttl, NAMESPACE_SEPARATOR};
use crate::store::{compose_key, StoreAdapter};

const SCAN_BATCH: usize = 200;

// == Redis Store ==
/// Redis adapter over an auto-reconnecting multiplexed connection.
///
/// Cloning is cheap and shares the connection.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisStore {
    // == Connect ==
    /// Connects to `url` (e.g. `redis://redis:6379`).
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self> {
        let client = Client::open(url).map_err(|e| {
            CacheError::Configuration(format!("invalid Redis URL `{}`: {}", url, e))
        })?;
        let conn = ConnectionManager::new(client).await?;
        info!(%url, "Connected to Redis");

        Ok(Self {
            conn,
            prefix: prefix.into(),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn physical_key(&self, namespace: &str, key: &str) -> String {
        compose_key(&self.prefix, namespace, key)
    }

    fn namespace_pattern(&self, namespace: &str) -> String {
        namespace_pattern(&self.prefix, namespace)
    }
}

/// `SCAN MATCH` pattern selecting every physical key of one namespace.
fn namespace_pattern(prefix: &str, namespace: &str) -> String {
    format!(
        "{}{}{}*",
        escape_glob(prefix),
        escape_glob(namespace),
        NAMESPACE_SEPARATOR
    )
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("prefix", &self.prefix)
            .finish()
    }
}

#[async_trait]
impl StoreAdapter for RedisStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(self.physical_key(namespace, key)).await?;
        Ok(value)
    }

    async fn set(&self, namespace: &str, key: &str, value: Vec<u8>, ttl: Ttl) -> Result<()> {
        let mut conn = self.conn.clone();
        let physical = self.physical_key(namespace, key);

        let mut cmd = redis::cmd("SET");
        cmd.arg(&physical).arg(value);
        if let Some(millis) = ttl.as_millis_ceil() {
            cmd.arg("PX").arg(millis);
        }
        let _: () = cmd.query_async(&mut conn).await?;
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.del(self.physical_key(namespace, key)).await?;
        Ok(())
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<usize> {
        let mut conn = self.conn.clone();
        let pattern = self.namespace_pattern(namespace);
        let mut cursor: u64 = 0;
        let mut removed = 0usize;

        // Keys written during the scan may survive it
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let deleted: i64 = conn.del(&keys).await?;
                removed += usize::try_from(deleted).unwrap_or(0);
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(%namespace, removed, "Deleted namespace from Redis");
        Ok(removed)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(CacheError::StoreUnavailable(format!(
                "unexpected PING reply `{}`",
                reply
            )))
        }
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

// == Glob Escaping ==
/// Escapes Redis `MATCH` metacharacters so namespaces match literally.
fn escape_glob(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
