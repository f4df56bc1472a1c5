//! Shared test doubles for integration tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use nscache::{CacheError, Result, StoreAdapter, Ttl};

/// One call observed by [`MockStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Get { namespace: String, key: String },
    Set { namespace: String, key: String, value: Vec<u8>, ttl: Ttl },
    Delete { namespace: String, key: String },
}

/// Scriptable in-memory store that records every call.
#[derive(Default)]
pub struct MockStore {
    data: Mutex<HashMap<(String, String), Vec<u8>>>,
    calls: Mutex<Vec<StoreCall>>,
    down: Mutex<bool>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_calls(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, StoreCall::Set { .. }))
            .collect()
    }

    /// Makes every subsequent call fail with `StoreUnavailable`.
    pub fn go_down(&self) {
        *self.down.lock().unwrap() = true;
    }

    /// Drops an entry as if its TTL had run out.
    pub fn expire(&self, namespace: &str, key: &str) {
        self.data
            .lock()
            .unwrap()
            .remove(&(namespace.to_string(), key.to_string()));
    }

    /// Plants raw bytes, bypassing the codec.
    pub fn plant(&self, namespace: &str, key: &str, bytes: &[u8]) {
        self.data
            .lock()
            .unwrap()
            .insert((namespace.to_string(), key.to_string()), bytes.to_vec());
    }

    pub fn contains(&self, namespace: &str, key: &str) -> bool {
        self.data
            .lock()
            .unwrap()
            .contains_key(&(namespace.to_string(), key.to_string()))
    }

    fn check_up(&self) -> Result<()> {
        if *self.down.lock().unwrap() {
            Err(CacheError::StoreUnavailable("mock store is down".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StoreAdapter for MockStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>> {
        self.calls.lock().unwrap().push(StoreCall::Get {
            namespace: namespace.to_string(),
            key: key.to_string(),
        });
        self.check_up()?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }

    async fn set(&self, namespace: &str, key: &str, value: Vec<u8>, ttl: Ttl) -> Result<()> {
        self.calls.lock().unwrap().push(StoreCall::Set {
            namespace: namespace.to_string(),
            key: key.to_string(),
            value: value.clone(),
            ttl,
        });
        self.check_up()?;
        self.data
            .lock()
            .unwrap()
            .insert((namespace.to_string(), key.to_string()), value);
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<()> {
        self.calls.lock().unwrap().push(StoreCall::Delete {
            namespace: namespace.to_string(),
            key: key.to_string(),
        });
        self.check_up()?;
        self.data
            .lock()
            .unwrap()
            .remove(&(namespace.to_string(), key.to_string()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
