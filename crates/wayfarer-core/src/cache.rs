//! In-process TTL cache for reference data.
//!
//! Every operation takes the current time explicitly, so expiry is
//! deterministic under test.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Default lifetime of a cached reference lookup.
pub const DEFAULT_REFERENCE_TTL_SECS: u64 = 3600;

struct Entry<V> {
    value: V,
    inserted_at: DateTime<Utc>,
}

/// Keys are stored as `{namespace}:{key}`.
pub struct TtlCache<V> {
    namespace: String,
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(namespace: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            namespace: namespace.into(),
            ttl: i64::try_from(ttl_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    fn is_fresh(&self, entry: &Entry<V>, now: DateTime<Utc>) -> bool {
        now - entry.inserted_at < self.ttl
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry<V>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// A fresh value for `key`; expired entries read as absent.
    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Option<V> {
        let entries = self.lock();
        entries
            .get(&self.full_key(key))
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.value.clone())
    }

    pub fn insert(&self, key: &str, value: V, now: DateTime<Utc>) {
        self.lock().insert(
            self.full_key(key),
            Entry {
                value,
                inserted_at: now,
            },
        );
    }

    /// Return the cached value or compute, store and return a new one.
    /// Errors from `load` are passed through and nothing is cached.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: &str, now: DateTime<Utc>, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key, now) {
            return Ok(value);
        }
        let value = load().await?;
        self.insert(key, value.clone(), now);
        Ok(value)
    }

    /// Drop expired entries; returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| now - entry.inserted_at < self.ttl);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
