//! Time-bounded response cache keyed by request URL.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// Upstream forecasts are revalidated every ten minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

#[derive(Debug)]
struct Entry<V> {
    stored_at: Instant,
    value: V,
}

/// Shared between all requests; values are cloned out, so `V` is usually an `Arc`.
#[derive(Debug)]
pub struct ResponseCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry<V>>>,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: RwLock::new(HashMap::new()) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    pub(crate) fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        let age = now.saturating_duration_since(entry.stored_at);
        (age < self.ttl).then(|| entry.value.clone())
    }

    pub(crate) fn insert_at(&self, key: impl Into<String>, value: V, now: Instant) {
        let mut entries = self.entries.write();
        // Expired entries are only ever replaced, so drop them while we hold the lock.
        entries.retain(|_, e| now.saturating_duration_since(e.stored_at) < self.ttl);
        entries.insert(key.into(), Entry { stored_at: now, value });
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
