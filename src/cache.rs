//! Keyed TTL cache
//!
//! In-process key-value store with per-entry time-to-live. Expiry is
//! passive: an entry past its TTL is dropped on the read that finds it,
//! never swept in the background.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// Shared TTL cache. Cloning is cheap and clones share the same store.
#[derive(Debug)]
pub struct TtlCache<T> {
    entries: Arc<Mutex<HashMap<String, CacheEntry<T>>>>,
}

impl<T> Clone for TtlCache<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> TtlCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the live value for `key`, dropping it first if expired.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    pub fn set(&self, key: impl Into<String>, value: T, ttl: Duration) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.into(), CacheEntry::new(value, ttl));
    }

    pub fn delete(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key).is_some()
    }

    /// Drops every entry and returns how many were held.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let count = entries.len();
        entries.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}
