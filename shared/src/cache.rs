//! Time-to-live cache and the request cooldown gate built on it
//!
//! Every "have we seen this recently?" question goes through [`TtlCache`], so
//! staleness rules live in one place.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::clock::Clock;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: DateTime<Utc>,
}

/// Key/value store where every entry expires `ttl` after insertion
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Insert or refresh an entry
    pub fn insert(&mut self, key: K, value: V, now: DateTime<Utc>) {
        self.entries.insert(key, CacheEntry { value, inserted_at: now });
    }

    /// Value for `key` if it has not expired at `now`
    pub fn get_fresh(&self, key: &K, now: DateTime<Utc>) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|entry| now - entry.inserted_at < self.ttl)
            .map(|entry| &entry.value)
    }

    /// Time left before `key` expires, `None` when absent or stale
    pub fn remaining(&self, key: &K, now: DateTime<Utc>) -> Option<Duration> {
        self.entries.get(key).and_then(|entry| {
            let left = self.ttl - (now - entry.inserted_at);
            (left > Duration::zero()).then_some(left)
        })
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| now - entry.inserted_at < ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-key minimum interval between accepted requests.
///
/// Cloning shares the underlying cache.
#[derive(Clone)]
pub struct CooldownGate<K> {
    cache: Arc<Mutex<TtlCache<K, ()>>>,
    clock: Arc<dyn Clock>,
}

impl<K> CooldownGate<K>
where
    K: Eq + Hash + Send,
{
    pub fn new(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: Arc::new(Mutex::new(TtlCache::new(window))),
            clock,
        }
    }

    /// Record `key` and return `Ok(())` when it is outside its cooldown,
    /// otherwise return the time left without touching the entry.
    pub async fn try_acquire(&self, key: K) -> Result<(), Duration> {
        let now = self.clock.now();
        let mut cache = self.cache.lock().await;
        if let Some(left) = cache.remaining(&key, now) {
            return Err(left);
        }
        cache.purge_expired(now);
        cache.insert(key, (), now);
        Ok(())
    }

    /// Forget `key`, letting the next request through immediately
    pub async fn release(&self, key: &K) {
        let mut cache = self.cache.lock().await;
        cache.entries.remove(key);
    }
}
