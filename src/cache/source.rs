//! In-memory cache of raw provider payloads
//!
//! One `SourceCache` exists per upstream provider, each with its own TTL.
//! Entries are keyed by [`CoordinateKey`] and bounded by an LRU capacity.
//! Concurrent misses for the same key are serialised so only one of them
//! reaches the provider; the others reuse its entry.

use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

use crate::data::CoordinateKey;

/// A cached payload and the instant it was fetched
#[derive(Debug, Clone)]
struct SourceEntry<T> {
    data: T,
    fetched_at: DateTime<Utc>,
}

impl<T> SourceEntry<T> {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.fetched_at < ttl
    }
}

/// Per-provider payload cache with a fixed time-to-live
pub struct SourceCache<T> {
    provider: &'static str,
    ttl: Duration,
    entries: Mutex<LruCache<CoordinateKey, SourceEntry<T>>>,
    /// One gate per key with a fetch in progress
    in_flight: Mutex<HashMap<CoordinateKey, Arc<AsyncMutex<()>>>>,
}

impl<T: Clone> SourceCache<T> {
    pub fn new(provider: &'static str, ttl: Duration, capacity: NonZeroUsize) -> Self {
        Self {
            provider,
            ttl,
            entries: Mutex::new(LruCache::new(capacity)),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// When the entry for `key` was fetched, fresh or not
    pub fn fetched_at(&self, key: &CoordinateKey) -> Option<DateTime<Utc>> {
        self.entries.lock().peek(key).map(|entry| entry.fetched_at)
    }

    /// Return the cached payload for `key`, fetching it when missing or stale
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &CoordinateKey, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.get_or_fetch_at(key, Utc::now(), fetch).await
    }

    /// [`get_or_fetch`](Self::get_or_fetch) evaluated at the instant `now`
    ///
    /// A failed fetch leaves the cache untouched and returns the fetch error.
    pub async fn get_or_fetch_at<F, Fut, E>(
        &self,
        key: &CoordinateKey,
        now: DateTime<Utc>,
        fetch: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(data) = self.lookup(key, now) {
            debug!(provider = self.provider, %key, "source cache hit");
            return Ok(data);
        }

        let gate = {
            let mut in_flight = self.in_flight.lock();
            Arc::clone(in_flight.entry(key.clone()).or_default())
        };

        let result = {
            let _turn = gate.lock().await;

            // Another caller may have filled the entry while we waited
            if let Some(data) = self.lookup(key, now) {
                debug!(provider = self.provider, %key, "source cache filled while waiting");
                Ok(data)
            } else {
                debug!(provider = self.provider, %key, "source cache miss");
                let fetched = fetch().await;
                if let Ok(data) = &fetched {
                    self.store(key, data.clone(), now);
                }
                fetched
            }
        };

        self.release(key, &gate);
        result
    }

    /// Remove entries that are no longer fresh at `now`, returning how many
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock();
        let expired: Vec<CoordinateKey> = entries
            .iter()
            .filter(|(_, entry)| !entry.is_fresh(now, self.ttl))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            entries.pop(key);
        }

        expired.len()
    }

    fn lookup(&self, key: &CoordinateKey, now: DateTime<Utc>) -> Option<T> {
        let mut entries = self.entries.lock();
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| entry.data.clone())
    }

    fn store(&self, key: &CoordinateKey, data: T, fetched_at: DateTime<Utc>) {
        let evicted = self
            .entries
            .lock()
            .push(key.clone(), SourceEntry { data, fetched_at });

        if let Some((evicted_key, _)) = evicted.filter(|(evicted_key, _)| evicted_key != key) {
            debug!(provider = self.provider, key = %evicted_key, "evicted least recently used entry");
        }
    }

    fn release(&self, key: &CoordinateKey, gate: &Arc<AsyncMutex<()>>) {
        let mut in_flight = self.in_flight.lock();
        // Only the map and this caller still hold the gate
        if Arc::strong_count(gate) <= 2
            && in_flight
                .get(key)
                .is_some_and(|current| Arc::ptr_eq(current, gate))
        {
            in_flight.remove(key);
        }
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        self.in_flight.lock().len()
    }
}
