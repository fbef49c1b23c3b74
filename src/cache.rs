//! Time-bounded in-memory response cache
//!
//! One cache belongs to one client; nothing is shared between clients, even
//! for the same provider. Expired entries are evicted lazily on lookup and
//! swept in bulk once the map grows past [`CACHE_SWEEP_THRESHOLD`].

use crate::{constants::CACHE_SWEEP_THRESHOLD, endpoint::Fingerprint};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Source of the current instant, injectable for simulated time
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// Fingerprint-keyed store of successful response bodies
pub struct ResponseCache {
    /// `None` disables caching
    ttl: Option<Duration>,
    entries: Mutex<HashMap<Fingerprint, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    /// Creates a cache; a zero TTL is the same as no TTL
    pub fn new(ttl: Option<Duration>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl: ttl.filter(|ttl| !ttl.is_zero()),
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Locks the map, taking it over if a previous holder panicked
    fn entries(&self) -> MutexGuard<'_, HashMap<Fingerprint, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Response cache lock was poisoned, recovering");
            self.entries.clear_poison();
            poisoned.into_inner()
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.ttl.is_some()
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Returns a copy of the stored value while it is fresh
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Value> {
        self.ttl?;
        let now = self.clock.now();
        let mut entries = self.entries();

        match entries.get(fingerprint) {
            Some(entry) if now < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(fingerprint);
                tracing::debug!(fingerprint = %fingerprint, "Evicted expired cache entry");
                None
            }
            None => None,
        }
    }

    /// Stores a copy of `value` with the configured TTL
    pub fn put(&self, fingerprint: Fingerprint, value: &Value) {
        if let Some(ttl) = self.ttl {
            self.put_with_ttl(fingerprint, value, ttl);
        }
    }

    /// Stores a copy of `value`, replacing any previous entry for the key
    pub fn put_with_ttl(&self, fingerprint: Fingerprint, value: &Value, ttl: Duration) {
        let now = self.clock.now();
        let mut entries = self.entries();

        if entries.len() >= CACHE_SWEEP_THRESHOLD {
            entries.retain(|_, entry| now < entry.expires_at);
        }
        entries.insert(
            fingerprint,
            CacheEntry {
                value: value.clone(),
                expires_at: now + ttl,
            },
        );
    }

    /// Drops every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| now < entry.expires_at);
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
