//! In-process cache store with clock-driven expiry.

use super::service::{CacheError, CacheResult, CacheStore};
use crate::domain::Clock;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Clock time between sweeps of expired entries.
const SWEEP_PERIOD: TimeDelta = TimeDelta::seconds(60);

/// Stored entry count that forces a sweep regardless of [`SWEEP_PERIOD`].
const MIN_SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

struct Inner {
    entries: HashMap<String, Entry>,
    last_sweep: DateTime<Utc>,
    sweep_threshold: usize,
}

impl Inner {
    /// Inserts `entry` and drops expired entries once a sweep is due.
    ///
    /// A sweep is due when [`SWEEP_PERIOD`] has passed since the last one or
    /// the map reached `sweep_threshold`. The threshold then doubles past the
    /// surviving entry count, so sweeping stays amortized O(1) per write.
    fn insert(&mut self, key: &str, entry: Entry, now: DateTime<Utc>) {
        self.entries.insert(key.to_string(), entry);

        if now - self.last_sweep < SWEEP_PERIOD && self.entries.len() < self.sweep_threshold {
            return;
        }

        let before = self.entries.len();
        self.entries.retain(|_, e| e.is_live(now));
        self.last_sweep = now;
        self.sweep_threshold = (self.entries.len() * 2).max(MIN_SWEEP_THRESHOLD);

        debug!(
            "MemoryCache sweep: dropped {} expired entries",
            before - self.entries.len()
        );
    }
}

/// A [`CacheStore`] kept in process memory.
///
/// Used when Redis is not configured and throughout the test suite. Expiry is
/// evaluated lazily against the injected [`Clock`], so advancing a
/// [`crate::domain::ManualClock`] expires entries without sleeping. Writes
/// periodically sweep out expired entries, so keys that are never read again
/// do not accumulate. All operations take a single mutex, which makes
/// [`CacheStore::incr`] and [`CacheStore::incr_window`] atomic.
pub struct MemoryCache {
    inner: Mutex<Inner>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        debug!("Using MemoryCache (in-process)");
        let now = clock.now();
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                last_sweep: now,
                sweep_threshold: MIN_SWEEP_THRESHOLD,
            }),
            clock,
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deadline(&self, ttl: Duration) -> DateTime<Utc> {
        let delta = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        self.clock
            .now()
            .checked_add_signed(delta)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Remaining time-to-live of a live key.
    ///
    /// Returns `None` for absent keys and `Some(None)` for keys without a TTL.
    pub fn ttl(&self, key: &str) -> Option<Option<Duration>> {
        let now = self.clock.now();
        let inner = self.inner();
        let entry = inner.entries.get(key).filter(|e| e.is_live(now))?;

        Some(
            entry
                .expires_at
                .map(|at| (at - now).to_std().unwrap_or(Duration::ZERO)),
        )
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.inner()
            .entries
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Increments the integer under `key`, keeping its TTL; an expired or
    /// absent key restarts at 1 without one.
    fn increment(&self, key: &str, window: Option<Duration>) -> CacheResult<i64> {
        let now = self.clock.now();
        let window_deadline = window.map(|ttl| self.deadline(ttl));
        let mut inner = self.inner();

        let (current, expires_at) = match inner.entries.get(key) {
            Some(entry) if entry.is_live(now) => {
                let current = entry.value.parse::<i64>().map_err(|_| {
                    CacheError::Operation(format!("value at {} is not an integer", key))
                })?;
                (current, entry.expires_at)
            }
            _ => (0, None),
        };

        let next = current
            .checked_add(1)
            .ok_or_else(|| CacheError::Operation(format!("increment of {} overflows", key)))?;

        inner.insert(
            key,
            Entry {
                value: next.to_string(),
                expires_at: expires_at.or(window_deadline),
            },
            now,
        );
        Ok(next)
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = self.clock.now();
        let mut inner = self.inner();

        match inner.entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                inner.entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        let now = self.clock.now();
        let expires_at = ttl.filter(|t| !t.is_zero()).map(|t| self.deadline(t));

        self.inner().insert(
            key,
            Entry {
                value: value.to_string(),
                expires_at,
            },
            now,
        );
        Ok(())
    }

    async fn incr(&self, key: &str) -> CacheResult<i64> {
        self.increment(key, None)
    }

    async fn incr_window(&self, key: &str, ttl: Duration) -> CacheResult<i64> {
        self.increment(key, Some(ttl).filter(|t| !t.is_zero()))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool> {
        let now = self.clock.now();
        let deadline = self.deadline(ttl);
        let mut inner = self.inner();

        match inner.entries.get_mut(key) {
            Some(entry) if entry.is_live(now) => {
                entry.expires_at = Some(deadline);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn health_check(&self) -> bool {
        true
    }
}
