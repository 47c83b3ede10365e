//! Cache store trait and error types.

use async_trait::async_trait;
use std::time::Duration;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),
    #[error("Cache operation error: {0}")]
    Operation(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value capability set shared by the read-through cache and the rate limiter.
///
/// A missing key is never an error; [`CacheError`] is reserved for backend
/// failures so callers can tell "store is down" apart from "key absent".
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed store
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process store with clock-driven TTLs
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value and TTL.
    ///
    /// `None` (or a zero duration) means the entry never expires.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()>;

    /// Atomically increments the integer under `key` and returns the new value.
    ///
    /// An absent key is created at 1 with no TTL. An existing TTL is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Operation`] if the stored value is not an integer.
    async fn incr(&self, key: &str) -> CacheResult<i64>;

    /// Atomically increments the counter under `key` and gives it `ttl` if it
    /// has none, returning the new value.
    ///
    /// A counter left without a TTL (for example after an interrupted
    /// [`CacheStore::expire`]) gets one on its next increment, so a fixed
    /// window always closes.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Operation`] if the stored value is not an integer.
    async fn incr_window(&self, key: &str, ttl: Duration) -> CacheResult<i64>;

    /// Sets or overwrites the TTL of an existing key.
    ///
    /// Returns `Ok(false)` without creating anything when the key is absent.
    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool>;

    /// Checks if the cache backend is reachable.
    async fn health_check(&self) -> bool;
}
