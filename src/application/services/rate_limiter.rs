//! Fixed-window admission control backed by the cache store.

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::infrastructure::cache::CacheStore;
use crate::infrastructure::cache::keys::rate_key;

/// Requests admitted per identity per window.
pub const DEFAULT_MAX_REQUESTS: i64 = 5;

/// Window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Counts requests per caller identity in fixed, non-overlapping windows.
///
/// The window opens on the first request (the increment gives a counter
/// without a TTL the window length) and closes when the counter key expires.
/// Bursts that straddle a window boundary can see up to twice the nominal rate.
///
/// Correctness rests entirely on [`CacheStore::incr_window`] being atomic.
pub struct RateLimiter {
    cache: Arc<dyn CacheStore>,
    max_requests: i64,
    window: Duration,
}

impl RateLimiter {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self {
            cache,
            max_requests: DEFAULT_MAX_REQUESTS,
            window: DEFAULT_WINDOW,
        }
    }

    pub fn with_limits(mut self, max_requests: i64, window: Duration) -> Self {
        self.max_requests = max_requests;
        self.window = window;
        self
    }

    pub fn max_requests(&self) -> i64 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records a request from `caller_identity` and decides whether to admit it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] if the counter cannot be updated.
    /// A failing backend never admits by default.
    pub async fn admit(&self, caller_identity: &str) -> Result<bool, AppError> {
        let key = rate_key(&fingerprint(caller_identity));

        let count = self.cache.incr_window(&key, self.window).await?;

        if count > self.max_requests {
            warn!("Rate limit exceeded: {} ({} requests)", key, count);
            return Ok(false);
        }

        debug!("Admitted {} ({}/{})", key, count, self.max_requests);
        Ok(true)
    }
}

/// Stable, key-safe fingerprint of a caller identity.
pub fn fingerprint(caller_identity: &str) -> String {
    hex::encode(Sha256::digest(caller_identity.as_bytes()))
}
