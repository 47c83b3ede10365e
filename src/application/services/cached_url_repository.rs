//! Cache-aside composition of the cache store and the URL repository.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::Clock;
use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheStore;
use crate::infrastructure::cache::keys::{EXPIRED_SENTINEL, expire_key, short_key};

/// Default upper bound on how long a live record stays cached.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Outcome of a lookup by short code.
///
/// Missing and expired codes are ordinary results, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(UrlRecord),
    Expired,
    NotFound,
}

/// Reads through the cache, falls back to the repository, and caches what it learns.
///
/// # Read path
///
/// 1. `expire:<code>` present: [`Lookup::Expired`], nothing else is consulted.
/// 2. `short:<code>` present and decodable: [`Lookup::Found`] straight from cache.
/// 3. Repository lookup. A record past its expiry gets a permanent
///    `expire:<code>` marker; a live one is cached under `short:<code>` for the
///    lesser of the configured window and the record's own lifetime.
///
/// Cache read failures propagate as [`AppError::Unavailable`]. Cache write
/// failures while populating are logged and swallowed, since the repository
/// already produced the authoritative answer.
///
/// Writes go straight to the repository and never touch the cache.
pub struct CachedUrlRepository<R: ?Sized> {
    repository: Arc<R>,
    cache: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    cache_ttl: Duration,
}

impl<R: UrlRepository + ?Sized> CachedUrlRepository<R> {
    pub fn new(repository: Arc<R>, cache: Arc<dyn CacheStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            cache,
            clock,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Overrides the window applied to records without a shorter lifetime.
    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    /// Resolves a short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] if the cache or the repository cannot
    /// be read.
    pub async fn get_by_short_code(&self, code: &str) -> Result<Lookup, AppError> {
        if self.cache.get(&expire_key(code)).await?.is_some() {
            debug!("Expired marker HIT: {}", code);
            return Ok(Lookup::Expired);
        }

        if let Some(raw) = self.cache.get(&short_key(code)).await? {
            match serde_json::from_str::<UrlRecord>(&raw) {
                Ok(record) => {
                    debug!("Cache HIT: {}", code);
                    return Ok(Lookup::Found(record));
                }
                Err(e) => warn!("Undecodable cache entry for {}: {}", code, e),
            }
        }

        debug!("Cache MISS: {}", code);

        let Some(record) = self.repository.find_by_code(code).await? else {
            return Ok(Lookup::NotFound);
        };

        if record.is_expired_at(self.clock.now()) {
            self.populate(&expire_key(code), EXPIRED_SENTINEL, None)
                .await;
            return Ok(Lookup::Expired);
        }

        match serde_json::to_string(&record) {
            Ok(json) => {
                let ttl = self.ttl_for(&record);
                self.populate(&short_key(code), &json, Some(ttl)).await;
            }
            Err(e) => warn!("Failed to serialize record {}: {}", code, e),
        }

        Ok(Lookup::Found(record))
    }

    /// Persists a new record. The cache is populated lazily by the first read.
    pub async fn create(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError> {
        self.repository.create(new_record).await
    }

    /// Cache lifetime for a live record: the configured window, capped by the
    /// record's own lifetime when it has one.
    fn ttl_for(&self, record: &UrlRecord) -> Duration {
        record
            .lifetime()
            .and_then(|lifetime| lifetime.to_std().ok())
            .map_or(self.cache_ttl, |lifetime| lifetime.min(self.cache_ttl))
    }

    async fn populate(&self, key: &str, value: &str, ttl: Option<Duration>) {
        if let Err(e) = self.cache.set(key, value, ttl).await {
            warn!("Failed to cache {}: {}", key, e);
        }
    }
}
