//! Shared application state injected into handlers and middleware.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{
    CachedUrlRepository, DEFAULT_CACHE_TTL, RateLimiter, ShortenerService,
    rate_limiter::{DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW},
};
use crate::domain::Clock;
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::cache::CacheStore;
use crate::utils::unique_token::UniqueTokenSource;

/// Tunables applied when wiring the services together.
#[derive(Debug, Clone)]
pub struct StateOptions {
    /// Prepended to short codes in create responses.
    pub short_url_prefix: String,
    /// Upper bound on the cache lifetime of a live record.
    pub cache_ttl: Duration,
    pub rate_limit_max_requests: i64,
    pub rate_limit_window: Duration,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self {
            short_url_prefix: String::new(),
            cache_ttl: DEFAULT_CACHE_TTL,
            rate_limit_max_requests: DEFAULT_MAX_REQUESTS,
            rate_limit_window: DEFAULT_WINDOW,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<ShortenerService<dyn UrlRepository>>,
    pub rate_limiter: Arc<RateLimiter>,
    pub repository: Arc<dyn UrlRepository>,
    pub cache: Arc<dyn CacheStore>,
    pub short_url_prefix: String,
}

impl AppState {
    /// Wires the cache-aside repository, shortener and rate limiter over one
    /// repository and one cache store.
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        cache: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
        options: StateOptions,
    ) -> Self {
        let cached = Arc::new(
            CachedUrlRepository::new(repository.clone(), cache.clone(), clock.clone())
                .with_cache_ttl(options.cache_ttl),
        );
        let shortener = Arc::new(ShortenerService::new(
            cached,
            UniqueTokenSource::default(),
            clock,
        ));
        let rate_limiter = Arc::new(
            RateLimiter::new(cache.clone())
                .with_limits(options.rate_limit_max_requests, options.rate_limit_window),
        );

        Self {
            shortener,
            rate_limiter,
            repository,
            cache,
            short_url_prefix: options.short_url_prefix,
        }
    }
}
