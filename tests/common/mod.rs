#![allow(dead_code)]

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;

use linkcache::domain::ManualClock;
use linkcache::domain::entities::{NewUrlRecord, UrlRecord};
use linkcache::domain::repositories::UrlRepository;
use linkcache::infrastructure::cache::MemoryCache;
use linkcache::infrastructure::persistence::MemoryUrlRepository;
use linkcache::state::{AppState, StateOptions};

/// A URL long enough to pass request validation.
pub const LONG_URL: &str = "https://example.com/very/long/path/value";

pub const USER_AGENT: &str = "integration-test-agent/1.0";

pub fn start_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-03-14T15:09:26Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// In-process stores sharing one manual clock.
pub struct Harness {
    pub clock: ManualClock,
    pub cache: Arc<MemoryCache>,
    pub repository: Arc<MemoryUrlRepository>,
    pub state: AppState,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_options(StateOptions::default())
    }

    pub fn with_options(options: StateOptions) -> Self {
        let clock = ManualClock::new(start_time());
        let cache = Arc::new(MemoryCache::new(Arc::new(clock.clone())));
        let repository = Arc::new(MemoryUrlRepository::new());

        let state = AppState::new(
            repository.clone(),
            cache.clone(),
            Arc::new(clock.clone()),
            options,
        );

        Self {
            clock,
            cache,
            repository,
            state,
        }
    }

    pub fn with_prefix(prefix: &str) -> Self {
        Self::with_options(StateOptions {
            short_url_prefix: prefix.to_string(),
            ..StateOptions::default()
        })
    }

    pub fn with_rate_limit(max_requests: i64, window: Duration) -> Self {
        Self::with_options(StateOptions {
            rate_limit_max_requests: max_requests,
            rate_limit_window: window,
            ..StateOptions::default()
        })
    }

    pub fn advance(&self, delta: TimeDelta) {
        self.clock.advance(delta);
    }

    /// Inserts a record straight into the store, bypassing the cache.
    pub async fn seed(&self, code: &str, url: &str, lifetime: Option<TimeDelta>) -> UrlRecord {
        let created_at = self.clock_now();
        let expire_at = lifetime.map_or(created_at, |l| created_at + l);

        self.repository
            .create(NewUrlRecord {
                original_url: url.to_string(),
                short_code: code.to_string(),
                created_at,
                expire_at,
            })
            .await
            .unwrap()
    }

    pub fn clock_now(&self) -> DateTime<Utc> {
        use linkcache::domain::Clock;
        self.clock.now()
    }
}
