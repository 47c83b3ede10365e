//! Business logic services for the application layer.
//!
//! - [`CachedUrlRepository`] - Cache-aside lookups with expired-code marking
//! - [`ShortenerService`] - Short code creation and resolution
//! - [`RateLimiter`] - Fixed-window admission control

pub mod cached_url_repository;
pub mod rate_limiter;
pub mod shortener_service;

pub use cached_url_repository::{CachedUrlRepository, DEFAULT_CACHE_TTL, Lookup};
pub use rate_limiter::RateLimiter;
pub use shortener_service::{NO_EXPIRATION, ShortenedUrl, ShortenerService};
