//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating the cache store,
//! the URL repository and code generation. Services consume repository traits
//! and provide a clean API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::shortener_service::ShortenerService`] - Short code creation and lookup
//! - [`services::cached_url_repository::CachedUrlRepository`] - Cache-aside read path
//! - [`services::rate_limiter::RateLimiter`] - Per-caller request admission

pub mod services;
