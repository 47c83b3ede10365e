//! Cache store used for read-through lookups and rate-limit counters.
//!
//! Provides a [`CacheStore`] trait with two implementations:
//! - [`RedisCache`] - Production Redis-backed store
//! - [`MemoryCache`] - In-process store for single-node runs and tests
//!
//! Key prefixes live in [`keys`].

pub mod keys;
mod memory_cache;
mod redis_cache;
mod service;

pub use memory_cache::MemoryCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheStore};
