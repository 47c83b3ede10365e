//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and caching.
//!
//! # Modules
//!
//! - [`cache`] - Cache store abstraction (Redis and in-process implementations)
//! - [`persistence`] - PostgreSQL and in-process repository implementations

pub mod cache;
pub mod persistence;
