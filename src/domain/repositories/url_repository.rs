//! Repository trait for the authoritative URL store.

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::error::AppError;
use async_trait::async_trait;

/// Persistent store contract for URL records.
///
/// The store is the single source of truth; caches layered on top of it are
/// strictly an optimization. Short codes are unique, so a lookup returns at
/// most one record.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryUrlRepository`] - In-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Persists a new record and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Collision`] if the short code is already taken.
    /// Returns [`AppError::Unavailable`] if the store cannot be reached.
    async fn create(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError>;

    /// Finds a record by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] if the store cannot be reached.
    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
