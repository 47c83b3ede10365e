//! In-process URL repository.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// A [`UrlRepository`] backed by a `HashMap`, with the same uniqueness rule as
/// the PostgreSQL table.
///
/// Counts lookups so callers can observe how often the cache fell through to
/// the store.
#[derive(Default)]
pub struct MemoryUrlRepository {
    records: Mutex<HashMap<String, UrlRecord>>,
    next_id: AtomicI64,
    lookups: AtomicUsize,
}

impl MemoryUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of [`UrlRepository::find_by_code`] calls served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UrlRepository for MemoryUrlRepository {
    async fn create(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);

        if records.contains_key(&new_record.short_code) {
            return Err(AppError::collision(
                "Short code collision detected",
                json!({ "code": new_record.short_code }),
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = new_record.into_record(id);
        records.insert(record.short_code.clone(), record.clone());

        Ok(record)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(code)
            .cloned())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
