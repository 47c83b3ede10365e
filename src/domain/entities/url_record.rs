//! URL record entity representing a short code mapping.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A persisted mapping from a short code to its original URL.
///
/// `expire_at == created_at` encodes "no expiration". Any other value is later
/// than `created_at` and is compared against the wall clock at read time.
/// Records are immutable once written; the `id` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UrlRecord {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
    pub expire_at: DateTime<Utc>,
}

impl UrlRecord {
    /// Returns true if the record carries a real expiration time.
    pub fn has_expiration(&self) -> bool {
        self.expire_at != self.created_at
    }

    /// Returns true if the record's live window ended strictly before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.has_expiration() && self.expire_at < now
    }

    /// Total lifetime of an expiring record, `None` when it never expires.
    pub fn lifetime(&self) -> Option<TimeDelta> {
        self.has_expiration()
            .then(|| self.expire_at - self.created_at)
    }
}

/// Input data for creating a new URL record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlRecord {
    pub original_url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
    pub expire_at: DateTime<Utc>,
}

impl NewUrlRecord {
    /// Attaches the store-assigned identifier.
    pub fn into_record(self, id: i64) -> UrlRecord {
        UrlRecord {
            id,
            original_url: self.original_url,
            short_code: self.short_code,
            created_at: self.created_at,
            expire_at: self.expire_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(created_at: DateTime<Utc>, expire_at: DateTime<Utc>) -> UrlRecord {
        UrlRecord {
            id: 1,
            original_url: "https://example.com/some/long/path".to_string(),
            short_code: "abc123".to_string(),
            created_at,
            expire_at,
        }
    }

    #[test]
    fn test_record_without_expiration() {
        let now = Utc::now();
        let r = record(now, now);

        assert!(!r.has_expiration());
        assert!(r.lifetime().is_none());
        assert!(!r.is_expired_at(now + TimeDelta::days(3650)));
    }

    #[test]
    fn test_record_expiry_is_strict() {
        let now = Utc::now();
        let r = record(now, now + TimeDelta::minutes(1));

        assert!(r.has_expiration());
        assert_eq!(r.lifetime(), Some(TimeDelta::minutes(1)));
        assert!(!r.is_expired_at(r.expire_at));
        assert!(r.is_expired_at(r.expire_at + TimeDelta::milliseconds(1)));
    }

    #[test]
    fn test_new_record_into_record() {
        let now = Utc::now();
        let new_record = NewUrlRecord {
            original_url: "https://rust-lang.org/learn/get-started".to_string(),
            short_code: "xyz789".to_string(),
            created_at: now,
            expire_at: now,
        };

        let r = new_record.clone().into_record(42);
        assert_eq!(r.id, 42);
        assert_eq!(r.short_code, new_record.short_code);
        assert_eq!(r.original_url, new_record.original_url);
        assert_eq!(r.created_at, now);
    }
}
