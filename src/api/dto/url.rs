//! DTOs for short code lookups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::UrlRecord;

/// Stored URL together with its record metadata.
#[derive(Debug, Serialize, Deserialize)]
pub struct UrlMetadataResponse {
    pub url: String,
    pub metadata: UrlMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UrlMetadata {
    pub short_code: String,
    pub created_at: DateTime<Utc>,
    /// Absent when the link never expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_at: Option<DateTime<Utc>>,
}

impl From<UrlRecord> for UrlMetadataResponse {
    fn from(record: UrlRecord) -> Self {
        let expire_at = record.has_expiration().then_some(record.expire_at);
        Self {
            url: record.original_url,
            metadata: UrlMetadata {
                short_code: record.short_code,
                created_at: record.created_at,
                expire_at,
            },
        }
    }
}
