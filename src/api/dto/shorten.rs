//! DTOs for the shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL (absolute `http`/`https`, longer than 25 characters).
    #[validate(url(message = "Invalid URL format"))]
    #[validate(length(min = 26, message = "URL must be longer than 25 characters"))]
    pub url: String,

    /// Lifetime in minutes; absent or `0` means the link never expires.
    #[validate(range(min = 0, message = "expire_in must not be negative"))]
    pub expire_in: Option<i64>,
}

/// Response for a created short link.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub message: String,
    pub short_url: String,
    /// `"no expiration"` or `YYYY-MM-DD HH:MM:SS` (UTC).
    pub expire_at: String,
}
