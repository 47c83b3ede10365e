//! Caller identity extraction from HTTP request headers.

use axum::http::{HeaderMap, header};

/// Returns the `User-Agent` header value, or an empty string when it is
/// missing.
///
/// The value identifies a caller for rate limiting and seeds the uniqueness
/// token. Header bytes are decoded as ISO-8859-1, so distinct raw values
/// (including obs-text bytes above 0x7f) always map to distinct identities
/// and visible ASCII passes through unchanged.
pub fn extract_user_agent(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .map(|v| v.as_bytes().iter().copied().map(char::from).collect())
        .unwrap_or_default()
}
