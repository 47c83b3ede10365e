//! Cache key namespace.
//!
//! These prefixes are shared with existing deployments and must not change.

/// Sentinel stored under an expired-marker key.
pub const EXPIRED_SENTINEL: &str = "1";

/// Key of the serialized record for `code`.
pub fn short_key(code: &str) -> String {
    format!("short:{}", code)
}

/// Key of the "backing record is known expired" marker for `code`.
pub fn expire_key(code: &str) -> String {
    format!("expire:{}", code)
}

/// Key of the admission counter for a caller fingerprint.
pub fn rate_key(fingerprint: &str) -> String {
    format!("rate:{}", fingerprint)
}
