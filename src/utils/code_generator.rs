//! Short code generation.
//!
//! A short code is a pure function of its input: SHA-256 the UTF-8 bytes,
//! keep the first [`DIGEST_PREFIX_BYTES`] bytes, and write that big-endian
//! integer in base 62. Codes are not padded, so a prefix with leading zero
//! bytes yields a shorter code and an all-zero prefix yields an empty one.

use sha2::{Digest, Sha256};

/// Number of digest bytes that feed the code.
pub const DIGEST_PREFIX_BYTES: usize = 6;

/// Base-62 digits in ascending value order.
const BASE62_ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Generates the short code for `input`.
///
/// Identical input always yields the identical code; this is what makes the
/// collision check in [`crate::application::services::ShortenerService`]
/// meaningful. Callers that need per-request variation feed in a uniqueness
/// token (see [`crate::utils::unique_token`]).
///
/// # Examples
///
/// ```ignore
/// assert_eq!(generate_code("https://example.com"), "50D8vZsq");
/// ```
pub fn generate_code(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    encode_base62(prefix_value(&digest[..DIGEST_PREFIX_BYTES]))
}

/// Reads up to eight bytes as a big-endian integer.
fn prefix_value(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

/// Writes `n` in base 62 without padding. Zero encodes as the empty string.
pub fn encode_base62(mut n: u64) -> String {
    let mut digits = Vec::new();

    while n > 0 {
        digits.push(BASE62_ALPHABET[(n % 62) as usize]);
        n /= 62;
    }

    digits.reverse();
    digits.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_code_known_values() {
        assert_eq!(generate_code("https://example.com"), "50D8vZsq");
        assert_eq!(
            generate_code("https://example.com/very/long/path/value"),
            "X088r5mw"
        );
        assert_eq!(generate_code(""), "195WQWhau");
    }

    #[test]
    fn test_generate_code_is_deterministic() {
        let input = "https://example.com/very/long/path/value1234-abcdef";
        let first = generate_code(input);

        for _ in 0..100 {
            assert_eq!(generate_code(input), first);
        }
    }

    #[test]
    fn test_generate_code_alphanumeric_and_bounded() {
        for i in 0..1000 {
            let code = generate_code(&format!("https://example.com/{i}"));
            assert!(!code.is_empty());
            assert!(code.len() <= 9);
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_generate_code_no_collisions_in_large_corpus() {
        const CORPUS: usize = 100_000;
        const SUFFIX_BYTES: usize = 16;

        let mut entropy = vec![0u8; CORPUS * SUFFIX_BYTES];
        getrandom::fill(&mut entropy).unwrap();

        let urls: HashSet<String> = entropy
            .chunks_exact(SUFFIX_BYTES)
            .map(|suffix| format!("https://example.com/{}", hex::encode(suffix)))
            .collect();
        let codes: HashSet<String> = urls.iter().map(|url| generate_code(url)).collect();

        // 48-bit codes: a birthday collision at this size has odds near 1 in 50,000.
        assert_eq!(codes.len(), urls.len());
    }

    #[test]
    fn test_encode_base62_digits() {
        assert_eq!(encode_base62(0), "");
        assert_eq!(encode_base62(9), "9");
        assert_eq!(encode_base62(10), "A");
        assert_eq!(encode_base62(61), "z");
        assert_eq!(encode_base62(62), "10");
        assert_eq!(encode_base62((1 << 48) - 1), "1HvWXNAa7");
    }

    #[test]
    fn test_prefix_value_is_big_endian() {
        assert_eq!(prefix_value(&[0, 0, 0, 0, 0, 0]), 0);
        assert_eq!(prefix_value(&[0, 0, 0, 0, 1, 0]), 256);
        assert_eq!(prefix_value(&[0x10, 0x06, 0x80, 0xad, 0x54, 0x6c]), 0x100680ad546c);
    }
}
