//! Per-request uniqueness tokens.
//!
//! A token is `<identity hash>-<128 random bits as hex>`. Appending it to a URL
//! before code generation makes two callers shortening the same URL land on
//! different codes. Each call mints a fresh random part, so a retried request
//! does not reproduce its earlier code either.

use serde_json::json;
use std::hash::{BuildHasher, RandomState};
use std::sync::Arc;

use crate::error::AppError;

/// Number of random bytes in each token.
const RANDOM_BYTES: usize = 16;

/// Source of random bytes.
///
/// Injected rather than global so tests can substitute a deterministic source.
pub trait EntropySource: Send + Sync {
    /// Fills `dest` with random bytes.
    fn fill(&self, dest: &mut [u8]) -> Result<(), AppError>;
}

/// Operating-system randomness via `getrandom`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), AppError> {
        getrandom::fill(dest).map_err(|e| {
            AppError::internal(
                "Random source unavailable",
                json!({ "reason": e.to_string() }),
            )
        })
    }
}

/// Mints uniqueness tokens from a caller identity (typically the User-Agent).
///
/// The identity hash is a fast keyed SipHash whose keys are drawn once when
/// the source is built, so hashes are stable within a process and differ
/// across restarts.
#[derive(Clone)]
pub struct UniqueTokenSource {
    hasher: RandomState,
    entropy: Arc<dyn EntropySource>,
}

impl UniqueTokenSource {
    pub fn new(entropy: Arc<dyn EntropySource>) -> Self {
        Self {
            hasher: RandomState::new(),
            entropy,
        }
    }

    /// Returns a new opaque token for `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the entropy source fails.
    pub fn new_token(&self, identity: &str) -> Result<String, AppError> {
        let mut random = [0u8; RANDOM_BYTES];
        self.entropy.fill(&mut random)?;

        let identity_hash = self.hasher.hash_one(identity);
        Ok(format!("{}-{}", identity_hash, hex::encode(random)))
    }
}

impl Default for UniqueTokenSource {
    fn default() -> Self {
        Self::new(Arc::new(OsEntropy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU8, Ordering};

    /// Fills every byte with the same value.
    struct FixedEntropy(u8);

    impl EntropySource for FixedEntropy {
        fn fill(&self, dest: &mut [u8]) -> Result<(), AppError> {
            dest.fill(self.0);
            Ok(())
        }
    }

    /// Yields a different fill byte on each call.
    struct CountingEntropy(AtomicU8);

    impl EntropySource for CountingEntropy {
        fn fill(&self, dest: &mut [u8]) -> Result<(), AppError> {
            dest.fill(self.0.fetch_add(1, Ordering::SeqCst));
            Ok(())
        }
    }

    struct BrokenEntropy;

    impl EntropySource for BrokenEntropy {
        fn fill(&self, _dest: &mut [u8]) -> Result<(), AppError> {
            Err(AppError::internal("Random source unavailable", json!({})))
        }
    }

    #[test]
    fn test_token_shape() {
        let source = UniqueTokenSource::new(Arc::new(FixedEntropy(0xab)));
        let token = source.new_token("Mozilla/5.0").unwrap();

        let (hash, random) = token.split_once('-').unwrap();
        assert!(hash.parse::<u64>().is_ok());
        assert_eq!(random, "ab".repeat(RANDOM_BYTES));
    }

    #[test]
    fn test_same_identity_same_randomness_is_reproducible() {
        let source = UniqueTokenSource::new(Arc::new(FixedEntropy(7)));
        assert_eq!(
            source.new_token("curl/8.0").unwrap(),
            source.new_token("curl/8.0").unwrap()
        );
    }

    #[test]
    fn test_different_identities_differ() {
        let source = UniqueTokenSource::new(Arc::new(FixedEntropy(7)));
        assert_ne!(
            source.new_token("curl/8.0").unwrap(),
            source.new_token("Mozilla/5.0").unwrap()
        );
    }

    #[test]
    fn test_fresh_randomness_per_call() {
        let source = UniqueTokenSource::new(Arc::new(CountingEntropy(AtomicU8::new(0))));
        assert_ne!(
            source.new_token("curl/8.0").unwrap(),
            source.new_token("curl/8.0").unwrap()
        );
    }

    #[test]
    fn test_os_entropy_tokens_are_unique() {
        let source = UniqueTokenSource::default();
        assert_ne!(
            source.new_token("same").unwrap(),
            source.new_token("same").unwrap()
        );
    }

    #[test]
    fn test_entropy_failure_propagates() {
        let source = UniqueTokenSource::new(Arc::new(BrokenEntropy));
        assert!(matches!(
            source.new_token("x"),
            Err(AppError::Internal { .. })
        ));
    }
}
