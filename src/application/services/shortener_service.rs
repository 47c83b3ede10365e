//! URL shortening and resolution service.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde_json::json;
use tracing::{info, warn};

use super::cached_url_repository::{CachedUrlRepository, Lookup};
use crate::domain::Clock;
use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::utils::code_generator::generate_code;
use crate::utils::unique_token::UniqueTokenSource;

/// Expiry description for records that never expire.
pub const NO_EXPIRATION: &str = "no expiration";

/// Format of the human-readable expiry timestamp.
const EXPIRY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Result of a successful shortening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenedUrl {
    pub code: String,
    /// `"no expiration"` or the expiry instant as `YYYY-MM-DD HH:MM:SS` (UTC).
    pub expiry_message: String,
    pub record: UrlRecord,
}

/// Service for creating and resolving short codes.
///
/// # Code Generation
///
/// The code is derived from `url + token`, where the token mixes a hash of the
/// caller identity with fresh randomness. A generated code that already
/// resolves to anything (live or expired) is reported as
/// [`AppError::Collision`]; there is no retry, because a second attempt would
/// need new randomness and would no longer check the same input.
///
/// The existence check and the insert are not atomic. The repository's
/// uniqueness rule on short codes closes that gap: a concurrent duplicate
/// insert also comes back as [`AppError::Collision`].
pub struct ShortenerService<R: ?Sized> {
    repository: Arc<CachedUrlRepository<R>>,
    tokens: UniqueTokenSource,
    clock: Arc<dyn Clock>,
    generate: fn(&str) -> String,
}

impl<R: UrlRepository + ?Sized> ShortenerService<R> {
    /// Creates a new shortener using [`generate_code`].
    pub fn new(
        repository: Arc<CachedUrlRepository<R>>,
        tokens: UniqueTokenSource,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            tokens,
            clock,
            generate: generate_code,
        }
    }

    /// Replaces the code generator.
    pub fn with_code_generator(mut self, generate: fn(&str) -> String) -> Self {
        self.generate = generate;
        self
    }

    /// Creates a short code for `url`.
    ///
    /// `expire_in_minutes <= 0` means the record never expires.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Collision`] if the generated code is empty or already in use.
    /// Returns [`AppError::Validation`] if the expiry is out of range.
    /// Returns [`AppError::Unavailable`] if the cache or store cannot be reached.
    pub async fn create_short_url(
        &self,
        url: &str,
        expire_in_minutes: i64,
        caller_identity: &str,
    ) -> Result<ShortenedUrl, AppError> {
        let token = self.tokens.new_token(caller_identity)?;
        let code = (self.generate)(&format!("{}{}", url, token));

        if code.is_empty() {
            warn!("Generated an empty short code");
            return Err(AppError::collision(
                "Short code collision detected",
                json!({ "reason": "empty code" }),
            ));
        }

        // Stored timestamps have microsecond precision.
        let created_at = self.clock.now().trunc_subsecs(6);
        let expire_at = expiry_for(created_at, expire_in_minutes)?;

        if self.repository.get_by_short_code(&code).await? != Lookup::NotFound {
            warn!("Short code collision: {}", code);
            return Err(AppError::collision(
                "Short code collision detected",
                json!({ "code": code }),
            ));
        }

        let record = self
            .repository
            .create(NewUrlRecord {
                original_url: url.to_string(),
                short_code: code.clone(),
                created_at,
                expire_at,
            })
            .await?;

        let expiry_message = if expire_in_minutes > 0 {
            record.expire_at.format(EXPIRY_FORMAT).to_string()
        } else {
            NO_EXPIRATION.to_string()
        };

        info!("Created short code {} (expires: {})", code, expiry_message);

        Ok(ShortenedUrl {
            code,
            expiry_message,
            record,
        })
    }

    /// Resolves a short code to its record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record exists for the code.
    /// Returns [`AppError::Expired`] if the record is past its live window.
    /// Returns [`AppError::Unavailable`] if the cache or store cannot be reached.
    pub async fn get_url_by_code(&self, code: &str) -> Result<UrlRecord, AppError> {
        match self.repository.get_by_short_code(code).await? {
            Lookup::Found(record) => Ok(record),
            Lookup::Expired => Err(AppError::expired(
                "URL has expired",
                json!({ "code": code }),
            )),
            Lookup::NotFound => Err(AppError::not_found(
                "URL not found",
                json!({ "code": code }),
            )),
        }
    }
}

/// Computes `expire_at`; a non-positive duration yields `created_at` ("no expiration").
fn expiry_for(
    created_at: DateTime<Utc>,
    expire_in_minutes: i64,
) -> Result<DateTime<Utc>, AppError> {
    if expire_in_minutes <= 0 {
        return Ok(created_at);
    }

    TimeDelta::try_minutes(expire_in_minutes)
        .and_then(|delta| created_at.checked_add_signed(delta))
        .ok_or_else(|| {
            AppError::bad_request(
                "Expiration is out of range",
                json!({ "expire_in": expire_in_minutes }),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ManualClock;
    use crate::domain::repositories::MockUrlRepository;
    use crate::infrastructure::cache::MemoryCache;
    use crate::utils::unique_token::EntropySource;
    use chrono::TimeZone;

    struct ZeroEntropy;

    impl EntropySource for ZeroEntropy {
        fn fill(&self, dest: &mut [u8]) -> Result<(), AppError> {
            dest.fill(0);
            Ok(())
        }
    }

    fn service(repo: MockUrlRepository, clock: ManualClock) -> ShortenerService<MockUrlRepository> {
        let cache = Arc::new(MemoryCache::new(Arc::new(clock.clone())));
        let cached = Arc::new(CachedUrlRepository::new(
            Arc::new(repo),
            cache,
            Arc::new(clock.clone()),
        ));
        ShortenerService::new(
            cached,
            UniqueTokenSource::new(Arc::new(ZeroEntropy)),
            Arc::new(clock),
        )
    }

    fn fixed_clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap())
    }

    #[tokio::test]
    async fn test_create_without_expiration() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code().times(1).returning(|_| Ok(None));
        repo.expect_create()
            .withf(|r| r.expire_at == r.created_at)
            .times(1)
            .returning(|r| Ok(r.into_record(1)));

        let svc = service(repo, fixed_clock());
        let created = svc
            .create_short_url("https://example.com/very/long/path/value", 0, "curl/8.0")
            .await
            .unwrap();

        assert!(!created.code.is_empty());
        assert_eq!(created.expiry_message, NO_EXPIRATION);
        assert_eq!(created.record.short_code, created.code);
    }

    #[tokio::test]
    async fn test_create_with_expiration_formats_message() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code().times(1).returning(|_| Ok(None));
        repo.expect_create()
            .withf(|r| r.expire_at - r.created_at == TimeDelta::minutes(90))
            .times(1)
            .returning(|r| Ok(r.into_record(1)));

        let svc = service(repo, fixed_clock());
        let created = svc
            .create_short_url("https://example.com/very/long/path/value", 90, "curl/8.0")
            .await
            .unwrap();

        assert_eq!(created.expiry_message, "2025-03-14 16:39:26");
    }

    #[tokio::test]
    async fn test_negative_expiration_means_none() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code().times(1).returning(|_| Ok(None));
        repo.expect_create()
            .withf(|r| r.expire_at == r.created_at)
            .times(1)
            .returning(|r| Ok(r.into_record(1)));

        let svc = service(repo, fixed_clock());
        let created = svc
            .create_short_url("https://example.com/very/long/path/value", -5, "curl/8.0")
            .await
            .unwrap();

        assert_eq!(created.expiry_message, NO_EXPIRATION);
    }

    #[tokio::test]
    async fn test_existing_code_is_collision_without_retry() {
        let clock = fixed_clock();
        let now = clock.now();

        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code().times(1).returning(move |code| {
            Ok(Some(UrlRecord {
                id: 3,
                original_url: "https://other.example.com/some/long/path".to_string(),
                short_code: code.to_string(),
                created_at: now,
                expire_at: now,
            }))
        });
        repo.expect_create().times(0);

        let svc = service(repo, clock);
        let result = svc
            .create_short_url("https://example.com/very/long/path/value", 0, "curl/8.0")
            .await;

        assert!(matches!(result, Err(AppError::Collision { .. })));
    }

    #[tokio::test]
    async fn test_expired_code_is_also_collision() {
        let clock = fixed_clock();
        let now = clock.now();

        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code().times(1).returning(move |code| {
            Ok(Some(UrlRecord {
                id: 3,
                original_url: "https://other.example.com/some/long/path".to_string(),
                short_code: code.to_string(),
                created_at: now - TimeDelta::hours(2),
                expire_at: now - TimeDelta::hours(1),
            }))
        });
        repo.expect_create().times(0);

        let svc = service(repo, clock);
        let result = svc
            .create_short_url("https://example.com/very/long/path/value", 0, "curl/8.0")
            .await;

        assert!(matches!(result, Err(AppError::Collision { .. })));
    }

    #[tokio::test]
    async fn test_empty_code_is_rejected() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code().times(0);
        repo.expect_create().times(0);

        let svc = service(repo, fixed_clock()).with_code_generator(|_| String::new());
        let result = svc
            .create_short_url("https://example.com/very/long/path/value", 0, "curl/8.0")
            .await;

        assert!(matches!(result, Err(AppError::Collision { .. })));
    }

    #[tokio::test]
    async fn test_insert_race_surfaces_collision() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code().times(1).returning(|_| Ok(None));
        repo.expect_create().times(1).returning(|r| {
            Err(AppError::collision(
                "Short code collision detected",
                json!({ "code": r.short_code }),
            ))
        });

        let svc = service(repo, fixed_clock());
        let result = svc
            .create_short_url("https://example.com/very/long/path/value", 0, "curl/8.0")
            .await;

        assert!(matches!(result, Err(AppError::Collision { .. })));
    }

    #[tokio::test]
    async fn test_out_of_range_expiration_is_rejected() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code().times(0);
        repo.expect_create().times(0);

        let svc = service(repo, fixed_clock());
        let result = svc
            .create_short_url("https://example.com/very/long/path/value", i64::MAX, "curl/8.0")
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_get_url_by_code_not_found() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code().times(1).returning(|_| Ok(None));

        let svc = service(repo, fixed_clock());
        let result = svc.get_url_by_code("missing").await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_get_url_by_code_expired() {
        let clock = fixed_clock();
        let now = clock.now();

        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code().times(1).returning(move |code| {
            Ok(Some(UrlRecord {
                id: 9,
                original_url: "https://example.com/very/long/path/value".to_string(),
                short_code: code.to_string(),
                created_at: now - TimeDelta::minutes(3),
                expire_at: now - TimeDelta::minutes(2),
            }))
        });

        let svc = service(repo, clock);
        let result = svc.get_url_by_code("gone").await;

        assert!(matches!(result, Err(AppError::Expired { .. })));
    }

    #[test]
    fn test_expiry_for() {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(expiry_for(created, 0).unwrap(), created);
        assert_eq!(
            expiry_for(created, 1).unwrap(),
            created + TimeDelta::minutes(1)
        );
        assert!(expiry_for(created, i64::MAX).is_err());
    }
}
