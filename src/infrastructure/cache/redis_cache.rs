//! Redis-backed cache store.

use super::service::{CacheError, CacheResult, CacheStore};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, Script, aio::ConnectionManager};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};

/// Redis implementation of [`CacheStore`].
///
/// Uses connection pooling via `ConnectionManager` for efficient connection reuse.
/// Errors are returned to the caller as [`CacheError`]; deciding whether a
/// failure is fatal is left to the layer above.
#[derive(Clone)]
pub struct RedisCache {
    client: ConnectionManager,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Connection(format!("Failed to create Redis client: {}", e)))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(format!("Failed to connect to Redis: {}", e)))?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::Connection(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self { client: manager })
    }
}

/// `INCR`, then `EXPIRE` only when the key has no TTL. Scripts run atomically.
static INCR_WINDOW: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
local count = redis.call('INCR', KEYS[1])
if redis.call('TTL', KEYS[1]) < 0 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return count
",
    )
});

/// Converts a TTL to whole seconds, rounding up so a short TTL never becomes zero.
fn ttl_seconds(ttl: Duration) -> u64 {
    (ttl.as_millis().div_ceil(1000) as u64).max(1)
}

fn op_error(command: &str, key: &str, e: redis::RedisError) -> CacheError {
    CacheError::Operation(format!("{} {} failed: {}", command, key, e))
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.client.clone();

        let value = conn
            .get::<_, Option<String>>(key)
            .await
            .map_err(|e| op_error("GET", key, e))?;

        debug!(
            "Cache {}: {}",
            if value.is_some() { "HIT" } else { "MISS" },
            key
        );
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        let mut conn = self.client.clone();

        match ttl.filter(|t| !t.is_zero()) {
            Some(ttl) => {
                let seconds = ttl_seconds(ttl);
                conn.set_ex::<_, _, ()>(key, value, seconds)
                    .await
                    .map_err(|e| op_error("SETEX", key, e))?;
                debug!("Cache SET: {} (TTL: {}s)", key, seconds);
            }
            None => {
                conn.set::<_, _, ()>(key, value)
                    .await
                    .map_err(|e| op_error("SET", key, e))?;
                debug!("Cache SET: {} (no TTL)", key);
            }
        }

        Ok(())
    }

    async fn incr(&self, key: &str) -> CacheResult<i64> {
        let mut conn = self.client.clone();

        conn.incr::<_, _, i64>(key, 1)
            .await
            .map_err(|e| op_error("INCR", key, e))
    }

    async fn incr_window(&self, key: &str, ttl: Duration) -> CacheResult<i64> {
        let mut conn = self.client.clone();

        let count: i64 = INCR_WINDOW
            .key(key)
            .arg(ttl_seconds(ttl))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| op_error("INCR_WINDOW", key, e))?;

        Ok(count)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool> {
        let mut conn = self.client.clone();

        conn.expire::<_, bool>(key, ttl_seconds(ttl) as i64)
            .await
            .map_err(|e| op_error("EXPIRE", key, e))
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
