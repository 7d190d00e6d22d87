use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::error::{IdentityError, Result};

const WINDOW_SECS: i64 = 60;

/// Login rate limiting as a trait so `AuthService` can be exercised in tests
/// without a live KV connection (§9: explicit DI, no global singleton).
#[async_trait]
pub trait RateLimit: Send + Sync {
    /// Returns `Ok(())` if `ip` is still under the limit for the current
    /// window, otherwise `Err(IdentityError::RateLimited)` carrying the
    /// remaining seconds until the window resets.
    async fn check(&self, ip: &str) -> Result<()>;
}

/// Fixed-window login rate limiter keyed by client IP (§4.6): `INCR` the
/// window counter, set its expiry only on the first increment of the
/// window, and reject once the count exceeds the configured limit.
#[derive(Clone)]
pub struct RedisRateLimiter {
    conn: ConnectionManager,
    limit_per_minute: u32,
}

impl RedisRateLimiter {
    pub fn new(conn: ConnectionManager, limit_per_minute: u32) -> Self {
        Self { conn, limit_per_minute }
    }
}

#[async_trait]
impl RateLimit for RedisRateLimiter {
    async fn check(&self, ip: &str) -> Result<()> {
        let key = format!("login_rate_limit:{ip}");
        let mut conn = self.conn.clone();

        let count: u32 = conn.incr(&key, 1).await.map_err(IdentityError::Kv)?;
        if count == 1 {
            let _: () = conn.expire(&key, WINDOW_SECS).await.map_err(IdentityError::Kv)?;
        }

        if count > self.limit_per_minute {
            let ttl: i64 = conn.ttl(&key).await.unwrap_or(WINDOW_SECS);
            let retry_after_secs = u64::try_from(ttl.max(0)).unwrap_or(0);
            return Err(IdentityError::RateLimited { retry_after_secs });
        }

        Ok(())
    }
}
