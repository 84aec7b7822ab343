//! Redis-based session store implementation.
//!
//! Sessions are stored with:
//! - **Key**: `portal:session:{session_id}` → bincode-serialized `SessionData`
//! - **TTL**: reset on every save (sliding window)
//!
//! # Example
//!
//! ```no_run
//! use aventura_auth::stores::RedisSessionStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RedisSessionStore::new("redis://127.0.0.1:6379").await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::providers::SessionStore;
use crate::state::{SessionData, SessionId};
use chrono::Duration;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

const KEY_PREFIX: &str = "portal:session:";

/// Redis-based session store with TTL-based expiration.
#[derive(Clone)]
pub struct RedisSessionStore {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,
}

impl std::fmt::Debug for RedisSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSessionStore").finish_non_exhaustive()
    }
}

impl RedisSessionStore {
    /// Create a new Redis session store.
    ///
    /// # Errors
    ///
    /// Returns error if connection to Redis fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| AuthError::Redis(format!("Failed to create Redis client: {e}")))?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            AuthError::Redis(format!("Failed to create Redis connection manager: {e}"))
        })?;

        Ok(Self { conn_manager })
    }

    /// Get the Redis key for a session.
    fn session_key(session_id: SessionId) -> String {
        format!("{KEY_PREFIX}{}", session_id.0)
    }
}

/// Seconds for `SET EX`; Redis rejects zero.
#[allow(clippy::cast_sign_loss)]
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.num_seconds().max(1) as u64
}

impl SessionStore for RedisSessionStore {
    async fn load(&self, session_id: SessionId) -> Result<Option<SessionData>> {
        let mut conn = self.conn_manager.clone();
        let key = Self::session_key(session_id);

        let bytes: Option<Vec<u8>> = conn
            .get(&key)
            .await
            .map_err(|e| AuthError::SessionStore(format!("Failed to get session: {e}")))?;

        match bytes {
            Some(bytes) => match bincode::deserialize::<SessionData>(&bytes) {
                Ok(data) => Ok(Some(data)),
                Err(e) => {
                    // Written by an older build; start over rather than lock the user out.
                    tracing::warn!(session_id = %session_id, error = %e, "Discarding undecodable session");
                    let _: () = conn.del(&key).await.map_err(|e| {
                        AuthError::SessionStore(format!("Failed to delete session: {e}"))
                    })?;
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn save(&self, session_id: SessionId, data: &SessionData, ttl: Duration) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let key = Self::session_key(session_id);
        let bytes = bincode::serialize(data)?;

        let _: () = conn
            .set_ex(&key, bytes, ttl_seconds(ttl))
            .await
            .map_err(|e| AuthError::SessionStore(format!("Failed to save session: {e}")))?;

        tracing::debug!(session_id = %session_id, "Saved session in Redis");
        Ok(())
    }

    async fn delete(&self, session_id: SessionId) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let _: () = conn
            .del(Self::session_key(session_id))
            .await
            .map_err(|e| AuthError::SessionStore(format!("Failed to delete session: {e}")))?;

        tracing::debug!(session_id = %session_id, "Deleted session from Redis");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let id = SessionId::new();
        assert_eq!(
            RedisSessionStore::session_key(id),
            format!("portal:session:{}", id.0)
        );
    }

    #[test]
    fn test_ttl_never_zero() {
        assert_eq!(ttl_seconds(Duration::zero()), 1);
        assert_eq!(ttl_seconds(Duration::hours(24)), 86_400);
    }
}
