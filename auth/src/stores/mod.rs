//! Session store implementations.
//!
//! - **Redis**: shared across portal instances, survives restarts
//! - **Memory**: single process, for development and tests
//!
//! [`SessionBackend`] wraps whichever one configuration selects so the
//! application can hold a concrete type.

pub mod session_memory;
pub mod session_redis;

pub use session_memory::MemorySessionStore;
pub use session_redis::RedisSessionStore;

use crate::error::Result;
use crate::providers::SessionStore;
use crate::state::{SessionData, SessionId};
use chrono::Duration;

/// Session store selected at startup.
#[derive(Debug, Clone)]
pub enum SessionBackend {
    /// Redis-backed sessions.
    Redis(RedisSessionStore),
    /// Process-local sessions.
    Memory(MemorySessionStore),
}

impl SessionBackend {
    /// Connect to Redis when a URL is given, otherwise use memory.
    ///
    /// # Errors
    ///
    /// Returns error if a Redis URL is given and the connection fails.
    pub async fn connect(redis_url: Option<&str>) -> Result<Self> {
        match redis_url {
            Some(url) => {
                let store = RedisSessionStore::new(url).await?;
                tracing::info!("Session store: redis");
                Ok(Self::Redis(store))
            }
            None => {
                tracing::info!("Session store: memory");
                Ok(Self::Memory(MemorySessionStore::new()))
            }
        }
    }
}

impl SessionStore for SessionBackend {
    async fn load(&self, session_id: SessionId) -> Result<Option<SessionData>> {
        match self {
            Self::Redis(store) => store.load(session_id).await,
            Self::Memory(store) => store.load(session_id).await,
        }
    }

    async fn save(&self, session_id: SessionId, data: &SessionData, ttl: Duration) -> Result<()> {
        match self {
            Self::Redis(store) => store.save(session_id, data, ttl).await,
            Self::Memory(store) => store.save(session_id, data, ttl).await,
        }
    }

    async fn delete(&self, session_id: SessionId) -> Result<()> {
        match self {
            Self::Redis(store) => store.delete(session_id).await,
            Self::Memory(store) => store.delete(session_id).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_without_url_uses_memory() {
        let backend = SessionBackend::connect(None).await.unwrap();
        assert!(matches!(backend, SessionBackend::Memory(_)));

        let id = SessionId::new();
        backend
            .save(id, &SessionData::default(), Duration::minutes(5))
            .await
            .unwrap();
        assert!(backend.load(id).await.unwrap().is_some());
    }
}
