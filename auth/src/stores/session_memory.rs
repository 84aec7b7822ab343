//! In-memory session store.
//!
//! Used when no Redis URL is configured and by the portal's tests. Sessions
//! vanish on restart.

use crate::error::{AuthError, Result};
use crate::providers::SessionStore;
use crate::state::{SessionData, SessionId};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

type Entries = HashMap<SessionId, (SessionData, DateTime<Utc>)>;

/// In-memory session store with per-entry expiry.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<Mutex<Entries>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn session_count(&self) -> Result<usize> {
        let now = Utc::now();
        Ok(self
            .sessions
            .lock()
            .map_err(|_| AuthError::SessionStore("Mutex lock failed".to_string()))?
            .values()
            .filter(|(_, expires_at)| *expires_at > now)
            .count())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, session_id: SessionId) -> impl Future<Output = Result<Option<SessionData>>> + Send {
        let sessions = Arc::clone(&self.sessions);

        async move {
            let mut guard = sessions
                .lock()
                .map_err(|_| AuthError::SessionStore("Mutex lock failed".to_string()))?;

            match guard.get(&session_id) {
                Some((data, expires_at)) if *expires_at > Utc::now() => Ok(Some(data.clone())),
                Some(_) => {
                    guard.remove(&session_id);
                    Ok(None)
                }
                None => Ok(None),
            }
        }
    }

    fn save(
        &self,
        session_id: SessionId,
        data: &SessionData,
        ttl: Duration,
    ) -> impl Future<Output = Result<()>> + Send {
        let sessions = Arc::clone(&self.sessions);
        let data = data.clone();

        async move {
            let mut guard = sessions
                .lock()
                .map_err(|_| AuthError::SessionStore("Mutex lock failed".to_string()))?;

            let now = Utc::now();
            guard.retain(|_, (_, expires_at)| *expires_at > now);
            guard.insert(session_id, (data, now + ttl));
            Ok(())
        }
    }

    fn delete(&self, session_id: SessionId) -> impl Future<Output = Result<()>> + Send {
        let sessions = Arc::clone(&self.sessions);

        async move {
            sessions
                .lock()
                .map_err(|_| AuthError::SessionStore("Mutex lock failed".to_string()))?
                .remove(&session_id);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::state::SessionUser;

    #[tokio::test]
    async fn test_save_then_load() {
        let store = MemorySessionStore::new();
        let id = SessionId::new();
        let data = SessionData {
            token: Some("tok".into()),
            user: Some(SessionUser {
                id: Some(3),
                ..SessionUser::default()
            }),
            ..SessionData::default()
        };

        store.save(id, &data, Duration::hours(1)).await.unwrap();

        assert_eq!(store.load(id).await.unwrap(), Some(data));
        assert_eq!(store.session_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expired_session_is_gone() {
        let store = MemorySessionStore::new();
        let id = SessionId::new();

        store
            .save(id, &SessionData::default(), Duration::seconds(-1))
            .await
            .unwrap();

        assert_eq!(store.load(id).await.unwrap(), None);
        assert_eq!(store.session_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemorySessionStore::new();
        let id = SessionId::new();

        store
            .save(id, &SessionData::default(), Duration::hours(1))
            .await
            .unwrap();
        store.delete(id).await.unwrap();
        store.delete(SessionId::new()).await.unwrap();

        assert_eq!(store.load(id).await.unwrap(), None);
    }
}
