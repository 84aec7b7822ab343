//! Session store trait.

use crate::error::Result;
use crate::state::{SessionData, SessionId};
use chrono::Duration;

/// Session store.
///
/// This trait abstracts over session storage (Redis in production, memory in
/// development and tests).
///
/// # Implementation Notes
///
/// - Sessions expire after their TTL
/// - Every save refreshes the TTL (sliding expiration)
/// - A missing or expired session is `Ok(None)`, not an error
pub trait SessionStore: Send + Sync {
    /// Load a session.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable or the stored bytes do not
    /// decode.
    fn load(
        &self,
        session_id: SessionId,
    ) -> impl std::future::Future<Output = Result<Option<SessionData>>> + Send;

    /// Create or overwrite a session and reset its TTL.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable or encoding fails.
    fn save(
        &self,
        session_id: SessionId,
        data: &SessionData,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Delete a session. Deleting an unknown id succeeds.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn delete(
        &self,
        session_id: SessionId,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
