//! Cookie-backed server-side sessions.
//!
//! The browser only holds a signed cookie with the session id; the data lives
//! in the configured [`SessionStore`]. [`session_middleware`] loads it before
//! the handler runs and writes it back afterwards if the handler touched it.

use crate::server::AppState;
use aventura_auth::providers::SessionStore;
use aventura_auth::{Flash, FlashLevel, ResetGrant, SessionData, SessionId, SessionUser};
use aventura_web::AppError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use chrono::{Duration, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Inner {
    data: SessionData,
    dirty: bool,
    rotate: bool,
}

/// Handle to the current request's session.
///
/// Inserted into request extensions by [`session_middleware`]; extract it in
/// handlers. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<Mutex<Inner>>,
}

impl Session {
    /// Wrap loaded data.
    #[must_use]
    pub fn new(data: SessionData) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                data,
                dirty: false,
                rotate: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read<T>(&self, f: impl FnOnce(&SessionData) -> T) -> T {
        f(&self.lock().data)
    }

    fn write<T>(&self, f: impl FnOnce(&mut SessionData) -> T) -> T {
        let mut inner = self.lock();
        inner.dirty = true;
        f(&mut inner.data)
    }

    /// True once anything was written.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    /// True when the privilege level changed and the id must be reissued.
    #[must_use]
    pub fn needs_new_id(&self) -> bool {
        self.lock().rotate
    }

    /// Copy of the current data.
    #[must_use]
    pub fn snapshot(&self) -> SessionData {
        self.read(Clone::clone)
    }

    // ── user ──────────────────────────────────────────────────────────

    /// Logged-in user.
    #[must_use]
    pub fn user(&self) -> Option<SessionUser> {
        self.read(|d| d.user.clone())
    }

    /// Log a user in. The session is saved under a fresh id.
    pub fn set_user(&self, user: SessionUser) {
        let mut inner = self.lock();
        inner.dirty = true;
        inner.rotate = true;
        inner.data.user = Some(user);
    }

    /// Modify the logged-in user in place; no-op when logged out.
    pub fn update_user(&self, f: impl FnOnce(&mut SessionUser)) {
        self.write(|d| {
            if let Some(user) = d.user.as_mut() {
                f(user);
            }
        });
    }

    // ── backend token ─────────────────────────────────────────────────

    /// Backend bearer token.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.read(|d| d.token.clone())
    }

    /// Store the backend bearer token.
    pub fn set_token(&self, token: String) {
        self.write(|d| d.token = Some(token).filter(|t| !t.is_empty()));
    }

    /// Remove and return the token.
    pub fn take_token(&self) -> Option<String> {
        self.write(|d| d.token.take())
    }

    // ── flashes ───────────────────────────────────────────────────────

    /// Queue a message for the next rendered page.
    pub fn flash(&self, level: FlashLevel, message: impl Into<String>) {
        let message = message.into();
        self.write(|d| d.flashes.push(Flash { level, message }));
    }

    /// Drain queued messages.
    pub fn take_flashes(&self) -> Vec<Flash> {
        if self.read(|d| d.flashes.is_empty()) {
            return Vec::new();
        }
        self.write(|d| std::mem::take(&mut d.flashes))
    }

    /// Forget everything (logout).
    pub fn clear(&self) {
        self.write(|d| *d = SessionData::default());
    }

    // ── post-login redirect ───────────────────────────────────────────

    /// Remember where to go after logging in.
    pub fn set_redirect_after_login(&self, path: impl Into<String>) {
        let path = path.into();
        self.write(|d| d.redirect_after_login = Some(path));
    }

    /// Remove and return the post-login target.
    pub fn take_redirect_after_login(&self) -> Option<String> {
        if self.read(|d| d.redirect_after_login.is_none()) {
            return None;
        }
        self.write(|d| d.redirect_after_login.take())
    }

    // ── Google registration marks ─────────────────────────────────────

    /// Registration continues a Google sign-in for `correo`.
    pub fn mark_from_google(&self, correo: impl Into<String>) {
        let correo = correo.into();
        self.write(|d| {
            d.from_google = true;
            d.google_correo = Some(correo);
        });
    }

    /// Google email when registration continues a Google sign-in.
    #[must_use]
    pub fn from_google(&self) -> Option<String> {
        self.read(|d| {
            if d.from_google {
                Some(d.google_correo.clone().unwrap_or_default())
            } else {
                None
            }
        })
    }

    /// Drop the Google marks.
    pub fn clear_google_marks(&self) {
        if self.read(|d| !d.from_google && d.google_correo.is_none()) {
            return;
        }
        self.write(|d| {
            d.from_google = false;
            d.google_correo = None;
        });
    }

    // ── password-reset grants ─────────────────────────────────────────

    /// Allow `token` to change `persona_id`'s password for `ttl`.
    pub fn grant_reset(&self, token: impl Into<String>, persona_id: i64, ttl: Duration) {
        let token = token.into();
        let expires_at = Utc::now() + ttl;
        self.write(|d| {
            d.reset_grants.insert(token, ResetGrant { persona_id, expires_at });
        });
    }

    /// Unexpired grant for `token`.
    #[must_use]
    pub fn reset_grant(&self, token: &str) -> Option<ResetGrant> {
        let now = Utc::now();
        self.read(|d| {
            d.reset_grants
                .get(token)
                .filter(|g| g.is_valid_at(now))
                .cloned()
        })
    }

    /// Consume a grant.
    pub fn revoke_reset(&self, token: &str) {
        self.write(|d| {
            d.reset_grants.remove(token);
        });
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| AppError::internal("Session layer missing"))
    }
}

/// Load the session named by the signed cookie, run the handler, persist
/// changes.
///
/// An unreadable store degrades to an empty session rather than failing the
/// request.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie_name = state.config.session.cookie_name.clone();
    let existing_id = jar
        .get(&cookie_name)
        .and_then(|cookie| cookie.value().parse::<SessionId>().ok());

    let mut data = match existing_id {
        Some(id) => state.sessions.load(id).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load session");
            None
        }),
        None => None,
    }
    .unwrap_or_default();
    data.prune_expired_grants(Utc::now());

    let session = Session::new(data);
    request.extensions_mut().insert(session.clone());

    let response = next.run(request).await;

    if !session.is_dirty() {
        return response;
    }

    let data = session.snapshot();
    if data.is_empty() {
        if let Some(id) = existing_id {
            if let Err(e) = state.sessions.delete(id).await {
                tracing::warn!(error = %e, "Failed to delete session");
            }
        }
        let jar = jar.remove(Cookie::build((cookie_name, "")).path("/"));
        return (jar, response).into_response();
    }

    let id = match existing_id {
        Some(old) if session.needs_new_id() => {
            if let Err(e) = state.sessions.delete(old).await {
                tracing::warn!(error = %e, "Failed to drop pre-login session");
            }
            SessionId::new()
        }
        Some(id) => id,
        None => SessionId::new(),
    };
    if let Err(e) = state.sessions.save(id, &data, state.auth.session_ttl).await {
        tracing::warn!(error = %e, "Failed to save session");
        return response;
    }

    let cookie = Cookie::build((cookie_name, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    (jar.add(cookie), response).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_do_not_dirty() {
        let session = Session::default();
        assert!(session.user().is_none());
        assert!(session.take_flashes().is_empty());
        assert!(session.take_redirect_after_login().is_none());
        session.clear_google_marks();
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_flashes_drain_in_order() {
        let session = Session::default();
        session.flash(FlashLevel::Success, "uno");
        session.flash(FlashLevel::Danger, "dos");

        let flashes = session.take_flashes();
        assert_eq!(flashes.len(), 2);
        assert_eq!(flashes[0].message, "uno");
        assert_eq!(flashes[1].level, FlashLevel::Danger);
        assert!(session.take_flashes().is_empty());
        assert!(session.is_dirty());
    }

    #[test]
    fn test_google_marks() {
        let session = Session::default();
        assert!(session.from_google().is_none());

        session.mark_from_google("ana@gmail.com");
        assert_eq!(session.from_google().as_deref(), Some("ana@gmail.com"));

        session.clear_google_marks();
        assert!(session.from_google().is_none());
    }

    #[test]
    fn test_reset_grants() {
        let session = Session::default();
        session.grant_reset("tok", 7, Duration::hours(1));
        assert_eq!(session.reset_grant("tok").unwrap().persona_id, 7);

        session.grant_reset("old", 8, Duration::seconds(-1));
        assert!(session.reset_grant("old").is_none());

        session.revoke_reset("tok");
        assert!(session.reset_grant("tok").is_none());
    }

    #[test]
    fn test_login_requests_new_id() {
        let session = Session::default();
        session.set_token("t".into());
        assert!(!session.needs_new_id());

        session.set_user(SessionUser::default());
        assert!(session.needs_new_id());
        assert!(session.is_dirty());
    }

    #[test]
    fn test_clear_empties_data() {
        let session = Session::default();
        session.set_user(SessionUser::default());
        session.set_token("t".into());
        session.clear();
        assert!(session.snapshot().is_empty());
    }
}
