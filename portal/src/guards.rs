//! Access guards.
//!
//! Extractors that resolve to the logged-in [`SessionUser`] or short-circuit
//! with the redirect (HTML) or 401 body (JSON) the portal uses for anonymous
//! and wrong-role visitors.

use crate::session::Session;
use aventura_auth::{FlashLevel, SessionUser};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, Method, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;

/// Login page.
pub const LOGIN_PATH: &str = "/iniciar_sesion";

const LOGIN_REQUIRED: &str = "Por favor inicie sesión para continuar";
const NOT_AUTHORIZED: &str = "Acceso no autorizado";

fn session_of(parts: &Parts) -> Session {
    parts.extensions.get::<Session>().cloned().unwrap_or_default()
}

/// Logged-in user, or the login redirect. Anonymous page views remember
/// where they were going.
fn require_user(session: &Session, parts: &Parts) -> Result<SessionUser, Response> {
    session.user().ok_or_else(|| {
        if parts.method == Method::GET {
            let target = parts
                .uri
                .path_and_query()
                .map_or_else(|| parts.uri.path().to_string(), ToString::to_string);
            session.set_redirect_after_login(target);
        }
        session.flash(FlashLevel::Warning, LOGIN_REQUIRED);
        Redirect::to(LOGIN_PATH).into_response()
    })
}

/// Any logged-in user.
#[derive(Debug, Clone)]
pub struct RequireLogin(pub SessionUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireLogin
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_user(&session_of(parts), parts).map(Self)
    }
}

/// Administrators only; clients are sent to their dashboard.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub SessionUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = session_of(parts);
        let user = require_user(&session, parts)?;
        if user.is_admin() {
            Ok(Self(user))
        } else {
            session.flash(FlashLevel::Danger, NOT_AUTHORIZED);
            Err(Redirect::to("/cliente").into_response())
        }
    }
}

/// Clients only; administrators are sent to their dashboard.
#[derive(Debug, Clone)]
pub struct RequireClient(pub SessionUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireClient
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = session_of(parts);
        let user = require_user(&session, parts)?;
        if user.is_client() {
            Ok(Self(user))
        } else {
            session.flash(FlashLevel::Danger, NOT_AUTHORIZED);
            Err(Redirect::to("/administrador").into_response())
        }
    }
}

/// Logged-in user for JSON endpoints: 401 `{"error":"Usuario no autenticado"}`
/// instead of a redirect.
#[derive(Debug, Clone)]
pub struct ApiUser(pub SessionUser);

impl ApiUser {
    /// Backend persona id; the JSON endpoints need one.
    #[must_use]
    pub const fn persona_id(&self) -> Option<i64> {
        self.0.id
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ApiUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_of(parts).user().map(Self).ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Usuario no autenticado" })),
            )
                .into_response()
        })
    }
}
