//! Liveness endpoint.
//!
//! The portal has no database of its own, so liveness is all there is: the
//! backend's health is the backend's business.

use axum::http::StatusCode;

/// `GET /health`
///
/// Returns `200 ok` while the process is serving requests. Never calls the
/// backend.
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
