//! The React bundle and other static content.

use crate::server::AppState;
use aventura_web::AppError;
use axum::{
    extract::{Path as UrlPath, Request, State},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// `root/rel`, or `None` when `rel` is empty, absolute or climbs with `..`.
#[must_use]
pub fn safe_join(root: &Path, rel: &str) -> Option<PathBuf> {
    let rel = Path::new(rel);
    let mut components = rel.components().peekable();
    components.peek()?;
    components
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| root.join(rel))
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

/// Stream `root/rel` with its content type, or answer 404 with `not_found`.
async fn serve(root: &Path, rel: &str, request: Request, not_found: String) -> Response {
    let Some(path) = safe_join(root, rel) else {
        return AppError::not_found(not_found).into_response();
    };
    if !is_file(&path).await {
        return AppError::not_found(not_found).into_response();
    }
    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(infallible) => match infallible {},
    }
}

/// The SPA's `index.html`.
pub async fn spa_index(state: &AppState) -> Response {
    let path = state.config.frontend_dist.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Frontend bundle missing");
            AppError::not_found("File index.html not found").into_response()
        }
    }
}

/// `GET /`, `/resultados_cooperativas`, `/seleccionar_asientos`.
pub async fn index(State(state): State<AppState>) -> Response {
    spa_index(&state).await
}

/// `GET /assets/{*path}`
pub async fn assets(
    State(state): State<AppState>,
    UrlPath(path): UrlPath<String>,
    request: Request,
) -> Response {
    let root = state.config.frontend_dist.join("assets");
    serve(&root, &path, request, "Asset not found".into()).await
}

/// `GET /index.css`
pub async fn index_css(State(state): State<AppState>, request: Request) -> Response {
    serve(&state.config.frontend_dist, "index.css", request, "CSS file not found".into()).await
}

/// `GET /img/{*path}`
pub async fn images(
    State(state): State<AppState>,
    UrlPath(path): UrlPath<String>,
    request: Request,
) -> Response {
    let root = state.config.frontend_dist.join("img");
    let not_found = format!("Image {path} not found");
    serve(&root, &path, request, not_found).await
}

/// Any other path: a file from the bundle.
pub async fn static_file(State(state): State<AppState>, request: Request) -> Response {
    let raw = request.uri().path().trim_start_matches('/').to_string();
    let rel = urlencoding::decode(&raw).map_or(raw.clone(), |s| s.into_owned());
    let not_found = format!("File {rel} not found");
    serve(&state.config.frontend_dist, &rel, request, not_found).await
}

/// `GET /api/rutas`: the search form's route catalogue.
///
/// # Errors
///
/// 500 when `Ruta.json` is missing or not JSON.
pub async fn rutas(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let path = state.config.data_dir.join("Ruta.json");
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;
    let rutas = serde_json::from_str(&content).map_err(|e| AppError::internal(e.to_string()))?;
    Ok(Json(rutas))
}
