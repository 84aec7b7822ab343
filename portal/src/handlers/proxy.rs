//! JSON passthrough to the backend for the React bundle.

use crate::server::AppState;
use crate::session::Session;
use aventura_backend::{Method, Resource};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};

/// Resources with list, save, update and delete passthroughs.
const FULL: [Resource; 3] = [Resource::Cooperativa, Resource::Bus, Resource::Ruta];

/// Resources with list, save and delete passthroughs.
const NO_UPDATE: [Resource; 4] = [
    Resource::Horario,
    Resource::Escala,
    Resource::Descuento,
    Resource::Persona,
];

/// `/api/...` passthrough routes.
pub fn routes() -> Router<AppState> {
    let router = FULL.into_iter().fold(Router::new(), |router, resource| {
        let router = basic_routes(router, resource);
        router.route(
            &format!("/api/{}/actualizar", resource.slug()),
            put(move |State(state): State<AppState>, session: Session, Json(body): Json<Value>| {
                pass(state, session, Method::PUT, format!("/api/{}/actualizar", resource.slug()), Some(body))
            }),
        )
    });
    let router = NO_UPDATE.into_iter().fold(router, basic_routes);

    router
        .route(
            "/api/boleto/lista",
            get(|State(state): State<AppState>, session: Session| {
                pass(state, session, Method::GET, "/api/boleto/lista".to_string(), None)
            }),
        )
        .route("/api/turno/lista", get(turnos))
}

fn basic_routes(router: Router<AppState>, resource: Resource) -> Router<AppState> {
    let slug = resource.slug();
    router
        .route(
            &format!("/api/{slug}/lista"),
            get(move |State(state): State<AppState>, session: Session| {
                pass(state, session, Method::GET, format!("/api/{slug}/lista"), None)
            }),
        )
        .route(
            &format!("/api/{slug}/guardar"),
            post(move |State(state): State<AppState>, session: Session, Json(body): Json<Value>| {
                pass(state, session, Method::POST, format!("/api/{slug}/guardar"), Some(body))
            }),
        )
        .route(
            &format!("/api/{slug}/eliminar/:id"),
            delete(move |State(state): State<AppState>, session: Session, Path(id): Path<i64>| {
                pass(state, session, Method::DELETE, format!("/api/{slug}/eliminar/{id}"), None)
            }),
        )
}

/// Backend status and body, or 500 `{"error"}` when it is unreachable.
async fn pass(
    state: AppState,
    session: Session,
    method: Method,
    path: String,
    body: Option<Value>,
) -> Response {
    match state.backend_for(&session).forward(method.clone(), &path, body).await {
        Ok((status, value)) => (status, Json(value)).into_response(),
        Err(e) => {
            tracing::warn!(%method, %path, error = %e, "Passthrough failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// `GET /api/turno/lista`
async fn turnos(State(state): State<AppState>, session: Session) -> Response {
    match state
        .backend_for(&session)
        .forward(Method::GET, "/api/turno/lista", None)
        .await
    {
        Ok((StatusCode::OK, value)) => Json(value).into_response(),
        Ok((status, _)) => {
            (status, Json(json!({ "error": "Error al obtener turnos" }))).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
