//! Admin CRUD pages.
//!
//! Every [`Resource`] gets the same six routes; [`forms`] holds what differs
//! between entities.

pub mod forms;

use crate::guards::RequireAdmin;
use crate::handlers::{render, FormData};
use crate::server::AppState;
use crate::session::Session;
use crate::views::TableView;
use aventura_auth::FlashLevel;
use aventura_backend::{BackendError, Resource};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use forms::{Mode, Rejection};
use serde_json::{json, Value};

/// List, create, edit, delete, sort and search routes for every resource.
pub fn routes() -> Router<AppState> {
    Resource::ALL.into_iter().fold(Router::new(), resource_routes)
}

fn resource_routes(router: Router<AppState>, resource: Resource) -> Router<AppState> {
    let slug = resource.slug();
    router
        .route(
            &format!("/{slug}/lista"),
            get(move |State(state): State<AppState>, session: Session, _admin: RequireAdmin| {
                list(state, session, resource)
            }),
        )
        .route(
            &format!("/{slug}/crear"),
            get(move |State(state): State<AppState>, session: Session, _admin: RequireAdmin| {
                create_page(state, session, resource)
            })
            .post(
                move |State(state): State<AppState>,
                      session: Session,
                      _admin: RequireAdmin,
                      Form(form): Form<FormData>| {
                    save(state, session, resource, Mode::Create, form)
                },
            ),
        )
        .route(
            &format!("/{slug}/editar/:id"),
            get(
                move |State(state): State<AppState>,
                      session: Session,
                      _admin: RequireAdmin,
                      Path(id): Path<i64>| { edit_page(state, session, resource, id) },
            )
            .post(
                move |State(state): State<AppState>,
                      session: Session,
                      _admin: RequireAdmin,
                      Path(id): Path<i64>,
                      Form(form): Form<FormData>| {
                    save(state, session, resource, Mode::Edit(id), form)
                },
            ),
        )
        .route(
            &format!("/{slug}/eliminar/:id"),
            post(
                move |State(state): State<AppState>,
                      session: Session,
                      _admin: RequireAdmin,
                      Path(id): Path<i64>| { delete(state, session, resource, id) },
            ),
        )
        .route(
            &format!("/{slug}/ordenar/:atributo/:orden"),
            get(
                move |State(state): State<AppState>,
                      session: Session,
                      _admin: RequireAdmin,
                      Path((atributo, orden)): Path<(String, String)>| {
                    sort(state, session, resource, atributo, orden)
                },
            ),
        )
        .route(
            &format!("/{slug}/buscar/:atributo/:criterio"),
            get(
                move |State(state): State<AppState>,
                      session: Session,
                      _admin: RequireAdmin,
                      Path((atributo, criterio)): Path<(String, String)>| {
                    search(state, session, resource, atributo, criterio)
                },
            ),
        )
}

fn list_path(resource: Resource) -> String {
    format!("/{}/lista", resource.slug())
}

fn to_list(resource: Resource) -> Response {
    Redirect::to(&list_path(resource)).into_response()
}

fn load_failure(e: &BackendError) -> String {
    match e {
        BackendError::Status { status, .. } => format!("Error del servidor: {}", status.as_u16()),
        BackendError::Transport(_) => e.to_string(),
        other => format!("Error de conexión: {other}"),
    }
}

async fn list(state: AppState, session: Session, resource: Resource) -> Response {
    let rows = match state.backend_for(&session).list_raw(resource).await {
        Ok(mut body) => match body.get_mut(resource.collection_key()).map(Value::take) {
            Some(Value::Array(rows)) => rows,
            _ => Vec::new(),
        },
        Err(e) => {
            tracing::warn!(%resource, error = %e, "Failed to list");
            session.flash(FlashLevel::Danger, load_failure(&e));
            Vec::new()
        }
    };
    let rows = rows
        .into_iter()
        .map(|mut row| {
            forms::decorate(resource, &mut row);
            row
        })
        .collect();

    let table = TableView {
        resource,
        columns: forms::columns(resource),
        rows,
    };
    render(&state, &session, resource.label(), &table.render()).await
}

async fn create_page(state: AppState, session: Session, resource: Resource) -> Response {
    let backend = state.backend_for(&session);
    let view = forms::form(&backend, resource, Mode::Create, None).await;
    render(&state, &session, resource.label(), &view.render()).await
}

/// Item being edited, or the "not found" flash and redirect.
async fn existing(
    state: &AppState,
    session: &Session,
    resource: Resource,
    id: i64,
) -> Result<Value, Response> {
    match state.backend_for(session).fetch_raw(resource, id).await {
        Ok(Some(item)) => Ok(item),
        Ok(None) => {
            session.flash(
                FlashLevel::Danger,
                format!("{} no {}", resource.label(), resource.agree("encontrado")),
            );
            Err(to_list(resource))
        }
        Err(e) => {
            tracing::warn!(%resource, id, error = %e, "Failed to fetch");
            session.flash(FlashLevel::Danger, load_failure(&e));
            Err(to_list(resource))
        }
    }
}

async fn edit_page(state: AppState, session: Session, resource: Resource, id: i64) -> Response {
    let item = match existing(&state, &session, resource, id).await {
        Ok(item) => item,
        Err(response) => return response,
    };
    let backend = state.backend_for(&session);
    let view = forms::form(&backend, resource, Mode::Edit(id), Some(&item)).await;
    render(&state, &session, resource.label(), &view.render()).await
}

async fn save(
    state: AppState,
    session: Session,
    resource: Resource,
    mode: Mode,
    form: FormData,
) -> Response {
    let item = match mode {
        Mode::Create => None,
        Mode::Edit(id) => match existing(&state, &session, resource, id).await {
            Ok(item) => Some(item),
            Err(response) => return response,
        },
    };
    let backend = state.backend_for(&session);

    let outcome = match forms::payload(&backend, resource, mode, &form, item.as_ref()).await {
        Ok(body) => match mode {
            Mode::Create => backend.create(resource, &body).await,
            Mode::Edit(_) => backend.update(resource, &body).await,
        }
        .map_err(|e| format!("Error al guardar: {e}")),
        Err(Rejection::Invalid(message)) => Err(message),
        Err(Rejection::Backend(e)) => Err(load_failure(&e)),
    };

    match outcome {
        Ok(_) => {
            let participle = match mode {
                Mode::Create => "creado",
                Mode::Edit(_) => "actualizado",
            };
            tracing::info!(%resource, ?mode, "Saved");
            session.flash(
                FlashLevel::Success,
                format!("{} {} exitosamente", resource.label(), resource.agree(participle)),
            );
            to_list(resource)
        }
        Err(message) => {
            tracing::debug!(%resource, ?mode, %message, "Form rejected");
            let view = forms::form(&backend, resource, mode, item.as_ref())
                .await
                .error(message)
                .refill(&form);
            render(&state, &session, resource.label(), &view.render()).await
        }
    }
}

async fn delete(state: AppState, session: Session, resource: Resource, id: i64) -> Response {
    let backend = state.backend_for(&session);

    if resource == Resource::Cuenta {
        match backend.fetch_raw(resource, id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                session.flash(FlashLevel::Danger, "La cuenta no existe");
                return to_list(resource);
            }
            Err(e) => {
                session.flash(FlashLevel::Danger, format!("Error al eliminar: {e}"));
                return to_list(resource);
            }
        }
    }

    match backend.delete(resource, id).await {
        Ok(_) => {
            tracing::info!(%resource, id, "Deleted");
            session.flash(
                FlashLevel::Success,
                format!("{} {} exitosamente", resource.label(), resource.agree("eliminado")),
            );
        }
        Err(e) => {
            tracing::warn!(%resource, id, error = %e, "Delete failed");
            session.flash(FlashLevel::Danger, format!("Error al eliminar: {e}"));
        }
    }
    to_list(resource)
}

async fn sort(
    state: AppState,
    session: Session,
    resource: Resource,
    atributo: String,
    orden: String,
) -> Response {
    match state.backend_for(&session).sort(resource, &atributo, &orden).await {
        Ok(body) => Json(body).into_response(),
        Err(BackendError::Status { status, message }) => {
            (status, Json(json!({ "error": message }))).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Error al ordenar: {e}") })),
        )
            .into_response(),
    }
}

async fn search(
    state: AppState,
    session: Session,
    resource: Resource,
    atributo: String,
    criterio: String,
) -> Response {
    match state.backend_for(&session).search(resource, &atributo, &criterio).await {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            let status = e.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let message = match &e {
                BackendError::Status { message, .. } => message.clone(),
                other => other.to_string(),
            };
            (status, Json(json!({ "error": format!("Error en la búsqueda: {message}") })))
                .into_response()
        }
    }
}
