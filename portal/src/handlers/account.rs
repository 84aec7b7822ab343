//! Profile pages, the two SPA dashboards and the client dashboard API.

use super::auth::{complete_google_login, CallbackParams};
use super::{form_value, home_for, render, site::spa_index, today, FormData};
use crate::guards::{ApiUser, RequireAdmin, RequireClient, RequireLogin};
use crate::rules::trips::{dashboard_stats, TicketView};
use crate::server::AppState;
use crate::session::Session;
use crate::views::pages;
use aventura_auth::FlashLevel;
use aventura_backend::models::{Boleto, Persona};
use aventura_backend::{BackendClient, BackendError, Resource};
use axum::{
    extract::{FromRequestParts, Query, Request, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde_json::{json, Value};

const PROFILE_PATH: &str = "/perfil";

/// Fields the SPA may change through the profile API.
const EDITABLE_FIELDS: [&str; 9] = [
    "tipo_identificacion",
    "numero_identificacion",
    "nombre",
    "apellido",
    "direccion",
    "fecha_nacimiento",
    "telefono",
    "correo",
    "genero",
];

/// `GET /perfil`
pub async fn profile_page(
    State(state): State<AppState>,
    session: Session,
    RequireLogin(user): RequireLogin,
) -> Response {
    let fetched = match user.id {
        Some(id) => state.backend_for(&session).fetch::<Persona>(Resource::Persona, id).await,
        None => Ok(None),
    };

    match fetched {
        Ok(Some(persona)) => {
            render(&state, &session, "Mi perfil", &pages::profile(&persona, None)).await
        }
        Ok(None) => {
            session.flash(FlashLevel::Danger, "Error al cargar el perfil: persona no encontrada");
            Redirect::to(home_for(&user)).into_response()
        }
        Err(e) => {
            session.flash(FlashLevel::Danger, format!("Error al cargar el perfil: {e}"));
            Redirect::to(home_for(&user)).into_response()
        }
    }
}

/// Apply the profile form over the stored persona. Balance, payment method
/// and the account's id, type and status are kept; the password only
/// changes when a new one was typed.
fn apply_profile_form(mut persona: Persona, form: &[(String, String)]) -> Persona {
    let correo = form_value(form, "correo").to_string();
    let genero = form_value(form, "genero");
    let tarifa = form_value(form, "tipo_tarifa");

    persona.tipo_identificacion = form_value(form, "tipo_identificacion").to_string();
    persona.numero_identificacion = form_value(form, "numero_identificacion").to_string();
    persona.nombre = form_value(form, "nombre").to_string();
    persona.apellido = form_value(form, "apellido").to_string();
    persona.direccion = form_value(form, "direccion").to_string();
    persona.fecha_nacimiento = form_value(form, "fecha_nacimiento").to_string();
    persona.telefono = form_value(form, "telefono").to_string();
    persona.genero = if genero.is_empty() { "No_definido" } else { genero }.to_string();
    persona.tipo_tarifa = if tarifa.is_empty() { "General" } else { tarifa }.to_string();
    persona.correo.clone_from(&correo);

    let cuenta = persona.cuenta.get_or_insert_with(Default::default);
    cuenta.correo = correo;
    if cuenta.tipo_cuenta.is_empty() {
        cuenta.tipo_cuenta = "Cliente".into();
    }
    if cuenta.estado_cuenta.is_empty() {
        cuenta.estado_cuenta = "Activo".into();
    }
    let contrasenia = form_value(form, "contrasenia");
    if !contrasenia.is_empty() {
        cuenta.contrasenia = Some(contrasenia.to_string());
    }
    persona
}

async fn save_profile(
    backend: &BackendClient,
    id: Option<i64>,
    form: &[(String, String)],
) -> Result<Value, BackendError> {
    let id = id.ok_or_else(|| BackendError::Decode("sesión sin persona".into()))?;
    let current = backend
        .fetch::<Persona>(Resource::Persona, id)
        .await?
        .ok_or_else(|| BackendError::Status {
            status: StatusCode::NOT_FOUND,
            message: "Usuario no encontrado".into(),
        })?;
    let mut updated = apply_profile_form(current, form);
    updated.id_persona = Some(id);
    backend
        .update(Resource::Persona, &serde_json::to_value(&updated)?)
        .await
}

/// `POST /perfil`
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireLogin(user): RequireLogin,
    Form(form): Form<FormData>,
) -> Response {
    let backend = state.backend_for(&session);

    match save_profile(&backend, user.id, &form).await {
        Ok(_) => {
            session.update_user(|u| {
                u.nombre = form_value(&form, "nombre").to_string();
                u.apellido = form_value(&form, "apellido").to_string();
                u.correo = form_value(&form, "correo").to_string();
            });
            session.flash(FlashLevel::Success, "Perfil actualizado exitosamente");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Profile update failed");
            session.flash(FlashLevel::Danger, format!("Error al actualizar el perfil: {e}"));
        }
    }
    Redirect::to(PROFILE_PATH).into_response()
}

/// `GET /cliente`
///
/// Google sometimes sends the user back here instead of the registered
/// callback; `code`/`error` are handled before the client check.
pub async fn cliente(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<CallbackParams>,
    request: Request,
) -> Response {
    if params.is_callback() {
        return complete_google_login(&state, &session, params).await;
    }

    let (mut parts, _body) = request.into_parts();
    if let Err(rejection) = RequireClient::from_request_parts(&mut parts, &state).await {
        return rejection;
    }
    spa_index(&state).await
}

/// `GET /administrador`
pub async fn administrador(State(state): State<AppState>, _admin: RequireAdmin) -> Response {
    spa_index(&state).await
}

/// `GET /api/cliente/dashboard`
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    user: ApiUser,
) -> Response {
    let Some(id) = user.persona_id() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Usuario no autenticado" })),
        )
            .into_response();
    };
    let backend = state.backend_for(&session);

    let usuario = match backend.fetch::<Persona>(Resource::Persona, id).await {
        Ok(Some(persona)) => json!({
            "id": persona.id_persona,
            "nombre": persona.nombre,
            "apellido": persona.apellido,
            "correo": persona.email(),
            "tipo_cuenta": persona.tipo_cuenta(),
            "tipo_identificacion": persona.tipo_identificacion,
            "numero_identificacion": persona.numero_identificacion,
            "fecha_nacimiento": persona.fecha_nacimiento,
            "direccion": persona.direccion,
            "telefono": persona.telefono,
            "genero": persona.genero,
            "tipo_tarifa": if persona.tipo_tarifa.is_empty() { "General" } else { persona.tipo_tarifa.as_str() },
            "saldo_disponible": persona.saldo_disponible,
            "metodo_pago": persona.metodo_pago,
        }),
        Ok(None) => json!({}),
        Err(e) => {
            tracing::warn!(error = %e, persona_id = id, "Dashboard could not load persona");
            json!({})
        }
    };

    let tickets: Vec<TicketView> = match backend.list::<Boleto>(Resource::Boleto).await {
        Ok(boletos) => boletos
            .iter()
            .filter(|b| b.persona_id() == Some(id))
            .map(TicketView::from_boleto)
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Dashboard could not load tickets");
            Vec::new()
        }
    };

    Json(json!({
        "success": true,
        "usuario": usuario,
        "boletos": tickets.iter().map(TicketView::dashboard_entry).collect::<Vec<_>>(),
        "estadisticas": dashboard_stats(&tickets, today()),
    }))
    .into_response()
}

/// Merge the SPA's profile JSON over the stored persona.
fn merge_profile(current: &Persona, id: i64, changes: &Value) -> Result<Value, BackendError> {
    let mut merged = serde_json::to_value(current)?;
    merged["id_persona"] = json!(id);
    for field in EDITABLE_FIELDS {
        if let Some(value) = changes.get(field).filter(|v| !v.is_null()) {
            merged[field] = value.clone();
        }
    }

    if let Some(password) = changes
        .get("nueva_contrasena")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
    {
        if !merged["cuenta"].is_object() {
            merged["cuenta"] = json!({});
        }
        merged["cuenta"]["contrasenia"] = json!(password);
    }
    Ok(merged)
}

fn profile_reply(status: StatusCode, success: bool, message: impl Into<String>) -> Response {
    (status, Json(json!({ "success": success, "message": message.into() }))).into_response()
}

/// `PUT /api/cliente/perfil/actualizar`
pub async fn api_update_profile(
    State(state): State<AppState>,
    session: Session,
    user: ApiUser,
    Json(changes): Json<Value>,
) -> Response {
    let Some(id) = user.persona_id() else {
        return profile_reply(StatusCode::UNAUTHORIZED, false, "Usuario no autenticado");
    };
    let backend = state.backend_for(&session);

    let current = match backend.fetch::<Persona>(Resource::Persona, id).await {
        Ok(Some(persona)) => persona,
        Ok(None) | Err(_) => {
            return profile_reply(
                StatusCode::BAD_REQUEST,
                false,
                "Error al obtener datos del usuario",
            )
        }
    };

    let merged = match merge_profile(&current, id, &changes) {
        Ok(merged) => merged,
        Err(e) => return profile_reply(StatusCode::INTERNAL_SERVER_ERROR, false, e.to_string()),
    };

    match backend.update(Resource::Persona, &merged).await {
        Ok(_) => {
            session.update_user(|u| {
                if let Some(nombre) = merged["nombre"].as_str() {
                    u.nombre = nombre.to_string();
                }
                if let Some(apellido) = merged["apellido"].as_str() {
                    u.apellido = apellido.to_string();
                }
            });
            profile_reply(StatusCode::OK, true, "Perfil actualizado correctamente")
        }
        Err(BackendError::Status { message, .. }) => {
            tracing::warn!(%message, "Backend refused profile update");
            profile_reply(StatusCode::BAD_REQUEST, false, "Error al actualizar el perfil")
        }
        Err(e) => profile_reply(StatusCode::INTERNAL_SERVER_ERROR, false, e.to_string()),
    }
}
