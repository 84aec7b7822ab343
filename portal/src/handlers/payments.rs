//! Checkout: ticket purchase, balance transfer and the price breakdown.

use crate::guards::RequireLogin;
use crate::handlers::{render, today, today_dmy, FormData, form_value};
use crate::metrics::record_tickets_issued;
use crate::rules::pricing::quote;
use crate::rules::schedule::parse_dmy;
use crate::rules::trips::find_departure;
use crate::server::AppState;
use crate::session::Session;
use crate::views::pages::{pago_boleto, METODOS_PAGO};
use aventura_auth::FlashLevel;
use aventura_backend::models::lenient;
use aventura_backend::models::{Descuento, Persona, Turno};
use aventura_backend::{BackendClient, BackendError, Resource};
use aventura_web::CorrelationId;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// Cart the React bundle stores in `sessionStorage` as `viajeInfo`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ViajeInfo {
    /// `dd/mm/YYYY`.
    #[serde(deserialize_with = "lenient::string")]
    pub fecha: String,
    /// Departure time.
    #[serde(deserialize_with = "lenient::string")]
    pub hora: String,
    /// Origin city.
    #[serde(deserialize_with = "lenient::string")]
    pub origen: String,
    /// Destination city.
    #[serde(deserialize_with = "lenient::string")]
    pub destino: String,
    /// Seat numbers.
    #[serde(deserialize_with = "lenient::int_list")]
    pub asientos: Vec<i64>,
    /// Price per seat.
    #[serde(deserialize_with = "lenient::f64")]
    pub precio_unitario: f64,
    /// Amount to charge.
    #[serde(deserialize_with = "lenient::f64")]
    pub total: f64,
    /// Cooperativa as shown in the results page.
    pub cooperativa: Value,
}

impl ViajeInfo {
    /// Parse the JSON string; `None` when malformed.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

fn outcome(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "success": false, "message": message.into() })),
    )
        .into_response()
}

/// `GET /procesar_pago`
pub async fn payment_page(
    State(state): State<AppState>,
    session: Session,
    _user: RequireLogin,
) -> Response {
    render(&state, &session, "Pago", &pago_boleto(&METODOS_PAGO)).await
}

/// `POST /procesar_pago`: one ticket per seat on the matching departure.
pub async fn process_payment(
    State(state): State<AppState>,
    session: Session,
    RequireLogin(user): RequireLogin,
    CorrelationId(correlation_id): CorrelationId,
    Form(form): Form<FormData>,
) -> Response {
    let Some(viaje) = ViajeInfo::parse(form_value(&form, "viajeInfo")).filter(|v| !v.asientos.is_empty())
    else {
        return outcome(StatusCode::OK, "Información de viaje inválida");
    };
    let Some(persona_id) = user.id else {
        return outcome(StatusCode::OK, "Error al obtener datos del usuario");
    };
    let backend = state.backend_for(&session);

    let persona = match backend.fetch::<Persona>(Resource::Persona, persona_id).await {
        Ok(Some(persona)) => persona,
        Ok(None) | Err(_) => return outcome(StatusCode::OK, "Error al obtener datos del usuario"),
    };
    let saldo_actual = persona.saldo_disponible;
    if saldo_actual < viaje.total {
        return outcome(StatusCode::OK, "Saldo insuficiente");
    }

    let turnos: Vec<Turno> = match backend.list(Resource::Turno).await {
        Ok(turnos) => turnos,
        Err(e) => {
            tracing::warn!(error = %e, "Could not load departures");
            return outcome(StatusCode::BAD_REQUEST, "Error al obtener turnos");
        }
    };
    let turno_id = parse_dmy(&viaje.fecha)
        .and_then(|fecha| find_departure(&turnos, fecha, &viaje.hora, &viaje.origen, &viaje.destino))
        .and_then(|turno| turno.id_turno);
    let Some(turno_id) = turno_id else {
        return outcome(StatusCode::BAD_REQUEST, "No se encontró un turno válido");
    };

    let pdf_paths = match issue_tickets(&backend, &viaje, persona_id, turno_id).await {
        Ok(paths) => paths,
        Err(e) => {
            tracing::error!(%correlation_id, persona_id, turno_id, error = %e, "Ticket purchase failed");
            return outcome(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error al guardar boleto: {e}"),
            );
        }
    };
    record_tickets_issued(pdf_paths.len());
    tracing::info!(
        %correlation_id,
        persona_id,
        turno_id,
        seats = viaje.asientos.len(),
        "Tickets issued"
    );

    Json(json!({
        "success": true,
        "message": "Boletos generados correctamente",
        "pdf_paths": pdf_paths,
        "nuevo_saldo": saldo_actual - viaje.total,
    }))
    .into_response()
}

/// Save one ticket per seat; returns their PDF links.
async fn issue_tickets(
    backend: &BackendClient,
    viaje: &ViajeInfo,
    persona_id: i64,
    turno_id: i64,
) -> Result<Vec<String>, BackendError> {
    let fecha_compra = today_dmy();
    let mut paths = Vec::with_capacity(viaje.asientos.len());

    for seat in &viaje.asientos {
        let body = json!({
            "fecha_compra": fecha_compra,
            "asientos": [seat],
            "precio_unitario": viaje.precio_unitario,
            "estado_boleto": "Vendido",
            "persona": { "id_persona": persona_id },
            "turno": { "id_turno": turno_id },
        });
        let saved = backend.create(Resource::Boleto, &body).await?;
        if let Some(id) = saved
            .pointer("/boleto/id_boleto")
            .and_then(lenient::as_i64)
        {
            paths.push(format!("/generar_pdf_boleto/{id}"));
        }
    }
    Ok(paths)
}

/// `POST /api/metodos-pago/transferir-saldo`
pub async fn transfer_balance(
    State(state): State<AppState>,
    session: Session,
    RequireLogin(user): RequireLogin,
) -> Response {
    let Some(persona_id) = user.id else {
        return outcome(StatusCode::UNAUTHORIZED, "Usuario no identificado");
    };
    match state.backend_for(&session).transfer_balance(persona_id).await {
        Ok(_) => Json(json!({ "success": true, "message": "Saldo transferido correctamente" }))
            .into_response(),
        Err(e) => {
            tracing::warn!(persona_id, error = %e, "Balance transfer failed");
            outcome(StatusCode::INTERNAL_SERVER_ERROR, "Error al transferir el saldo")
        }
    }
}

/// Query of `GET /api/metodos-pago/usuario`.
#[derive(Debug, Default, Deserialize)]
pub struct MetodosQuery {
    /// JSON-encoded [`ViajeInfo`].
    #[serde(rename = "viajeInfo")]
    pub viaje_info: Option<String>,
}

/// `GET /api/metodos-pago/usuario`: stored payment method plus the price
/// after discounts.
pub async fn user_payment_methods(
    State(state): State<AppState>,
    session: Session,
    RequireLogin(user): RequireLogin,
    Query(query): Query<MetodosQuery>,
) -> Response {
    let Some(persona_id) = user.id else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Usuario no autenticado" })),
        )
            .into_response();
    };
    let viaje = query
        .viaje_info
        .as_deref()
        .and_then(ViajeInfo::parse)
        .unwrap_or_default();
    let backend = state.backend_for(&session);

    let persona = match backend.fetch::<Persona>(Resource::Persona, persona_id).await {
        Ok(Some(persona)) => persona,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Error al obtener métodos de pago" })),
            )
                .into_response()
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    };

    let metodos: Vec<Value> = persona
        .metodo_pago
        .iter()
        .map(|m| {
            json!({
                "id_pago": m.id_pago,
                "saldo": m.saldo,
                "numero_tarjeta": m.numero_tarjeta,
                "titular": m.titular,
                "fecha_vencimiento": m.fecha_vencimiento,
                "codigo_seguridad": m.codigo_seguridad,
                "opcion_pago": m.opcion_pago,
            })
        })
        .collect();
    if metodos.is_empty() {
        session.flash(FlashLevel::Info, "No se encontraron métodos de pago");
    }

    let descuentos: Vec<Descuento> = backend.list(Resource::Descuento).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Could not load discounts");
        Vec::new()
    });
    let tipo_tarifa = match persona.tipo_tarifa.as_str() {
        "" => "General",
        other => other,
    };
    let breakdown = quote(
        viaje.precio_unitario,
        viaje.asientos.len(),
        tipo_tarifa,
        &descuentos,
        today(),
    );

    let mut persona_json = json!({
        "nombre": persona.nombre,
        "apellido": persona.apellido,
        "correo": persona.correo,
        "saldo_disponible": persona.saldo_disponible,
        "tipo_tarifa": tipo_tarifa.replace('_', " "),
    });
    if let (Some(map), Ok(Value::Object(prices))) =
        (persona_json.as_object_mut(), serde_json::to_value(&breakdown))
    {
        map.extend(prices);
    }

    Json(json!({ "metodos": metodos, "persona": persona_json })).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_viaje_info_accepts_loose_numbers() {
        let viaje = ViajeInfo::parse(
            r#"{"fecha":"20/10/2026","hora":"08:00","origen":"Loja","destino":"Quito",
                "asientos":["3", 4],"precio_unitario":"12.5","total":25,"cooperativa":"Loja"}"#,
        )
        .unwrap();
        assert_eq!(viaje.asientos, vec![3, 4]);
        assert!((viaje.precio_unitario - 12.5).abs() < f64::EPSILON);
        assert!((viaje.total - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_viaje_info_rejects_garbage() {
        assert!(ViajeInfo::parse("no es json").is_none());
        assert!(ViajeInfo::parse("{}").unwrap().asientos.is_empty());
    }
}
