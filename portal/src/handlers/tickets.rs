//! Ticket PDF downloads.

use crate::guards::ApiUser;
use crate::rules::trips::TicketView;
use crate::server::AppState;
use crate::session::Session;
use crate::tickets::{render_boarding_pass, render_receipt, TicketError};
use aventura_backend::models::Boleto;
use aventura_backend::Resource;
use aventura_web::AppError;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

/// Ticket as a flat view, or 404.
async fn load_ticket(state: &AppState, session: &Session, id: i64) -> Result<TicketView, AppError> {
    match state.backend_for(session).fetch::<Boleto>(Resource::Boleto, id).await {
        Ok(Some(boleto)) => Ok(TicketView::from_boleto(&boleto)),
        Ok(None) => Err(AppError::not_found("Boleto no encontrado")),
        Err(e) => {
            tracing::warn!(id, error = %e, "Could not load ticket");
            Err(AppError::not_found("Boleto no encontrado"))
        }
    }
}

fn attachment(
    filename: &str,
    rendered: Result<Vec<u8>, TicketError>,
) -> Result<Response, AppError> {
    let bytes = rendered.map_err(|e| {
        AppError::internal("Error generando el PDF").with_source(anyhow::Error::new(e))
    })?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// `GET /generar_pdf_boleto/{id}`
///
/// # Errors
///
/// 404 for an unknown ticket, 500 when rendering fails.
pub async fn boarding_pass(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let ticket = load_ticket(&state, &session, id).await?;
    attachment(&format!("boleto_{id}.pdf"), render_boarding_pass(&ticket))
}

/// `GET /generar_ticket/{id}`
///
/// # Errors
///
/// 404 for an unknown ticket, 500 when rendering fails.
pub async fn receipt(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let ticket = load_ticket(&state, &session, id).await?;
    attachment(&format!("ticket_{id}.pdf"), render_receipt(&ticket))
}

/// `GET /api/cliente/boleto/{id}/pdf`: the caller's own boarding pass.
///
/// # Errors
///
/// 401 when logged out, 404 for an unknown ticket, 403 for someone else's,
/// 500 when rendering fails.
pub async fn client_boarding_pass(
    State(state): State<AppState>,
    session: Session,
    user: ApiUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let ticket = load_ticket(&state, &session, id).await?;
    if ticket.persona_id.is_none() || ticket.persona_id != user.persona_id() {
        return Err(AppError::forbidden("No autorizado"));
    }
    attachment(&format!("boleto_{id}.pdf"), render_boarding_pass(&ticket))
}
