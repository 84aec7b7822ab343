//! Travel assistant chat.

use crate::server::AppState;
use aventura_gemini::GeminiError;
use aventura_web::AppError;
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// `POST /api/gemini/chat` body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    /// User question.
    pub query: String,
}

/// Response error for an assistant failure.
#[must_use]
pub fn chat_error(error: &GeminiError) -> AppError {
    match error {
        GeminiError::MissingApiKey => AppError::internal("API key de Gemini no configurada"),
        GeminiError::RateLimited => {
            AppError::too_many_requests("Cuota de API excedida. Por favor, intenta más tarde.")
        }
        GeminiError::Timeout => AppError::gateway_timeout("Tiempo de espera agotado"),
        GeminiError::Api { status, .. } => AppError::from_status(
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            format!("Error de la API de Gemini: {status}"),
        ),
        GeminiError::RequestFailed(_) | GeminiError::ResponseParseFailed(_) => {
            AppError::internal("Error interno del servidor")
        }
    }
}

/// `POST /api/gemini/chat {query}` → `{text}`.
///
/// # Errors
///
/// 400 without a query, otherwise the mapping in [`chat_error`].
pub async fn chat(
    State(state): State<AppState>,
    body: Option<Json<ChatRequest>>,
) -> Result<Json<Value>, AppError> {
    let query = body.map(|Json(b)| b.query).unwrap_or_default();
    if query.trim().is_empty() {
        return Err(AppError::bad_request("No se proporcionó una consulta"));
    }

    let text = state.gemini.ask(&query).await.map_err(|e| {
        tracing::warn!(error = %e, "Assistant request failed");
        chat_error(&e)
    })?;
    Ok(Json(json!({ "text": text })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_statuses() {
        let cases = [
            (GeminiError::MissingApiKey, StatusCode::INTERNAL_SERVER_ERROR),
            (GeminiError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (GeminiError::Timeout, StatusCode::GATEWAY_TIMEOUT),
            (
                GeminiError::Api { status: 403, message: String::new() },
                StatusCode::FORBIDDEN,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(chat_error(&error).status(), status);
        }
    }

    #[test]
    fn test_api_error_message_names_status() {
        let error = GeminiError::Api { status: 503, message: "down".into() };
        assert_eq!(chat_error(&error).message(), "Error de la API de Gemini: 503");
    }
}
