//! Gemini API client implementation

use crate::{
    error::GeminiError,
    types::{GenerateContentRequest, GenerateContentResponse},
};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Default `generateContent` endpoint
pub const DEFAULT_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

/// Reply used when the model returns no text
pub const FALLBACK_REPLY: &str = "Lo siento, no pude generar una respuesta.";

/// Instructions prepended to every user question
pub const SYSTEM_PROMPT: &str = "Eres un asistente de viajes experto de AventuraBus, una empresa de transporte terrestre en Ecuador. 
Tu rol es ayudar a los usuarios con:
- Información sobre rutas y destinos disponibles
- Recomendaciones de viaje y turismo en Ecuador
- Consejos para planificar viajes en bus
- Información sobre horarios y frecuencias
- Tips de seguridad y comodidad para viajes largos

Responde siempre en español de manera amigable y profesional. Si te preguntan sobre precios específicos o disponibilidad, sugiere que consulten la sección de búsqueda de boletos.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Gemini API client
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    api_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_url", &self.api_url)
            .field("has_key", &self.has_key())
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client. An empty key is accepted; `ask` then fails with
    /// `MissingApiKey`.
    #[must_use]
    pub fn new(api_key: impl Into<String>, api_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "HTTP client build failed, requests will not time out");
                Client::new()
            });

        Self {
            client,
            api_key: api_key.into(),
            api_url: api_url.into(),
        }
    }

    /// True when an API key is configured
    #[must_use]
    pub fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Ask the travel assistant a question
    ///
    /// # Errors
    ///
    /// - `MissingApiKey` without a key
    /// - `RateLimited` on 429
    /// - `Api` on any other non-2xx status
    /// - `Timeout` after 30 seconds
    /// - `RequestFailed` / `ResponseParseFailed` for transport or body problems
    pub async fn ask(&self, query: &str) -> Result<String, GeminiError> {
        if !self.has_key() {
            return Err(GeminiError::MissingApiKey);
        }

        let request = GenerateContentRequest::user_text(format!(
            "{SYSTEM_PROMPT}\n\nPregunta del usuario: {query}"
        ));

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let body = response
                    .json::<GenerateContentResponse>()
                    .await
                    .map_err(|e| GeminiError::ResponseParseFailed(e.to_string()))?;

                Ok(body
                    .first_text()
                    .map_or_else(|| FALLBACK_REPLY.to_string(), ToString::to_string))
            }
            StatusCode::TOO_MANY_REQUESTS => Err(GeminiError::RateLimited),
            status => {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(status = status.as_u16(), "Gemini API error");
                Err(GeminiError::Api {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new("test-key", format!("{}/generate", server.uri()))
    }

    #[test]
    fn test_client_creation() {
        let client = GeminiClient::new("test-key", DEFAULT_API_URL);
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.api_url, DEFAULT_API_URL);
        assert!(client.has_key());
    }

    #[tokio::test]
    async fn test_missing_key() {
        let client = GeminiClient::new("", DEFAULT_API_URL);
        let err = client.ask("hola").await.unwrap_err();
        assert!(matches!(err, GeminiError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_ask_returns_first_part() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(query_param("key", "test-key"))
            .and(body_string_contains("Pregunta del usuario: ¿Qué visitar en Baños?"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "Visita el Pailón del Diablo."}]}}]
            })))
            .mount(&server)
            .await;

        let reply = client_for(&server).ask("¿Qué visitar en Baños?").await.unwrap();
        assert_eq!(reply, "Visita el Pailón del Diablo.");
    }

    #[tokio::test]
    async fn test_empty_candidates_fall_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let reply = client_for(&server).ask("hola").await.unwrap();
        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = client_for(&server).ask("hola").await.unwrap_err();
        assert!(matches!(err, GeminiError::RateLimited));
    }

    #[tokio::test]
    async fn test_api_error_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = client_for(&server).ask("hola").await.unwrap_err();
        match err {
            GeminiError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "forbidden");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
