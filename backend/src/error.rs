//! Backend error types

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when calling the backend
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection refused, DNS failure, broken body
    #[error("Error de conexión: {0}")]
    Transport(String),

    /// Request exceeded the configured timeout
    #[error("Tiempo de espera agotado")]
    Timeout,

    /// Backend answered with a non-2xx status
    #[error("{message}")]
    Status {
        /// HTTP status
        status: StatusCode,
        /// `mensaje`/`msg`/`error` from the body, or the raw body
        message: String,
    },

    /// Response body was not the expected JSON
    #[error("Respuesta inválida del servidor: {0}")]
    Decode(String),
}

impl BackendError {
    /// Build a status error from a response body.
    #[must_use]
    pub fn from_body(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| message_of(&value))
            .unwrap_or_else(|| body.to_string());

        Self::Status { status, message }
    }

    /// HTTP status when the backend answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a 404 answer.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// First of `mensaje`, `msg` or `error` present as a string.
#[must_use]
pub fn message_of(value: &serde_json::Value) -> Option<String> {
    ["mensaje", "msg", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .map(ToString::to_string)
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_prefers_mensaje() {
        let err = BackendError::from_body(
            StatusCode::BAD_REQUEST,
            r#"{"msg":"segundo","mensaje":"primero"}"#,
        );
        assert_eq!(err.to_string(), "primero");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_message_falls_back_to_raw_body() {
        let err = BackendError::from_body(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(err.to_string(), "boom");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_error_field() {
        let err = BackendError::from_body(StatusCode::NOT_FOUND, r#"{"error":"no existe"}"#);
        assert_eq!(err.to_string(), "no existe");
        assert!(err.is_not_found());
    }
}
