//! Travel assistant endpoint.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use aventura_gemini::GeminiClient;
use axum::http::StatusCode;
use common::{server, state_for};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gemini_for(mock: &MockServer) -> GeminiClient {
    GeminiClient::new("k", format!("{}/gen", mock.uri()))
}

#[tokio::test]
async fn test_empty_query_is_bad_request() {
    let backend = MockServer::start().await;
    let server = server(state_for(&backend));

    let response = server
        .post("/api/gemini/chat")
        .json(&json!({ "query": "   " }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "No se proporcionó una consulta");
}

#[tokio::test]
async fn test_missing_key_is_server_error() {
    let backend = MockServer::start().await;
    let server = server(state_for(&backend));

    server
        .post("/api/gemini/chat")
        .json(&json!({ "query": "¿Qué visitar en Baños?" }))
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_answer_is_returned_as_text() {
    let backend = MockServer::start().await;
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gen"))
        .and(query_param("key", "k"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "Hola" }] } }]
        })))
        .expect(1)
        .mount(&gemini)
        .await;
    let server = server(state_for(&backend).with_gemini(gemini_for(&gemini)));

    let body: Value = server
        .post("/api/gemini/chat")
        .json(&json!({ "query": "Hola" }))
        .await
        .json();
    assert_eq!(body, json!({ "text": "Hola" }));
}

#[tokio::test]
async fn test_rate_limit_maps_to_429() {
    let backend = MockServer::start().await;
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gen"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&gemini)
        .await;
    let server = server(state_for(&backend).with_gemini(gemini_for(&gemini)));

    server
        .post("/api/gemini/chat")
        .json(&json!({ "query": "Rutas a Cuenca" }))
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}
