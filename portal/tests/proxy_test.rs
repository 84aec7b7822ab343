//! `/api/...` passthrough to the backend.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use aventura_portal::Config;
use axum::http::StatusCode;
use common::{server, state_for, state_with};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_list_body_is_relayed() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cooperativa/lista"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cooperativas": [{ "id_cooperativa": 1, "nombre_cooperativa": "Loja" }]
        })))
        .mount(&backend)
        .await;
    let server = server(state_for(&backend));

    let body: Value = server.get("/api/cooperativa/lista").await.json();
    assert_eq!(body["cooperativas"][0]["id_cooperativa"], 1);
}

#[tokio::test]
async fn test_save_keeps_backend_status() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/escala/guardar"))
        .and(body_json(json!({ "lugar_escala": "Saraguro" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "mensaje": "creado" })))
        .expect(1)
        .mount(&backend)
        .await;
    let server = server(state_for(&backend));

    let response = server
        .post("/api/escala/guardar")
        .json(&json!({ "lugar_escala": "Saraguro" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["mensaje"], "creado");
}

#[tokio::test]
async fn test_backend_error_is_passed_through() {
    let backend = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/bus/eliminar/4"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "mensaje": "Bus con turnos" })),
        )
        .mount(&backend)
        .await;
    let server = server(state_for(&backend));

    let response = server.delete("/api/bus/eliminar/4").await;
    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["mensaje"], "Bus con turnos");
}

#[tokio::test]
async fn test_update_route_exists_only_where_supported() {
    let backend = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/ruta/actualizar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "mensaje": "ok" })))
        .mount(&backend)
        .await;
    let server = server(state_for(&backend));

    server
        .put("/api/ruta/actualizar")
        .json(&json!({ "id_ruta": 1 }))
        .await
        .assert_status_ok();
    server
        .put("/api/horario/actualizar")
        .json(&json!({ "id_horario": 1 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_turnos_failure_has_fixed_message() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/turno/lista"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "mensaje": "caido" })))
        .mount(&backend)
        .await;
    let server = server(state_for(&backend));

    let response = server.get("/api/turno/lista").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["error"], "Error al obtener turnos");
}

#[tokio::test]
async fn test_unreachable_backend_is_server_error() {
    let server = server(state_with(Config::for_backend("http://127.0.0.1:9")));

    let response = server.get("/api/descuento/lista").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}
