//! Checkout over HTTP.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::{login, mount_login, persona, server, state_for, CLIENT_EMAIL};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn viaje(total: f64) -> String {
    json!({
        "fecha": "20/10/2026",
        "hora": "08:00",
        "origen": "Loja",
        "destino": "Quito",
        "asientos": [3, 4],
        "precio_unitario": 12.5,
        "total": total,
        "cooperativa": "Loja Express"
    })
    .to_string()
}

async fn client(backend: &MockServer) -> TestServer {
    mount_login(backend).await;
    Mock::given(method("GET"))
        .and(path("/api/persona/lista/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "persona": persona(2, CLIENT_EMAIL, "Cliente")
        })))
        .mount(backend)
        .await;
    let server = server(state_for(backend));
    login(&server, CLIENT_EMAIL).await;
    server
}

async fn mount_turnos(backend: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/turno/lista"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "turnos": [{
                "id_turno": 9,
                "numero_turno": "1",
                "fecha_salida": "20/10/2026",
                "horario": {
                    "id_horario": 4,
                    "hora_salida": "08:00",
                    "hora_llegada": "18:00",
                    "ruta": { "id_ruta": 1, "origen": "Loja", "destino": "Quito" }
                }
            }]
        })))
        .mount(backend)
        .await;
}

#[tokio::test]
async fn test_purchase_creates_one_ticket_per_seat() {
    let backend = MockServer::start().await;
    mount_turnos(&backend).await;
    Mock::given(method("POST"))
        .and(path("/api/boleto/guardar"))
        .and(body_partial_json(json!({
            "estado_boleto": "Vendido",
            "persona": { "id_persona": 2 },
            "turno": { "id_turno": 9 }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "boleto": { "id_boleto": 31 } })),
        )
        .expect(2)
        .mount(&backend)
        .await;
    let server = client(&backend).await;

    let response = server
        .post("/procesar_pago")
        .form(&[("viajeInfo", viaje(25.0))])
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Boletos generados correctamente");
    assert_eq!(
        body["pdf_paths"],
        json!(["/generar_pdf_boleto/31", "/generar_pdf_boleto/31"])
    );
    assert_eq!(body["nuevo_saldo"], 75.0);
}

#[tokio::test]
async fn test_insufficient_balance() {
    let backend = MockServer::start().await;
    let server = client(&backend).await;

    let body: Value = server
        .post("/procesar_pago")
        .form(&[("viajeInfo", viaje(500.0))])
        .await
        .json();
    assert_eq!(body, json!({ "success": false, "message": "Saldo insuficiente" }));
}

#[tokio::test]
async fn test_unknown_departure_is_bad_request() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/turno/lista"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "turnos": [] })))
        .mount(&backend)
        .await;
    let server = client(&backend).await;

    let response = server
        .post("/procesar_pago")
        .form(&[("viajeInfo", viaje(25.0))])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "No se encontró un turno válido");
}

#[tokio::test]
async fn test_empty_cart_is_rejected() {
    let backend = MockServer::start().await;
    let server = client(&backend).await;

    let body: Value = server
        .post("/procesar_pago")
        .form(&[("viajeInfo", r#"{"asientos":[]}"#)])
        .await
        .json();
    assert_eq!(body["message"], "Información de viaje inválida");
}

#[tokio::test]
async fn test_price_breakdown_applies_fare_discount() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/descuento/lista"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "descuentos": [{
                "id_descuento": 1,
                "nombre_descuento": "General",
                "porcentaje": 10,
                "estado_descuento": "Activo",
                "tipo_descuento": "General"
            }]
        })))
        .mount(&backend)
        .await;
    let server = client(&backend).await;

    let response = server
        .get("/api/metodos-pago/usuario")
        .add_query_param("viajeInfo", viaje(25.0))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["metodos"], json!([]));
    assert_eq!(body["persona"]["precio_original"], 25.0);
    assert_eq!(body["persona"]["precio_final"], 22.5);
    assert_eq!(body["persona"]["descuentos_aplicables"][0]["tipo"], "Tarifa Base");
}

#[tokio::test]
async fn test_transfer_balance() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/persona/transferir-saldo"))
        .and(body_partial_json(json!({ "id_persona": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&backend)
        .await;
    let server = client(&backend).await;

    let body: Value = server.post("/api/metodos-pago/transferir-saldo").await.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Saldo transferido correctamente");
}
