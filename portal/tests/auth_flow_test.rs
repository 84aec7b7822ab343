//! Login, logout, registration, recovery and access guards over HTTP.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use common::{login, mount_login, server, state_for, ADMIN_EMAIL, CLIENT_EMAIL};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SESSION_COOKIE: &str = "aventura_session";

fn xhr() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static("XMLHttpRequest"),
    )
}

fn registration_form(numero: &str, correo: &str) -> Vec<(&'static str, String)> {
    vec![
        ("tipo_identificacion", "Cedula".into()),
        ("numero_identificacion", numero.into()),
        ("nombre", "Luis".into()),
        ("apellido", "Paz".into()),
        ("correo", correo.into()),
        ("contrasenia", "clave".into()),
        ("fecha_nacimiento", "1995-03-05".into()),
    ]
}

#[tokio::test]
async fn test_anonymous_admin_page_redirects_to_login() {
    let backend = MockServer::start().await;
    let server = server(state_for(&backend));

    let response = server.get("/bus/lista").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/iniciar_sesion");
}

#[tokio::test]
async fn test_json_login_returns_user_and_keeps_session() {
    let backend = MockServer::start().await;
    mount_login(&backend).await;
    let server = server(state_for(&backend));

    let response = server
        .post("/iniciar_sesion")
        .json(&json!({ "correo": ADMIN_EMAIL, "contrasenia": "secreto" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["rol"], "admin");
    assert_eq!(body["token"], "tok-123");
    assert_eq!(body["correo"], ADMIN_EMAIL);

    let check: Value = server.get("/verificar_sesion").await.json();
    assert_eq!(check["sesion_activa"], true);
}

#[tokio::test]
async fn test_missing_credentials() {
    let backend = MockServer::start().await;
    let server = server(state_for(&backend));

    let response = server
        .post("/iniciar_sesion")
        .json(&json!({ "correo": "", "contrasenia": "" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Correo y contraseña son requeridos");
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "mensaje": "no" })))
        .mount(&backend)
        .await;
    let server = server(state_for(&backend));

    let response = server
        .post("/iniciar_sesion")
        .json(&json!({ "correo": CLIENT_EMAIL, "contrasenia": "mal" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Correo o contraseña incorrectos");
}

#[tokio::test]
async fn test_locked_account_passes_message_through() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(423).set_body_json(json!({ "mensaje": "Cuenta bloqueada 5 minutos" })),
        )
        .mount(&backend)
        .await;
    let server = server(state_for(&backend));

    let response = server
        .post("/iniciar_sesion")
        .json(&json!({ "correo": CLIENT_EMAIL, "contrasenia": "mal" }))
        .await;
    response.assert_status(StatusCode::LOCKED);
    let body: Value = response.json();
    assert_eq!(body["mensaje"], "Cuenta bloqueada 5 minutos");
}

#[tokio::test]
async fn test_client_is_kept_out_of_admin_screens() {
    let backend = MockServer::start().await;
    mount_login(&backend).await;
    let server = server(state_for(&backend));
    login(&server, CLIENT_EMAIL).await;

    let response = server.get("/cooperativa/lista").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/cliente");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let backend = MockServer::start().await;
    mount_login(&backend).await;
    let server = server(state_for(&backend));
    login(&server, ADMIN_EMAIL).await;

    let response = server.get("/logout").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/iniciar_sesion");

    let check: Value = server.get("/verificar_sesion").await.json();
    assert_eq!(check["sesion_activa"], false);
}

#[tokio::test]
async fn test_api_session_when_logged_out() {
    let backend = MockServer::start().await;
    let server = server(state_for(&backend));

    let body: Value = server.get("/api/session").await.json();
    assert_eq!(body, json!({ "authenticated": false, "user": null }));
}

#[tokio::test]
async fn test_dashboard_requires_login_as_json() {
    let backend = MockServer::start().await;
    let server = server(state_for(&backend));

    let response = server.get("/api/cliente/dashboard").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Usuario no autenticado");
}

#[tokio::test]
async fn test_xhr_form_login_reads_form_body() {
    let backend = MockServer::start().await;
    mount_login(&backend).await;
    let server = server(state_for(&backend));

    let (name, value) = xhr();
    let response = server
        .post("/iniciar_sesion")
        .add_header(name, value)
        .form(&[("correo", ADMIN_EMAIL), ("contrasenia", "secreto")])
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["rol"], "admin");
    assert_eq!(body["correo"], ADMIN_EMAIL);
}

#[tokio::test]
async fn test_login_issues_new_session_id() {
    let backend = MockServer::start().await;
    mount_login(&backend).await;
    let server = server(state_for(&backend));

    let anonymous = server.get("/bus/lista").await;
    anonymous.assert_status(StatusCode::SEE_OTHER);
    let before = anonymous.cookie(SESSION_COOKIE).value().to_string();

    let response = server
        .post("/iniciar_sesion")
        .form(&[("correo", ADMIN_EMAIL), ("contrasenia", "secreto")])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/bus/lista");
    let after = response.cookie(SESSION_COOKIE).value().to_string();
    assert_ne!(before, after);

    let check: Value = server.get("/verificar_sesion").await.json();
    assert_eq!(check["sesion_activa"], true);
}

// ── registration ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_registro_ajax_missing_field() {
    let backend = MockServer::start().await;
    let server = server(state_for(&backend));

    let (name, value) = xhr();
    let response = server
        .post("/registro")
        .add_header(name, value)
        .form(&[("nombre", "Luis")])
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({ "success": false, "message": "El campo tipo_identificacion es requerido" })
    );
}

#[tokio::test]
async fn test_registro_ajax_backend_failure_keeps_reply_shape() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/persona/lista"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "mensaje": "caido" })))
        .mount(&backend)
        .await;
    let server = server(state_for(&backend));

    let (name, value) = xhr();
    let response = server
        .post("/registro")
        .add_header(name, value)
        .form(&registration_form("1100000099", "luis@correo.ec"))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Error en el registro"));
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_registro_duplicate_identification_rerenders_form() {
    let backend = MockServer::start().await;
    mount_login(&backend).await;
    Mock::given(method("POST"))
        .and(path("/api/persona/guardar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&backend)
        .await;
    let server = server(state_for(&backend));

    let response = server
        .post("/registro")
        .form(&registration_form("1100000002", "luis@correo.ec"))
        .await;
    response.assert_status_ok();
    assert!(response
        .text()
        .contains("Ya existe una persona registrada con este número de identificación"));
}

#[tokio::test]
async fn test_registro_duplicate_email_rerenders_form() {
    let backend = MockServer::start().await;
    mount_login(&backend).await;
    let server = server(state_for(&backend));

    let response = server
        .post("/registro")
        .form(&registration_form("1100000099", CLIENT_EMAIL))
        .await;
    response.assert_status_ok();
    assert!(response
        .text()
        .contains("Ya existe una persona registrada con este correo electrónico"));
}

#[tokio::test]
async fn test_registro_ajax_creates_client() {
    let backend = MockServer::start().await;
    mount_login(&backend).await;
    Mock::given(method("POST"))
        .and(path("/api/persona/guardar"))
        .and(body_partial_json(json!({
            "correo": "luis@correo.ec",
            "usuario": "luis@correo.ec",
            "fecha_nacimiento": "05/03/1995",
            "genero": "No_definido",
            "tipo_cuenta": "Cliente",
            "estado_cuenta": "Activo"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "mensaje": "ok" })))
        .expect(1)
        .mount(&backend)
        .await;
    let server = server(state_for(&backend));

    let (name, value) = xhr();
    let response = server
        .post("/registro")
        .add_header(name, value)
        .form(&registration_form("1100000099", "luis@correo.ec"))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({ "success": true, "message": "Registro exitoso" }));
}

// ── password recovery ───────────────────────────────────────────────────

#[tokio::test]
async fn test_recovery_sends_mail_for_known_email() {
    let backend = MockServer::start().await;
    mount_login(&backend).await;
    let server = server(state_for(&backend));

    let response = server
        .post("/recuperar-contrasenia")
        .form(&[("correo", CLIENT_EMAIL)])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/correo-enviado");
}

#[tokio::test]
async fn test_recovery_unknown_email() {
    let backend = MockServer::start().await;
    mount_login(&backend).await;
    let server = server(state_for(&backend));

    let response = server
        .post("/recuperar-contrasenia")
        .form(&[("correo", "nadie@correo.ec")])
        .await;
    response.assert_status_ok();
    assert!(response
        .text()
        .contains("No se encontró una cuenta con ese correo"));
}

#[tokio::test]
async fn test_reset_link_without_grant_is_refused() {
    let backend = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/persona/actualizar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&backend)
        .await;
    let server = server(state_for(&backend));

    let response = server.get("/cambiar-contrasenia/desconocido").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/recuperar-contrasenia");

    let response = server
        .post("/cambiar-contrasenia/desconocido")
        .form(&[("contrasenia", "nueva"), ("confirm_contrasenia", "nueva")])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/recuperar-contrasenia");

    let page = server.get("/recuperar-contrasenia").await.text();
    assert!(page.contains("inválido o ha expirado"));
}

// ── Google callback ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_google_denial_returns_to_login() {
    let backend = MockServer::start().await;
    let server = server(state_for(&backend));

    let response = server
        .get("/auth/google/callback")
        .add_query_param("error", "access_denied")
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/iniciar_sesion");

    let page = server.get("/recuperar-contrasenia").await.text();
    assert!(page.contains("Error en autenticación con Google: access_denied"));
}

#[tokio::test]
async fn test_google_callback_without_code_names_redirect_uri() {
    let backend = MockServer::start().await;
    let server = server(state_for(&backend));

    let response = server.get("/auth/google/callback").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/iniciar_sesion");

    let page = server.get("/recuperar-contrasenia").await.text();
    assert!(page.contains("No se recibió código de Google"));
    assert!(page.contains("http://localhost:5000/auth/google/callback"));
    assert!(!page.contains("Faltan credenciales"));
}

#[tokio::test]
async fn test_google_error_on_client_page() {
    let backend = MockServer::start().await;
    let server = server(state_for(&backend));

    let response = server
        .get("/cliente")
        .add_query_param("error", "access_denied")
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/iniciar_sesion");
}
