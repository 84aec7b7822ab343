//! Shared setup: a wiremock backend and a portal pointed at it.

#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use aventura_auth::providers::{ConsoleEmailProvider, Mailer};
use aventura_auth::stores::{MemorySessionStore, SessionBackend};
use aventura_portal::config::SessionSecret;
use aventura_portal::{build_router, AppState, Config};
use axum_test::TestServer;
use serde_json::{json, Value};
use std::path::PathBuf;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ADMIN_EMAIL: &str = "admin@aventura.ec";
pub const CLIENT_EMAIL: &str = "ana@correo.ec";

/// State with memory sessions and console mail, talking to `backend`.
pub fn state_for(backend: &MockServer) -> AppState {
    state_with(Config::for_backend(backend.uri()))
}

/// State for an explicit configuration.
pub fn state_with(config: Config) -> AppState {
    AppState::new(
        config,
        SessionBackend::Memory(MemorySessionStore::new()),
        &SessionSecret::new("integration-test-secret-that-is-long-enough-for-signing"),
        Mailer::Console(ConsoleEmailProvider),
    )
}

/// Test server keeping cookies between requests.
pub fn server(state: AppState) -> TestServer {
    TestServer::builder()
        .save_cookies()
        .build(build_router(state))
        .expect("Test server")
}

/// Persona JSON as the backend returns it.
pub fn persona(id: i64, correo: &str, tipo_cuenta: &str) -> Value {
    json!({
        "id_persona": id,
        "tipo_identificacion": "Cedula",
        "numero_identificacion": format!("110000000{id}"),
        "nombre": "Ana",
        "apellido": "Torres",
        "correo": correo,
        "telefono": format!("099000000{id}"),
        "tipo_tarifa": "General",
        "saldo_disponible": 100.0,
        "cuenta": {
            "id_cuenta": id,
            "correo": correo,
            "tipo_cuenta": tipo_cuenta,
            "estado_cuenta": "Activo"
        }
    })
}

/// Mount the backend answers a successful password login needs.
pub async fn mount_login(backend: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok-123" })))
        .mount(backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/persona/lista"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "personas": [
                persona(1, ADMIN_EMAIL, "Administrador"),
                persona(2, CLIENT_EMAIL, "Cliente"),
            ]
        })))
        .mount(backend)
        .await;
}

/// Log in through the JSON endpoint; the session cookie stays on `server`.
pub async fn login(server: &TestServer, correo: &str) {
    server
        .post("/iniciar_sesion")
        .json(&json!({ "correo": correo, "contrasenia": "secreto" }))
        .await
        .assert_status_ok();
}

/// Fresh directory under the system temp dir.
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("aventura-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("Temp dir");
    dir
}
