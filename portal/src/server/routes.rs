//! Router configuration for the portal.
//!
//! Builds the complete Axum router with all endpoints.

use super::state::AppState;
use crate::handlers::{account, assistant, auth, catalog, payments, proxy, site, tickets};
use crate::session::session_middleware;
use aventura_web::handlers::health_check;
use aventura_web::{correlation_id_layer, no_cache_layer};
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Admin and client screens get no-cache headers; every route runs inside
/// the session middleware, the correlation-id span and request tracing.
/// Paths no route claims are served from the frontend bundle.
pub fn build_router(state: AppState) -> Router {
    let private = Router::new()
        .route("/cliente", get(account::cliente))
        .route("/administrador", get(account::administrador))
        .route("/perfil", get(account::profile_page).post(account::update_profile))
        .merge(catalog::routes())
        .layer(no_cache_layer());

    let auth_routes = Router::new()
        .route("/iniciar_sesion", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/verificar_sesion", get(auth::verificar_sesion))
        .route("/api/session", get(auth::api_session))
        .route("/registro", get(auth::registro_page).post(auth::registro))
        .route("/auth/google", get(auth::google_login))
        .route(
            "/auth/google/callback",
            get(auth::google_callback).post(auth::google_callback),
        )
        .route(
            "/recuperar-contrasenia",
            get(auth::recovery_page).post(auth::recovery),
        )
        .route("/correo-enviado", get(auth::mail_sent))
        .route(
            "/cambiar-contrasenia/:token",
            get(auth::change_password_page).post(auth::change_password),
        );

    let client_api = Router::new()
        .route("/api/cliente/dashboard", get(account::dashboard))
        .route("/api/cliente/perfil/actualizar", put(account::api_update_profile))
        .route("/api/cliente/boleto/:id/pdf", get(tickets::client_boarding_pass))
        .route(
            "/procesar_pago",
            get(payments::payment_page).post(payments::process_payment),
        )
        .route(
            "/api/metodos-pago/transferir-saldo",
            post(payments::transfer_balance),
        )
        .route("/api/metodos-pago/usuario", get(payments::user_payment_methods))
        .route("/generar_pdf_boleto/:id", get(tickets::boarding_pass))
        .route("/generar_ticket/:id", get(tickets::receipt))
        .route("/api/gemini/chat", post(assistant::chat));

    let site_routes = Router::new()
        .route("/", get(site::index))
        .route("/resultados_cooperativas", get(site::index))
        .route("/seleccionar_asientos", get(site::index))
        .route("/assets/*path", get(site::assets))
        .route("/index.css", get(site::index_css))
        .route("/img/*path", get(site::images))
        .route("/api/rutas", get(site::rutas));

    Router::new()
        .route("/health", get(health_check))
        .merge(private)
        .merge(auth_routes)
        .merge(client_api)
        .merge(proxy::routes())
        .merge(site_routes)
        .fallback(site::static_file)
        .layer(middleware::from_fn_with_state(state.clone(), session_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}
