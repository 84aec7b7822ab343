//! Login, logout, registration, Google sign-in and password recovery.

use super::{form_value, home_for, render, session_user_from, site::spa_index, FormData};
use crate::guards::LOGIN_PATH;
use crate::metrics::{record_login, LoginOutcome as LoginMetric};
use crate::rules::schedule::iso_to_dmy;
use crate::rules::uniqueness::{persona_with_email, persona_with_phone};
use crate::server::AppState;
use crate::session::Session;
use crate::views::pages;
use aventura_auth::providers::{EmailProvider, GoogleProfile, OAuthProvider};
use aventura_auth::utils::{generate_password, generate_reset_token};
use aventura_auth::{FlashLevel, SessionUser};
use aventura_backend::models::Persona;
use aventura_backend::{BackendClient, BackendError, LoginOutcome, Resource};
use aventura_web::{is_json_body, AppError, ClientIp, UserAgent, WantsJson};
use axum::{
    extract::{FromRequest, Path, Query, Request, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Credentials {
    correo: String,
    contrasenia: String,
}

/// Query string Google sends back to the callback.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CallbackParams {
    /// Authorization code.
    pub code: Option<String>,
    /// Denial or failure reason.
    pub error: Option<String>,
}

impl CallbackParams {
    /// Google answered something.
    #[must_use]
    pub const fn is_callback(&self) -> bool {
        self.code.is_some() || self.error.is_some()
    }
}

fn login_redirect() -> Response {
    Redirect::to(LOGIN_PATH).into_response()
}

fn user_json(user: &SessionUser, telefono: &str) -> Value {
    json!({
        "id": user.id,
        "nombre": user.nombre,
        "apellido": user.apellido,
        "correo": user.correo,
        "telefono": telefono,
        "rol": if user.is_admin() { "admin" } else { "client" },
        "tipo_cuenta": user.tipo_cuenta,
    })
}

async fn list_personas(backend: &BackendClient) -> Result<Vec<Persona>, BackendError> {
    backend.list::<Persona>(Resource::Persona).await
}

// ═══════════════════════════════════════════════════════════════════════
// Login / logout
// ═══════════════════════════════════════════════════════════════════════

/// `GET /iniciar_sesion`
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    WantsJson(wants_json): WantsJson,
) -> Response {
    let Some(user) = session.user() else {
        return spa_index(&state).await;
    };

    if wants_json {
        return Json(user_json(&user, "")).into_response();
    }
    let target = session
        .take_redirect_after_login()
        .unwrap_or_else(|| home_for(&user).to_string());
    Redirect::to(&target).into_response()
}

/// `POST /iniciar_sesion`, from the SPA (JSON) or a classic form.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    WantsJson(wants_json): WantsJson,
    ClientIp(client_ip): ClientIp,
    UserAgent(user_agent): UserAgent,
    request: Request,
) -> Response {
    let credentials = if is_json_body(request.headers()) {
        Json::<Credentials>::from_request(request, &state)
            .await
            .map(|Json(c)| c)
            .unwrap_or_default()
    } else {
        Form::<Credentials>::from_request(request, &state)
            .await
            .map(|Form(c)| c)
            .unwrap_or_default()
    };
    let correo = credentials.correo.trim();

    let reject = |message: &str, status: StatusCode| {
        if wants_json {
            AppError::from_status(status, message).into_response()
        } else {
            session.flash(FlashLevel::Danger, message);
            login_redirect()
        }
    };

    if correo.is_empty() || credentials.contrasenia.is_empty() {
        return reject("Correo y contraseña son requeridos", StatusCode::BAD_REQUEST);
    }

    let outcome = match state.backend.login(correo, &credentials.contrasenia).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(%client_ip, error = %e, "Login request failed");
            record_login(LoginMetric::Error);
            if wants_json {
                return AppError::internal("Error de conexión con el servidor").into_response();
            }
            session.flash(FlashLevel::Danger, "Error de conexión");
            return login_redirect();
        }
    };

    let token = match outcome {
        LoginOutcome::Authenticated { token } => token,
        LoginOutcome::Locked { mensaje } => {
            record_login(LoginMetric::Locked);
            tracing::info!(%client_ip, "Login on a locked account");
            if wants_json {
                return (StatusCode::LOCKED, Json(json!({ "mensaje": mensaje }))).into_response();
            }
            session.flash(FlashLevel::Danger, mensaje);
            return login_redirect();
        }
        LoginOutcome::Rejected => {
            record_login(LoginMetric::Rejected);
            tracing::info!(%client_ip, %user_agent, "Wrong credentials");
            return reject("Correo o contraseña incorrectos", StatusCode::UNAUTHORIZED);
        }
    };

    session.set_token(token.clone());
    let personas = list_personas(&state.backend_for(&session))
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not list personas after login");
            Vec::new()
        });
    let persona = personas
        .iter()
        .find(|p| p.cuenta.as_ref().is_some_and(|c| c.correo == correo));

    let Some(persona) = persona else {
        session.take_token();
        record_login(LoginMetric::Rejected);
        return reject(
            "No se encontró la persona asociada a la cuenta",
            StatusCode::NOT_FOUND,
        );
    };

    let user = session_user_from(persona);
    session.set_user(user.clone());
    record_login(LoginMetric::Success);
    tracing::info!(
        persona_id = ?user.id,
        admin = user.is_admin(),
        %client_ip,
        "User logged in"
    );

    if wants_json {
        let mut body = user_json(&user, &persona.telefono);
        if !token.is_empty() {
            body["token"] = Value::String(token);
        }
        return Json(body).into_response();
    }

    if let Some(target) = session.take_redirect_after_login() {
        return Redirect::to(&target).into_response();
    }
    let welcome = if user.is_admin() {
        "Bienvenido Administrador!"
    } else {
        "Bienvenido!"
    };
    session.flash(FlashLevel::Success, welcome);
    Redirect::to(home_for(&user)).into_response()
}

/// `GET /logout`
pub async fn logout(session: Session) -> Redirect {
    session.clear();
    session.flash(FlashLevel::Success, "Has cerrado sesión exitosamente");
    Redirect::to(LOGIN_PATH)
}

/// `GET /verificar_sesion`
pub async fn verificar_sesion(session: Session) -> Json<Value> {
    Json(json!({ "sesion_activa": session.user().is_some() }))
}

/// `GET /api/session`: the SPA's view of who is logged in.
pub async fn api_session(State(state): State<AppState>, session: Session) -> Json<Value> {
    let Some(user) = session.user() else {
        return Json(json!({ "authenticated": false, "user": null }));
    };

    if let Some(id) = user.id {
        let fetched = state
            .backend_for(&session)
            .fetch::<Persona>(Resource::Persona, id)
            .await;
        if let Ok(Some(persona)) = fetched {
            return Json(json!({
                "authenticated": true,
                "user": {
                    "id": persona.id_persona,
                    "nombre": user.nombre,
                    "apellido": user.apellido,
                    "correo": persona.email(),
                    "tipo_cuenta": persona.tipo_cuenta(),
                    "tipo_identificacion": persona.tipo_identificacion,
                    "numero_identificacion": persona.numero_identificacion,
                    "fecha_nacimiento": persona.fecha_nacimiento,
                    "direccion": persona.direccion,
                    "telefono": persona.telefono,
                    "genero": persona.genero,
                    "tipo_tarifa": persona.tipo_tarifa,
                    "saldo_disponible": persona.saldo_disponible,
                }
            }));
        }
    }

    let tipo_cuenta = if user.tipo_cuenta.is_empty() {
        "Cliente"
    } else {
        user.tipo_cuenta.as_str()
    };
    Json(json!({
        "authenticated": true,
        "user": {
            "id": user.id,
            "nombre": user.nombre,
            "apellido": user.apellido,
            "correo": user.correo,
            "tipo_cuenta": tipo_cuenta,
            "saldo_disponible": 0,
        }
    }))
}

// ═══════════════════════════════════════════════════════════════════════
// Registration
// ═══════════════════════════════════════════════════════════════════════

const REQUIRED_FIELDS: [&str; 7] = [
    "tipo_identificacion",
    "numero_identificacion",
    "nombre",
    "apellido",
    "correo",
    "contrasenia",
    "fecha_nacimiento",
];

/// Body of `POST /api/persona/guardar` for a self-registered client.
fn new_client_payload(
    tipo_identificacion: &str,
    numero_identificacion: &str,
    nombre: &str,
    apellido: &str,
    fecha_nacimiento: &str,
    correo: &str,
    contrasenia: &str,
) -> Value {
    json!({
        "tipo_identificacion": tipo_identificacion,
        "numero_identificacion": numero_identificacion,
        "nombre": nombre,
        "apellido": apellido,
        "fecha_nacimiento": fecha_nacimiento,
        "correo": correo,
        "genero": "No_definido",
        "direccion": "",
        "telefono": "",
        "saldo_disponible": 0.0,
        "usuario": correo,
        "contrasenia": contrasenia,
        "tipo_tarifa": "General",
        "tipo_cuenta": "Cliente",
        "estado_cuenta": "Activo",
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegistroQuery {
    correo: Option<String>,
}

/// `GET /registro`
pub async fn registro_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<RegistroQuery>,
) -> Response {
    let google = session.from_google();
    let body = pages::registration(
        query.correo.as_deref().unwrap_or_default(),
        google.as_deref().filter(|c| !c.is_empty()),
        None,
        &[],
    );
    render(&state, &session, "Registro", &body).await
}

/// `POST /registro`
pub async fn registro(
    State(state): State<AppState>,
    session: Session,
    WantsJson(ajax): WantsJson,
    Form(form): Form<FormData>,
) -> Response {
    let google = session.from_google().filter(|c| !c.is_empty());

    let fail_form = |message: String| {
        let state = state.clone();
        let session = session.clone();
        let google = google.clone();
        let form = form.clone();
        async move {
            let body = pages::registration("", google.as_deref(), Some(&message), &form);
            render(&state, &session, "Registro", &body).await
        }
    };

    if let Some(campo) = REQUIRED_FIELDS
        .iter()
        .find(|name| form_value(&form, name).is_empty())
    {
        let message = format!("El campo {campo} es requerido");
        if ajax {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "message": message })),
            )
                .into_response();
        }
        return fail_form(message).await;
    }

    let numero = form_value(&form, "numero_identificacion");
    let correo = form_value(&form, "correo");
    let telefono = form_value(&form, "telefono");
    let backend = state.backend_for(&session);

    let personas = match list_personas(&backend).await {
        Ok(personas) => personas,
        Err(e) => {
            let message = format!("Error en el registro: {e}");
            tracing::warn!(error = %e, "Could not list personas for registration");
            if ajax {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "success": false, "message": message })),
                )
                    .into_response();
            }
            return fail_form(message).await;
        }
    };

    if personas
        .iter()
        .any(|p| p.numero_identificacion.trim() == numero)
    {
        return fail_form(
            "Ya existe una persona registrada con este número de identificación".into(),
        )
        .await;
    }

    if let Some(existing) = persona_with_email(&personas, correo) {
        if google.is_some() {
            session.set_user(session_user_from(existing));
            session.clear_google_marks();
            session.flash(FlashLevel::Success, "Cuenta existente asociada. Sesión iniciada.");
            return Redirect::to("/cliente").into_response();
        }
        return fail_form("Ya existe una persona registrada con este correo electrónico".into())
            .await;
    }

    if let Some(existing) = persona_with_phone(&personas, telefono) {
        if let Some(google_correo) = google.as_deref() {
            let mut user = session_user_from(existing);
            if user.correo != google_correo {
                if let Err(e) = relink_email(&backend, existing, google_correo).await {
                    tracing::warn!(error = %e, "Could not move account to Google email");
                } else {
                    user.correo = google_correo.to_string();
                }
            }
            session.set_user(user);
            session.clear_google_marks();
            session.flash(
                FlashLevel::Success,
                "Cuenta existente asociada por teléfono. Sesión iniciada.",
            );
            return Redirect::to("/cliente").into_response();
        }
        return fail_form("Ya existe una persona registrada con este número de teléfono".into())
            .await;
    }

    let fecha = form_value(&form, "fecha_nacimiento");
    let fecha = iso_to_dmy(fecha).unwrap_or_else(|| fecha.to_string());
    let payload = new_client_payload(
        form_value(&form, "tipo_identificacion"),
        numero,
        form_value(&form, "nombre"),
        form_value(&form, "apellido"),
        &fecha,
        correo,
        form_value(&form, "contrasenia"),
    );

    match backend.create(Resource::Persona, &payload).await {
        Ok(_) => {
            tracing::info!("New client registered");
            if ajax {
                return Json(json!({ "success": true, "message": "Registro exitoso" }))
                    .into_response();
            }
            session.flash(FlashLevel::Success, "Registro exitoso");

            if google.is_some() {
                let personas = list_personas(&backend).await.unwrap_or_default();
                if let Some(created) = persona_with_email(&personas, correo) {
                    session.set_user(session_user_from(created));
                    session.clear_google_marks();
                    session.flash(FlashLevel::Success, "Registro asociado. Sesión iniciada.");
                    return Redirect::to("/cliente").into_response();
                }
            }
            login_redirect()
        }
        Err(e) => {
            let (status, message) = match &e {
                BackendError::Status { message, .. } => (StatusCode::BAD_REQUEST, message.clone()),
                other => (StatusCode::INTERNAL_SERVER_ERROR, format!("Error en el registro: {other}")),
            };
            if ajax {
                return (status, Json(json!({ "success": false, "message": message })))
                    .into_response();
            }
            fail_form(format!("Error en el registro: {message}")).await
        }
    }
}

/// Point an existing persona's contact and account email at `correo`.
async fn relink_email(
    backend: &BackendClient,
    persona: &Persona,
    correo: &str,
) -> Result<(), BackendError> {
    let mut updated = persona.clone();
    updated.correo = correo.to_string();
    if let Some(cuenta) = updated.cuenta.as_mut() {
        cuenta.correo = correo.to_string();
    }
    backend
        .update(Resource::Persona, &serde_json::to_value(&updated)?)
        .await
        .map(|_| ())
}

// ═══════════════════════════════════════════════════════════════════════
// Google sign-in
// ═══════════════════════════════════════════════════════════════════════

/// `GET /auth/google`
pub async fn google_login(State(state): State<AppState>, session: Session) -> Response {
    let Some(google) = state.google.as_ref() else {
        session.flash(
            FlashLevel::Danger,
            "No está configurado GOOGLE_CLIENT_ID en el backend. Consulte al administrador.",
        );
        return login_redirect();
    };

    match google.authorization_url(None) {
        Ok(url) => Redirect::to(&url).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Could not build Google authorization URL");
            session.flash(FlashLevel::Danger, "Error en autenticación con Google");
            login_redirect()
        }
    }
}

/// `GET|POST /auth/google/callback`
pub async fn google_callback(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<CallbackParams>,
) -> Response {
    complete_google_login(&state, &session, params).await
}

/// Log in with the Google account, creating a client persona for new
/// emails.
pub async fn complete_google_login(
    state: &AppState,
    session: &Session,
    params: CallbackParams,
) -> Response {
    session.clear_google_marks();
    let fail = |message: String| {
        session.flash(FlashLevel::Danger, message);
        login_redirect()
    };

    if let Some(error) = params.error {
        return fail(format!("Error en autenticación con Google: {error}"));
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        tracing::warn!("Google callback without a code");
        return fail(format!(
            "No se recibió código de Google. Revisa que la redirect URI registrada en Google Cloud Console sea exactamente {}",
            state.auth.google_callback_uri()
        ));
    };

    let Some(google) = state.google.as_ref().filter(|g| g.has_credentials()) else {
        return fail("Faltan credenciales de Google en el backend (.env)".into());
    };

    let access_token = match google.exchange_code(&code).await {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(error = %e, "Google code exchange failed");
            return fail("No se pudo obtener token de Google".into());
        }
    };

    let profile = match google.fetch_user_info(&access_token).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "Google userinfo failed");
            return fail("No se pudo obtener la información del perfil de Google".into());
        }
    };

    let backend = state.backend_for(session);
    let personas = list_personas(&backend).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Could not list personas for Google sign-in");
        Vec::new()
    });

    if let Some(persona) = persona_with_email(&personas, &profile.email) {
        session.set_user(google_user(persona.id_persona, persona, &profile));
        record_login(LoginMetric::Google);
        session.flash(FlashLevel::Success, "Sesión iniciada con Google");
        return Redirect::to("/cliente").into_response();
    }

    register_google_client(&backend, session, &profile).await
}

fn google_user(id: Option<i64>, persona: &Persona, profile: &GoogleProfile) -> SessionUser {
    let cuenta_correo = persona
        .cuenta
        .as_ref()
        .map(|c| c.correo.clone())
        .filter(|c| !c.is_empty());
    SessionUser {
        id,
        nombre: profile.first_name(),
        apellido: profile.last_name(),
        tipo_cuenta: persona.tipo_cuenta().to_string(),
        correo: cuenta_correo.unwrap_or_else(|| profile.email.clone()),
    }
}

async fn register_google_client(
    backend: &BackendClient,
    session: &Session,
    profile: &GoogleProfile,
) -> Response {
    let correo = profile.email.as_str();
    let password = generate_password();
    let numero = format!("google_{}{:08x}", Utc::now().timestamp(), rand::random::<u32>());
    let nombre = profile.first_name();
    let payload = new_client_payload(
        "Cedula",
        &numero,
        if nombre.is_empty() { "Usuario" } else { &nombre },
        &profile.last_name(),
        "01/01/1990",
        correo,
        &password,
    );

    if let Err(e) = backend.create(Resource::Persona, &payload).await {
        tracing::warn!(error = %e, "Automatic Google registration failed");
        let personas = list_personas(backend).await.unwrap_or_default();
        if let Some(persona) = persona_with_email(&personas, correo) {
            session.set_user(google_user(persona.id_persona, persona, profile));
            record_login(LoginMetric::Google);
            session.flash(FlashLevel::Success, "Cuenta existente asociada. Sesión iniciada.");
            return Redirect::to("/cliente").into_response();
        }
        session.mark_from_google(correo);
        session.flash(
            FlashLevel::Danger,
            "Error creando la cuenta con Google. Completa el registro para continuar.",
        );
        let target = format!("/registro?correo={}", urlencoding::encode(correo));
        return Redirect::to(&target).into_response();
    }

    let personas = list_personas(backend).await.unwrap_or_default();
    let created = persona_with_email(&personas, correo);
    let user = match created {
        Some(persona) => google_user(persona.id_persona, persona, profile),
        None => SessionUser {
            id: None,
            nombre: if nombre.is_empty() { "Usuario".into() } else { nombre },
            apellido: profile.last_name(),
            tipo_cuenta: "Cliente".into(),
            correo: correo.to_string(),
        },
    };
    session.set_user(user);

    match backend.login(correo, &password).await {
        Ok(LoginOutcome::Authenticated { token }) => session.set_token(token),
        Ok(_) => tracing::warn!("Backend refused the generated Google credentials"),
        Err(e) => tracing::warn!(error = %e, "Login after Google registration failed"),
    }

    record_login(LoginMetric::Google);
    let message = if created.is_some() {
        "Cuenta creada e iniciada con Google"
    } else {
        "Cuenta creada automáticamente con Google"
    };
    session.flash(FlashLevel::Success, message);
    Redirect::to("/cliente").into_response()
}

// ═══════════════════════════════════════════════════════════════════════
// Password recovery
// ═══════════════════════════════════════════════════════════════════════

/// `GET /recuperar-contrasenia`
pub async fn recovery_page(State(state): State<AppState>, session: Session) -> Response {
    render(&state, &session, "Recuperar contraseña", &pages::recovery_request()).await
}

/// `POST /recuperar-contrasenia`
pub async fn recovery(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<FormData>,
) -> Response {
    let correo = form_value(&form, "correo");

    let personas = match list_personas(&state.backend_for(&session)).await {
        Ok(personas) => personas,
        Err(e) => {
            tracing::warn!(error = %e, "Could not list personas for recovery");
            session.flash(FlashLevel::Danger, "Error al verificar el correo");
            return recovery_page(State(state), session).await;
        }
    };

    let Some(persona_id) = persona_with_email(&personas, correo).and_then(|p| p.id_persona) else {
        session.flash(FlashLevel::Danger, "No se encontró una cuenta con ese correo");
        return recovery_page(State(state), session).await;
    };

    let token = generate_reset_token();
    let ttl = state.auth.reset_token_ttl;
    session.grant_reset(token.clone(), persona_id, ttl);

    let reset_url = state.auth.reset_url(&token);
    if let Err(e) = state
        .mailer
        .send_password_reset(correo, &reset_url, Utc::now() + ttl)
        .await
    {
        tracing::error!(error = %e, "Password reset mail failed");
        session.flash(FlashLevel::Danger, format!("Error enviando email: {e}"));
    }
    Redirect::to("/correo-enviado").into_response()
}

/// `GET /correo-enviado`
pub async fn mail_sent(State(state): State<AppState>, session: Session) -> Response {
    render(&state, &session, "Correo enviado", &pages::mail_sent()).await
}

fn grant_for(session: &Session, token: &str) -> Result<i64, Response> {
    session.reset_grant(token).map(|g| g.persona_id).ok_or_else(|| {
        session.flash(
            FlashLevel::Danger,
            "El enlace para restablecer la contraseña es inválido o ha expirado",
        );
        Redirect::to("/recuperar-contrasenia").into_response()
    })
}

/// `GET /cambiar-contrasenia/{token}`
pub async fn change_password_page(
    State(state): State<AppState>,
    session: Session,
    Path(token): Path<String>,
) -> Response {
    if let Err(redirect) = grant_for(&session, &token) {
        return redirect;
    }
    render(
        &state,
        &session,
        "Cambiar contraseña",
        &pages::change_password(&token, None),
    )
    .await
}

/// `POST /cambiar-contrasenia/{token}`
pub async fn change_password(
    State(state): State<AppState>,
    session: Session,
    Path(token): Path<String>,
    Form(form): Form<FormData>,
) -> Response {
    let persona_id = match grant_for(&session, &token) {
        Ok(id) => id,
        Err(redirect) => return redirect,
    };
    let back = format!("/cambiar-contrasenia/{token}");

    let contrasenia = form_value(&form, "contrasenia");
    let confirmacion = form_value(&form, "confirm_contrasenia");
    if contrasenia.is_empty() || confirmacion.is_empty() {
        session.flash(FlashLevel::Danger, "Por favor ingrese la contraseña");
        return Redirect::to(&back).into_response();
    }
    if contrasenia != confirmacion {
        session.flash(FlashLevel::Danger, "Las contraseñas no coinciden");
        return Redirect::to(&back).into_response();
    }

    let backend = state.backend_for(&session);
    let persona = match backend.fetch::<Persona>(Resource::Persona, persona_id).await {
        Ok(Some(persona)) => persona,
        Ok(None) | Err(_) => {
            session.flash(FlashLevel::Danger, "Error al obtener los datos de la persona");
            return Redirect::to(&back).into_response();
        }
    };

    let mut updated = persona;
    updated.id_persona = Some(persona_id);
    updated.cuenta.get_or_insert_with(Default::default).contrasenia =
        Some(contrasenia.to_string());

    let result = match serde_json::to_value(&updated) {
        Ok(body) => backend.update(Resource::Persona, &body).await,
        Err(e) => Err(BackendError::from(e)),
    };

    match result {
        Ok(_) => {
            session.revoke_reset(&token);
            tracing::info!(persona_id, "Password changed through reset link");
            session.flash(FlashLevel::Success, "Contraseña actualizada exitosamente");
            login_redirect()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Password update failed");
            session.flash(FlashLevel::Danger, "Error al actualizar la contraseña");
            Redirect::to(&back).into_response()
        }
    }
}
