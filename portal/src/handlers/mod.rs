//! HTTP handlers.
//!
//! HTML handlers answer with a page or a flash plus redirect; JSON handlers
//! keep the body shapes the React bundle reads. Helpers shared by both live
//! here.

pub mod account;
pub mod assistant;
pub mod auth;
pub mod catalog;
pub mod payments;
pub mod proxy;
pub mod site;
pub mod tickets;

use crate::server::AppState;
use crate::session::Session;
use crate::views::layout;
use aventura_auth::SessionUser;
use aventura_backend::models::Persona;
use aventura_backend::Resource;
use axum::response::{IntoResponse, Response};
use chrono::{Local, NaiveDate};

/// Urlencoded body as ordered pairs; repeated keys are kept.
pub type FormData = Vec<(String, String)>;

/// Trimmed value of the first `name` pair, empty when absent.
#[must_use]
pub fn form_value<'a>(form: &'a [(String, String)], name: &str) -> &'a str {
    form.iter()
        .find(|(key, _)| key == name)
        .map_or("", |(_, value)| value.trim())
}

/// Local calendar date.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Local date as `dd/mm/YYYY`.
#[must_use]
pub fn today_dmy() -> String {
    today().format(crate::rules::schedule::DMY).to_string()
}

/// Landing page for a logged-in user.
#[must_use]
pub fn home_for(user: &SessionUser) -> &'static str {
    if user.is_admin() {
        "/administrador"
    } else {
        "/cliente"
    }
}

/// Session user for a backend persona.
#[must_use]
pub fn session_user_from(persona: &Persona) -> SessionUser {
    SessionUser {
        id: persona.id_persona,
        nombre: persona.nombre.clone(),
        apellido: persona.apellido.clone(),
        tipo_cuenta: persona.tipo_cuenta().to_string(),
        correo: persona
            .cuenta
            .as_ref()
            .map(|c| c.correo.clone())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| persona.email().to_string()),
    }
}

/// Name shown in the page header: the persona's current name from the
/// backend, `Usuario` when it cannot be read. `None` when logged out.
pub async fn header_user(state: &AppState, session: &Session) -> Option<String> {
    let user = session.user()?;
    let name = match user.id {
        Some(id) => state
            .backend_for(session)
            .fetch::<Persona>(Resource::Persona, id)
            .await
            .ok()
            .flatten()
            .map(|p| format!("{} {}", p.nombre, p.apellido).trim().to_string())
            .filter(|name| !name.is_empty()),
        None => None,
    };
    Some(name.unwrap_or_else(|| "Usuario".to_string()))
}

/// Render `body` inside the layout, draining pending flashes.
pub async fn render(state: &AppState, session: &Session, title: &str, body: &str) -> Response {
    let user = header_user(state, session).await;
    let flashes = session.take_flashes();
    layout(title, user.as_deref(), &flashes, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aventura_backend::models::Cuenta;

    #[test]
    fn test_form_value() {
        let form: FormData = vec![("a".into(), " 1 ".into()), ("a".into(), "2".into())];
        assert_eq!(form_value(&form, "a"), "1");
        assert_eq!(form_value(&form, "b"), "");
    }

    #[test]
    fn test_session_user_prefers_account_email() {
        let persona = Persona {
            id_persona: Some(4),
            nombre: "Ana".into(),
            correo: "personal@x.ec".into(),
            cuenta: Some(Cuenta {
                correo: "login@x.ec".into(),
                tipo_cuenta: "Administrador".into(),
                ..Cuenta::default()
            }),
            ..Persona::default()
        };

        let user = session_user_from(&persona);
        assert_eq!(user.correo, "login@x.ec");
        assert!(user.is_admin());
        assert_eq!(home_for(&user), "/administrador");
    }
}
