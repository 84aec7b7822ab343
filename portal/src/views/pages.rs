//! Standalone pages outside the admin tables.

use super::{escape, Field, FieldKind, FormView};
use aventura_backend::models::Persona;
use std::fmt::Write;

/// Identity document types.
pub const TIPOS_IDENTIFICACION: [&str; 3] = ["Cedula", "Pasaporte", "Licencia_conducir"];
/// Fare categories.
pub const TIPOS_TARIFA: [&str; 5] = [
    "General",
    "Menor_edad",
    "Tercera_edad",
    "Estudiante",
    "Discapacitado",
];
/// Genders.
pub const GENEROS: [&str; 4] = ["No_definido", "Masculino", "Femenino", "Otro"];
/// Payment options offered at checkout.
pub const METODOS_PAGO: [&str; 3] = ["Efectivo", "Tarjeta", "Transferencia"];

/// Sign-up form. `google_correo` locks the email to the Google account.
#[must_use]
pub fn registration(
    correo: &str,
    google_correo: Option<&str>,
    error: Option<&str>,
    submitted: &[(String, String)],
) -> String {
    let mut form = FormView::new("Crear cuenta", "/registro", "/iniciar_sesion")
        .field(Field::new(
            "tipo_identificacion",
            "Tipo de identificación",
            FieldKind::select_of(&TIPOS_IDENTIFICACION),
        ))
        .field(Field::new("numero_identificacion", "Número de identificación", FieldKind::Text))
        .field(Field::new("nombre", "Nombre", FieldKind::Text))
        .field(Field::new("apellido", "Apellido", FieldKind::Text))
        .field(Field::new("correo", "Correo", FieldKind::Email).value(google_correo.unwrap_or(correo)))
        .field(Field::new("telefono", "Teléfono", FieldKind::Text).optional())
        .field(Field::new("fecha_nacimiento", "Fecha de nacimiento", FieldKind::Date))
        .field(Field::new("contrasenia", "Contraseña", FieldKind::Password))
        .refill(submitted);

    if let Some(error) = error {
        form = form.error(error);
    }
    if google_correo.is_some() {
        form = form.extra("<p>Completa tus datos para terminar el registro con Google.</p>");
    }
    form.render()
}

/// Profile editor for the logged-in user.
#[must_use]
pub fn profile(persona: &Persona, error: Option<&str>) -> String {
    let mut form = FormView::new("Mi perfil", "/perfil", "/")
        .field(
            Field::new(
                "tipo_identificacion",
                "Tipo de identificación",
                FieldKind::select_of(&TIPOS_IDENTIFICACION),
            )
            .value(&persona.tipo_identificacion),
        )
        .field(
            Field::new("numero_identificacion", "Número de identificación", FieldKind::Text)
                .value(&persona.numero_identificacion),
        )
        .field(Field::new("nombre", "Nombre", FieldKind::Text).value(&persona.nombre))
        .field(Field::new("apellido", "Apellido", FieldKind::Text).value(&persona.apellido))
        .field(Field::new("correo", "Correo", FieldKind::Email).value(persona.email()))
        .field(Field::new("telefono", "Teléfono", FieldKind::Text).value(&persona.telefono).optional())
        .field(Field::new("direccion", "Dirección", FieldKind::Text).value(&persona.direccion).optional())
        .field(
            Field::new("fecha_nacimiento", "Fecha de nacimiento", FieldKind::Text)
                .value(&persona.fecha_nacimiento),
        )
        .field(Field::new("genero", "Género", FieldKind::select_of(&GENEROS)).value(&persona.genero))
        .field(
            Field::new("tipo_tarifa", "Tarifa", FieldKind::select_of(&TIPOS_TARIFA))
                .value(&persona.tipo_tarifa),
        )
        .field(Field::new("contrasenia", "Nueva contraseña (opcional)", FieldKind::Password).optional());

    if let Some(error) = error {
        form = form.error(error);
    }
    form.render()
}

/// Password-recovery request.
#[must_use]
pub fn recovery_request() -> String {
    FormView::new("Recuperar contraseña", "/recuperar-contrasenia", "/iniciar_sesion")
        .field(Field::new("correo", "Correo registrado", FieldKind::Email))
        .render()
}

/// Confirmation after sending the recovery mail.
#[must_use]
pub fn mail_sent() -> String {
    "<h1>Correo enviado</h1>\
<p>Revisa tu bandeja de entrada. El enlace para cambiar la contraseña expira en 1 hora.</p>\
<p><a href=\"/iniciar_sesion\">Volver a iniciar sesión</a></p>"
        .to_string()
}

/// New-password form for a reset token.
#[must_use]
pub fn change_password(token: &str, error: Option<&str>) -> String {
    let mut form = FormView::new(
        "Cambiar contraseña",
        format!("/cambiar-contrasenia/{}", urlencode_segment(token)),
        "/iniciar_sesion",
    )
    .field(Field::new("contrasenia", "Nueva contraseña", FieldKind::Password))
    .field(Field::new("confirm_contrasenia", "Confirmar contraseña", FieldKind::Password));

    if let Some(error) = error {
        form = form.error(error);
    }
    form.render()
}

/// Reset tokens are URL-safe base64; anything else is dropped from the link.
fn urlencode_segment(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect()
}

/// Checkout page; the React bundle posts `viajeInfo` back to
/// `/procesar_pago`.
#[must_use]
pub fn pago_boleto(metodos: &[&str]) -> String {
    let options = metodos.iter().fold(String::new(), |mut out, m| {
        let _ = write!(out, "<option value=\"{0}\">{0}</option>", escape(m));
        out
    });

    format!(
        "<h1>Pago de boletos</h1>\
<form id=\"pago\" method=\"post\" action=\"/procesar_pago\">\
<label for=\"metodo\">Método de pago</label><select id=\"metodo\" name=\"metodo\">{options}</select>\
<input type=\"hidden\" id=\"viajeInfo\" name=\"viajeInfo\">\
<p><button type=\"submit\">Pagar</button></p></form>\
<script>\
const info=sessionStorage.getItem('viajeInfo');\
if(info)document.getElementById('viajeInfo').value=info;\
</script>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_prefill_from_google() {
        let html = registration("", Some("ana@gmail.com"), None, &[]);
        assert!(html.contains("value=\"ana@gmail.com\""));
        assert!(html.contains("registro con Google"));
    }

    #[test]
    fn test_change_password_action() {
        let html = change_password("abc_DEF-1\"", Some("Las contraseñas no coinciden"));
        assert!(html.contains("action=\"/cambiar-contrasenia/abc_DEF-1\""));
        assert!(html.contains("Las contraseñas no coinciden"));
    }

    #[test]
    fn test_profile_selects_current_values() {
        let persona = Persona {
            genero: "Femenino".into(),
            tipo_tarifa: "Estudiante".into(),
            ..Persona::default()
        };
        let html = profile(&persona, None);
        assert!(html.contains("<option value=\"Femenino\" selected>"));
        assert!(html.contains("<option value=\"Estudiante\" selected>"));
    }

    #[test]
    fn test_pago_lists_methods() {
        let html = pago_boleto(&METODOS_PAGO);
        assert!(html.contains("<option value=\"Transferencia\">"));
        assert!(html.contains("name=\"viajeInfo\""));
    }
}
