//! Email provider trait.

use crate::error::Result;
use chrono::{DateTime, Utc};

/// Subject line of the password-reset mail.
pub const RESET_SUBJECT: &str = "Recuperación de Contraseña";

/// Email provider.
///
/// This trait abstracts over mail delivery (SMTP in production, the console
/// in development).
pub trait EmailProvider: Send + Sync {
    /// Send the password-reset mail.
    ///
    /// # Arguments
    ///
    /// - `to`: Recipient email address
    /// - `reset_url`: Absolute link to the change-password page
    /// - `expires_at`: When the link stops working
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - An address does not parse
    /// - The SMTP server rejects the message or cannot be reached
    fn send_password_reset(
        &self,
        to: &str,
        reset_url: &str,
        expires_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Plain-text body of the password-reset mail.
#[must_use]
pub fn password_reset_body(reset_url: &str) -> String {
    format!(
        "Hola,\n\n\
         Recibimos una solicitud para restablecer la contraseña de tu cuenta de AventuraBus.\n\
         Para crear una nueva contraseña, abre el siguiente enlace:\n\n\
         {reset_url}\n\n\
         Este enlace expirará en 1 hora.\n\n\
         Si no solicitaste este cambio, puedes ignorar este correo.\n\n\
         Equipo AventuraBus\n"
    )
}
