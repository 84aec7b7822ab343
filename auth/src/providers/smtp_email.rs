//! SMTP email provider implementation using Lettre.

use crate::error::{AuthError, Result};
use crate::providers::email::{password_reset_body, EmailProvider, RESET_SUBJECT};
use chrono::{DateTime, Utc};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// SMTP email provider using Lettre.
///
/// Connects with STARTTLS and authenticates with the configured credentials.
///
/// # Examples
///
/// ```ignore
/// use aventura_auth::providers::SmtpEmailProvider;
///
/// let provider = SmtpEmailProvider::new(
///     "smtp.gmail.com".to_string(),
///     587,
///     "user@gmail.com".to_string(),
///     "app_password".to_string(),
///     "AventuraBus <noreply@aventurabus.ec>".to_string(),
/// );
/// ```
#[derive(Clone)]
pub struct SmtpEmailProvider {
    smtp_server: String,
    smtp_port: u16,
    credentials: Credentials,
    /// `From` header, either a bare address or `Name <address>`.
    from: String,
}

impl std::fmt::Debug for SmtpEmailProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpEmailProvider")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl SmtpEmailProvider {
    /// Create a new SMTP email provider.
    #[must_use]
    pub fn new(
        smtp_server: String,
        smtp_port: u16,
        smtp_username: String,
        smtp_password: String,
        from: String,
    ) -> Self {
        Self {
            smtp_server,
            smtp_port,
            credentials: Credentials::new(smtp_username, smtp_password),
            from,
        }
    }

    /// Build SMTP transport for sending emails.
    ///
    /// A new transport per mail; reset mails are rare.
    fn build_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.smtp_server)
                .map_err(|e| AuthError::Email(format!("SMTP relay error: {e}")))?
                .port(self.smtp_port)
                .credentials(self.credentials.clone())
                .build(),
        )
    }

    fn build_message(&self, to: &str, reset_url: &str) -> Result<Message> {
        Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| AuthError::Email(format!("Invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| AuthError::Email(format!("Invalid to address: {e}")))?)
            .subject(RESET_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(password_reset_body(reset_url))
            .map_err(|e| AuthError::Email(format!("Failed to build email: {e}")))
    }
}

impl EmailProvider for SmtpEmailProvider {
    async fn send_password_reset(
        &self,
        to: &str,
        reset_url: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let email = self.build_message(to, reset_url)?;
        let mailer = self.build_transport()?;

        mailer
            .send(email)
            .await
            .map_err(|e| AuthError::Email(format!("Failed to send email: {e}")))?;

        tracing::info!(to = %to, expires_at = %expires_at, "Password reset mail sent");
        Ok(())
    }
}
