//! Authentication providers.
//!
//! Traits for the external services the portal's auth flows depend on, plus
//! their implementations:
//!
//! - [`SessionStore`]: where session data lives between requests
//! - [`OAuthProvider`]: Google sign-in over plain HTTP
//! - [`EmailProvider`]: password-reset delivery
//!
//! The application picks implementations at startup and hands them to its
//! handlers; tests swap in the in-memory store and mock HTTP servers.

use chrono::{DateTime, Utc};

pub mod console_email;
pub mod email;
pub mod google;
pub mod oauth;
pub mod session;
pub mod smtp_email;

pub use console_email::ConsoleEmailProvider;
pub use email::EmailProvider;
pub use google::GoogleOAuthProvider;
pub use oauth::{GoogleProfile, OAuthProvider};
pub use session::SessionStore;
pub use smtp_email::SmtpEmailProvider;

/// Mail delivery chosen from configuration.
#[derive(Debug, Clone)]
pub enum Mailer {
    /// Real delivery over SMTP.
    Smtp(SmtpEmailProvider),
    /// Log-only delivery.
    Console(ConsoleEmailProvider),
}

impl EmailProvider for Mailer {
    async fn send_password_reset(
        &self,
        to: &str,
        reset_url: &str,
        expires_at: DateTime<Utc>,
    ) -> crate::Result<()> {
        match self {
            Self::Smtp(smtp) => smtp.send_password_reset(to, reset_url, expires_at).await,
            Self::Console(console) => {
                console
                    .send_password_reset(to, reset_url, expires_at)
                    .await
            }
        }
    }
}
