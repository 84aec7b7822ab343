//! Console email provider for development and testing.

use crate::error::Result;
use crate::providers::email::{EmailProvider, RESET_SUBJECT};
use chrono::{DateTime, Utc};
use tracing::info;

/// Console email provider.
///
/// Logs the reset link instead of mailing it. Used when no SMTP server is
/// configured.
#[derive(Clone, Debug, Default)]
pub struct ConsoleEmailProvider;

impl ConsoleEmailProvider {
    /// Create a new console email provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EmailProvider for ConsoleEmailProvider {
    async fn send_password_reset(
        &self,
        to: &str,
        reset_url: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let expires_minutes = (expires_at - Utc::now()).num_minutes();

        info!(
            to = %to,
            subject = RESET_SUBJECT,
            reset_url = %reset_url,
            expires_in_minutes = expires_minutes,
            "Password reset email (console delivery)"
        );

        Ok(())
    }
}
