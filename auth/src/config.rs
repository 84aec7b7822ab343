//! Authentication configuration.
//!
//! Values come from the application; nothing here reads the environment.

use chrono::Duration;

/// Google OAuth client credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleCredentials {
    /// OAuth 2.0 client ID from Google Cloud Console.
    pub client_id: String,
    /// OAuth 2.0 client secret.
    pub client_secret: String,
    /// Callback registered with Google.
    pub redirect_uri: String,
}

/// Settings shared by sessions, Google sign-in and password recovery.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Public base URL (e.g. `https://aventurabus.ec`), used for absolute
    /// links in mails and the default OAuth callback.
    pub base_url: String,

    /// Session lifetime, refreshed on every write.
    ///
    /// Default: 24 hours
    pub session_ttl: Duration,

    /// Lifetime of a password-reset grant.
    ///
    /// Default: 1 hour
    pub reset_token_ttl: Duration,

    /// Google credentials, when sign-in with Google is enabled.
    pub google: Option<GoogleCredentials>,
}

impl AuthConfig {
    /// Create a configuration with defaults for everything but the base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_ttl: Duration::hours(24),
            reset_token_ttl: Duration::hours(1),
            google: None,
        }
    }

    /// Set session lifetime.
    #[must_use]
    pub const fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Set reset-grant lifetime.
    #[must_use]
    pub const fn with_reset_token_ttl(mut self, ttl: Duration) -> Self {
        self.reset_token_ttl = ttl;
        self
    }

    /// Enable Google sign-in.
    ///
    /// `redirect_uri` defaults to `{base_url}/auth/google/callback`.
    #[must_use]
    pub fn with_google(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: Option<String>,
    ) -> Self {
        let redirect_uri =
            redirect_uri.unwrap_or_else(|| format!("{}/auth/google/callback", self.base_url));
        self.google = Some(GoogleCredentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri,
        });
        self
    }

    /// Callback Google must redirect to, whether or not credentials are set.
    #[must_use]
    pub fn google_callback_uri(&self) -> String {
        self.google.as_ref().map_or_else(
            || format!("{}/auth/google/callback", self.base_url),
            |g| g.redirect_uri.clone(),
        )
    }

    /// Absolute URL of the change-password page for `token`.
    #[must_use]
    pub fn reset_url(&self, token: &str) -> String {
        format!("{}/cambiar-contrasenia/{token}", self.base_url)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new("http://localhost:5000")
    }
}
