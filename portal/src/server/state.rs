//! Application state for the portal HTTP server.
//!
//! Contains all shared resources needed by HTTP handlers:
//! - Backend client (cloned per request with the session token)
//! - Session store and cookie key
//! - Google, mail and assistant clients

use crate::config::{Config, SessionSecret};
use crate::session::Session;
use aventura_auth::providers::{ConsoleEmailProvider, GoogleOAuthProvider, Mailer, SmtpEmailProvider};
use aventura_auth::stores::SessionBackend;
use aventura_auth::AuthConfig;
use aventura_backend::BackendClient;
use aventura_gemini::GeminiClient;
use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<Config>,

    /// Session and recovery settings
    pub auth: Arc<AuthConfig>,

    /// Backend REST client without a token
    pub backend: BackendClient,

    /// Per-browser session storage
    pub sessions: SessionBackend,

    /// Signs the session cookie
    pub cookie_key: Key,

    /// Google sign-in, when a client id is configured
    pub google: Option<GoogleOAuthProvider>,

    /// Password-reset mail delivery
    pub mailer: Mailer,

    /// Travel assistant
    pub gemini: GeminiClient,
}

impl AppState {
    /// Build the state from configuration: connect the session store and load
    /// the cookie secret.
    ///
    /// # Errors
    ///
    /// Returns error if Redis is configured but unreachable, or a generated
    /// secret cannot be persisted.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let sessions = SessionBackend::connect(config.session.redis_url.as_deref()).await?;
        let secret = SessionSecret::load(&config.session)?;

        let mailer = match &config.smtp {
            Some(smtp) => {
                tracing::info!(server = %smtp.server, port = smtp.port, "Reset mail: smtp");
                Mailer::Smtp(SmtpEmailProvider::new(
                    smtp.server.clone(),
                    smtp.port,
                    smtp.username.clone(),
                    smtp.password.clone(),
                    smtp.from.clone(),
                ))
            }
            None => {
                tracing::info!("Reset mail: console");
                Mailer::Console(ConsoleEmailProvider)
            }
        };

        Ok(Self::new(config, sessions, &secret, mailer))
    }

    /// Assemble the state from already-built parts.
    #[must_use]
    pub fn new(config: Config, sessions: SessionBackend, secret: &SessionSecret, mailer: Mailer) -> Self {
        let auth = config.auth_config();
        let backend = BackendClient::new(&config.backend.url, config.backend.timeout());
        let google = auth.google.clone().map(GoogleOAuthProvider::new);
        let gemini = GeminiClient::new(&config.gemini.api_key, &config.gemini.api_url);

        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            backend,
            sessions,
            cookie_key: secret.key(),
            google,
            mailer,
            gemini,
        }
    }

    /// Replace the Google provider (tests point it at a mock server).
    #[must_use]
    pub fn with_google(mut self, google: GoogleOAuthProvider) -> Self {
        self.google = Some(google);
        self
    }

    /// Replace the assistant client.
    #[must_use]
    pub fn with_gemini(mut self, gemini: GeminiClient) -> Self {
        self.gemini = gemini;
        self
    }

    /// Backend client carrying the session's bearer token.
    #[must_use]
    pub fn backend_for(&self, session: &Session) -> BackendClient {
        self.backend.with_token(session.token())
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
