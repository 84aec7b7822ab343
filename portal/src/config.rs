//! Configuration management for the portal.
//!
//! Loads configuration from environment variables with sensible defaults.

use aventura_auth::AuthConfig;
use rand::RngCore;
use sha2::{Digest, Sha512};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub server: ServerConfig,
    /// Backend REST API
    pub backend: BackendConfig,
    /// Public base URL for absolute links (OAuth callback, reset mails)
    pub public_base_url: String,
    /// React bundle directory
    pub frontend_dist: PathBuf,
    /// Directory holding `Ruta.json`
    pub data_dir: PathBuf,
    /// Session storage and cookie
    pub session: SessionConfig,
    /// Google sign-in
    pub google: GoogleConfig,
    /// Reset mail delivery; `None` logs links to the console
    pub smtp: Option<SmtpConfig>,
    /// Travel assistant
    pub gemini: GeminiConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

/// Backend configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL, e.g. `http://localhost:8080`
    pub url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl BackendConfig {
    /// Timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Redis URL; sessions stay in memory when unset
    pub redis_url: Option<String>,
    /// Lifetime in seconds
    pub ttl_secs: i64,
    /// Cookie name
    pub cookie_name: String,
    /// Cookie-signing secret from the environment
    pub secret: Option<String>,
    /// Where a generated secret is persisted
    pub secret_file: PathBuf,
}

/// Google OAuth configuration
#[derive(Debug, Clone, Default)]
pub struct GoogleConfig {
    /// OAuth client id
    pub client_id: Option<String>,
    /// OAuth client secret
    pub client_secret: Option<String>,
    /// Callback override
    pub redirect_uri: Option<String>,
}

/// SMTP configuration
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// Relay host
    pub server: String,
    /// Relay port (default: 587)
    pub port: u16,
    /// Login
    pub username: String,
    /// Password
    pub password: String,
    /// `From` header
    pub from: String,
}

/// Gemini configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key; empty disables the assistant
    pub api_key: String,
    /// `generateContent` endpoint
    pub api_url: String,
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    #[must_use]
    pub fn from_env() -> Self {
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5000".to_string())
            .trim_end_matches('/')
            .to_string();

        let smtp = non_empty("SMTP_SERVER").map(|server| SmtpConfig {
            server,
            port: env::var("SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(587),
            username: env::var("SMTP_USERNAME").unwrap_or_default(),
            password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            from: env::var("SMTP_FROM")
                .or_else(|_| env::var("SMTP_USERNAME"))
                .unwrap_or_default(),
        });

        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5000),
            },
            backend: BackendConfig {
                url: env::var("API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string()),
                timeout_secs: env::var("BACKEND_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            },
            public_base_url,
            frontend_dist: env::var("FRONTEND_DIST")
                .unwrap_or_else(|_| "aventurabus_dist".to_string())
                .into(),
            data_dir: env::var("DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
            session: SessionConfig {
                redis_url: non_empty("REDIS_URL"),
                ttl_secs: env::var("SESSION_TTL")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(86_400), // 24 hours
                cookie_name: env::var("SESSION_COOKIE")
                    .unwrap_or_else(|_| "aventura_session".to_string()),
                secret: non_empty("FLASK_SECRET_KEY").or_else(|| non_empty("SESSION_SECRET")),
                secret_file: env::var("SESSION_SECRET_FILE")
                    .unwrap_or_else(|_| ".session_secret".to_string())
                    .into(),
            },
            google: GoogleConfig {
                client_id: non_empty("GOOGLE_CLIENT_ID"),
                client_secret: non_empty("GOOGLE_CLIENT_SECRET"),
                redirect_uri: non_empty("GOOGLE_REDIRECT_URI"),
            },
            smtp,
            gemini: GeminiConfig {
                api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
                api_url: env::var("GEMINI_API_URL")
                    .unwrap_or_else(|_| aventura_gemini::DEFAULT_API_URL.to_string()),
            },
        }
    }

    /// Defaults for tests: memory sessions, fixed secret, given backend URL.
    #[must_use]
    pub fn for_backend(backend_url: impl Into<String>) -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            backend: BackendConfig {
                url: backend_url.into(),
                timeout_secs: 10,
            },
            public_base_url: "http://localhost:5000".to_string(),
            frontend_dist: "aventurabus_dist".into(),
            data_dir: "data".into(),
            session: SessionConfig {
                redis_url: None,
                ttl_secs: 86_400,
                cookie_name: "aventura_session".to_string(),
                secret: Some("test-secret".to_string()),
                secret_file: ".session_secret".into(),
            },
            google: GoogleConfig::default(),
            smtp: None,
            gemini: GeminiConfig {
                api_key: String::new(),
                api_url: aventura_gemini::DEFAULT_API_URL.to_string(),
            },
        }
    }

    /// Typed auth settings derived from this configuration.
    #[must_use]
    pub fn auth_config(&self) -> AuthConfig {
        let auth = AuthConfig::new(&self.public_base_url)
            .with_session_ttl(chrono::Duration::seconds(self.session.ttl_secs));

        match &self.google.client_id {
            Some(client_id) => auth.with_google(
                client_id,
                self.google.client_secret.clone().unwrap_or_default(),
                self.google.redirect_uri.clone(),
            ),
            None => auth,
        }
    }
}

/// Cookie-signing secret.
#[derive(Clone)]
pub struct SessionSecret(String);

impl std::fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionSecret(..)")
    }
}

impl SessionSecret {
    /// Wrap a known secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The configured secret, else the one persisted in `secret_file`, else a
    /// fresh random one written to `secret_file` so restarts keep sessions.
    ///
    /// # Errors
    ///
    /// Returns error if a generated secret cannot be written.
    pub fn load(config: &SessionConfig) -> std::io::Result<Self> {
        if let Some(secret) = &config.secret {
            return Ok(Self(secret.clone()));
        }

        if let Some(secret) = read_secret(&config.secret_file) {
            tracing::debug!(path = %config.secret_file.display(), "Loaded persisted session secret");
            return Ok(Self(secret));
        }

        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let secret: String = bytes.iter().map(|b| format!("{b:02x}")).collect();

        std::fs::write(&config.secret_file, &secret)?;
        tracing::info!(path = %config.secret_file.display(), "Generated new session secret");
        Ok(Self(secret))
    }

    /// 64-byte cookie key: SHA-512 of the secret.
    #[must_use]
    pub fn key(&self) -> axum_extra::extract::cookie::Key {
        let digest = Sha512::digest(self.0.as_bytes());
        axum_extra::extract::cookie::Key::from(digest.as_slice())
    }
}

fn read_secret(path: &Path) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
