//! Per-browser session state.
//!
//! `SessionData` is what the session store persists between requests: who is
//! logged in, the backend bearer token, pending flash messages, and the
//! short-lived grants issued by the password-recovery flow.
//!
//! Everything here is serialized with bincode, so fields must not use
//! `skip_serializing_if` or other self-describing-only serde features.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    /// Generate a new random `SessionId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Session contents
// ═══════════════════════════════════════════════════════════════════════

/// Account type string the backend uses for administrators.
pub const ACCOUNT_ADMIN: &str = "Administrador";

/// Account type string the backend uses for customers.
pub const ACCOUNT_CLIENT: &str = "Cliente";

/// Denormalized copy of the logged-in persona.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Backend `id_persona`. `None` for a Google user whose persona could not
    /// be read back after auto-registration.
    pub id: Option<i64>,
    /// Given name.
    pub nombre: String,
    /// Family name.
    pub apellido: String,
    /// `Administrador` or `Cliente`.
    pub tipo_cuenta: String,
    /// Login email.
    pub correo: String,
}

impl SessionUser {
    /// True for administrator accounts.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.tipo_cuenta == ACCOUNT_ADMIN
    }

    /// True for customer accounts.
    #[must_use]
    pub fn is_client(&self) -> bool {
        self.tipo_cuenta == ACCOUNT_CLIENT
    }

    /// `"Nombre Apellido"`, trimmed.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombre, self.apellido).trim().to_string()
    }
}

/// Severity of a flash message; maps onto the page's alert styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlashLevel {
    /// Operation succeeded.
    Success,
    /// Neutral notice.
    Info,
    /// User must act (e.g. log in).
    Warning,
    /// Operation failed.
    Danger,
}

impl FlashLevel {
    /// Name used as the CSS class suffix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    /// Severity.
    pub level: FlashLevel,
    /// Text shown to the user.
    pub message: String,
}

/// Permission to change a persona's password, issued by the recovery flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetGrant {
    /// Persona whose password may be changed.
    pub persona_id: i64,
    /// Grant is void after this instant.
    pub expires_at: DateTime<Utc>,
}

impl ResetGrant {
    /// True while the grant may still be redeemed.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Everything the portal keeps per browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// Logged-in persona.
    pub user: Option<SessionUser>,
    /// Backend bearer token.
    pub token: Option<String>,
    /// Pending flash messages, oldest first.
    pub flashes: Vec<Flash>,
    /// Where to send the user after a successful login.
    pub redirect_after_login: Option<String>,
    /// Registration was started from a Google sign-in.
    pub from_google: bool,
    /// Email Google reported for that sign-in.
    pub google_correo: Option<String>,
    /// Outstanding password-reset grants keyed by token.
    pub reset_grants: HashMap<String, ResetGrant>,
}

impl SessionData {
    /// True when there is nothing worth persisting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Drop reset grants that expired before `now`.
    pub fn prune_expired_grants(&mut self, now: DateTime<Utc>) {
        self.reset_grants.retain(|_, grant| grant.is_valid_at(now));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_session_id_generation() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();

        assert_ne!(id1, id2);
    }

    #[test]
    fn test_session_id_parses_display() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-session".parse::<SessionId>().is_err());
    }

    #[test]
    fn test_roles() {
        let admin = SessionUser {
            tipo_cuenta: ACCOUNT_ADMIN.into(),
            ..SessionUser::default()
        };
        let client = SessionUser {
            tipo_cuenta: ACCOUNT_CLIENT.into(),
            ..SessionUser::default()
        };

        assert!(admin.is_admin() && !admin.is_client());
        assert!(client.is_client() && !client.is_admin());
    }

    #[test]
    fn test_bincode_keeps_every_field() {
        let mut data = SessionData {
            user: Some(SessionUser {
                id: Some(7),
                nombre: "Ana".into(),
                apellido: "Mora".into(),
                tipo_cuenta: ACCOUNT_CLIENT.into(),
                correo: "ana@example.com".into(),
            }),
            token: Some("tok".into()),
            flashes: vec![Flash {
                level: FlashLevel::Success,
                message: "Bienvenido!".into(),
            }],
            redirect_after_login: Some("/perfil".into()),
            from_google: true,
            google_correo: Some("ana@gmail.com".into()),
            reset_grants: HashMap::new(),
        };
        data.reset_grants.insert(
            "abc".into(),
            ResetGrant {
                persona_id: 7,
                expires_at: Utc::now() + Duration::hours(1),
            },
        );

        let bytes = bincode::serialize(&data).unwrap();
        let back: SessionData = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_prune_expired_grants() {
        let now = Utc::now();
        let mut data = SessionData::default();
        data.reset_grants.insert(
            "old".into(),
            ResetGrant {
                persona_id: 1,
                expires_at: now - Duration::minutes(1),
            },
        );
        data.reset_grants.insert(
            "new".into(),
            ResetGrant {
                persona_id: 2,
                expires_at: now + Duration::minutes(59),
            },
        );

        data.prune_expired_grants(now);

        assert_eq!(data.reset_grants.len(), 1);
        assert!(data.reset_grants.contains_key("new"));
        assert!(!data.is_empty());
    }
}
