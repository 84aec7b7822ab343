//! # AventuraBus authentication
//!
//! Session state and the external services behind the portal's login flows:
//!
//! - **Sessions**: [`SessionData`] persisted per browser in Redis or memory
//!   through the [`SessionStore`](providers::SessionStore) trait
//! - **Google sign-in**: authorization-code flow against Google's public
//!   endpoints ([`GoogleOAuthProvider`](providers::GoogleOAuthProvider))
//! - **Password recovery**: reset tokens and mail delivery over SMTP or the
//!   console ([`Mailer`](providers::Mailer))
//!
//! Credentials themselves are verified by the backend; this crate never sees a
//! password hash.
//!
//! ## Example
//!
//! ```rust,ignore
//! use aventura_auth::{providers::SessionStore, stores::SessionBackend, SessionData, SessionId};
//!
//! let store = SessionBackend::connect(config.redis_url.as_deref()).await?;
//! let id = SessionId::new();
//! store.save(id, &SessionData::default(), auth.session_ttl).await?;
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod config;
pub mod error;
pub mod providers;
pub mod state;
pub mod stores;
pub mod utils;

pub use config::{AuthConfig, GoogleCredentials};
pub use error::{AuthError, Result};
pub use state::{Flash, FlashLevel, ResetGrant, SessionData, SessionId, SessionUser};
