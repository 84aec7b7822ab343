//! AventuraBus web portal.
//!
//! A thin web tier in front of the AventuraBus backend REST API:
//!
//! - **Sessions**: signed cookie naming a server-side session (memory or
//!   Redis) holding the user, the backend token and flash messages.
//! - **Auth**: password login against the backend, Google sign-in with
//!   auto-registration, self-registration and password recovery by mail.
//! - **Admin screens**: list/create/edit/delete/sort/search for the twelve
//!   backend resources, with the duplicate and schedule checks the backend
//!   does not do.
//! - **Client flows**: dashboard, profile, checkout with discount stacking,
//!   PDF boarding passes and receipts.
//! - **Proxy**: JSON passthrough for the React bundle, plus the travel
//!   assistant.
//!
//! # Architecture
//!
//! ```text
//! browser ──► correlation id ─► trace ─► session ─► guards ─► handlers
//!                                                               │
//!                               views (HTML) ◄── rules ◄────────┤
//!                                                               ▼
//!                                                     BackendClient (reqwest)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod guards;
pub mod handlers;
pub mod metrics;
pub mod rules;
pub mod server;
pub mod session;
pub mod tickets;
pub mod views;

pub use config::Config;
pub use server::{build_router, AppState};
pub use session::Session;
