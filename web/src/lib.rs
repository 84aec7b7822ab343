//! Axum integration shared by the AventuraBus portal.
//!
//! This crate holds the pieces every handler in the portal leans on but that
//! know nothing about buses or tickets:
//!
//! - [`AppError`]: JSON error responses with a status, a machine code and an
//!   optional internal source that is logged but never exposed
//! - Extractors: [`CorrelationId`], [`ClientIp`], [`UserAgent`], [`WantsJson`]
//! - Middleware: correlation-id propagation and no-cache response headers
//! - The liveness handler
//!
//! # Example
//!
//! ```ignore
//! use aventura_web::{AppError, correlation_id_layer, no_cache_layer};
//! use axum::{Router, routing::get};
//!
//! let admin = Router::new()
//!     .route("/administrador", get(dashboard))
//!     .layer(no_cache_layer());
//!
//! let app = Router::new()
//!     .merge(admin)
//!     .layer(correlation_id_layer());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{is_json_body, ClientIp, CorrelationId, UserAgent, WantsJson};
pub use middleware::{
    correlation_id_layer, no_cache_layer, CorrelationIdExt, CORRELATION_ID_HEADER,
};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
