//! Client for the AventuraBus backend REST API.
//!
//! Every entity lives behind the same `/api/{slug}/…` endpoint family:
//!
//! - `lista`, `lista/{id}`: read
//! - `guardar`, `actualizar`, `eliminar/{id}`: write
//! - `ordenar/{attr}/{order}`, `buscar/{attr}/{criterion}`: admin tables
//!
//! [`Resource`] names the entity, [`BackendClient`] performs the call, and the
//! [`models`] module gives lenient typed views over the JSON the backend
//! returns.
//!
//! # Example
//!
//! ```no_run
//! use aventura_backend::{BackendClient, Resource, models::Bus};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), aventura_backend::BackendError> {
//! let backend = BackendClient::new("http://localhost:8080", Duration::from_secs(10));
//! let buses: Vec<Bus> = backend.list(Resource::Bus).await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod client;
pub mod error;
pub mod models;
pub mod resource;

pub use client::{BackendClient, LoginOutcome};
pub use error::BackendError;
pub use resource::Resource;

/// Re-exported so callers of [`BackendClient::forward`] need no direct
/// reqwest dependency.
pub use reqwest::{Method, StatusCode};
