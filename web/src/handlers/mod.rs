//! Handlers that carry no portal state.

pub mod health;

pub use health::health_check;
