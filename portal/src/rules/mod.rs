//! Local business rules.
//!
//! The backend owns validation; these are the checks the portal runs before
//! forwarding a write, plus the arithmetic behind pricing and the client
//! dashboard. All functions are pure and take the listings the caller already
//! fetched.

pub mod escalas;
pub mod pricing;
pub mod schedule;
pub mod trips;
pub mod uniqueness;
