//! Business metrics for the portal.
//!
//! Recorded through the `metrics` facade; no exporter is installed here, so
//! the counters are free until a recorder is registered.
//!
//! # Exported Metrics
//!
//! - `portal_logins_total{outcome}` - Login attempts by outcome
//! - `portal_tickets_issued_total` - Tickets created by payment processing
//! - `portal_backend_errors_total{resource}` - Non-2xx backend answers
//!   (recorded by the backend client)

use metrics::describe_counter;

/// Register metric descriptions. Call once at startup.
pub fn register_business_metrics() {
    describe_counter!(
        "portal_logins_total",
        "Login attempts by outcome (success, rejected, locked, error, google)"
    );
    describe_counter!(
        "portal_tickets_issued_total",
        "Tickets created by payment processing"
    );
    describe_counter!(
        "portal_backend_errors_total",
        "Non-2xx backend responses by resource"
    );

    tracing::info!("Business metrics registered");
}

/// Login outcome label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Password login accepted
    Success,
    /// Wrong credentials or unknown persona
    Rejected,
    /// Account locked by the backend
    Locked,
    /// Backend unreachable
    Error,
    /// Google sign-in completed
    Google,
}

impl LoginOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Rejected => "rejected",
            Self::Locked => "locked",
            Self::Error => "error",
            Self::Google => "google",
        }
    }
}

/// Record a login attempt.
pub fn record_login(outcome: LoginOutcome) {
    metrics::counter!("portal_logins_total", "outcome" => outcome.as_str()).increment(1);
}

/// Record tickets issued by one payment.
pub fn record_tickets_issued(count: usize) {
    metrics::counter!("portal_tickets_issued_total").increment(count as u64);
}
