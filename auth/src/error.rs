//! Error types for sessions, Google sign-in and reset mail.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Failure modes of the authentication layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Session Errors
    // ═══════════════════════════════════════════════════════════
    /// The session store could not be reached or refused the command.
    #[error("Session store error: {0}")]
    SessionStore(String),

    /// Session data could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Redis connection could not be established.
    #[error("Redis error: {0}")]
    Redis(String),

    // ═══════════════════════════════════════════════════════════
    // Google sign-in Errors
    // ═══════════════════════════════════════════════════════════
    /// Client id or secret missing.
    #[error("OAuth is not configured: {0}")]
    OAuthNotConfigured(String),

    /// Authorization code could not be exchanged for a token.
    #[error("OAuth token exchange failed: {0}")]
    OAuthTokenExchangeFailed(String),

    /// The userinfo endpoint failed or returned an unusable profile.
    #[error("OAuth user info request failed: {0}")]
    OAuthUserInfoFailed(String),

    // ═══════════════════════════════════════════════════════════
    // Email Errors
    // ═══════════════════════════════════════════════════════════
    /// Reset mail could not be built or delivered.
    #[error("Email error: {0}")]
    Email(String),
}

impl From<redis::RedisError> for AuthError {
    fn from(err: redis::RedisError) -> Self {
        Self::Redis(err.to_string())
    }
}

impl From<bincode::Error> for AuthError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = AuthError::OAuthTokenExchangeFailed("status 400".into());
        assert_eq!(err.to_string(), "OAuth token exchange failed: status 400");
    }

    #[test]
    fn test_bincode_conversion() {
        let bad: std::result::Result<String, _> = bincode::deserialize(&[0xff]);
        let err: AuthError = bad.map_err(AuthError::from).unwrap_err();
        assert!(matches!(err, AuthError::Serialization(_)));
    }
}
