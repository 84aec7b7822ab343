//! Utility functions for authentication.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

/// Generate a password-reset token.
///
/// 32 random bytes, URL-safe base64 without padding (43 characters), so the
/// token can sit in a path segment unescaped.
///
/// # Examples
///
/// ```
/// use aventura_auth::utils::generate_reset_token;
///
/// let token = generate_reset_token();
/// assert_eq!(token.len(), 43);
/// ```
#[must_use]
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a throwaway password for accounts created through Google.
///
/// The user never types it; the portal uses it once to obtain a backend
/// token right after registration.
#[must_use]
pub fn generate_password() -> String {
    let mut bytes = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Validate email address format.
///
/// Basic shape check only: exactly one `@` with non-empty local part and a
/// dotted domain.
///
/// # Examples
///
/// ```
/// use aventura_auth::utils::is_valid_email;
///
/// assert!(is_valid_email("ana@example.com"));
/// assert!(!is_valid_email("ana@"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    }
}
