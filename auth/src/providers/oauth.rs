//! OAuth2 provider trait.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// OAuth2 provider consumed over plain HTTP.
///
/// Only the authorization-code flow is needed: send the browser to the
/// consent screen, trade the returned code for an access token, read the
/// profile.
pub trait OAuthProvider: Send + Sync {
    /// Build the consent-screen URL.
    ///
    /// # Errors
    ///
    /// Returns error if URL encoding fails.
    fn authorization_url(&self, state: Option<&str>) -> Result<String>;

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network request fails
    /// - Provider rejects the code
    /// - Response has no access token
    fn exchange_code(
        &self,
        code: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Fetch the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network request fails
    /// - Token is invalid
    /// - Response is malformed
    fn fetch_user_info(
        &self,
        access_token: &str,
    ) -> impl std::future::Future<Output = Result<GoogleProfile>> + Send;
}

/// Profile fields the portal reads from the userinfo endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleProfile {
    /// Account email.
    pub email: String,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// Display name.
    pub name: String,
}

impl GoogleProfile {
    /// Given name, falling back to the first word of the display name.
    #[must_use]
    pub fn first_name(&self) -> String {
        if self.given_name.is_empty() {
            self.name.split_whitespace().next().unwrap_or_default().to_string()
        } else {
            self.given_name.clone()
        }
    }

    /// Family name, falling back to the rest of the display name.
    #[must_use]
    pub fn last_name(&self) -> String {
        if self.family_name.is_empty() {
            self.name
                .split_whitespace()
                .skip(1)
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            self.family_name.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_from_display_name() {
        let profile = GoogleProfile {
            email: "ana@gmail.com".into(),
            name: "Ana María Mora".into(),
            ..GoogleProfile::default()
        };

        assert_eq!(profile.first_name(), "Ana");
        assert_eq!(profile.last_name(), "María Mora");
    }

    #[test]
    fn test_explicit_names_win() {
        let profile = GoogleProfile {
            given_name: "Ana".into(),
            family_name: "Mora".into(),
            name: "Someone Else".into(),
            ..GoogleProfile::default()
        };

        assert_eq!(profile.first_name(), "Ana");
        assert_eq!(profile.last_name(), "Mora");
    }
}
