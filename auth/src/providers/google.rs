//! Google OAuth 2.0 provider implementation.

use crate::config::GoogleCredentials;
use crate::error::{AuthError, Result};
use crate::providers::{GoogleProfile, OAuthProvider};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Google consent screen.
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// Google token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Google OpenID Connect userinfo endpoint.
pub const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Google OAuth 2.0 provider.
///
/// # Example
///
/// ```no_run
/// use aventura_auth::config::GoogleCredentials;
/// use aventura_auth::providers::GoogleOAuthProvider;
///
/// let google = GoogleOAuthProvider::new(GoogleCredentials {
///     client_id: "client-id".into(),
///     client_secret: "client-secret".into(),
///     redirect_uri: "http://localhost:5000/auth/google/callback".into(),
/// });
/// ```
#[derive(Clone, Debug)]
pub struct GoogleOAuthProvider {
    credentials: GoogleCredentials,

    /// HTTP client for making requests.
    http_client: Client,

    /// Scopes to request (default: "openid email profile").
    scopes: Vec<String>,

    auth_url: String,
    token_url: String,
    userinfo_url: String,
}

impl GoogleOAuthProvider {
    /// Create a new Google OAuth provider against Google's public endpoints.
    #[must_use]
    pub fn new(credentials: GoogleCredentials) -> Self {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            credentials,
            http_client,
            scopes: vec![
                "openid".to_string(),
                "email".to_string(),
                "profile".to_string(),
            ],
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }

    /// Point the provider at other endpoints (a mock server in tests).
    #[must_use]
    pub fn with_endpoints(
        mut self,
        auth_url: impl Into<String>,
        token_url: impl Into<String>,
        userinfo_url: impl Into<String>,
    ) -> Self {
        self.auth_url = auth_url.into();
        self.token_url = token_url.into();
        self.userinfo_url = userinfo_url.into();
        self
    }

    /// Callback URI sent with every request.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.credentials.redirect_uri
    }

    /// Both client id and secret are present; without them the code exchange
    /// cannot succeed.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.credentials.client_id.is_empty() && !self.credentials.client_secret.is_empty()
    }
}

/// Token endpoint response; only the access token matters here.
#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

impl OAuthProvider for GoogleOAuthProvider {
    fn authorization_url(&self, state: Option<&str>) -> Result<String> {
        let scope = self.scopes.join(" ");
        let mut params = vec![
            ("client_id", self.credentials.client_id.as_str()),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ];

        if let Some(state) = state {
            params.push(("state", state));
        }

        let query = serde_urlencoded::to_string(&params)
            .map_err(|e| AuthError::OAuthNotConfigured(format!("Failed to build URL: {e}")))?;

        Ok(format!("{}?{query}", self.auth_url))
    }

    async fn exchange_code(&self, code: &str) -> Result<String> {
        let params = [
            ("code", code),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::OAuthTokenExchangeFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %error_body, "Google token exchange failed");
            return Err(AuthError::OAuthTokenExchangeFailed(format!(
                "status {status}"
            )));
        }

        let token: GoogleTokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::OAuthTokenExchangeFailed(e.to_string()))?;

        token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::OAuthTokenExchangeFailed("missing access_token".into()))
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<GoogleProfile> {
        let response = self
            .http_client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::OAuthUserInfoFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %error_body, "Google userinfo request failed");
            return Err(AuthError::OAuthUserInfoFailed(format!("status {status}")));
        }

        let profile: GoogleProfile = response
            .json()
            .await
            .map_err(|e| AuthError::OAuthUserInfoFailed(e.to_string()))?;

        if profile.email.is_empty() {
            return Err(AuthError::OAuthUserInfoFailed(
                "profile has no email".into(),
            ));
        }

        Ok(profile)
    }
}
