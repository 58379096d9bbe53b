//! Hosted identity provider client.
//!
//! Sessions, sign-in/up, sign-out, and password-reset requests are all
//! delegated to a hosted auth service; the storefront never stores
//! credentials. Failures degrade to signed-out behavior.

use rand::Rng;
use rand::distr::Alphanumeric;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use renewly_core::{Email, UserId};

use crate::config::IdentityConfig;

/// Errors that can occur when talking to the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the credentials.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A user as reported by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Email,
}

/// An authenticated session returned by sign-in/up.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: AuthUser,
}

/// Client for the hosted identity provider.
#[derive(Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(alias = "error_description", alias = "msg")]
    message: Option<String>,
}

impl IdentityClient {
    /// Create a new identity client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(config.public_key.expose_secret())
                .map_err(|e| IdentityError::Parse(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_owned(),
        })
    }

    /// Exchange email/password for a session.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidCredentials`] on a 400/401 response,
    /// other API failures otherwise.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, IdentityError> {
        let url = format!("{}/token?grant_type=password", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&CredentialsBody { email, password })
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::UNAUTHORIZED
        {
            return Err(IdentityError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(api_error(status.as_u16(), response).await);
        }

        response
            .json::<AuthSession>()
            .await
            .map_err(|e| IdentityError::Parse(e.to_string()))
    }

    /// Register a new account and return its session.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError> {
        let url = format!("{}/signup", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&CredentialsBody { email, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status.as_u16(), response).await);
        }

        response
            .json::<AuthSession>()
            .await
            .map_err(|e| IdentityError::Parse(e.to_string()))
    }

    /// Invalidate an access token.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, access_token))]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let url = format!("{}/logout", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() && status.as_u16() != 204 {
            return Err(api_error(status.as_u16(), response).await);
        }
        Ok(())
    }

    /// Ask the provider to send a password-reset email.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<(), IdentityError> {
        let url = format!("{}/recover", self.base_url);
        let response = self.client.post(&url).json(&EmailBody { email }).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status.as_u16(), response).await);
        }
        Ok(())
    }

    /// Fetch the user behind an access token, validating the session.
    ///
    /// # Errors
    ///
    /// Returns error if the token is stale or the request fails.
    #[instrument(skip(self, access_token))]
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, IdentityError> {
        let url = format!("{}/user", self.base_url);
        let response = self.client.get(&url).bearer_auth(access_token).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status.as_u16(), response).await);
        }

        response
            .json::<AuthUser>()
            .await
            .map_err(|e| IdentityError::Parse(e.to_string()))
    }

    /// Build the OAuth redirect URL for a social provider, returning the URL
    /// and the CSRF state parameter to stash in the session.
    #[must_use]
    pub fn oauth_authorize_url(&self, provider: &str, redirect_to: &str) -> (String, String) {
        let state: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let url = format!(
            "{}/authorize?provider={}&redirect_to={}&state={}",
            self.base_url,
            urlencoding::encode(provider),
            urlencoding::encode(redirect_to),
            state
        );
        (url, state)
    }
}

/// Read an error body into a typed API error.
async fn api_error(status: u16, response: reqwest::Response) -> IdentityError {
    let message = match response.json::<ApiErrorBody>().await {
        Ok(body) => body.message.unwrap_or_default(),
        Err(_) => String::new(),
    };
    IdentityError::Api { status, message }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn config() -> IdentityConfig {
        IdentityConfig {
            url: "https://identity.renewly.example/auth/v1/".to_owned(),
            public_key: SecretString::from("pk_9f8e7d6c5b4a39281706f5e4d3c2b1a0"),
        }
    }

    #[test]
    fn test_client_strips_trailing_slash() {
        let client = IdentityClient::new(&config()).unwrap();
        assert_eq!(client.base_url, "https://identity.renewly.example/auth/v1");
    }

    #[test]
    fn test_oauth_url_carries_state() {
        let client = IdentityClient::new(&config()).unwrap();
        let (url, state) = client.oauth_authorize_url("google", "https://renewly.example/cb");
        assert_eq!(state.len(), 32);
        assert!(url.contains("provider=google"));
        assert!(url.contains(&state));
    }
}
