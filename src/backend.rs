//! Backend exchange client
//!
//! Performs the two HTTP round trips the flow needs: fetching a provider
//! authorization URL and exchanging acquired credential material for session
//! tokens. Responses are normalized here so strategies never see raw HTTP.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::config::ProviderConfig;
use crate::error::Error;
use crate::session::SessionTokens;
use crate::strategy::Credential;
use crate::Result;

/// All backend calls are bounded; a hung exchange maps to `Error::Timeout`
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Path of the SimpleJWT refresh endpoint
const TOKEN_REFRESH_PATH: &str = "/mobile/auth/token/refresh/";

#[derive(Debug, Deserialize)]
struct AuthUrlResponse {
    auth_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

/// HTTP client for the JWT-issuing backend
#[derive(Clone)]
pub struct BackendClient {
    http_client: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the given base URL, e.g. "https://api.example.com"
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    /// Create a client with a non-default request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::Http)?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { http_client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the backend for the provider authorization URL
    pub async fn fetch_auth_url(&self, config: &ProviderConfig) -> Result<String> {
        let url = format!("{}{}", self.base_url, config.auth_url_path);
        tracing::debug!("Fetching {} auth URL from {}", config.provider.id(), url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(map_request_error)?;

        if !response.status().is_success() {
            return Err(self.rejection(response, config).await);
        }

        let body: AuthUrlResponse = response.json().await.map_err(map_request_error)?;
        Ok(body.auth_url)
    }

    /// Exchange acquired credential material for session tokens
    ///
    /// The request body is a single field named after the credential kind,
    /// e.g. `{"access_token": "..."}` or `{"credential": "..."}`.
    pub async fn exchange(
        &self,
        config: &ProviderConfig,
        credential: &Credential,
    ) -> Result<SessionTokens> {
        let url = format!("{}{}", self.base_url, config.login_path);
        let body = json!({ credential.kind.wire_name(): credential.value });

        tracing::debug!("Exchanging {} credential at {}", config.provider.id(), url);

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_request_error)?;

        if !response.status().is_success() {
            return Err(self.rejection(response, config).await);
        }

        let tokens: SessionTokens = response.json().await.map_err(map_request_error)?;
        tracing::info!("{} sign-in exchange succeeded", config.provider.display_name());
        Ok(tokens)
    }

    /// Obtain a fresh access token from a refresh token
    pub async fn refresh(&self, refresh_token: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, TOKEN_REFRESH_PATH);
        let body = json!({ "refresh": refresh_token });

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_request_error)?;

        if response.status().is_success() {
            let body: RefreshResponse = response.json().await.map_err(map_request_error)?;
            Ok(body.access)
        } else {
            Err(Error::Backend("Token refresh failed".to_string()))
        }
    }

    /// Turn a non-2xx response into a `Backend` error, preferring the
    /// server-supplied message over the generic per-provider one
    async fn rejection(&self, response: reqwest::Response, config: &ProviderConfig) -> Error {
        let status = response.status();
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => format!("{} login failed", config.provider.display_name()),
        };

        tracing::warn!(
            "Backend rejected {} request with {}: {}",
            config.provider.id(),
            status,
            message
        );
        Error::Backend(message)
    }
}

fn map_request_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout
    } else {
        Error::Http(err)
    }
}
