use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Email and password are required")]
    MissingCredentials,
    #[error("Login failed ({status}): {message}")]
    LoginRejected { status: u16, message: String },
    #[error("No access token received from server")]
    MissingAccessToken,
    #[error("Authentication failed - token may be invalid or expired")]
    Unauthorized,
    #[error("Failed to fetch opportunities: {0}")]
    Status(u16),
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected response body: {0}")]
    UnexpectedBody(String),
}

impl ApiError {
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// The remote backend, as seen by the resolver.
#[async_trait]
pub trait OpportunityApi {
    /// Exchanges credentials for a bearer token.
    async fn login(&self, email: &str, password: &str) -> Result<String, ApiError>;
    /// Raw JSON body of a successful opportunities request.
    async fn fetch_opportunities(&self, token: &str) -> Result<Value, ApiError>;
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: Option<String>,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

pub struct HttpApi {
    client: Client,
    base: String,
}

impl HttpApi {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self {
            client,
            base: config.api_base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl OpportunityApi for HttpApi {
    async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let url = format!("{}/auth/login", self.base);
        let resp = self
            .client
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body: ErrorBody = resp.json().await.unwrap_or_default();
            let message = body
                .error
                .or(body.message)
                .unwrap_or_else(|| format!("Login failed: {}", status.as_u16()));
            return Err(ApiError::LoginRejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: LoginResponse = resp.json().await?;
        match body.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ApiError::MissingAccessToken),
        }
    }

    async fn fetch_opportunities(&self, token: &str) -> Result<Value, ApiError> {
        let url = format!("{}/opportunities", self.base);
        let resp = self.client.get(&url).bearer_auth(token).send().await?;

        let status = resp.status();
        log::debug!("Opportunities response status: {}", status);
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        Ok(resp.json().await?)
    }
}
