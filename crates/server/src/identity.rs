//! Bearer-token identity verification.
//!
//! The server never issues tokens. A verifier turns the bearer token of a
//! request into the stable external id of the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

/// Google's OAuth2 token introspection endpoint.
pub const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("invalid token")]
    InvalidToken,
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<String, IdentityError>;
}

/// Treats the bearer token itself as the external id.
///
/// Anyone can claim any id with it. Only for local development and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassthroughVerifier;

#[async_trait]
impl IdentityVerifier for PassthroughVerifier {
    async fn verify(&self, token: &str) -> Result<String, IdentityError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(IdentityError::InvalidToken);
        }
        Ok(token.to_string())
    }
}

/// Verifies OAuth2 access tokens against a tokeninfo endpoint and uses the
/// token's subject as the external id.
///
/// When an audience is configured, tokens issued to other clients are
/// rejected.
#[derive(Clone, Debug)]
pub struct TokenInfoVerifier {
    client: Client,
    url: String,
    audience: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    #[serde(default, alias = "user_id")]
    sub: Option<String>,
    #[serde(default, alias = "audience")]
    aud: Option<String>,
}

impl TokenInfoVerifier {
    pub fn new(
        url: impl Into<String>,
        audience: Option<String>,
        timeout: Duration,
    ) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            audience,
        })
    }

    pub fn google(audience: Option<String>, timeout: Duration) -> Result<Self, IdentityError> {
        Self::new(GOOGLE_TOKENINFO_URL, audience, timeout)
    }
}

fn subject(info: TokenInfo, audience: Option<&str>) -> Result<String, IdentityError> {
    if let Some(expected) = audience
        && info.aud.as_deref() != Some(expected)
    {
        tracing::debug!("token issued for another audience: {:?}", info.aud);
        return Err(IdentityError::InvalidToken);
    }
    match info.sub {
        Some(sub) if !sub.trim().is_empty() => Ok(sub),
        _ => Err(IdentityError::InvalidToken),
    }
}

#[async_trait]
impl IdentityVerifier for TokenInfoVerifier {
    async fn verify(&self, token: &str) -> Result<String, IdentityError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(IdentityError::InvalidToken);
        }

        let url = Url::parse_with_params(&self.url, &[("access_token", token)])
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
        let resp = self.client.get(url).send().await.map_err(|e| {
            tracing::warn!("tokeninfo request failed: {e}");
            IdentityError::Unavailable(e.to_string())
        })?;

        let status = resp.status();
        if status.is_client_error() {
            return Err(IdentityError::InvalidToken);
        }
        if !status.is_success() {
            tracing::warn!("tokeninfo answered {status}");
            return Err(IdentityError::Unavailable(status.to_string()));
        }

        let info = resp
            .json::<TokenInfo>()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
        subject(info, self.audience.as_deref())
    }
}
