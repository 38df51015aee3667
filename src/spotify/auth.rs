//! Spotify OAuth2 authorization-code and refresh-token flows.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use super::models::TokenPair;
use crate::transport::{RequestOptions, Transport, TransportError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token request failed - {0}")]
    Transport(#[from] TransportError),

    #[error("invalid token response - {0}")]
    InvalidResponse(String),
}

/// Anything able to trade a refresh token for a fresh [`TokenPair`].
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;
}

/// Client credentials and endpoints for the authorization server.
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
}

pub struct SpotifyAuth {
    transport: Transport,
    settings: OAuthSettings,
    basic_auth: String,
}

impl SpotifyAuth {
    pub fn new(transport: Transport, settings: OAuthSettings) -> Self {
        let basic_auth = base64::engine::general_purpose::STANDARD.encode(
            format!("{}:{}", settings.client_id, settings.client_secret).as_bytes(),
        );

        Self {
            transport,
            settings,
            basic_auth,
        }
    }

    /// URL the user is sent to in order to grant access. `state` is passed
    /// through untouched; generating and checking it is the caller's job.
    pub fn build_authorization_url(&self, state: &str) -> String {
        format!(
            "{}/authorize?client_id={}&response_type=code&redirect_uri={}&scope={}&state={}",
            self.settings.base_url,
            urlencoding::encode(&self.settings.client_id),
            urlencoding::encode(&self.settings.redirect_uri),
            urlencoding::encode(&self.settings.scope),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for a token pair.
    pub async fn exchange_code(&self, auth_code: &str) -> Result<TokenPair, AuthError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", auth_code),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
        ];
        let tokens = self.request_tokens(&form, None).await?;
        info!("exchanged authorization code for tokens");
        Ok(tokens)
    }

    async fn request_tokens(
        &self,
        form: &[(&str, &str)],
        previous_refresh_token: Option<&str>,
    ) -> Result<TokenPair, AuthError> {
        let url = format!("{}/api/token", self.settings.base_url);
        let options = RequestOptions::new()
            .header("Authorization", format!("Basic {}", self.basic_auth))
            .timeout(self.settings.timeout);

        let value = self.transport.post_form(&url, &options, form).await?;
        let body: TokenResponse = serde_json::from_value(value)
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        token_pair_from_response(body, previous_refresh_token)
    }
}

#[async_trait]
impl TokenRefresher for SpotifyAuth {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        debug!("refreshing access token");
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        self.request_tokens(&form, Some(refresh_token)).await
    }
}

/// Spotify may or may not rotate the refresh token; keep the old one when the
/// response omits it.
fn token_pair_from_response(
    body: TokenResponse,
    previous_refresh_token: Option<&str>,
) -> Result<TokenPair, AuthError> {
    if body.access_token.is_empty() {
        return Err(AuthError::InvalidResponse("empty access_token".into()));
    }

    let refresh_token = body
        .refresh_token
        .filter(|t| !t.is_empty())
        .or_else(|| previous_refresh_token.map(str::to_string))
        .ok_or_else(|| AuthError::InvalidResponse("missing refresh_token".into()))?;

    Ok(TokenPair::new(body.access_token, refresh_token))
}
