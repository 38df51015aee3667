use std::env;
use std::time::Duration;

use crate::spotify::OAuthSettings;

const DEFAULT_SCOPE: &str = "user-top-read user-read-private user-read-email";

/// Application configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_auth_redirect_uri: String,
    pub spotify_auth_user_scope: String,
    pub spotify_auth_base_url: String,
    pub spotify_data_base_url: String,
    pub lyrics_base_url: String,
    pub analysis_base_url: String,
    pub allowed_origins: Vec<String>,
    pub cookie_secure: bool,
    /// Budget for Spotify calls.
    pub request_timeout: Duration,
    /// Budget for lyrics and analysis calls, which can be slow.
    pub analysis_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = parsed("PORT").unwrap_or(8081);

        let spotify_client_id = required("SPOTIFY_CLIENT_ID")?;
        let spotify_client_secret = required("SPOTIFY_CLIENT_SECRET")?;
        let spotify_auth_redirect_uri = required("SPOTIFY_AUTH_REDIRECT_URI")?;

        let spotify_auth_user_scope =
            env::var("SPOTIFY_AUTH_USER_SCOPE").unwrap_or_else(|_| DEFAULT_SCOPE.into());
        let spotify_auth_base_url = base_url(
            env::var("SPOTIFY_AUTH_BASE_URL")
                .unwrap_or_else(|_| "https://accounts.spotify.com".into()),
        );
        let spotify_data_base_url = base_url(
            env::var("SPOTIFY_DATA_BASE_URL")
                .unwrap_or_else(|_| "https://api.spotify.com/v1".into()),
        );

        let lyrics_base_url = base_url(required("LYRICS_BASE_URL")?);
        let analysis_base_url = base_url(required("ANALYSIS_BASE_URL")?);

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|v| split_list(&v))
            .unwrap_or_default();

        let cookie_secure = parsed("COOKIE_SECURE").unwrap_or(false);
        let request_timeout = Duration::from_secs(parsed("REQUEST_TIMEOUT_SECS").unwrap_or(30));
        let analysis_timeout = Duration::from_secs(parsed("ANALYSIS_TIMEOUT_SECS").unwrap_or(120));

        Ok(Self {
            port,
            spotify_client_id,
            spotify_client_secret,
            spotify_auth_redirect_uri,
            spotify_auth_user_scope,
            spotify_auth_base_url,
            spotify_data_base_url,
            lyrics_base_url,
            analysis_base_url,
            allowed_origins,
            cookie_secure,
            request_timeout,
            analysis_timeout,
        })
    }

    pub fn oauth_settings(&self) -> OAuthSettings {
        OAuthSettings {
            client_id: self.spotify_client_id.clone(),
            client_secret: self.spotify_client_secret.clone(),
            redirect_uri: self.spotify_auth_redirect_uri.clone(),
            scope: self.spotify_auth_user_scope.clone(),
            base_url: self.spotify_auth_base_url.clone(),
            timeout: self.request_timeout,
        }
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).map_err(|_| anyhow::anyhow!("{} is required", name))
}

fn parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
