//! JSON-over-HTTP client shared by every upstream gateway.
//!
//! Normalises connection failures, non-2xx statuses and undecodable bodies into
//! [`TransportError`]. A 401 is reported as its own variant so callers can run
//! their refresh logic; nothing is retried here.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("unauthorized request to {0}")]
    Unauthorized(String),

    #[error("resource not found at {0}")]
    NotFound(String),

    #[error("upstream error {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("invalid URL provided: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("response not valid JSON: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, TransportError::Unauthorized(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::NotFound(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else if e.is_builder() {
            TransportError::InvalidUrl(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// Per-call headers, query parameters and timeout.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer(self, access_token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", access_token))
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn apply(&self, mut builder: RequestBuilder) -> RequestBuilder {
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !self.query.is_empty() {
            builder = builder.query(&self.query);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
    }
}

/// Wraps the process-wide [`Client`]; cloning shares the connection pool.
#[derive(Clone)]
pub struct Transport {
    client: Client,
}

impl Transport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, url: &str, options: &RequestOptions) -> Result<Value, TransportError> {
        debug!("GET {}", url);
        let builder = options.apply(self.client.get(url));
        self.send(url, builder).await
    }

    /// POST an `application/x-www-form-urlencoded` body.
    pub async fn post_form(
        &self,
        url: &str,
        options: &RequestOptions,
        form: &[(&str, &str)],
    ) -> Result<Value, TransportError> {
        debug!("POST (form) {}", url);
        let builder = options.apply(self.client.post(url)).form(form);
        self.send(url, builder).await
    }

    /// POST a JSON body.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        options: &RequestOptions,
        body: &T,
    ) -> Result<Value, TransportError> {
        debug!("POST (json) {}", url);
        let builder = options.apply(self.client.post(url)).json(body);
        self.send(url, builder).await
    }

    async fn send(&self, url: &str, builder: RequestBuilder) -> Result<Value, TransportError> {
        let res = builder.send().await?;
        let status = res.status();

        if status == StatusCode::UNAUTHORIZED {
            debug!("unauthorized response from {}", url);
            return Err(TransportError::Unauthorized(url.to_string()));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        let body = res.text().await?;
        serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
