use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::insights::InsightsError;
use crate::spotify::{AuthError, MusicError};

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };
        (
            status,
            Json(json!({ "error": message })),
        )
            .into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(e: PathRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        error!("token request failed - {}", e);
        AppError::Unauthorized(e.to_string())
    }
}

impl From<MusicError> for AppError {
    fn from(e: MusicError) -> Self {
        error!("Spotify data request failed - {}", e);
        match &e {
            MusicError::Refresh(_) => AppError::Unauthorized(e.to_string()),
            _ if e.is_unauthorized() => AppError::Unauthorized(e.to_string()),
            MusicError::NotFound(_) => AppError::NotFound(e.to_string()),
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl From<InsightsError> for AppError {
    fn from(e: InsightsError) -> Self {
        match e {
            InsightsError::Music(inner) => inner.into(),
            InsightsError::InvalidLimit(_) => AppError::BadRequest(e.to_string()),
            InsightsError::MissingLyrics(_) => {
                error!("insights request failed - {}", e);
                AppError::NotFound(e.to_string())
            }
            other => {
                error!("insights request failed - {}", other);
                AppError::Internal(other.to_string())
            }
        }
    }
}
