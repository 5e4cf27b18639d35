use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::dashboard::DashboardService;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<DashboardService>,
    pub date_format: String,
}

impl AppState {
    pub fn new(dashboard: Arc<DashboardService>, date_format: String) -> Self {
        Self {
            dashboard,
            date_format,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    /// A date or game id has no row in the store
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backing store could not be reached or a query failed
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A derived record references data that does not resolve
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    /// A cache key was built for the wrong operation or has the wrong shape
    #[error("Malformed cache key: {0}")]
    MalformedCacheKey(String),

    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal,
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::StoreUnavailable(err.to_string())
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::CacheUnavailable(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::StoreUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Store unavailable: {}", msg),
            ),
            AppError::IntegrityViolation(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Integrity violation: {}", msg),
            ),
            AppError::MalformedCacheKey(_) | AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            AppError::CacheUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Cache unavailable: {}", msg),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
