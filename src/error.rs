use crate::config::ConfigError;
use crate::domain::{UnknownVariant, ValidationError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl AppError {
    pub fn trade_not_found(id: i64) -> Self {
        AppError::NotFound(format!("trade {} not found", id))
    }

    pub fn investment_not_found(trade_id: i64, investment_id: i64) -> Self {
        AppError::NotFound(format!(
            "investment {} not found for trade {}",
            investment_id, trade_id
        ))
    }

    pub fn wallet_not_found(id: i64) -> Self {
        AppError::NotFound(format!("wallet {} not found", id))
    }
}

impl From<UnknownVariant> for AppError {
    fn from(err: UnknownVariant) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": err.to_string(),
                    "field": err.field,
                    "constraint": err.constraint,
                }),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Config(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": err.to_string() }),
            ),
            AppError::Store(err) => {
                error!(error = %err, "Store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": format!("store error: {}", err) }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
