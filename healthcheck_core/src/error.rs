//! Library error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HealthCheckError>;

#[derive(Error, Debug)]
pub enum HealthCheckError {
    #[error("discovery failed in provider '{provider}': {source}")]
    Discovery {
        provider: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("unknown check: {0}")]
    UnknownCheck(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntoResponse for HealthCheckError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            HealthCheckError::UnknownCheck(name) => {
                (StatusCode::NOT_FOUND, format!("unknown check: {}", name))
            }
            HealthCheckError::Discovery { provider, source } => {
                tracing::error!("Discovery failed in provider '{}': {:?}", provider, source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "health check discovery failed".to_string(),
                )
            }
            other => {
                tracing::error!("Unexpected error: {:?}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
