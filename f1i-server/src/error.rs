//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use f1i_core::model::ParseError;
use f1i_core::{DominanceError, ProviderError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Dominance(#[from] DominanceError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Dominance(DominanceError::InvalidSegmentCount) => StatusCode::BAD_REQUEST,
            ApiError::Dominance(_) => StatusCode::NOT_FOUND,
            ApiError::Provider(ProviderError::SessionNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Provider(ProviderError::Other(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Parse(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status.is_server_error() {
            tracing::error!("Request failed: {:#}", self);
            format!("Failed to process request: {}", self)
        } else {
            self.to_string()
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
