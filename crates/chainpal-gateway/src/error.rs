//! HTTP error responses rendered as `{"detail": "..."}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use chainpal_agent::ReplyError;
use chainpal_core::error::ChainpalError;
use chainpal_market::MarketError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<ChainpalError> for ApiError {
    fn from(e: ChainpalError) -> Self {
        match e {
            ChainpalError::InvalidInput(_) | ChainpalError::Conflict(_) => {
                Self::bad_request(e.to_string())
            }
            ChainpalError::NotFound(detail) => Self::not_found(detail),
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<ReplyError> for ApiError {
    fn from(e: ReplyError) -> Self {
        match e {
            ReplyError::InvalidInput(detail) => Self::bad_request(detail),
            ReplyError::Upstream(e) => Self::internal(format!("{e:#}")),
        }
    }
}

impl From<MarketError> for ApiError {
    fn from(e: MarketError) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, e.to_string())
    }
}
