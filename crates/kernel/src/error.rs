//! Error types.
//!
//! Library operations return `anyhow::Result` for store failures and
//! [`NodeError`] where a caller can break a contract. The HTTP layer maps
//! everything onto [`AppError`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors from node tree operations.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The caller asked for something the tree cannot do in its current
    /// state (e.g., translating an unsaved page).
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Result type alias using NodeError.
pub type NodeResult<T> = Result<T, NodeError>;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("not found")]
    NotFound,

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl From<NodeError> for AppError {
    fn from(err: NodeError) -> Self {
        match err {
            NodeError::Precondition(msg) => AppError::BadRequest(msg),
            NodeError::Store(e) => AppError::Internal(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, body).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
