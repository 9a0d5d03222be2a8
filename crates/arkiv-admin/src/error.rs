//! View error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use arkiv_db::StoreError;

use crate::render::RenderError;

/// Errors a view handler can surface to the caller
#[derive(Debug)]
pub enum ViewError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl ViewError {
    pub fn not_found(resource: &'static str, id: impl std::fmt::Display) -> Self {
        ViewError::NotFound(format!("{} with id {} not found", resource, id))
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ViewError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ViewError::Internal(msg.into())
    }
}

impl From<StoreError> for ViewError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ViewError::NotFound(msg),
            other => ViewError::Internal(other.to_string()),
        }
    }
}

impl From<RenderError> for ViewError {
    fn from(err: RenderError) -> Self {
        ViewError::Internal(err.to_string())
    }
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        match self {
            ViewError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            ViewError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ViewError::Internal(msg) => {
                tracing::error!(error = %msg, "View handler failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

pub type ViewResult<T> = Result<T, ViewError>;
