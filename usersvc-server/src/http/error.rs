//! API error types with IntoResponse
//!
//! Every error leaves the server as `{"error": message}` with a matching
//! status code. Store failures are logged and replaced by a per-route message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::repos::DbError;

/// Fallback message for store failures without route context
const INTERNAL_ERROR: &str = "an internal error occurred";

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Path identifier missing, non-numeric or not positive (400)
    InvalidUserId,

    /// Request body couldn't be parsed (400)
    BadRequest { message: String },

    /// Row doesn't exist (404)
    NotFound { resource: &'static str, id: String },

    /// Store rejected the values (400)
    Constraint { message: String },

    /// Store failure (500, logged)
    Store {
        context: &'static str,
        source: DbError,
    },
}

impl ApiError {
    /// Convert a repository error, using `context` as the client-facing
    /// message when the store itself failed.
    pub fn from_db(err: DbError, context: &'static str) -> Self {
        match err {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Constraint(message) => Self::Constraint { message },
            source @ DbError::Sqlx(_) => Self::Store { context, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidUserId | Self::BadRequest { .. } | Self::Constraint { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::InvalidUserId => "Invalid User ID".to_owned(),
            Self::BadRequest { message } | Self::Constraint { message } => message.clone(),
            Self::NotFound { resource, id } => format!("{} with ID {} not found", resource, id),
            Self::Store { context, .. } => (*context).to_owned(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Store { context, source } = &self {
            // Log the actual error, return the route message
            tracing::error!("{}: {}", context, source);
        }

        let body = json!({ "error": self.message() });
        (self.status(), Json(body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        Self::from_db(e, INTERNAL_ERROR)
    }
}

/// Attach a client-facing message to repository results
pub trait StoreResultExt<T> {
    fn or_store_error(self, context: &'static str) -> Result<T, ApiError>;
}

impl<T> StoreResultExt<T> for Result<T, DbError> {
    fn or_store_error(self, context: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::from_db(e, context))
    }
}
