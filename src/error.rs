//! Error types and HTTP error response handling.
//!
//! Errors are layered the same way the code is:
//!
//! - [`RepositoryError`]: what the store reported
//! - [`ServiceError`]: a repository error tagged with the service call site
//! - [`AppError`]: what a handler returns, converted into an HTTP response

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use uuid::Uuid;

/// Failure reported by a [`SubscriptionRepository`](crate::repository::SubscriptionRepository).
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Delete or update matched zero rows.
    #[error("subscription {0} not found")]
    NotFound(Uuid),

    /// Building or executing a statement failed.
    #[error("{operation} failed: {source}")]
    Query {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl RepositoryError {
    pub(crate) fn query(operation: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| RepositoryError::Query { operation, source }
    }
}

/// A repository failure wrapped with the service method it surfaced from.
#[derive(Debug, thiserror::Error)]
#[error("SubscriptionService::{operation}: {source}")]
pub struct ServiceError {
    pub operation: &'static str,
    #[source]
    pub source: RepositoryError,
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self.source, RepositoryError::NotFound(_))
    }
}

/// Application-wide error type returned by handlers.
///
/// # Status Code Mapping
///
/// - `Validation` → 400 Bad Request, message names the field and rule
/// - `InvalidRequest` → 400 Bad Request (undecodable body, malformed id)
/// - `RouteNotFound` → 404, `MethodNotAllowed` → 405 (router fallbacks)
/// - `Service` → 500 Internal Server Error, details hidden from the client
/// - `ShuttingDown` → 503, request cut off after the shutdown grace period
///
/// A missing record on delete/update arrives as `Service` and is answered
/// with 500 like any other store failure; the distinct kind is kept on
/// [`ServiceError::is_not_found`] and in the logs.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("route not found")]
    RouteNotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("server is shutting down")]
    ShuttingDown,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }
}

/// Convert AppError into an HTTP response.
///
/// All errors return JSON of the form `{"error": "<message>"}`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) | AppError::InvalidRequest(msg) => {
                tracing::warn!(error = %msg, "rejected request");
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::RouteNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, self.to_string()),
            AppError::Service(err) => {
                tracing::error!(
                    error = ?err,
                    not_found = err.is_not_found(),
                    "{}",
                    err
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            AppError::ShuttingDown => {
                tracing::warn!("request cut off after shutdown grace period");
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
