//! services/api/src/error.rs
//!
//! Defines the startup error type for the service and the request-level error
//! type that handlers return.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use shelfmate_core::ports::PortError;
use tracing::error;

use crate::config::ConfigError;
use crate::web::views;

/// The primary error type for starting the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure while applying the schema migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Errors a request handler can end with.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Username is already taken")]
    DuplicateUsername,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Login required")]
    Unauthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<PortError> for AppError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(what) => AppError::NotFound(what),
            PortError::DuplicateUsername => AppError::DuplicateUsername,
            PortError::RateLimited(message) => AppError::RateLimited(message),
            PortError::Unauthorized => AppError::Unauthenticated,
            PortError::Unexpected(message) => AppError::Storage(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthenticated => Redirect::to("/login").into_response(),
            AppError::NotFound(_) => {
                (StatusCode::NOT_FOUND, Json(json!({ "status": "error" }))).into_response()
            }
            AppError::RateLimited(message) => {
                error!("Recommendation provider rate limited the request: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(views::error_page(&message)),
                )
                    .into_response()
            }
            AppError::Storage(message) => {
                error!("Unhandled storage failure: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(views::error_page("Something went wrong. Please try again later.")),
                )
                    .into_response()
            }
            // Form errors are normally rendered inline by the handler.
            err @ (AppError::DuplicateUsername
            | AppError::PasswordMismatch
            | AppError::InvalidCredentials) => {
                (StatusCode::BAD_REQUEST, Html(views::error_page(&err.to_string()))).into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
