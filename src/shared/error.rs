//! Application Error Types
//!
//! Centralized error handling with Axum integration. Database constraint
//! violations are translated here so repositories can simply use `?`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited")]
    RateLimited { retry_after_secs: u64 },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

/// Field-level validation error
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl AppError {
    /// HTTP status this error renders as.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Friendly message for the named unique/foreign-key constraints of the schema.
fn constraint_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_email_key") => "Email already exists",
        Some("users_username_key") => "Username already exists",
        Some("games_slug_key") => "A game with this title already exists",
        Some("reviews_user_id_game_id_key") => "You have already reviewed this game",
        Some("game_lists_user_id_name_key") => "You already have a list with this name",
        Some("game_list_items_pkey") => "Game is already in this list",
        Some("reviews_game_id_fkey") | Some("game_list_items_game_id_fkey") => "Game not found",
        Some("review_likes_review_id_fkey") | Some("review_comments_review_id_fkey") => {
            "Review not found"
        }
        _ => "Resource conflict",
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(constraint_message(db_err.constraint()).into())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                let message = match constraint_message(db_err.constraint()) {
                    "Resource conflict" => "Referenced resource not found",
                    message => message,
                };
                AppError::NotFound(message.into())
            }
            sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
                AppError::BadRequest("Value violates a data constraint".into())
            }
            _ => AppError::Database(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message, errors) = match self {
            AppError::NotFound(msg) => (10001, msg, None),
            AppError::BadRequest(msg) => (10002, msg, None),
            AppError::Unauthorized(msg) => (10003, msg, None),
            AppError::Forbidden(msg) => (10004, msg, None),
            AppError::Conflict(msg) => (10005, msg, None),
            AppError::RateLimited { retry_after_secs } => {
                let body = ErrorResponse {
                    code: 10006,
                    message: "Rate limited".into(),
                    errors: None,
                };
                return (
                    status,
                    [(axum::http::header::RETRY_AFTER, retry_after_secs.to_string())],
                    Json(body),
                )
                    .into_response();
            }
            AppError::Validation { message, errors } => (10007, message, Some(errors)),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (10000, "Internal server error".into(), None)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (10000, "Internal server error".into(), None)
            }
        };

        let body = ErrorResponse {
            code,
            message,
            errors,
        };

        (status, Json(body)).into_response()
    }
}
