//! Error handling for the Stockbook backend
//!
//! Every error is turned into the standard failure envelope at the request
//! boundary; nothing here is fatal to the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::StockError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Conflict: {message}")]
    Conflict { resource: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    // External service errors
    #[error("Storage error: {0}")]
    StorageError(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::InsufficientStock { .. } => AppError::InsufficientStock(err.to_string()),
            StockError::InvalidTransition { .. } | StockError::SaleNotActive(_) => {
                AppError::InvalidStateTransition(err.to_string())
            }
            StockError::InvalidQuantity(_)
            | StockError::NegativeQuantity(_)
            | StockError::QuantityOverflow => AppError::validation("quantity", err.to_string()),
            StockError::NegativePrice(_) => AppError::validation("price", err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(name, _)| *name);

        match fields.first() {
            Some((field, errs)) => {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                AppError::validation(field, message)
            }
            None => AppError::ValidationError(errors.to_string()),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>, field: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: ErrorDetail {
                code: code.to_string(),
                field,
            },
        }
    }
}

impl AppError {
    fn status_and_body(&self) -> (StatusCode, ErrorResponse) {
        match self {
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("UNAUTHORIZED", msg.clone(), None),
            ),
            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                ErrorResponse::new("FORBIDDEN", msg.clone(), None),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_ERROR", message.clone(), Some(field.clone())),
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_ERROR", msg.clone(), None),
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorResponse::new(
                    "DUPLICATE_ENTRY",
                    format!("A record with this {} already exists", field),
                    Some(field.clone()),
                ),
            ),
            AppError::Conflict { resource, message } => (
                StatusCode::CONFLICT,
                ErrorResponse::new("CONFLICT", message.clone(), Some(resource.clone())),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("NOT_FOUND", format!("{} not found", resource), None),
            ),
            AppError::InvalidStateTransition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::new("INVALID_STATE_TRANSITION", msg.clone(), None),
            ),
            AppError::InsufficientStock(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::new("INSUFFICIENT_STOCK", msg.clone(), None),
            ),
            AppError::StorageError(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new("STORAGE_ERROR", format!("Storage error: {}", msg), None),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("DATABASE_ERROR", "A database error occurred", None),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("INTERNAL_ERROR", "An internal server error occurred", None),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        (status, Json(body)).into_response()
    }
}

/// Map a unique violation on insert/update to a duplicate entry error
pub fn map_unique_violation(err: sqlx::Error, field: &str) -> AppError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::DuplicateEntry(field.to_string())
        }
        other => AppError::DatabaseError(other),
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shared::SaleStatus;

    #[test]
    fn stock_errors_map_to_taxonomy() {
        let (status, body) = AppError::from(StockError::InsufficientStock {
            available: 0,
            requested: 1,
        })
        .status_and_body();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error.code, "INSUFFICIENT_STOCK");

        let (status, body) = AppError::from(StockError::InvalidTransition {
            from: SaleStatus::Cancelled,
            to: SaleStatus::Cancelled,
        })
        .status_and_body();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error.code, "INVALID_STATE_TRANSITION");

        let (status, body) = AppError::from(StockError::InvalidQuantity(0)).status_and_body();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.field.as_deref(), Some("quantity"));
    }

    #[test]
    fn envelope_is_marked_unsuccessful() {
        let (status, body) = AppError::NotFound("Sale".to_string()).status_and_body();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!body.success);
        assert_eq!(body.message, "Sale not found");
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let (_, body) = AppError::Internal("pool exhausted".to_string()).status_and_body();
        assert!(!body.message.contains("pool"));
    }
}
