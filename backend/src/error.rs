//! Error handling for the StockCare inventory platform
//!
//! Every failure path returns a typed [`AppError`]; the HTTP layer turns it
//! into a consistent JSON error body.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{FieldError, StockError};
use thiserror::Error;
use uuid::Uuid;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business rule errors
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error("Conflict on {resource}: expected version {expected_version}, found {current_version}")]
    Conflict {
        resource: String,
        expected_version: i64,
        current_version: i64,
    },

    // Storage errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// A single field-level validation failure
    pub fn invalid_field(field: &str, code: &str, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, code, message)])
    }

    /// Translate a rejected stock posting for the given product
    pub fn from_stock(product_id: Uuid, err: StockError) -> Self {
        match err {
            StockError::InsufficientStock {
                requested,
                available,
            } => AppError::InsufficientStock {
                product_id,
                requested,
                available,
            },
            StockError::InvalidQuantity(_) => {
                AppError::invalid_field("quantity", "range", "Quantity must be at least 1")
            }
            StockError::Overflow { .. } => AppError::invalid_field(
                "quantity",
                "overflow",
                "Quantity would push stock past the supported maximum",
            ),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let text = rejection.body_text();
        match rejection {
            JsonRejection::JsonDataError(_) => {
                let detail = text
                    .split_once("target type: ")
                    .map(|(_, detail)| detail)
                    .unwrap_or(&text);
                let field = rejected_field(detail).unwrap_or_else(|| "body".to_string());
                AppError::invalid_field(&field, "invalid_value", detail)
            }
            JsonRejection::JsonSyntaxError(_) => {
                AppError::invalid_field("body", "malformed_json", text)
            }
            JsonRejection::MissingJsonContentType(_) => {
                AppError::invalid_field("body", "content_type", text)
            }
            _ => AppError::invalid_field("body", "unreadable_body", text),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::invalid_field("id", "invalid_path", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        let text = rejection.body_text();
        let detail = text
            .split_once("query string: ")
            .map(|(_, detail)| detail)
            .unwrap_or(&text);
        let field = rejected_field(detail).unwrap_or_else(|| "query".to_string());
        AppError::invalid_field(&field, "invalid_query", detail)
    }
}

/// Name of the offending field in a deserializer message, if it carries one
fn rejected_field(detail: &str) -> Option<String> {
    if let Some((_, rest)) = detail.split_once("missing field `") {
        return rest.split('`').next().map(str::to_string);
    }

    let (path, _) = detail.split_once(": ")?;
    if path.is_empty() || path.contains(char::is_whitespace) {
        return None;
    }
    Some(path.to_string())
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorDetail {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
            details: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    field: errors.first().map(|e| e.field.clone()),
                    details: serde_json::to_value(errors).ok(),
                    ..ErrorDetail::new("VALIDATION_ERROR", "One or more fields are invalid")
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::InsufficientStock {
                product_id,
                requested,
                available,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    field: Some("quantity".to_string()),
                    details: Some(serde_json::json!({
                        "product_id": product_id,
                        "requested": requested,
                        "available": available,
                    })),
                    ..ErrorDetail::new(
                        "INSUFFICIENT_STOCK",
                        "Insufficient stock to complete the sale",
                    )
                },
            ),
            AppError::Conflict {
                resource,
                expected_version,
                current_version,
            } => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    field: Some("version".to_string()),
                    details: Some(serde_json::json!({
                        "expected_version": expected_version,
                        "current_version": current_version,
                    })),
                    ..ErrorDetail::new(
                        "CONFLICT",
                        format!("{} was modified by another request; reload and retry", resource),
                    )
                },
            ),
            AppError::DatabaseError(_) | AppError::MigrationError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred"),
            ),
            AppError::StorageError(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail::new("STORAGE_ERROR", format!("Storage error: {}", msg)),
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("CONFIGURATION_ERROR", format!("Configuration error: {}", msg)),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone()),
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred"),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
