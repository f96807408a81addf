//! Error types for the Usagelog server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    StoreFailure = 3,
    NoSuchUser = 4,
    NoSuchTable = 5,
    SchemaMismatch = 6,
    BadValue = 7,
}

/// Main application error type.
///
/// Note that a value failing numeric or date parsing is NOT an error anywhere
/// in this crate: those coerce to zero / empty via [`crate::tabular::coerce`]
/// and downstream totals depend on that substitution.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The record store could not be reached or refused the request.
    /// Fatal to the operation; nothing is retried.
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    /// A named table does not exist in the document. Carries the available
    /// table names so the caller can self-correct.
    #[error("No table named '{name}'")]
    LookupMiss {
        name: String,
        available: Vec<String>,
    },

    /// Bulk import header is missing required canonical columns. Nothing is
    /// coerced or appended when this is raised.
    #[error("Import template is missing required columns: {}", missing_columns.join(", "))]
    SchemaMismatch { missing_columns: Vec<String> },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Canonical columns absent from an import header (schema mismatch only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_columns: Option<Vec<String>>,
    /// Table names present in the document (lookup miss only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_tables: Option<Vec<String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut missing_columns = None;
        let mut available_tables = None;

        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchTable, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::StoreUnavailable(msg) => {
                tracing::error!("Record store unavailable: {}", msg);
                (StatusCode::BAD_GATEWAY, ErrorCode::StoreFailure, self.to_string())
            }
            AppError::LookupMiss { available, .. } => {
                available_tables = Some(available.clone());
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchTable, self.to_string())
            }
            AppError::SchemaMismatch { missing_columns: cols } => {
                missing_columns = Some(cols.clone());
                (StatusCode::BAD_REQUEST, ErrorCode::SchemaMismatch, self.to_string())
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            missing_columns,
            available_tables,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
