//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Packcalc                               │
//! │                                                                         │
//! │  Client                       Rust Backend                              │
//! │  ──────                       ────────────                              │
//! │                                                                         │
//! │  POST /calculate                                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler: Result<Json<T>, ApiError>                              │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Bad JSON? ──────── JsonRejection ─────────────────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Optimizer / store? ── ServiceError ────────────► ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  HTTP 400 { "code": "VALIDATION_ERROR", "message": "target must be    │
//! │             positive" }                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal failures are logged here with full detail and reach the client
//! as a generic message.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use packcalc_core::{CoreError, ErrorKind};
use packcalc_db::DbError;

use crate::service::ServiceError;

/// Error body returned by every failing endpoint.
///
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "packs is required"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Route or resource not found (404)
    NotFound,

    /// No pack combination reaches the target (422)
    Unreachable,

    /// Search window or deadline exceeded (413)
    ResourceExceeded,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Unreachable => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::ResourceExceeded => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, message)
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts optimizer errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        if let CoreError::Validation(e) = &err {
            return ApiError::validation(e.to_string());
        }

        match err.kind() {
            ErrorKind::InvalidInput => ApiError::validation(err.to_string()),
            ErrorKind::Unreachable => ApiError::new(ErrorCode::Unreachable, err.to_string()),
            ErrorKind::ResourceExceeded => {
                ApiError::new(ErrorCode::ResourceExceeded, err.to_string())
            }
            ErrorKind::ReconstructionFailure => {
                tracing::error!("Optimizer invariant broken: {}", err);
                ApiError::internal("Calculation failed")
            }
        }
    }
}

/// Converts storage errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::InvalidCatalog(e) => ApiError::validation(e.to_string()),
            DbError::NotFound { entity, id } => {
                ApiError::not_found(format!("{} not found: {}", entity, id))
            }
            // Only a generated calculation id can collide
            DbError::UniqueViolation { field, value } => {
                tracing::error!("Unique violation on {}: {}", field, value);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::CorruptRecord { entity, message } => {
                tracing::error!(entity = %entity, "Corrupt record: {}", message);
                ApiError::new(ErrorCode::DatabaseError, "Stored data is inconsistent")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts service errors to API errors.
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Core(e) => e.into(),
            ServiceError::Store(e) => e.into(),
            ServiceError::Timeout { .. } => {
                ApiError::new(ErrorCode::ResourceExceeded, err.to_string())
            }
            ServiceError::Worker(e) => {
                tracing::error!("Calculation worker failed: {}", e);
                ApiError::internal("Calculation failed")
            }
        }
    }
}

/// Malformed or mistyped JSON bodies are a client error.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use packcalc_core::ValidationError;

    #[test]
    fn test_core_error_mapping() {
        let err: ApiError = CoreError::from(ValidationError::Required {
            field: "packs".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "packs is required");

        let err: ApiError = CoreError::ResourceExceeded {
            limit: 20,
            ceiling: 10,
        }
        .into();
        assert_eq!(err.code.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let err: ApiError = CoreError::Unreachable { target: 7, limit: 12 }.into();
        assert_eq!(err.code.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let err: ApiError = CoreError::ReconstructionFailure {
            total: 8,
            remaining: 4,
        }
        .into();
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.message, "Calculation failed");
    }

    #[test]
    fn test_db_error_hides_details() {
        let err: ApiError = DbError::QueryFailed("near \"SELEC\": syntax error".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("SELEC"));

        let err: ApiError = DbError::InvalidCatalog(ValidationError::InvalidPackSize { size: 0 }).into();
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unique_violation_is_server_fault() {
        let err: ApiError = DbError::UniqueViolation {
            field: "id".to_string(),
            value: "6f1c".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.code.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("6f1c"));
    }

    #[test]
    fn test_unallocatable_search_is_resource_exceeded() {
        let err: ApiError = CoreError::AllocationFailed { limit: 1 << 40 }.into();
        assert_eq!(err.code, ErrorCode::ResourceExceeded);

        let err: ApiError = CoreError::SearchSpaceOverflow {
            target: i64::MAX / 4,
            max_size: 1,
        }
        .into();
        assert_eq!(err.code.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_timeout_is_resource_exceeded() {
        let err: ApiError = ServiceError::Timeout { timeout_ms: 5000 }.into();
        assert_eq!(err.code, ErrorCode::ResourceExceeded);
        assert!(err.message.contains("5000"));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::not_found("No route for /nope")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "No route for /nope");
    }
}
