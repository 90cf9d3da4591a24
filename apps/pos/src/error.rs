//! # API Error Type
//!
//! Unified error type for POS commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stride POS                             │
//! │                                                                         │
//! │  POS screen                  Rust                                       │
//! │  ──────────                  ────                                       │
//! │                                                                         │
//! │  checkout()                                                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function → Result<T, ApiError>                          │  │
//! │  │                                                                  │  │
//! │  │  Rule broken?     ─── CoreError::InsufficientCash ──┐            │  │
//! │  │  Backend said no? ─── ClientError::Api{message} ────┼─► ApiError │  │
//! │  │  Snapshot failed? ─── DbError ──────────────────────┘            │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  toast(e.message)   // e.code = "PAYMENT_ERROR"                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! When the backend sent a message, that message is what staff see.

use serde::Serialize;
use std::fmt;
use stride_client::ClientError;
use stride_core::{CoreError, ValidationError};
use stride_db::DbError;

use crate::state::ConfigError;

/// Error returned from POS commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Air Max 90 (Trắng / 42): available 12, requested 13"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
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
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Local database operation failed
    DatabaseError,

    /// Cart operation failed
    CartError,

    /// Insufficient stock
    InsufficientStock,

    /// Five pending carts already open
    PendingCartLimit,

    /// Cash does not cover the total
    PaymentError,

    /// A checkout for this cart is already waiting on the backend
    CheckoutInProgress,

    /// Voucher code rejected
    VoucherRejected,

    /// Order status change not allowed
    OrderStatusError,

    /// Backend rejected the request
    BackendRejected,

    /// Backend could not be reached
    NetworkError,

    /// Backend credentials missing or expired
    Unauthorized,

    /// Configuration could not be loaded
    ConfigError,

    /// Internal error
    Internal,
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
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
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

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::InvalidQuantity(_) | CoreError::Validation(_) => ErrorCode::ValidationError,
            CoreError::LineNotFound(_) | CoreError::PendingCartNotFound(_) => ErrorCode::NotFound,
            CoreError::PendingCartLimit { .. } => ErrorCode::PendingCartLimit,
            CoreError::EmptyCart => ErrorCode::CartError,
            CoreError::InsufficientCash { .. } => ErrorCode::PaymentError,
            CoreError::CheckoutInProgress(_) => ErrorCode::CheckoutInProgress,
            CoreError::InvalidStatusTransition { .. }
            | CoreError::OrderClosed(_)
            | CoreError::PaymentPending => ErrorCode::OrderStatusError,
            CoreError::VoucherRejected { .. } => ErrorCode::VoucherRejected,
            CoreError::InconsistentSession(_) => ErrorCode::Internal,
        };

        // Validation errors read better without the wrapper prefix
        let message = match err {
            CoreError::Validation(inner) => inner.to_string(),
            other => other.to_string(),
        };

        ApiError::new(code, message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts backend client errors to API errors.
///
/// ## Message Rule
/// The backend's own message wins; otherwise a generic one per category.
impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api { message, .. } => ApiError::new(ErrorCode::BackendRejected, message),
            ClientError::Validation(_) => {
                ApiError::new(ErrorCode::BackendRejected, "The server rejected the request")
            }
            ClientError::NotFound(_) => {
                ApiError::new(ErrorCode::NotFound, "The requested record no longer exists")
            }
            ClientError::Unauthorized | ClientError::Forbidden(_) => {
                ApiError::new(ErrorCode::Unauthorized, "Not authorized to call the server")
            }
            ClientError::Http(e) => {
                tracing::warn!(error = %e, "Backend unreachable");
                ApiError::new(ErrorCode::NetworkError, "Could not reach the server")
            }
            ClientError::InvalidResponse(e) | ClientError::Internal(e) => {
                tracing::error!(error = %e, "Backend error");
                ApiError::new(ErrorCode::BackendRejected, "The server could not process the request")
            }
            ClientError::Serialization(e) => {
                tracing::error!(error = %e, "Unexpected backend payload");
                ApiError::new(ErrorCode::Internal, "The server returned an unexpected response")
            }
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::QueryFailed(e) | DbError::Internal(e) => {
                tracing::error!("Database operation failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::SnapshotVersion { .. } => ApiError::new(
                ErrorCode::DatabaseError,
                "Saved session was written by a newer version",
            ),
            DbError::Serialization(e) => {
                tracing::error!("Session snapshot unreadable: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Saved session could not be read")
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
