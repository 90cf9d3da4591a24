//! # Error Types
//!
//! Domain-specific error types for stride-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stride-core errors (this file)                                        │
//! │  ├── CoreError        - Cart, checkout and order-status rule failures  │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stride-db errors                                                      │
//! │  └── DbError          - Session snapshot persistence failures          │
//! │                                                                         │
//! │  stride-client errors                                                  │
//! │  └── ClientError      - Backend transport / rejection                  │
//! │                                                                         │
//! │  stride-pos errors                                                     │
//! │  └── ApiError         - What the POS screen sees (serialized)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │                  ClientError ───────┼──► ApiError → toast on screen    │
//! │                  DbError ───────────┘                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant here is raised BEFORE any state change. A caller that gets
//! an `Err` can rely on the cart being exactly as it was.

use thiserror::Error;

use crate::money::Money;
use crate::order_status::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Requested quantity does not fit in the variant's stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Line in cart: qty 11, stock 12
    ///      │
    ///      ▼
    /// add same variant (qty 2) → 13 > 12
    ///      │
    ///      ▼
    /// InsufficientStock { available: 12, requested: 13 }
    ///      │
    ///      ▼
    /// Screen shows: "Chỉ còn 12 sản phẩm"
    /// ```
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: u32,
        requested: u64,
    },

    /// Quantity is zero or negative where a positive value is required.
    #[error("Invalid quantity {0}: must be at least 1")]
    InvalidQuantity(i64),

    /// The line is not in the cart.
    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    /// The pending cart registry is full.
    #[error("Cannot open more than {max} pending carts")]
    PendingCartLimit { max: usize },

    /// No pending cart with this id.
    #[error("Pending cart not found: {0}")]
    PendingCartNotFound(String),

    /// Checkout attempted on a cart without lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cash payment does not cover the order total.
    #[error("Cash received {received} is less than total {total}")]
    InsufficientCash { total: Money, received: Money },

    /// Another checkout for the same cart is still waiting on the backend.
    #[error("Checkout already in progress for {0}")]
    CheckoutInProgress(String),

    /// Order status may only move forward along the fulfilment flow.
    #[error("Cannot change order status from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// The order is completed or cancelled and cannot change any more.
    #[error("Order is already {0}")]
    OrderClosed(OrderStatus),

    /// Completing an order requires the payment to be settled.
    #[error("Cannot complete an order whose payment is still pending")]
    PaymentPending,

    /// Voucher was rejected, locally or by the backend.
    #[error("Voucher {code} rejected: {reason}")]
    VoucherRejected { code: String, reason: String },

    /// A restored session breaks a cart or registry rule.
    #[error("Saved session is inconsistent: {0}")]
    InconsistentSession(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when staff input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., phone number, coupon code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
