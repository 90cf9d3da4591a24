//! # stride-core: Pure Business Logic for Stride POS
//!
//! This crate is the **heart** of the Stride POS counter. It holds the cart,
//! pricing and checkout rules as pure functions and plain data, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stride POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Storefront / POS screen (web)                   │   │
//! │  │   Catalog ──► Cart ──► Pending carts ──► Checkout ──► Invoice   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    stride-pos commands                          │   │
//! │  │    add_to_cart, create_pending_cart, apply_coupon, checkout     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stride-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │ pricing  │ │   cart   │ │ registry │ │ voucher/checkout │  │   │
//! │  │   │Promotion │ │ CartLine │ │ Pending  │ │ CreateOrder      │  │   │
//! │  │   │ Effective│ │   Cart   │ │  carts   │ │ Request          │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │            ┌───────────────────┴───────────────────┐                   │
//! │  ┌─────────▼─────────┐                 ┌───────────▼─────────┐         │
//! │  │ stride-db (SQLite)│                 │ stride-client (REST)│         │
//! │  └───────────────────┘                 └─────────────────────┘         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog and order types (Product, Variant, Promotion, Order)
//! - [`money`] - Money type with integer arithmetic (whole đồng)
//! - [`pricing`] - Promotion-aware effective price per variant
//! - [`cart`] - One cart's lines with stock-aware mutation
//! - [`registry`] - Up to five parked pending carts
//! - [`session`] - Main cart + pending carts + checkout form
//! - [`voucher`] - Order-level voucher terms and discount math
//! - [`checkout`] - Order request assembly and pre-submit checks
//! - [`order_status`] - Admin order-status transitions
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use stride_core::money::Money;
//! use stride_core::voucher::VoucherTerms;
//! use stride_core::DiscountType;
//!
//! let subtotal = Money::new(9_500_000);
//! let voucher = VoucherTerms {
//!     id: "v-1".to_string(),
//!     code: "SALE10".to_string(),
//!     discount_type: DiscountType::Percentage,
//!     value: 10,
//!     max_discount: Some(Money::new(500_000)),
//!     min_order_value: None,
//! };
//!
//! // 10% of 9.500.000 is 950.000, capped at 500.000
//! assert_eq!(voucher.discount_for(subtotal), Money::new(500_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod order_status;
pub mod pricing;
pub mod registry;
pub mod session;
pub mod types;
pub mod validation;
pub mod voucher;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartTotals, LineKey};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order_status::OrderStatus;
pub use registry::{PendingCart, PendingCartRegistry};
pub use session::{CartKey, CartSession};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of pending carts ("Hoá đơn chờ") open at the same time.
///
/// ## Business Reason
/// A counter serves a handful of interleaved customers at most; more parked
/// tickets than this get forgotten.
pub const MAX_PENDING_CARTS: usize = 5;

/// Display name prefix for pending carts: "Giỏ hàng 1", "Giỏ hàng 2", ...
pub const PENDING_CART_NAME_PREFIX: &str = "Giỏ hàng";
