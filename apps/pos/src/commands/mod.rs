//! # Commands Module
//!
//! Everything the POS screen can ask for.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── cart.rs      ◄─── Current cart manipulation + checkout form
//! ├── pending.rs   ◄─── Pending carts (Hoá đơn chờ)
//! ├── catalog.rs   ◄─── Product grid with effective prices
//! ├── voucher.rs   ◄─── Coupon box
//! ├── checkout.rs  ◄─── CheckoutCoordinator → Invoice
//! ├── orders.rs    ◄─── Order lookup and status changes
//! └── returns.rs   ◄─── Return requests
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  async fn add_catalog_variant(                                          │
//! │      session: &SessionState,   ◄── shared cart session                 │
//! │      catalog: &Catalog,        ◄── last loaded product grid            │
//! │      product_id, variant_id,   ◄── from the clicked card               │
//! │      quantity: i64,            ◄── raw input, validated here           │
//! │  ) -> Result<CartView, ApiError>                                        │
//! │         │                                                               │
//! │         │ (serde_json)                                                  │
//! │         ▼                                                               │
//! │  POS screen receives: CartView | { code, message }                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Injection
//! Each command takes only what it needs:
//! ```rust,ignore
//! // Only the session
//! async fn get_cart(session: &SessionState)
//!
//! // Only the backend
//! async fn get_order(backend: &B, order_id: &str)
//!
//! // Both
//! async fn apply_coupon(backend: &B, session: &SessionState, code: &str)
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod pending;
pub mod returns;
pub mod voucher;

pub use cart::{CartView, SessionView};
pub use catalog::{Catalog, CatalogEntry};
pub use checkout::CheckoutCoordinator;
pub use orders::OrderView;
pub use pending::PendingCartSummary;
