//! # Domain Types
//!
//! Catalog and order types used throughout Stride POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Variant      │   │   Promotion     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │1─*│  id             │   │  discount_type  │       │
//! │  │  name, brand    │   │  price, stock   │   │  value          │       │
//! │  │  variants       │   │  color, size    │   │  product_ids    │       │
//! │  └─────────────────┘   └─────────────────┘   │  start/end      │       │
//! │                                              └─────────────────┘       │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │ PaymentMethod   │   │   Customer      │       │
//! │  │  (backend-owned)│   │  Cash           │   │  WalkIn         │       │
//! │  │  status, totals │   │  BankTransfer   │   │  Account{id}    │       │
//! │  │  items          │   │  Card           │   │  Guest{name,ph} │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! These are the normalized shapes. Backend payloads are mapped into them
//! once, in `stride-client`, and nothing past that boundary branches on
//! payload shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::order_status::OrderStatus;

// =============================================================================
// Discount Type
// =============================================================================

/// How a promotion or voucher reduces a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// `value` is a percentage (0-100).
    Percentage,
    /// `value` is an amount in đồng.
    FixedAmount,
}

// =============================================================================
// Product / Variant
// =============================================================================

/// Whether a product is listed for sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

/// A color or size attached to a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VariantAttribute {
    pub id: Option<String>,
    /// Label shown to staff ("Trắng", "42").
    pub name: String,
    /// Machine code (hex color, EU size code).
    pub code: Option<String>,
}

/// One color+size SKU of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,
    pub product_id: String,
    pub sku: Option<String>,
    /// Base price before promotions.
    pub price: Money,
    /// Units available to sell.
    pub stock: u32,
    pub color: Option<VariantAttribute>,
    pub size: Option<VariantAttribute>,
    pub image_url: Option<String>,
}

impl Variant {
    /// Checks if at least `quantity` units can be sold.
    #[inline]
    pub fn can_sell(&self, quantity: u32) -> bool {
        quantity > 0 && quantity <= self.stock
    }
}

/// A product with its variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub code: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub status: ProductStatus,
    pub image_url: Option<String>,
    pub variants: Vec<Variant>,
}

impl Product {
    /// Finds a variant by id.
    pub fn variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    /// Total stock across all variants.
    pub fn total_stock(&self) -> u64 {
        self.variants.iter().map(|v| u64::from(v.stock)).sum()
    }
}

// =============================================================================
// Promotion
// =============================================================================

/// Lifecycle status of a promotion, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionStatus {
    Active,
    Inactive,
    Upcoming,
    Expired,
}

/// A time-bounded, per-product discount rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: String,
    pub name: String,
    pub status: PromotionStatus,
    pub discount_type: DiscountType,
    pub value: i64,
    /// Products this promotion applies to.
    pub product_ids: Vec<String>,
    #[ts(as = "Option<String>")]
    pub start_date: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub end_date: Option<DateTime<Utc>>,
}

impl Promotion {
    /// Checks whether the promotion is `ACTIVE` and `now` falls inside its
    /// window. Open-ended bounds are treated as unbounded.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == PromotionStatus::Active
            && self.start_date.map_or(true, |start| start <= now)
            && self.end_date.map_or(true, |end| now <= end)
    }

    /// Checks whether this promotion targets the product.
    #[inline]
    pub fn applies_to(&self, product_id: &str) -> bool {
        self.product_ids.iter().any(|id| id == product_id)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// How the customer pays at the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Physical cash; requires cash received >= total.
    #[default]
    Cash,
    /// Bank transfer / QR.
    BankTransfer,
    /// Card on an external terminal.
    Card,
}

/// Settlement state of an order's payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    Failed,
}

// =============================================================================
// Customer
// =============================================================================

/// Who the order is for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Customer {
    /// Anonymous walk-in customer.
    #[default]
    WalkIn,
    /// A registered account picked from search.
    Account {
        id: String,
        name: String,
        phone: Option<String>,
    },
    /// A guest whose name and phone staff typed in.
    Guest { name: String, phone: String },
}

impl Customer {
    /// Account id when the customer is registered.
    pub fn account_id(&self) -> Option<&str> {
        match self {
            Customer::Account { id, .. } => Some(id),
            _ => None,
        }
    }
}

// =============================================================================
// Order (backend-owned)
// =============================================================================

/// Channel the order was placed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    #[default]
    Pos,
    Online,
}

/// One line of a persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub variant_id: String,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: u32,
    pub price: Money,
}

/// An order as the backend persisted it.
///
/// The backend is authoritative; this is a read model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub code: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Returns
// =============================================================================

/// Review state of a return request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

/// One item being returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReturnItem {
    pub variant_id: String,
    pub quantity: u32,
}

/// Outbound request to open a return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub order_id: String,
    pub reason: String,
    pub items: Vec<ReturnItem>,
    pub note: Option<String>,
}

/// A return as the backend reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRecord {
    pub id: String,
    pub order_id: String,
    pub status: ReturnStatus,
    pub reason: String,
    #[serde(default)]
    pub items: Vec<ReturnItem>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
