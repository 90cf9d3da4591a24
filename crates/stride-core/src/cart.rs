//! # Cart Module
//!
//! One cart's line items with stock-aware mutation.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Staff Action             Operation              State Change           │
//! │  ────────────             ─────────              ────────────           │
//! │                                                                         │
//! │  Click variant ─────────► add_item() ──────────► push or merge qty     │
//! │                                                                         │
//! │  +/- buttons ───────────► update_quantity() ───► qty += delta          │
//! │                                                  (qty <= 0 removes)    │
//! │  Type quantity ─────────► set_quantity() ──────► qty = n               │
//! │                                                                         │
//! │  Trash icon ────────────► remove_item() ───────► line removed          │
//! │                                                                         │
//! │  Order placed ──────────► clear() ─────────────► lines + voucher gone  │
//! │                                                                         │
//! │  INVARIANT: 1 <= quantity <= stock for every line, after every call.  │
//! │  A call that would break it returns Err and changes NOTHING.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::EffectivePrice;
use crate::types::{Product, Variant};
use crate::voucher::AppliedVoucher;

// =============================================================================
// Line Key
// =============================================================================

/// Identity of a cart line: product + variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineKey {
    pub product_id: String,
    pub variant_id: String,
}

impl LineKey {
    pub fn new(product_id: impl Into<String>, variant_id: impl Into<String>) -> Self {
        LineKey {
            product_id: product_id.into(),
            variant_id: variant_id.into(),
        }
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.product_id, self.variant_id)
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One purchasable selection in a cart.
///
/// ## Design Notes
/// `price` is the effective unit price captured when the line was added,
/// promotions included. If a promotion ends while the line sits in a parked
/// cart, the line keeps the price the customer was quoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub variant_id: String,
    pub name: String,
    /// Effective unit price (after promotion).
    pub price: Money,
    pub original_price: Option<Money>,
    pub discount_percent: Option<u32>,
    pub has_discount: bool,
    pub quantity: u32,
    /// Upper bound for `quantity`.
    pub stock: u32,
    pub color_name: Option<String>,
    pub color_code: Option<String>,
    pub size_name: Option<String>,
    pub size_code: Option<String>,
    pub image_url: Option<String>,
}

impl CartLine {
    /// Builds a line from a catalog variant and its effective price.
    pub fn from_variant(
        product: &Product,
        variant: &Variant,
        pricing: &EffectivePrice,
        quantity: u32,
    ) -> Self {
        CartLine {
            product_id: product.id.clone(),
            variant_id: variant.id.clone(),
            name: product.name.clone(),
            price: pricing.price,
            original_price: pricing.original_price,
            discount_percent: pricing.discount_percent,
            has_discount: pricing.has_discount,
            quantity,
            stock: variant.stock,
            color_name: variant.color.as_ref().map(|c| c.name.clone()),
            color_code: variant.color.as_ref().and_then(|c| c.code.clone()),
            size_name: variant.size.as_ref().map(|s| s.name.clone()),
            size_code: variant.size.as_ref().and_then(|s| s.code.clone()),
            image_url: variant
                .image_url
                .clone()
                .or_else(|| product.image_url.clone()),
        }
    }

    pub fn key(&self) -> LineKey {
        LineKey::new(self.product_id.clone(), self.variant_id.clone())
    }

    #[inline]
    fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id && self.variant_id == key.variant_id
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    fn insufficient_stock(&self, available: u32, requested: u64) -> CoreError {
        CoreError::InsufficientStock {
            name: self.display_name(),
            available,
            requested,
        }
    }

    /// "Name (color / size)" for messages and invoices.
    pub fn display_name(&self) -> String {
        match (&self.color_name, &self.size_name) {
            (Some(color), Some(size)) => format!("{} ({} / {})", self.name, color, size),
            (Some(attr), None) | (None, Some(attr)) => format!("{} ({})", self.name, attr),
            (None, None) => self.name.clone(),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One shopping session: ordered lines plus an optional voucher.
///
/// ## Invariants
/// - A `LineKey` appears at most once; re-adding merges quantities
/// - `1 <= quantity <= stock` for every line
/// - Totals are derived on every read, never cached
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
    voucher: Option<AppliedVoucher>,
    /// Raw coupon text typed by staff, not yet validated.
    coupon_input: Option<String>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Checks the invariants above on a cart that did not come through
    /// `add_item`, such as one decoded from a saved snapshot.
    pub fn check_invariants(&self) -> CoreResult<()> {
        let mut seen = HashSet::new();
        for line in &self.lines {
            if line.quantity == 0 {
                return Err(CoreError::InconsistentSession(format!(
                    "line {} has quantity 0",
                    line.key()
                )));
            }
            if line.quantity > line.stock {
                return Err(CoreError::InconsistentSession(format!(
                    "line {} has quantity {} over stock {}",
                    line.key(),
                    line.quantity,
                    line.stock
                )));
            }
            if !seen.insert(line.key()) {
                return Err(CoreError::InconsistentSession(format!(
                    "line {} appears twice",
                    line.key()
                )));
            }
        }
        Ok(())
    }

    /// Lines in display (insertion) order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.matches(key))
    }

    /// Adds a line, or merges it into the existing line with the same key.
    ///
    /// ## Behavior
    /// - Existing line: quantity grows by `line.quantity`, as long as the sum
    ///   stays within `line.stock` (the freshest stock figure). The stored
    ///   stock is refreshed on success.
    /// - New line: inserted when `1 <= quantity <= stock`.
    /// - Anything else: `Err`, cart untouched. Excess is never truncated.
    pub fn add_item(&mut self, line: CartLine) -> CoreResult<()> {
        if line.quantity == 0 {
            return Err(CoreError::InvalidQuantity(0));
        }

        let key = line.key();
        if let Some(existing) = self.lines.iter_mut().find(|l| l.matches(&key)) {
            let requested = u64::from(existing.quantity) + u64::from(line.quantity);
            if requested > u64::from(line.stock) {
                return Err(existing.insufficient_stock(line.stock, requested));
            }
            existing.quantity += line.quantity;
            existing.stock = line.stock;
            return Ok(());
        }

        if line.quantity > line.stock {
            return Err(line.insufficient_stock(line.stock, u64::from(line.quantity)));
        }

        self.lines.push(line);
        Ok(())
    }

    /// Applies `delta` to a line's quantity.
    ///
    /// ## Behavior
    /// - Result `<= 0`: the line is removed
    /// - Result above stock: `Err`, prior quantity kept
    /// - Unknown key: `Err(LineNotFound)`
    pub fn update_quantity(&mut self, key: &LineKey, delta: i64) -> CoreResult<()> {
        let index = self
            .lines
            .iter()
            .position(|l| l.matches(key))
            .ok_or_else(|| CoreError::LineNotFound(key.to_string()))?;

        let line = &mut self.lines[index];
        let next = i64::from(line.quantity).saturating_add(delta);

        if next <= 0 {
            self.lines.remove(index);
            return Ok(());
        }
        if next > i64::from(line.stock) {
            return Err(line.insufficient_stock(line.stock, next as u64));
        }

        line.quantity = next as u32;
        Ok(())
    }

    /// Sets a line's quantity directly (typed into the quantity field).
    ///
    /// Same rules as [`Cart::update_quantity`]: zero or less removes.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: i64) -> CoreResult<()> {
        let current = self
            .line(key)
            .map(|l| i64::from(l.quantity))
            .ok_or_else(|| CoreError::LineNotFound(key.to_string()))?;
        self.update_quantity(key, quantity.saturating_sub(current))
    }

    /// Removes a line unconditionally. Returns it if it was present.
    pub fn remove_item(&mut self, key: &LineKey) -> Option<CartLine> {
        let index = self.lines.iter().position(|l| l.matches(key))?;
        Some(self.lines.remove(index))
    }

    /// Updates a line's stock bound with a fresher figure.
    ///
    /// Rejected, line unchanged, when the line already holds more than
    /// `stock` units; the caller decides whether to lower the quantity.
    pub fn refresh_stock(&mut self, key: &LineKey, stock: u32) -> CoreResult<()> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.matches(key))
            .ok_or_else(|| CoreError::LineNotFound(key.to_string()))?;

        if line.quantity > stock {
            return Err(line.insufficient_stock(stock, u64::from(line.quantity)));
        }
        line.stock = stock;
        Ok(())
    }

    /// Empties the cart and drops the voucher and coupon text.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.voucher = None;
        self.coupon_input = None;
    }

    // -------------------------------------------------------------------------
    // Voucher
    // -------------------------------------------------------------------------

    pub fn voucher(&self) -> Option<&AppliedVoucher> {
        self.voucher.as_ref()
    }

    /// Attaches a validated voucher, replacing any previous one.
    pub fn apply_voucher(&mut self, voucher: AppliedVoucher) {
        self.coupon_input = Some(voucher.code().to_string());
        self.voucher = Some(voucher);
    }

    /// Detaches the voucher. Local only.
    pub fn remove_voucher(&mut self) -> Option<AppliedVoucher> {
        self.coupon_input = None;
        self.voucher.take()
    }

    pub fn coupon_input(&self) -> Option<&str> {
        self.coupon_input.as_deref()
    }

    pub fn set_coupon_input(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.coupon_input = if text.trim().is_empty() { None } else { Some(text) };
    }

    // -------------------------------------------------------------------------
    // Totals
    // -------------------------------------------------------------------------

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// `Σ price × quantity`, recomputed on every call.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Voucher discount against the current subtotal.
    pub fn discount(&self) -> Money {
        self.voucher
            .as_ref()
            .map_or(Money::zero(), |v| v.discount_for(self.subtotal()))
    }

    /// `subtotal - discount`, never negative.
    pub fn total(&self) -> Money {
        self.subtotal().saturating_sub(self.discount())
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Cart totals summary for the right-hand panel of the POS screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: u64,
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
    pub voucher_code: Option<String>,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            total_quantity: cart.total_quantity(),
            subtotal: cart.subtotal(),
            discount: cart.discount(),
            total: cart.total(),
            voucher_code: cart.voucher().map(|v| v.code().to_string()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
