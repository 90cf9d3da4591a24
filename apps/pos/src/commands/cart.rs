//! # Cart Commands
//!
//! Commands for the current cart: whichever pending cart is active, or the
//! main cart when none is.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│ Invoice  │       │
//! │  │  Cart    │     │          │     │   Form   │     │          │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                   add_to_cart        checkout                          │
//! │                   update_quantity    (checkout.rs)                     │
//! │                   remove_from_cart                                      │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────►                   │
//! │                                                      (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info};

use stride_core::checkout::CheckoutForm;
use stride_core::{CartKey, CartLine, CartSession, CartTotals, LineKey};

use super::pending::PendingCartSummary;
use crate::error::ApiError;
use crate::state::SessionState;

/// Display name of the walk-in cart.
pub const MAIN_CART_NAME: &str = "Giỏ hàng chính";

/// Current cart with its lines and totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub key: CartKey,
    pub name: String,
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
    pub coupon_input: Option<String>,
    /// The cart changed since the voucher was validated.
    pub voucher_stale: bool,
}

impl CartView {
    pub(crate) fn of(session: &CartSession) -> Self {
        let cart = session.current_cart();
        let name = session
            .pending
            .active_cart()
            .map_or_else(|| MAIN_CART_NAME.to_string(), |p| p.name.clone());

        CartView {
            key: session.current_key(),
            name,
            lines: cart.lines().to_vec(),
            totals: CartTotals::from(cart),
            coupon_input: cart.coupon_input().map(str::to_string),
            voucher_stale: cart
                .voucher()
                .is_some_and(|v| v.is_stale(cart.subtotal())),
        }
    }
}

/// Everything the POS screen renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub current: CartView,
    pub main_line_count: usize,
    pub pending: Vec<PendingCartSummary>,
    pub can_open_pending: bool,
    pub form: CheckoutForm,
}

impl SessionView {
    pub(crate) fn of(session: &CartSession) -> Self {
        SessionView {
            current: CartView::of(session),
            main_line_count: session.main.line_count(),
            pending: PendingCartSummary::list(session),
            can_open_pending: !session.pending.is_full(),
            form: session.form.clone(),
        }
    }
}

/// Gets the current cart contents.
pub async fn get_cart(session: &SessionState) -> CartView {
    debug!("get_cart command");
    session.read(CartView::of).await
}

/// Gets the whole session view: current cart, pending carts and form.
pub async fn get_session(session: &SessionState) -> SessionView {
    debug!("get_session command");
    session.read(SessionView::of).await
}

/// Adds a line to the current cart.
///
/// ## Behavior
/// - Same product and variant already in the cart: quantities merge, as
///   long as the sum stays within stock
/// - Otherwise: appended as a new line
/// - Over stock: rejected, cart unchanged
///
/// Every command here that changes the cart or the form fails with
/// `CHECKOUT_IN_PROGRESS` while the current cart is being submitted.
pub async fn add_to_cart(session: &SessionState, line: CartLine) -> Result<CartView, ApiError> {
    debug!(
        product_id = %line.product_id,
        variant_id = %line.variant_id,
        quantity = line.quantity,
        "add_to_cart command"
    );

    let view = session
        .mutate_current(move |s| {
            s.add_item(line)?;
            Ok(CartView::of(s))
        })
        .await?;

    info!(cart = %view.key, lines = view.totals.line_count, "Item added to cart");
    Ok(view)
}

/// Changes a line's quantity by `delta` (the +/- buttons).
///
/// A result of zero or less removes the line.
pub async fn update_quantity(
    session: &SessionState,
    key: LineKey,
    delta: i64,
) -> Result<CartView, ApiError> {
    debug!(line = %key, delta, "update_quantity command");

    session
        .mutate_current(|s| {
            s.current_cart_mut().update_quantity(&key, delta)?;
            Ok(CartView::of(s))
        })
        .await
}

/// Sets a line's quantity from the quantity field.
pub async fn set_quantity(
    session: &SessionState,
    key: LineKey,
    quantity: i64,
) -> Result<CartView, ApiError> {
    debug!(line = %key, quantity, "set_quantity command");

    session
        .mutate_current(|s| {
            s.current_cart_mut().set_quantity(&key, quantity)?;
            Ok(CartView::of(s))
        })
        .await
}

/// Removes a line. Removing a line that is not there is a no-op.
pub async fn remove_from_cart(session: &SessionState, key: LineKey) -> Result<CartView, ApiError> {
    debug!(line = %key, "remove_from_cart command");

    session
        .mutate_current(|s| {
            if s.current_cart_mut().remove_item(&key).is_some() {
                info!(line = %key, "Item removed from cart");
            }
            Ok(CartView::of(s))
        })
        .await
}

/// Empties the current cart, including its voucher.
pub async fn clear_cart(session: &SessionState) -> Result<CartView, ApiError> {
    debug!("clear_cart command");

    session
        .mutate_current(|s| {
            s.current_cart_mut().clear();
            Ok(CartView::of(s))
        })
        .await
}

/// Replaces the checkout form (customer, payment method, cash, note).
///
/// Only shape is checked here; the full checks run at checkout.
pub async fn update_checkout_form(
    session: &SessionState,
    form: CheckoutForm,
) -> Result<CheckoutForm, ApiError> {
    debug!(payment_method = ?form.payment_method, "update_checkout_form command");

    if form.cash_received.is_some_and(|cash| cash.is_negative()) {
        return Err(ApiError::validation("cash received must not be negative"));
    }

    session
        .mutate_current(move |s| {
            s.form = form;
            Ok(s.form.clone())
        })
        .await
}

/// Stores the text typed into the coupon box without validating it.
pub async fn set_coupon_input(session: &SessionState, text: String) -> Result<CartView, ApiError> {
    session
        .mutate_current(move |s| {
            s.current_cart_mut().set_coupon_input(text);
            Ok(CartView::of(s))
        })
        .await
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::line;
    use stride_core::{Customer, Money, PaymentMethod};

    #[tokio::test]
    async fn test_add_merges_same_variant() {
        let session = SessionState::new();
        add_to_cart(&session, line("p1", "v1", 4_750_000, 1, 12))
            .await
            .unwrap();
        let view = add_to_cart(&session, line("p1", "v1", 4_750_000, 1, 12))
            .await
            .unwrap();

        assert_eq!(view.key, CartKey::Main);
        assert_eq!(view.name, MAIN_CART_NAME);
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].quantity, 2);
        assert_eq!(view.totals.subtotal, Money::new(9_500_000));
    }

    #[tokio::test]
    async fn test_merge_over_stock_rejected() {
        let session = SessionState::new();
        add_to_cart(&session, line("p1", "v1", 100_000, 11, 12))
            .await
            .unwrap();

        let err = add_to_cart(&session, line("p1", "v1", 100_000, 2, 12))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(get_cart(&session).await.lines[0].quantity, 11);
    }

    #[tokio::test]
    async fn test_quantity_changes() {
        let session = SessionState::new();
        add_to_cart(&session, line("p1", "v1", 100_000, 2, 5))
            .await
            .unwrap();
        let key = LineKey::new("p1", "v1");

        let view = update_quantity(&session, key.clone(), 3).await.unwrap();
        assert_eq!(view.lines[0].quantity, 5);

        let err = set_quantity(&session, key.clone(), 6).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let view = update_quantity(&session, key, -5).await.unwrap();
        assert!(view.lines.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_line_not_found() {
        let session = SessionState::new();
        let err = update_quantity(&session, LineKey::new("p9", "v9"), 1)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        // Removing is lenient
        assert!(remove_from_cart(&session, LineKey::new("p9", "v9"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_clear_cart() {
        let session = SessionState::new();
        add_to_cart(&session, line("p1", "v1", 100_000, 1, 5))
            .await
            .unwrap();
        set_coupon_input(&session, "SALE10".to_string())
            .await
            .unwrap();

        let view = clear_cart(&session).await.unwrap();
        assert!(view.lines.is_empty());
        assert_eq!(view.coupon_input, None);
        assert_eq!(view.totals.total, Money::zero());
    }

    #[tokio::test]
    async fn test_update_checkout_form() {
        let session = SessionState::new();
        let form = CheckoutForm {
            customer: Customer::Guest {
                name: "Trần Văn Minh".to_string(),
                phone: "0912345678".to_string(),
            },
            payment_method: PaymentMethod::Cash,
            cash_received: Some(Money::new(500_000)),
            note: None,
        };

        update_checkout_form(&session, form.clone()).await.unwrap();
        assert_eq!(get_session(&session).await.form, form);

        let bad = CheckoutForm {
            cash_received: Some(Money::new(-1)),
            ..form
        };
        assert!(update_checkout_form(&session, bad).await.is_err());
    }
}
