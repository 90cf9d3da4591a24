//! # Checkout Commands
//!
//! Turns the current cart into a backend order and an invoice.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CheckoutCoordinator::checkout                        │
//! │                                                                         │
//! │  1. Mark the current cart in flight   ── already? ─► CHECKOUT_IN_PROGRESS│
//! │  2. Snapshot cart + form (lock released)                                │
//! │  3. prepare_order                     ── empty cart, cash short,        │
//! │                                          bad guest ─► error, no request │
//! │  4. Voucher validated against another subtotal?                         │
//! │     └─ re-validate ── rejected ─► drop voucher, VOUCHER_REJECTED        │
//! │  5. POST orders                       ── rejected ─► backend message,   │
//! │                                          cart untouched                 │
//! │  6. Commit: clear the submitted cart; reset customer/cash/note unless  │
//! │     staff already started on the next sale                              │
//! │  7. Invoice from the backend order + submitted snapshot                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No step retries. The session lock is never held while waiting on the
//! backend, so staff can keep working in other carts. The cart being
//! submitted is frozen until the request settles: its commands fail with
//! `CHECKOUT_IN_PROGRESS`.

use tracing::{debug, info, warn};

use stride_client::Backend;
use stride_core::checkout::{prepare_order, Invoice, StoreHeader};
use stride_core::voucher::{AppliedVoucher, VoucherValidationRequest};
use stride_core::{Cart, CartKey, CoreError, Customer};

use super::voucher::voucher_error;
use crate::error::ApiError;
use crate::state::{PosConfig, SessionState};

/// Submits carts as orders.
///
/// ## Example
/// ```rust,ignore
/// let coordinator = CheckoutCoordinator::from_config(backend, &config);
/// let invoice = coordinator.checkout(&session).await?;
/// println!("{} {}", invoice.order_code, invoice.total);
/// ```
#[derive(Debug, Clone)]
pub struct CheckoutCoordinator<B> {
    backend: B,
    store: StoreHeader,
    revalidate_stale_voucher: bool,
}

impl<B: Backend> CheckoutCoordinator<B> {
    pub fn new(backend: B, store_name: impl Into<String>) -> Self {
        CheckoutCoordinator {
            backend,
            store: StoreHeader::new(store_name),
            revalidate_stale_voucher: true,
        }
    }

    pub fn from_config(backend: B, config: &PosConfig) -> Self {
        CheckoutCoordinator::new(backend, config.store_name.clone())
            .with_store_address(config.store_address.clone())
            .with_revalidation(config.revalidate_stale_voucher)
    }

    /// Address lines printed under the store name on invoices.
    pub fn with_store_address(mut self, lines: Vec<String>) -> Self {
        self.store = self.store.with_address(lines);
        self
    }

    /// Whether a voucher validated against an older subtotal is re-checked
    /// before submitting.
    pub fn with_revalidation(mut self, enabled: bool) -> Self {
        self.revalidate_stale_voucher = enabled;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Checks out the current cart.
    ///
    /// ## Errors
    /// - `CHECKOUT_IN_PROGRESS`: this cart is already being submitted
    /// - `CART_ERROR`: the cart is empty
    /// - `PAYMENT_ERROR`: cash received is below the total
    /// - `VALIDATION_ERROR`: guest name or phone missing or malformed
    /// - `VOUCHER_REJECTED`: a stale voucher failed re-validation (it is
    ///   removed from the cart)
    /// - Backend errors from `POST orders`, with the backend's message
    ///
    /// On any error the cart, customer and cash are left as they were,
    /// apart from the rejected voucher.
    pub async fn checkout(&self, session: &SessionState) -> Result<Invoice, ApiError> {
        let key = session.read(|s| s.current_key()).await;
        debug!(cart = %key, "checkout command");

        let _guard = session.begin_checkout(&key)?;

        let (cart, form) = session
            .read(|s| (s.cart(&key).cloned(), s.form.clone()))
            .await;
        let mut cart = cart.ok_or_else(|| CoreError::PendingCartNotFound(key.to_string()))?;

        let mut request = prepare_order(&cart, &form)?;

        if self.revalidate_stale_voucher {
            if let Some(refreshed) = self.revalidate(session, &key, &cart, &form.customer).await? {
                cart.apply_voucher(refreshed);
                request = prepare_order(&cart, &form)?;
            }
        }

        let order = match self.backend.create_order(&request).await {
            Ok(order) => order,
            Err(e) => {
                warn!(cart = %key, error = %e, "Order submission failed");
                return Err(e.into());
            }
        };

        // The cart was frozen while in flight. The form is shared, so it may
        // already hold the next sale if staff moved to another cart.
        session
            .mutate(|s| {
                if let Some(submitted) = s.cart_mut(&key) {
                    submitted.clear();
                }
                if s.form == form {
                    s.form.reset();
                } else {
                    debug!(cart = %key, "Checkout form changed in flight, keeping it");
                }
                Ok(())
            })
            .await?;

        info!(
            cart = %key,
            order_code = %order.code,
            total = %order.total,
            payment_method = ?order.payment_method,
            "Order created"
        );

        Ok(Invoice::build(&order, &cart, &request, &self.store))
    }

    /// Re-validates the cart's voucher when the subtotal moved since it was
    /// applied.
    ///
    /// Returns the refreshed voucher, or `None` when nothing needed checking.
    /// A rejection removes the voucher from the session cart.
    async fn revalidate(
        &self,
        session: &SessionState,
        key: &CartKey,
        cart: &Cart,
        customer: &Customer,
    ) -> Result<Option<AppliedVoucher>, ApiError> {
        let subtotal = cart.subtotal();
        let Some(applied) = cart.voucher().filter(|v| v.is_stale(subtotal)) else {
            return Ok(None);
        };

        let code = applied.code().to_string();
        debug!(
            cart = %key,
            code = %code,
            validated = %applied.validated_subtotal,
            current = %subtotal,
            "Re-validating stale voucher"
        );

        let request = VoucherValidationRequest {
            code: code.clone(),
            order_value: subtotal,
            user_id: customer.account_id().map(str::to_string),
        };

        match self.backend.validate_voucher(&request).await {
            Ok(validation) => {
                let refreshed = AppliedVoucher::new(validation.voucher, subtotal);
                let stored = refreshed.clone();
                session
                    .mutate(|s| {
                        if let Some(c) = s.cart_mut(key) {
                            if c.subtotal() == subtotal {
                                c.apply_voucher(stored);
                            }
                        }
                        Ok(())
                    })
                    .await?;
                Ok(Some(refreshed))
            }
            Err(e) => {
                warn!(cart = %key, code = %code, error = %e, "Stale voucher rejected");
                session
                    .mutate(|s| {
                        if let Some(c) = s.cart_mut(key) {
                            c.remove_voucher();
                        }
                        Ok(())
                    })
                    .await?;
                Err(voucher_error(&code, e))
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::{
        add_to_cart, clear_cart, get_cart, get_session, update_checkout_form, update_quantity,
    };
    use crate::commands::pending::{delete_pending_cart, open_pending_cart, switch_cart};
    use crate::commands::voucher::apply_coupon;
    use crate::error::ErrorCode;
    use crate::testing::{line, voucher, FakeBackend};
    use std::sync::Arc;
    use stride_core::checkout::CheckoutForm;
    use stride_core::{DiscountType, LineKey, Money, PaymentMethod};

    fn coordinator() -> CheckoutCoordinator<Arc<FakeBackend>> {
        let backend = FakeBackend::new()
            .with_voucher(voucher("SALE10", DiscountType::Percentage, 10, Some(500_000)));
        CheckoutCoordinator::new(Arc::new(backend), "Stride Sneakers")
    }

    async fn pay(session: &SessionState, method: PaymentMethod, cash: Option<i64>) {
        update_checkout_form(
            session,
            CheckoutForm {
                payment_method: method,
                cash_received: cash.map(Money::new),
                ..CheckoutForm::default()
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_short_cash_rejected_without_request() {
        let coordinator = coordinator();
        let session = SessionState::new();
        add_to_cart(&session, line("p1", "v1", 500_000, 1, 5))
            .await
            .unwrap();
        pay(&session, PaymentMethod::Cash, Some(400_000)).await;

        let err = coordinator.checkout(&session).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);
        assert!(coordinator.backend().calls().is_empty());
        assert_eq!(get_cart(&session).await.lines.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let coordinator = coordinator();
        let err = coordinator.checkout(&SessionState::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);
        assert!(coordinator.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_cash_sale_with_voucher() {
        let coordinator = coordinator();
        let session = SessionState::new();
        add_to_cart(&session, line("p1", "v1", 4_750_000, 2, 12))
            .await
            .unwrap();
        apply_coupon(coordinator.backend(), &session, "SALE10")
            .await
            .unwrap();
        pay(&session, PaymentMethod::Cash, Some(10_000_000)).await;

        let invoice = coordinator.checkout(&session).await.unwrap();
        assert_eq!(invoice.order_code, "HD0001");
        assert_eq!(invoice.store_name, "Stride Sneakers");
        assert_eq!(invoice.subtotal, Money::new(9_500_000));
        assert_eq!(invoice.discount, Money::new(500_000));
        assert_eq!(invoice.total, Money::new(9_000_000));
        assert_eq!(invoice.change_due, Some(Money::new(1_000_000)));
        assert_eq!(invoice.voucher_code.as_deref(), Some("SALE10"));
        assert_eq!(invoice.lines[0].name, "Sneaker p1 (Trắng / 42)");

        let submitted = coordinator.backend().submitted();
        assert_eq!(submitted[0].voucher_id.as_deref(), Some("v-sale10"));

        // Cart cleared, form reset, payment method kept
        let view = get_session(&session).await;
        assert!(view.current.lines.is_empty());
        assert_eq!(view.current.totals.voucher_code, None);
        assert_eq!(view.form.cash_received, None);
        assert_eq!(view.form.payment_method, PaymentMethod::Cash);
    }

    #[tokio::test]
    async fn test_backend_rejection_keeps_state() {
        let coordinator = coordinator();
        let session = SessionState::new();
        add_to_cart(&session, line("p1", "v1", 4_750_000, 2, 12))
            .await
            .unwrap();
        apply_coupon(coordinator.backend(), &session, "SALE10")
            .await
            .unwrap();
        pay(&session, PaymentMethod::Cash, Some(9_000_000)).await;
        let before = session.snapshot().await;

        coordinator.backend().reject_orders("Sản phẩm đã hết hàng");
        let err = coordinator.checkout(&session).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::BackendRejected);
        assert_eq!(err.message, "Sản phẩm đã hết hàng");
        assert_eq!(session.snapshot().await, before);
        assert!(!session.is_checking_out(&CartKey::Main));
    }

    #[tokio::test]
    async fn test_stale_voucher_revalidated() {
        let coordinator = coordinator();
        let session = SessionState::new();
        add_to_cart(&session, line("p1", "v1", 4_750_000, 2, 12))
            .await
            .unwrap();
        apply_coupon(coordinator.backend(), &session, "SALE10")
            .await
            .unwrap();
        update_quantity(&session, LineKey::new("p1", "v1"), -1)
            .await
            .unwrap();
        pay(&session, PaymentMethod::BankTransfer, None).await;

        let invoice = coordinator.checkout(&session).await.unwrap();
        assert_eq!(coordinator.backend().call_count("validate_voucher"), 2);
        assert_eq!(invoice.discount, Money::new(475_000));
        assert_eq!(invoice.total, Money::new(4_275_000));
        assert_eq!(invoice.change_due, None);
    }

    #[tokio::test]
    async fn test_revoked_stale_voucher_blocks_submit() {
        let coordinator = coordinator();
        let session = SessionState::new();
        add_to_cart(&session, line("p1", "v1", 4_750_000, 2, 12))
            .await
            .unwrap();
        apply_coupon(coordinator.backend(), &session, "SALE10")
            .await
            .unwrap();
        update_quantity(&session, LineKey::new("p1", "v1"), -1)
            .await
            .unwrap();
        coordinator.backend().revoke_voucher("SALE10");

        let err = coordinator.checkout(&session).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::VoucherRejected);
        assert_eq!(coordinator.backend().call_count("create_order"), 0);

        let view = get_cart(&session).await;
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.totals.voucher_code, None);
        assert_eq!(view.totals.total, Money::new(4_750_000));
    }

    #[tokio::test]
    async fn test_revalidation_can_be_disabled() {
        let coordinator = coordinator().with_revalidation(false);
        let session = SessionState::new();
        add_to_cart(&session, line("p1", "v1", 4_750_000, 2, 12))
            .await
            .unwrap();
        apply_coupon(coordinator.backend(), &session, "SALE10")
            .await
            .unwrap();
        update_quantity(&session, LineKey::new("p1", "v1"), -1)
            .await
            .unwrap();
        pay(&session, PaymentMethod::Card, None).await;

        let invoice = coordinator.checkout(&session).await.unwrap();
        assert_eq!(coordinator.backend().call_count("validate_voucher"), 1);
        assert_eq!(invoice.discount, Money::new(475_000));
    }

    #[tokio::test]
    async fn test_checkout_in_flight_rejected() {
        let coordinator = coordinator();
        let session = SessionState::new();
        add_to_cart(&session, line("p1", "v1", 100_000, 1, 5))
            .await
            .unwrap();
        pay(&session, PaymentMethod::Card, None).await;

        let guard = session.begin_checkout(&CartKey::Main).unwrap();
        let err = coordinator.checkout(&session).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CheckoutInProgress);
        assert!(coordinator.backend().calls().is_empty());

        drop(guard);
        assert!(coordinator.checkout(&session).await.is_ok());
    }

    #[tokio::test]
    async fn test_cart_frozen_while_order_in_flight() {
        let coordinator = coordinator();
        let session = SessionState::new();
        add_to_cart(&session, line("p1", "v1", 100_000, 1, 5))
            .await
            .unwrap();
        pay(&session, PaymentMethod::Card, None).await;
        let gate = coordinator.backend().hold_orders();

        let (invoice, (added, bumped, cleared)) = tokio::join!(
            coordinator.checkout(&session),
            async {
                gate.reached().await;
                let added = add_to_cart(&session, line("p2", "v1", 300_000, 1, 5)).await;
                let bumped = update_quantity(&session, LineKey::new("p1", "v1"), 1).await;
                let cleared = clear_cart(&session).await;
                gate.open();
                (added, bumped, cleared)
            }
        );

        assert_eq!(added.unwrap_err().code, ErrorCode::CheckoutInProgress);
        assert_eq!(bumped.unwrap_err().code, ErrorCode::CheckoutInProgress);
        assert_eq!(cleared.unwrap_err().code, ErrorCode::CheckoutInProgress);

        let invoice = invoice.unwrap();
        assert_eq!(invoice.lines.len(), 1);
        assert_eq!(invoice.lines[0].quantity, 1);
        assert_eq!(coordinator.backend().submitted()[0].items.len(), 1);
        assert!(get_cart(&session).await.lines.is_empty());

        // Released once the order settles
        add_to_cart(&session, line("p2", "v1", 300_000, 1, 5))
            .await
            .unwrap();
        assert_eq!(get_cart(&session).await.lines.len(), 1);
    }

    #[tokio::test]
    async fn test_voucher_not_applied_while_order_in_flight() {
        let coordinator = coordinator();
        let session = SessionState::new();
        add_to_cart(&session, line("p1", "v1", 1_000_000, 1, 5))
            .await
            .unwrap();
        pay(&session, PaymentMethod::Card, None).await;
        let gate = coordinator.backend().hold_orders();

        let (invoice, applied) = tokio::join!(
            coordinator.checkout(&session),
            async {
                gate.reached().await;
                let applied = apply_coupon(coordinator.backend(), &session, "SALE10").await;
                gate.open();
                applied
            }
        );

        assert_eq!(applied.unwrap_err().code, ErrorCode::CheckoutInProgress);
        let invoice = invoice.unwrap();
        assert_eq!(invoice.voucher_code, None);
        assert_eq!(invoice.total, Money::new(1_000_000));
        assert_eq!(get_cart(&session).await.totals.voucher_code, None);
    }

    #[tokio::test]
    async fn test_other_carts_usable_while_order_in_flight() {
        let coordinator = coordinator();
        let session = SessionState::new();
        let pending_id = match open_pending_cart(&session).await.unwrap().current.key {
            CartKey::Pending(id) => id,
            CartKey::Main => panic!("pending cart should be current"),
        };
        add_to_cart(&session, line("p1", "v1", 200_000, 1, 5))
            .await
            .unwrap();
        pay(&session, PaymentMethod::Card, None).await;
        let gate = coordinator.backend().hold_orders();

        let next_sale = CheckoutForm {
            customer: Customer::Guest {
                name: "Phạm Vy".to_string(),
                phone: "0987654321".to_string(),
            },
            payment_method: PaymentMethod::Cash,
            ..CheckoutForm::default()
        };

        let (invoice, deleted) = tokio::join!(
            coordinator.checkout(&session),
            async {
                gate.reached().await;
                let deleted = delete_pending_cart(&session, pending_id.clone()).await;
                switch_cart(&session, None).await.unwrap();
                add_to_cart(&session, line("p2", "v1", 300_000, 1, 5))
                    .await
                    .unwrap();
                update_checkout_form(&session, next_sale.clone())
                    .await
                    .unwrap();
                gate.open();
                deleted
            }
        );

        assert_eq!(deleted.unwrap_err().code, ErrorCode::CheckoutInProgress);
        assert_eq!(invoice.unwrap().total, Money::new(200_000));

        let view = get_session(&session).await;
        assert_eq!(view.current.key, CartKey::Main);
        assert_eq!(view.current.lines.len(), 1);
        assert_eq!(view.form, next_sale);
        assert_eq!(view.pending.len(), 1);
        assert_eq!(view.pending[0].line_count, 0);
    }

    #[tokio::test]
    async fn test_invoice_carries_store_address() {
        let config = PosConfig {
            store_name: "Stride Sneakers Q1".to_string(),
            store_address: vec![
                "12 Lê Lợi, Quận 1".to_string(),
                "TP. Hồ Chí Minh".to_string(),
            ],
            ..PosConfig::default()
        };
        let coordinator = CheckoutCoordinator::from_config(Arc::new(FakeBackend::new()), &config);
        let session = SessionState::new();
        add_to_cart(&session, line("p1", "v1", 100_000, 1, 5))
            .await
            .unwrap();
        pay(&session, PaymentMethod::Card, None).await;

        let invoice = coordinator.checkout(&session).await.unwrap();
        assert_eq!(invoice.store_name, "Stride Sneakers Q1");
        assert_eq!(invoice.store_address, config.store_address);
    }

    #[tokio::test]
    async fn test_pending_cart_checkout_leaves_main() {
        let coordinator = coordinator();
        let session = SessionState::new();
        add_to_cart(&session, line("p1", "v1", 100_000, 1, 5))
            .await
            .unwrap();
        open_pending_cart(&session).await.unwrap();
        add_to_cart(&session, line("p2", "v1", 300_000, 2, 5))
            .await
            .unwrap();
        pay(&session, PaymentMethod::Card, None).await;

        let invoice = coordinator.checkout(&session).await.unwrap();
        assert_eq!(invoice.total, Money::new(600_000));

        let view = get_session(&session).await;
        assert!(view.current.lines.is_empty());
        assert_eq!(view.main_line_count, 1);
    }

    #[tokio::test]
    async fn test_invalid_guest_rejected() {
        let coordinator = coordinator();
        let session = SessionState::new();
        add_to_cart(&session, line("p1", "v1", 100_000, 1, 5))
            .await
            .unwrap();
        update_checkout_form(
            &session,
            CheckoutForm {
                customer: Customer::Guest {
                    name: "Lê Thu".to_string(),
                    phone: "12345".to_string(),
                },
                payment_method: PaymentMethod::Card,
                ..CheckoutForm::default()
            },
        )
        .await
        .unwrap();

        let err = coordinator.checkout(&session).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(coordinator.backend().calls().is_empty());
    }
}
