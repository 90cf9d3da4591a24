//! # Voucher Commands
//!
//! Order-level discount codes. The backend decides whether a code is valid
//! for an order value; the cart keeps the returned terms and recomputes the
//! discount locally on every change.
//!
//! ## Apply Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apply_coupon("sale10")                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_coupon_code ── bad ──► VALIDATION_ERROR (no request sent)    │
//! │       │ "SALE10"                                                        │
//! │       ▼                                                                 │
//! │  POST vouchers/validate {code, orderValue, userId?}                    │
//! │       │                                                                 │
//! │       ├── ok ────► cart.apply_voucher(terms, validated_subtotal)       │
//! │       │                                                                 │
//! │       └── error ─► cart.remove_voucher() ──► VOUCHER_REJECTED          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::{debug, info, warn};

use stride_client::{Backend, ClientError};
use stride_core::validation::validate_coupon_code;
use stride_core::voucher::{AccountVoucher, AppliedVoucher, VoucherValidationRequest};
use stride_core::CoreError;

use super::cart::CartView;
use crate::error::{ApiError, ErrorCode};
use crate::state::SessionState;

/// Turns a failed validation into what staff see.
pub(crate) fn voucher_error(code: &str, err: ClientError) -> ApiError {
    match err.backend_message() {
        Some(message) => ApiError::new(ErrorCode::VoucherRejected, message),
        None => match ApiError::from(err) {
            ApiError {
                code: ErrorCode::BackendRejected,
                ..
            } => CoreError::VoucherRejected {
                code: code.to_string(),
                reason: "not valid for this order".to_string(),
            }
            .into(),
            other => other,
        },
    }
}

/// Validates a code with the backend and attaches it to the current cart.
///
/// ## Behavior
/// - Malformed code: rejected locally, nothing sent, cart unchanged
/// - Backend accepts: the terms replace any previous voucher
/// - Backend rejects: any previous voucher is removed and the backend's
///   message returned. The typed code stays in the coupon box.
pub async fn apply_coupon<B: Backend + ?Sized>(
    backend: &B,
    session: &SessionState,
    code: &str,
) -> Result<CartView, ApiError> {
    let code = validate_coupon_code(code)?;
    debug!(code = %code, "apply_coupon command");

    let (key, subtotal, user_id) = session
        .read(|s| {
            (
                s.current_key(),
                s.current_cart().subtotal(),
                s.form.customer.account_id().map(str::to_string),
            )
        })
        .await;

    let request = VoucherValidationRequest {
        code: code.clone(),
        order_value: subtotal,
        user_id,
    };

    match backend.validate_voucher(&request).await {
        Ok(validation) => {
            let view = session
                .mutate_cart(&key, |s| {
                    let cart = s.cart_mut_or_err(&key)?;
                    cart.apply_voucher(AppliedVoucher::new(validation.voucher, subtotal));
                    Ok(CartView::of(s))
                })
                .await?;

            info!(
                cart = %key,
                code = %code,
                discount = %view.totals.discount,
                "Voucher applied"
            );
            Ok(view)
        }
        Err(e) => {
            warn!(cart = %key, code = %code, error = %e, "Voucher rejected");
            session
                .mutate_cart(&key, |s| {
                    if let Some(cart) = s.cart_mut(&key) {
                        cart.remove_voucher();
                        cart.set_coupon_input(code.clone());
                    }
                    Ok(())
                })
                .await?;
            Err(voucher_error(&code, e))
        }
    }
}

/// Detaches the current cart's voucher. Local only.
pub async fn remove_voucher(session: &SessionState) -> Result<CartView, ApiError> {
    debug!("remove_voucher command");

    session
        .mutate_current(|s| {
            if let Some(removed) = s.current_cart_mut().remove_voucher() {
                info!(code = %removed.code(), "Voucher removed");
            }
            Ok(CartView::of(s))
        })
        .await
}

/// Vouchers an account can still use, for the voucher picker.
pub async fn list_account_vouchers<B: Backend + ?Sized>(
    backend: &B,
    account_id: &str,
) -> Result<Vec<AccountVoucher>, ApiError> {
    debug!(account_id = %account_id, "list_account_vouchers command");

    let now = Utc::now();
    let vouchers = backend.list_account_vouchers(account_id).await?;
    Ok(vouchers
        .into_iter()
        .filter(|v| v.is_usable_at(now))
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================
