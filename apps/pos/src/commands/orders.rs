//! # Order Commands
//!
//! Admin order screen: look an order up and move it along the fulfilment
//! flow. Every change is checked locally before it is sent, using the
//! order's current status as the backend reports it.

use serde::Serialize;
use tracing::{debug, info};

use stride_client::Backend;
use stride_core::order_status::{selectable_statuses, validate_cancel, validate_transition};
use stride_core::{Order, OrderStatus};

use crate::error::ApiError;

/// An order plus the statuses its "update status" control may offer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub order: Order,
    pub selectable_statuses: Vec<OrderStatus>,
    pub can_cancel: bool,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        OrderView {
            selectable_statuses: selectable_statuses(order.status),
            can_cancel: validate_cancel(order.status).is_ok(),
            order,
        }
    }
}

/// Fetches an order.
pub async fn get_order<B: Backend + ?Sized>(
    backend: &B,
    order_id: &str,
) -> Result<OrderView, ApiError> {
    debug!(order_id = %order_id, "get_order command");
    Ok(backend.get_order(order_id).await?.into())
}

/// Moves an order to `target`.
///
/// ## Errors
/// - `ORDER_STATUS_ERROR`: backward move, terminal order, or completing an
///   order whose payment is still pending. Nothing is sent.
pub async fn update_order_status<B: Backend + ?Sized>(
    backend: &B,
    order_id: &str,
    target: OrderStatus,
) -> Result<OrderView, ApiError> {
    debug!(order_id = %order_id, target = %target, "update_order_status command");

    let order = backend.get_order(order_id).await?;
    validate_transition(order.status, target, order.payment_status)?;

    if target == OrderStatus::DaHuy {
        let updated = backend.cancel_order(order_id, None).await?;
        info!(order_code = %updated.code, "Order cancelled");
        return Ok(updated.into());
    }

    let updated = backend.update_order_status(order_id, target).await?;
    info!(
        order_code = %updated.code,
        from = %order.status,
        to = %updated.status,
        "Order status changed"
    );
    Ok(updated.into())
}

/// Cancels an order that is not yet completed or cancelled.
pub async fn cancel_order<B: Backend + ?Sized>(
    backend: &B,
    order_id: &str,
    reason: Option<&str>,
) -> Result<OrderView, ApiError> {
    debug!(order_id = %order_id, "cancel_order command");

    let reason = reason.map(str::trim).filter(|r| !r.is_empty());
    if let Some(reason) = reason {
        stride_core::validation::validate_note(reason)?;
    }

    let order = backend.get_order(order_id).await?;
    validate_cancel(order.status)?;

    let updated = backend.cancel_order(order_id, reason).await?;
    info!(order_code = %updated.code, "Order cancelled");
    Ok(updated.into())
}

// =============================================================================
// Unit Tests
// =============================================================================
