//! # Pending Cart Commands
//!
//! "Hoá đơn chờ": up to five parked carts, so one counter can serve several
//! customers interleaved.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  [ Giỏ hàng chính ]  [ Giỏ hàng 1 • 2 ]  [ Giỏ hàng 3 • 1 ]  [ + ]      │
//! │         ▲                     ▲                                ▲        │
//! │   switch_cart(None)    switch_cart(Some(id))          open_pending_cart │
//! │                                                     (disabled at 5)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Names come from a sequence that never goes back, so deleting
//! "Giỏ hàng 2" and opening another gives "Giỏ hàng 4", not a second "2".

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use stride_core::{CartKey, CartSession, CoreError, Money, PendingCart};

use super::cart::{CartView, SessionView};
use crate::error::ApiError;
use crate::state::SessionState;

/// One tab in the pending cart strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCartSummary {
    pub id: String,
    pub name: String,
    pub sequence: u32,
    pub created_at: DateTime<Utc>,
    pub line_count: usize,
    pub total_quantity: u64,
    pub total: Money,
    pub is_active: bool,
}

impl PendingCartSummary {
    fn of(pending: &PendingCart, active_id: Option<&str>) -> Self {
        PendingCartSummary {
            id: pending.id.clone(),
            name: pending.name.clone(),
            sequence: pending.sequence,
            created_at: pending.created_at,
            line_count: pending.cart.line_count(),
            total_quantity: pending.cart.total_quantity(),
            total: pending.cart.total(),
            is_active: active_id == Some(pending.id.as_str()),
        }
    }

    /// Summaries in creation order.
    pub(crate) fn list(session: &CartSession) -> Vec<Self> {
        let active_id = session.pending.active_id();
        session
            .pending
            .iter()
            .map(|p| PendingCartSummary::of(p, active_id))
            .collect()
    }

    fn find(session: &CartSession, id: &str) -> Result<Self, CoreError> {
        session
            .pending
            .get(id)
            .map(|p| PendingCartSummary::of(p, session.pending.active_id()))
            .ok_or_else(|| CoreError::PendingCartNotFound(id.to_string()))
    }
}

/// Lists pending carts.
pub async fn list_pending_carts(session: &SessionState) -> Vec<PendingCartSummary> {
    debug!("list_pending_carts command");
    session.read(PendingCartSummary::list).await
}

/// Creates an empty pending cart without switching to it.
///
/// ## Errors
/// `PENDING_CART_LIMIT` when five are already open.
pub async fn create_pending_cart(session: &SessionState) -> Result<PendingCartSummary, ApiError> {
    debug!("create_pending_cart command");

    let summary = session
        .mutate(|s| {
            let id = s.pending.create_cart()?;
            PendingCartSummary::find(s, &id)
        })
        .await?;

    info!(id = %summary.id, name = %summary.name, "Pending cart created");
    Ok(summary)
}

/// Creates a pending cart and makes it current (the "+" tab).
pub async fn open_pending_cart(session: &SessionState) -> Result<SessionView, ApiError> {
    debug!("open_pending_cart command");

    let view = session
        .mutate(|s| {
            s.open_pending_cart()?;
            Ok(SessionView::of(s))
        })
        .await?;

    info!(cart = %view.current.key, name = %view.current.name, "Pending cart opened");
    Ok(view)
}

/// Switches the current cart. `None` selects the main cart.
pub async fn switch_cart(session: &SessionState, id: Option<String>) -> Result<CartView, ApiError> {
    debug!(id = ?id, "switch_cart command");

    session
        .mutate(|s| {
            s.pending.set_active(id.as_deref())?;
            Ok(CartView::of(s))
        })
        .await
}

/// Deletes a pending cart and its lines. Deleting the active cart makes
/// the main cart current.
pub async fn delete_pending_cart(session: &SessionState, id: String) -> Result<SessionView, ApiError> {
    debug!(id = %id, "delete_pending_cart command");

    let view = session
        .mutate_cart(&CartKey::Pending(id.clone()), |s| {
            let removed = s.pending.delete_cart(&id)?;
            info!(
                id = %removed.id,
                name = %removed.name,
                lines = removed.cart.line_count(),
                "Pending cart deleted"
            );
            Ok(SessionView::of(s))
        })
        .await?;

    Ok(view)
}

/// Renames a pending cart, usually to the customer's name.
pub async fn rename_pending_cart(
    session: &SessionState,
    id: String,
    name: String,
) -> Result<PendingCartSummary, ApiError> {
    debug!(id = %id, "rename_pending_cart command");

    session
        .mutate(|s| {
            s.pending.rename_cart(&id, &name)?;
            PendingCartSummary::find(s, &id)
        })
        .await
}

// =============================================================================
// Unit Tests
// =============================================================================
