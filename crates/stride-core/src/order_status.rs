//! # Order Status
//!
//! Fulfilment states of a backend order and the guard the admin order screen
//! runs before asking the backend to change one.
//!
//! ```text
//! CHO_XAC_NHAN ─► CHO_GIAO_HANG ─► DANG_VAN_CHUYEN ─► DA_GIAO_HANG ─► HOAN_THANH
//!      │               │                 │                 │
//!      └───────────────┴──── cancel ─────┴─────────────────┴──────► DA_HUY
//! ```
//!
//! `HOAN_THANH` and `DA_HUY` are terminal. The backend stays the authority;
//! this guard only avoids sending requests it would refuse.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::PaymentStatus;

/// Order fulfilment status, serialized with the backend's names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Awaiting confirmation.
    ChoXacNhan,
    /// Confirmed, awaiting hand-over to the carrier.
    ChoGiaoHang,
    /// With the carrier.
    DangVanChuyen,
    /// Delivered.
    DaGiaoHang,
    /// Completed.
    HoanThanh,
    /// Cancelled.
    DaHuy,
}

/// Forward order of the non-cancelled states.
pub const FLOW: [OrderStatus; 5] = [
    OrderStatus::ChoXacNhan,
    OrderStatus::ChoGiaoHang,
    OrderStatus::DangVanChuyen,
    OrderStatus::DaGiaoHang,
    OrderStatus::HoanThanh,
];

impl OrderStatus {
    /// Wire name, e.g. `"CHO_XAC_NHAN"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::ChoXacNhan => "CHO_XAC_NHAN",
            OrderStatus::ChoGiaoHang => "CHO_GIAO_HANG",
            OrderStatus::DangVanChuyen => "DANG_VAN_CHUYEN",
            OrderStatus::DaGiaoHang => "DA_GIAO_HANG",
            OrderStatus::HoanThanh => "HOAN_THANH",
            OrderStatus::DaHuy => "DA_HUY",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::HoanThanh | OrderStatus::DaHuy)
    }

    /// Position in [`FLOW`]. `None` for `DA_HUY`.
    fn rank(&self) -> Option<usize> {
        FLOW.iter().position(|s| s == self)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statuses the "update status" control offers: the current one and every
/// later one. Empty once the order is terminal.
pub fn selectable_statuses(current: OrderStatus) -> Vec<OrderStatus> {
    if current.is_terminal() {
        return Vec::new();
    }
    match current.rank() {
        Some(rank) => FLOW[rank..].to_vec(),
        None => Vec::new(),
    }
}

/// Checks a status change before it is sent to the backend.
///
/// ## Rules
/// - Terminal orders do not change
/// - No moving backward along [`FLOW`]
/// - `HOAN_THANH` needs a settled payment
/// - `DA_HUY` goes through [`validate_cancel`]
///
/// ## Example
/// ```rust
/// use stride_core::order_status::validate_transition;
/// use stride_core::{OrderStatus, PaymentStatus};
///
/// assert!(validate_transition(
///     OrderStatus::DaGiaoHang,
///     OrderStatus::HoanThanh,
///     PaymentStatus::Pending,
/// )
/// .is_err());
/// ```
pub fn validate_transition(
    current: OrderStatus,
    target: OrderStatus,
    payment_status: PaymentStatus,
) -> CoreResult<()> {
    if current.is_terminal() {
        return Err(CoreError::OrderClosed(current));
    }
    if target == OrderStatus::DaHuy {
        return validate_cancel(current);
    }

    let moves_forward = match (current.rank(), target.rank()) {
        (Some(from), Some(to)) => to >= from,
        _ => false,
    };
    if !moves_forward {
        return Err(CoreError::InvalidStatusTransition {
            from: current,
            to: target,
        });
    }

    if target == OrderStatus::HoanThanh && payment_status == PaymentStatus::Pending {
        return Err(CoreError::PaymentPending);
    }

    Ok(())
}

/// Cancel is allowed from any non-terminal status.
pub fn validate_cancel(current: OrderStatus) -> CoreResult<()> {
    if current.is_terminal() {
        return Err(CoreError::OrderClosed(current));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_string(&OrderStatus::DangVanChuyen).unwrap();
        assert_eq!(json, "\"DANG_VAN_CHUYEN\"");

        let status: OrderStatus = serde_json::from_str("\"CHO_XAC_NHAN\"").unwrap();
        assert_eq!(status, OrderStatus::ChoXacNhan);
        assert_eq!(OrderStatus::DaHuy.to_string(), "DA_HUY");
    }

    #[test]
    fn test_selectable_statuses() {
        assert_eq!(
            selectable_statuses(OrderStatus::DangVanChuyen),
            vec![
                OrderStatus::DangVanChuyen,
                OrderStatus::DaGiaoHang,
                OrderStatus::HoanThanh
            ]
        );
        assert_eq!(selectable_statuses(OrderStatus::ChoXacNhan).len(), 5);
        assert!(selectable_statuses(OrderStatus::HoanThanh).is_empty());
        assert!(selectable_statuses(OrderStatus::DaHuy).is_empty());
    }

    #[test]
    fn test_forward_moves_allowed() {
        assert!(validate_transition(
            OrderStatus::ChoXacNhan,
            OrderStatus::DangVanChuyen,
            PaymentStatus::Pending
        )
        .is_ok());
        // Re-selecting the current status is a no-op, not an error
        assert!(validate_transition(
            OrderStatus::ChoGiaoHang,
            OrderStatus::ChoGiaoHang,
            PaymentStatus::Pending
        )
        .is_ok());
    }

    #[test]
    fn test_backward_move_rejected() {
        let err = validate_transition(
            OrderStatus::DaGiaoHang,
            OrderStatus::ChoGiaoHang,
            PaymentStatus::Paid,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidStatusTransition {
                from: OrderStatus::DaGiaoHang,
                to: OrderStatus::ChoGiaoHang
            }
        ));
    }

    #[test]
    fn test_completion_requires_payment() {
        let err = validate_transition(
            OrderStatus::DaGiaoHang,
            OrderStatus::HoanThanh,
            PaymentStatus::Pending,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::PaymentPending));

        assert!(validate_transition(
            OrderStatus::DaGiaoHang,
            OrderStatus::HoanThanh,
            PaymentStatus::Paid
        )
        .is_ok());
    }

    #[test]
    fn test_terminal_orders_are_closed() {
        for status in [OrderStatus::HoanThanh, OrderStatus::DaHuy] {
            let err =
                validate_transition(status, OrderStatus::ChoXacNhan, PaymentStatus::Paid)
                    .unwrap_err();
            assert!(matches!(err, CoreError::OrderClosed(_)));
            assert!(validate_cancel(status).is_err());
        }
    }

    #[test]
    fn test_cancel_from_any_open_status() {
        for status in FLOW.iter().filter(|s| !s.is_terminal()) {
            assert!(validate_cancel(*status).is_ok());
            assert!(validate_transition(*status, OrderStatus::DaHuy, PaymentStatus::Paid).is_ok());
        }
    }
}
