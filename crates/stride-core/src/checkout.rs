//! # Checkout
//!
//! The pure half of checkout: the form staff fill in, the pre-submit checks,
//! and the order request sent to the backend. The async half (submit,
//! reconcile) lives in the POS app.
//!
//! ## Checkout Steps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  prepare_order(cart, form)  ← THIS MODULE, no I/O                       │
//! │     1. cart has lines?                          → EmptyCart             │
//! │     2. customer valid? (guest name + phone)     → Validation            │
//! │     3. subtotal = Σ price × qty                                         │
//! │     4. discount = voucher terms @ subtotal                              │
//! │     5. total = max(subtotal - discount, 0)                              │
//! │     6. cash? received >= total                  → InsufficientCash      │
//! │     └──► CreateOrderRequest                                             │
//! │                                                                         │
//! │  POST orders (stride-pos) ──► success: clear cart, reset form, Invoice  │
//! │                          └──► failure: nothing changes                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartLine};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Customer, Order, OrderType, PaymentMethod};
use crate::validation::{validate_guest_name, validate_note, validate_phone};

// =============================================================================
// Checkout Form
// =============================================================================

/// What staff enter on the payment panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    pub customer: Customer,
    pub payment_method: PaymentMethod,
    /// Cash handed over, for cash payments.
    pub cash_received: Option<Money>,
    pub note: Option<String>,
}

impl CheckoutForm {
    /// Resets customer, cash received and note after a completed sale.
    /// The payment method stays as the cashier last picked it.
    pub fn reset(&mut self) {
        self.customer = Customer::WalkIn;
        self.cash_received = None;
        self.note = None;
    }
}

// =============================================================================
// Order Request
// =============================================================================

/// One line of the order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub variant_id: String,
    pub quantity: u32,
    /// Effective unit price charged.
    pub price: Money,
}

impl From<&CartLine> for OrderItemRequest {
    fn from(line: &CartLine) -> Self {
        OrderItemRequest {
            variant_id: line.variant_id.clone(),
            quantity: line.quantity,
            price: line.price,
        }
    }
}

/// Body of `POST orders` for a counter sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub order_type: OrderType,
    /// Registered account, when one was selected.
    pub account_id: Option<String>,
    /// Guest details, when typed in.
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub voucher_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderItemRequest>,
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
    pub cash_received: Option<Money>,
    pub change_due: Option<Money>,
    pub note: Option<String>,
}

/// Runs the pre-submit checks and assembles the order request.
///
/// Nothing here touches the network: every rejection happens before a
/// request could be sent.
///
/// ## Example
/// ```rust
/// use stride_core::checkout::{prepare_order, CheckoutForm};
/// use stride_core::{Cart, CoreError};
///
/// let err = prepare_order(&Cart::new(), &CheckoutForm::default()).unwrap_err();
/// assert!(matches!(err, CoreError::EmptyCart));
/// ```
pub fn prepare_order(cart: &Cart, form: &CheckoutForm) -> CoreResult<CreateOrderRequest> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let (account_id, customer_name, customer_phone) = match &form.customer {
        Customer::WalkIn => (None, None, None),
        Customer::Account { id, name, phone } => {
            (Some(id.clone()), Some(name.clone()), phone.clone())
        }
        Customer::Guest { name, phone } => {
            validate_guest_name(name)?;
            validate_phone(phone)?;
            (None, Some(name.trim().to_string()), Some(phone.trim().to_string()))
        }
    };

    let note = match form.note.as_deref().map(str::trim) {
        Some(note) if !note.is_empty() => {
            validate_note(note)?;
            Some(note.to_string())
        }
        _ => None,
    };

    let subtotal = cart.subtotal();
    let discount = cart.discount();
    let total = subtotal.saturating_sub(discount);

    let (cash_received, change_due) = match form.payment_method {
        PaymentMethod::Cash => {
            let received = form.cash_received.unwrap_or_default();
            if received < total {
                return Err(CoreError::InsufficientCash { total, received });
            }
            (Some(received), Some(received - total))
        }
        PaymentMethod::BankTransfer | PaymentMethod::Card => (None, None),
    };

    Ok(CreateOrderRequest {
        order_type: OrderType::Pos,
        account_id,
        customer_name,
        customer_phone,
        voucher_id: cart.voucher().map(|v| v.terms.id.clone()),
        payment_method: form.payment_method,
        items: cart.lines().iter().map(OrderItemRequest::from).collect(),
        subtotal,
        discount,
        total,
        cash_received,
        change_due,
        note,
    })
}

// =============================================================================
// Invoice
// =============================================================================

/// Store details printed at the top of every invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StoreHeader {
    pub name: String,
    /// Printed one per line under the name. Blank lines are dropped.
    pub address: Vec<String>,
}

impl StoreHeader {
    pub fn new(name: impl Into<String>) -> Self {
        StoreHeader {
            name: name.into(),
            address: Vec::new(),
        }
    }

    pub fn with_address(mut self, lines: impl IntoIterator<Item = String>) -> Self {
        self.address = lines
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        self
    }
}

/// One printed invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub original_price: Option<Money>,
    pub line_total: Money,
}

/// What the invoice view renders after a successful checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub order_id: String,
    pub order_code: String,
    pub store_name: String,
    pub store_address: Vec<String>,
    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub lines: Vec<InvoiceLine>,
    pub subtotal: Money,
    pub discount: Money,
    pub voucher_code: Option<String>,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub cash_received: Option<Money>,
    pub change_due: Option<Money>,
}

impl Invoice {
    /// Combines the backend's order with the cart snapshot that was sent.
    ///
    /// Totals come from the backend order, which is authoritative.
    pub fn build(
        order: &Order,
        submitted: &Cart,
        request: &CreateOrderRequest,
        store: &StoreHeader,
    ) -> Self {
        Invoice {
            order_id: order.id.clone(),
            order_code: order.code.clone(),
            store_name: store.name.clone(),
            store_address: store.address.clone(),
            issued_at: order.created_at,
            customer_name: request.customer_name.clone(),
            customer_phone: request.customer_phone.clone(),
            lines: submitted
                .lines()
                .iter()
                .map(|l| InvoiceLine {
                    name: l.display_name(),
                    quantity: l.quantity,
                    unit_price: l.price,
                    original_price: l.original_price,
                    line_total: l.line_total(),
                })
                .collect(),
            subtotal: order.subtotal,
            discount: order.discount,
            voucher_code: submitted.voucher().map(|v| v.code().to_string()),
            total: order.total,
            payment_method: order.payment_method,
            cash_received: request.cash_received,
            change_due: request
                .cash_received
                .map(|cash| cash.saturating_sub(order.total)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::line;
    use crate::order_status::OrderStatus;
    use crate::types::{DiscountType, PaymentStatus};
    use crate::voucher::{AppliedVoucher, VoucherTerms};

    fn cart_with(price: i64, quantity: u32) -> Cart {
        let mut cart = Cart::new();
        cart.add_item(line("p1", "v1", price, quantity, 12)).unwrap();
        cart
    }

    fn cash(received: i64) -> CheckoutForm {
        CheckoutForm {
            cash_received: Some(Money::new(received)),
            ..CheckoutForm::default()
        }
    }

    #[test]
    fn test_empty_cart_rejected() {
        let err = prepare_order(&Cart::new(), &cash(1_000)).unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn test_cash_below_total_rejected() {
        let cart = cart_with(500_000, 1);
        let err = prepare_order(&cart, &cash(400_000)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientCash { total, received }
                if total == Money::new(500_000) && received == Money::new(400_000)
        ));
    }

    #[test]
    fn test_cash_missing_is_treated_as_zero() {
        let cart = cart_with(500_000, 1);
        assert!(prepare_order(&cart, &CheckoutForm::default()).is_err());
    }

    #[test]
    fn test_cash_exact_and_change() {
        let cart = cart_with(500_000, 1);
        let req = prepare_order(&cart, &cash(500_000)).unwrap();
        assert_eq!(req.change_due, Some(Money::zero()));

        let req = prepare_order(&cart, &cash(1_000_000)).unwrap();
        assert_eq!(req.change_due, Some(Money::new(500_000)));
    }

    #[test]
    fn test_non_cash_ignores_cash_received() {
        let cart = cart_with(500_000, 1);
        let form = CheckoutForm {
            payment_method: PaymentMethod::BankTransfer,
            ..CheckoutForm::default()
        };
        let req = prepare_order(&cart, &form).unwrap();
        assert_eq!(req.cash_received, None);
        assert_eq!(req.total, Money::new(500_000));
    }

    #[test]
    fn test_request_carries_voucher_and_totals() {
        let mut cart = cart_with(4_750_000, 2);
        cart.apply_voucher(AppliedVoucher::new(
            VoucherTerms {
                id: "v-10".to_string(),
                code: "SALE10".to_string(),
                discount_type: DiscountType::Percentage,
                value: 10,
                max_discount: Some(Money::new(500_000)),
                min_order_value: None,
            },
            Money::new(9_500_000),
        ));

        let req = prepare_order(&cart, &cash(9_000_000)).unwrap();
        assert_eq!(req.subtotal, Money::new(9_500_000));
        assert_eq!(req.discount, Money::new(500_000));
        assert_eq!(req.total, Money::new(9_000_000));
        assert_eq!(req.voucher_id.as_deref(), Some("v-10"));
        assert_eq!(req.items.len(), 1);
        assert_eq!(req.items[0].quantity, 2);
        assert_eq!(req.items[0].price, Money::new(4_750_000));
    }

    #[test]
    fn test_fixed_voucher_larger_than_subtotal_gives_zero_total() {
        let mut cart = cart_with(1_500_000, 1);
        cart.apply_voucher(AppliedVoucher::new(
            VoucherTerms {
                id: "v-2".to_string(),
                code: "GIAM2TR".to_string(),
                discount_type: DiscountType::FixedAmount,
                value: 2_000_000,
                max_discount: None,
                min_order_value: None,
            },
            Money::new(1_500_000),
        ));

        let req = prepare_order(&cart, &cash(0)).unwrap();
        assert_eq!(req.discount, Money::new(1_500_000));
        assert!(req.total.is_zero());
    }

    #[test]
    fn test_guest_customer_validated() {
        let cart = cart_with(100_000, 1);
        let mut form = cash(100_000);

        form.customer = Customer::Guest {
            name: "  ".to_string(),
            phone: "0912345678".to_string(),
        };
        assert!(prepare_order(&cart, &form).is_err());

        form.customer = Customer::Guest {
            name: "Chị Hoa".to_string(),
            phone: "12345".to_string(),
        };
        assert!(prepare_order(&cart, &form).is_err());

        form.customer = Customer::Guest {
            name: " Chị Hoa ".to_string(),
            phone: "0912345678".to_string(),
        };
        let req = prepare_order(&cart, &form).unwrap();
        assert_eq!(req.customer_name.as_deref(), Some("Chị Hoa"));
        assert_eq!(req.account_id, None);
    }

    #[test]
    fn test_account_customer() {
        let cart = cart_with(100_000, 1);
        let mut form = cash(100_000);
        form.customer = Customer::Account {
            id: "acc-7".to_string(),
            name: "Trần Nam".to_string(),
            phone: None,
        };
        let req = prepare_order(&cart, &form).unwrap();
        assert_eq!(req.account_id.as_deref(), Some("acc-7"));
    }

    #[test]
    fn test_form_reset_keeps_payment_method() {
        let mut form = CheckoutForm {
            customer: Customer::Guest {
                name: "Lan".to_string(),
                phone: "0912345678".to_string(),
            },
            payment_method: PaymentMethod::Card,
            cash_received: Some(Money::new(1)),
            note: Some("gift wrap".to_string()),
        };
        form.reset();
        assert_eq!(form.customer, Customer::WalkIn);
        assert_eq!(form.cash_received, None);
        assert_eq!(form.note, None);
        assert_eq!(form.payment_method, PaymentMethod::Card);
    }

    #[test]
    fn test_invoice_uses_backend_totals() {
        let cart = cart_with(4_750_000, 2);
        let req = prepare_order(&cart, &cash(10_000_000)).unwrap();
        let order = Order {
            id: "o-1".to_string(),
            code: "HD0001".to_string(),
            status: OrderStatus::HoanThanh,
            payment_status: PaymentStatus::Paid,
            payment_method: PaymentMethod::Cash,
            order_type: OrderType::Pos,
            customer_name: None,
            customer_phone: None,
            subtotal: Money::new(9_500_000),
            discount: Money::zero(),
            total: Money::new(9_500_000),
            items: Vec::new(),
            created_at: Utc::now(),
        };

        let store = StoreHeader::new("Stride Sneakers Q1").with_address(vec![
            "12 Lê Lợi, Quận 1".to_string(),
            "  ".to_string(),
            " TP. Hồ Chí Minh ".to_string(),
        ]);

        let invoice = Invoice::build(&order, &cart, &req, &store);
        assert_eq!(invoice.order_code, "HD0001");
        assert_eq!(invoice.store_name, "Stride Sneakers Q1");
        assert_eq!(
            invoice.store_address,
            vec!["12 Lê Lợi, Quận 1".to_string(), "TP. Hồ Chí Minh".to_string()]
        );
        assert_eq!(invoice.lines.len(), 1);
        assert_eq!(invoice.lines[0].line_total, Money::new(9_500_000));
        assert_eq!(invoice.change_due, Some(Money::new(500_000)));
    }
}
