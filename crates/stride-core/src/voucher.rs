//! # Voucher Module
//!
//! Order-level discount codes. The backend validates a code against an order
//! value and returns the voucher terms; this module holds those terms and the
//! arithmetic that turns them into a discount for a given subtotal.
//!
//! ## Discount Rules
//! ```text
//! PERCENTAGE   discount = min(subtotal × value%, max_discount?, subtotal)
//! FIXED_AMOUNT discount = min(value, subtotal)
//! below min_order_value  discount = 0
//! ```
//!
//! The discount is always recomputed from the terms against the CURRENT
//! subtotal, so the caps hold even after the cart changed since validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::DiscountType;

/// Discount terms of a voucher, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VoucherTerms {
    pub id: String,
    pub code: String,
    pub discount_type: DiscountType,
    /// Percent (0-100) or đồng, depending on `discount_type`.
    pub value: i64,
    /// Cap for percentage vouchers.
    #[serde(default)]
    pub max_discount: Option<Money>,
    /// Minimum subtotal for the voucher to apply.
    #[serde(default)]
    pub min_order_value: Option<Money>,
}

impl VoucherTerms {
    /// Discount these terms give on `subtotal`.
    ///
    /// ## Example
    /// ```rust
    /// use stride_core::money::Money;
    /// use stride_core::voucher::VoucherTerms;
    /// use stride_core::DiscountType;
    ///
    /// let terms = VoucherTerms {
    ///     id: "v-2".to_string(),
    ///     code: "GIAM2TR".to_string(),
    ///     discount_type: DiscountType::FixedAmount,
    ///     value: 2_000_000,
    ///     max_discount: None,
    ///     min_order_value: None,
    /// };
    /// // Never more than the subtotal itself
    /// assert_eq!(terms.discount_for(Money::new(1_500_000)), Money::new(1_500_000));
    /// ```
    pub fn discount_for(&self, subtotal: Money) -> Money {
        if !subtotal.is_positive() {
            return Money::zero();
        }
        if self.min_order_value.is_some_and(|min| subtotal < min) {
            return Money::zero();
        }

        let raw = match self.discount_type {
            DiscountType::Percentage => {
                let amount = subtotal.percentage(self.value);
                match self.max_discount {
                    Some(cap) => amount.min(cap),
                    None => amount,
                }
            }
            DiscountType::FixedAmount => Money::new(self.value.max(0)),
        };

        raw.min(subtotal)
    }
}

/// A voucher attached to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AppliedVoucher {
    pub terms: VoucherTerms,
    /// Subtotal the backend validated the code against.
    pub validated_subtotal: Money,
}

impl AppliedVoucher {
    pub fn new(terms: VoucherTerms, validated_subtotal: Money) -> Self {
        AppliedVoucher {
            terms,
            validated_subtotal,
        }
    }

    #[inline]
    pub fn code(&self) -> &str {
        &self.terms.code
    }

    /// Discount for the cart's current subtotal.
    #[inline]
    pub fn discount_for(&self, subtotal: Money) -> Money {
        self.terms.discount_for(subtotal)
    }

    /// True when the cart changed since the backend last validated the code.
    #[inline]
    pub fn is_stale(&self, subtotal: Money) -> bool {
        self.validated_subtotal != subtotal
    }
}

/// Body of `POST vouchers/validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VoucherValidationRequest {
    pub code: String,
    pub order_value: Money,
    pub user_id: Option<String>,
}

/// Successful response of `POST vouchers/validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VoucherValidation {
    pub voucher: VoucherTerms,
    /// Discount the backend computed for `order_value`.
    pub discount_amount: Money,
}

/// A voucher held by a customer account (`GET vouchers`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AccountVoucher {
    #[serde(flatten)]
    pub terms: VoucherTerms,
    pub name: String,
    #[serde(default)]
    pub remaining_uses: Option<u32>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub end_date: Option<DateTime<Utc>>,
}

impl AccountVoucher {
    /// Usable at `now`: not expired and uses left.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.end_date.map_or(true, |end| now <= end) && self.remaining_uses != Some(0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
