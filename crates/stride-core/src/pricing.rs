//! # Pricing Module
//!
//! Derives the price a variant actually sells for, given the promotions
//! currently running.
//!
//! ## Where Pricing Sits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Variant.price (base) ──┐                                              │
//! │                         ├──► effective_price() ──► EffectivePrice      │
//! │  active promotions ─────┘         (per line)        │                  │
//! │                                                     ▼                  │
//! │                                         CartLine.price / catalog card  │
//! │                                                                         │
//! │  Vouchers are NOT applied here: they work on the order subtotal and    │
//! │  live in `voucher` / `checkout`.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{DiscountType, Promotion};

/// The price a variant sells for after promotions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EffectivePrice {
    /// Price charged per unit.
    pub price: Money,
    /// Base price, present only when a promotion applied.
    pub original_price: Option<Money>,
    /// Percentage shown on the "-20%" badge.
    pub discount_percent: Option<u32>,
    pub has_discount: bool,
}

impl EffectivePrice {
    /// A price with no promotion applied.
    pub const fn undiscounted(price: Money) -> Self {
        EffectivePrice {
            price,
            original_price: None,
            discount_percent: None,
            has_discount: false,
        }
    }
}

/// Computes the effective unit price for a product's variant.
///
/// ## Precedence
/// Promotions are scanned in the order given and the FIRST one that targets
/// `product_id` wins. Promotions never stack, and there is no "best discount"
/// selection. The caller is expected to pass promotions already filtered by
/// [`active_promotions`].
///
/// ## Rules
/// - Percentage: `price = base - round(base × value / 100)`
/// - Fixed amount: `price = base - value`
/// - The price never goes below zero.
///
/// ## Example
/// ```rust
/// use stride_core::money::Money;
/// use stride_core::pricing::effective_price;
///
/// let price = effective_price(Money::new(2_000_000), "p-1", &[]);
/// assert_eq!(price.price, Money::new(2_000_000));
/// assert!(!price.has_discount);
/// ```
pub fn effective_price(base: Money, product_id: &str, promotions: &[Promotion]) -> EffectivePrice {
    let Some(promotion) = promotions.iter().find(|p| p.applies_to(product_id)) else {
        return EffectivePrice::undiscounted(base);
    };

    let reduction = promotion_reduction(base, promotion.discount_type, promotion.value);
    let price = base.saturating_sub(reduction);

    let discount_percent = match promotion.discount_type {
        DiscountType::Percentage => promotion.value.clamp(0, 100) as u32,
        DiscountType::FixedAmount if base.is_positive() => {
            // Rounded to the nearest whole percent for the badge
            ((reduction.amount() as i128 * 100 + base.amount() as i128 / 2) / base.amount() as i128)
                as u32
        }
        DiscountType::FixedAmount => 0,
    };

    EffectivePrice {
        price,
        original_price: Some(base),
        discount_percent: Some(discount_percent),
        has_discount: true,
    }
}

/// Amount a single promotion takes off `base`, capped at `base`.
fn promotion_reduction(base: Money, discount_type: DiscountType, value: i64) -> Money {
    let reduction = match discount_type {
        DiscountType::Percentage => base.percentage(value),
        DiscountType::FixedAmount => Money::new(value.max(0)),
    };
    reduction.min(base)
}

/// Keeps promotions that are `ACTIVE` and running at `now`, preserving the
/// backend's order (which decides first-match precedence).
pub fn active_promotions(promotions: &[Promotion], now: DateTime<Utc>) -> Vec<Promotion> {
    promotions
        .iter()
        .filter(|p| p.is_active_at(now))
        .cloned()
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PromotionStatus;
    use chrono::Duration;

    fn promo(id: &str, product: &str, discount_type: DiscountType, value: i64) -> Promotion {
        Promotion {
            id: id.to_string(),
            name: format!("Promo {}", id),
            status: PromotionStatus::Active,
            discount_type,
            value,
            product_ids: vec![product.to_string()],
            start_date: None,
            end_date: None,
        }
    }

    #[test]
    fn test_no_matching_promotion() {
        let promos = vec![promo("a", "other", DiscountType::Percentage, 50)];
        let price = effective_price(Money::new(3_200_000), "p-1", &promos);

        assert_eq!(price, EffectivePrice::undiscounted(Money::new(3_200_000)));
    }

    #[test]
    fn test_percentage_promotion() {
        let promos = vec![promo("a", "p-1", DiscountType::Percentage, 20)];
        let price = effective_price(Money::new(3_200_000), "p-1", &promos);

        assert_eq!(price.price, Money::new(2_560_000));
        assert_eq!(price.original_price, Some(Money::new(3_200_000)));
        assert_eq!(price.discount_percent, Some(20));
        assert!(price.has_discount);
    }

    #[test]
    fn test_fixed_amount_promotion_derives_percent() {
        let promos = vec![promo("a", "p-1", DiscountType::FixedAmount, 500_000)];
        let price = effective_price(Money::new(2_000_000), "p-1", &promos);

        assert_eq!(price.price, Money::new(1_500_000));
        assert_eq!(price.discount_percent, Some(25));
    }

    #[test]
    fn test_fixed_amount_never_below_zero() {
        let promos = vec![promo("a", "p-1", DiscountType::FixedAmount, 5_000_000)];
        let price = effective_price(Money::new(2_000_000), "p-1", &promos);

        assert!(price.price.is_zero());
        assert_eq!(price.discount_percent, Some(100));
    }

    #[test]
    fn test_first_matching_promotion_wins() {
        let promos = vec![
            promo("small", "p-1", DiscountType::Percentage, 5),
            promo("big", "p-1", DiscountType::Percentage, 40),
        ];
        let price = effective_price(Money::new(1_000_000), "p-1", &promos);

        assert_eq!(price.price, Money::new(950_000));
        assert_eq!(price.discount_percent, Some(5));
    }

    #[test]
    fn test_active_promotions_filters_and_keeps_order() {
        let now = Utc::now();
        let mut expired = promo("expired", "p-1", DiscountType::Percentage, 50);
        expired.end_date = Some(now - Duration::hours(1));
        let mut paused = promo("paused", "p-1", DiscountType::Percentage, 30);
        paused.status = PromotionStatus::Inactive;
        let first = promo("first", "p-1", DiscountType::Percentage, 10);
        let second = promo("second", "p-2", DiscountType::Percentage, 15);

        let active = active_promotions(&[expired, first, paused, second], now);
        let ids: Vec<&str> = active.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }
}
