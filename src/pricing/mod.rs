//! # Pricing Engine
//!
//! Pure computation of what a cart costs at checkout:
//!
//! ```text
//! subtotal     = Σ unit_price * quantity
//! discount     = coupon effect, clamped to [0, subtotal]
//! taxable      = subtotal - discount
//! tax          = round(taxable * tax_rate)
//! delivery_fee = 0 if subtotal >= free_delivery_threshold else base_delivery_fee
//! grand_total  = taxable + tax + delivery_fee
//! ```
//!
//! Discount and tax are rounded to whole currency units as they are computed,
//! so the same cart always yields the same totals.

pub mod coupons;

pub use coupons::CouponBook;

use crate::lifecycle::config::PricingConfig;
use crate::model::{Amount, Coupon, CouponKind, LineItem, Totals};
use thiserror::Error;

/// Reasons a cart cannot be priced.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PricingError {
    /// Malformed pricing input (negative price, zero quantity, bad coupon...).
    #[error("Pricing validation error: {0}")]
    Validation(String),

    /// The cart has no line items and the caller did not allow that.
    #[error("Cart is empty")]
    EmptyCart,
}

/// Whether an empty cart may be priced (as an all-zero order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyCartPolicy {
    #[default]
    Reject,
    Allow,
}

/// Computes [`Totals`] from line items with the configured rates.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Prices `items` with an optional coupon. Deterministic and side-effect free.
    pub fn compute_totals(
        &self,
        items: &[LineItem],
        coupon: Option<&Coupon>,
        empty: EmptyCartPolicy,
    ) -> Result<Totals, PricingError> {
        if items.is_empty() && empty == EmptyCartPolicy::Reject {
            return Err(PricingError::EmptyCart);
        }
        if items.is_empty() {
            return Ok(Totals::default());
        }

        let subtotal = subtotal(items)?;
        let discount = match coupon {
            Some(coupon) => discount(subtotal, coupon)?,
            None => 0,
        };
        let taxable = subtotal - discount;
        let tax = round_units(taxable as f64 * self.config.tax_rate);
        let delivery_fee = if subtotal >= self.config.free_delivery_threshold {
            0
        } else {
            self.config.base_delivery_fee
        };
        let grand_total = taxable
            .checked_add(tax)
            .and_then(|total| total.checked_add(delivery_fee))
            .ok_or_else(|| PricingError::Validation("grand total overflows".into()))?;

        Ok(Totals {
            subtotal,
            discount,
            tax,
            delivery_fee,
            grand_total,
        })
    }
}

fn subtotal(items: &[LineItem]) -> Result<Amount, PricingError> {
    items.iter().try_fold(0 as Amount, |acc, item| {
        if item.unit_price < 0 {
            return Err(PricingError::Validation(format!(
                "negative unit price {} for product {}",
                item.unit_price, item.product_id
            )));
        }
        if item.quantity == 0 {
            return Err(PricingError::Validation(format!(
                "quantity must be at least 1 for product {}",
                item.product_id
            )));
        }
        item.unit_price
            .checked_mul(Amount::from(item.quantity))
            .and_then(|line| acc.checked_add(line))
            .ok_or_else(|| PricingError::Validation("subtotal overflows".into()))
    })
}

fn discount(subtotal: Amount, coupon: &Coupon) -> Result<Amount, PricingError> {
    if !coupon.amount.is_finite() {
        return Err(PricingError::Validation(format!(
            "coupon amount {} is not a number",
            coupon.amount
        )));
    }
    let raw = match coupon.kind {
        CouponKind::Percent => round_units(subtotal as f64 * coupon.amount / 100.0),
        CouponKind::Fixed => round_units(coupon.amount),
    };
    Ok(raw.clamp(0, subtotal))
}

fn round_units(value: f64) -> Amount {
    value.round() as Amount
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> PricingEngine {
        PricingEngine::new(PricingConfig {
            tax_rate: 0.18,
            free_delivery_threshold: 4000,
            base_delivery_fee: 79,
        })
    }

    fn cart(unit_price: Amount, quantity: u32) -> Vec<LineItem> {
        vec![LineItem::new("p1", "Lamp", unit_price, quantity)]
    }

    fn with_coupon(unit_price: Amount, quantity: u32, coupon: Coupon) -> Totals {
        engine()
            .compute_totals(&cart(unit_price, quantity), Some(&coupon), EmptyCartPolicy::Reject)
            .unwrap()
    }

    #[test]
    fn test_plain_cart() {
        let totals = engine()
            .compute_totals(&cart(1000, 2), None, EmptyCartPolicy::Reject)
            .unwrap();
        assert_eq!(
            totals,
            Totals {
                subtotal: 2000,
                discount: 0,
                tax: 360,
                delivery_fee: 79,
                grand_total: 2439,
            }
        );
    }

    #[test]
    fn test_percent_coupon() {
        let totals = with_coupon(1000, 2, Coupon::percent(10.0));
        assert_eq!(totals.discount, 200);
        assert_eq!(totals.taxable(), 1800);
        assert_eq!(totals.tax, 324);
        assert_eq!(totals.delivery_fee, 79);
        assert_eq!(totals.grand_total, 2203);
    }

    #[test]
    fn test_free_delivery_regardless_of_coupon() {
        let engine = engine();
        for coupon in [None, Some(Coupon::percent(50.0)), Some(Coupon::fixed(3999))] {
            let totals = engine
                .compute_totals(&cart(2000, 2), coupon.as_ref(), EmptyCartPolicy::Reject)
                .unwrap();
            assert_eq!(totals.subtotal, 4000);
            assert_eq!(totals.delivery_fee, 0);
        }
        let below = engine
            .compute_totals(&cart(3999, 1), None, EmptyCartPolicy::Reject)
            .unwrap();
        assert_eq!(below.delivery_fee, 79);
    }

    #[test]
    fn test_fixed_coupon_is_clamped() {
        let over = with_coupon(100, 1, Coupon::fixed(500));
        assert_eq!(over.discount, 100);
        assert_eq!(over.tax, 0);
        assert_eq!(over.grand_total, 79);

        let negative = with_coupon(100, 1, Coupon::fixed(-20));
        assert_eq!(negative.discount, 0);

        let huge_percent = with_coupon(100, 1, Coupon::percent(150.0));
        assert_eq!(huge_percent.discount, 100);
    }

    #[test]
    fn test_rounding_of_intermediate_steps() {
        // 15% of 333 = 49.95 -> 50, taxable 283, 18% = 50.94 -> 51
        let totals = with_coupon(333, 1, Coupon::percent(15.0));
        assert_eq!(totals.discount, 50);
        assert_eq!(totals.tax, 51);
        assert_eq!(totals.grand_total, 283 + 51 + 79);
    }

    #[test]
    fn test_deterministic() {
        let engine = engine();
        let items = vec![
            LineItem::new("a", "A", 199, 3),
            LineItem::new("b", "B", 1249, 1),
            LineItem::new("c", "C", 0, 7),
        ];
        let coupon = Coupon::percent(12.5);
        let first = engine
            .compute_totals(&items, Some(&coupon), EmptyCartPolicy::Reject)
            .unwrap();
        for _ in 0..10 {
            let again = engine
                .compute_totals(&items, Some(&coupon), EmptyCartPolicy::Reject)
                .unwrap();
            assert_eq!(first, again);
        }
        assert!(first.grand_total >= 0);
    }

    #[test]
    fn test_rejects_bad_input() {
        let engine = engine();
        assert!(matches!(
            engine.compute_totals(&cart(-1, 1), None, EmptyCartPolicy::Reject),
            Err(PricingError::Validation(_))
        ));
        assert!(matches!(
            engine.compute_totals(&cart(10, 0), None, EmptyCartPolicy::Reject),
            Err(PricingError::Validation(_))
        ));
        assert!(matches!(
            engine.compute_totals(&cart(Amount::MAX, 2), None, EmptyCartPolicy::Reject),
            Err(PricingError::Validation(_))
        ));
        let nan = Coupon::percent(f64::NAN);
        assert!(matches!(
            engine.compute_totals(&cart(10, 1), Some(&nan), EmptyCartPolicy::Reject),
            Err(PricingError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_grand_total_overflow() {
        // Subtotal fits, but adding tax does not.
        let result = engine().compute_totals(
            &cart(8_000_000_000_000_000_000, 1),
            None,
            EmptyCartPolicy::Reject,
        );
        assert_eq!(
            result,
            Err(PricingError::Validation("grand total overflows".into()))
        );
    }

    #[test]
    fn test_empty_cart_policy() {
        let engine = engine();
        assert_eq!(
            engine.compute_totals(&[], None, EmptyCartPolicy::Reject),
            Err(PricingError::EmptyCart)
        );
        let zero = engine.compute_totals(&[], None, EmptyCartPolicy::Allow).unwrap();
        assert_eq!(zero, Totals::default());
    }
}
