//! Coupon codes accepted at checkout.

use super::PricingError;
use crate::model::Coupon;
use std::collections::HashMap;

/// Lookup table from coupon code to discount. Codes are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct CouponBook {
    coupons: HashMap<String, Coupon>,
}

impl CouponBook {
    pub fn new(coupons: impl IntoIterator<Item = (String, Coupon)>) -> Self {
        Self {
            coupons: coupons
                .into_iter()
                .map(|(code, coupon)| (code.trim().to_uppercase(), coupon))
                .collect(),
        }
    }

    pub fn get(&self, code: &str) -> Option<&Coupon> {
        self.coupons.get(&code.trim().to_uppercase())
    }

    /// Resolves an optional code from a checkout request. A blank code means
    /// no coupon; an unknown code is rejected rather than ignored.
    pub fn resolve(&self, code: Option<&str>) -> Result<Option<Coupon>, PricingError> {
        match code.map(str::trim) {
            None | Some("") => Ok(None),
            Some(code) => self
                .get(code)
                .copied()
                .map(Some)
                .ok_or_else(|| PricingError::Validation(format!("unknown coupon code {code}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let book = CouponBook::new([("save10".to_string(), Coupon::percent(10.0))]);
        assert_eq!(book.resolve(None), Ok(None));
        assert_eq!(book.resolve(Some("  ")), Ok(None));
        assert_eq!(book.resolve(Some("SAVE10")), Ok(Some(Coupon::percent(10.0))));
        assert_eq!(book.resolve(Some(" Save10 ")), Ok(Some(Coupon::percent(10.0))));
        assert!(matches!(book.resolve(Some("BOGUS")), Err(PricingError::Validation(_))));
    }
}
