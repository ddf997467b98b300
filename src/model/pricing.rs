use serde::{Deserialize, Serialize};

/// Money in whole currency units.
pub type Amount = i64;

/// Kind of discount a coupon grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponKind {
    Percent,
    Fixed,
}

/// A discount applied once at checkout. Only its effect survives, in
/// [`Totals::discount`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    #[serde(rename = "type")]
    pub kind: CouponKind,
    pub amount: f64,
}

impl Coupon {
    pub fn percent(amount: f64) -> Self {
        Self {
            kind: CouponKind::Percent,
            amount,
        }
    }

    pub fn fixed(amount: Amount) -> Self {
        Self {
            kind: CouponKind::Fixed,
            amount: amount as f64,
        }
    }
}

/// Price breakdown charged for an order, frozen when the order is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Amount,
    pub discount: Amount,
    pub tax: Amount,
    pub delivery_fee: Amount,
    pub grand_total: Amount,
}

impl Totals {
    /// Amount the tax is levied on.
    pub fn taxable(&self) -> Amount {
        self.subtotal - self.discount
    }
}
