//! Represents a placed customer order.
//!
//! # Actor Framework
//! [`Order`] implements the [`ActorEntity`](crate::framework::ActorEntity) trait
//! in [`crate::order_actor::entity`], which is where creation, listing and
//! status transitions are handled.
use crate::model::{Amount, OrderStatus, Totals};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Namespace for ids derived from checkout dedup keys.
const DEDUP_NAMESPACE: Uuid = Uuid::from_u128(0x6f72_6465_722d_7472_6163_6b69_6e67_0001);

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub Uuid);

impl OrderId {
    /// A fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The id a checkout with this dedup key always maps to.
    pub fn from_dedup_key(key: &str) -> Self {
        Self(Uuid::new_v5(&DEDUP_NAMESPACE, key.as_bytes()))
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrderId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// One product line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub title: String,
    pub unit_price: Amount,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(
        product_id: impl Into<String>,
        title: impl Into<String>,
        unit_price: Amount,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            title: title.into(),
            unit_price,
            quantity,
        }
    }
}

/// Where an order is delivered. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl ShippingInfo {
    /// Names of the fields that are empty after trimming.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("full_name", &self.full_name),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("pincode", &self.pincode),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Who issues a request against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Customer,
}

/// The authoritative order record.
///
/// Line items, shipping and pricing are fixed at creation. Only `status` and
/// `status_updated_at` change afterwards, and only through status transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub line_items: Vec<LineItem>,
    pub shipping: ShippingInfo,
    pub pricing: Totals,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub status_updated_at: DateTime<Utc>,
}

impl Order {
    /// Row shown in the admin listing.
    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            id: self.id,
            customer_name: self.shipping.full_name.clone(),
            phone: self.shipping.phone.clone(),
            status: self.status,
            grand_total: self.pricing.grand_total,
            item_count: self.line_items.iter().map(|item| item.quantity).sum(),
            created_at: self.created_at,
        }
    }
}

/// Payload for creating a new order. The pricing snapshot is computed at checkout.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub line_items: Vec<LineItem>,
    pub shipping: ShippingInfo,
    pub pricing: Totals,
}

/// Compact view of an order for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub customer_name: String,
    pub phone: String,
    pub status: OrderStatus,
    pub grand_total: Amount,
    pub item_count: u32,
    pub created_at: DateTime<Utc>,
}

/// Everything the storefront submits when the customer confirms checkout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub line_items: Vec<LineItem>,
    pub shipping: ShippingInfo,
    #[serde(default)]
    pub coupon_code: Option<String>,
    /// Repeating a checkout with the same key yields the same order.
    #[serde(default)]
    pub dedup_key: Option<String>,
    /// Price an empty cart as a zero-value order instead of rejecting it.
    #[serde(default)]
    pub allow_empty_cart: bool,
}
