use crate::model::{Order, OrderStatus, OrderSummary};
use serde::{Deserialize, Serialize};

/// Listing criteria. Both parts must hold for an order to match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderFilter {
    /// Exact status match.
    pub status: Option<OrderStatus>,
    /// Case-insensitive substring of the order id, customer name or phone.
    pub query: Option<String>,
}

impl OrderFilter {
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        if self.status.is_some_and(|status| status != order.status) {
            return false;
        }
        let needle = match self.query.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => q.to_lowercase(),
            _ => return true,
        };
        order.id.to_string().contains(&needle)
            || order.shipping.full_name.to_lowercase().contains(&needle)
            || order.shipping.phone.to_lowercase().contains(&needle)
    }
}

/// A 1-based page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    /// Page 0 is read as page 1, a zero page size as 1.
    fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.max(1),
        }
    }
}

/// One page of order summaries plus the size of the whole filtered listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPage {
    pub items: Vec<OrderSummary>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl OrderPage {
    /// Cuts the requested page out of an already sorted listing.
    pub fn from_sorted(orders: &[Order], request: PageRequest) -> Self {
        let PageRequest { page, page_size } = request.normalized();
        let items = orders
            .iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .map(Order::summary)
            .collect();
        Self {
            items,
            total: orders.len(),
            page,
            page_size,
        }
    }

    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size.max(1))
    }
}
