use crate::clients::OrderClient;
use crate::model::{Order, OrderId};
use crate::order_actor::OrderError;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Why a tracking fetch produced no order.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    /// The store does not know the order. Not retried.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// Transient failure; the next poll tries again.
    #[error("Network failure: {0}")]
    Network(String),

    /// The fetch did not complete within the window.
    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),
}

impl From<OrderError> for FetchError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NotFound(id) => FetchError::NotFound(id),
            other => FetchError::Network(other.to_string()),
        }
    }
}

/// Where a tracking view reads the authoritative order from.
#[async_trait]
pub trait OrderSource: Send + Sync + 'static {
    async fn fetch(&self, id: OrderId) -> Result<Order, FetchError>;
}

#[async_trait]
impl OrderSource for OrderClient {
    async fn fetch(&self, id: OrderId) -> Result<Order, FetchError> {
        Ok(self.get_order(id).await?)
    }
}
