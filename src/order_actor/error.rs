//! Error types for the Order actor.

use crate::model::OrderStatus;
use crate::pricing::PricingError;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The order data provided is invalid.
    #[error("Order validation error: {0}")]
    Validation(String),

    /// Checkout was attempted with no line items.
    #[error("Cart is empty")]
    EmptyCart,

    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The requested status is not exactly one step away from the current one.
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The caller may not change order status.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A transient transport failure. Safe to retry later.
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl OrderError {
    /// Whether the failure is transient rather than a rejection of the request.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            OrderError::NetworkFailure(_) | OrderError::ActorCommunicationError(_)
        )
    }
}

impl From<PricingError> for OrderError {
    fn from(e: PricingError) -> Self {
        match e {
            PricingError::Validation(msg) => OrderError::Validation(msg),
            PricingError::EmptyCart => OrderError::EmptyCart,
        }
    }
}

impl From<String> for OrderError {
    fn from(msg: String) -> Self {
        OrderError::ActorCommunicationError(msg)
    }
}
