use crate::model::OrderId;
use crate::order_actor::OrderError;
use thiserror::Error;

/// Failures surfaced to the admin operator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AdminError {
    /// The store refused a status change. Any optimistic row change was undone.
    #[error("Status change for order {id} rejected: {reason}")]
    Rejected { id: OrderId, reason: OrderError },

    /// The listing could not be fetched. The previous rows stay on display.
    #[error("Refresh failed: {0}")]
    Refresh(OrderError),
}

impl AdminError {
    /// The underlying store error.
    pub fn reason(&self) -> &OrderError {
        match self {
            AdminError::Rejected { reason, .. } | AdminError::Refresh(reason) => reason,
        }
    }
}
