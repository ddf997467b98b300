//! Status state machine.
//!
//! ```text
//! Placed <-> Packed <-> Shipped <-> OutForDelivery <-> Delivered
//! ```
//!
//! Status moves one step at a time. Forward is normal progress, backward is an
//! administrative correction. Only [`Role::Admin`] may move it at all.

use super::error::OrderError;
use crate::model::{Order, OrderStatus, Role};
use serde::{Deserialize, Serialize};

/// Direction of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

/// Custom actions for Order entities.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// One step forward. No-op once delivered.
    Advance { role: Role },
    /// One step back. No-op while placed.
    Retreat { role: Role },
    /// Move to `status`, which must be adjacent to the current status.
    SetStatus { role: Role, status: OrderStatus },
}

impl OrderAction {
    pub fn step(role: Role, direction: Direction) -> Self {
        match direction {
            Direction::Forward => OrderAction::Advance { role },
            Direction::Backward => OrderAction::Retreat { role },
        }
    }

    pub fn role(&self) -> Role {
        match self {
            OrderAction::Advance { role }
            | OrderAction::Retreat { role }
            | OrderAction::SetStatus { role, .. } => *role,
        }
    }
}

/// Result of an order action: the order after the action, and whether its status moved.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    pub order: Order,
    pub changed: bool,
}

pub fn authorize(role: Role) -> Result<(), OrderError> {
    match role {
        Role::Admin => Ok(()),
        Role::Customer => Err(OrderError::PermissionDenied(
            "only admins may change order status".into(),
        )),
    }
}

/// The status one step from `current`, `None` at the boundary.
pub fn step(current: OrderStatus, direction: Direction) -> Option<OrderStatus> {
    match direction {
        Direction::Forward => current.next(),
        Direction::Backward => current.prev(),
    }
}

/// Accepts `target` only if it is exactly one step from `current`.
pub fn check_adjacent(current: OrderStatus, target: OrderStatus) -> Result<(), OrderError> {
    if current.is_adjacent(target) {
        Ok(())
    } else {
        Err(OrderError::InvalidTransition {
            from: current,
            to: target,
        })
    }
}

/// Resolves an action to the status it would move to, without touching the order.
/// `Ok(None)` is a boundary no-op.
pub fn resolve(
    current: OrderStatus,
    action: &OrderAction,
) -> Result<Option<OrderStatus>, OrderError> {
    authorize(action.role())?;
    match action {
        OrderAction::Advance { .. } => Ok(step(current, Direction::Forward)),
        OrderAction::Retreat { .. } => Ok(step(current, Direction::Backward)),
        OrderAction::SetStatus { status, .. } => {
            check_adjacent(current, *status)?;
            Ok(Some(*status))
        }
    }
}
