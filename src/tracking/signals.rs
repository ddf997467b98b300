//! Presentation signals derived from status. Never persisted.

use crate::model::OrderStatus;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Coarse delivery estimate shown next to the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EtaBucket {
    Calculating,
    Tomorrow,
    ArrivingToday,
    Delivered,
}

impl EtaBucket {
    pub fn for_status(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Placed | OrderStatus::Packed => EtaBucket::Calculating,
            OrderStatus::Shipped => EtaBucket::Tomorrow,
            OrderStatus::OutForDelivery => EtaBucket::ArrivingToday,
            OrderStatus::Delivered => EtaBucket::Delivered,
        }
    }
}

impl Display for EtaBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EtaBucket::Calculating => "Calculating",
            EtaBucket::Tomorrow => "Tomorrow",
            EtaBucket::ArrivingToday => "Arriving Today",
            EtaBucket::Delivered => "Delivered",
        })
    }
}

/// "N stops away" countdown while the order is out for delivery.
///
/// Starts at `initial` on the first out-for-delivery observation and drops by
/// one on each later one, bottoming out at 0. The count never goes back up,
/// not even if an admin steps the order back and out again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopsAway {
    initial: u32,
    remaining: Option<u32>,
}

impl StopsAway {
    pub fn new(initial: u32) -> Self {
        Self {
            initial,
            remaining: None,
        }
    }

    /// Feeds a freshly fetched status; returns the count to display, if any.
    pub fn observe(&mut self, status: OrderStatus) -> Option<u32> {
        match status {
            OrderStatus::OutForDelivery => {
                let next = match self.remaining {
                    None => self.initial,
                    Some(n) => n.saturating_sub(1),
                };
                self.remaining = Some(next);
                Some(next)
            }
            OrderStatus::Delivered => {
                self.remaining = Some(0);
                None
            }
            _ => None,
        }
    }

    /// The count for `status` without advancing it (used for cached displays).
    pub fn current(&self, status: OrderStatus) -> Option<u32> {
        match status {
            OrderStatus::OutForDelivery => Some(self.remaining.unwrap_or(self.initial)),
            _ => None,
        }
    }
}

/// Everything the view derives from a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signals {
    pub eta: EtaBucket,
    pub stops_away: Option<u32>,
}
