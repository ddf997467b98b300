//! ActorEntity trait implementation for the Order domain type.
//!
//! This module contains the [`ActorEntity`] implementation that lets [`Order`]
//! be managed by the generic [`crate::framework::ResourceActor`]. The shard
//! owning an order applies its transitions one at a time, so a transition is
//! always validated against the status it actually replaces.

use super::error::OrderError;
use super::events::{StatusChanged, StatusEvents};
use super::transitions::{self, OrderAction, TransitionOutcome};
use crate::framework::ActorEntity;
use crate::model::{Order, OrderCreate, OrderFilter, OrderId, OrderStatus};
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use tracing::info;

/// Dependencies of the order actor.
#[derive(Debug, Clone, Default)]
pub struct OrderContext {
    pub events: StatusEvents,
}

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Action = OrderAction;
    type ActionResult = TransitionOutcome;
    type Filter = OrderFilter;
    type Context = OrderContext;
    type Error = OrderError;

    /// Builds a `Placed` order around the pricing snapshot computed at checkout.
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        let missing = params.shipping.missing_fields();
        if !missing.is_empty() {
            return Err(OrderError::Validation(format!(
                "missing shipping fields: {}",
                missing.join(", ")
            )));
        }
        if let Some(item) = params.line_items.iter().find(|item| item.quantity == 0) {
            return Err(OrderError::Validation(format!(
                "quantity must be at least 1 for product {}",
                item.product_id
            )));
        }
        if params.pricing.grand_total < 0 {
            return Err(OrderError::Validation("grand total is negative".into()));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            line_items: params.line_items,
            shipping: params.shipping,
            pricing: params.pricing,
            status: OrderStatus::Placed,
            created_at: now,
            status_updated_at: now,
        })
    }

    fn matches(&self, filter: &OrderFilter) -> bool {
        filter.matches(self)
    }

    /// Newest first; id breaks ties so shard results merge deterministically.
    fn list_order(&self, other: &Self) -> Ordering {
        other
            .created_at
            .cmp(&self.created_at)
            .then_with(|| other.id.cmp(&self.id))
    }

    /// Applies a status transition.
    ///
    /// # Actions
    /// - `Advance` / `Retreat`: one step, silently unchanged at the boundary
    /// - `SetStatus`: adjacency-checked, `InvalidTransition` otherwise
    ///
    /// Non-admin callers get `PermissionDenied`. Every applied transition
    /// refreshes `status_updated_at` and publishes a [`StatusChanged`].
    async fn handle_action(
        &mut self,
        action: OrderAction,
        ctx: &OrderContext,
    ) -> Result<TransitionOutcome, OrderError> {
        let Some(to) = transitions::resolve(self.status, &action)? else {
            info!(
                id = %self.id,
                status = %self.status,
                ?action,
                "Transition is a no-op at boundary"
            );
            return Ok(TransitionOutcome {
                order: self.clone(),
                changed: false,
            });
        };

        let from = self.status;
        let at = Utc::now();
        self.status = to;
        self.status_updated_at = at;
        info!(id = %self.id, %from, %to, "Status changed");

        ctx.events.publish(StatusChanged {
            id: self.id,
            from,
            to,
            at,
        });
        Ok(TransitionOutcome {
            order: self.clone(),
            changed: true,
        })
    }
}
