//! Order-specific resource logic: entity implementation, status state machine,
//! status events and errors.

pub mod entity;
pub mod error;
pub mod events;
pub mod transitions;

pub use entity::OrderContext;
pub use error::*;
pub use events::{StatusChanged, StatusEvents};
pub use transitions::{Direction, OrderAction, TransitionOutcome};

use crate::framework::ResourceActor;
use crate::model::{Order, OrderId};

/// Creates the sharded Order actors and the generic client routing to them.
pub fn new(
    shards: usize,
    buffer_size: usize,
) -> (Vec<ResourceActor<Order>>, crate::framework::ResourceClient<Order>) {
    ResourceActor::sharded(shards, buffer_size, OrderId::new)
}
