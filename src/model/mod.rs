//! Pure data structures shared by the store, the tracking view and the admin view.
//!
//! [`Order`] implements the [`ActorEntity`](crate::framework::ActorEntity) trait
//! (see [`crate::order_actor`]); everything else here is plain data.

pub mod order;
pub mod pricing;
pub mod query;
pub mod status;

pub use order::*;
pub use pricing::*;
pub use query::*;
pub use status::*;
