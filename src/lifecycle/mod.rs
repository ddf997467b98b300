//! # System Lifecycle & Orchestration
//!
//! Starting, wiring and stopping the order system.
//!
//! [`OrderSystem`] spawns the store's shard actors with their shared
//! [`OrderContext`](crate::order_actor::OrderContext) (the status event bus),
//! builds the [`OrderClient`](crate::clients::OrderClient) with configured pricing
//! and coupons, and hands out tracking views and admin sessions bound to that
//! client.
//!
//! ## Graceful Shutdown
//!
//! 1. Stop every tracking and admin refresh loop (their handles own client clones).
//! 2. [`OrderSystem::shutdown`] drops the system's client, closing the shard channels.
//! 3. Each shard actor sees `recv()` return `None` and exits.
//! 4. Shutdown awaits every shard task.
//!
//! ## Configuration
//!
//! [`SystemConfig`] is read from YAML. Every key is optional; see [`config`] for
//! the defaults.

pub mod config;
pub mod order_system;
pub mod tracing;

pub use self::config::{SystemConfig, CONFIG_ENV};
pub use self::order_system::*;
pub use self::tracing::*;
