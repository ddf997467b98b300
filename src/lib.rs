//! # Order Tracking
//!
//! > **Order lifecycle and delivery tracking on resource-oriented actors.**
//!
//! This crate is the core behind a storefront's checkout, "track my order" page
//! and admin order screen. One authoritative record per order lives in a sharded
//! actor store; customer tracking views and admin sessions poll and mutate it
//! independently.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### One writer per order
//! Every order id hashes to one shard actor. The shard applies requests for its
//! orders one at a time, so a status transition is always checked against the
//! status it replaces. Different shards run in parallel.
//!
//! ### Status moves one step at a time
//! ```text
//! Placed -> Packed -> Shipped -> Out for Delivery -> Delivered
//! ```
//! Admins advance or retreat exactly one step. Customers cannot change status.
//! Stepping past either end is a no-op, never an error.
//!
//! ### Readers never block writers
//! Tracking views fall back to their last good snapshot when the store is
//! unreachable and try again on the next poll. Admin sessions show a change at
//! once and roll it back if the store refuses.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! The generic `ResourceActor<T>` with Create / Get / List / Action requests and
//! id-hash sharding.
//! - **Key items**: [`ActorEntity`](framework::ActorEntity), [`ResourceActor`](framework::ResourceActor), [`MockClient`](framework::mock::MockClient).
//!
//! ### 2. The Domain ([`model`], [`pricing`], [`order_actor`])
//! Plain order data, the pricing engine, and the state machine the store enforces.
//! - **Key items**: [`Order`](model::Order), [`PricingEngine`](pricing::PricingEngine), [`OrderAction`](order_actor::OrderAction), [`StatusChanged`](order_actor::StatusChanged).
//!
//! ### 3. The Interface ([`clients`])
//! [`OrderClient`](clients::OrderClient) is the store as callers see it: checkout,
//! reads, status changes, paginated listings.
//!
//! ### 4. The Views ([`tracking`], [`admin`])
//! - [`TrackingSynchronizer`](tracking::TrackingSynchronizer): polling, cache fallback, change alerts.
//! - [`AdminConsole`](admin::AdminConsole): filtered pages, optimistic advance/retreat, auto-refresh.
//!
//! ### 5. The Orchestrator ([`lifecycle`])
//! [`OrderSystem`](lifecycle::OrderSystem) spawns the shards from a
//! [`SystemConfig`](lifecycle::SystemConfig) and shuts them down.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ORDER_TRACKING_CONFIG=config.yaml RUST_LOG=debug cargo run
//! ```

pub mod admin;
pub mod clients;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod pricing;
pub mod tracking;
