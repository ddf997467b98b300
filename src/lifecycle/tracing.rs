//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing_subscriber` formatter driven by
//! `RUST_LOG`. Module paths are hidden (`with_target(false)`); the actor logs
//! carry `entity_type` and `shard` fields instead.
//!
//! ```bash
//! RUST_LOG=info cargo run      # lifecycle and committed changes
//! RUST_LOG=debug cargo run     # request payloads, reads, published events
//! ```
//!
//! With `RUST_LOG=info` a checkout followed by an admin advance reads roughly:
//!
//! ```text
//! INFO place_order: Created entity_type="Order" shard=2
//! INFO place_order: Order placed id=7c1e.. grand_total=2439
//! INFO tracking: Tracking started
//! INFO change_status: Status change committed id=7c1e.. status=Packed
//! INFO tracking: Tracked status changed id=7c1e.. from=Placed to=Packed
//! ```
//!
//! Failed polls are `WARN` and keep the last good snapshot on screen.

/// Initializes the global subscriber. Call once, from the binary.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
