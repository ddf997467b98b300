//! Customer-facing delivery tracking.
//!
//! A [`TrackingSynchronizer`] polls the order store for one order, keeps a
//! last-known-good snapshot in a [`SnapshotCache`], and publishes what the
//! view should show through a watch channel. Transitions observed between two
//! successful fetches are announced once each on a broadcast channel.
//!
//! ```text
//!   Loading ──fetch ok──▶ Live ──fetch err──▶ Cached(stale)
//!      │                   ▲                      │
//!      │                   └──────fetch ok────────┘
//!      ├──fetch err, no snapshot──▶ Unavailable
//!      └──not found, no snapshot──▶ Missing (polling stops)
//! ```

pub mod cache;
pub mod signals;
pub mod source;
pub mod synchronizer;

pub use cache::{CacheError, CachedSnapshot, FileCache, MemoryCache, SnapshotCache};
pub use signals::{EtaBucket, Signals, StopsAway};
pub use source::{FetchError, OrderSource};
pub use synchronizer::{TrackingHandle, TrackingState, TrackingSynchronizer};
