use super::config::SystemConfig;
use crate::admin::AdminConsole;
use crate::clients::OrderClient;
use crate::model::{OrderId, Role};
use crate::order_actor::{OrderContext, StatusEvents};
use crate::pricing::PricingEngine;
use crate::tracking::{FileCache, MemoryCache, SnapshotCache, TrackingSynchronizer};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The runtime orchestrator for the order lifecycle.
///
/// Owns the store's shard actors and the one [`OrderClient`] everything else
/// clones. Tracking views and admin sessions are created from here so they all
/// read and write the same store.
///
/// # Example
///
/// ```ignore
/// let system = OrderSystem::new(SystemConfig::default());
/// let order = system.order_client.place_order(checkout).await?;
///
/// let tracker = system.tracker(order.id).spawn();
/// let admin = system.admin_console(Role::Admin);
/// admin.refresh().await?;
/// admin.advance(order.id).await?;
///
/// tracker.stop().await;
/// system.shutdown().await?;
/// ```
pub struct OrderSystem {
    /// Client for the order store, with configured pricing and coupons.
    pub order_client: OrderClient,

    /// Every transition the store applies is published here.
    pub events: StatusEvents,

    config: SystemConfig,
    snapshots: Arc<dyn SnapshotCache>,
    handles: Vec<JoinHandle<()>>,
}

impl OrderSystem {
    /// Spawns one actor per configured shard and wires the clients.
    pub fn new(config: SystemConfig) -> Self {
        let events = StatusEvents::default();
        let (actors, client) =
            crate::order_actor::new(config.store.shards, config.store.buffer_size);

        let context = OrderContext {
            events: events.clone(),
        };
        let handles = actors
            .into_iter()
            .map(|actor| tokio::spawn(actor.run(context.clone())))
            .collect::<Vec<_>>();
        info!(shards = handles.len(), "Order store started");

        let order_client = OrderClient::new(client).with_pricing(
            PricingEngine::new(config.pricing.clone()),
            config.coupons.book(),
        );

        let snapshots: Arc<dyn SnapshotCache> = match &config.tracking.cache_dir {
            Some(dir) => Arc::new(FileCache::new(dir)),
            None => Arc::new(MemoryCache::new()),
        };

        Self {
            order_client,
            events,
            config,
            snapshots,
            handles,
        }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// A tracking view for `id`, sharing the system's snapshot cache.
    pub fn tracker(&self, id: OrderId) -> TrackingSynchronizer {
        TrackingSynchronizer::new(
            id,
            Arc::new(self.order_client.clone()),
            self.snapshots.clone(),
            &self.config.tracking,
        )
    }

    /// A fresh admin session acting as `role`.
    pub fn admin_console(&self, role: Role) -> AdminConsole {
        AdminConsole::new(self.order_client.clone(), role, &self.config.admin)
    }

    /// Closes the store and waits for every shard to exit.
    ///
    /// Tracking loops and admin sessions hold client clones, so stop them first
    /// or this waits for them to be dropped.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        info!("Shutting down order system...");
        drop(self.order_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Shard task failed");
                anyhow::bail!("shard task failed: {e}");
            }
        }

        info!("Order system shutdown complete.");
        Ok(())
    }
}
