//! # Order Tracking Demo
//!
//! Walks one order through the system:
//! 1. Loading [`SystemConfig`] (from `ORDER_TRACKING_CONFIG` if set) and starting the [`OrderSystem`].
//! 2. Checking out a cart with a coupon code.
//! 3. Tracking the order while an admin session advances it.
//! 4. Shutting everything down.

use order_tracking::lifecycle::{setup_tracing, OrderSystem, SystemConfig};
use order_tracking::model::{CheckoutRequest, LineItem, Role, ShippingInfo};
use std::time::Duration;
use tracing::{error, info, warn, Instrument};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    let mut config = SystemConfig::from_env()?;
    // Short intervals so the demo finishes quickly.
    config.tracking.poll_interval_ms = 200;
    config.admin.refresh_interval_ms = 500;

    info!("Starting order tracking demo");
    let system = OrderSystem::new(config);

    let checkout = CheckoutRequest {
        line_items: vec![
            LineItem::new("kettle-01", "Electric Kettle", 1299, 1),
            LineItem::new("mug-02", "Ceramic Mug", 349, 2),
        ],
        shipping: ShippingInfo {
            full_name: "Asha Rao".to_string(),
            phone: "9876543210".to_string(),
            address: "12 MG Road".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            pincode: "411001".to_string(),
        },
        coupon_code: Some("SAVE10".to_string()),
        dedup_key: Some("demo-checkout-1".to_string()),
        allow_empty_cart: false,
    };

    let order = system
        .order_client
        .place_order(checkout)
        .instrument(tracing::info_span!("checkout"))
        .await?;
    info!(id = %order.id, totals = ?order.pricing, "Checkout complete");

    let tracker = system.tracker(order.id).spawn();
    let mut alerts = tracker.subscribe_changes();

    let admin = system.admin_console(Role::Admin);
    let refresh = admin.spawn_auto_refresh();
    admin.refresh().await?;

    for _ in 0..3 {
        match admin.advance(order.id).await {
            Ok(outcome) => info!(status = %outcome.order.status, "Admin advanced order"),
            Err(e) => error!(error = %e, "Admin advance failed"),
        }
        match tokio::time::timeout(Duration::from_secs(2), alerts.recv()).await {
            Ok(Ok(change)) => info!(from = %change.from, to = %change.to, "Customer alerted"),
            Ok(Err(e)) => warn!(error = %e, "Alert stream ended"),
            Err(_) => warn!("No alert within two seconds"),
        }
    }

    let state = tracker.state();
    info!(status = ?state.status(), signals = ?state.signals(), "Tracking view");

    tracker.stop().await;
    if let Some(refresh) = refresh {
        refresh.stop().await;
    }
    drop(admin);

    system.shutdown().await?;
    info!("Demo completed successfully");
    Ok(())
}
