use chrono::Utc;
use order_tracking::admin::AdminConsole;
use order_tracking::clients::OrderClient;
use order_tracking::framework::mock::{create_mock_client, expect_create, MockClient};
use order_tracking::framework::{FrameworkError, ResourceRequest};
use order_tracking::lifecycle::config::{AdminConfig, TrackingConfig};
use order_tracking::model::{
    CheckoutRequest, LineItem, Order, OrderId, OrderStatus, Role, ShippingInfo, Totals,
};
use order_tracking::order_actor::{OrderError, TransitionOutcome};
use order_tracking::tracking::{MemoryCache, TrackingState, TrackingSynchronizer};
use std::sync::Arc;

fn shipping() -> ShippingInfo {
    ShippingInfo {
        full_name: "Asha Rao".to_string(),
        phone: "9876543210".to_string(),
        address: "12 MG Road".to_string(),
        city: "Pune".to_string(),
        state: "MH".to_string(),
        pincode: "411001".to_string(),
    }
}

fn order(id: OrderId, status: OrderStatus) -> Order {
    let now = Utc::now();
    Order {
        id,
        line_items: vec![LineItem::new("sku-1", "Desk Lamp", 1000, 2)],
        shipping: shipping(),
        pricing: Totals::default(),
        status,
        created_at: now,
        status_updated_at: now,
    }
}

/// Tracking view over a scripted store: the network fails on the 2nd and 3rd
/// polls. The view keeps showing the last good status without alerting, and the
/// 4th poll brings it up to date with exactly one alert.
///
/// Pattern: synchronizer + `OrderClient` over a `MockClient`
#[tokio::test]
async fn test_tracking_keeps_last_good_status_through_network_loss() {
    let id = OrderId::new();
    let mut mock = MockClient::<Order>::new(OrderId::new);
    mock.expect_get(id).return_ok(Some(order(id, OrderStatus::Shipped)));
    mock.expect_get(id).return_err(FrameworkError::ActorClosed);
    mock.expect_get(id).return_err(FrameworkError::ActorDropped);
    mock.expect_get(id).return_ok(Some(order(id, OrderStatus::OutForDelivery)));

    let client = OrderClient::new(mock.client());
    let mut tracker = TrackingSynchronizer::new(
        id,
        Arc::new(client),
        Arc::new(MemoryCache::new()),
        &TrackingConfig::default(),
    );
    let mut changes = tracker.subscribe_changes();

    assert!(matches!(tracker.poll_once().await, TrackingState::Live { .. }));
    for _ in 0..2 {
        let state = tracker.poll_once().await;
        assert!(matches!(state, TrackingState::Cached { .. }));
        assert_eq!(state.status(), Some(OrderStatus::Shipped));
        assert!(changes.try_recv().is_err());
    }

    let state = tracker.poll_once().await;
    assert!(matches!(state, TrackingState::Live { .. }));
    assert_eq!(state.status(), Some(OrderStatus::OutForDelivery));
    let change = changes.try_recv().unwrap();
    assert_eq!((change.from, change.to), (OrderStatus::Shipped, OrderStatus::OutForDelivery));
    assert!(changes.try_recv().is_err());

    mock.verify();
}

/// The store rejects an admin advance: the optimistic row change is undone and
/// the store's reason reaches the operator intact.
#[tokio::test]
async fn test_admin_rollback_surfaces_store_reason() {
    let id = OrderId::new();
    let mut mock = MockClient::<Order>::new(OrderId::new);
    mock.expect_list().return_ok(vec![order(id, OrderStatus::Shipped)]);
    mock.expect_action(id)
        .return_err(FrameworkError::EntityError(Box::new(OrderError::PermissionDenied(
            "session expired".to_string(),
        ))));
    mock.expect_list().return_ok(vec![order(id, OrderStatus::Shipped)]);

    let admin = AdminConsole::new(
        OrderClient::new(mock.client()),
        Role::Admin,
        &AdminConfig::default(),
    );
    admin.refresh().await.unwrap();

    let err = admin.advance(id).await.unwrap_err();
    assert_eq!(
        err.reason(),
        &OrderError::PermissionDenied("session expired".to_string())
    );
    let view = admin.view();
    assert_eq!(view.row(id).unwrap().summary.status, OrderStatus::Shipped);
    assert_eq!(view.last_error, Some(err));

    admin.refresh().await.unwrap();
    assert_eq!(admin.view().row(id).unwrap().pending, None);

    mock.verify();
}

#[tokio::test]
async fn test_admin_commit_replaces_row_with_store_order() {
    let id = OrderId::new();
    let stored = order(id, OrderStatus::OutForDelivery);
    let mut mock = MockClient::<Order>::new(OrderId::new);
    mock.expect_list().return_ok(vec![order(id, OrderStatus::Shipped)]);
    mock.expect_action(id).return_ok(TransitionOutcome {
        order: stored.clone(),
        changed: true,
    });

    let admin = AdminConsole::new(
        OrderClient::new(mock.client()),
        Role::Admin,
        &AdminConfig::default(),
    );
    admin.refresh().await.unwrap();
    admin.advance(id).await.unwrap();

    let view = admin.view();
    assert_eq!(view.row(id).unwrap().summary, stored.summary());
    assert_eq!(view.last_error, None);
    mock.verify();
}

/// Checkout with a dedup key creates under the key's id, with the pricing
/// snapshot computed before the store sees the request.
#[tokio::test]
async fn test_checkout_sends_priced_create_under_dedup_id() {
    let (client, mut receiver) = create_mock_client::<Order>(8, OrderId::new);
    let client = OrderClient::new(client);

    let checkout = tokio::spawn(async move {
        client
            .place_order(CheckoutRequest {
                line_items: vec![LineItem::new("sku-1", "Desk Lamp", 1000, 2)],
                shipping: shipping(),
                dedup_key: Some("cart-7".to_string()),
                ..Default::default()
            })
            .await
    });

    let (id, params, respond_to) = expect_create(&mut receiver).await.unwrap();
    assert_eq!(id, OrderId::from_dedup_key("cart-7"));
    assert_eq!(params.pricing.grand_total, 2439);
    respond_to.send(Ok(id)).unwrap();

    match receiver.recv().await {
        Some(ResourceRequest::Get {
            id: requested,
            respond_to,
        }) => {
            assert_eq!(requested, id);
            respond_to.send(Ok(Some(order(id, OrderStatus::Placed)))).unwrap();
        }
        other => panic!("expected get request, got {other:?}"),
    }

    let placed = checkout.await.unwrap().unwrap();
    assert_eq!(placed.id, id);
}

#[tokio::test]
async fn test_unreachable_store_is_network_failure() {
    let id = OrderId::new();
    let mut mock = MockClient::<Order>::new(OrderId::new);
    mock.expect_action(id).return_err(FrameworkError::ActorClosed);

    let client = OrderClient::new(mock.client());
    let err = client.advance(id, Role::Admin).await.unwrap_err();
    assert!(matches!(err, OrderError::NetworkFailure(_)));
    assert!(err.is_transient());
    mock.verify();
}
