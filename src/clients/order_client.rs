//! # Order Client
//!
//! The Order Record Store as the rest of the system sees it. Wraps the sharded
//! `ResourceClient<Order>` and adds checkout (pricing + validation before any
//! order exists), status changes and paginated listings.
use crate::clients::actor_client::ActorClient;
use crate::framework::{FrameworkError, ResourceClient};
use crate::lifecycle::config::PricingConfig;
use crate::model::{
    CheckoutRequest, Order, OrderCreate, OrderFilter, OrderId, OrderPage, OrderStatus,
    PageRequest, Role,
};
use crate::order_actor::{transitions, Direction, OrderAction, OrderError, TransitionOutcome};
use crate::pricing::{CouponBook, EmptyCartPolicy, PricingEngine};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Client for interacting with the Order actors.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    pricing: PricingEngine,
    coupons: CouponBook,
}

impl OrderClient {
    /// A client pricing with the reference rates and no coupon codes.
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self {
            inner,
            pricing: PricingEngine::new(PricingConfig::default()),
            coupons: CouponBook::default(),
        }
    }

    pub fn with_pricing(mut self, pricing: PricingEngine, coupons: CouponBook) -> Self {
        self.pricing = pricing;
        self.coupons = coupons;
        self
    }

    /// Validates and prices a checkout, then persists the order.
    ///
    /// Pricing and shipping problems are rejected here, before an order exists.
    /// With a dedup key, a repeated checkout returns the order created first.
    #[instrument(skip(self, request), fields(items = request.line_items.len()))]
    pub async fn place_order(&self, request: CheckoutRequest) -> Result<Order, OrderError> {
        debug!(?request, "place_order called");

        let missing = request.shipping.missing_fields();
        if !missing.is_empty() {
            return Err(OrderError::Validation(format!(
                "missing shipping fields: {}",
                missing.join(", ")
            )));
        }
        let coupon = self.coupons.resolve(request.coupon_code.as_deref())?;
        let policy = if request.allow_empty_cart {
            EmptyCartPolicy::Allow
        } else {
            EmptyCartPolicy::Reject
        };
        let pricing = self
            .pricing
            .compute_totals(&request.line_items, coupon.as_ref(), policy)?;

        let params = OrderCreate {
            line_items: request.line_items,
            shipping: request.shipping,
            pricing,
        };
        let id = match request.dedup_key.as_deref() {
            Some(key) => self
                .inner
                .create_with_id(OrderId::from_dedup_key(key), params)
                .await
                .map_err(Self::map_error)?,
            None => self.create_order(params).await?,
        };
        info!(%id, grand_total = pricing.grand_total, "Order placed");
        self.get_order(id).await
    }

    /// Persists an already priced order.
    #[instrument(skip(self, params))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<OrderId, OrderError> {
        debug!(?params, "create_order called");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    /// The order, or `NotFound`.
    #[instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, OrderError> {
        self.get(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    /// Moves the order to `status`, which must be adjacent to its current status.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        role: Role,
    ) -> Result<Order, OrderError> {
        let outcome = self
            .inner
            .perform_action(id, OrderAction::SetStatus { role, status })
            .await
            .map_err(Self::map_error)?;
        Ok(outcome.order)
    }

    /// One step in `direction`; unchanged (not an error) at the boundary.
    #[instrument(skip(self))]
    pub async fn step(
        &self,
        id: OrderId,
        direction: Direction,
        role: Role,
    ) -> Result<TransitionOutcome, OrderError> {
        self.inner
            .perform_action(id, OrderAction::step(role, direction))
            .await
            .map_err(Self::map_error)
    }

    pub async fn advance(&self, id: OrderId, role: Role) -> Result<TransitionOutcome, OrderError> {
        self.step(id, Direction::Forward, role).await
    }

    pub async fn retreat(&self, id: OrderId, role: Role) -> Result<TransitionOutcome, OrderError> {
        self.step(id, Direction::Backward, role).await
    }

    /// One page of the filtered listing, newest first, with the total match count.
    /// Only admins may list every order.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        filter: OrderFilter,
        page: PageRequest,
        role: Role,
    ) -> Result<OrderPage, OrderError> {
        transitions::authorize(role)?;
        let orders = self.list(filter).await?;
        Ok(OrderPage::from_sorted(&orders, page))
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    /// Recovers the order's own error from the actor, so callers can match on
    /// `InvalidTransition` or `PermissionDenied` rather than a string.
    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::EntityError(inner) => match inner.downcast::<OrderError>() {
                Ok(order_error) => *order_error,
                Err(other) => OrderError::ActorCommunicationError(other.to_string()),
            },
            other @ (FrameworkError::ActorClosed | FrameworkError::ActorDropped) => {
                OrderError::NetworkFailure(other.to_string())
            }
        }
    }
}
