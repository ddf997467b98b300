use super::entity::ActorEntity;
use super::error::FrameworkError;
use super::message::ResourceRequest;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Shared generator for the ids of newly created entities.
pub type IdGenerator<T> = Arc<dyn Fn() -> <T as ActorEntity>::Id + Send + Sync>;

/// ## ResourceClient
///
/// The `ResourceClient<T>` provides a type‑safe, async API for interacting with the
/// `ResourceActor<T>` shards. It forwards requests over Tokio mpsc channels and returns
/// results via oneshot channels. The client is cheap to clone and can be shared across tasks.
///
/// * **Routing** – an id always hashes to the same shard.
/// * **Fan-out** – `list` queries every shard and merges the results in listing order.
#[derive(Clone)]
pub struct ResourceClient<T: ActorEntity> {
    senders: Arc<[mpsc::Sender<ResourceRequest<T>>]>,
    next_id: IdGenerator<T>,
}

impl<T: ActorEntity> ResourceClient<T> {
    pub fn new(senders: Vec<mpsc::Sender<ResourceRequest<T>>>, next_id: IdGenerator<T>) -> Self {
        Self {
            senders: senders.into(),
            next_id,
        }
    }

    /// Number of shards behind this client.
    pub fn shards(&self) -> usize {
        self.senders.len()
    }

    fn sender_for(&self, id: &T::Id) -> &mpsc::Sender<ResourceRequest<T>> {
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        let shard = (hasher.finish() % self.senders.len() as u64) as usize;
        &self.senders[shard]
    }

    /// Creates an entity under a freshly generated id.
    pub async fn create(&self, params: T::Create) -> Result<T::Id, FrameworkError> {
        let id = (self.next_id)();
        self.create_with_id(id, params).await
    }

    /// Creates an entity under a caller-chosen id. Repeating the call with the
    /// same id returns that id without creating a second entity.
    pub async fn create_with_id(
        &self,
        id: T::Id,
        params: T::Create,
    ) -> Result<T::Id, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender_for(&id)
            .send(ResourceRequest::Create {
                id,
                params,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender_for(&id)
            .send(ResourceRequest::Get { id, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Every entity matching `filter`, across all shards, in listing order.
    pub async fn list(&self, filter: T::Filter) -> Result<Vec<T>, FrameworkError> {
        // Send to every shard first so they work on the query concurrently.
        let mut pending = Vec::with_capacity(self.senders.len());
        for sender in self.senders.iter() {
            let (respond_to, response) = oneshot::channel();
            sender
                .send(ResourceRequest::List {
                    filter: filter.clone(),
                    respond_to,
                })
                .await
                .map_err(|_| FrameworkError::ActorClosed)?;
            pending.push(response);
        }

        let mut items = Vec::new();
        for response in pending {
            items.extend(response.await.map_err(|_| FrameworkError::ActorDropped)??);
        }
        items.sort_by(|a, b| a.list_order(b));
        Ok(items)
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender_for(&id)
            .send(ResourceRequest::Action {
                id,
                action,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }
}
