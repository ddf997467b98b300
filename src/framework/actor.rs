use super::client::{IdGenerator, ResourceClient};
use super::entity::ActorEntity;
use super::error::FrameworkError;
use super::message::ResourceRequest;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that manages a collection of entities.
///
/// # Architecture Note
/// This struct is the "Server" half of the actor. It owns the state (`store`) and
/// the receiver end of the channel.
///
/// **Concurrency Model**:
/// Each actor processes its own messages *sequentially* in a loop, so the `store`
/// needs no `Mutex`. Every request for a given id lands on the same actor, which
/// serializes all writes to that entity, while a sharded setup
/// ([`ResourceActor::sharded`]) lets entities on different shards progress in parallel.
///
/// # Usage Pattern
///
/// 1.  **Create**: Call `ResourceActor::new()` (or `sharded()`) to get the actor(s) and the client.
/// 2.  **Wire**: Pass dependencies into `actor.run(context)`.
/// 3.  **Run**: Spawn each actor's run loop in a background task.
pub struct ResourceActor<T: ActorEntity> {
    shard: usize,
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a single `ResourceActor` and its associated `ResourceClient`.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - The capacity of the MPSC channel. If the channel is full,
    ///   calls to the client will wait until there is space.
    /// * `next_id` - Generator for the ids of newly created entities.
    pub fn new(
        buffer_size: usize,
        next_id: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (mut actors, client) = Self::sharded(1, buffer_size, next_id);
        let actor = actors.remove(0);
        (actor, client)
    }

    /// Creates `shards` actors behind one client. The client routes every id to
    /// a fixed shard, so writes to one entity are serialized by its shard.
    pub fn sharded(
        shards: usize,
        buffer_size: usize,
        next_id: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Vec<Self>, ResourceClient<T>) {
        let shards = shards.max(1);
        let mut actors = Vec::with_capacity(shards);
        let mut senders = Vec::with_capacity(shards);
        for shard in 0..shards {
            let (sender, receiver) = mpsc::channel(buffer_size.max(1));
            senders.push(sender);
            actors.push(Self {
                shard,
                receiver,
                store: HashMap::new(),
            });
        }
        let next_id: IdGenerator<T> = Arc::new(next_id);
        (actors, ResourceClient::new(senders, next_id))
    }

    /// Runs the actor's event loop, processing messages until the channel closes.
    ///
    /// # Context Injection
    /// The `context` argument is injected into every entity hook. This allows entities
    /// to access external dependencies that were created *after*
    /// the actor was instantiated but *before* the loop started.
    pub async fn run(mut self, context: T::Context) {
        // Just the type name, e.g. "Order" rather than "order_tracking::model::order::Order"
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        let shard = self.shard;
        info!(entity_type, shard, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create {
                    id,
                    params,
                    respond_to,
                } => {
                    debug!(entity_type, shard, %id, ?params, "Create");
                    if self.store.contains_key(&id) {
                        info!(entity_type, shard, %id, "Duplicate create, returning existing id");
                        let _ = respond_to.send(Ok(id));
                        continue;
                    }

                    match T::from_create_params(id.clone(), params) {
                        Ok(mut item) => {
                            if let Err(e) = item.on_create(&context).await {
                                warn!(entity_type, shard, error = %e, "on_create failed");
                                let _ =
                                    respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                                continue;
                            }
                            self.store.insert(id.clone(), item);
                            info!(entity_type, shard, %id, size = self.store.len(), "Created");
                            let _ = respond_to.send(Ok(id));
                        }
                        Err(e) => {
                            warn!(entity_type, shard, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let found = item.is_some();
                    debug!(entity_type, shard, %id, found, "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { filter, respond_to } => {
                    let mut items: Vec<T> = self
                        .store
                        .values()
                        .filter(|item| item.matches(&filter))
                        .cloned()
                        .collect();
                    items.sort_by(|a, b| a.list_order(b));
                    debug!(entity_type, shard, ?filter, matched = items.len(), "List");
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, shard, %id, ?action, "Action");
                    if let Some(item) = self.store.get_mut(&id) {
                        // The entity mutates itself only on success, so a failed
                        // action leaves the stored value untouched.
                        let result = item
                            .handle_action(action, &context)
                            .await
                            .map_err(|e| FrameworkError::EntityError(Box::new(e)));
                        match &result {
                            Ok(_) => info!(entity_type, shard, %id, "Action ok"),
                            Err(e) => warn!(entity_type, shard, %id, error = %e, "Action failed"),
                        }
                        let _ = respond_to.send(result);
                    } else {
                        warn!(entity_type, shard, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
            }
        }

        info!(entity_type, shard, size = self.store.len(), "Shutdown");
    }
}
