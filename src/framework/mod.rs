//! Generic actor framework for resource management.
//!
//! This module provides the building blocks for type-safe actor systems that
//! own resource entities: creation, reads, filtered listings and custom actions.
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait that resource types implement to be managed by actors
//! - [`ResourceActor`] - Generic actor that owns one shard of entities
//! - [`ResourceClient`] - Typed, cloneable handle that routes requests to shards
//! - [`FrameworkError`] - Common error types
//!
//! # Testing
//!
//! See [`mock`] module for utilities to test clients without spawning full actors.

pub mod actor;
pub mod client;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::ResourceActor;
pub use client::{IdGenerator, ResourceClient};
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::cmp::Ordering as CmpOrdering;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        id: u64,
        label: String,
        value: u32,
    }

    #[derive(Debug)]
    struct CounterCreate {
        label: String,
    }

    #[derive(Debug)]
    enum CounterAction {
        Increment,
        Fail,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("counter error: {0}")]
    struct CounterError(String);

    #[async_trait]
    impl ActorEntity for Counter {
        type Id = u64;
        type Create = CounterCreate;
        type Action = CounterAction;
        type ActionResult = u32;
        type Filter = Option<String>;
        type Context = ();
        type Error = CounterError;

        fn from_create_params(id: u64, params: CounterCreate) -> Result<Self, Self::Error> {
            if params.label.is_empty() {
                return Err(CounterError("empty label".into()));
            }
            Ok(Self {
                id,
                label: params.label,
                value: 0,
            })
        }

        fn matches(&self, filter: &Option<String>) -> bool {
            filter.as_ref().map_or(true, |label| &self.label == label)
        }

        fn list_order(&self, other: &Self) -> CmpOrdering {
            self.id.cmp(&other.id)
        }

        async fn handle_action(
            &mut self,
            action: CounterAction,
            _ctx: &(),
        ) -> Result<u32, Self::Error> {
            match action {
                CounterAction::Increment => {
                    self.value += 1;
                    Ok(self.value)
                }
                CounterAction::Fail => Err(CounterError("refused".into())),
            }
        }
    }

    fn sequential_ids() -> impl Fn() -> u64 + Send + Sync + 'static {
        let counter = Arc::new(AtomicU64::new(1));
        move || counter.fetch_add(1, Ordering::SeqCst)
    }

    #[tokio::test]
    async fn test_resource_actor_lifecycle() {
        let (actor, client) = ResourceActor::<Counter>::new(10, sequential_ids());
        let handle = tokio::spawn(actor.run(()));

        let id = client
            .create(CounterCreate { label: "a".into() })
            .await
            .unwrap();
        assert_eq!(id, 1);

        assert_eq!(client.perform_action(id, CounterAction::Increment).await.unwrap(), 1);
        assert_eq!(client.perform_action(id, CounterAction::Increment).await.unwrap(), 2);

        let err = client.perform_action(id, CounterAction::Fail).await.unwrap_err();
        assert!(matches!(err, FrameworkError::EntityError(_)));
        assert_eq!(client.get(id).await.unwrap().unwrap().value, 2);

        let missing = client.perform_action(99, CounterAction::Increment).await.unwrap_err();
        assert!(matches!(missing, FrameworkError::NotFound(ref s) if s == "99"));
        assert!(client.get(99).await.unwrap().is_none());

        let rejected = client.create(CounterCreate { label: String::new() }).await;
        assert!(matches!(rejected, Err(FrameworkError::EntityError(_))));

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_create_with_existing_id_is_idempotent() {
        let (actor, client) = ResourceActor::<Counter>::new(10, sequential_ids());
        tokio::spawn(actor.run(()));

        let id = client
            .create_with_id(42, CounterCreate { label: "first".into() })
            .await
            .unwrap();
        let again = client
            .create_with_id(42, CounterCreate { label: "second".into() })
            .await
            .unwrap();
        assert_eq!(id, again);
        assert_eq!(client.get(42).await.unwrap().unwrap().label, "first");
    }

    #[tokio::test]
    async fn test_sharded_list_merges_in_order() {
        let (actors, client) = ResourceActor::<Counter>::sharded(3, 10, sequential_ids());
        assert_eq!(client.shards(), 3);
        for actor in actors {
            tokio::spawn(actor.run(()));
        }

        for label in ["x", "y", "x", "x", "y", "z"] {
            client.create(CounterCreate { label: label.into() }).await.unwrap();
        }

        let all = client.list(None).await.unwrap();
        let ids: Vec<u64> = all.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);

        let xs = client.list(Some("x".into())).await.unwrap();
        let ids: Vec<u64> = xs.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);

        // Every id stays reachable through its shard.
        for id in 1..=6 {
            assert!(client.get(id).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_closed_actor_reports_actor_closed() {
        let (actor, client) = ResourceActor::<Counter>::new(10, sequential_ids());
        drop(actor);
        let err = client.get(1).await.unwrap_err();
        assert!(matches!(err, FrameworkError::ActorClosed));
    }
}
