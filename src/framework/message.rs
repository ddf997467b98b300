use super::entity::ActorEntity;
use super::error::FrameworkError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Internal message type sent to the actor to request operations.
///
/// The variants map to the lifecycle of a resource that is created once and
/// afterwards only read or driven through its own actions:
///
/// - **Create**: Lifecycle start. The id is already assigned by the client.
/// - **Get**: Fetches the current state of the resource by ID.
/// - **List**: Every entity of this shard matching a filter, in listing order.
/// - **Action**: Executes a custom [`ActorEntity::Action`].
///
/// There is no delete: resources are kept for their whole history.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        id: T::Id,
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        filter: T::Filter,
        respond_to: Response<Vec<T>>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}
