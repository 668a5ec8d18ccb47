//! Entry and future types for the task queue

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::oneshot;

use crate::error::{BoxError, QueueError};

/// Result a task future settles with
pub type TaskResult<R> = Result<R, QueueError>;

/// Handle to a task's eventual result.
///
/// Cloning is cheap and every clone resolves with the same settled value,
/// which is how resubmitting a live key hands back the original future.
pub type TaskFuture<R> = Shared<BoxFuture<'static, TaskResult<R>>>;

/// Boxed task callback as stored in the pending list
pub(crate) type TaskCallback<T, R> = Box<dyn FnOnce(T) -> BoxFuture<'static, Result<R, BoxError>> + Send>;

/// Producer half of a task future; settles it exactly once
pub(crate) type SettleTx<R> = oneshot::Sender<TaskResult<R>>;

/// Create the two halves of a task future.
///
/// If the producer half is dropped without settling (queue teardown), the
/// future resolves to [`QueueError::Closed`] instead of pending forever.
pub(crate) fn task_future<R>() -> (SettleTx<R>, TaskFuture<R>)
where
    R: Clone + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let future = async move {
        match rx.await {
            Ok(result) => result,
            Err(_) => Err(QueueError::Closed),
        }
    }
    .boxed()
    .shared();
    (tx, future)
}

/// A task waiting in the pending list
pub(crate) struct PendingEntry<T, R> {
    pub(crate) key: T,
    pub(crate) callback: TaskCallback<T, R>,
    pub(crate) settle: SettleTx<R>,
    pub(crate) handle: TaskFuture<R>,
}

/// A task that has been started (or handed to the throttle gate)
pub(crate) struct ActiveEntry<R> {
    pub(crate) settle: SettleTx<R>,
    pub(crate) handle: TaskFuture<R>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_settle_resolves_future() {
        let (tx, future) = task_future::<u32>();

        tx.send(Ok(7)).unwrap();
        assert_eq!(future.await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_clones_share_settled_value() {
        let (tx, future) = task_future::<String>();
        let other = future.clone();

        tx.send(Ok("done".to_string())).unwrap();
        assert_eq!(future.await.unwrap(), "done");
        assert_eq!(other.await.unwrap(), "done");
    }

    #[tokio::test]
    async fn test_dropped_producer_closes_future() {
        let (tx, future) = task_future::<u32>();
        drop(tx);

        let err = future.await.unwrap_err();
        assert!(matches!(err, QueueError::Closed));
        assert!(err.is_cancellation());
    }

    #[tokio::test]
    async fn test_error_settlement_fans_out() {
        let (tx, future) = task_future::<u32>();
        let other = future.clone();

        tx.send(Err(QueueError::Cancelled)).unwrap();
        assert!(matches!(future.await, Err(QueueError::Cancelled)));
        assert!(matches!(other.await, Err(QueueError::Cancelled)));
    }
}
