//! Queue error types

use std::sync::Arc;

use thiserror::Error;

/// Type-erased error returned by task callbacks.
///
/// Callbacks resolve to `Result<R, BoxError>`, so `?` works unchanged on any
/// error type inside a callback body.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors a task future can settle with.
///
/// Cloneable so the same settled error can be handed to every clone of a
/// shared task future.
#[derive(Debug, Clone, Error)]
pub enum QueueError {
    /// The callback ran and returned an error
    #[error("task failed: {0}")]
    Failed(Arc<dyn std::error::Error + Send + Sync + 'static>),

    /// The callback panicked while running
    #[error("task panicked: {0}")]
    Panicked(String),

    /// The task was cancelled before it started
    #[error("queue item cancelled")]
    Cancelled,

    /// The queue was cleared before the task started
    #[error("queue cleared")]
    Cleared,

    /// The queue shut down before the task settled
    #[error("queue closed")]
    Closed,
}

impl QueueError {
    pub(crate) fn failed(err: BoxError) -> Self {
        Self::Failed(Arc::from(err))
    }

    /// True when the task never ran: cancelled, cleared, or orphaned by
    /// queue shutdown
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Cleared | Self::Closed)
    }

    /// True when the callback was invoked and did not succeed
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::Panicked(_))
    }

    /// The callback's original error for [`QueueError::Failed`], downcastable
    /// to its concrete type
    pub fn callback_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Failed(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("disk full")]
    struct DiskFull;

    #[test]
    fn test_failed_message_carries_source() {
        let err = QueueError::failed(Box::new(DiskFull));

        let msg = err.to_string();
        assert!(msg.contains("task failed"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn test_callback_error_downcast() {
        let err = QueueError::failed(Box::new(DiskFull));

        let source = err.callback_error().unwrap();
        assert!(source.downcast_ref::<DiskFull>().is_some());
    }

    #[test]
    fn test_cancellation_kinds() {
        assert!(QueueError::Cancelled.is_cancellation());
        assert!(QueueError::Cleared.is_cancellation());
        assert!(QueueError::Closed.is_cancellation());
        assert!(!QueueError::Panicked("boom".into()).is_cancellation());

        assert!(QueueError::Panicked("boom".into()).is_failure());
        assert!(QueueError::failed(Box::new(DiskFull)).is_failure());
        assert!(!QueueError::Cleared.is_failure());
    }

    #[test]
    fn test_clone_shares_source() {
        let err = QueueError::failed(Box::new(DiskFull));
        let cloned = err.clone();

        assert_eq!(err.to_string(), cloned.to_string());
        assert!(cloned.callback_error().is_some());
    }
}
