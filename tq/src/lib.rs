//! TaskQueue - Bounded async task queue with throttled starts
//!
//! An in-process scheduler for async work: submit keyed tasks, run at most N
//! of them at once, optionally keep a minimum gap between task starts, and
//! cancel, reorder, or clear anything that has not started yet.
//!
//! # Core Concepts
//!
//! - **Keys are identity**: resubmitting a live key returns the original
//!   future instead of queueing the work twice
//! - **Hard ceiling**: the concurrency limit is never exceeded, even across
//!   bursts of submissions
//! - **Paced starts**: the throttle bounds the gap between start instants,
//!   serialized through an internal gate when running concurrently
//! - **Every future settles**: success, callback failure, or cancellation --
//!   nothing is silently dropped
//!
//! # Example
//!
//! ```
//! use taskqueue::{QueueConfig, TaskQueue};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let queue = TaskQueue::new(QueueConfig {
//!     concurrency: 2,
//!     ..Default::default()
//! });
//!
//! let result = queue.submit("deploy", |name| async move {
//!     Ok(format!("{name} complete"))
//! });
//!
//! assert_eq!(result.await.unwrap(), "deploy complete");
//! # }
//! ```

pub mod error;
pub mod queue;

// Re-export commonly used types
pub use error::{BoxError, QueueError};
pub use queue::{QueueConfig, TaskFuture, TaskQueue, TaskResult};
