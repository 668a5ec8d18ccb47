//! Task queue with concurrency limits and start throttling
//!
//! Runs submitted tasks with a concurrency ceiling, an optional minimum gap
//! between task starts, per-key deduplication, and cancelable pending work,
//! in a single component.

mod config;
mod core;
mod entry;

pub use config::QueueConfig;
pub use core::TaskQueue;
pub use entry::{TaskFuture, TaskResult};
