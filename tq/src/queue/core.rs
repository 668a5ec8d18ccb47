//! Task queue implementation

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use tokio::time::Instant;
use tracing::debug;

use crate::error::{BoxError, QueueError};

use super::config::QueueConfig;
use super::entry::{ActiveEntry, PendingEntry, TaskCallback, TaskFuture, TaskResult, task_future};

/// Internal state protected by mutex
struct QueueInner<T, R> {
    /// Tasks waiting to start, in start order
    pending: VecDeque<PendingEntry<T, R>>,

    /// Tasks started (or handed to the gate), by key
    active: HashMap<T, ActiveEntry<R>>,

    /// Max simultaneously active tasks
    concurrency: usize,

    /// Minimum gap between starts; zero when pacing is delegated to the gate
    throttle: Duration,

    /// Most recent throttled start
    last_start: Option<Instant>,

    /// Ticket counter for gate hand-offs
    tickets: u64,
}

impl<T: Eq + Hash, R> QueueInner<T, R> {
    fn live_handle(&self, key: &T) -> Option<TaskFuture<R>> {
        if let Some(active) = self.active.get(key) {
            return Some(active.handle.clone());
        }
        self.pending.iter().find(|entry| entry.key == *key).map(|entry| entry.handle.clone())
    }
}

/// State shared between queue handles and running tasks
struct QueueShared<T, R> {
    inner: Mutex<QueueInner<T, R>>,

    /// Single-concurrency sub-queue that serializes start instants, present
    /// only when the queue was built with `concurrency > 1` and a throttle
    gate: Option<TaskQueue<u64, ()>>,
}

/// The TaskQueue runs submitted tasks with a concurrency ceiling, an optional
/// minimum gap between task starts, and per-key deduplication.
///
/// Each submission pairs a key with an async callback and yields a shareable
/// future for the callback's result. Resubmitting a key that is still pending
/// or running returns the original future instead of queueing the work twice.
/// Pending work can be cancelled, reordered, or cleared; started work always
/// runs to completion.
///
/// Handles are cheap to clone and all clones drive the same queue. Tasks
/// execute on the ambient tokio runtime, so the queue must be used from
/// within one.
pub struct TaskQueue<T, R> {
    shared: Arc<QueueShared<T, R>>,
}

impl<T, R> Clone for TaskQueue<T, R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, R> TaskQueue<T, R> {
    fn lock(&self) -> MutexGuard<'_, QueueInner<T, R>> {
        // Only caller-supplied Eq/Ord/Clone impls can panic under this lock,
        // and state is consistent at every such point; keep the guard usable.
        self.shared.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T, R> TaskQueue<T, R>
where
    T: Clone + Eq + Hash + Send + 'static,
    R: Clone + Send + Sync + 'static,
{
    /// Create a new queue with the given configuration.
    ///
    /// `concurrency` is clamped to at least 1. When both `concurrency > 1`
    /// and a throttle are configured, start pacing is delegated to an
    /// internal single-concurrency gate built here; the gate then owns the
    /// authoritative throttle value for the queue's lifetime.
    pub fn new(config: QueueConfig) -> Self {
        let concurrency = config.concurrency.max(1);
        let mut throttle = config.throttle();

        let gate = if concurrency > 1 && !throttle.is_zero() {
            throttle = Duration::ZERO;
            Some(TaskQueue::new(QueueConfig {
                concurrency: 1,
                throttle_ms: config.throttle_ms,
            }))
        } else {
            None
        };

        debug!(concurrency, throttle_ms = config.throttle_ms, gated = gate.is_some(), "TaskQueue::new: called");
        Self {
            shared: Arc::new(QueueShared {
                inner: Mutex::new(QueueInner {
                    pending: VecDeque::new(),
                    active: HashMap::new(),
                    concurrency,
                    throttle,
                    last_start: None,
                    tickets: 0,
                }),
                gate,
            }),
        }
    }

    /// Append a task and return the future for its result.
    ///
    /// If a live task for `key` already exists (pending or running), no new
    /// task is created and the existing future is returned; the callback is
    /// dropped unused. The future settles with the callback's result, or with
    /// a [`QueueError`] if the task fails or never starts.
    pub fn submit<F, Fut>(&self, key: T, callback: F) -> TaskFuture<R>
    where
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = Result<R, BoxError>> + Send + 'static,
    {
        let callback: TaskCallback<T, R> = Box::new(move |key| callback(key).boxed());
        self.enqueue(key, callback, false)
    }

    /// Prepend a task so it starts before everything else pending.
    ///
    /// Same dedup semantics as [`TaskQueue::submit`]; a live key keeps its
    /// current position.
    pub fn submit_front<F, Fut>(&self, key: T, callback: F) -> TaskFuture<R>
    where
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = Result<R, BoxError>> + Send + 'static,
    {
        let callback: TaskCallback<T, R> = Box::new(move |key| callback(key).boxed());
        self.enqueue(key, callback, true)
    }

    fn enqueue(&self, key: T, callback: TaskCallback<T, R>, front: bool) -> TaskFuture<R> {
        let handle = {
            let mut inner = self.lock();

            if let Some(existing) = inner.live_handle(&key) {
                debug!("TaskQueue::submit: key already live, returning existing future");
                return existing;
            }

            let (settle, handle) = task_future();
            let entry = PendingEntry {
                key,
                callback,
                settle,
                handle: handle.clone(),
            };
            if front {
                inner.pending.push_front(entry);
            } else {
                inner.pending.push_back(entry);
            }
            debug!(pending = inner.pending.len(), front, "TaskQueue::submit: task queued");
            handle
        };

        self.schedule();
        handle
    }

    /// True if a live task (pending or running) exists for `key`
    pub fn has(&self, key: &T) -> bool {
        let inner = self.lock();
        inner.active.contains_key(key) || inner.pending.iter().any(|entry| entry.key == *key)
    }

    /// The live future for `key`, if one exists
    pub fn get(&self, key: &T) -> Option<TaskFuture<R>> {
        self.lock().live_handle(key)
    }

    /// Snapshot of the keys currently running (arbitrary order)
    pub fn active_keys(&self) -> Vec<T> {
        self.lock().active.keys().cloned().collect()
    }

    /// Snapshot of the keys waiting to start, in start order
    pub fn pending_keys(&self) -> Vec<T> {
        self.lock().pending.iter().map(|entry| entry.key.clone()).collect()
    }

    /// Number of tasks currently running
    pub fn active_count(&self) -> usize {
        self.lock().active.len()
    }

    /// Number of tasks waiting to start
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Total live tasks (running + pending)
    pub fn len(&self) -> usize {
        let inner = self.lock();
        inner.active.len() + inner.pending.len()
    }

    /// True when no task is running or pending
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stable-sort the pending tasks with a key comparator.
    ///
    /// Running tasks are unaffected and no new starts are triggered; the new
    /// order governs subsequent scheduling decisions.
    pub fn sort_pending_by<F>(&self, mut compare: F)
    where
        F: FnMut(&T, &T) -> std::cmp::Ordering,
    {
        let mut inner = self.lock();
        inner.pending.make_contiguous().sort_by(|a, b| compare(&a.key, &b.key));
        debug!(pending = inner.pending.len(), "TaskQueue::sort_pending_by: pending reordered");
    }

    /// Remove a pending task, rejecting its future with
    /// [`QueueError::Cancelled`].
    ///
    /// Returns false when `key` is already running or unknown; started work
    /// is never interrupted.
    pub fn cancel(&self, key: &T) -> bool {
        let removed = {
            let mut inner = self.lock();
            match inner.pending.iter().position(|entry| entry.key == *key) {
                Some(index) => inner.pending.remove(index),
                None => None,
            }
        };

        match removed {
            Some(entry) => {
                debug!("TaskQueue::cancel: pending task removed");
                let _ = entry.settle.send(Err(QueueError::Cancelled));
                true
            }
            None => {
                debug!("TaskQueue::cancel: key not pending, nothing cancelled");
                false
            }
        }
    }

    /// Reject every pending task with [`QueueError::Cleared`], in queue order.
    ///
    /// Running tasks continue to completion. Hand-offs still buffered in the
    /// throttle gate are cleared too, which rejects their tasks and frees
    /// their slots. Concurrency and throttle settings are kept.
    pub fn clear(&self) {
        // Drain before clearing the gate: each gate rejection frees a slot
        // and re-runs the scheduler, which must find nothing left to claim.
        let drained: Vec<PendingEntry<T, R>> = {
            let mut inner = self.lock();
            inner.pending.drain(..).collect()
        };

        if let Some(gate) = &self.shared.gate {
            gate.clear();
        }

        debug!(cleared = drained.len(), "TaskQueue::clear: pending tasks rejected");
        for entry in drained {
            let _ = entry.settle.send(Err(QueueError::Cleared));
        }
    }

    /// Maximum simultaneously running tasks
    pub fn concurrency(&self) -> usize {
        self.lock().concurrency
    }

    /// Set the concurrency ceiling (clamped to at least 1) and re-run the
    /// scheduling loop.
    ///
    /// Lowering the ceiling never interrupts running tasks; it only limits
    /// future starts.
    pub fn set_concurrency(&self, concurrency: usize) {
        let concurrency = concurrency.max(1);
        self.lock().concurrency = concurrency;
        debug!(concurrency, "TaskQueue::set_concurrency: called");
        self.schedule();
    }

    /// Minimum gap between task starts
    pub fn throttle(&self) -> Duration {
        match &self.shared.gate {
            Some(gate) => gate.throttle(),
            None => self.lock().throttle,
        }
    }

    /// Set the minimum gap between task starts.
    ///
    /// When pacing is delegated to the gate, the gate's throttle is updated
    /// instead; there is one authoritative throttle per queue. Takes effect
    /// on the next start.
    pub fn set_throttle(&self, throttle: Duration) {
        match &self.shared.gate {
            Some(gate) => gate.set_throttle(throttle),
            None => {
                self.lock().throttle = throttle;
                debug!(throttle_ms = throttle.as_millis() as u64, "TaskQueue::set_throttle: called");
                self.schedule();
            }
        }
    }

    /// Drive the scheduling loop to a fixed point: start pending tasks until
    /// capacity is exhausted or nothing is waiting.
    ///
    /// Runs under one lock acquisition so a racing burst of submissions
    /// cannot interleave mid-pass and overshoot the ceiling.
    fn schedule(&self) {
        let mut inner = self.lock();

        while inner.active.len() < inner.concurrency {
            let Some(entry) = inner.pending.pop_front() else {
                break;
            };
            let PendingEntry {
                key,
                callback,
                settle,
                handle,
            } = entry;
            inner.active.insert(key.clone(), ActiveEntry { settle, handle });
            debug!(active = inner.active.len(), pending = inner.pending.len(), "TaskQueue::schedule: task claimed");

            match &self.shared.gate {
                None => {
                    tokio::spawn(self.clone().run(key, callback));
                }
                Some(gate) => {
                    let ticket = inner.tickets;
                    inner.tickets += 1;

                    let runner = self.clone();
                    let run_key = key.clone();
                    // The gate paces starts only: launch the task detached so
                    // its slot frees as soon as the callback is underway.
                    let handoff = gate.submit(ticket, move |_| {
                        tokio::spawn(runner.run(run_key, callback));
                        futures::future::ready(Ok(()))
                    });

                    // A cleared hand-off must reject the task and release its
                    // claimed slot, or capacity would leak.
                    let watcher = self.clone();
                    tokio::spawn(async move {
                        if let Err(err) = handoff.await {
                            debug!("TaskQueue::schedule: gate hand-off rejected");
                            watcher.settle(&key, Err(err));
                        }
                    });
                }
            }
        }
    }

    /// Execute one claimed task: wait out the throttle, invoke the callback,
    /// settle the future, free the slot.
    async fn run(self, key: T, callback: TaskCallback<T, R>) {
        if let Some(wait) = self.throttle_wait() {
            tokio::time::sleep(wait).await;
            self.lock().last_start = Some(Instant::now());
        }

        debug!("TaskQueue::run: invoking callback");
        let run_key = key.clone();
        let outcome = match std::panic::catch_unwind(AssertUnwindSafe(move || callback(run_key))) {
            Ok(work) => AssertUnwindSafe(work).catch_unwind().await,
            Err(payload) => Err(payload),
        };

        let result = match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(QueueError::failed(err)),
            Err(payload) => Err(QueueError::Panicked(panic_message(payload.as_ref()))),
        };
        self.settle(&key, result);
    }

    /// Remaining wait before the next start honours the throttle, or None to
    /// start now.
    ///
    /// The start instant is recorded here only on the no-wait path; after a
    /// wait the caller records it, so gaps measure actual starts rather than
    /// scheduling attempts.
    fn throttle_wait(&self) -> Option<Duration> {
        let mut inner = self.lock();
        if inner.throttle.is_zero() {
            return None;
        }

        let now = Instant::now();
        if let Some(last) = inner.last_start {
            let elapsed = now.duration_since(last);
            if elapsed < inner.throttle {
                return Some(inner.throttle - elapsed);
            }
        }
        inner.last_start = Some(now);
        None
    }

    /// Settle a task's future, free its slot, and re-run the scheduling loop
    /// so the capacity is used immediately.
    fn settle(&self, key: &T, result: TaskResult<R>) {
        let entry = self.lock().active.remove(key);
        if let Some(active) = entry {
            debug!(ok = result.is_ok(), "TaskQueue::settle: task settled");
            let _ = active.settle.send(result);
        }
        self.schedule();
    }
}

impl<T, R> Default for TaskQueue<T, R>
where
    T: Clone + Eq + Hash + Send + 'static,
    R: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(QueueConfig::default())
    }
}

impl<T, R> fmt::Debug for TaskQueue<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("TaskQueue")
            .field("concurrency", &inner.concurrency)
            .field("active", &inner.active.len())
            .field("pending", &inner.pending.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
