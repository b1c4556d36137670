//! Request admission-control queue
//!
//! Serializes calls to a rate-limited external operation. The free-tier
//! quota upstream is per-second and shared, so even two simultaneous calls
//! can trigger a hard failure; the default is therefore strict serialization
//! (`max_concurrent = 1`), with transient failures retried under exponential
//! backoff while the task keeps its slot. Queue depth is exposed so the HTTP
//! layer can reject new work early instead of piling it up.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::application::retry::{RetryDecision, RetryPolicy};
use crate::port::ProviderError;

/// Boxed future produced by one invocation of a queued operation.
type TaskFuture<T> = Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send>>;

/// A queued operation. Invoked once per attempt, so retries re-run it.
type TaskOperation<T> = Arc<dyn Fn() -> TaskFuture<T> + Send + Sync>;

/// Queue configuration
#[derive(Debug, Clone)]
pub struct RequestQueueConfig {
    /// Concurrent executions allowed. 1 means strict serialization.
    pub max_concurrent: usize,
    /// Retry attempts after the initial invocation.
    pub max_retries: u32,
    /// Base delay for exponential backoff (doubles per retry).
    pub retry_base_delay: Duration,
}

impl Default for RequestQueueConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 1,
            max_retries: 3,
            retry_base_delay: Duration::from_millis(1000),
        }
    }
}

/// One pending unit of work. Owned exclusively by the queue; the caller only
/// holds the receiving end of `reply`.
struct QueuedTask<T> {
    operation: TaskOperation<T>,
    reply: oneshot::Sender<Result<T, ProviderError>>,
}

struct QueueState<T> {
    /// FIFO list of tasks not yet dispatched.
    pending: VecDeque<QueuedTask<T>>,
    /// Tasks dispatched but not yet settled. Never exceeds `max_concurrent`.
    active: usize,
}

/// Admission-control queue in front of a rate-limited operation.
///
/// Cheap to clone; clones share the same queue. Construct one per process and
/// pass it to whoever needs it.
pub struct RequestQueue<T> {
    inner: Arc<QueueInner<T>>,
}

impl<T> Clone for RequestQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct QueueInner<T> {
    state: Mutex<QueueState<T>>,
    retry: RetryPolicy,
    max_concurrent: usize,
}

impl<T: Send + 'static> Default for RequestQueue<T> {
    fn default() -> Self {
        Self::new(RequestQueueConfig::default())
    }
}

impl<T: Send + 'static> RequestQueue<T> {
    pub fn new(config: RequestQueueConfig) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState {
                    pending: VecDeque::new(),
                    active: 0,
                }),
                retry: RetryPolicy::new(config.retry_base_delay, config.max_retries),
                max_concurrent: config.max_concurrent,
            }),
        }
    }

    /// Submit an operation and get a future for its eventual result.
    ///
    /// Returns synchronously with a pending future even when the queue is
    /// saturated; the operation runs once a slot frees up, in submission
    /// order. The future resolves with the operation's result, or with the
    /// final error once it proves terminal or retries are exhausted.
    pub fn enqueue<F, Fut>(&self, operation: F) -> impl Future<Output = Result<T, ProviderError>>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ProviderError>> + Send + 'static,
    {
        let (reply, receiver) = oneshot::channel();
        let operation: TaskOperation<T> = Arc::new(move || Box::pin(operation()));

        {
            let mut state = self.inner.lock_state();
            state.pending.push_back(QueuedTask { operation, reply });
            debug!(queue_length = state.pending.len(), "Task enqueued");
        }
        self.inner.dispatch();

        async move {
            match receiver.await {
                Ok(result) => result,
                // The dispatched task was torn down without settling (panic in
                // the operation). The slot was still released.
                Err(_) => Err(ProviderError::Canceled),
            }
        }
    }

    /// Tasks waiting for dispatch. Does NOT include the ones currently
    /// executing; add `active_count` for total in-flight + waiting.
    pub fn queue_length(&self) -> usize {
        self.inner.lock_state().pending.len()
    }

    /// Tasks dispatched but not yet settled.
    pub fn active_count(&self) -> usize {
        self.inner.lock_state().active
    }
}

impl<T: Send + 'static> QueueInner<T> {
    /// A task panic can poison the mutex mid-unwind; recover the guard rather
    /// than wedge every later caller.
    fn lock_state(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pull tasks off the pending list while capacity remains.
    ///
    /// Pop + increment happen under the state lock, so concurrent dispatch
    /// calls (from enqueue and from task settlement) cannot double-book a
    /// slot. FIFO order: always the head.
    fn dispatch(self: &Arc<Self>) {
        loop {
            let task = {
                let mut state = self.lock_state();
                if state.active >= self.max_concurrent {
                    return;
                }
                match state.pending.pop_front() {
                    Some(task) => {
                        state.active += 1;
                        task
                    }
                    None => return,
                }
            };

            let queue = Arc::clone(self);
            tokio::spawn(async move {
                let slot = SlotGuard {
                    queue: Some(Arc::clone(&queue)),
                };
                let result = queue.run_with_retries(&task.operation).await;
                slot.settle(task.reply, result);
            });
        }
    }

    /// Execute one task to settlement, retrying transient failures with
    /// exponential backoff. The concurrency slot is held for the whole time.
    async fn run_with_retries(&self, operation: &TaskOperation<T>) -> Result<T, ProviderError> {
        let mut attempt = 0u32;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => match self.retry.decide(&error, attempt) {
                    RetryDecision::Retry(delay) => {
                        warn!(
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            error = %error,
                            "Transient failure, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    RetryDecision::Fail => return Err(error),
                },
            }
        }
    }
}

/// Releases the concurrency slot exactly once per dispatched task.
///
/// The normal path runs through `settle`: slot release, then the outward
/// reply, then another dispatch pass to pull the next waiting task. If the
/// operation panics instead, the unwind drops the guard and the Drop impl
/// walks the same release path, so a bad task cannot wedge the queue.
struct SlotGuard<T: Send + 'static> {
    queue: Option<Arc<QueueInner<T>>>,
}

impl<T: Send + 'static> SlotGuard<T> {
    fn settle(
        mut self,
        reply: oneshot::Sender<Result<T, ProviderError>>,
        result: Result<T, ProviderError>,
    ) {
        if let Some(queue) = self.queue.take() {
            queue.lock_state().active -= 1;
            // The receiver may be gone (caller timed out and stopped
            // waiting); that is not an error.
            let _ = reply.send(result);
            queue.dispatch();
        }
    }
}

impl<T: Send + 'static> Drop for SlotGuard<T> {
    fn drop(&mut self) {
        if let Some(queue) = self.queue.take() {
            queue.lock_state().active -= 1;
            queue.dispatch();
        }
    }
}
