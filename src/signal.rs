//! Broadcast cancellation shared by every consumer

use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tokio_util::task::TaskTracker;

/// Cancellation signal plus the set of tasks that must observe it.
///
/// Clones share state: firing any clone wakes every `fired()` waiter.
/// Consumers spawn their loops through [`CancelSignal::spawn`] so that
/// [`CancelSignal::wait`] returns only once all of them have exited.
#[derive(Clone, Debug, Default)]
pub struct CancelSignal {
    token: CancellationToken,
    tracker: TaskTracker,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the signal. Idempotent.
    pub fn fire(&self) {
        self.token.cancel();
    }

    pub fn is_fired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the signal has fired
    pub fn fired(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Underlying token, for APIs that need an owned future
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Spawn a task that [`wait`](Self::wait) will wait for
    pub fn spawn<F>(&self, task: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.tracker.spawn(task)
    }

    /// Number of tracked tasks still running
    pub fn running(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting new tasks and wait for every tracked task to exit
    pub async fn wait(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}
