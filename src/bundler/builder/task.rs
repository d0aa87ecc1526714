//! Handles to stages running on the tokio runtime.
//!
//! A stage is "fire and report": [`TaskHandle::spawn`] returns immediately,
//! the stage runs on a worker and sends its value once. Callers can await the
//! value, poll it, bound the wait with a timeout or cancel the work.

use crate::bundler::error::{Error, Result};
use std::{future::Future, time::Duration};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Continuation invoked exactly once with a stage's success flag.
pub type Completion = Box<dyn FnOnce(bool) + Send + 'static>;

/// Result channel plus cancellation for one background stage.
#[derive(Debug)]
pub struct TaskHandle<T> {
    name: String,
    receiver: oneshot::Receiver<T>,
    cancel: CancellationToken,
}

impl<T: Send + 'static> TaskHandle<T> {
    /// Spawn `work` on the runtime.
    ///
    /// `work` receives a child of `cancel`; cancelling the handle also
    /// cancels the work, cancelling `cancel` cancels both.
    pub fn spawn<F, Fut>(name: impl Into<String>, cancel: &CancellationToken, work: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let name = name.into();
        let token = cancel.child_token();
        let (sender, receiver) = oneshot::channel();
        let future = work(token.clone());

        let task_name = name.clone();
        tokio::spawn(async move {
            let value = future.await;
            if sender.send(value).is_err() {
                log::debug!("{task_name} finished after its handle was dropped");
            }
        });

        Self {
            name,
            receiver,
            cancel: token,
        }
    }

    /// Name given at spawn time.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Request cancellation; running child processes are killed.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token cancelled together with this handle.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Value if the task already finished, without waiting.
    pub fn try_result(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Wait for the value.
    ///
    /// Fails with [`Error::Cancelled`] if the task ended without reporting,
    /// which only happens when it panicked or the runtime shut down.
    pub async fn wait(self) -> Result<T> {
        self.receiver.await.map_err(|_| Error::Cancelled)
    }

    /// Wait at most `timeout` for the value.
    ///
    /// On timeout the task is cancelled before returning [`Error::Timeout`],
    /// so no child process outlives the wait.
    pub async fn wait_timeout(self, timeout: Duration) -> Result<T> {
        let Self {
            name,
            receiver,
            cancel,
        } = self;

        match tokio::time::timeout(timeout, receiver).await {
            Ok(value) => value.map_err(|_| Error::Cancelled),
            Err(_) => {
                log::warn!("{name} did not finish within {}s, cancelling", timeout.as_secs());
                cancel.cancel();
                Err(Error::Timeout {
                    task: name,
                    timeout,
                })
            }
        }
    }
}
