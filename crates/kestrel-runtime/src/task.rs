//! Cancellable delayed task

use std::time::Duration;
use tokio::task::JoinHandle;

/// A callback scheduled to run once after a delay.
///
/// Dropping the handle cancels the task, so replacing a stored
/// `ScheduledTask` is enough to reschedule it.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Run `f` after `delay` on the current tokio runtime
    pub fn after<F>(delay: Duration, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            f();
        });

        Self { handle }
    }

    /// Cancel the task if it has not fired yet
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
