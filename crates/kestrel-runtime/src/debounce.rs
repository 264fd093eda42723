//! Trailing-edge debouncer

use parking_lot::Mutex;
use std::time::Duration;

use crate::task::ScheduledTask;

/// Collapses bursts of calls into one action that runs `delay` after the
/// last call. Each call replaces the pending action.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<ScheduledTask>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `f`, cancelling whatever was pending
    pub fn call<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let task = ScheduledTask::after(self.delay, f);
        let previous = self.pending.lock().replace(task);

        if let Some(previous) = previous {
            if !previous.is_finished() {
                tracing::trace!("Debounced pending call");
            }
        }
    }

    /// Drop the pending action without running it
    pub fn cancel(&self) {
        self.pending.lock().take();
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}
