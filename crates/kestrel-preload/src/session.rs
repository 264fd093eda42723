//! A single preload session

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use kestrel_runtime::ScheduledTask;
use kestrel_tabs::BrowserTab;

use crate::control::PreloadedTabControl;
use crate::error::PreloadError;
use crate::state::SessionState;
use crate::Result;

/// One background tab and its idle timer.
///
/// Each armed timer carries a generation number. An expiry that arrives
/// with an older generation belongs to a timer that was already replaced.
pub(crate) struct PreloadSession<T: BrowserTab> {
    id: String,
    control: PreloadedTabControl<T>,
    state: SessionState,
    created_at: DateTime<Utc>,
    last_touched: Instant,
    generation: u64,
    timer: Option<ScheduledTask>,
}

impl<T: BrowserTab> PreloadSession<T> {
    pub fn new(id: String, tab: T) -> Self {
        Self {
            id,
            control: PreloadedTabControl::new(tab),
            state: SessionState::Active,
            created_at: Utc::now(),
            last_touched: Instant::now(),
            generation: 0,
            timer: None,
        }
    }

    #[cfg(test)]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn last_touched(&self) -> Instant {
        self.last_touched
    }

    pub fn control_mut(&mut self) -> &mut PreloadedTabControl<T> {
        &mut self.control
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Touch the session and replace its idle timer; the previous timer is
    /// cancelled by the swap
    pub fn arm(&mut self, generation: u64, timer: ScheduledTask) -> Result<()> {
        self.transition_to(SessionState::Active)?;
        self.last_touched = Instant::now();
        self.generation = generation;
        self.timer = Some(timer);
        Ok(())
    }

    /// Hand the tab off. The timer is cancelled before the control leaves.
    pub fn consume(mut self) -> Result<PreloadedTabControl<T>> {
        self.disarm();
        self.transition_to(SessionState::Consumed)?;

        tracing::debug!(
            preload_id = %self.id,
            age_ms = (Utc::now() - self.created_at).num_milliseconds(),
            "Consumed preload session"
        );

        Ok(self.control)
    }

    /// Tear the session down. `reason` is `Expired` or `Discarded`.
    pub fn destroy(mut self, reason: SessionState) -> Result<()> {
        self.disarm();
        self.transition_to(reason)?;
        self.control.destroy();

        tracing::debug!(preload_id = %self.id, reason = %reason, "Destroyed preload session");
        Ok(())
    }

    fn disarm(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    fn transition_to(&mut self, new_state: SessionState) -> Result<()> {
        if !self.state.can_transition_to(new_state) {
            return Err(PreloadError::InvalidTransition {
                from: self.state.to_string(),
                to: new_state.to_string(),
            });
        }

        self.state = new_state;
        Ok(())
    }
}
