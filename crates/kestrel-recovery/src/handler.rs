//! Crash recovery handler
//!
//! Owns the debounced backup pipeline and the cold-start restore decision.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

use kestrel_runtime::Debouncer;
use kestrel_storage::{Database, SnapshotStore};

use crate::error::RecoveryError;
use crate::intent::LaunchIntent;
use crate::prompt::{RecoveryChoice, RecoveryContext, RecoveryPrompt, SessionRestorer, StateSource};
use crate::worker::{self, Job, LoadedState};

/// Quiet period before a backup is written
pub const DEFAULT_BACKUP_DELAY: Duration = Duration::from_millis(500);

/// Settings key holding the time of the last accepted recovery
const LAST_RECOVERED_KEY: &str = "last_recovered";

/// Recoveries closer together than this suggest a crash loop
const PROMPT_INTERVAL_MINUTES: i64 = 5;

/// How startup resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// Nothing usable on disk
    Fresh,
    /// User chose to restore the previous session
    Restored,
    /// User declined; the snapshot was deleted
    Discarded,
}

pub struct CrashRecoveryHandler {
    source: Arc<dyn StateSource>,
    db: Database,
    debouncer: Debouncer,
    worker: mpsc::UnboundedSender<Job>,
    preloaded: Mutex<Option<oneshot::Receiver<LoadedState>>>,
}

impl CrashRecoveryHandler {
    /// Create the handler and start its background worker on the current
    /// tokio runtime.
    pub fn new(
        source: Arc<dyn StateSource>,
        store: Arc<dyn SnapshotStore>,
        db: Database,
        backup_delay: Duration,
    ) -> Self {
        Self {
            source,
            db,
            debouncer: Debouncer::new(backup_delay),
            worker: worker::spawn(store),
            preloaded: Mutex::new(None),
        }
    }

    /// Request a backup of the current session state.
    ///
    /// Calls within the backup delay collapse into one write, captured when
    /// the delay after the last call elapses.
    pub fn backup_state(&self) {
        let source = Arc::clone(&self.source);
        let worker = self.worker.clone();

        self.debouncer.call(move || {
            let snapshot = match source.capture_state() {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to capture session state");
                    return;
                }
            };

            if worker.send(Job::Write(snapshot)).is_err() {
                tracing::warn!("Recovery worker stopped; backup dropped");
            }
        });
    }

    /// Forget any saved state, including a backup still waiting to be written
    pub fn clear_state(&self) {
        self.debouncer.cancel();
        self.submit(Job::Clear);
    }

    /// Start reading the saved snapshot in the background ahead of
    /// [`start_recovery`](Self::start_recovery)
    pub fn preload_crash_state(&self) {
        let mut preloaded = self.preloaded.lock();
        if preloaded.is_some() {
            return;
        }

        let (tx, rx) = oneshot::channel();
        if self.submit(Job::Read(tx)) {
            *preloaded = Some(rx);
        }
    }

    /// Decide how the browser starts.
    ///
    /// Without a usable snapshot the browser starts fresh and the user is not
    /// asked. With one, the user chooses between restoring it and discarding it.
    pub async fn start_recovery<P, R>(
        &self,
        intent: LaunchIntent,
        prompt: &P,
        restorer: &R,
    ) -> RecoveryOutcome
    where
        P: RecoveryPrompt + ?Sized,
        R: SessionRestorer + ?Sized,
    {
        let snapshot = match self.load_crash_state().await {
            LoadedState::Found(snapshot) => snapshot,
            LoadedState::Missing => {
                tracing::info!("No saved session, starting fresh");
                self.forget_last_recovery();
                restorer.do_start(None, intent);
                return RecoveryOutcome::Fresh;
            }
            LoadedState::Corrupt => {
                tracing::warn!("Saved session unreadable, starting fresh");
                self.forget_last_recovery();
                restorer.do_start(None, intent);
                return RecoveryOutcome::Fresh;
            }
        };

        let context = RecoveryContext {
            snapshot: &snapshot,
            recently_recovered: self.recently_recovered(),
        };
        let choice = prompt
            .ask(&context)
            .await
            .unwrap_or(RecoveryChoice::Discard);

        match choice {
            RecoveryChoice::Recover => {
                tracing::info!(tab_count = snapshot.tab_count(), "Restoring saved session");
                self.remember_recovery();
                restorer.do_start(Some(snapshot), intent);
                RecoveryOutcome::Restored
            }
            RecoveryChoice::Discard => {
                tracing::info!("Saved session discarded by user");
                self.clear_state();
                restorer.do_start(None, intent);
                RecoveryOutcome::Discarded
            }
        }
    }

    /// Wait until every job already handed to the worker has finished
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.submit(Job::Flush(tx)) {
            let _ = rx.await;
        }
    }

    pub fn backup_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    async fn load_crash_state(&self) -> LoadedState {
        let pending = self.preloaded.lock().take();

        let rx = match pending {
            Some(rx) => rx,
            None => {
                let (tx, rx) = oneshot::channel();
                if !self.submit(Job::Read(tx)) {
                    return LoadedState::Missing;
                }
                rx
            }
        };

        rx.await.unwrap_or(LoadedState::Missing)
    }

    fn submit(&self, job: Job) -> bool {
        match self.worker.send(job) {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(error = %RecoveryError::WorkerStopped, "Recovery job dropped");
                false
            }
        }
    }

    fn recently_recovered(&self) -> bool {
        let last = match self.db.get_setting(LAST_RECOVERED_KEY) {
            Ok(Some(value)) => value,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read last recovery time");
                return false;
            }
        };

        DateTime::parse_from_rfc3339(&last)
            .map(|dt| {
                Utc::now() - dt.with_timezone(&Utc)
                    < ChronoDuration::minutes(PROMPT_INTERVAL_MINUTES)
            })
            .unwrap_or(false)
    }

    fn remember_recovery(&self) {
        if let Err(e) = self
            .db
            .set_setting(LAST_RECOVERED_KEY, &Utc::now().to_rfc3339())
        {
            tracing::warn!(error = %e, "Failed to record recovery time");
        }
    }

    fn forget_last_recovery(&self) {
        if let Err(e) = self.db.remove_setting(LAST_RECOVERED_KEY) {
            tracing::warn!(error = %e, "Failed to reset recovery time");
        }
    }
}
