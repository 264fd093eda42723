//! Preload session registry
//!
//! The registry runs as a single task that owns every session. All requests,
//! including idle-timer expiries, arrive on one channel and are applied in
//! arrival order, so no locking is needed around the session map.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

use kestrel_runtime::ScheduledTask;
use kestrel_tabs::{BrowserTab, Headers, TabFactory};

use crate::control::PreloadedTabControl;
use crate::session::PreloadSession;
use crate::state::SessionState;

/// How long an untouched preload session lives
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

enum Command<T: BrowserTab> {
    Preload {
        id: String,
        url: String,
        headers: Headers,
        search_box_query: Option<String>,
    },
    Discard {
        id: String,
    },
    CancelSearchBox {
        id: String,
    },
    Take {
        id: String,
        reply: oneshot::Sender<Option<PreloadedTabControl<T>>>,
    },
    Count {
        reply: oneshot::Sender<usize>,
    },
    Expire {
        id: String,
        generation: u64,
    },
}

pub struct Preloader<F: TabFactory> {
    factory: F,
    idle_timeout: Duration,
    sessions: HashMap<String, PreloadSession<F::Tab>>,
    commands: mpsc::UnboundedReceiver<Command<F::Tab>>,
    /// Weak so pending timers do not keep the registry alive
    timers: mpsc::WeakUnboundedSender<Command<F::Tab>>,
    next_generation: u64,
}

impl<F: TabFactory> Preloader<F> {
    /// Start the registry task on the current tokio runtime.
    ///
    /// The task stops, destroying any remaining sessions, once every
    /// [`PreloaderHandle`] has been dropped.
    pub fn spawn(factory: F, idle_timeout: Duration) -> PreloaderHandle<F::Tab> {
        let (tx, rx) = mpsc::unbounded_channel();

        let preloader = Self {
            factory,
            idle_timeout,
            sessions: HashMap::new(),
            commands: rx,
            timers: tx.downgrade(),
            next_generation: 0,
        };

        tokio::spawn(preloader.run());

        tracing::info!(idle_timeout_ms = idle_timeout.as_millis() as u64, "Preloader started");

        PreloaderHandle { tx }
    }

    async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            self.handle(command);
        }

        let remaining: Vec<String> = self.sessions.keys().cloned().collect();
        for id in remaining {
            self.teardown(&id, SessionState::Discarded);
        }

        tracing::info!("Preloader stopped");
    }

    fn handle(&mut self, command: Command<F::Tab>) {
        match command {
            Command::Preload {
                id,
                url,
                headers,
                search_box_query,
            } => self.handle_preload_request(id, url, headers, search_box_query),
            Command::Discard { id } => {
                if !self.teardown(&id, SessionState::Discarded) {
                    tracing::trace!(preload_id = %id, "Discard for unknown preload");
                }
            }
            Command::CancelSearchBox { id } => match self.sessions.get_mut(&id) {
                Some(session) => {
                    session.control_mut().search_box_cancel();
                }
                None => tracing::trace!(preload_id = %id, "Search box cancel for unknown preload"),
            },
            Command::Take { id, reply } => {
                let control = self.take(&id);
                if let Err(Some(mut control)) = reply.send(control) {
                    // Caller gave up waiting; nobody else will destroy the tab
                    tracing::debug!(preload_id = %id, "Preloaded tab unclaimed, destroying");
                    control.destroy();
                }
            }
            Command::Count { reply } => {
                let _ = reply.send(self.sessions.len());
            }
            Command::Expire { id, generation } => {
                let idle = self
                    .sessions
                    .get(&id)
                    .filter(|session| session.is_current(generation))
                    .map(|session| session.last_touched().elapsed());

                if let Some(idle) = idle {
                    tracing::info!(
                        preload_id = %id,
                        idle_ms = idle.as_millis() as u64,
                        "Preload session timed out"
                    );
                    self.teardown(&id, SessionState::Expired);
                } else {
                    tracing::trace!(preload_id = %id, generation, "Ignoring stale expiry");
                }
            }
        }
    }

    fn handle_preload_request(
        &mut self,
        id: String,
        url: String,
        headers: Headers,
        search_box_query: Option<String>,
    ) {
        if !self.sessions.contains_key(&id) {
            let tab = match self.factory.create_tab() {
                Ok(tab) => tab,
                Err(e) => {
                    tracing::warn!(preload_id = %id, error = %e, "Failed to create preload tab");
                    return;
                }
            };

            tracing::info!(preload_id = %id, url = %url, "Created preload session");
            self.sessions
                .insert(id.clone(), PreloadSession::new(id.clone(), tab));
        } else {
            tracing::debug!(preload_id = %id, url = %url, "Touched preload session");
        }

        let generation = self.bump_generation();
        let timer = self.schedule_expiry(&id, generation);

        let Some(session) = self.sessions.get_mut(&id) else {
            return;
        };
        if let Err(e) = session.arm(generation, timer) {
            tracing::error!(preload_id = %id, error = %e, "Failed to touch preload session");
            return;
        }

        let control = session.control_mut();
        match search_box_query {
            Some(query) => {
                control.load_url_if_changed(&url, &headers);
                control.set_query(&query);
            }
            None => control.load_url(&url, &headers),
        }
    }

    /// Remove the session and hand back its tab; the timer dies with the removal
    fn take(&mut self, id: &str) -> Option<PreloadedTabControl<F::Tab>> {
        let session = match self.sessions.remove(id) {
            Some(session) => session,
            None => {
                tracing::debug!(preload_id = %id, "No preloaded tab");
                return None;
            }
        };

        match session.consume() {
            Ok(control) => Some(control),
            Err(e) => {
                tracing::error!(preload_id = %id, error = %e, "Failed to consume preload session");
                None
            }
        }
    }

    /// The single teardown path for discards, expiries and shutdown
    fn teardown(&mut self, id: &str, reason: SessionState) -> bool {
        let Some(session) = self.sessions.remove(id) else {
            return false;
        };

        if let Err(e) = session.destroy(reason) {
            tracing::error!(preload_id = %id, error = %e, "Failed to destroy preload session");
        }

        true
    }

    fn bump_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    fn schedule_expiry(&self, id: &str, generation: u64) -> ScheduledTask {
        let timers = self.timers.clone();
        let id = id.to_string();

        ScheduledTask::after(self.idle_timeout, move || {
            if let Some(tx) = timers.upgrade() {
                let _ = tx.send(Command::Expire { id, generation });
            }
        })
    }
}

/// Cloneable entry point to the preload registry.
///
/// None of the operations fail for an unknown id: requests can race with
/// timeouts, so callers must tolerate misses.
pub struct PreloaderHandle<T: BrowserTab> {
    tx: mpsc::UnboundedSender<Command<T>>,
}

impl<T: BrowserTab> PreloaderHandle<T> {
    /// Preload `url` under `id`, reusing the session if one exists
    pub fn handle_preload_request(
        &self,
        id: impl Into<String>,
        url: impl Into<String>,
        headers: Headers,
        search_box_query: Option<String>,
    ) {
        self.send(Command::Preload {
            id: id.into(),
            url: url.into(),
            headers,
            search_box_query,
        });
    }

    /// Destroy the session for `id`, if any
    pub fn discard_preload(&self, id: impl Into<String>) {
        self.send(Command::Discard { id: id.into() });
    }

    pub fn cancel_search_box_preload(&self, id: impl Into<String>) {
        self.send(Command::CancelSearchBox { id: id.into() });
    }

    /// Remove the session for `id` and take its tab. `None` on a miss.
    pub async fn get_preloaded_tab(&self, id: impl Into<String>) -> Option<PreloadedTabControl<T>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Take {
            id: id.into(),
            reply,
        });
        rx.await.ok().flatten()
    }

    /// Number of live sessions
    pub async fn active_sessions(&self) -> usize {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Count { reply });
        rx.await.unwrap_or(0)
    }

    fn send(&self, command: Command<T>) {
        if self.tx.send(command).is_err() {
            tracing::warn!("Preloader has shut down; request dropped");
        }
    }
}

impl<T: BrowserTab> Clone for PreloaderHandle<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}
