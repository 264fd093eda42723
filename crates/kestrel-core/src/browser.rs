//! Browser context
//!
//! One value built at startup that owns the preloader and the crash-recovery
//! handler. Everything that needs either receives a reference to it.

use parking_lot::RwLock;
use std::sync::Arc;

use kestrel_preload::{
    NetworkType, PreloadPolicy, PreloadRequest, PreloadRequestReceiver, PreloadedTabControl,
    Preloader, PreloaderHandle, RouteOutcome,
};
use kestrel_recovery::{
    CrashRecoveryHandler, LaunchIntent, RecoveryOutcome, RecoveryPrompt, SessionRestorer,
    StateSource,
};
use kestrel_storage::{Database, SnapshotFile};
use kestrel_tabs::TabFactory;

use crate::config::Config;
use crate::Result;

pub struct Browser<F: TabFactory> {
    config: Config,
    db: Database,
    preloader: PreloaderHandle<F::Tab>,
    receiver: RwLock<PreloadRequestReceiver<F::Tab>>,
    recovery: CrashRecoveryHandler,
}

impl<F: TabFactory> Browser<F> {
    /// Initialize the browser core.
    ///
    /// Must be called from within a tokio runtime; the preloader and the
    /// recovery worker are spawned onto it.
    pub fn new(config: Config, factory: F, state_source: Arc<dyn StateSource>) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::create_dir_all(&config.state_dir)?;

        let db = Database::open(&config.database_path)?;

        Self::with_database(config, db, factory, state_source)
    }

    pub fn with_database(
        mut config: Config,
        db: Database,
        factory: F,
        state_source: Arc<dyn StateSource>,
    ) -> Result<Self> {
        config.apply_overrides(&db)?;

        let preloader = Preloader::spawn(factory, config.preload_idle_timeout);
        let receiver = PreloadRequestReceiver::new(preloader.clone(), config.preload_policy);

        let store = Arc::new(SnapshotFile::in_dir(&config.state_dir));
        let recovery =
            CrashRecoveryHandler::new(state_source, store, db.clone(), config.backup_debounce);

        // Read the snapshot while the rest of startup proceeds
        recovery.preload_crash_state();

        tracing::info!(
            state_dir = %config.state_dir.display(),
            preload_policy = %config.preload_policy,
            "Browser core initialized"
        );

        Ok(Self {
            config,
            db,
            preloader,
            receiver: RwLock::new(receiver),
            recovery,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn preloader(&self) -> &PreloaderHandle<F::Tab> {
        &self.preloader
    }

    pub fn recovery(&self) -> &CrashRecoveryHandler {
        &self.recovery
    }

    // ==================== Preloading ====================

    /// Route an incoming preload intent
    pub fn handle_preload_intent(&self, request: PreloadRequest, network: NetworkType) -> RouteOutcome {
        self.receiver.read().on_receive(request, network)
    }

    pub fn preload_policy(&self) -> PreloadPolicy {
        self.receiver.read().policy()
    }

    /// Change the preload policy and persist it
    pub fn set_preload_policy(&self, policy: PreloadPolicy) -> Result<()> {
        Config::save_preload_policy(&self.db, policy)?;
        self.receiver.write().set_policy(policy);
        tracing::info!(preload_policy = %policy, "Preload policy changed");
        Ok(())
    }

    /// Claim the preloaded tab for `id`, if one is ready
    pub async fn take_preloaded_tab(&self, id: &str) -> Option<PreloadedTabControl<F::Tab>> {
        self.preloader.get_preloaded_tab(id).await
    }

    // ==================== Crash recovery ====================

    /// Resolve startup: offer to restore a saved session, then start the
    /// browser through `restorer`
    pub async fn start<P, R>(&self, intent: LaunchIntent, prompt: &P, restorer: &R) -> RecoveryOutcome
    where
        P: RecoveryPrompt + ?Sized,
        R: SessionRestorer + ?Sized,
    {
        self.recovery.start_recovery(intent, prompt, restorer).await
    }

    /// Notify the core that the tab model changed
    pub fn on_session_changed(&self) {
        self.recovery.backup_state();
    }

    /// Wait for submitted recovery writes, then stop. Remaining preload
    /// sessions are destroyed once the last preloader handle is gone.
    pub async fn shutdown(self) {
        self.recovery.flush().await;
        tracing::info!("Browser core shut down");
    }
}
