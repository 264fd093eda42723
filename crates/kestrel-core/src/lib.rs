//! Kestrel Core
//!
//! Wires the browser core together. A single [`Browser`] value, built once
//! at startup, owns the preloader and the crash-recovery handler and is
//! passed to whatever needs them. There is no global instance.

mod browser;
mod config;
mod error;

pub use browser::Browser;
pub use config::Config;
pub use error::CoreError;

// Re-export core components
pub use kestrel_preload::{
    NetworkType, PreloadPolicy, PreloadRequest, PreloadedTabControl, PreloaderHandle,
    RouteOutcome, SubmitOutcome,
};
pub use kestrel_recovery::{
    CrashRecoveryHandler, LaunchIntent, RecoveryChoice, RecoveryContext, RecoveryOutcome,
    RecoveryPrompt, SessionRestorer, SessionSnapshot, StateSource,
};
pub use kestrel_storage::{Database, StorageError};
pub use kestrel_tabs::{BrowserTab, Headers, SearchBox, TabError, TabFactory, TabRecord};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
