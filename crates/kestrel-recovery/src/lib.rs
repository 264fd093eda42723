//! Kestrel Crash Recovery
//!
//! - Session state is captured after a quiet period following each change
//! - Capture happens on the caller's side; encoding and disk I/O happen on a
//!   single background worker
//! - On cold start a saved snapshot is offered to the user before restoring
//! - A missing or corrupt snapshot means a fresh start, never a crash

mod error;
mod handler;
mod intent;
mod prompt;
mod snapshot;
mod worker;

#[cfg(test)]
mod testing;

pub use error::RecoveryError;
pub use handler::{CrashRecoveryHandler, RecoveryOutcome, DEFAULT_BACKUP_DELAY};
pub use intent::LaunchIntent;
pub use prompt::{RecoveryChoice, RecoveryContext, RecoveryPrompt, SessionRestorer, StateSource};
pub use snapshot::SessionSnapshot;

pub type Result<T> = std::result::Result<T, RecoveryError>;
