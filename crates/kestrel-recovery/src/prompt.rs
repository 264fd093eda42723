//! Collaborators supplied by the browser shell

use tokio::sync::oneshot;

use crate::intent::LaunchIntent;
use crate::snapshot::SessionSnapshot;
use crate::Result;

/// Reads the live browsing session.
///
/// Called from the backup timer task on an arbitrary runtime thread, not
/// from the thread that owns the tab model. Implementors synchronise their
/// own reads and return an owned snapshot.
pub trait StateSource: Send + Sync + 'static {
    fn capture_state(&self) -> Result<SessionSnapshot>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryChoice {
    Recover,
    Discard,
}

/// What the user is asked about
#[derive(Debug)]
pub struct RecoveryContext<'a> {
    pub snapshot: &'a SessionSnapshot,
    /// The previous recovery was only minutes ago; the browser may be crash looping
    pub recently_recovered: bool,
}

/// Yes/no dialog offering to restore the previous session.
///
/// Dropping the sender without answering (dialog dismissed) counts as
/// [`RecoveryChoice::Discard`].
pub trait RecoveryPrompt {
    fn ask(&self, context: &RecoveryContext<'_>) -> oneshot::Receiver<RecoveryChoice>;
}

/// Session-restore entry point of the browser
pub trait SessionRestorer {
    fn do_start(&self, snapshot: Option<SessionSnapshot>, intent: LaunchIntent);
}
