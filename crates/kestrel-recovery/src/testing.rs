//! Test doubles for the recovery collaborators

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;

use kestrel_storage::{ReadOutcome, SnapshotStore, StorageError};
use kestrel_tabs::TabRecord;

use crate::intent::LaunchIntent;
use crate::prompt::{RecoveryChoice, RecoveryContext, RecoveryPrompt, SessionRestorer, StateSource};
use crate::snapshot::SessionSnapshot;
use crate::{RecoveryError, Result};

pub fn snapshot_with(tab_count: usize) -> SessionSnapshot {
    let tabs = (0..tab_count)
        .map(|i| TabRecord::new(format!("https://example.com/{i}")).unwrap())
        .collect();
    SessionSnapshot::new(tabs, None)
}

#[derive(Default)]
pub struct MemoryStore {
    contents: Mutex<Option<Vec<u8>>>,
    writes: AtomicUsize,
    fail: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_contents(bytes: Vec<u8>) -> Arc<Self> {
        let store = Self::default();
        *store.contents.lock() = Some(bytes);
        Arc::new(store)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.contents.lock().clone()
    }

    pub fn fail_io(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> kestrel_storage::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        Ok(())
    }
}

impl SnapshotStore for MemoryStore {
    fn write(&self, bytes: &[u8]) -> kestrel_storage::Result<()> {
        self.check()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.contents.lock() = Some(bytes.to_vec());
        Ok(())
    }

    fn read(&self) -> kestrel_storage::Result<ReadOutcome> {
        self.check()?;
        Ok(match self.contents.lock().clone() {
            Some(bytes) => ReadOutcome::Found(bytes),
            None => ReadOutcome::NotFound,
        })
    }

    fn clear(&self) -> kestrel_storage::Result<()> {
        self.check()?;
        self.contents.lock().take();
        Ok(())
    }
}

/// Live session whose size tests can change between captures
#[derive(Default)]
pub struct CountingSource {
    pub tab_count: AtomicUsize,
    pub captures: AtomicUsize,
    pub fail: AtomicBool,
}

impl StateSource for CountingSource {
    fn capture_state(&self) -> Result<SessionSnapshot> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(RecoveryError::Capture("tab strip unavailable".to_string()));
        }
        Ok(snapshot_with(self.tab_count.load(Ordering::SeqCst)))
    }
}

/// Answers with a fixed choice; `None` dismisses the dialog
pub struct ScriptedPrompt {
    choice: Option<RecoveryChoice>,
    pub asked: AtomicUsize,
    pub recently_recovered: AtomicBool,
}

impl ScriptedPrompt {
    pub fn new(choice: Option<RecoveryChoice>) -> Self {
        Self {
            choice,
            asked: AtomicUsize::new(0),
            recently_recovered: AtomicBool::new(false),
        }
    }

    pub fn asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

impl RecoveryPrompt for ScriptedPrompt {
    fn ask(&self, context: &RecoveryContext<'_>) -> oneshot::Receiver<RecoveryChoice> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.recently_recovered
            .store(context.recently_recovered, Ordering::SeqCst);

        let (tx, rx) = oneshot::channel();
        if let Some(choice) = self.choice {
            let _ = tx.send(choice);
        }
        rx
    }
}

#[derive(Default)]
pub struct RecordingRestorer {
    pub starts: Mutex<Vec<(Option<SessionSnapshot>, LaunchIntent)>>,
}

impl RecordingRestorer {
    pub fn single_start(&self) -> (Option<SessionSnapshot>, LaunchIntent) {
        let starts = self.starts.lock();
        assert_eq!(starts.len(), 1, "expected exactly one start");
        starts[0].clone()
    }
}

impl SessionRestorer for RecordingRestorer {
    fn do_start(&self, snapshot: Option<SessionSnapshot>, intent: LaunchIntent) {
        self.starts.lock().push((snapshot, intent));
    }
}
