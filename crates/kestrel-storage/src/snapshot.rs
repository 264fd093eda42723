//! Crash-recovery snapshot file
//!
//! The snapshot is an opaque byte blob. Writes land in a journal file first and
//! are renamed over the real file, so a reader sees either the previous
//! snapshot or the new one, never a partial write.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::Result;

/// Well-known name of the snapshot file inside the state directory
pub const STATE_FILE: &str = "browser_state.snapshot";

const JOURNAL_SUFFIX: &str = ".journal";

/// Result of reading the snapshot; absence is not an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Found(Vec<u8>),
    NotFound,
}

/// Byte-oriented persistence for the recovery snapshot
pub trait SnapshotStore: Send + Sync + 'static {
    fn write(&self, bytes: &[u8]) -> Result<()>;

    fn read(&self) -> Result<ReadOutcome>;

    /// Remove the snapshot; succeeds when there is nothing to remove
    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
    journal: PathBuf,
}

impl SnapshotFile {
    /// Snapshot file named [`STATE_FILE`] inside `dir`
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self::at(dir.as_ref().join(STATE_FILE))
    }

    pub fn at(path: PathBuf) -> Self {
        let mut journal = path.clone().into_os_string();
        journal.push(JOURNAL_SUFFIX);

        Self {
            path,
            journal: PathBuf::from(journal),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for SnapshotFile {
    fn write(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.journal, bytes)?;
        fs::rename(&self.journal, &self.path)?;

        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "Wrote snapshot");
        Ok(())
    }

    fn read(&self) -> Result<ReadOutcome> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(ReadOutcome::Found(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ReadOutcome::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<()> {
        for path in [&self.path, &self.journal] {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        tracing::debug!(path = %self.path.display(), "Cleared snapshot");
        Ok(())
    }
}
