//! Background persistence worker
//!
//! Jobs run one at a time in submission order, which makes the worker the
//! only writer of the snapshot file. Blocking work goes through
//! `spawn_blocking` so the async runtime never waits on disk.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use kestrel_storage::{ReadOutcome, SnapshotStore};

use crate::snapshot::SessionSnapshot;
use crate::Result;

pub(crate) enum Job {
    Write(SessionSnapshot),
    Clear,
    Read(oneshot::Sender<LoadedState>),
    Flush(oneshot::Sender<()>),
}

/// Result of reading the snapshot at startup
#[derive(Debug)]
pub(crate) enum LoadedState {
    Missing,
    Corrupt,
    Found(SessionSnapshot),
}

pub(crate) fn spawn(store: Arc<dyn SnapshotStore>) -> mpsc::UnboundedSender<Job> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(run(store, rx));
    tx
}

async fn run(store: Arc<dyn SnapshotStore>, mut jobs: mpsc::UnboundedReceiver<Job>) {
    while let Some(job) = jobs.recv().await {
        match job {
            Job::Write(snapshot) => {
                let tab_count = snapshot.tab_count();
                match blocking(store.clone(), move |store| write_state(store, &snapshot)).await {
                    Ok(()) => tracing::debug!(tab_count, "Saved session state"),
                    Err(e) => tracing::warn!(error = %e, "Failed to save session state"),
                }
            }
            Job::Clear => {
                if let Err(e) = blocking(store.clone(), |store| Ok(store.clear()?)).await {
                    tracing::warn!(error = %e, "Failed to clear session state");
                }
            }
            Job::Read(reply) => {
                let state = blocking(store.clone(), |store| Ok(load_state(store)))
                    .await
                    .unwrap_or(LoadedState::Missing);
                let _ = reply.send(state);
            }
            Job::Flush(reply) => {
                let _ = reply.send(());
            }
        }
    }

    tracing::debug!("Recovery worker stopped");
}

async fn blocking<T, F>(store: Arc<dyn SnapshotStore>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn SnapshotStore) -> Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || f(store.as_ref())).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "Recovery I/O task panicked");
            Err(crate::RecoveryError::WorkerStopped)
        }
    }
}

fn write_state(store: &dyn SnapshotStore, snapshot: &SessionSnapshot) -> Result<()> {
    if snapshot.is_empty() {
        store.clear()?;
        return Ok(());
    }

    let bytes = snapshot.to_bytes()?;
    store.write(&bytes)?;
    Ok(())
}

fn load_state(store: &dyn SnapshotStore) -> LoadedState {
    let bytes = match store.read() {
        Ok(ReadOutcome::Found(bytes)) => bytes,
        Ok(ReadOutcome::NotFound) => return LoadedState::Missing,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read session state");
            return LoadedState::Corrupt;
        }
    };

    match SessionSnapshot::from_bytes(&bytes) {
        Ok(snapshot) if snapshot.is_empty() => LoadedState::Missing,
        Ok(snapshot) => LoadedState::Found(snapshot),
        Err(e) => {
            tracing::warn!(error = %e, bytes = bytes.len(), "Failed to recover state");
            LoadedState::Corrupt
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{snapshot_with, MemoryStore};

    #[tokio::test]
    async fn test_write_then_read() {
        let store = MemoryStore::new();
        let worker = spawn(store.clone());

        worker.send(Job::Write(snapshot_with(2))).unwrap();
        let (tx, rx) = oneshot::channel();
        worker.send(Job::Read(tx)).unwrap();

        match rx.await.unwrap() {
            LoadedState::Found(snapshot) => assert_eq!(snapshot.tab_count(), 2),
            other => panic!("unexpected state: {other:?}"),
        }
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_empty_snapshot_clears() {
        let store = MemoryStore::new();
        let worker = spawn(store.clone());

        worker.send(Job::Write(snapshot_with(1))).unwrap();
        worker.send(Job::Write(SessionSnapshot::empty())).unwrap();
        let (tx, rx) = oneshot::channel();
        worker.send(Job::Read(tx)).unwrap();

        assert!(matches!(rx.await.unwrap(), LoadedState::Missing));
        assert_eq!(store.writes(), 1);
        assert!(store.contents().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_and_unreadable() {
        let store = MemoryStore::with_contents(b"{\"tabs\": [tru".to_vec());
        let worker = spawn(store.clone());

        let (tx, rx) = oneshot::channel();
        worker.send(Job::Read(tx)).unwrap();
        assert!(matches!(rx.await.unwrap(), LoadedState::Corrupt));

        store.fail_io(true);
        let (tx, rx) = oneshot::channel();
        worker.send(Job::Read(tx)).unwrap();
        assert!(matches!(rx.await.unwrap(), LoadedState::Corrupt));
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let store = MemoryStore::new();
        store.fail_io(true);
        let worker = spawn(store.clone());

        worker.send(Job::Write(snapshot_with(1))).unwrap();
        let (tx, rx) = oneshot::channel();
        worker.send(Job::Flush(tx)).unwrap();
        rx.await.unwrap();

        // Worker is still alive after the failure
        store.fail_io(false);
        worker.send(Job::Write(snapshot_with(1))).unwrap();
        let (tx, rx) = oneshot::channel();
        worker.send(Job::Flush(tx)).unwrap();
        rx.await.unwrap();
        assert_eq!(store.writes(), 1);
    }
}
