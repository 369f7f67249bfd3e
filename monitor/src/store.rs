use crate::model::{SensorSnapshot, SnapshotUpdate};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::trace;

/// Shared handle to the session's sensor snapshot.
///
/// Cloning the store yields another handle to the same snapshot. Merges
/// run under the channel's write lock, so readers never observe a
/// partially applied update, and every merge wakes subscribers.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    tx: Arc<watch::Sender<SensorSnapshot>>,
}

impl SnapshotStore {
    pub fn new(initial: SensorSnapshot) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> SensorSnapshot {
        *self.tx.borrow()
    }

    /// Receiver that is notified after every merge
    pub fn subscribe(&self) -> watch::Receiver<SensorSnapshot> {
        self.tx.subscribe()
    }

    /// Merges the present fields of `update` into the snapshot. No validation
    /// is applied; this is also the override hook for trusted callers.
    pub fn update(&self, update: SnapshotUpdate) -> SensorSnapshot {
        self.update_with(|_| update)
    }

    /// Computes the update from the current snapshot and merges it in one
    /// step, so concurrent writers cannot interleave between read and write.
    pub fn update_with<F>(&self, f: F) -> SensorSnapshot
    where
        F: FnOnce(&SensorSnapshot) -> SnapshotUpdate,
    {
        let mut merged = SensorSnapshot::default();
        self.tx.send_modify(|current| {
            let update = f(current);
            *current = current.merged(&update);
            merged = *current;
        });
        trace!("Snapshot merged: {:?}", merged);
        merged
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(SensorSnapshot::default())
    }
}
