use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::watch;
use tracing::trace;

use crate::DockSnapshot;

/// Single owner of the "last published" snapshot.
///
/// Readers either poll [`SnapshotPublisher::latest`] (lock-free) or hold a
/// [`SnapshotSubscriber`] that is woken on every publish.
pub struct SnapshotPublisher {
    latest: ArcSwap<DockSnapshot>,
    tx: watch::Sender<Arc<DockSnapshot>>,
}

impl SnapshotPublisher {
    pub fn new() -> Self {
        let initial = Arc::new(DockSnapshot::empty());
        let (tx, _rx) = watch::channel(initial.clone());
        Self {
            latest: ArcSwap::new(initial),
            tx,
        }
    }

    /// Replaces the published snapshot as a whole.
    pub(crate) fn publish(
        &self,
        snapshot: Arc<DockSnapshot>,
    ) {
        self.latest.store(snapshot.clone());
        // No subscriber is fine; the value is retained for later ones
        self.tx.send_replace(snapshot);
    }

    pub fn latest(&self) -> Arc<DockSnapshot> {
        self.latest.load_full()
    }

    pub fn subscribe(&self) -> SnapshotSubscriber {
        SnapshotSubscriber::new(self.tx.subscribe())
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer end: yields each newer snapshot once, never an older one.
pub struct SnapshotSubscriber {
    rx: watch::Receiver<Arc<DockSnapshot>>,
    last_seen: u64,
}

impl SnapshotSubscriber {
    fn new(rx: watch::Receiver<Arc<DockSnapshot>>) -> Self {
        let last_seen = rx.borrow().sequence;
        Self { rx, last_seen }
    }

    /// Waits for the next snapshot newer than anything seen so far.
    ///
    /// Returns `None` once the publisher is gone.
    pub async fn next(&mut self) -> Option<Arc<DockSnapshot>> {
        loop {
            if self.rx.changed().await.is_err() {
                return None;
            }
            let snapshot = self.rx.borrow_and_update().clone();
            if self.accept(&snapshot) {
                return Some(snapshot);
            }
        }
    }

    /// Sequence gate for deliveries that arrive by other routes; stale or
    /// repeated snapshots are rejected.
    pub fn accept(
        &mut self,
        snapshot: &DockSnapshot,
    ) -> bool {
        if snapshot.sequence <= self.last_seen {
            trace!(
                sequence = snapshot.sequence,
                last_seen = self.last_seen,
                "discarding superseded snapshot"
            );
            return false;
        }
        self.last_seen = snapshot.sequence;
        true
    }

    pub fn current(&self) -> Arc<DockSnapshot> {
        self.rx.borrow().clone()
    }

    pub fn last_seen(&self) -> u64 {
        self.last_seen
    }
}
