//! Dock pipeline: one full recomputation pass.
//!
//! ```text
//! candidates = running ∪ pinned
//!      │
//!      ├─ EnumerationWorker(app₁) ─┐
//!      ├─ EnumerationWorker(app₂) ─┤  fan-out / fan-in, completion order irrelevant
//!      └─ EnumerationWorker(appₙ) ─┘
//!                                  ▼
//!                     merge_entries() ──> DockSnapshot(seq+1) ──> SnapshotPublisher
//! ```
//!
//! Passes are totally ordered: the publish path state (sequence counter,
//! launch order) sits behind an async mutex held for the whole pass.

mod merge;
mod publisher;
pub(crate) use merge::*;
pub use publisher::*;


use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use futures::stream;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::AppHandle;
use crate::AppId;
use crate::AppSource;
use crate::DockSnapshot;
use crate::DockStore;
use crate::EnumerationWorker;
use crate::RecomputeHandler;
use crate::UpdateBatch;
use crate::WindowEnumerator;

struct PassState {
    next_sequence: u64,
    launch_order: LaunchOrder,
}

pub struct DockPipeline<A, S, E>
where
    A: AppSource,
    S: DockStore,
    E: WindowEnumerator,
{
    app_source: Arc<A>,
    store: Arc<S>,
    worker: Arc<EnumerationWorker<E>>,
    max_concurrency: usize,
    publisher: SnapshotPublisher,
    pass_state: Mutex<PassState>,
}

impl<A, S, E> DockPipeline<A, S, E>
where
    A: AppSource,
    S: DockStore,
    E: WindowEnumerator,
{
    /// `max_concurrency == 0` runs one enumeration per running application.
    pub fn new(
        app_source: Arc<A>,
        store: Arc<S>,
        worker: Arc<EnumerationWorker<E>>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            app_source,
            store,
            worker,
            max_concurrency,
            publisher: SnapshotPublisher::new(),
            pass_state: Mutex::new(PassState {
                next_sequence: 1,
                launch_order: LaunchOrder::default(),
            }),
        }
    }

    pub fn publisher(&self) -> &SnapshotPublisher {
        &self.publisher
    }

    pub fn latest(&self) -> Arc<DockSnapshot> {
        self.publisher.latest()
    }

    pub fn subscribe(&self) -> SnapshotSubscriber {
        self.publisher.subscribe()
    }

    /// Runs a full pass and publishes its snapshot.
    ///
    /// Never fails: per-app enumeration errors degrade that app to an empty
    /// window list, and a failing app source degrades to pinned apps only.
    pub async fn recompute(&self) -> Arc<DockSnapshot> {
        let started = Instant::now();
        let mut pass = self.pass_state.lock().await;

        let running = match self.app_source.current_applications().await {
            Ok(apps) => dedup_apps(apps),
            Err(e) => {
                warn!("listing running applications failed, showing pinned apps only: {:?}", e);
                Vec::new()
            }
        };
        let pinned = dedup_ids(self.store.pinned_applications());
        let order = self.store.persisted_order();
        pass.launch_order.observe(&running);

        let outcomes = self.enumerate_all(&running).await;

        let entries = merge_entries(
            &running,
            &pinned,
            &order,
            &outcomes,
            &pass.launch_order,
            |id| self.store.metadata(id),
        );

        let snapshot = Arc::new(DockSnapshot {
            entries,
            sequence: pass.next_sequence,
            generated_at: SystemTime::now(),
        });
        pass.next_sequence += 1;
        self.publisher.publish(snapshot.clone());

        info!(
            sequence = snapshot.sequence,
            entries = snapshot.entries.len(),
            running = running.len(),
            elapsed = ?started.elapsed(),
            "published dock snapshot"
        );
        snapshot
    }

    async fn enumerate_all(
        &self,
        running: &[AppHandle],
    ) -> HashMap<AppId, WindowOutcome> {
        let limit = match self.max_concurrency {
            0 => running.len().max(1),
            cap => cap,
        };

        let outcomes: HashMap<_, _> = stream::iter(running.to_vec())
            .map(|app| {
                let worker = self.worker.clone();
                async move {
                    let outcome = worker.enumerate(&app).await;
                    (app.id, outcome)
                }
            })
            .buffer_unordered(limit)
            .collect()
            .await;

        for (app, outcome) in &outcomes {
            if let Err(e) = outcome {
                warn!(%app, reachable = e.app_reachable(), "window enumeration failed: {}", e);
            }
        }
        debug!(apps = outcomes.len(), "enumeration fan-in complete");
        outcomes
    }
}

#[async_trait]
impl<A, S, E> RecomputeHandler for DockPipeline<A, S, E>
where
    A: AppSource,
    S: DockStore,
    E: WindowEnumerator,
{
    async fn recompute(
        &self,
        batch: UpdateBatch,
    ) {
        let reasons: Vec<String> = batch.reasons.iter().map(|r| r.to_string()).collect();
        debug!(
            pass = batch.pass,
            requests = batch.requests,
            forced = batch.forced,
            ?reasons,
            "recomputation triggered"
        );
        DockPipeline::recompute(self).await;
    }
}
