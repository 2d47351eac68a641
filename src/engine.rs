//! Composition root of the dock core.
//!
//! ```text
//! event sources ──request_update()──> cache invalidation ──> UpdateRequester
//!                                                               │
//!                            UpdateCoordinator task <───────────┘
//!                                    │ fire
//!                                    ▼
//!      DockPipeline::recompute ──> EnumerationWorker ──> SnapshotCache
//!                                    │
//!                                    ▼
//!                           SnapshotPublisher ──> subscribers
//! ```
//!
//! Two background tasks run until the shutdown signal: the coordinator loop
//! and the periodic purge of expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use tracing::error;
use tracing::info;

use crate::utils::async_task::spawn_task;
use crate::AppSource;
use crate::DockConfig;
use crate::DockPipeline;
use crate::DockSnapshot;
use crate::DockStore;
use crate::EnumerationWorker;
use crate::Result;
use crate::SnapshotCache;
use crate::SnapshotSubscriber;
use crate::UpdateCoordinator;
use crate::UpdateReason;
use crate::UpdateRequester;
use crate::WindowEnumerator;
use crate::WindowFilter;

pub struct DockEngine<A, S, E>
where
    A: AppSource,
    S: DockStore,
    E: WindowEnumerator,
{
    pipeline: Arc<DockPipeline<A, S, E>>,
    cache: Arc<SnapshotCache>,
    requester: UpdateRequester,
    handles: Vec<JoinHandle<()>>,
}

impl<A, S, E> DockEngine<A, S, E>
where
    A: AppSource,
    S: DockStore,
    E: WindowEnumerator,
{
    /// Wires every component and spawns the background tasks.
    ///
    /// Must be called from within a tokio runtime. `config` is expected to be
    /// validated already.
    pub fn start(
        config: &DockConfig,
        app_source: Arc<A>,
        store: Arc<S>,
        enumerator: Arc<E>,
        shutdown_signal: watch::Receiver<()>,
    ) -> Self {
        let cache = Arc::new(SnapshotCache::from_config(&config.cache));
        let worker = Arc::new(EnumerationWorker::new(
            enumerator,
            cache.clone(),
            WindowFilter::from_config(&config.filter),
            config.enumeration.timeout(),
        ));
        let pipeline = Arc::new(DockPipeline::new(
            app_source,
            store,
            worker,
            config.enumeration.max_concurrency,
        ));

        let (coordinator, requester) =
            UpdateCoordinator::new(&config.coordinator, pipeline.clone(), shutdown_signal.clone());

        let mut handles = Vec::with_capacity(2);
        spawn_task("update_coordinator", move || coordinator.run(), Some(&mut handles));

        let purge_cache = cache.clone();
        let purge_interval = config.cache.purge_interval();
        spawn_task(
            "cache_purge",
            move || purge_expired_entries(purge_cache, purge_interval, shutdown_signal),
            Some(&mut handles),
        );

        info!(?config, "dock engine started");
        Self {
            pipeline,
            cache,
            requester,
            handles,
        }
    }

    /// Signals that something on the desktop may have changed.
    ///
    /// Invalidates the cache entries the reason makes stale, then hands the
    /// request to the coordinator. Never blocks.
    pub fn request_update(
        &self,
        reason: impl Into<UpdateReason>,
    ) {
        let reason = reason.into();
        match &reason {
            UpdateReason::AppTerminated(app)
            | UpdateReason::WindowCreated(app)
            | UpdateReason::WindowDestroyed(app) => self.cache.invalidate(app),
            UpdateReason::ManualRefresh | UpdateReason::DisplayChanged | UpdateReason::SpaceChanged => {
                self.cache.invalidate_all()
            }
            _ => {}
        }
        self.requester.request_update(reason);
    }

    pub fn subscribe(&self) -> SnapshotSubscriber {
        self.pipeline.subscribe()
    }

    pub fn latest(&self) -> Arc<DockSnapshot> {
        self.pipeline.latest()
    }

    pub fn cache(&self) -> &Arc<SnapshotCache> {
        &self.cache
    }

    pub fn pipeline(&self) -> &Arc<DockPipeline<A, S, E>> {
        &self.pipeline
    }

    /// Waits for the background tasks, which only end after shutdown.
    pub async fn join(mut self) {
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                error!("dock engine task panicked: {:?}", e);
            }
        }
        debug!("dock engine stopped");
    }
}

async fn purge_expired_entries(
    cache: Arc<SnapshotCache>,
    period: Duration,
    mut shutdown_signal: watch::Receiver<()>,
) -> Result<()> {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = shutdown_signal.changed() => {
                info!("cache purge: shutdown signal received.");
                break;
            }
            _ = ticker.tick() => {
                cache.purge_expired();
            }
        }
    }
    Ok(())
}
