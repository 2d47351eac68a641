//! Update coordinator.
//!
//! Collapses a noisy stream of update requests into a bounded number of
//! recomputation passes:
//!
//! ```text
//! request_update() ──unbounded mpsc──> coordinator loop ──spawn──> RecomputeHandler::recompute
//!                                       │  Debouncer: Idle → Pending → ArmedForced
//!                                       └─ at most one pass in flight (JoinSet)
//! ```
//!
//! Requests that arrive while a pass runs form the next pending cycle, which
//! only fires once the running pass has completed.

mod debouncer;
pub use debouncer::*;


use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::sleep_until;
use tokio::time::Instant;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::trace;

use crate::CoordinatorConfig;
use crate::Result;
use crate::UpdateReason;
use crate::UpdateRequest;

/// What one recomputation pass was triggered by. Diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBatch {
    /// 1-based pass counter of this coordinator
    pub pass: u64,
    /// Distinct reasons in first-arrival order
    pub reasons: Vec<UpdateReason>,
    /// Number of requests coalesced into this pass
    pub requests: usize,
    /// Fired by the anti-starvation ceiling rather than a settled debounce
    pub forced: bool,
}

/// The recomputation callback fired by the coordinator.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RecomputeHandler: Send + Sync + 'static {
    async fn recompute(
        &self,
        batch: UpdateBatch,
    );
}

/// Cheap, cloneable entry point for event sources.
#[derive(Debug, Clone)]
pub struct UpdateRequester {
    tx: mpsc::UnboundedSender<UpdateRequest>,
}

impl UpdateRequester {
    /// Never blocks and never fails; requests after shutdown are dropped.
    pub fn request_update(
        &self,
        reason: impl Into<UpdateReason>,
    ) {
        let request = UpdateRequest::new(reason.into());
        trace!(reason = %request.reason, "update requested");
        if self.tx.send(request).is_err() {
            trace!("update coordinator stopped, request dropped");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub struct UpdateCoordinator<H>
where H: RecomputeHandler
{
    debouncer: Debouncer,
    handler: Arc<H>,
    request_rx: mpsc::UnboundedReceiver<UpdateRequest>,
    pending_reasons: Vec<UpdateReason>,
    in_flight: JoinSet<()>,
    passes: u64,

    // Shutdown signal
    shutdown_signal: watch::Receiver<()>,
}

impl<H> UpdateCoordinator<H>
where H: RecomputeHandler
{
    pub fn new(
        config: &CoordinatorConfig,
        handler: Arc<H>,
        shutdown_signal: watch::Receiver<()>,
    ) -> (Self, UpdateRequester) {
        let (tx, request_rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            debouncer: Debouncer::new(config),
            handler,
            request_rx,
            pending_reasons: Vec::new(),
            in_flight: JoinSet::new(),
            passes: 0,
            shutdown_signal,
        };
        (coordinator, UpdateRequester { tx })
    }

    pub fn state(&self) -> CoordinatorState {
        self.debouncer.state()
    }

    /// Drives the state machine until shutdown or until every requester is
    /// dropped. A pass already running is awaited, never cancelled.
    ///
    /// A due deadline is serviced before any further request is taken, so a
    /// flood of queued requests cannot hold back a forced pass.
    pub async fn run(mut self) -> Result<()> {
        loop {
            if self.in_flight.is_empty() && self.debouncer.is_due(Instant::now()) {
                self.fire();
                continue;
            }

            // Only one pass at a time: the timer is disarmed while one runs
            let (armed, fire_at) = match self.debouncer.next_deadline() {
                Some(deadline) if self.in_flight.is_empty() => (true, deadline),
                _ => (false, Instant::now()),
            };

            tokio::select! {
                biased;
                // P0: shutdown received
                _ = self.shutdown_signal.changed() => {
                    info!("update coordinator: shutdown signal received.");
                    break;
                }

                // P1: running pass completed
                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    if let Err(e) = joined {
                        error!("recomputation pass failed: {:?}", e);
                    } else {
                        trace!("recomputation pass completed");
                    }
                }

                // P2: debounce deadline
                _ = sleep_until(fire_at), if armed => {
                    self.fire();
                }

                // P3: new requests
                request = self.request_rx.recv() => {
                    match request {
                        Some(request) => self.on_request(request),
                        None => {
                            info!("update coordinator: all requesters dropped.");
                            break;
                        }
                    }
                }
            }
        }

        while let Some(joined) = self.in_flight.join_next().await {
            if let Err(e) = joined {
                error!("recomputation pass failed during shutdown: {:?}", e);
            }
        }
        debug!(passes = self.passes, "update coordinator stopped");
        Ok(())
    }

    fn on_request(
        &mut self,
        request: UpdateRequest,
    ) {
        let before = self.debouncer.state();
        let after = self.debouncer.on_request(request.arrived_at);
        if !self.pending_reasons.contains(&request.reason) {
            self.pending_reasons.push(request.reason);
        }
        if before != after {
            debug!(
                ?before,
                ?after,
                coalesced = self.debouncer.coalesced(),
                "coordinator transition"
            );
        }
    }

    fn fire(&mut self) {
        let forced = self.debouncer.state() == CoordinatorState::ArmedForced;
        let requests = self.debouncer.on_fire(Instant::now());
        self.passes += 1;

        let batch = UpdateBatch {
            pass: self.passes,
            reasons: std::mem::take(&mut self.pending_reasons),
            requests,
            forced,
        };
        debug!(
            pass = batch.pass,
            requests = batch.requests,
            forced = batch.forced,
            "firing recomputation"
        );

        let handler = self.handler.clone();
        self.in_flight.spawn(async move { handler.recompute(batch).await });
    }
}
