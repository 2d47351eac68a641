//! Instrumented fakes for timing-sensitive tests.
//!
//! [`RecordingHandler`] stands in for the pipeline behind the coordinator and
//! records when each pass started and finished, plus the highest number of
//! passes ever observed running at once. [`SlowEnumerator`] answers every
//! window query after a fixed latency.

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::AppHandle;
use crate::EnumerationError;
use crate::RecomputeHandler;
use crate::UpdateBatch;
use crate::WindowEnumerator;
use crate::WindowInfo;

pub(crate) struct RecordingHandler {
    work: Duration,
    batches: Mutex<Vec<UpdateBatch>>,
    spans: Mutex<Vec<(Instant, Instant)>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl RecordingHandler {
    pub(crate) fn new(work: Duration) -> Self {
        Self {
            work,
            batches: Mutex::new(Vec::new()),
            spans: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    /// Batches in the order their passes started
    pub(crate) fn batches(&self) -> Vec<UpdateBatch> {
        self.batches.lock().clone()
    }

    pub(crate) fn started(&self) -> usize {
        self.batches.lock().len()
    }

    pub(crate) fn start_times(&self) -> Vec<Instant> {
        self.spans.lock().iter().map(|(start, _)| *start).collect()
    }

    /// (start, end) of every completed pass
    pub(crate) fn spans(&self) -> Vec<(Instant, Instant)> {
        self.spans.lock().clone()
    }

    pub(crate) fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecomputeHandler for RecordingHandler {
    async fn recompute(
        &self,
        batch: UpdateBatch,
    ) {
        let start = Instant::now();
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        self.batches.lock().push(batch);

        if !self.work.is_zero() {
            tokio::time::sleep(self.work).await;
        }

        self.active.fetch_sub(1, Ordering::SeqCst);
        self.spans.lock().push((start, Instant::now()));
    }
}

pub(crate) struct SlowEnumerator {
    latency: Duration,
    windows: Vec<WindowInfo>,
}

impl SlowEnumerator {
    pub(crate) fn new(
        latency: Duration,
        windows: Vec<WindowInfo>,
    ) -> Self {
        Self { latency, windows }
    }
}

#[async_trait]
impl WindowEnumerator for SlowEnumerator {
    async fn enumerate_windows_raw(
        &self,
        _app: &AppHandle,
    ) -> std::result::Result<Vec<WindowInfo>, EnumerationError> {
        tokio::time::sleep(self.latency).await;
        Ok(self.windows.clone())
    }
}
