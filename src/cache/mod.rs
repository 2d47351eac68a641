//! Short-lived per-application window list cache.
//!
//! Enumeration workers for different applications hit this concurrently.
//! Every key is replaced atomically: a reader racing a writer sees either the
//! old or the new list, never a mix. Entries older than the TTL are never
//! served; they are evicted on read or by [`SnapshotCache::purge_expired`].
//!
//! Invalidation also fences writers: a list captured before an
//! invalidation is rejected by [`SnapshotCache::put_if_current`], so a slow
//! enumeration can never reinstate windows an event has declared stale.


use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::time::Instant;
use tracing::debug;
use tracing::trace;

use crate::AppId;
use crate::CacheConfig;
use crate::WindowInfo;

/// Captured window list of one application
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry {
    pub(crate) app: AppId,
    pub(crate) windows: Arc<Vec<WindowInfo>>,
    pub(crate) captured_at: Instant,
}

impl CacheEntry {
    fn is_fresh(
        &self,
        now: Instant,
        ttl: Duration,
    ) -> bool {
        now.saturating_duration_since(self.captured_at) < ttl
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Invalidation state observed before an OS call, checked again on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTicket {
    epoch: u64,
    generation: u64,
}

pub struct SnapshotCache {
    entries: DashMap<AppId, CacheEntry>,
    // Bumped by invalidate(app)
    generations: DashMap<AppId, u64>,
    // Bumped by invalidate_all(); lock order is epoch, generations, entries
    epoch: RwLock<u64>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            generations: DashMap::new(),
            epoch: RwLock::new(0),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached list only while it is younger than the TTL.
    pub fn get(
        &self,
        app: &AppId,
    ) -> Option<Vec<WindowInfo>> {
        let now = Instant::now();

        // Shard guard must be released before any removal on the same key
        {
            if let Some(entry) = self.entries.get(app) {
                if entry.is_fresh(now, self.ttl) {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    trace!(%app, "cache hit");
                    return Some(entry.windows.as_ref().clone());
                }
            }
        }

        // A concurrent put may have refreshed the entry in between
        let ttl = self.ttl;
        if self.entries.remove_if(app, |_, e| !e.is_fresh(now, ttl)).is_some() {
            debug!(%app, "evicted expired cache entry");
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Overwrites any entry for `app`, stamped with the current time.
    pub fn put(
        &self,
        app: AppId,
        windows: Vec<WindowInfo>,
    ) {
        trace!(%app, windows = windows.len(), "cache put");
        let entry = CacheEntry {
            app: app.clone(),
            windows: Arc::new(windows),
            captured_at: Instant::now(),
        };
        self.entries.insert(app, entry);
    }

    /// Snapshot of the invalidation state of `app`, taken before the OS call
    /// whose result will be handed to [`SnapshotCache::put_if_current`].
    pub fn ticket(
        &self,
        app: &AppId,
    ) -> CacheTicket {
        let epoch = self.epoch.read();
        let generation = self.generations.get(app).map(|g| *g).unwrap_or(0);
        CacheTicket {
            epoch: *epoch,
            generation,
        }
    }

    /// Stores `windows` only if `app` was not invalidated since `ticket` was
    /// taken. Returns whether the list was stored.
    pub fn put_if_current(
        &self,
        app: AppId,
        windows: Vec<WindowInfo>,
        ticket: CacheTicket,
    ) -> bool {
        let epoch = self.epoch.read();
        if *epoch != ticket.epoch {
            debug!(%app, "cache cleared during enumeration, result not stored");
            return false;
        }

        // Holding the generation slot serializes against invalidate(app)
        let generation = self.generations.entry(app.clone()).or_insert(0);
        if *generation != ticket.generation {
            debug!(%app, "cache entry invalidated during enumeration, result not stored");
            return false;
        }
        self.put(app, windows);
        drop(generation);
        true
    }

    pub fn invalidate(
        &self,
        app: &AppId,
    ) {
        let mut generation = self.generations.entry(app.clone()).or_insert(0);
        *generation += 1;
        if self.entries.remove(app).is_some() {
            debug!(%app, "cache entry invalidated");
        }
    }

    pub fn invalidate_all(&self) {
        let mut epoch = self.epoch.write();
        *epoch += 1;
        let count = self.entries.len();
        self.entries.clear();
        debug!(count, epoch = *epoch, "cache cleared");
    }

    /// Evicts every expired entry, returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, e| {
            let fresh = e.is_fresh(now, ttl);
            if !fresh {
                trace!(app = %e.app, "purging expired entry");
            }
            fresh
        });
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            debug!(purged, "purged expired cache entries");
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }

    #[cfg(test)]
    pub(crate) fn entry(
        &self,
        app: &AppId,
    ) -> Option<CacheEntry> {
        self.entries.get(app).map(|e| e.value().clone())
    }
}
