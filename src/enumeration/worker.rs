use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;
use tracing::instrument;

use super::WindowEnumerator;
use super::WindowFilter;
use crate::AppHandle;
use crate::EnumerationError;
use crate::EnumerationErrorKind;
use crate::SnapshotCache;
use crate::WindowInfo;

/// Produces the filtered window list of one application.
///
/// Safe to run concurrently for distinct applications; the only shared
/// state it touches is the snapshot cache.
pub struct EnumerationWorker<E>
where E: WindowEnumerator
{
    enumerator: Arc<E>,
    cache: Arc<SnapshotCache>,
    filter: WindowFilter,
    timeout: Duration,
}

impl<E> EnumerationWorker<E>
where E: WindowEnumerator
{
    pub fn new(
        enumerator: Arc<E>,
        cache: Arc<SnapshotCache>,
        filter: WindowFilter,
        timeout: Duration,
    ) -> Self {
        Self {
            enumerator,
            cache,
            filter,
            timeout,
        }
    }

    pub fn cache(&self) -> &Arc<SnapshotCache> {
        &self.cache
    }

    /// Cache hit skips the OS call; a miss enumerates, filters and caches.
    ///
    /// A call that outlives the timeout is reported as
    /// [`EnumerationErrorKind::Timeout`] and nothing is cached. A result whose
    /// app was invalidated while the call ran is returned but not cached.
    #[instrument(level = "trace", skip_all, fields(app = %app.id))]
    pub async fn enumerate(
        &self,
        app: &AppHandle,
    ) -> std::result::Result<Vec<WindowInfo>, EnumerationError> {
        if let Some(windows) = self.cache.get(&app.id) {
            return Ok(windows);
        }

        let ticket = self.cache.ticket(&app.id);
        let raw = match timeout(self.timeout, self.enumerator.enumerate_windows_raw(app)).await {
            Ok(result) => result?,
            Err(_) => {
                debug!(app = %app.id, timeout = ?self.timeout, "window enumeration timed out");
                return Err(EnumerationError::new(
                    app.id.clone(),
                    EnumerationErrorKind::Timeout {
                        after: self.timeout,
                    },
                ));
            }
        };

        let windows = self.filter.apply(&app.id, raw);
        if !self.cache.put_if_current(app.id.clone(), windows.clone(), ticket) {
            debug!(app = %app.id, "enumeration superseded by invalidation");
        }
        Ok(windows)
    }
}
