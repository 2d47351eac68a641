//! Per-application window enumeration.
//!
//! [`WindowEnumerator`] is the raw OS boundary (window list plus accessibility
//! walk). [`EnumerationWorker`] wraps it with the snapshot cache, a timeout and
//! the [`WindowFilter`] validity policy.

mod filter;
mod worker;
pub use filter::*;
pub use worker::*;


use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::AppHandle;
use crate::EnumerationError;
use crate::WindowInfo;

/// The expensive OS query: every window currently owned by `app`.
///
/// Returning an empty list is the normal "no windows" answer; errors are
/// reserved for the OS call itself failing.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WindowEnumerator: Send + Sync + 'static {
    async fn enumerate_windows_raw(
        &self,
        app: &AppHandle,
    ) -> std::result::Result<Vec<WindowInfo>, EnumerationError>;
}
