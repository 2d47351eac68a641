//! Inbound collaborator seams: the OS running-application list and the
//! persisted pin/order store. Both are read-only from the dock core's side.

mod fixture;
mod static_desktop;
pub use fixture::*;
pub use static_desktop::*;


use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::AppId;
use crate::AppHandle;
use crate::AppMetadata;
use crate::Result;

/// Currently running applications, in the order the OS reports them.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AppSource: Send + Sync + 'static {
    async fn current_applications(&self) -> Result<Vec<AppHandle>>;
}

/// Persisted dock state owned by the settings layer.
#[cfg_attr(test, automock)]
pub trait DockStore: Send + Sync + 'static {
    fn pinned_applications(&self) -> Vec<AppId>;

    /// User-arranged order of dock items
    fn persisted_order(&self) -> Vec<AppId>;

    /// Name and icon for an app that may not be running
    fn metadata(
        &self,
        app: &AppId,
    ) -> Option<AppMetadata>;
}
