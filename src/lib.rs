//! Dock core: keeps a desktop dock's entry list in sync with a noisy stream of
//! OS application and window events.
//!
//! Event sources call [`DockEngine::request_update`]; the
//! [`UpdateCoordinator`] collapses bursts into a bounded number of
//! recomputation passes; each pass fans out one [`EnumerationWorker`] per
//! running application (backed by the short-lived [`SnapshotCache`]), merges
//! the results deterministically and publishes a numbered [`DockSnapshot`].

mod cache;
mod config;
mod coordinator;
mod desktop;
mod engine;
mod enumeration;
mod errors;
mod pipeline;
mod types;
pub mod utils;

pub use cache::*;
pub use config::*;
pub use coordinator::*;
pub use desktop::*;
pub use engine::*;
pub use enumeration::*;
pub use errors::*;
pub use pipeline::*;
pub use types::*;


//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
