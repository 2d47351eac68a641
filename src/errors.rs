//! Dock Core Error Hierarchy
//!
//! Per-application enumeration failures are recoverable and never abort a
//! recomputation pass; everything else is an infrastructure failure of the
//! process hosting the dock core.

use std::time::Duration;

use config::ConfigError;

use crate::AppId;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration loading failures (file parsing, env overrides)
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Window enumeration failure for a single application
    #[error(transparent)]
    Enumeration(#[from] EnumerationError),

    /// Log directory or file setup
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The running-application query failed
    #[error("Application source failed: {0}")]
    AppSource(String),

    /// Desktop fixture could not be loaded
    #[error("Fixture error: {0}")]
    Fixture(String),

    /// The update coordinator task is no longer running
    #[error("Update coordinator stopped")]
    CoordinatorStopped,

    #[error("{0}")]
    SignalSenderClosed(String),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

/// Failure of the raw OS window query for one application.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Window enumeration for {app} failed: {kind}")]
pub struct EnumerationError {
    pub app: AppId,
    pub kind: EnumerationErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnumerationErrorKind {
    /// Accessibility / screen-recording permission missing
    #[error("permission denied")]
    PermissionDenied,

    /// The owning process exited between listing and querying
    #[error("process gone")]
    ProcessGone,

    /// The OS call did not answer within the configured bound
    #[error("timed out after {after:?}")]
    Timeout { after: Duration },

    /// Any other OS-level failure
    #[error("os error {code}: {message}")]
    Os { code: i32, message: String },
}

impl EnumerationError {
    pub fn new(
        app: AppId,
        kind: EnumerationErrorKind,
    ) -> Self {
        Self { app, kind }
    }

    /// Whether the application itself was still alive when the query failed.
    ///
    /// Only a vanished process means the app is no longer running; every
    /// other failure leaves it running with an unknown window set.
    pub fn app_reachable(&self) -> bool {
        !matches!(self.kind, EnumerationErrorKind::ProcessGone)
    }
}
