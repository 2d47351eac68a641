use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::trace;

use super::AppSource;
use super::DesktopFixture;
use super::DockStore;
use crate::AppHandle;
use crate::AppId;
use crate::AppMetadata;
use crate::EnumerationError;
use crate::EnumerationErrorKind;
use crate::Error;
use crate::Result;
use crate::WindowEnumerator;
use crate::WindowInfo;

#[derive(Default)]
struct DesktopState {
    running: Vec<AppHandle>,
    windows: HashMap<AppId, Vec<WindowInfo>>,
    failures: HashMap<AppId, EnumerationErrorKind>,
    delays: HashMap<AppId, Duration>,
    pinned: Vec<AppId>,
    order: Vec<AppId>,
    metadata: HashMap<AppId, AppMetadata>,
    app_source_failure: Option<String>,
}

/// In-memory desktop: app list, pin store and window source in one.
///
/// Mutable at runtime so event sequences (launch, quit, window changes,
/// OS failures, slow apps) can be replayed against the engine.
#[derive(Default)]
pub struct StaticDesktop {
    state: RwLock<DesktopState>,
    enumeration_calls: AtomicUsize,
}

impl StaticDesktop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: DesktopFixture) -> Self {
        let desktop = Self::new();
        {
            let mut state = desktop.state.write();
            state.order = if fixture.order.is_empty() {
                fixture.pinned.clone()
            } else {
                fixture.order
            };
            state.pinned = fixture.pinned;

            for app in fixture.apps {
                state.metadata.insert(
                    app.id.clone(),
                    AppMetadata {
                        display_name: app.display_name.clone(),
                        icon: app.icon.clone(),
                    },
                );
                if let Some(pid) = app.pid {
                    state.running.push(AppHandle {
                        id: app.id.clone(),
                        pid,
                        display_name: app.display_name,
                        icon: app.icon,
                        notification_count: app.notification_count,
                    });
                    state.windows.insert(app.id, app.windows);
                }
            }
        }
        desktop
    }

    pub fn launch(
        &self,
        app: AppHandle,
        windows: Vec<WindowInfo>,
    ) {
        let mut state = self.state.write();
        state.running.retain(|a| a.id != app.id);
        state.windows.insert(app.id.clone(), windows);
        state.metadata.entry(app.id.clone()).or_insert_with(|| AppMetadata {
            display_name: app.display_name.clone(),
            icon: app.icon.clone(),
        });
        state.running.push(app);
    }

    pub fn quit(
        &self,
        app: &AppId,
    ) {
        let mut state = self.state.write();
        state.running.retain(|a| &a.id != app);
        state.windows.remove(app);
    }

    pub fn set_windows(
        &self,
        app: &AppId,
        windows: Vec<WindowInfo>,
    ) {
        self.state.write().windows.insert(app.clone(), windows);
    }

    pub fn pin(
        &self,
        app: AppId,
        metadata: AppMetadata,
    ) {
        let mut state = self.state.write();
        if !state.pinned.contains(&app) {
            state.pinned.push(app.clone());
        }
        state.metadata.insert(app, metadata);
    }

    pub fn set_order(
        &self,
        order: Vec<AppId>,
    ) {
        self.state.write().order = order;
    }

    /// Subsequent enumerations of `app` fail with `kind`
    pub fn fail_enumeration(
        &self,
        app: &AppId,
        kind: EnumerationErrorKind,
    ) {
        self.state.write().failures.insert(app.clone(), kind);
    }

    pub fn clear_failure(
        &self,
        app: &AppId,
    ) {
        self.state.write().failures.remove(app);
    }

    /// Subsequent enumerations of `app` take `delay` before answering
    pub fn set_enumeration_delay(
        &self,
        app: &AppId,
        delay: Duration,
    ) {
        self.state.write().delays.insert(app.clone(), delay);
    }

    pub fn fail_app_source(
        &self,
        reason: Option<String>,
    ) {
        self.state.write().app_source_failure = reason;
    }

    /// Number of raw enumeration calls served so far
    pub fn enumeration_calls(&self) -> usize {
        self.enumeration_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AppSource for StaticDesktop {
    async fn current_applications(&self) -> Result<Vec<AppHandle>> {
        let state = self.state.read();
        if let Some(reason) = &state.app_source_failure {
            return Err(Error::AppSource(reason.clone()));
        }
        Ok(state.running.clone())
    }
}

impl DockStore for StaticDesktop {
    fn pinned_applications(&self) -> Vec<AppId> {
        self.state.read().pinned.clone()
    }

    fn persisted_order(&self) -> Vec<AppId> {
        self.state.read().order.clone()
    }

    fn metadata(
        &self,
        app: &AppId,
    ) -> Option<AppMetadata> {
        self.state.read().metadata.get(app).cloned()
    }
}

#[async_trait]
impl WindowEnumerator for StaticDesktop {
    async fn enumerate_windows_raw(
        &self,
        app: &AppHandle,
    ) -> std::result::Result<Vec<WindowInfo>, EnumerationError> {
        self.enumeration_calls.fetch_add(1, Ordering::SeqCst);

        // Guard must not be held across the simulated latency
        let (delay, outcome) = {
            let state = self.state.read();
            let delay = state.delays.get(&app.id).copied();
            let outcome = if let Some(kind) = state.failures.get(&app.id) {
                Err(EnumerationError::new(app.id.clone(), kind.clone()))
            } else if !state.running.iter().any(|a| a.id == app.id) {
                Err(EnumerationError::new(
                    app.id.clone(),
                    EnumerationErrorKind::ProcessGone,
                ))
            } else {
                Ok(state.windows.get(&app.id).cloned().unwrap_or_default())
            };
            (delay, outcome)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        trace!(app = %app.id, ok = outcome.is_ok(), "static enumeration served");
        outcome
    }
}
