//! Dock data model shared by the cache, the enumeration workers and the
//! publishing pipeline.

use std::fmt;
use std::time::SystemTime;

use serde::Deserialize;
use serde::Serialize;
use tokio::time::Instant;

/// Stable application identity (bundle / package id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Opaque icon handle, resolved lazily by the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconRef(pub String);

/// A running application as reported by the OS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppHandle {
    pub id: AppId,
    pub pid: u32,
    pub display_name: String,
    #[serde(default)]
    pub icon: IconRef,
    /// Badge count reported by the OS for this app
    #[serde(default)]
    pub notification_count: u32,
}

/// Display data for an application that is pinned but may not be running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    pub display_name: String,
    #[serde(default)]
    pub icon: IconRef,
}

/// Process-scoped window identifier, stable for the window's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Accessibility subrole of a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowRole {
    #[default]
    Standard,
    Dialog,
    Floating,
    SystemDialog,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub id: WindowId,
    #[serde(default)]
    pub title: String,
    pub bounds: Rect,
    /// Window server level, 0 is the normal application level
    #[serde(default)]
    pub level: i32,
    #[serde(default)]
    pub role: WindowRole,
    #[serde(default)]
    pub minimized: bool,
    #[serde(default = "default_on_screen")]
    pub on_screen: bool,
}

fn default_on_screen() -> bool {
    true
}

impl WindowInfo {
    /// A normal-level, standard, on-screen window.
    pub fn standard(
        id: u32,
        title: impl Into<String>,
        bounds: Rect,
    ) -> Self {
        Self {
            id: WindowId(id),
            title: title.into(),
            bounds,
            level: 0,
            role: WindowRole::Standard,
            minimized: false,
            on_screen: true,
        }
    }
}

/// One row of the published dock list. Never mutated after publication.
#[derive(Debug, Clone, PartialEq)]
pub struct DockEntry {
    pub id: AppId,
    pub display_name: String,
    pub icon: IconRef,
    pub pinned: bool,
    pub running: bool,
    pub windows: Vec<WindowInfo>,
    pub notification_count: u32,
}

/// Immutable, fully formed dock list published as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct DockSnapshot {
    pub entries: Vec<DockEntry>,
    /// Strictly increasing per pipeline; 0 is the pre-first-pass placeholder
    pub sequence: u64,
    pub generated_at: SystemTime,
}

impl DockSnapshot {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            sequence: 0,
            generated_at: SystemTime::now(),
        }
    }

    pub fn entry(
        &self,
        id: &AppId,
    ) -> Option<&DockEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn ids(&self) -> Vec<&AppId> {
        self.entries.iter().map(|e| &e.id).collect()
    }
}

/// Why an update was requested. Diagnostic only, plus cache invalidation hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateReason {
    AppLaunched(AppId),
    AppTerminated(AppId),
    ActivationChanged,
    WindowCreated(AppId),
    WindowDestroyed(AppId),
    WindowMoved,
    SpaceChanged,
    DisplayChanged,
    ManualRefresh,
    Other(String),
}

impl UpdateReason {
    pub fn tag(&self) -> &str {
        match self {
            UpdateReason::AppLaunched(_) => "app_launched",
            UpdateReason::AppTerminated(_) => "app_terminated",
            UpdateReason::ActivationChanged => "activation_changed",
            UpdateReason::WindowCreated(_) => "window_created",
            UpdateReason::WindowDestroyed(_) => "window_destroyed",
            UpdateReason::WindowMoved => "window_moved",
            UpdateReason::SpaceChanged => "space_changed",
            UpdateReason::DisplayChanged => "display_changed",
            UpdateReason::ManualRefresh => "manual_refresh",
            UpdateReason::Other(tag) => tag,
        }
    }
}

impl fmt::Display for UpdateReason {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            UpdateReason::AppLaunched(id)
            | UpdateReason::AppTerminated(id)
            | UpdateReason::WindowCreated(id)
            | UpdateReason::WindowDestroyed(id) => write!(f, "{}({})", self.tag(), id),
            _ => f.write_str(self.tag()),
        }
    }
}

/// Reason strings from event sources that carry no application id.
impl From<&str> for UpdateReason {
    fn from(tag: &str) -> Self {
        match tag {
            "activation_changed" => UpdateReason::ActivationChanged,
            "window_moved" => UpdateReason::WindowMoved,
            "space_changed" => UpdateReason::SpaceChanged,
            "display_changed" => UpdateReason::DisplayChanged,
            "manual_refresh" => UpdateReason::ManualRefresh,
            other => UpdateReason::Other(other.to_string()),
        }
    }
}

/// A single coalescing event, consumed by the coordinator's batching.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub reason: UpdateReason,
    pub arrived_at: Instant,
}

impl UpdateRequest {
    pub fn new(reason: UpdateReason) -> Self {
        Self {
            reason,
            arrived_at: Instant::now(),
        }
    }
}
