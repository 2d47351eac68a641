use std::collections::HashSet;

use tracing::trace;

use crate::AppId;
use crate::FilterConfig;
use crate::WindowInfo;
use crate::WindowRole;

/// Window validity policy.
///
/// Two independent rules: size/level and kind. Applications on the bypass
/// list are known to use odd levels and subroles for their real windows and
/// skip both.
#[derive(Debug, Clone)]
pub struct WindowFilter {
    min_width: f64,
    min_height: f64,
    allowed_levels: HashSet<i32>,
    bypass_apps: HashSet<AppId>,
}

impl WindowFilter {
    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            min_width: config.min_width,
            min_height: config.min_height,
            allowed_levels: config.allowed_levels.iter().copied().collect(),
            bypass_apps: config.bypass_apps.iter().cloned().collect(),
        }
    }

    pub fn bypasses(
        &self,
        app: &AppId,
    ) -> bool {
        self.bypass_apps.contains(app)
    }

    pub fn passes_size_and_level(
        &self,
        window: &WindowInfo,
    ) -> bool {
        window.bounds.width >= self.min_width
            && window.bounds.height >= self.min_height
            && self.allowed_levels.contains(&window.level)
    }

    pub fn passes_kind(
        &self,
        window: &WindowInfo,
    ) -> bool {
        matches!(window.role, WindowRole::Standard | WindowRole::Dialog)
    }

    /// Keeps valid windows in their original order and drops repeated ids.
    pub fn apply(
        &self,
        app: &AppId,
        windows: Vec<WindowInfo>,
    ) -> Vec<WindowInfo> {
        let bypass = self.bypasses(app);
        let mut seen = HashSet::with_capacity(windows.len());
        let total = windows.len();

        let kept: Vec<WindowInfo> = windows
            .into_iter()
            .filter(|w| bypass || (self.passes_size_and_level(w) && self.passes_kind(w)))
            .filter(|w| seen.insert(w.id))
            .collect();

        trace!(%app, total, kept = kept.len(), bypass, "filtered windows");
        kept
    }
}

impl Default for WindowFilter {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}
