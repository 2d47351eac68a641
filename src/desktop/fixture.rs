use std::collections::HashSet;

use config::Config;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::AppId;
use crate::Error;
use crate::IconRef;
use crate::Result;
use crate::WindowInfo;

/// Declarative desktop state, used to drive the engine without a real OS.
///
/// ```toml
/// pinned = ["com.apple.Safari", "com.apple.mail"]
///
/// [[apps]]
/// id = "com.apple.Safari"
/// display_name = "Safari"
/// pid = 412
///
/// [[apps.windows]]
/// id = 1
/// title = "Start Page"
/// bounds = { x = 0.0, y = 25.0, width = 1280.0, height = 800.0 }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesktopFixture {
    #[serde(default)]
    pub pinned: Vec<AppId>,

    /// Persisted dock order; defaults to the pinned order
    #[serde(default)]
    pub order: Vec<AppId>,

    #[serde(default)]
    pub apps: Vec<FixtureApp>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureApp {
    pub id: AppId,
    pub display_name: String,

    /// Absent for installed but not running apps
    #[serde(default)]
    pub pid: Option<u32>,

    #[serde(default)]
    pub icon: IconRef,

    #[serde(default)]
    pub notification_count: u32,

    #[serde(default)]
    pub windows: Vec<WindowInfo>,
}

impl DesktopFixture {
    pub fn load(path: &str) -> Result<Self> {
        let fixture: Self = Config::builder()
            .add_source(File::with_name(path).required(true))
            .build()?
            .try_deserialize()?;
        fixture.validate()?;
        Ok(fixture)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for app in &self.apps {
            if !seen.insert(&app.id) {
                return Err(Error::Fixture(format!("duplicate app id {}", app.id)));
            }
        }
        Ok(())
    }
}
