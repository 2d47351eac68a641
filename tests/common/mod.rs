use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::timeout;
use windock::AppHandle;
use windock::AppId;
use windock::AppMetadata;
use windock::DockConfig;
use windock::DockEngine;
use windock::DockSnapshot;
use windock::IconRef;
use windock::Rect;
use windock::SnapshotSubscriber;
use windock::StaticDesktop;
use windock::WindowInfo;

pub type TestEngine = DockEngine<StaticDesktop, StaticDesktop, StaticDesktop>;

// Longest a single pass may take in these scenarios: floor + debounce + enumeration timeout
pub const PASS_DEADLINE: Duration = Duration::from_secs(5);

pub fn start_engine(
    config: &DockConfig,
    desktop: &Arc<StaticDesktop>,
) -> (TestEngine, watch::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let engine = DockEngine::start(
        config,
        desktop.clone(),
        desktop.clone(),
        desktop.clone(),
        shutdown_rx,
    );
    (engine, shutdown_tx)
}

pub async fn next_snapshot(subscriber: &mut SnapshotSubscriber) -> Arc<DockSnapshot> {
    timeout(PASS_DEADLINE, subscriber.next())
        .await
        .expect("no snapshot published in time")
        .expect("publisher dropped")
}

pub fn running(
    id: &str,
    pid: u32,
) -> AppHandle {
    AppHandle {
        id: AppId::from(id),
        pid,
        display_name: id.to_string(),
        icon: IconRef(format!("{id}.png")),
        notification_count: 0,
    }
}

pub fn metadata(name: &str) -> AppMetadata {
    AppMetadata {
        display_name: name.to_string(),
        icon: IconRef(format!("{name}.png")),
    }
}

pub fn standard_windows(ids: &[u32]) -> Vec<WindowInfo> {
    ids.iter()
        .map(|id| WindowInfo::standard(*id, format!("window {id}"), Rect::new(10.0, 10.0, 640.0, 480.0)))
        .collect()
}

pub fn entry_ids(snapshot: &DockSnapshot) -> Vec<String> {
    snapshot.entries.iter().map(|e| e.id.to_string()).collect()
}
