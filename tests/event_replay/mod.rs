//! Replays desktop event sequences against a running engine and checks the
//! published dock lists.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tokio::time::Instant;
use windock::AppId;
use windock::DockConfig;
use windock::EnumerationErrorKind;
use windock::Rect;
use windock::StaticDesktop;
use windock::UpdateReason;
use windock::WindowInfo;
use windock::WindowRole;

use crate::common::entry_ids;
use crate::common::metadata;
use crate::common::next_snapshot;
use crate::common::running;
use crate::common::standard_windows;
use crate::common::start_engine;

fn office_desktop() -> Arc<StaticDesktop> {
    let desktop = Arc::new(StaticDesktop::new());
    desktop.pin(AppId::from("mail"), metadata("Mail"));
    desktop.pin(AppId::from("browser"), metadata("Browser"));
    desktop.set_order(vec![AppId::from("browser"), AppId::from("mail")]);
    desktop.launch(running("browser", 100), standard_windows(&[1, 2]));
    desktop
}

#[tokio::test(start_paused = true)]
async fn app_lifecycle_is_reflected_in_order() {
    let desktop = office_desktop();
    let (engine, _shutdown) = start_engine(&DockConfig::default(), &desktop);
    let mut subscriber = engine.subscribe();

    engine.request_update(UpdateReason::ManualRefresh);
    let first = next_snapshot(&mut subscriber).await;
    assert_eq!(entry_ids(&first), vec!["browser", "mail"]);
    assert!(!first.entries[1].running);

    desktop.launch(running("terminal", 200), standard_windows(&[7]));
    engine.request_update(UpdateReason::AppLaunched(AppId::from("terminal")));
    let second = next_snapshot(&mut subscriber).await;
    assert_eq!(entry_ids(&second), vec!["browser", "mail", "terminal"]);

    desktop.launch(running("mail", 300), standard_windows(&[11]));
    desktop.launch(running("notes", 400), standard_windows(&[12]));
    engine.request_update(UpdateReason::AppLaunched(AppId::from("mail")));
    engine.request_update(UpdateReason::AppLaunched(AppId::from("notes")));
    let third = next_snapshot(&mut subscriber).await;
    assert_eq!(entry_ids(&third), vec!["browser", "mail", "terminal", "notes"]);
    assert!(third.entries[1].running);
    assert_eq!(third.entries[1].windows.len(), 1);

    desktop.quit(&AppId::from("terminal"));
    engine.request_update(UpdateReason::AppTerminated(AppId::from("terminal")));
    let fourth = next_snapshot(&mut subscriber).await;
    assert_eq!(entry_ids(&fourth), vec!["browser", "mail", "notes"]);

    assert!(first.sequence < second.sequence);
    assert!(second.sequence < third.sequence);
    assert!(third.sequence < fourth.sequence);
}

#[tokio::test(start_paused = true)]
async fn window_policy_applies_end_to_end() {
    let desktop = Arc::new(StaticDesktop::new());
    let mut dialog = WindowInfo::standard(2, "Save", Rect::new(0.0, 0.0, 400.0, 200.0));
    dialog.role = WindowRole::Dialog;
    let mut palette = WindowInfo::standard(3, "Colors", Rect::new(0.0, 0.0, 200.0, 300.0));
    palette.role = WindowRole::Floating;
    let tooltip = WindowInfo::standard(4, "", Rect::new(0.0, 0.0, 30.0, 12.0));
    let mut overlay = WindowInfo::standard(5, "Overlay", Rect::new(0.0, 0.0, 900.0, 900.0));
    overlay.level = 25;
    let mut minimized = WindowInfo::standard(6, "Draft", Rect::new(0.0, 0.0, 800.0, 600.0));
    minimized.minimized = true;

    let editor_windows = vec![
        WindowInfo::standard(1, "main.rs", Rect::new(0.0, 0.0, 1200.0, 800.0)),
        dialog,
        palette,
        tooltip.clone(),
        overlay,
        minimized,
    ];
    desktop.launch(running("editor", 1), editor_windows);
    desktop.launch(running("menubar-tool", 2), vec![tooltip]);

    let mut config = DockConfig::default();
    config.filter.bypass_apps = vec![AppId::from("menubar-tool")];
    let (engine, _shutdown) = start_engine(&config, &desktop);
    let mut subscriber = engine.subscribe();

    engine.request_update(UpdateReason::ManualRefresh);
    let snapshot = next_snapshot(&mut subscriber).await;

    let editor = snapshot.entry(&AppId::from("editor")).unwrap();
    let kept: Vec<u32> = editor.windows.iter().map(|w| w.id.0).collect();
    assert_eq!(kept, vec![1, 2, 6]);

    let tool = snapshot.entry(&AppId::from("menubar-tool")).unwrap();
    assert_eq!(tool.windows.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failing_and_hung_apps_do_not_block_the_dock() {
    let desktop = office_desktop();
    desktop.launch(running("frozen", 500), standard_windows(&[21]));
    desktop.launch(running("locked", 600), standard_windows(&[22]));
    desktop.set_enumeration_delay(&AppId::from("frozen"), Duration::from_secs(3600));
    desktop.fail_enumeration(&AppId::from("locked"), EnumerationErrorKind::PermissionDenied);

    let mut config = DockConfig::default();
    config.enumeration.timeout_ms = 250;
    let (engine, _shutdown) = start_engine(&config, &desktop);
    let mut subscriber = engine.subscribe();
    let started = Instant::now();

    engine.request_update(UpdateReason::ManualRefresh);
    let snapshot = next_snapshot(&mut subscriber).await;

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(entry_ids(&snapshot), vec!["browser", "mail", "frozen", "locked"]);
    for id in ["frozen", "locked"] {
        let entry = snapshot.entry(&AppId::from(id)).unwrap();
        assert!(entry.running);
        assert!(entry.windows.is_empty());
    }
    assert_eq!(snapshot.entry(&AppId::from("browser")).unwrap().windows.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn sustained_event_stream_keeps_publishing() {
    let desktop = office_desktop();
    let (engine, _shutdown) = start_engine(&DockConfig::default(), &desktop);

    // 40 requests, 30ms apart: never settles, the ceiling must still force passes
    for _ in 0..40 {
        engine.request_update(UpdateReason::WindowMoved);
        sleep(Duration::from_millis(30)).await;
    }
    let during = engine.latest().sequence;
    sleep(Duration::from_secs(2)).await;
    let after = engine.latest().sequence;

    // 1.2s of events with a 500ms floor
    assert!(during >= 2, "only {during} passes during the stream");
    assert!(during <= 3, "{during} passes exceed the floor");
    assert!(after >= during);
    assert!(after <= during + 1);
}

#[tokio::test(start_paused = true)]
async fn requests_after_shutdown_are_ignored() {
    let desktop = office_desktop();
    let (engine, shutdown) = start_engine(&DockConfig::default(), &desktop);
    let mut subscriber = engine.subscribe();
    engine.request_update(UpdateReason::ManualRefresh);
    let published = next_snapshot(&mut subscriber).await;

    shutdown.send(()).unwrap();
    sleep(Duration::from_millis(10)).await;
    engine.request_update(UpdateReason::ManualRefresh);
    sleep(Duration::from_secs(2)).await;

    assert_eq!(engine.latest().sequence, published.sequence);
    engine.join().await;
}
