use std::io::Write;
use std::sync::Arc;

use tempfile::Builder;
use tempfile::NamedTempFile;
use windock::AppId;
use windock::DesktopFixture;
use windock::DockConfig;
use windock::Error;
use windock::StaticDesktop;
use windock::UpdateReason;
use windock::WindowRole;

use crate::common::entry_ids;
use crate::common::next_snapshot;
use crate::common::start_engine;

const FIXTURE: &str = r#"
pinned = ["com.apple.Safari", "com.apple.mail", "com.apple.Notes"]
order = ["com.apple.mail", "com.apple.Safari"]

[[apps]]
id = "com.apple.Safari"
display_name = "Safari"
pid = 412
icon = "safari.icns"

[[apps.windows]]
id = 1
title = "Start Page"
bounds = { x = 0.0, y = 25.0, width = 1280.0, height = 800.0 }

[[apps.windows]]
id = 2
title = "Downloads"
role = "floating"
bounds = { x = 0.0, y = 0.0, width = 300.0, height = 400.0 }

[[apps]]
id = "com.apple.mail"
display_name = "Mail"
icon = "mail.icns"

[[apps]]
id = "com.apple.Notes"
display_name = "Notes"

[[apps]]
id = "com.apple.Terminal"
display_name = "Terminal"
pid = 530
notification_count = 2

[[apps.windows]]
id = 9
title = "zsh"
role = "dialog"
bounds = { x = 40.0, y = 40.0, width = 700.0, height = 500.0 }
"#;

fn write_fixture(content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn fixture_parses_apps_and_windows() {
    let file = write_fixture(FIXTURE);

    let fixture = DesktopFixture::load(file.path().to_str().unwrap()).unwrap();

    assert_eq!(fixture.pinned.len(), 3);
    assert_eq!(fixture.apps.len(), 4);
    assert_eq!(fixture.apps[0].windows[1].role, WindowRole::Floating);
    assert_eq!(fixture.apps[3].pid, Some(530));
    assert!(fixture.apps[1].pid.is_none());
}

#[test]
fn duplicate_app_ids_are_rejected() {
    let file = write_fixture(
        r#"
[[apps]]
id = "dup"
display_name = "One"

[[apps]]
id = "dup"
display_name = "Two"
"#,
    );

    let result = DesktopFixture::load(file.path().to_str().unwrap());

    assert!(matches!(result, Err(Error::Fixture(_))));
}

#[test]
fn missing_fixture_file_is_an_error() {
    assert!(DesktopFixture::load("/definitely/not/here.toml").is_err());
}

#[tokio::test(start_paused = true)]
async fn engine_runs_on_a_fixture_desktop() {
    let file = write_fixture(FIXTURE);
    let fixture = DesktopFixture::load(file.path().to_str().unwrap()).unwrap();
    let desktop = Arc::new(StaticDesktop::from_fixture(fixture));

    let (engine, _shutdown) = start_engine(&DockConfig::default(), &desktop);
    let mut subscriber = engine.subscribe();
    engine.request_update(UpdateReason::ManualRefresh);
    let snapshot = next_snapshot(&mut subscriber).await;

    // Notes is pinned but missing from the persisted order
    assert_eq!(
        entry_ids(&snapshot),
        vec!["com.apple.mail", "com.apple.Safari", "com.apple.Notes", "com.apple.Terminal"]
    );

    let mail = snapshot.entry(&AppId::from("com.apple.mail")).unwrap();
    assert_eq!(mail.display_name, "Mail");
    assert!(mail.pinned && !mail.running);

    let safari = snapshot.entry(&AppId::from("com.apple.Safari")).unwrap();
    assert_eq!(safari.windows.len(), 1);
    assert_eq!(safari.windows[0].title, "Start Page");

    let terminal = snapshot.entry(&AppId::from("com.apple.Terminal")).unwrap();
    assert!(!terminal.pinned);
    assert_eq!(terminal.notification_count, 2);
    assert_eq!(terminal.windows.len(), 1);
}
