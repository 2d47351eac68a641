use crate::AppHandle;
use crate::AppId;
use crate::IconRef;
use crate::Rect;
use crate::WindowInfo;

/// Running application handle with a name derived from its id
pub(crate) fn app(
    id: &str,
    pid: u32,
) -> AppHandle {
    let display_name = id.rsplit('.').next().unwrap_or(id).to_string();
    AppHandle {
        id: AppId::from(id),
        pid,
        icon: IconRef(format!("{display_name}.icns")),
        display_name,
        notification_count: 0,
    }
}

/// Standard 800x600 window titled `w<id>`
pub(crate) fn window(id: u32) -> WindowInfo {
    WindowInfo::standard(id, format!("w{id}"), Rect::new(0.0, 0.0, 800.0, 600.0))
}

pub(crate) fn windows(ids: &[u32]) -> Vec<WindowInfo> {
    ids.iter().map(|id| window(*id)).collect()
}
