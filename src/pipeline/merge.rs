use std::collections::HashMap;
use std::collections::HashSet;

use crate::AppHandle;
use crate::AppId;
use crate::AppMetadata;
use crate::DockEntry;
use crate::EnumerationError;
use crate::WindowInfo;

pub(crate) type WindowOutcome = std::result::Result<Vec<WindowInfo>, EnumerationError>;

/// First-seen order of running applications, kept across passes.
///
/// An application that stops running is forgotten, so a relaunch moves it
/// to the end of the unpinned section.
#[derive(Debug, Default)]
pub(crate) struct LaunchOrder {
    ranks: HashMap<AppId, u64>,
    next_rank: u64,
}

impl LaunchOrder {
    pub(crate) fn observe(
        &mut self,
        running: &[AppHandle],
    ) {
        let alive: HashSet<&AppId> = running.iter().map(|a| &a.id).collect();
        self.ranks.retain(|id, _| alive.contains(id));

        for app in running {
            if !self.ranks.contains_key(&app.id) {
                self.ranks.insert(app.id.clone(), self.next_rank);
                self.next_rank += 1;
            }
        }
    }

    pub(crate) fn rank(
        &self,
        app: &AppId,
    ) -> u64 {
        self.ranks.get(app).copied().unwrap_or(u64::MAX)
    }
}

/// Keeps the first occurrence of every id.
pub(crate) fn dedup_ids(ids: Vec<AppId>) -> Vec<AppId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

pub(crate) fn dedup_apps(apps: Vec<AppHandle>) -> Vec<AppHandle> {
    let mut seen = HashSet::with_capacity(apps.len());
    apps.into_iter().filter(|a| seen.insert(a.id.clone())).collect()
}

/// Builds the dock list; the result depends only on the inputs, never on
/// the order in which enumeration outcomes arrived.
///
/// 1. pinned apps in persisted order, then pinned apps missing from it
/// 2. unpinned running apps by first-seen order
pub(crate) fn merge_entries<M>(
    running: &[AppHandle],
    pinned: &[AppId],
    order: &[AppId],
    outcomes: &HashMap<AppId, WindowOutcome>,
    launch_order: &LaunchOrder,
    metadata: M,
) -> Vec<DockEntry>
where
    M: Fn(&AppId) -> Option<AppMetadata>,
{
    let pinned_set: HashSet<&AppId> = pinned.iter().collect();
    let by_id: HashMap<&AppId, &AppHandle> = running.iter().map(|a| (&a.id, a)).collect();

    let mut placed: HashSet<&AppId> = HashSet::with_capacity(pinned.len());
    let pinned_ordered = order
        .iter()
        .filter(|id| pinned_set.contains(id))
        .chain(pinned.iter())
        .filter(|id| placed.insert(*id))
        .collect::<Vec<_>>();

    let mut entries = Vec::with_capacity(pinned_ordered.len() + running.len());

    for id in pinned_ordered {
        let entry = match by_id.get(id) {
            Some(app) => running_entry(app, true, outcomes.get(id)),
            None => idle_pinned_entry(id, metadata(id)),
        };
        entries.push(entry);
    }

    let mut unpinned: Vec<(usize, &AppHandle)> = running
        .iter()
        .enumerate()
        .filter(|(_, a)| !pinned_set.contains(&a.id))
        .collect();
    unpinned.sort_by_key(|(index, a)| (launch_order.rank(&a.id), *index));

    for (_, app) in unpinned {
        entries.push(running_entry(app, false, outcomes.get(&app.id)));
    }

    entries
}

fn running_entry(
    app: &AppHandle,
    pinned: bool,
    outcome: Option<&WindowOutcome>,
) -> DockEntry {
    let (running, windows) = match outcome {
        Some(Ok(windows)) => (true, windows.clone()),
        Some(Err(e)) => (e.app_reachable(), Vec::new()),
        None => (true, Vec::new()),
    };

    DockEntry {
        id: app.id.clone(),
        display_name: app.display_name.clone(),
        icon: app.icon.clone(),
        pinned,
        running,
        windows,
        notification_count: if running { app.notification_count } else { 0 },
    }
}

fn idle_pinned_entry(
    id: &AppId,
    metadata: Option<AppMetadata>,
) -> DockEntry {
    let (display_name, icon) = match metadata {
        Some(meta) => (meta.display_name, meta.icon),
        None => (id.to_string(), Default::default()),
    };

    DockEntry {
        id: id.clone(),
        display_name,
        icon,
        pinned: true,
        running: false,
        windows: Vec::new(),
        notification_count: 0,
    }
}
