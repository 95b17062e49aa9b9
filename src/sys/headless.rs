//! In-memory window system.
//!
//! Backs the test suite and the `mosaic` binary. Geometry requests apply
//! immediately and are logged so callers can inspect what the layout engine
//! asked for.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::geometry::{Point, Rect};
use crate::common::collections::HashSet;
use crate::common::config::{LayoutSettings, TabPlacement};
use crate::model::{
    Entity, Monitors, Pointer, SettingsProvider, Storage, Tags, Windows, World, WorkspaceId,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSpec {
    pub rect: Rect,
    pub workspace: WorkspaceId,
    pub class: String,
    pub title: String,
    pub tilable: bool,
}

impl Default for WindowSpec {
    fn default() -> Self {
        WindowSpec {
            rect: Rect::new(0, 0, 640, 480),
            workspace: WorkspaceId::default(),
            class: String::new(),
            title: String::new(),
            tilable: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WindowState {
    pub rect: Rect,
    pub workspace: WorkspaceId,
    pub class: String,
    pub title: String,
    pub tilable: bool,
    pub minimized: bool,
    pub maximized: bool,
    pub visible: bool,
    pub tags: Tags,
}

impl From<WindowSpec> for WindowState {
    fn from(spec: WindowSpec) -> Self {
        WindowState {
            rect: spec.rect,
            workspace: spec.workspace,
            class: spec.class,
            title: spec.title,
            tilable: spec.tilable,
            minimized: false,
            maximized: false,
            visible: true,
            tags: Tags::empty(),
        }
    }
}

#[derive(Default)]
pub struct HeadlessWindowSystem {
    world: World,
    windows: Storage<WindowState>,
    monitors: Vec<Rect>,
    ignored_workspaces: HashSet<u32>,
    /// Most recently focused last.
    focus_history: Vec<Entity>,
    cursor: Point,
    active_workspace: u32,
    settings: LayoutSettings,
    moves: Vec<(Entity, Rect)>,
}

impl HeadlessWindowSystem {
    pub fn new() -> Self { Self::default() }

    pub fn with_settings(settings: LayoutSettings) -> Self {
        HeadlessWindowSystem { settings, ..Self::default() }
    }

    pub fn settings(&self) -> &LayoutSettings { &self.settings }

    pub fn set_settings(&mut self, settings: LayoutSettings) { self.settings = settings }

    pub fn add_monitor(&mut self, work_area: Rect) -> u32 {
        self.monitors.push(work_area);
        (self.monitors.len() - 1) as u32
    }

    pub fn set_work_area(&mut self, monitor: u32, work_area: Rect) {
        if let Some(area) = self.monitors.get_mut(monitor as usize) {
            *area = work_area;
        }
    }

    pub fn ignore_workspaces_on(&mut self, monitor: u32) { self.ignored_workspaces.insert(monitor); }

    pub fn spawn(&mut self, spec: WindowSpec) -> Entity {
        let entity = self.world.create();
        self.windows.insert(entity, spec.into());
        entity
    }

    pub fn destroy(&mut self, window: Entity) {
        self.windows.remove(window);
        self.focus_history.retain(|&w| w != window);
        self.world.delete(window);
    }

    pub fn focus(&mut self, window: Entity) {
        if !self.windows.contains(window) {
            return;
        }
        self.focus_history.retain(|&w| w != window);
        self.focus_history.push(window);
    }

    pub fn set_cursor(&mut self, cursor: Point) { self.cursor = cursor }

    pub fn set_active_workspace(&mut self, workspace: u32) { self.active_workspace = workspace }

    /// Changes geometry as if the user had dragged the window.
    pub fn set_rect(&mut self, window: Entity, rect: Rect) {
        self.windows.with(window, |state| state.rect = rect);
    }

    pub fn set_minimized(&mut self, window: Entity, minimized: bool) {
        self.windows.with(window, |state| state.minimized = minimized);
    }

    pub fn set_maximized(&mut self, window: Entity, maximized: bool) {
        self.windows.with(window, |state| state.maximized = maximized);
    }

    pub fn set_tilable(&mut self, window: Entity, tilable: bool) {
        self.windows.with(window, |state| state.tilable = tilable);
    }

    pub fn state(&self, window: Entity) -> Option<&WindowState> { self.windows.get(window) }

    pub fn is_visible(&self, window: Entity) -> bool {
        self.windows.get(window).is_some_and(|state| state.visible)
    }

    pub fn windows(&self) -> impl Iterator<Item = Entity> + '_ { self.world.iter() }

    /// Geometry requests made since the last call.
    pub fn take_moves(&mut self) -> Vec<(Entity, Rect)> { std::mem::take(&mut self.moves) }
}

impl Windows for HeadlessWindowSystem {
    fn all_windows(&self) -> Vec<Entity> { self.world.iter().collect() }

    fn rect(&self, window: Entity) -> Option<Rect> { self.windows.get(window).map(|s| s.rect) }

    /// Applies `rect`. A window whose center lands on another monitor moves
    /// to that monitor, keeping its workspace index.
    fn move_window(&mut self, window: Entity, rect: Rect) {
        let monitor = self.monitors.iter().position(|area| area.contains(rect.center()));
        let moved = self.windows.with(window, |state| {
            state.rect = rect;
            if let Some(monitor) = monitor {
                state.workspace.monitor = monitor as u32;
            }
        });
        if moved.is_some() {
            trace!(?window, ?rect, "move");
            self.moves.push((window, rect));
        }
    }

    fn exists(&self, window: Entity) -> bool { self.windows.contains(window) }

    fn is_tilable(&self, window: Entity) -> bool {
        self.windows.get(window).is_some_and(|s| s.tilable && !s.tags.contains(Tags::FLOATING))
    }

    fn is_minimized(&self, window: Entity) -> bool {
        self.windows.get(window).is_some_and(|s| s.minimized)
    }

    fn is_maximized(&self, window: Entity) -> bool {
        self.windows.get(window).is_some_and(|s| s.maximized)
    }

    fn workspace_id(&self, window: Entity) -> Option<WorkspaceId> {
        self.windows.get(window).map(|s| s.workspace)
    }

    fn class(&self, window: Entity) -> Option<&str> {
        self.windows.get(window).map(|s| s.class.as_str())
    }

    fn title(&self, window: Entity) -> Option<&str> {
        self.windows.get(window).map(|s| s.title.as_str())
    }

    fn activate(&mut self, window: Entity) { self.focus(window) }

    fn show(&mut self, window: Entity) { self.windows.with(window, |s| s.visible = true); }

    fn hide(&mut self, window: Entity) { self.windows.with(window, |s| s.visible = false); }

    fn tags(&self, window: Entity) -> Tags {
        self.windows.get(window).map(|s| s.tags).unwrap_or_default()
    }

    fn add_tag(&mut self, window: Entity, tag: Tags) { self.windows.with(window, |s| s.tags |= tag); }

    fn delete_tag(&mut self, window: Entity, tag: Tags) {
        self.windows.with(window, |s| s.tags.remove(tag));
    }
}

impl Monitors for HeadlessWindowSystem {
    fn monitor_work_area(&self, monitor: u32) -> Rect {
        self.monitors.get(monitor as usize).copied().unwrap_or_default()
    }

    fn should_ignore_workspace(&self, monitor: u32) -> bool { self.ignored_workspaces.contains(&monitor) }

    fn monitors(&self) -> Vec<(u32, Rect)> {
        self.monitors.iter().enumerate().map(|(i, &r)| (i as u32, r)).collect()
    }

    fn active_workspace(&self) -> u32 { self.active_workspace }
}

impl Pointer for HeadlessWindowSystem {
    fn focus_window(&self) -> Option<Entity> { self.focus_history.last().copied() }

    fn previously_focused(&self, window: Entity) -> Option<Entity> {
        self.focus_history
            .iter()
            .rev()
            .copied()
            .find(|&w| w != window && self.windows.contains(w))
    }

    fn cursor_status(&self) -> (Point, u32) {
        let monitor = self
            .monitors
            .iter()
            .position(|area| area.contains(self.cursor))
            .unwrap_or_default();
        (self.cursor, monitor as u32)
    }

    fn windows_at_pointer(&self, cursor: Point, monitor: u32, workspace: u32) -> Vec<Entity> {
        let id = WorkspaceId::new(monitor, workspace);
        let under = |w: Entity| {
            self.windows.get(w).is_some_and(|s| {
                s.workspace == id && s.visible && !s.minimized && s.rect.contains(cursor)
            })
        };

        let mut found: Vec<Entity> = self.focus_history.iter().rev().copied().filter(|&w| under(w)).collect();
        for (window, _) in self.windows.iter() {
            if under(window) && !found.contains(&window) {
                found.push(window);
            }
        }
        found
    }
}

impl SettingsProvider for HeadlessWindowSystem {
    fn gap_inner(&self) -> i32 { self.settings.gap_inner() }

    fn gap_outer(&self) -> i32 { self.settings.gap_outer() }

    fn smart_gaps(&self) -> bool { self.settings.smart_gaps() }

    fn tab_height(&self) -> i32 { self.settings.tab_height() }

    fn tab_placement(&self) -> TabPlacement { self.settings.tab_placement() }

    fn window_shall_float(&self, class: &str, title: &str) -> bool {
        self.settings.window_shall_float(class, title)
    }
}
