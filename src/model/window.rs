//! Contracts the layout engine consumes from the surrounding window system.
//!
//! The engine never touches compositor state directly; every read and write
//! goes through these traits. [`crate::sys::headless`] provides an in-memory
//! implementation.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::ecs::Entity;
use crate::common::config::TabPlacement;
use crate::sys::geometry::{Point, Rect};

/// A monitor index paired with a workspace index on that monitor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkspaceId {
    pub monitor: u32,
    pub workspace: u32,
}

impl WorkspaceId {
    pub const fn new(monitor: u32, workspace: u32) -> Self { WorkspaceId { monitor, workspace } }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Tags: u8 {
        /// The user asked for this window to float.
        const FLOATING = 0b001;
        /// Tile this window even though a float rule matches it.
        const FORCE_TILE = 0b100;
    }
}

pub trait Windows {
    /// Every managed window, oldest first.
    fn all_windows(&self) -> Vec<Entity>;

    fn rect(&self, window: Entity) -> Option<Rect>;

    /// Applies new geometry. The window system may settle asynchronously.
    fn move_window(&mut self, window: Entity, rect: Rect);

    fn exists(&self, window: Entity) -> bool;

    fn is_tilable(&self, window: Entity) -> bool;

    fn is_minimized(&self, window: Entity) -> bool;

    fn is_maximized(&self, window: Entity) -> bool;

    fn workspace_id(&self, window: Entity) -> Option<WorkspaceId>;

    fn class(&self, window: Entity) -> Option<&str>;

    fn title(&self, window: Entity) -> Option<&str>;

    /// Raises and focuses the window.
    fn activate(&mut self, window: Entity);

    fn show(&mut self, window: Entity);

    fn hide(&mut self, window: Entity);

    fn tags(&self, window: Entity) -> Tags;

    fn add_tag(&mut self, window: Entity, tag: Tags);

    fn delete_tag(&mut self, window: Entity, tag: Tags);

    fn contains_tag(&self, window: Entity, tag: Tags) -> bool { self.tags(window).contains(tag) }
}

pub trait Monitors {
    fn monitor_work_area(&self, monitor: u32) -> Rect;

    /// Workspaces on this monitor are collapsed onto workspace 0.
    fn should_ignore_workspace(&self, monitor: u32) -> bool;

    fn monitors(&self) -> Vec<(u32, Rect)>;

    fn active_workspace(&self) -> u32;
}

pub trait Pointer {
    fn focus_window(&self) -> Option<Entity>;

    /// Most recently focused window other than `window`.
    fn previously_focused(&self, window: Entity) -> Option<Entity>;

    /// Cursor position and the monitor it is on.
    fn cursor_status(&self) -> (Point, u32);

    /// Windows under `cursor`, topmost first.
    fn windows_at_pointer(&self, cursor: Point, monitor: u32, workspace: u32) -> Vec<Entity>;
}

/// Read-only layout settings, polled whenever the engine tiles.
pub trait SettingsProvider {
    fn gap_inner(&self) -> i32;

    fn gap_outer(&self) -> i32;

    fn smart_gaps(&self) -> bool;

    fn tab_height(&self) -> i32;

    fn tab_placement(&self) -> TabPlacement;

    fn window_shall_float(&self, class: &str, title: &str) -> bool;
}

/// Everything the layout engine needs from its environment.
pub trait Host: Windows + Monitors + Pointer + SettingsProvider {}

impl<T: Windows + Monitors + Pointer + SettingsProvider> Host for T {}
