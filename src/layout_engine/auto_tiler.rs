//! Placement heuristics on top of the [`Forest`].
//!
//! The auto-tiler decides where a window goes: onto the previously focused
//! window, onto the largest window of its workspace, or into a fresh tree on
//! its monitor. Entry points log rejected preconditions and fall back to a
//! weaker placement instead of failing.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

use super::error::LayoutError;
use super::forest::{Forest, MoveBy};
use super::fork::{Branch, ForkId};
use super::graph::{Direction, Orientation};
use super::node::{Node, NodeKind};
use crate::model::{Entity, Host, Tags, WorkspaceId};
use crate::sys::executor::Scheduler;
use crate::sys::geometry::{Point, Rect, Side, nearest_side};

/// Work deferred to the next tick of the event loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deferred {
    Tile(ForkId),
    Activate(Entity),
}

/// Derives a placement from where the cursor sits inside `area`.
///
/// The nearest side midpoint picks the orientation and which side the
/// dropped window lands on. Nearest to the center means stack.
pub fn cursor_placement(area: Rect, cursor: Point) -> Option<MoveBy> {
    let (_, side) = nearest_side(cursor, area);
    let (orientation, swap) = match side {
        Side::Left => (Orientation::Horizontal, true),
        Side::Right => (Orientation::Horizontal, false),
        Side::Top => (Orientation::Vertical, true),
        Side::Bottom => (Orientation::Vertical, false),
        Side::Center => return None,
    };
    Some(MoveBy::Cursor { orientation, swap })
}

#[derive(Default)]
pub struct AutoTiler {
    pub forest: Forest,
}

impl AutoTiler {
    pub fn new(forest: Forest) -> Self { AutoTiler { forest } }

    /// Exchanges the tree positions of two windows.
    ///
    /// Nothing changes unless both windows and both forks resolve.
    pub fn attach_swap<H: Host>(&mut self, host: &mut H, a: Entity, b: Entity) {
        if let Err(why) = self.try_attach_swap(host, a, b) {
            warn!(%why, "attach_swap");
        }
    }

    pub fn try_attach_swap<H: Host>(&mut self, host: &mut H, a: Entity, b: Entity) -> Result<(), LayoutError> {
        for window in [a, b] {
            if !host.exists(window) {
                return Err(LayoutError::WindowMissing(window));
            }
        }

        let (a_fork, b_fork) = self.forest.swap_windows(a, b)?;
        debug!(?a, ?b, "swapped windows");

        host.show(a);
        host.show(b);
        self.tile_fork(host, a_fork);
        if b_fork != a_fork {
            self.tile_fork(host, b_fork);
        }
        Ok(())
    }

    /// Recomputes a toplevel's area from its monitor's work area, applying
    /// outer gaps unless smart gaps leave a lone window ungapped.
    pub fn update_toplevel<H: Host>(&mut self, host: &mut H, fork_id: ForkId, monitor: u32, smart_gaps: bool) {
        let Some(fork) = self.forest.forks.get_mut(fork_id) else { return };
        let mut rect = host.monitor_work_area(monitor);

        fork.smart_gapped = smart_gaps && fork.right.is_none();
        if !fork.smart_gapped {
            rect = rect.inset(host.gap_outer());
        }

        fork.set_area(rect);
        fork.length_left = (fork.prev_ratio * f64::from(fork.length())).round() as i32;
        self.forest.tile(host, fork_id, rect);
    }

    /// Starts a new tree for `window` covering the monitor's work area.
    pub fn attach_to_monitor<H: Host>(&mut self, host: &mut H, window: Entity, id: WorkspaceId, smart_gaps: bool) {
        let mut rect = host.monitor_work_area(id.monitor);
        if !smart_gaps {
            rect = rect.inset(host.gap_outer());
        }

        let (fork_id, fork) = self.forest.create_toplevel(window, rect, id);
        fork.smart_gapped = smart_gaps;
        self.forest.tile(host, fork_id, rect);
    }

    /// Tiles `attacher` into the slot of `attachee`.
    pub fn attach_to_window<H: Host>(
        &mut self,
        host: &mut H,
        attachee: Entity,
        attacher: Entity,
        move_by: MoveBy,
    ) -> bool {
        let Some(fork_id) = self.forest.attach_window(&*host, attachee, attacher, move_by, false) else {
            debug!(?attachee, ?attacher, "attachee is not attached");
            return false;
        };

        if move_by == MoveBy::Stack
            && let Some(stack) = self.forest.stack_of(attacher).and_then(|id| self.forest.stacks.get_mut(id))
        {
            stack.activate(host, attacher);
        }

        if let Some(fork) = self.forest.forks.get_mut(fork_id)
            && fork.is_toplevel
            && fork.smart_gapped
            && fork.right.is_some()
        {
            fork.smart_gapped = false;
            let rect = host.monitor_work_area(fork.monitor).inset(host.gap_outer());
            fork.set_area(rect);
            fork.length_left = (fork.prev_ratio * f64::from(fork.length())).round() as i32;
        }

        let toplevel = self.toplevel_of(fork_id);
        self.tile_fork(host, toplevel);
        true
    }

    /// Tiles `window` onto the largest window of a workspace, or onto the
    /// monitor when the workspace has no tree yet.
    pub fn attach_to_workspace<H: Host>(&mut self, host: &mut H, window: Entity, id: WorkspaceId) {
        let id = if host.should_ignore_workspace(id.monitor) { WorkspaceId::new(id.monitor, 0) } else { id };

        if let Some(toplevel) = self.forest.find_toplevel(id)
            && let Some(onto) = self.forest.largest_window_on(&*host, toplevel)
            && self.attach_to_window(host, onto, window, MoveBy::Auto)
        {
            return;
        }

        let smart_gaps = host.smart_gaps();
        self.attach_to_monitor(host, window, id, smart_gaps);
    }

    /// Inserts a window into the tree, preferring to split the previously
    /// focused window.
    #[instrument(level = "debug", skip(self, host))]
    pub fn auto_tile<H: Host>(&mut self, host: &mut H, window: Entity, ignore_focus: bool) {
        let mode = self.fetch_mode(host, window, ignore_focus);
        self.detach_window(host, window);

        match mode {
            Ok(onto) => {
                debug!(?onto, "attaching to window");
                if self.attach_to_window(host, onto, window, MoveBy::Auto) {
                    return;
                }
            }
            Err(why) => debug!(%why, "attaching to workspace"),
        }

        let Some(id) = host.workspace_id(window) else {
            warn!(?window, "window has no workspace");
            return;
        };
        self.attach_to_workspace(host, window, id);
    }

    fn fetch_mode<H: Host>(&self, host: &H, window: Entity, ignore_focus: bool) -> Result<Entity, LayoutError> {
        if ignore_focus {
            return Err(LayoutError::IgnoringFocus);
        }

        let prev = host.previously_focused(window).ok_or(LayoutError::NoPreviousFocus)?;
        if !host.exists(prev) {
            return Err(LayoutError::NoFocusWindow);
        }
        if prev == window {
            return Err(LayoutError::SameWindow);
        }
        if !host.is_tilable(prev) {
            return Err(LayoutError::NotTilable);
        }
        if host.is_minimized(prev) {
            return Err(LayoutError::Minimized);
        }
        if !self.forest.is_attached(prev) {
            return Err(LayoutError::FocusNotAttached);
        }

        match (host.workspace_id(prev), host.workspace_id(window)) {
            (Some(a), Some(b)) if a == b => Ok(prev),
            _ => Err(LayoutError::DifferentWorkspace),
        }
    }

    /// Removes a window from the tree, if it is attached, and re-tiles what
    /// remains.
    pub fn detach_window<H: Host>(&mut self, host: &mut H, window: Entity) {
        let Some(fork_id) = self.forest.attached(window) else { return };

        let stack = self.forest.stack_of(window);
        let members = stack
            .and_then(|id| self.forest.stacks.get(id))
            .map(|s| s.tabs.clone())
            .unwrap_or_default();

        let reflow = self.forest.detach(fork_id, window);

        if let Some(stack_id) = stack {
            match self.forest.stacks.get_mut(stack_id) {
                Some(stack) if !stack.contains(stack.active) && stack.prev_active.is_some() => {
                    stack.activate_prev(host);
                }
                Some(stack) => {
                    stack.auto_activate(host);
                }
                None => members.iter().filter(|&&m| m != window).for_each(|&m| host.show(m)),
            }
        }
        host.show(window);

        let Some(reflow) = reflow else { return };
        if let Some(fork) = self.forest.forks.get_mut(reflow)
            && fork.is_toplevel
            && host.smart_gaps()
            && fork.right.is_none()
        {
            fork.set_area(host.monitor_work_area(fork.monitor));
            fork.smart_gapped = true;
        }
        self.tile_fork(host, reflow);
    }

    pub fn largest_on_workspace<H: Host>(&self, host: &H, monitor: u32, workspace: u32) -> Option<Entity> {
        let toplevel = self.forest.find_toplevel(WorkspaceId::new(monitor, workspace))?;
        self.forest.largest_window_on(host, toplevel)
    }

    /// Handles a window the user dropped after dragging it.
    #[instrument(level = "debug", skip(self, host))]
    pub fn on_drop<H: Host>(&mut self, host: &mut H, window: Entity, via_overview: bool) {
        let (cursor, monitor) = host.cursor_status();
        let workspace = host.active_workspace();
        let id = WorkspaceId::new(monitor, workspace);

        let via_overview = via_overview && !host.rect(window).is_some_and(|rect| rect.contains(cursor));
        if via_overview {
            self.detach_window(host, window);
            self.attach_to_monitor_or_largest(host, window, id);
            return;
        }

        let target = host
            .windows_at_pointer(cursor, monitor, workspace)
            .into_iter()
            .find(|&found| found != window && self.forest.is_attached(found));

        let Some(fork_id) = self.forest.attached(window) else { return };
        let Some(fork) = self.forest.forks.get(fork_id) else { return };

        let windowless = self.largest_on_workspace(&*host, monitor, workspace).is_none();

        let target = match target {
            Some(target) => Some(target),
            None => match (fork.left, fork.right) {
                (Node::Window(left), Some(Node::Window(right))) => {
                    Some(if left == window { right } else { left })
                }
                _ if !windowless => {
                    self.tile_fork(host, fork_id);
                    return;
                }
                _ => None,
            },
        };

        if windowless {
            self.detach_window(host, window);
            let smart_gaps = host.smart_gaps();
            self.attach_to_monitor(host, window, id, smart_gaps);
        } else if let Some(target) = target {
            self.place_or_stack(host, window, target, cursor);
        } else {
            self.detach_window(host, window);
            self.attach_to_monitor_or_largest(host, window, id);
        }
    }

    fn attach_to_monitor_or_largest<H: Host>(&mut self, host: &mut H, window: Entity, id: WorkspaceId) {
        match self.largest_on_workspace(&*host, id.monitor, id.workspace) {
            Some(onto) if onto != window => {
                self.attach_to_window(host, onto, window, MoveBy::Auto);
            }
            _ => {
                let smart_gaps = host.smart_gaps();
                self.attach_to_monitor(host, window, id, smart_gaps);
            }
        }
    }

    /// Places a dropped `window` relative to `target` according to the
    /// cursor position.
    ///
    /// * Dropped within its own stack: reorder the tabs.
    /// * Dropped on a stacked window: split beside the stack, or join it
    ///   when dropped on the center.
    /// * Dropped on a sibling: reorient and reorder the shared fork.
    /// * Otherwise: detach and attach beside the target, or stack onto it
    ///   when dropped on the center.
    pub fn place_or_stack<H: Host>(&mut self, host: &mut H, window: Entity, target: Entity, cursor: Point) -> bool {
        let Some(target_fork) = self.forest.attached(target) else { return false };
        let Some(fork) = self.forest.forks.get(target_fork) else { return false };

        let window_stack = self.forest.stack_of(window);
        let target_stack = self.forest.stack_of(target);
        let siblings = window_stack.is_none() && self.windows_are_siblings(window, target).is_some();

        let attach_area = if siblings {
            fork.area
        } else {
            match target_stack.and_then(|id| self.forest.stacks.get(id)) {
                Some(stack) => stack.stack_rect,
                None => host.rect(target).unwrap_or(fork.area),
            }
        };
        let placement = cursor_placement(attach_area, cursor);

        if window_stack.is_some() && window_stack == target_stack {
            if let Some(direction) = placement.and_then(MoveBy::direction)
                && let Err(why) = self.forest.stack_reorder(window, target, direction.is_forward())
            {
                warn!(%why, "stack reorder");
            }
            self.tile_fork(host, target_fork);
            return true;
        }

        match placement {
            Some(MoveBy::Cursor { orientation, swap }) if siblings => {
                let direction = Direction::from_placement(orientation, swap);
                self.orient_siblings(host, target_fork, window, orientation, direction);
                true
            }
            Some(placement) => {
                self.detach_window(host, window);
                self.attach_to_window(host, target, window, placement)
            }
            None => {
                self.detach_window(host, window);
                self.attach_to_window(host, target, window, MoveBy::Stack)
            }
        }
    }

    /// Orients a fork and orders its children so `window` ends up on the
    /// `direction` side.
    fn orient_siblings<H: Host>(
        &mut self,
        host: &mut H,
        fork_id: ForkId,
        window: Entity,
        orientation: Orientation,
        direction: Direction,
    ) {
        let Some(fork) = self.forest.forks.get_mut(fork_id) else { return };
        fork.set_orientation(orientation);
        let is_left = fork.slot_of(&self.forest.stacks, window).is_some_and(|(branch, _)| branch == Branch::Left);
        if is_left == direction.is_forward() {
            fork.swap_branches();
        }
        let area = fork.area;
        self.forest.tile(host, fork_id, area);
    }

    /// Schedules the fork holding `window` to be re-tiled on the next tick.
    pub fn reflow(&self, deferred: &mut Scheduler<Deferred>, window: Entity) {
        if let Some(fork) = self.forest.attached(window) {
            deferred.register(Deferred::Tile(fork));
        }
    }

    pub fn run_deferred<H: Host>(&mut self, host: &mut H, task: Deferred) {
        match task {
            Deferred::Tile(fork) => self.tile_fork(host, fork),
            Deferred::Activate(window) => {
                if !host.exists(window) {
                    return;
                }
                if let Some(stack) = self.forest.stack_of(window).and_then(|id| self.forest.stacks.get_mut(id)) {
                    stack.activate(host, window);
                }
                host.activate(window);
            }
        }
    }

    pub fn tile<H: Host>(&mut self, host: &mut H, fork: ForkId, area: Rect) { self.forest.tile(host, fork, area); }

    fn tile_fork<H: Host>(&mut self, host: &mut H, fork: ForkId) {
        let Some(area) = self.forest.forks.get(fork).map(|f| f.area) else {
            debug!(?fork, "fork vanished before tiling");
            return;
        };
        self.forest.tile(host, fork, area);
    }

    fn toplevel_of(&self, mut fork: ForkId) -> ForkId {
        while let Some(parent) = self.forest.parent(fork) {
            fork = parent;
        }
        fork
    }

    /// Whether float rules exclude `window` from tiling.
    pub fn should_float<H: Host>(&self, host: &H, window: Entity) -> bool {
        let class = host.class(window).unwrap_or_default();
        let title = host.title(window).unwrap_or_default();
        host.window_shall_float(class, title) && !host.contains_tag(window, Tags::FORCE_TILE)
    }

    /// Flips the focused window between floating and tiled.
    pub fn toggle_floating<H: Host>(&mut self, host: &mut H, deferred: &mut Scheduler<Deferred>) {
        let Some(focused) = host.focus_window() else { return };

        let class = host.class(focused).unwrap_or_default();
        let title = host.title(focused).unwrap_or_default();
        let float_except = host.window_shall_float(class, title);

        if float_except {
            if host.contains_tag(focused, Tags::FORCE_TILE) {
                host.delete_tag(focused, Tags::FORCE_TILE);
                self.detach_window(host, focused);
            } else {
                host.add_tag(focused, Tags::FORCE_TILE);
                self.auto_tile(host, focused, false);
            }
        } else if host.contains_tag(focused, Tags::FLOATING) {
            host.delete_tag(focused, Tags::FLOATING);
            self.auto_tile(host, focused, false);
        } else if self.forest.is_attached(focused) {
            self.detach_window(host, focused);
            host.add_tag(focused, Tags::FLOATING);
        }

        deferred.register(Deferred::Activate(focused));
    }

    /// Flips the split of the fork holding `window`, then rebalances every
    /// fork below it.
    pub fn toggle_orientation<H: Host>(&mut self, host: &mut H, window: Entity) {
        if let Err(why) = self.try_toggle_orientation(host, window) {
            warn!(%why, "toggle_orientation");
        }
    }

    pub fn try_toggle_orientation<H: Host>(&mut self, host: &mut H, window: Entity) -> Result<(), LayoutError> {
        if host.is_maximized(window) {
            return Err(LayoutError::Maximized);
        }

        let fork_id = self.forest.attached(window).ok_or(LayoutError::WindowNotAttached(window))?;
        let fork = self.forest.forks.get_mut(fork_id).ok_or(LayoutError::ForkMissing(fork_id))?;
        if fork.right.is_none() {
            return Ok(());
        }

        fork.toggle_orientation();
        let (area, workspace) = (fork.area, fork.workspace);
        self.forest.measure(&*host, fork_id, area);

        let children: Vec<ForkId> =
            self.forest.iter(fork_id, Some(NodeKind::Fork)).filter_map(|node| node.fork()).collect();
        for child in children {
            let Some(child_fork) = self.forest.forks.get_mut(child) else {
                error!(?child, "fork does not exist to have its orientation toggled");
                continue;
            };
            child_fork.rebalance_orientation();
            let area = child_fork.area;
            self.forest.measure(&*host, child, area);
        }

        self.forest.arrange(host, workspace, true);
        Ok(())
    }

    /// Wraps `window` in a stack, or dissolves the stack it is in.
    pub fn toggle_stacking<H: Host>(&mut self, host: &mut H, window: Entity) {
        if let Err(why) = self.try_toggle_stacking(host, window) {
            warn!(%why, "toggle_stacking");
        }
    }

    pub fn try_toggle_stacking<H: Host>(&mut self, host: &mut H, window: Entity) -> Result<(), LayoutError> {
        let fork = match self.forest.stack_of(window) {
            Some(stack_id) => {
                let members = self.forest.stacks.get(stack_id).map(|s| s.tabs.clone()).unwrap_or_default();
                let fork = self.forest.unstack(stack_id)?;
                for member in members {
                    host.show(member);
                }
                fork
            }
            None => {
                let stack_id = self.forest.create_stack_at(&*host, window)?;
                if let Some(stack) = self.forest.stacks.get_mut(stack_id) {
                    stack.activate(host, window);
                }
                self.forest.attached(window).ok_or(LayoutError::WindowNotAttached(window))?
            }
        };
        let toplevel = self.toplevel_of(fork);
        self.tile_fork(host, toplevel);
        Ok(())
    }

    /// The fork both windows are attached to, if they share one.
    pub fn windows_are_siblings(&self, a: Entity, b: Entity) -> Option<ForkId> {
        match (self.forest.attached(a), self.forest.attached(b)) {
            (Some(a), Some(b)) if a == b => Some(a),
            _ => None,
        }
    }

    /// Re-reads layout settings: stack tab strips and every toplevel's gaps.
    pub fn refresh_settings<H: Host>(&mut self, host: &mut H) {
        let (tab_height, tab_placement) = (host.tab_height(), host.tab_placement());
        for (_, stack) in self.forest.stacks.iter_mut() {
            stack.tabs_height = tab_height;
            stack.tab_placement = tab_placement;
        }
        self.refresh_toplevels(host, None);
    }

    /// Recomputes toplevel areas after a work area change, on one monitor or
    /// on all of them.
    pub fn refresh_toplevels<H: Host>(&mut self, host: &mut H, monitor: Option<u32>) {
        let smart_gaps = host.smart_gaps();
        let toplevels: Vec<(ForkId, u32)> = self
            .forest
            .toplevels()
            .filter(|(id, _)| monitor.is_none_or(|m| m == id.monitor))
            .map(|(id, fork)| (fork, id.monitor))
            .collect();
        for (fork, monitor) in toplevels {
            self.update_toplevel(host, fork, monitor, smart_gaps);
        }
    }
}
