//! Keyboard-driven tiling: step resizes, directional moves and swap mode.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::auto_tiler::{AutoTiler, Deferred};
use super::forest::{Forest, MoveBy};
use super::graph::Direction;
use super::movement::{self, Movement};
use crate::model::{Entity, Host, Monitors, WorkspaceId};
use crate::sys::executor::{ChannelExecutor, Scheduler};
use crate::sys::geometry::{Point, Rect, shortest_side};

/// Pixels a single keyboard resize moves an edge.
pub const RESIZE_STEP: i32 = 64;

/// Where a keyboard move sends the focused window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveTarget {
    Window(Entity),
    Monitor(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct MoveRequest {
    window: Entity,
    direction: Direction,
}

#[derive(Default)]
pub struct Tiler {
    /// Window being adjusted while in swap mode.
    pub window: Option<Entity>,
    swap_window: Option<Entity>,
    pub moving: bool,
    queue: ChannelExecutor<MoveRequest>,
}

impl Tiler {
    pub fn new() -> Self { Self::default() }

    pub fn swap_window(&self) -> Option<Entity> { self.swap_window }

    pub fn pending_moves(&self) -> usize { self.queue.len() }

    /// Pushes the window's edge facing `direction` outward by one
    /// [`RESIZE_STEP`]. With `inverse`, the opposite edge is pulled in
    /// `direction` instead, shrinking the window.
    pub fn resize<H: Host>(&mut self, at: &mut AutoTiler, host: &mut H, direction: Direction, inverse: bool) {
        let Some(window) = self.window.or_else(|| host.focus_window()) else { return };
        let Some(fork) = at.forest.attached(window) else { return };
        let Some(id) = host.workspace_id(window) else { return };
        let Some(work_area) = at.forest.find_toplevel(id).and_then(|top| at.forest.forks.get(top)).map(|f| f.area)
        else {
            return;
        };
        let Some(before) = host.rect(window) else { return };

        let Some(after) = step(before, work_area, direction, inverse) else {
            trace!(?window, ?direction, inverse, "resize blocked by workspace edge");
            return;
        };

        let movements = movement::calculate(before, after);
        host.move_window(window, after);

        if movements_are_valid(&at.forest, window, &movements) {
            for movement in movements {
                at.forest.resize(host, fork, window, movement, after);
            }
            if let Some(workspace) = at.forest.forks.get(fork).map(|f| f.workspace) {
                at.forest.arrange(host, workspace, false);
            }
        } else if let Some(area) = at.forest.forks.get(fork).map(|f| f.area) {
            debug!(?window, ?movements, "resize not absorbable, snapping back");
            at.forest.tile(host, fork, area);
        }
    }

    pub fn move_left<H: Host>(&mut self, at: &AutoTiler, host: &H, window: Option<Entity>) {
        self.request_move(at, host, window, Direction::Left)
    }

    pub fn move_right<H: Host>(&mut self, at: &AutoTiler, host: &H, window: Option<Entity>) {
        self.request_move(at, host, window, Direction::Right)
    }

    pub fn move_up<H: Host>(&mut self, at: &AutoTiler, host: &H, window: Option<Entity>) {
        self.request_move(at, host, window, Direction::Up)
    }

    pub fn move_down<H: Host>(&mut self, at: &AutoTiler, host: &H, window: Option<Entity>) {
        self.request_move(at, host, window, Direction::Down)
    }

    /// Queues a move of `window`, or of the window in swap mode or with focus
    /// when none is given. Requests run on the next call to
    /// [`Tiler::run_queue`]; when more than two pile up, the oldest is
    /// dropped.
    pub fn request_move<H: Host>(&mut self, at: &AutoTiler, host: &H, window: Option<Entity>, direction: Direction) {
        let Some(window) = window.or(self.window).or_else(|| host.focus_window()) else { return };
        if !host.is_tilable(window) || !at.forest.is_attached(window) {
            debug!(?window, "move requested for a window that is not tiled");
            return;
        }
        self.queue.send(MoveRequest { window, direction });
    }

    pub fn run_queue<H: Host>(&mut self, at: &mut AutoTiler, host: &mut H, deferred: &mut Scheduler<Deferred>) {
        while let Some(MoveRequest { window, direction }) = self.queue.next() {
            if !host.exists(window) || !at.forest.is_attached(window) {
                trace!(?window, "dropping move for a window no longer tiled");
                continue;
            }
            self.moving = true;
            if let Some(target) = move_window_or_monitor(&at.forest, host, window, direction) {
                self.move_auto(at, host, window, target);
                deferred.register(Deferred::Activate(window));
            }
            self.moving = false;
        }
    }

    /// Moves `focused` onto a neighbouring window or monitor.
    pub fn move_auto<H: Host>(&mut self, at: &mut AutoTiler, host: &mut H, focused: Entity, target: MoveTarget) {
        match target {
            MoveTarget::Window(move_to) => {
                let plain = at.forest.stack_of(focused).is_none() && at.forest.stack_of(move_to).is_none();
                if plain
                    && let Some(parent) = at.windows_are_siblings(focused, move_to)
                    && let Some(fork) = at.forest.forks.get_mut(parent)
                {
                    fork.swap_branches();
                    let area = fork.area;
                    at.forest.tile(host, parent, area);
                    return;
                }

                let Some(src) = host.rect(focused) else { return };
                at.detach_window(host, focused);
                if !at.attach_to_window(host, move_to, focused, MoveBy::Source(src)) {
                    at.auto_tile(host, focused, true);
                }
            }
            MoveTarget::Monitor(monitor) => {
                at.detach_window(host, focused);
                let id = WorkspaceId::new(monitor, host.active_workspace());
                at.attach_to_workspace(host, focused, id);
            }
        }
    }

    /// Begins swap mode on the focused window.
    pub fn enter<H: Host>(&mut self, host: &H) {
        if self.window.is_none() {
            self.window = host.focus_window();
        }
    }

    pub fn swap_left<H: Host>(&mut self, at: &AutoTiler, host: &H) { self.select_swap(at, host, Direction::Left) }

    pub fn swap_right<H: Host>(&mut self, at: &AutoTiler, host: &H) { self.select_swap(at, host, Direction::Right) }

    pub fn swap_up<H: Host>(&mut self, at: &AutoTiler, host: &H) { self.select_swap(at, host, Direction::Up) }

    pub fn swap_down<H: Host>(&mut self, at: &AutoTiler, host: &H) { self.select_swap(at, host, Direction::Down) }

    fn select_swap<H: Host>(&mut self, at: &AutoTiler, host: &H, direction: Direction) {
        let Some(from) = self.swap_window.or(self.window).or_else(|| host.focus_window()) else { return };
        if let Some(selected) = at.forest.window_in_direction(host, from, direction) {
            trace!(?from, ?selected, ?direction, "swap selection");
            self.swap_window = Some(selected);
        }
    }

    /// Exchanges the window with the selected one and leaves swap mode.
    pub fn accept<H: Host>(&mut self, at: &mut AutoTiler, host: &mut H, deferred: &mut Scheduler<Deferred>) {
        if let (Some(window), Some(swap)) = (self.window, self.swap_window)
            && host.exists(window)
            && host.exists(swap)
        {
            at.attach_swap(host, swap, window);
            deferred.register(Deferred::Activate(window));
        }
        self.exit();
    }

    /// Leaves swap mode, dropping any queued moves.
    pub fn exit(&mut self) {
        self.queue.clear();
        self.window = None;
        self.swap_window = None;
    }
}

/// Applies one resize step, or `None` if it would push an edge past the
/// workspace boundary.
fn step(before: Rect, work_area: Rect, direction: Direction, inverse: bool) -> Option<Rect> {
    let Rect { mut x, mut y, mut width, mut height } = before;

    let is_leftmost = x <= work_area.x;
    let is_topmost = y <= work_area.y;
    let is_rightmost = x + width + RESIZE_STEP >= work_area.right();
    let is_bottommost = y + height + RESIZE_STEP >= work_area.bottom();

    match (direction, inverse) {
        (Direction::Up, false) if !is_topmost => {
            y -= RESIZE_STEP;
            height += RESIZE_STEP;
        }
        (Direction::Up, true) if !is_bottommost => height -= RESIZE_STEP,
        (Direction::Down, false) if !is_bottommost => height += RESIZE_STEP,
        (Direction::Down, true) if !is_topmost => {
            y += RESIZE_STEP;
            height -= RESIZE_STEP;
        }
        (Direction::Left, false) if !is_leftmost => {
            x -= RESIZE_STEP;
            width += RESIZE_STEP;
        }
        (Direction::Left, true) if !is_rightmost => width -= RESIZE_STEP,
        (Direction::Right, false) if !is_rightmost => width += RESIZE_STEP,
        (Direction::Right, true) if !is_leftmost => {
            x += RESIZE_STEP;
            width -= RESIZE_STEP;
        }
        _ => return None,
    }

    let mut after = Rect::new(x, y, width, height);
    after.clamp(work_area);
    Some(after)
}

/// Whether every movement can be absorbed by moving an internal edge of the
/// tree. A pure move never can.
pub fn movements_are_valid(forest: &Forest, window: Entity, movements: &[Movement]) -> bool {
    let Some(fork) = forest.attached(window) else { return false };
    !movements.is_empty() && movements.iter().all(|&m| forest.resize_target(fork, window, m).is_some())
}

/// Picks the window in `direction`, unless a monitor lies between the
/// focused window and it.
pub fn move_window_or_monitor<H: Host>(
    forest: &Forest,
    host: &H,
    focus: Entity,
    direction: Direction,
) -> Option<MoveTarget> {
    let next_window = forest.window_in_direction(host, focus, direction).filter(|&w| host.exists(w));
    let focus_monitor = host.workspace_id(focus)?.monitor;
    let next_monitor = locate_monitor(host, focus_monitor, direction);

    let Some(next_window) = next_window else {
        return next_monitor.map(|(monitor, _)| MoveTarget::Monitor(monitor));
    };
    let Some((monitor, area)) = next_monitor else { return Some(MoveTarget::Window(next_window)) };

    let same_monitor = host.workspace_id(next_window).is_some_and(|id| id.monitor == focus_monitor);
    if same_monitor || host.rect(next_window).is_some_and(|rect| area.contains_rect(rect)) {
        Some(MoveTarget::Window(next_window))
    } else {
        Some(MoveTarget::Monitor(monitor))
    }
}

/// The closest monitor in `direction` from monitor `from`.
pub fn locate_monitor<M: Monitors>(host: &M, from: u32, direction: Direction) -> Option<(u32, Rect)> {
    let reference = host.monitor_work_area(from);

    let (origin, exclude): (Point, fn(Rect, Rect) -> bool) = match direction {
        Direction::Up => (reference.north(), |rect, reference| rect.bottom() > reference.y),
        Direction::Down => (reference.south(), |rect, reference| rect.y < reference.bottom()),
        Direction::Left => (reference.west(), |rect, reference| rect.right() > reference.x),
        Direction::Right => (reference.east(), |rect, reference| rect.x < reference.right()),
    };

    host.monitors()
        .into_iter()
        .filter(|&(monitor, area)| monitor != from && !exclude(area, reference))
        .map(|(monitor, area)| (monitor, area, shortest_side(origin, area)))
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(monitor, area, _)| (monitor, area))
}
