//! The collection of per-workspace window trees.
//!
//! The forest owns every fork and stack. Windows are referenced, never owned;
//! the `attached` index maps each tiled window to the fork whose slot holds
//! it, either directly or as a stack member.

use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};
use tracing::{debug, trace, warn};

use super::error::LayoutError;
use super::fork::{Branch, Fork, ForkId, Replacement};
use super::graph::{Direction, Orientation};
use super::movement::Movement;
use super::node::{Node, NodeKind};
use super::stack::{Stack, StackId};
use crate::common::collections::HashMap;
use crate::common::config::TabPlacement;
use crate::model::{Entity, Monitors, SettingsProvider, Storage, Windows, WorkspaceId};
use crate::sys::geometry::{Rect, Side};

/// How an attacher is placed relative to the window it attaches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveBy {
    /// Split across the longer axis, attacher second.
    Auto,
    /// Split along `orientation`; `swap` puts the attacher first.
    Cursor { orientation: Orientation, swap: bool },
    /// The attacher enters from the side its previous rectangle was on.
    Source(Rect),
    /// Join the attachee's stack, creating one if needed.
    Stack,
}

impl MoveBy {
    pub fn direction(self) -> Option<Direction> {
        match self {
            MoveBy::Cursor { orientation, swap } => Some(Direction::from_placement(orientation, swap)),
            _ => None,
        }
    }
}

/// Rectangles computed by [`Forest::measure`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Measurement {
    /// Every window leaf with the fork that holds it and its target rect.
    /// Stack members all receive the stack's content rect.
    pub windows: Vec<(Entity, ForkId, Rect)>,
    pub stacks: Vec<(StackId, Rect)>,
}

impl Measurement {
    pub fn rect_of(&self, window: Entity) -> Option<Rect> {
        self.windows.iter().find(|(w, ..)| *w == window).map(|&(_, _, rect)| rect)
    }
}

#[derive(Default)]
pub struct Forest {
    pub forks: SlotMap<ForkId, Fork>,
    pub stacks: SlotMap<StackId, Stack>,
    parents: SecondaryMap<ForkId, ForkId>,
    toplevel: HashMap<WorkspaceId, ForkId>,
    attached: Storage<ForkId>,
}

impl Forest {
    pub fn new() -> Self { Self::default() }

    pub fn attached(&self, window: Entity) -> Option<ForkId> { self.attached.get(window).copied() }

    pub fn is_attached(&self, window: Entity) -> bool { self.attached.contains(window) }

    pub fn attached_windows(&self) -> impl Iterator<Item = Entity> + '_ {
        self.attached.iter().map(|(window, _)| window)
    }

    pub fn parent(&self, fork: ForkId) -> Option<ForkId> { self.parents.get(fork).copied() }

    pub fn on_attach(&mut self, fork: ForkId, window: Entity) {
        trace!(?window, ?fork, "attached");
        self.attached.insert(window, fork);
    }

    pub fn on_detach(&mut self, window: Entity) -> Option<ForkId> {
        trace!(?window, "detached");
        self.attached.remove(window)
    }

    /// Starts a new tree holding only `window`.
    pub fn create_toplevel(&mut self, window: Entity, area: Rect, id: WorkspaceId) -> (ForkId, &mut Fork) {
        let mut fork = Fork::new(Node::Window(window), None, area, id, Orientation::for_area(area));
        fork.is_toplevel = true;
        let fork_id = self.forks.insert(fork);
        if let Some(previous) = self.toplevel.insert(id, fork_id)
            && self.forks.contains_key(previous)
        {
            warn!(?previous, ?id, "workspace already had a toplevel");
        }
        self.on_attach(fork_id, window);
        debug!(?window, ?fork_id, ?id, "created toplevel");
        (fork_id, &mut self.forks[fork_id])
    }

    pub fn find_toplevel(&self, id: WorkspaceId) -> Option<ForkId> {
        self.toplevel.get(&id).copied().filter(|&fork| self.forks.contains_key(fork))
    }

    pub fn toplevels(&self) -> impl Iterator<Item = (WorkspaceId, ForkId)> + '_ {
        self.toplevel.iter().map(|(&id, &fork)| (id, fork))
    }

    /// The fork slot holding `window`, looked up through the attached index.
    pub fn slot_of(&self, window: Entity) -> Option<(ForkId, Branch, Node)> {
        let fork_id = self.attached(window)?;
        let (branch, node) = self.forks.get(fork_id)?.slot_of(&self.stacks, window)?;
        Some((fork_id, branch, node))
    }

    pub fn stack_of(&self, window: Entity) -> Option<StackId> {
        self.slot_of(window).and_then(|(_, _, node)| node.stack())
    }

    /// Splits the attachee's slot to make room for `attacher`.
    ///
    /// Returns the fork now holding the attacher, or `None` if the attachee
    /// is not attached.
    pub fn attach_window<S: SettingsProvider>(
        &mut self,
        settings: &S,
        attachee: Entity,
        attacher: Entity,
        move_by: MoveBy,
        stack_from_left: bool,
    ) -> Option<ForkId> {
        let (fork_id, branch, node) = self.slot_of(attachee)?;

        if move_by == MoveBy::Stack {
            let stack_id = match node {
                Node::Stack(stack_id) => stack_id,
                _ => {
                    let id = self.forks.get(fork_id)?.workspace_id();
                    let stack_id = self.create_stack(settings, id, attachee);
                    self.forks.get_mut(fork_id)?.set_child(branch, Node::Stack(stack_id));
                    stack_id
                }
            };
            let stack = self.stacks.get_mut(stack_id)?;
            if stack_from_left {
                stack.add_front(attacher);
            } else {
                stack.add(attacher);
            }
            self.on_attach(fork_id, attacher);
            debug!(?attacher, ?attachee, ?stack_id, "stacked");
            return Some(fork_id);
        }

        let fork_id = self.split_slot(attachee, attacher, move_by).ok()?;
        debug!(?attacher, ?attachee, ?fork_id, ?move_by, "attached window");
        Some(fork_id)
    }

    fn create_stack<S: SettingsProvider>(&mut self, settings: &S, id: WorkspaceId, window: Entity) -> StackId {
        let mut stack = Stack::new(window, id, settings.tab_height(), settings.tab_placement());
        stack.add(window);
        self.stacks.insert(stack)
    }

    /// Removes `window` from `fork` and contracts the tree around the hole.
    ///
    /// Returns the fork that should be re-tiled, or `None` when the tree
    /// vanished with the window.
    pub fn detach(&mut self, fork_id: ForkId, window: Entity) -> Option<ForkId> {
        let (branch, node) = self.forks.get(fork_id)?.slot_of(&self.stacks, window)?;
        self.on_detach(window);

        if let Node::Stack(stack_id) = node {
            let stack = self.stacks.get_mut(stack_id)?;
            stack.remove_tab(window);
            match stack.len() {
                0 => {
                    self.stacks.remove(stack_id);
                }
                1 => {
                    let survivor = stack.tabs[0];
                    self.stacks.remove(stack_id);
                    self.forks.get_mut(fork_id)?.set_child(branch, Node::Window(survivor));
                    debug!(?survivor, ?stack_id, "stack contracted");
                    return Some(fork_id);
                }
                _ => return Some(fork_id),
            }
        }

        let fork = self.forks.get(fork_id)?;
        let survivor = match branch {
            Branch::Left => fork.right,
            Branch::Right => Some(fork.left),
        };

        let Some(survivor) = survivor else {
            debug!(?fork_id, "tree emptied");
            self.delete_fork(fork_id);
            return None;
        };

        if self.parents.contains_key(fork_id) {
            return self.reassign_to_parent(fork_id, survivor);
        }

        match survivor {
            Node::Fork(child) => self.absorb_child(fork_id, child),
            _ => {
                let fork = self.forks.get_mut(fork_id)?;
                fork.left = survivor;
                fork.right = None;
            }
        }
        Some(fork_id)
    }

    /// Puts `replacement` in the parent slot that held `fork`, deleting
    /// `fork`. Returns the parent.
    pub fn reassign_to_parent(&mut self, fork: ForkId, replacement: Node) -> Option<ForkId> {
        let parent = self.parent(fork)?;
        let parent_fork = self.forks.get_mut(parent)?;
        let branch = parent_fork.branch_of(Node::Fork(fork))?;
        parent_fork.set_child(branch, replacement);
        self.rehome(replacement, parent);
        self.delete_fork(fork);
        trace!(?fork, ?parent, "reassigned to parent");
        Some(parent)
    }

    /// Hoists the children of `child` into `toplevel` so the toplevel keeps
    /// its identity.
    fn absorb_child(&mut self, toplevel: ForkId, child: ForkId) {
        let Some(inner) = self.forks.remove(child) else { return };
        self.parents.remove(child);
        let ratio = inner.ratio();
        for node in inner.children() {
            self.rehome(node, toplevel);
        }
        if let Some(fork) = self.forks.get_mut(toplevel) {
            fork.left = inner.left;
            fork.right = inner.right;
            fork.orientation = inner.orientation;
            fork.orientation_changed = false;
            fork.length_left = (ratio * f64::from(fork.length())).round() as i32;
            fork.prev_ratio = ratio;
        }
    }

    /// Points the bookkeeping of whatever `node` references at `fork`.
    fn rehome(&mut self, node: Node, fork: ForkId) {
        match node {
            Node::Fork(child) => {
                self.parents.insert(child, fork);
            }
            Node::Window(window) => self.on_attach(fork, window),
            Node::Stack(stack) => {
                let members = self.stacks.get(stack).map(|s| s.tabs.clone()).unwrap_or_default();
                for window in members {
                    self.on_attach(fork, window);
                }
            }
        }
    }

    fn delete_fork(&mut self, fork: ForkId) {
        self.forks.remove(fork);
        self.parents.remove(fork);
        self.toplevel.retain(|_, id| *id != fork);
    }

    /// Applies a staged [`Replacement`] to `fork`.
    pub fn apply_replacement(&mut self, fork: ForkId, replacement: Replacement) -> Result<(), LayoutError> {
        match replacement.stack {
            Some(stack_id) => {
                let stack = self.stacks.get_mut(stack_id).ok_or(LayoutError::StackMissing(stack_id))?;
                stack.replace(replacement.old, replacement.new);
            }
            None => {
                let fork_ref = self.forks.get_mut(fork).ok_or(LayoutError::ForkMissing(fork))?;
                fork_ref.set_child(replacement.branch, Node::Window(replacement.new));
            }
        }
        self.on_attach(fork, replacement.new);
        Ok(())
    }

    /// Exchanges the tree positions of two windows.
    ///
    /// Both replacements are computed before either is applied, so a miss
    /// leaves the tree untouched. Returns the forks that now hold `b` and
    /// `a` respectively.
    pub fn swap_windows(&mut self, a: Entity, b: Entity) -> Result<(ForkId, ForkId), LayoutError> {
        let a_fork = self.attached(a).ok_or(LayoutError::WindowNotAttached(a))?;
        let b_fork = self.attached(b).ok_or(LayoutError::WindowNotAttached(b))?;

        let a_replacement = self
            .forks
            .get(a_fork)
            .ok_or(LayoutError::ForkMissing(a_fork))?
            .replace_window(&self.stacks, a, b)
            .ok_or(LayoutError::WindowNotAttached(a))?;
        let b_replacement = self
            .forks
            .get(b_fork)
            .ok_or(LayoutError::ForkMissing(b_fork))?
            .replace_window(&self.stacks, b, a)
            .ok_or(LayoutError::WindowNotAttached(b))?;

        if let (Some(a_stack), Some(b_stack)) = (a_replacement.stack, b_replacement.stack)
            && a_stack == b_stack
        {
            let stack = self.stacks.get_mut(a_stack).ok_or(LayoutError::StackMissing(a_stack))?;
            if let (Some(i), Some(j)) = (stack.position(a), stack.position(b)) {
                stack.tabs.swap(i, j);
                if let Some(idx) = stack.position(stack.active) {
                    stack.active_id = idx;
                }
            }
            return Ok((a_fork, b_fork));
        }

        self.apply_replacement(a_fork, a_replacement)?;
        self.apply_replacement(b_fork, b_replacement)?;
        Ok((a_fork, b_fork))
    }

    /// Lazy depth-first walk over the descendants of `fork`, left before
    /// right, optionally restricted to one node kind.
    pub fn iter(&self, fork: ForkId, kind: Option<NodeKind>) -> Iter<'_> {
        let mut pending = Vec::new();
        if let Some(fork) = self.forks.get(fork) {
            pending.extend(fork.right);
            pending.push(fork.left);
        }
        Iter { forest: self, pending, kind }
    }

    /// Every window in the subtree, stack members included.
    pub fn windows_in(&self, fork: ForkId) -> Vec<Entity> {
        let mut windows = Vec::new();
        for node in self.iter(fork, None) {
            match node {
                Node::Window(window) => windows.push(window),
                Node::Stack(stack) => {
                    windows.extend(self.stacks.get(stack).into_iter().flat_map(|s| s.tabs.iter().copied()))
                }
                Node::Fork(_) => {}
            }
        }
        windows
    }

    /// Finds the visible window with the largest on-screen area. Stacks
    /// compete with their shared rect and answer with their active member.
    pub fn largest_window_on<W: Windows>(&self, host: &W, fork: ForkId) -> Option<Entity> {
        let mut largest: Option<(i64, Entity)> = None;
        for node in self.iter(fork, None) {
            let candidate = match node {
                Node::Window(window) => host.rect(window).map(|rect| (rect.area(), window)),
                Node::Stack(stack) => self.stacks.get(stack).map(|s| (s.rect.area(), s.active)),
                Node::Fork(_) => None,
            };
            if let Some((area, window)) = candidate
                && largest.is_none_or(|(best, _)| area > best)
            {
                largest = Some((area, window));
            }
        }
        largest.map(|(_, window)| window)
    }

    /// Computes the rectangle of every leaf under `fork` for `area`.
    ///
    /// Nothing is applied to any window; only fork bookkeeping changes.
    pub fn measure<S: SettingsProvider>(&mut self, settings: &S, fork: ForkId, area: Rect) -> Measurement {
        let mut measurement = Measurement::default();
        self.measure_into(fork, area, settings.gap_inner(), &mut measurement);
        measurement
    }

    fn measure_into(&mut self, fork_id: ForkId, area: Rect, gap_inner: i32, out: &mut Measurement) {
        let Some(fork) = self.forks.get_mut(fork_id) else {
            warn!(?fork_id, "measuring missing fork");
            return;
        };
        let regions = fork.measure(area, gap_inner);
        for (node, rect) in std::iter::once(regions.left).chain(regions.right) {
            match node {
                Node::Fork(child) => self.measure_into(child, rect, gap_inner, out),
                Node::Window(window) => out.windows.push((window, fork_id, rect)),
                Node::Stack(stack_id) => {
                    let Some(stack) = self.stacks.get(stack_id) else { continue };
                    let content = stack.content_rect(rect);
                    out.stacks.push((stack_id, content));
                    out.windows.extend(stack.tabs.iter().map(|&window| (window, fork_id, content)));
                }
            }
        }
    }

    /// Measures `fork` against `area` and applies every assignment.
    pub fn tile<H>(&mut self, host: &mut H, fork: ForkId, area: Rect) -> Measurement
    where H: Windows + Monitors + SettingsProvider {
        let measurement = self.measure(host, fork, area);
        self.apply(host, &measurement, true);
        measurement
    }

    /// Re-tiles every toplevel on `workspace`. Unless `stress_test` is set,
    /// windows already at their target rect are left alone.
    pub fn arrange<H>(&mut self, host: &mut H, workspace: u32, stress_test: bool)
    where H: Windows + Monitors + SettingsProvider {
        let toplevels: Vec<(ForkId, Rect)> = self
            .forks
            .iter()
            .filter(|(_, fork)| fork.is_toplevel && fork.workspace == workspace)
            .map(|(id, fork)| (id, fork.area))
            .collect();
        for (fork, area) in toplevels {
            let measurement = self.measure(host, fork, area);
            self.apply(host, &measurement, stress_test);
        }
    }

    fn apply<H>(&mut self, host: &mut H, measurement: &Measurement, force: bool)
    where H: Windows + Monitors {
        for &(window, _, rect) in &measurement.windows {
            if force || host.rect(window) != Some(rect) {
                host.move_window(window, rect);
            }
        }
        for &(stack_id, rect) in &measurement.stacks {
            if let Some(stack) = self.stacks.get_mut(stack_id) {
                stack.update_positions(rect);
                stack.restack(host);
            }
        }
    }

    /// The ancestor of `window`'s slot whose internal edge is the edge
    /// `movement` moved, and the branch the window lies under.
    pub fn resize_target(&self, fork: ForkId, window: Entity, movement: Movement) -> Option<(ForkId, Branch)> {
        let edge = movement.edge()?;
        let axis = match edge {
            Side::Left | Side::Right => Orientation::Horizontal,
            Side::Top | Side::Bottom => Orientation::Vertical,
            Side::Center => return None,
        };

        let (mut branch, _) = self.forks.get(fork)?.slot_of(&self.stacks, window)?;
        let mut current = fork;
        loop {
            let fork = self.forks.get(current)?;
            if fork.right.is_some() && fork.orientation == axis {
                let inner = match branch {
                    Branch::Left => matches!(edge, Side::Right | Side::Bottom),
                    Branch::Right => matches!(edge, Side::Left | Side::Top),
                };
                if inner {
                    return Some((current, branch));
                }
            }
            let parent = self.parent(current)?;
            branch = self.forks.get(parent)?.branch_of(Node::Fork(current))?;
            current = parent;
        }
    }

    /// Absorbs an external resize of `window` to `new_rect` by moving the
    /// one split whose edge was dragged, then re-tiles that split's subtree.
    ///
    /// Returns `false` if the moved edge is not an internal edge.
    pub fn resize<H>(
        &mut self,
        host: &mut H,
        fork: ForkId,
        window: Entity,
        movement: Movement,
        new_rect: Rect,
    ) -> bool
    where
        H: Windows + Monitors + SettingsProvider,
    {
        let Some((target, branch)) = self.resize_target(fork, window, movement) else {
            trace!(?window, ?movement, "resize not absorbable");
            return false;
        };

        // Stack members only own the content rect; the slot includes the tabs.
        let mut new_rect = new_rect;
        if let Some(stack) = self.stack_of(window).and_then(|id| self.stacks.get(id)) {
            match stack.tab_placement {
                TabPlacement::Top => {
                    new_rect.y -= stack.tabs_height;
                    new_rect.height += stack.tabs_height;
                }
                TabPlacement::Bottom => new_rect.height += stack.tabs_height,
            }
        }

        let half_gap = host.gap_inner() / 2;
        let Some(fork) = self.forks.get_mut(target) else { return false };
        let boundary = match (fork.orientation, branch) {
            (Orientation::Horizontal, Branch::Left) => new_rect.right() + half_gap - fork.area.x,
            (Orientation::Horizontal, Branch::Right) => new_rect.x - half_gap - fork.area.x,
            (Orientation::Vertical, Branch::Left) => new_rect.bottom() + half_gap - fork.area.y,
            (Orientation::Vertical, Branch::Right) => new_rect.y - half_gap - fork.area.y,
        };
        fork.set_ratio(boundary);
        let area = fork.area;
        debug!(?window, ?movement, fork = ?target, length_left = fork.length_left, "absorbed resize");
        self.tile(host, target, area);
        true
    }

    /// Moves `window` before or after `target` in their shared stack.
    pub fn stack_reorder(&mut self, window: Entity, target: Entity, after: bool) -> Result<(), LayoutError> {
        let stack_id = self.stack_of(window).ok_or(LayoutError::WindowNotAttached(window))?;
        if self.stack_of(target) != Some(stack_id) {
            return Err(LayoutError::WindowNotAttached(target));
        }
        let stack = self.stacks.get_mut(stack_id).ok_or(LayoutError::StackMissing(stack_id))?;
        stack.reorder(window, target, after);
        Ok(())
    }

    /// Turns `window`'s slot into a single-member stack.
    pub fn create_stack_at<S: SettingsProvider>(
        &mut self,
        settings: &S,
        window: Entity,
    ) -> Result<StackId, LayoutError> {
        let (fork_id, branch, node) =
            self.slot_of(window).ok_or(LayoutError::WindowNotAttached(window))?;
        if let Node::Stack(stack_id) = node {
            return Ok(stack_id);
        }
        let fork = self.forks.get(fork_id).ok_or(LayoutError::ForkMissing(fork_id))?;
        let stack_id = self.create_stack(settings, fork.workspace_id(), window);
        if let Some(fork) = self.forks.get_mut(fork_id) {
            fork.set_child(branch, Node::Stack(stack_id));
        }
        debug!(?window, ?stack_id, "created stack");
        Ok(stack_id)
    }

    /// Dissolves a stack into a chain of forks holding one member each, in
    /// tab order. Returns the fork holding the first member.
    pub fn unstack(&mut self, stack_id: StackId) -> Result<ForkId, LayoutError> {
        let stack = self.stacks.get(stack_id).ok_or(LayoutError::StackMissing(stack_id))?;
        let first = *stack.tabs.first().ok_or(LayoutError::StackMissing(stack_id))?;
        let (fork_id, branch, _) = self.slot_of(first).ok_or(LayoutError::WindowNotAttached(first))?;

        let stack = self.stacks.remove(stack_id).ok_or(LayoutError::StackMissing(stack_id))?;
        if let Some(fork) = self.forks.get_mut(fork_id) {
            fork.set_child(branch, Node::Window(first));
        }

        let mut previous = first;
        for &window in &stack.tabs[1..] {
            self.on_detach(window);
            self.split_slot(previous, window, MoveBy::Auto)?;
            previous = window;
        }
        debug!(?stack_id, members = stack.tabs.len(), "unstacked");
        Ok(fork_id)
    }

    /// Splits the slot of `attachee` into a fork holding it and `attacher`,
    /// or fills the empty right slot of a single-child toplevel.
    fn split_slot(
        &mut self,
        attachee: Entity,
        attacher: Entity,
        move_by: MoveBy,
    ) -> Result<ForkId, LayoutError> {
        let (fork_id, branch, node) =
            self.slot_of(attachee).ok_or(LayoutError::WindowNotAttached(attachee))?;
        let fork = self.forks.get_mut(fork_id).ok_or(LayoutError::ForkMissing(fork_id))?;
        if fork.right.is_none() {
            fork.right = Some(Node::Window(attacher));
            place(fork, move_by);
            fork.set_ratio(fork.length() / 2);
            self.on_attach(fork_id, attacher);
            return Ok(fork_id);
        }
        let area = fork.area_of(branch);
        let id = fork.workspace_id();
        let mut child =
            Fork::new(node, Some(Node::Window(attacher)), area, id, Orientation::for_area(area));
        place(&mut child, move_by);
        child.set_ratio(child.length() / 2);
        let child_id = self.forks.insert(child);
        if let Some(fork) = self.forks.get_mut(fork_id) {
            fork.set_child(branch, Node::Fork(child_id));
        }
        self.parents.insert(child_id, fork_id);
        self.rehome(node, child_id);
        self.on_attach(child_id, attacher);
        Ok(child_id)
    }

    /// The tiled window nearest to `from` in `direction` on the same
    /// workspace. Hidden stack members are skipped.
    pub fn window_in_direction<W: Windows>(&self, host: &W, from: Entity, direction: Direction) -> Option<Entity> {
        let origin = host.rect(from)?;
        let workspace = host.workspace_id(from)?;
        let center = origin.center();

        self.attached
            .iter()
            .map(|(window, _)| window)
            .filter(|&window| window != from && host.workspace_id(window) == Some(workspace))
            .filter(|&window| match self.stack_of(window).and_then(|id| self.stacks.get(id)) {
                Some(stack) => stack.active == window && !stack.contains(from),
                None => true,
            })
            .filter_map(|window| host.rect(window).map(|rect| (window, rect)))
            .filter(|(_, rect)| {
                let other = rect.center();
                match direction {
                    Direction::Left => other.x < origin.x,
                    Direction::Right => other.x > origin.right(),
                    Direction::Up => other.y < origin.y,
                    Direction::Down => other.y > origin.bottom(),
                }
            })
            .min_by_key(|(_, rect)| {
                let other = rect.center();
                let (gap, overlaps, cross) = match direction {
                    Direction::Left | Direction::Right => {
                        let gap = if direction == Direction::Left {
                            origin.x - rect.right()
                        } else {
                            rect.x - origin.right()
                        };
                        (gap, spans(rect.y, rect.bottom(), origin.y, origin.bottom()), center.y - other.y)
                    }
                    Direction::Up | Direction::Down => {
                        let gap = if direction == Direction::Up {
                            origin.y - rect.bottom()
                        } else {
                            rect.y - origin.bottom()
                        };
                        (gap, spans(rect.x, rect.right(), origin.x, origin.right()), center.x - other.x)
                    }
                };
                (!overlaps, gap.abs(), cross.abs())
            })
            .map(|(window, _)| window)
    }

    pub fn draw_tree(&self) -> String {
        let mut toplevels: Vec<_> = self.toplevels().collect();
        toplevels.sort();
        if toplevels.is_empty() {
            return "<empty forest>".to_string();
        }

        let mut out = String::new();
        for (id, fork) in toplevels {
            let tree = ascii_tree::Tree::Node(
                format!("workspace {}:{}", id.monitor, id.workspace),
                vec![self.ascii_tree(Node::Fork(fork))],
            );
            if ascii_tree::write_tree(&mut out, &tree).is_err() {
                break;
            }
        }
        out
    }

    fn ascii_tree(&self, node: Node) -> ascii_tree::Tree {
        match node {
            Node::Window(window) => ascii_tree::Tree::Leaf(vec![format!("{window:?}")]),
            Node::Stack(stack_id) => match self.stacks.get(stack_id) {
                Some(stack) => ascii_tree::Tree::Node(
                    format!("stack {stack_id:?}"),
                    stack
                        .tabs
                        .iter()
                        .map(|&tab| {
                            let marker = if tab == stack.active { " *" } else { "" };
                            ascii_tree::Tree::Leaf(vec![format!("{tab:?}{marker}")])
                        })
                        .collect(),
                ),
                None => ascii_tree::Tree::Leaf(vec![format!("missing {stack_id:?}")]),
            },
            Node::Fork(fork_id) => match self.forks.get(fork_id) {
                Some(fork) => {
                    let area = fork.area;
                    let desc = format!(
                        "{:?} {}x{}+{}+{} split {}",
                        fork.orientation, area.width, area.height, area.x, area.y, fork.length_left
                    );
                    ascii_tree::Tree::Node(desc, fork.children().map(|child| self.ascii_tree(child)).collect())
                }
                None => ascii_tree::Tree::Leaf(vec![format!("missing {fork_id:?}")]),
            },
        }
    }
}

/// Orders a fork whose right child is the attacher according to `move_by`.
fn place(fork: &mut Fork, move_by: MoveBy) {
    let (orientation, swap) = match move_by {
        MoveBy::Cursor { orientation, swap } => (orientation, swap),
        MoveBy::Source(src) => {
            let orientation = Orientation::for_area(fork.area);
            let (from, to) = (src.center(), fork.area.center());
            let swap = match orientation {
                Orientation::Horizontal => from.x < to.x,
                Orientation::Vertical => from.y < to.y,
            };
            (orientation, swap)
        }
        MoveBy::Auto | MoveBy::Stack => (Orientation::for_area(fork.area), false),
    };
    fork.orientation = orientation;
    fork.orientation_changed = false;
    if swap {
        fork.swap_branches();
    }
}

fn spans(a_start: i32, a_end: i32, b_start: i32, b_end: i32) -> bool { a_start < b_end && b_start < a_end }

pub struct Iter<'a> {
    forest: &'a Forest,
    pending: Vec<Node>,
    kind: Option<NodeKind>,
}

impl Iterator for Iter<'_> {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        while let Some(node) = self.pending.pop() {
            if let Node::Fork(id) = node
                && let Some(fork) = self.forest.forks.get(id)
            {
                self.pending.extend(fork.right);
                self.pending.push(fork.left);
            }
            if self.kind.is_none_or(|kind| kind == node.kind()) {
                return Some(node);
            }
        }
        None
    }
}
