use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use super::graph::Orientation;
use super::node::Node;
use super::stack::{Stack, StackId};
use crate::model::{Entity, WorkspaceId};
use crate::sys::geometry::Rect;

slotmap::new_key_type! {
    pub struct ForkId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    Left,
    Right,
}

/// A binary split of one rectangular area.
///
/// `length_left` is the position of the internal edge, measured in pixels
/// from the area's origin along the split axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fork {
    pub left: Node,
    pub right: Option<Node>,
    pub area: Rect,
    pub area_left: Rect,
    pub area_right: Rect,
    pub orientation: Orientation,
    pub orientation_changed: bool,
    pub length_left: i32,
    pub prev_length_left: i32,
    pub prev_ratio: f64,
    pub minimum_ratio: f64,
    pub is_toplevel: bool,
    pub smart_gapped: bool,
    pub workspace: u32,
    pub monitor: u32,
}

/// Child regions produced by [`Fork::measure`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Regions {
    pub left: (Node, Rect),
    pub right: Option<(Node, Rect)>,
}

/// A pending repoint of one fork slot from `old` to `new`.
///
/// Computing a replacement does not touch the tree; the forest applies it
/// later so two replacements can be staged before either takes effect.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Replacement {
    pub branch: Branch,
    pub stack: Option<StackId>,
    pub old: Entity,
    pub new: Entity,
}

impl Fork {
    pub fn new(
        left: Node,
        right: Option<Node>,
        area: Rect,
        id: WorkspaceId,
        orientation: Orientation,
    ) -> Fork {
        let mut fork = Fork {
            left,
            right,
            area,
            area_left: area,
            area_right: Rect::default(),
            orientation,
            orientation_changed: false,
            length_left: 0,
            prev_length_left: 0,
            prev_ratio: 0.5,
            minimum_ratio: 0.1,
            is_toplevel: false,
            smart_gapped: false,
            workspace: id.workspace,
            monitor: id.monitor,
        };
        fork.length_left = fork.length() / 2;
        fork.prev_length_left = fork.length_left;
        fork
    }

    pub fn workspace_id(&self) -> WorkspaceId { WorkspaceId::new(self.monitor, self.workspace) }

    pub fn is_horizontal(&self) -> bool { self.orientation == Orientation::Horizontal }

    /// Size of the area along the split axis.
    pub fn length(&self) -> i32 {
        if self.is_horizontal() { self.area.width } else { self.area.height }
    }

    /// Size of the area across the split axis.
    pub fn depth(&self) -> i32 {
        if self.is_horizontal() { self.area.height } else { self.area.width }
    }

    pub fn ratio(&self) -> f64 {
        let length = self.length();
        if length == 0 { self.prev_ratio } else { f64::from(self.length_left) / f64::from(length) }
    }

    pub fn set_area(&mut self, area: Rect) -> Rect {
        self.area = area;
        self.area
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        if orientation != self.orientation {
            self.orientation = orientation;
            self.orientation_changed = true;
        }
    }

    pub fn toggle_orientation(&mut self) {
        self.orientation = self.orientation.toggle();
        self.orientation_changed = true;
    }

    /// Splits along the longer axis of the current area.
    pub fn rebalance_orientation(&mut self) {
        self.set_orientation(if self.area.height > self.area.width {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        });
    }

    pub fn swap_branches(&mut self) {
        if let Some(right) = self.right.as_mut() {
            std::mem::swap(&mut self.left, right);
        }
    }

    /// Moves the internal edge, keeping both sides at least `minimum_ratio`
    /// of the length.
    pub fn set_ratio(&mut self, left_length: i32) -> &mut Self {
        let length = self.length();
        let min = (f64::from(length) * self.minimum_ratio).round() as i32;
        let clamped = if length > 2 * min { left_length.clamp(min, length - min) } else { length / 2 };
        self.length_left = clamped;
        self.prev_length_left = clamped;
        if length > 0 {
            self.prev_ratio = f64::from(clamped) / f64::from(length);
        }
        self
    }

    /// Region a child occupies at the current split, ignoring gaps.
    pub fn area_of(&self, branch: Branch) -> Rect {
        if self.right.is_none() {
            return self.area;
        }
        let (left, right) = split(self.area, self.orientation, self.length_left, 0);
        match branch {
            Branch::Left => left,
            Branch::Right => right,
        }
    }

    pub fn child(&self, branch: Branch) -> Option<Node> {
        match branch {
            Branch::Left => Some(self.left),
            Branch::Right => self.right,
        }
    }

    pub fn set_child(&mut self, branch: Branch, node: Node) {
        match branch {
            Branch::Left => self.left = node,
            Branch::Right => self.right = Some(node),
        }
    }

    pub fn branch_of(&self, node: Node) -> Option<Branch> {
        if self.left == node {
            Some(Branch::Left)
        } else if self.right == Some(node) {
            Some(Branch::Right)
        } else {
            None
        }
    }

    pub fn children(&self) -> impl Iterator<Item = Node> + '_ {
        std::iter::once(self.left).chain(self.right)
    }

    /// Finds the direct child slot holding `window`, either as a plain
    /// window or as a stack member.
    pub fn slot_of(&self, stacks: &SlotMap<StackId, Stack>, window: Entity) -> Option<(Branch, Node)> {
        [Branch::Left, Branch::Right].into_iter().find_map(|branch| {
            let node = self.child(branch)?;
            let holds = match node {
                Node::Window(entity) => entity == window,
                Node::Stack(stack) => stacks.get(stack).is_some_and(|s| s.contains(window)),
                Node::Fork(_) => false,
            };
            holds.then_some((branch, node))
        })
    }

    /// Stages a repoint of whichever direct child holds `old` so it holds
    /// `new` instead. Returns `None` if `old` is not a direct child.
    pub fn replace_window(
        &self,
        stacks: &SlotMap<StackId, Stack>,
        old: Entity,
        new: Entity,
    ) -> Option<Replacement> {
        let (branch, node) = self.slot_of(stacks, old)?;
        Some(Replacement { branch, stack: node.stack(), old, new })
    }

    /// Computes the regions of both children for `area`.
    ///
    /// Only this fork's own bookkeeping changes; nothing is applied to any
    /// window. A changed orientation or a resized area keeps the split at
    /// the same ratio. Toplevel forks keep their pixel split unless the
    /// orientation changed.
    pub fn measure(&mut self, area: Rect, gap_inner: i32) -> Regions {
        let ratio = if self.orientation_changed {
            self.orientation_changed = false;
            let depth = self.depth();
            Some(if depth > 0 { f64::from(self.length_left) / f64::from(depth) } else { self.prev_ratio })
        } else if !self.is_toplevel {
            Some(self.ratio())
        } else if self.length() == 0 {
            Some(self.prev_ratio)
        } else {
            None
        };

        self.area = area;
        if let Some(ratio) = ratio {
            self.length_left = (ratio * f64::from(self.length())).round() as i32;
        }
        self.length_left = self.length_left.clamp(0, self.length().max(0));

        let Some(right) = self.right else {
            self.area_left = area;
            self.area_right = Rect::default();
            return Regions { left: (self.left, area), right: None };
        };

        let (left_area, right_area) = split(area, self.orientation, self.length_left, gap_inner / 2);
        self.area_left = left_area;
        self.area_right = right_area;
        Regions {
            left: (self.left, left_area),
            right: Some((right, right_area)),
        }
    }
}

/// Divides `area` at `length` along `orientation`, pulling both children
/// back from the shared edge by `half_gap`.
pub fn split(area: Rect, orientation: Orientation, length: i32, half_gap: i32) -> (Rect, Rect) {
    match orientation {
        Orientation::Horizontal => (
            Rect::new(area.x, area.y, (length - half_gap).max(0), area.height),
            Rect::new(
                area.x + length + half_gap,
                area.y,
                (area.width - length - half_gap).max(0),
                area.height,
            ),
        ),
        Orientation::Vertical => (
            Rect::new(area.x, area.y, area.width, (length - half_gap).max(0)),
            Rect::new(
                area.x,
                area.y + length + half_gap,
                area.width,
                (area.height - length - half_gap).max(0),
            ),
        ),
    }
}
