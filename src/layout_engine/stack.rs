use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::common::config::TabPlacement;
use crate::model::{Entity, Monitors, Windows, WorkspaceId};
use crate::sys::geometry::Rect;

slotmap::new_key_type! {
    pub struct StackId;
}

/// Windows sharing one fork slot. Only the active tab is shown.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    pub active: Entity,
    pub active_id: usize,
    pub prev_active: Option<Entity>,
    pub prev_active_id: usize,
    pub tabs: Vec<Entity>,
    pub monitor: u32,
    pub workspace: u32,
    pub tabs_height: i32,
    pub tab_placement: TabPlacement,
    /// Region shared by every member window.
    pub rect: Rect,
    /// `rect` plus the tab strip.
    pub stack_rect: Rect,
}

impl Stack {
    pub fn new(active: Entity, id: WorkspaceId, tabs_height: i32, tab_placement: TabPlacement) -> Stack {
        Stack {
            active,
            active_id: 0,
            prev_active: None,
            prev_active_id: 0,
            tabs: Vec::new(),
            monitor: id.monitor,
            workspace: id.workspace,
            tabs_height,
            tab_placement,
            rect: Rect::default(),
            stack_rect: Rect::default(),
        }
    }

    pub fn workspace_id(&self) -> WorkspaceId { WorkspaceId::new(self.monitor, self.workspace) }

    pub fn contains(&self, window: Entity) -> bool { self.tabs.contains(&window) }

    pub fn len(&self) -> usize { self.tabs.len() }

    pub fn is_empty(&self) -> bool { self.tabs.is_empty() }

    pub fn position(&self, window: Entity) -> Option<usize> {
        self.tabs.iter().position(|&tab| tab == window)
    }

    /// Appends a tab. It only becomes active when activated.
    pub fn add(&mut self, window: Entity) {
        if !self.contains(window) {
            self.tabs.push(window);
        }
    }

    pub fn add_front(&mut self, window: Entity) {
        if !self.contains(window) {
            self.tabs.insert(0, window);
            if self.contains(self.active) {
                self.active_id += 1;
            }
        }
    }

    /// Picks a tab to show after membership changed.
    pub fn auto_activate<H: Windows + Monitors>(&mut self, host: &mut H) -> Option<Entity> {
        if self.tabs.is_empty() {
            return None;
        }
        if self.active_id >= self.tabs.len() {
            self.active_id = self.tabs.len() - 1;
        }
        let entity = self.tabs[self.active_id];
        self.activate(host, entity);
        Some(entity)
    }

    /// Returns to the tab that was shown before the current one.
    pub fn activate_prev<H: Windows + Monitors>(&mut self, host: &mut H) {
        if let Some(prev) = self.prev_active {
            self.activate(host, prev);
        }
    }

    /// Shows `entity` and hides the other members.
    pub fn activate<H: Windows + Monitors>(&mut self, host: &mut H, entity: Entity) {
        let Some(idx) = self.position(entity) else { return };

        if entity != self.active && self.contains(self.active) {
            self.prev_active = Some(self.active);
            self.prev_active_id = self.active_id;
        }
        self.active = entity;
        self.active_id = idx;

        let permitted = self.permitted_to_show(host.active_workspace());
        self.reset_visibility(host, permitted);
    }

    /// Removes a member, returning the index it had.
    ///
    /// If the active tab was removed, the caller is expected to follow up
    /// with [`Stack::auto_activate`].
    pub fn remove_tab(&mut self, window: Entity) -> Option<usize> {
        if self.prev_active == Some(window) {
            self.prev_active = None;
            self.prev_active_id = 0;
        }

        let idx = self.position(window)?;
        self.tabs.remove(idx);
        if self.active_id > idx {
            self.active_id -= 1;
        }
        Some(idx)
    }

    /// Puts `new` in the tab currently held by `old`.
    pub fn replace(&mut self, old: Entity, new: Entity) -> bool {
        let Some(idx) = self.position(old) else { return false };
        self.tabs[idx] = new;
        if self.active == old {
            self.active = new;
        }
        if self.prev_active == Some(old) {
            self.prev_active = Some(new);
        }
        true
    }

    /// Moves `window` next to `target`, before it unless `after` is set.
    pub fn reorder(&mut self, window: Entity, target: Entity, after: bool) -> bool {
        if window == target || !self.contains(target) {
            return false;
        }
        let Some(from) = self.position(window) else { return false };
        let active = self.active;
        self.tabs.remove(from);
        let Some(to) = self.position(target) else { return false };
        let to = if after { to + 1 } else { to };
        self.tabs.insert(to, window);
        if let Some(idx) = self.position(active) {
            self.active_id = idx;
        }
        trace!(?window, ?target, after, "reordered stack");
        true
    }

    pub fn permitted_to_show(&self, active_workspace: u32) -> bool { active_workspace == self.workspace }

    pub fn reset_visibility<H: Windows>(&self, host: &mut H, permitted: bool) {
        for (idx, &tab) in self.tabs.iter().enumerate() {
            if permitted && idx == self.active_id {
                host.show(tab);
            } else {
                host.hide(tab);
            }
        }
    }

    /// Re-applies visibility after the window system reordered its windows.
    pub fn restack<H: Windows + Monitors>(&self, host: &mut H) {
        let permitted = self.permitted_to_show(host.active_workspace());
        self.reset_visibility(host, permitted);
    }

    /// Region left for the member windows once the tab strip is carved out
    /// of `slot`.
    pub fn content_rect(&self, slot: Rect) -> Rect {
        let tabs = self.tabs_height.min(slot.height.max(0));
        match self.tab_placement {
            TabPlacement::Top => Rect::new(slot.x, slot.y + tabs, slot.width, slot.height - tabs),
            TabPlacement::Bottom => Rect::new(slot.x, slot.y, slot.width, slot.height - tabs),
        }
    }

    pub fn update_positions(&mut self, rect: Rect) {
        self.rect = rect;
        self.stack_rect = match self.tab_placement {
            TabPlacement::Top => Rect::new(
                rect.x,
                rect.y - self.tabs_height,
                rect.width,
                rect.height + self.tabs_height,
            ),
            TabPlacement::Bottom => {
                Rect::new(rect.x, rect.y, rect.width, rect.height + self.tabs_height)
            }
        };
    }

    /// Rectangle reserved for the tab strip.
    pub fn tab_rect(&self) -> Rect {
        match self.tab_placement {
            TabPlacement::Top => {
                Rect::new(self.stack_rect.x, self.stack_rect.y, self.stack_rect.width, self.tabs_height)
            }
            TabPlacement::Bottom => {
                Rect::new(self.rect.x, self.rect.bottom(), self.rect.width, self.tabs_height)
            }
        }
    }
}
