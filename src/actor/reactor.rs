//! Event orchestration.
//!
//! The reactor receives window system events and user commands, forwards them
//! to the auto-tiler and keyboard tiler, and owns the queue of work deferred
//! to the next tick.

pub mod replay;


use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use crate::common::config::Settings;
use crate::layout_engine::tiler::movements_are_valid;
use crate::layout_engine::{AutoTiler, Deferred, Direction, Tiler, movement};
use crate::model::{Entity, Host};
use crate::sys::executor::Scheduler;
use crate::sys::geometry::Rect;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    WindowCreated(Entity),
    /// Sent before the window system forgets the window.
    WindowDestroyed(Entity),
    WindowFocused(Entity),
    /// The user finished resizing `window`, which had geometry `from`.
    WindowResized {
        window: Entity,
        from: Rect,
    },
    /// The user finished dragging `window` to the cursor position.
    WindowDropped {
        window: Entity,
        via_overview: bool,
    },
    WorkAreaChanged(u32),
    /// Layout settings on the host changed.
    SettingsChanged,
    Command(Command),
    Tick,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::VariantNames)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Command {
    ToggleTiling,
    ToggleFloating,
    ToggleOrientation,
    ToggleStacking,
    Move(Direction),
    Resize { direction: Direction, inverse: bool },
    SwapEnter,
    Swap(Direction),
    SwapAccept,
    SwapExit,
}

pub struct Reactor<H: Host> {
    host: H,
    auto_tiler: AutoTiler,
    tiler: Tiler,
    deferred: Scheduler<Deferred>,
    auto_tile: bool,
}

impl<H: Host> Reactor<H> {
    pub fn new(settings: &Settings, host: H) -> Self {
        Reactor {
            host,
            auto_tiler: AutoTiler::default(),
            tiler: Tiler::new(),
            deferred: Scheduler::new(),
            auto_tile: settings.auto_tile,
        }
    }

    pub fn host(&self) -> &H { &self.host }

    pub fn host_mut(&mut self) -> &mut H { &mut self.host }

    pub fn auto_tiler(&self) -> &AutoTiler { &self.auto_tiler }

    pub fn tiler(&self) -> &Tiler { &self.tiler }

    pub fn is_tiling(&self) -> bool { self.auto_tile }

    pub fn pending_tasks(&self) -> usize { self.deferred.len() }

    pub fn draw_tree(&self) -> String { self.auto_tiler.forest.draw_tree() }

    pub fn handle_events(&mut self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.handle_event(event);
        }
    }

    #[instrument(name = "reactor::handle_event", skip(self))]
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::WindowCreated(window) => self.on_window_created(window),
            Event::WindowDestroyed(window) => self.on_window_destroyed(window),
            Event::WindowFocused(window) => self.on_window_focused(window),
            Event::WindowResized { window, from } => self.on_window_resized(window, from),
            Event::WindowDropped { window, via_overview } => {
                if self.auto_tile && self.auto_tiler.forest.is_attached(window) {
                    self.auto_tiler.on_drop(&mut self.host, window, via_overview);
                }
            }
            Event::WorkAreaChanged(monitor) => {
                self.auto_tiler.refresh_toplevels(&mut self.host, Some(monitor));
            }
            Event::SettingsChanged => self.auto_tiler.refresh_settings(&mut self.host),
            Event::Command(command) => self.handle_command(command),
            Event::Tick => self.tick(),
        }
        debug!("\n{}", self.auto_tiler.forest.draw_tree());
    }

    fn on_window_created(&mut self, window: Entity) {
        if !self.auto_tile || !self.host.is_tilable(window) {
            return;
        }
        if self.auto_tiler.should_float(&self.host, window) {
            debug!(?window, "window matches a float rule");
            return;
        }
        self.auto_tiler.auto_tile(&mut self.host, window, false);
        self.deferred.register(Deferred::Activate(window));
    }

    fn on_window_destroyed(&mut self, window: Entity) {
        if self.tiler.window == Some(window) || self.tiler.swap_window() == Some(window) {
            self.tiler.exit();
        }
        self.auto_tiler.detach_window(&mut self.host, window);
    }

    fn on_window_focused(&mut self, window: Entity) {
        let forest = &mut self.auto_tiler.forest;
        if let Some(stack) = forest.stack_of(window).and_then(|id| forest.stacks.get_mut(id))
            && stack.active != window
        {
            stack.activate(&mut self.host, window);
        }
    }

    /// Absorbs a drag-resize into the tree, or snaps the window back.
    fn on_window_resized(&mut self, window: Entity, from: Rect) {
        let Some(fork) = self.auto_tiler.forest.attached(window) else { return };
        let Some(to) = self.host.rect(window) else { return };
        if to == from {
            return;
        }
        let movements = movement::calculate(from, to);

        let forest = &mut self.auto_tiler.forest;
        if movements_are_valid(forest, window, &movements) {
            for movement in movements {
                forest.resize(&mut self.host, fork, window, movement, to);
            }
            if let Some(workspace) = forest.forks.get(fork).map(|f| f.workspace) {
                forest.arrange(&mut self.host, workspace, false);
            }
        } else {
            trace!(?window, ?movements, "resize cannot be absorbed");
            self.auto_tiler.reflow(&mut self.deferred, window);
        }
    }

    #[instrument(name = "reactor::handle_command", skip(self))]
    pub fn handle_command(&mut self, command: Command) {
        if command == Command::ToggleTiling {
            return self.toggle_tiling();
        }

        let host = &mut self.host;
        let at = &mut self.auto_tiler;
        match command {
            Command::ToggleTiling => {}
            Command::ToggleFloating => at.toggle_floating(host, &mut self.deferred),
            Command::ToggleOrientation => {
                if let Some(focused) = host.focus_window() {
                    at.toggle_orientation(host, focused);
                }
            }
            Command::ToggleStacking => {
                if let Some(focused) = host.focus_window() {
                    at.toggle_stacking(host, focused);
                    self.deferred.register(Deferred::Activate(focused));
                }
            }
            Command::Move(direction) => self.tiler.request_move(at, host, None, direction),
            Command::Resize { direction, inverse } => self.tiler.resize(at, host, direction, inverse),
            Command::SwapEnter => self.tiler.enter(host),
            Command::Swap(direction) => match direction {
                Direction::Left => self.tiler.swap_left(at, host),
                Direction::Right => self.tiler.swap_right(at, host),
                Direction::Up => self.tiler.swap_up(at, host),
                Direction::Down => self.tiler.swap_down(at, host),
            },
            Command::SwapAccept => self.tiler.accept(at, host, &mut self.deferred),
            Command::SwapExit => self.tiler.exit(),
        }
    }

    /// Turns automatic tiling off, releasing every window, or back on,
    /// tiling every eligible window.
    fn toggle_tiling(&mut self) {
        self.auto_tile = !self.auto_tile;
        info!(enabled = self.auto_tile, "toggled tiling");

        if !self.auto_tile {
            self.tiler.exit();
            let attached: Vec<Entity> = self.auto_tiler.forest.attached_windows().collect();
            for window in attached {
                self.auto_tiler.detach_window(&mut self.host, window);
            }
            return;
        }

        for window in self.host.all_windows() {
            if self.host.is_tilable(window) && !self.auto_tiler.should_float(&self.host, window) {
                self.auto_tiler.auto_tile(&mut self.host, window, true);
            }
        }
    }

    /// Runs everything deferred so far, then any queued keyboard moves.
    fn tick(&mut self) {
        for task in self.deferred.take() {
            trace!(?task, "running deferred task");
            self.auto_tiler.run_deferred(&mut self.host, task);
        }
        if self.tiler.pending_moves() > 0 {
            self.tiler.run_queue(&mut self.auto_tiler, &mut self.host, &mut self.deferred);
        }
    }
}
