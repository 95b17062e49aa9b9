//! Scripted sessions against the headless window system.
//!
//! A [`Scenario`] names windows and drives them through [`Step`]s. Every step
//! applied through a [`Driver`] can be recorded, one RON value per line after
//! a header line holding the configuration, and replayed later.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Command, Event, Reactor};
use crate::common::collections::HashMap;
use crate::common::config::{Config, LayoutSettings};
use crate::model::{Entity, Windows};
use crate::sys::geometry::{Point, Rect};
use crate::sys::headless::{HeadlessWindowSystem, WindowSpec};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    AddMonitor(Rect),
    SetWorkArea { monitor: u32, work_area: Rect },
    SwitchWorkspace(u32),
    Spawn {
        name: String,
        #[serde(default)]
        spec: WindowSpec,
    },
    Focus(String),
    Close(String),
    Minimize(String),
    /// Resizes a window by hand, then reports the finished resize.
    DragResize { name: String, rect: Rect },
    /// Drags a window under the cursor and drops it there.
    Drop {
        name: String,
        cursor: Point,
        #[serde(default)]
        via_overview: bool,
    },
    Command(Command),
    Settings(LayoutSettings),
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Scenario {
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn read(path: &Path) -> anyhow::Result<Scenario> {
        let buf = std::fs::read_to_string(path)?;
        ron::de::from_str(&buf).with_context(|| format!("parsing {}", path.display()))
    }
}

/// Appends applied steps to a file, if one was given.
pub struct Record {
    file: Option<File>,
}

impl Record {
    pub fn new(path: Option<&Path>) -> anyhow::Result<Self> {
        Ok(Self { file: path.map(File::create).transpose()? })
    }

    fn start(&mut self, config: &Config) -> anyhow::Result<()> {
        let Some(file) = self.file.as_mut() else { return Ok(()) };
        writeln!(file, "{}", ron::ser::to_string(config)?)?;
        Ok(())
    }

    fn on_step(&mut self, step: &Step) -> anyhow::Result<()> {
        let Some(file) = self.file.as_mut() else { return Ok(()) };
        writeln!(file, "{}", ron::ser::to_string(step)?)?;
        Ok(())
    }
}

/// Runs steps against a [`Reactor`] over the headless window system,
/// ticking the reactor after each one.
pub struct Driver {
    reactor: Reactor<HeadlessWindowSystem>,
    names: HashMap<String, Entity>,
    record: Record,
}

impl Driver {
    pub fn new(config: &Config, mut record: Record) -> anyhow::Result<Self> {
        record.start(config)?;
        let host = HeadlessWindowSystem::with_settings(config.settings.layout.clone());
        Ok(Driver {
            reactor: Reactor::new(&config.settings, host),
            names: HashMap::default(),
            record,
        })
    }

    pub fn reactor(&self) -> &Reactor<HeadlessWindowSystem> { &self.reactor }

    pub fn reactor_mut(&mut self) -> &mut Reactor<HeadlessWindowSystem> { &mut self.reactor }

    pub fn window(&self, name: &str) -> Option<Entity> { self.names.get(name).copied() }

    pub fn rect(&self, name: &str) -> Option<Rect> {
        self.window(name).and_then(|window| self.reactor.host().rect(window))
    }

    /// Final geometry of every named window, sorted by name.
    pub fn rects(&self) -> Vec<(String, Rect)> {
        let mut rects: Vec<(String, Rect)> = self
            .names
            .iter()
            .filter_map(|(name, &window)| Some((name.clone(), self.reactor.host().rect(window)?)))
            .collect();
        rects.sort_by(|a, b| a.0.cmp(&b.0));
        rects
    }

    pub fn run(&mut self, steps: impl IntoIterator<Item = Step>) -> anyhow::Result<()> {
        for step in steps {
            self.apply(step)?;
        }
        Ok(())
    }

    pub fn apply(&mut self, step: Step) -> anyhow::Result<()> {
        self.record.on_step(&step)?;
        debug!(?step, "applying step");

        match step {
            Step::AddMonitor(work_area) => {
                self.reactor.host_mut().add_monitor(work_area);
            }
            Step::SetWorkArea { monitor, work_area } => {
                self.reactor.host_mut().set_work_area(monitor, work_area);
                self.reactor.handle_event(Event::WorkAreaChanged(monitor));
            }
            Step::SwitchWorkspace(workspace) => self.reactor.host_mut().set_active_workspace(workspace),
            Step::Spawn { name, spec } => {
                if self.names.contains_key(&name) {
                    bail!("window {name:?} already exists");
                }
                let window = self.reactor.host_mut().spawn(spec);
                self.names.insert(name, window);
                self.reactor.handle_event(Event::WindowCreated(window));
            }
            Step::Focus(name) => {
                let window = self.lookup(&name)?;
                self.reactor.host_mut().focus(window);
                self.reactor.handle_event(Event::WindowFocused(window));
            }
            Step::Close(name) => {
                let window = self.lookup(&name)?;
                self.reactor.handle_event(Event::WindowDestroyed(window));
                self.reactor.host_mut().destroy(window);
                self.names.remove(&name);
            }
            Step::Minimize(name) => {
                let window = self.lookup(&name)?;
                self.reactor.host_mut().set_minimized(window, true);
            }
            Step::DragResize { name, rect } => {
                let window = self.lookup(&name)?;
                let Some(from) = self.reactor.host().rect(window) else { bail!("{name:?} has no geometry") };
                self.reactor.host_mut().set_rect(window, rect);
                self.reactor.handle_event(Event::WindowResized { window, from });
            }
            Step::Drop { name, cursor, via_overview } => {
                let window = self.lookup(&name)?;
                self.reactor.host_mut().set_cursor(cursor);
                self.reactor.handle_event(Event::WindowDropped { window, via_overview });
            }
            Step::Command(command) => self.reactor.handle_event(Event::Command(command)),
            Step::Settings(settings) => {
                self.reactor.host_mut().set_settings(settings);
                self.reactor.handle_event(Event::SettingsChanged);
            }
        }

        self.reactor.handle_event(Event::Tick);
        Ok(())
    }

    fn lookup(&self, name: &str) -> anyhow::Result<Entity> {
        match self.window(name) {
            Some(window) => Ok(window),
            None => bail!("no window named {name:?}"),
        }
    }
}

/// Replays a recording made through [`Record`], returning the driver in its
/// final state.
pub fn replay(path: &Path) -> anyhow::Result<Driver> {
    let file = BufReader::new(File::open(path)?);
    let mut lines = file.lines();
    let Some(header) = lines.next() else { bail!("empty recording {}", path.display()) };
    let config: Config = ron::de::from_str(&header?)?;

    let mut driver = Driver::new(&config, Record::new(None)?)?;
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let step: Step = ron::de::from_str(&line)?;
        if let Err(why) = driver.apply(step) {
            warn!(%why, "replayed step failed");
        }
    }
    Ok(driver)
}
