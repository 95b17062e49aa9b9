pub mod ecs;
pub mod window;

pub use ecs::{Entity, Storage, World};
pub use window::{Host, Monitors, Pointer, SettingsProvider, Tags, Windows, WorkspaceId};
