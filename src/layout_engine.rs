pub mod auto_tiler;
mod error;
pub mod forest;
pub mod fork;
pub(crate) mod graph;
pub mod movement;
pub mod node;
pub mod stack;
pub mod tiler;

pub use auto_tiler::{AutoTiler, Deferred};
pub use error::LayoutError;
pub use forest::{Forest, Measurement, MoveBy};
pub use fork::{Branch, Fork, ForkId, Replacement};
pub use graph::{Direction, Orientation};
pub use movement::Movement;
pub use node::{Node, NodeKind};
pub use stack::{Stack, StackId};
pub use tiler::Tiler;

#[cfg(test)]
mod tests;
