use serde::{Deserialize, Serialize};

use super::{ForkId, StackId};
use crate::model::Entity;

/// A slot in a fork: a window, a nested fork, or a stack of windows.
///
/// Nodes only reference; the forest owns what they point to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Fork(ForkId),
    Window(Entity),
    Stack(StackId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Fork,
    Window,
    Stack,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Fork(_) => NodeKind::Fork,
            Node::Window(_) => NodeKind::Window,
            Node::Stack(_) => NodeKind::Stack,
        }
    }

    pub fn is_fork(&self, fork: ForkId) -> bool { *self == Node::Fork(fork) }

    pub fn is_window(&self, window: Entity) -> bool { *self == Node::Window(window) }

    pub fn is_stack(&self, stack: StackId) -> bool { *self == Node::Stack(stack) }

    pub fn fork(&self) -> Option<ForkId> {
        match *self {
            Node::Fork(id) => Some(id),
            _ => None,
        }
    }

    pub fn window(&self) -> Option<Entity> {
        match *self {
            Node::Window(id) => Some(id),
            _ => None,
        }
    }

    pub fn stack(&self) -> Option<StackId> {
        match *self {
            Node::Stack(id) => Some(id),
            _ => None,
        }
    }
}
