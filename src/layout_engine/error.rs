use thiserror::Error;

use super::{ForkId, StackId};
use crate::model::Entity;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("window {0:?} is not attached to the tree")]
    WindowNotAttached(Entity),
    #[error("fork {0:?} does not exist")]
    ForkMissing(ForkId),
    #[error("stack {0:?} does not exist")]
    StackMissing(StackId),
    #[error("window {0:?} no longer exists")]
    WindowMissing(Entity),
    #[error("ignoring focus")]
    IgnoringFocus,
    #[error("no window has been previously focused")]
    NoPreviousFocus,
    #[error("no focus window")]
    NoFocusWindow,
    #[error("tiled window and attach window are the same window")]
    SameWindow,
    #[error("focused window is not tilable")]
    NotTilable,
    #[error("previous window was minimized")]
    Minimized,
    #[error("focused window is not attached")]
    FocusNotAttached,
    #[error("window is not on the same monitor or workspace")]
    DifferentWorkspace,
    #[error("cannot toggle maximized window")]
    Maximized,
}
