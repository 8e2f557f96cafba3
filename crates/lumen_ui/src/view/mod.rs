//! View system: the shared contract every widget implements.
//!
//! A view owns its children outright (`Box<dyn View>`); the parent link is
//! a weak reference to the parent's [`ViewNode`].

mod core;
mod node;
mod tree;

pub use self::core::{FocusDirection, FrameContext, View, FOCUS_OUTLINE_MARGIN};
pub use node::{ViewBase, ViewHandle, ViewId, ViewNode};
pub use tree::find_view_mut;
