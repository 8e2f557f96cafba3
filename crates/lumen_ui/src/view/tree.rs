//! Lookups over an owned view hierarchy.

use super::core::View;
use super::node::ViewId;

/// Finds the view with `id` in the hierarchy rooted at `view`, depth first.
pub fn find_view_mut<'a>(view: &'a mut dyn View, id: ViewId) -> Option<&'a mut dyn View> {
    if view.id() == id {
        return Some(view);
    }

    for child in view.children_mut() {
        if let Some(found) = find_view_mut(child.as_mut(), id) {
            return Some(found);
        }
    }

    None
}
