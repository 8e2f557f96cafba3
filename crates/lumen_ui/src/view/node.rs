//! Per-view shared record.
//!
//! A view's geometry and flags live in a [`ViewNode`] behind an `Arc`, so
//! that the parent link and animation callbacks can reach them through
//! `Weak` references without borrowing the view itself.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use lumen_core::animation::{AnimationTag, Animator, Easing, Tween};
use lumen_core::geometry::Boundary;
use parking_lot::RwLock;

use crate::app::Application;

/// Unique identifier for a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u64);

impl ViewId {
    /// Mints an id no other view shares.
    #[must_use]
    pub fn mint() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct NodeState {
    boundary: Boundary,
    focused: bool,
    focusable: bool,
    hidden: bool,
    alpha: f32,
    needs_layout: bool,
    parent: Option<Weak<ViewNode>>,
}

/// Geometry and flags of one view.
#[derive(Debug)]
pub struct ViewNode {
    id: ViewId,
    state: RwLock<NodeState>,
}

impl ViewNode {
    fn new() -> Self {
        Self {
            id: ViewId::mint(),
            state: RwLock::new(NodeState {
                boundary: Boundary::default(),
                focused: false,
                focusable: false,
                hidden: false,
                alpha: 1.0,
                needs_layout: true,
                parent: None,
            }),
        }
    }

    /// The view's id.
    #[must_use]
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Current boundary.
    #[must_use]
    pub fn boundary(&self) -> Boundary {
        self.state.read().boundary
    }

    /// Returns true while the view holds focus.
    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.state.read().focused
    }

    /// Returns true if the view can take focus.
    #[must_use]
    pub fn is_focusable(&self) -> bool {
        self.state.read().focusable
    }

    /// Returns true once a hide transition has completed.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.state.read().hidden
    }

    /// Current opacity (0-1).
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.state.read().alpha
    }

    /// Returns true if the view will be laid out on its next frame.
    #[must_use]
    pub fn needs_layout(&self) -> bool {
        self.state.read().needs_layout
    }

    /// Marks the view for re-layout on its next frame.
    pub fn invalidate(&self) {
        self.state.write().needs_layout = true;
    }

    /// The enclosing view, if attached and still alive.
    #[must_use]
    pub fn parent(&self) -> Option<ViewHandle> {
        self.state
            .read()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(ViewHandle)
    }

    /// Focus is owned by the application.
    pub(crate) fn set_focused(&self, focused: bool) {
        self.state.write().focused = focused;
    }

    fn set_alpha(&self, alpha: f32) {
        self.state.write().alpha = alpha;
    }

    fn set_hidden(&self, hidden: bool) {
        self.state.write().hidden = hidden;
    }
}

/// Shared, cheaply clonable reference to a view's node.
#[derive(Debug, Clone)]
pub struct ViewHandle(Arc<ViewNode>);

impl ViewHandle {
    /// Returns true if both handles name the same view.
    #[must_use]
    pub fn same_view(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::ops::Deref for ViewHandle {
    type Target = ViewNode;

    fn deref(&self) -> &ViewNode {
        &self.0
    }
}

/// State every view embeds: its node plus the tag of its alpha field.
#[derive(Debug)]
pub struct ViewBase {
    node: Arc<ViewNode>,
    alpha_tag: AnimationTag,
}

impl ViewBase {
    /// Creates a detached, visible, unsized base.
    #[must_use]
    pub fn new() -> Self {
        Self {
            node: Arc::new(ViewNode::new()),
            alpha_tag: AnimationTag::mint(),
        }
    }

    /// The view's id.
    #[must_use]
    pub fn id(&self) -> ViewId {
        self.node.id
    }

    /// Returns a handle to this view's node.
    #[must_use]
    pub fn handle(&self) -> ViewHandle {
        ViewHandle(Arc::clone(&self.node))
    }

    pub(crate) fn downgrade(&self) -> Weak<ViewNode> {
        Arc::downgrade(&self.node)
    }

    /// Tag under which show/hide transitions are scheduled.
    #[must_use]
    pub fn alpha_tag(&self) -> AnimationTag {
        self.alpha_tag
    }

    /// Overwrites the whole boundary.
    pub fn set_boundaries(&self, x: i32, y: i32, width: u32, height: u32) {
        self.set_boundary(Boundary::new(x, y, width, height));
    }

    /// Overwrites the whole boundary, unset extents included.
    pub fn set_boundary(&self, boundary: Boundary) {
        self.node.state.write().boundary = boundary;
    }

    /// Sets the width. Does not invalidate.
    pub fn set_width(&self, width: u32) {
        self.node.state.write().boundary.width = Some(width);
    }

    /// Sets the height. Does not invalidate.
    pub fn set_height(&self, height: u32) {
        self.node.state.write().boundary.height = Some(height);
    }

    /// Current boundary.
    #[must_use]
    pub fn boundary(&self) -> Boundary {
        self.node.boundary()
    }

    /// Left edge.
    #[must_use]
    pub fn x(&self) -> i32 {
        self.boundary().x
    }

    /// Top edge.
    #[must_use]
    pub fn y(&self) -> i32 {
        self.boundary().y
    }

    /// Width, 0 while unset.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.boundary().width_or_zero()
    }

    /// Height, 0 while unset.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.boundary().height_or_zero()
    }

    /// Attaches to (or, with `None`, detaches from) an enclosing view.
    pub fn set_parent(&self, parent: Option<&ViewHandle>) {
        self.node.state.write().parent = parent.map(|p| Arc::downgrade(&p.0));
    }

    /// The enclosing view, if any.
    #[must_use]
    pub fn parent(&self) -> Option<ViewHandle> {
        self.node.parent()
    }

    /// Returns true while the view holds focus.
    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.node.is_focused()
    }

    /// Allows or forbids focus.
    pub fn set_focusable(&self, focusable: bool) {
        self.node.state.write().focusable = focusable;
    }

    /// Returns true if the view can take focus.
    #[must_use]
    pub fn is_focusable(&self) -> bool {
        self.node.is_focusable()
    }

    /// Returns true once a hide transition has completed.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.node.is_hidden()
    }

    /// Current opacity.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.node.alpha()
    }

    /// Marks the view for re-layout on its next frame.
    pub fn invalidate(&self) {
        self.node.invalidate();
    }

    /// Returns true if the view will be laid out on its next frame.
    #[must_use]
    pub fn needs_layout(&self) -> bool {
        self.node.needs_layout()
    }

    pub(crate) fn take_needs_layout(&self) -> bool {
        std::mem::replace(&mut self.node.state.write().needs_layout, false)
    }

    /// Generic focus search: the view itself if it accepts focus.
    #[must_use]
    pub fn default_focus(&self) -> Option<ViewHandle> {
        self.is_focusable().then(|| self.handle())
    }

    /// Fades the view in. Supersedes any pending show or hide.
    pub fn show(&self, app: &Application, on_complete: impl FnOnce(&Animator) + Send + 'static) {
        let animator = app.animator();
        animator.cancel_by_tag(self.alpha_tag);

        {
            let mut state = self.node.state.write();
            state.hidden = false;
            state.alpha = 0.0;
        }

        let node = self.downgrade();
        animator.schedule(
            Tween::new(self.alpha_tag, 0.0, 1.0, app.style().animation.show())
                .with_easing(Easing::QuadInOut)
                .on_update(move |alpha| {
                    if let Some(node) = node.upgrade() {
                        node.set_alpha(alpha);
                    }
                })
                .on_complete(on_complete),
        );
    }

    /// Fades the view out and marks it hidden. Supersedes any pending show
    /// or hide.
    pub fn hide(&self, app: &Application, on_complete: impl FnOnce(&Animator) + Send + 'static) {
        let animator = app.animator();
        animator.cancel_by_tag(self.alpha_tag);

        let from = self.alpha();
        let node = self.downgrade();
        let done = self.downgrade();
        animator.schedule(
            Tween::new(self.alpha_tag, from, 0.0, app.style().animation.show())
                .with_easing(Easing::QuadInOut)
                .on_update(move |alpha| {
                    if let Some(node) = node.upgrade() {
                        node.set_alpha(alpha);
                    }
                })
                .on_complete(move |animator| {
                    if let Some(node) = done.upgrade() {
                        node.set_hidden(true);
                    }
                    on_complete(animator);
                }),
        );
    }
}

impl Default for ViewBase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_set_boundaries_idempotent() {
        let base = ViewBase::new();
        base.set_boundaries(10, 20, 300, 40);
        let first = (base.x(), base.y(), base.width(), base.height());

        base.set_boundaries(10, 20, 300, 40);
        assert_eq!((base.x(), base.y(), base.width(), base.height()), first);
        assert_eq!(base.boundary(), Boundary::new(10, 20, 300, 40));
    }

    #[test]
    fn test_partial_setters_do_not_invalidate() {
        let base = ViewBase::new();
        assert!(base.take_needs_layout());

        base.set_width(12);
        base.set_height(7);
        assert!(!base.needs_layout());
        assert_eq!(base.boundary().width, Some(12));

        base.invalidate();
        assert!(base.needs_layout());
    }

    #[test]
    fn test_parent_link_is_weak() {
        let child = ViewBase::new();
        {
            let parent = ViewBase::new();
            child.set_parent(Some(&parent.handle()));
            assert_eq!(child.parent().map(|p| p.id()), Some(parent.id()));
        }
        assert!(child.parent().is_none());
    }

    #[test]
    fn test_default_focus() {
        let base = ViewBase::new();
        assert!(base.default_focus().is_none());

        base.set_focusable(true);
        let found = base.default_focus().map(|h| h.id());
        assert_eq!(found, Some(base.id()));
    }

    #[test]
    fn test_hide_then_show_cancels_hide() {
        let app = Application::new();
        let base = ViewBase::new();

        base.hide(&app, |_| {});
        base.show(&app, |_| {});
        assert_eq!(app.animator().live_count(base.alpha_tag()), 1);

        app.tick(Duration::from_secs(1));
        assert!(!base.is_hidden());
        assert!((base.alpha() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_hide_marks_hidden() {
        let app = Application::new();
        let base = ViewBase::new();

        base.hide(&app, |_| {});
        app.tick(Duration::from_secs(1));

        assert!(base.is_hidden());
        assert!(base.alpha().abs() < f32::EPSILON);
    }
}
