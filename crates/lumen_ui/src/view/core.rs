//! The view contract.

use lumen_core::canvas::Canvas;
use lumen_core::geometry::Rect;

use super::node::{ViewBase, ViewHandle, ViewId};
use crate::app::Application;

/// Margin between a focused view's boundary and its outline.
pub const FOCUS_OUTLINE_MARGIN: f32 = 5.0;

/// Direction a focus request travels in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusDirection {
    /// Not directional (programmatic focus).
    #[default]
    None,
    /// Up.
    Up,
    /// Down.
    Down,
    /// Left.
    Left,
    /// Right.
    Right,
}

/// Everything a layout or draw pass needs.
pub struct FrameContext<'a> {
    /// Drawing surface and text measurement.
    pub canvas: &'a mut dyn Canvas,
    /// Style, theme and fonts.
    pub app: &'a Application,
    alpha: f32,
}

impl<'a> FrameContext<'a> {
    /// Creates a context for one frame.
    pub fn new(canvas: &'a mut dyn Canvas, app: &'a Application) -> Self {
        Self {
            canvas,
            app,
            alpha: 1.0,
        }
    }

    /// Opacity inherited from the enclosing views.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}

impl std::fmt::Debug for FrameContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameContext")
            .field("alpha", &self.alpha)
            .finish_non_exhaustive()
    }
}

/// Base trait for all views.
///
/// Implementors provide the five hooks (`draw`, `layout`, `will_appear`,
/// `will_disappear`, `request_focus`); the draw-pass entry point
/// [`View::frame`] is shared.
pub trait View {
    /// Returns the view's base state.
    fn base(&self) -> &ViewBase;

    /// Draws the view's own content inside `rect`.
    fn draw(&mut self, ctx: &mut FrameContext<'_>, rect: Rect);

    /// Recomputes geometry. Runs at the start of a frame after
    /// [`ViewBase::invalidate`].
    fn layout(&mut self, _ctx: &mut FrameContext<'_>) {}

    /// The view is about to be shown.
    fn will_appear(&mut self, _app: &Application) {}

    /// The view is about to be hidden.
    fn will_disappear(&mut self, _app: &Application) {}

    /// Finds the view that should take focus. `from_up` is true when the
    /// request comes from an ancestor.
    fn request_focus(
        &mut self,
        _direction: FocusDirection,
        _old_focus: Option<ViewId>,
        _from_up: bool,
    ) -> Option<ViewHandle> {
        self.base().default_focus()
    }

    /// Owned children, for lookups by id.
    fn children_mut(&mut self) -> &mut [Box<dyn View>] {
        &mut []
    }

    /// The view's id.
    fn id(&self) -> ViewId {
        self.base().id()
    }

    /// Draw-pass entry point: lays out if invalidated, draws the content,
    /// then strokes the focus outline on top of it.
    fn frame(&mut self, ctx: &mut FrameContext<'_>) {
        if self.base().take_needs_layout() {
            self.layout(ctx);
        }

        let alpha = self.base().alpha();
        if self.base().is_hidden() || alpha <= 0.0 {
            return;
        }

        let inherited = ctx.alpha;
        ctx.alpha = inherited * alpha;
        ctx.canvas.save();
        ctx.canvas.set_global_alpha(ctx.alpha);

        let rect = self.base().boundary().to_rect();
        self.draw(ctx, rect);

        if self.base().is_focused() {
            ctx.canvas.set_stroke_color(ctx.app.theme().focus_outline);
            ctx.canvas.stroke_rect(rect.expand(FOCUS_OUTLINE_MARGIN));
        }

        ctx.canvas.restore();
        ctx.alpha = inherited;
    }
}
