//! A stack of mutually exclusive layers.
//!
//! Exactly one layer (or none) is active. Draw, layout and the appear
//! hooks only ever reach the active layer; focus navigation cannot enter an
//! inactive one.

use lumen_core::geometry::Rect;

use crate::app::Application;
use crate::view::{FocusDirection, FrameContext, View, ViewBase, ViewHandle, ViewId};

/// Container showing one of its layers at a time.
pub struct LayerView {
    base: ViewBase,
    layers: Vec<Box<dyn View>>,
    selected: Option<usize>,
}

impl LayerView {
    /// Creates an empty layer view with no active layer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: ViewBase::new(),
            layers: Vec::new(),
            selected: None,
        }
    }

    /// Appends a layer and takes ownership of it.
    pub fn add_layer(&mut self, layer: Box<dyn View>) {
        layer.base().set_parent(Some(&self.base.handle()));
        self.layers.push(layer);
    }

    /// Switches the active layer.
    ///
    /// `Some(index)` in range hides the current layer and shows the new one,
    /// blocking input until the show completes; with `focus` the new layer
    /// is asked for focus at that point. `None` hides the current layer and
    /// leaves none active. An out-of-range index is ignored.
    pub fn change_layer(&mut self, app: &Application, index: Option<usize>, focus: bool) {
        match index {
            Some(index) if index < self.layers.len() => {
                let block = app.block_inputs();

                if let Some(current) = self.active_index() {
                    self.disappear(app, current);
                }

                self.selected = Some(index);
                tracing::debug!("Layer view {} switching to layer {index}", self.base.id().raw());

                let layer = &mut self.layers[index];
                layer.will_appear(app);

                let coordinator = app.coordinator().clone();
                let target = layer.id();
                layer.base().show(app, move |_| {
                    if focus {
                        coordinator.request_focus(target, FocusDirection::None);
                    }
                    drop(block);
                });

                self.base.invalidate();
            }
            Some(index) => {
                tracing::trace!(
                    "Ignoring layer {index}, layer view {} has {}",
                    self.base.id().raw(),
                    self.layers.len()
                );
            }
            None => {
                if let Some(current) = self.active_index() {
                    self.disappear(app, current);
                }
                self.selected = None;
            }
        }
    }

    fn disappear(&mut self, app: &Application, index: usize) {
        let layer = &mut self.layers[index];
        layer.will_disappear(app);
        layer.base().hide(app, |_| {});
    }

    /// Index of the active layer, if any.
    #[must_use]
    pub fn layer_index(&self) -> Option<usize> {
        self.selected
    }

    fn active_index(&self) -> Option<usize> {
        self.selected.filter(|&index| index < self.layers.len())
    }

    /// The layer at `index`, if there is one.
    #[must_use]
    pub fn layer(&self, index: usize) -> Option<&dyn View> {
        self.layers.get(index).map(AsRef::as_ref)
    }

    /// Mutable access to the layer at `index`, if there is one.
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut (dyn View + 'static)> {
        self.layers.get_mut(index).map(AsMut::as_mut)
    }

    /// Number of layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

impl Default for LayerView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for LayerView {
    fn base(&self) -> &ViewBase {
        &self.base
    }

    fn draw(&mut self, ctx: &mut FrameContext<'_>, _rect: Rect) {
        if let Some(index) = self.active_index() {
            self.layers[index].frame(ctx);
        }
    }

    fn layout(&mut self, _ctx: &mut FrameContext<'_>) {
        if let Some(index) = self.active_index() {
            let layer = self.layers[index].base();
            layer.set_boundary(self.base.boundary());
            layer.invalidate();
        }
    }

    fn will_appear(&mut self, app: &Application) {
        if let Some(index) = self.active_index() {
            self.layers[index].will_appear(app);
        }
    }

    fn will_disappear(&mut self, app: &Application) {
        if let Some(index) = self.active_index() {
            self.layers[index].will_disappear(app);
        }
    }

    fn request_focus(
        &mut self,
        direction: FocusDirection,
        old_focus: Option<ViewId>,
        from_up: bool,
    ) -> Option<ViewHandle> {
        if from_up {
            return self.base.default_focus();
        }

        let index = self.active_index()?;
        self.layers[index].request_focus(direction, old_focus, false)
    }

    fn children_mut(&mut self) -> &mut [Box<dyn View>] {
        &mut self.layers
    }
}

impl std::fmt::Debug for LayerView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerView")
            .field("id", &self.base.id())
            .field("layers", &self.layers.len())
            .field("selected", &self.selected)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct Blank {
        base: ViewBase,
    }

    impl Blank {
        fn boxed(focusable: bool) -> Box<dyn View> {
            let base = ViewBase::new();
            base.set_focusable(focusable);
            Box::new(Self { base })
        }
    }

    impl View for Blank {
        fn base(&self) -> &ViewBase {
            &self.base
        }

        fn draw(&mut self, _ctx: &mut FrameContext<'_>, _rect: Rect) {}
    }

    fn two_layers() -> LayerView {
        let mut view = LayerView::new();
        view.add_layer(Blank::boxed(true));
        view.add_layer(Blank::boxed(true));
        view
    }

    #[test]
    fn test_add_layer_sets_parent() {
        let view = two_layers();
        let parent = view.layer(1).and_then(|layer| layer.base().parent());
        assert_eq!(parent.map(|p| p.id()), Some(view.id()));
        assert!(view.layer(2).is_none());
    }

    #[test]
    fn test_none_hides_active() {
        let app = Application::new();
        let mut view = two_layers();

        view.change_layer(&app, Some(0), false);
        app.tick(Duration::from_secs(1));
        view.change_layer(&app, None, false);
        app.tick(Duration::from_secs(1));

        assert_eq!(view.layer_index(), None);
        assert!(view.layer(0).is_some_and(|layer| layer.base().is_hidden()));
    }

    #[test]
    fn test_layout_forces_boundary() {
        let app = Application::new();
        let mut view = two_layers();
        view.base().set_boundaries(5, 6, 70, 80);
        view.change_layer(&app, Some(1), false);

        let mut canvas = lumen_core::canvas::CommandCanvas::new();
        let mut ctx = FrameContext::new(&mut canvas, &app);
        view.layout(&mut ctx);

        let layer = view.layer(1).map(|layer| layer.base().boundary());
        assert_eq!(layer, Some(view.base().boundary()));
        assert!(view.layer(1).is_some_and(|layer| layer.base().needs_layout()));
    }

    #[test]
    fn test_focus_narrowed_to_active_layer() {
        let app = Application::new();
        let mut view = two_layers();
        assert!(view.request_focus(FocusDirection::None, None, false).is_none());

        view.change_layer(&app, Some(1), false);
        let target = view.layer(1).map(View::id);
        let found = view.request_focus(FocusDirection::Down, None, false);
        assert_eq!(found.map(|h| h.id()), target);

        // From above, the container itself is asked.
        assert!(view.request_focus(FocusDirection::Down, None, true).is_none());
    }
}
