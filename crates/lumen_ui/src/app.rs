//! Application context: style, theme, fonts, the animation clock, focus
//! coordination and input gating.
//!
//! There is no global instance. The owner builds one [`Application`] and
//! passes it by reference into construction, transitions and frames.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use lumen_core::animation::Animator;
use lumen_core::canvas::Canvas;
use lumen_core::error::UiResult;
use lumen_core::events::EventBus;
use lumen_core::style::{Config, FontStash, Style, Theme};
use parking_lot::Mutex;

use crate::view::{find_view_mut, FocusDirection, FrameContext, View, ViewHandle, ViewId};

/// Broadcast whenever the focused view changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusChange {
    /// The view that gained focus, if any.
    pub focused: Option<ViewId>,
}

/// A queued request to move focus into a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRequest {
    /// View to search from.
    pub view: ViewId,
    /// Direction of travel.
    pub direction: FocusDirection,
}

#[derive(Debug, Default)]
struct CoordinatorState {
    input_blocks: usize,
    pending: VecDeque<FocusRequest>,
    history: Vec<FocusRequest>,
    focused: Option<ViewHandle>,
}

/// Focus and input bookkeeping that animation callbacks can reach.
///
/// Cloning yields another handle to the same state.
#[derive(Debug, Clone, Default)]
pub struct Coordinator {
    state: Arc<Mutex<CoordinatorState>>,
}

impl Coordinator {
    /// Blocks input until the returned guard is dropped.
    #[must_use = "input is unblocked as soon as the guard is dropped"]
    pub fn block_inputs(&self) -> InputBlock {
        let depth = {
            let mut state = self.state.lock();
            state.input_blocks += 1;
            state.input_blocks
        };
        tracing::trace!("Inputs blocked (depth {depth})");

        InputBlock {
            coordinator: self.clone(),
        }
    }

    /// Returns true while any [`InputBlock`] is alive.
    #[must_use]
    pub fn inputs_blocked(&self) -> bool {
        self.state.lock().input_blocks > 0
    }

    /// Queues a focus request, resolved on the next frame.
    pub fn request_focus(&self, view: ViewId, direction: FocusDirection) {
        let request = FocusRequest { view, direction };
        let mut state = self.state.lock();
        state.pending.push_back(request);
        state.history.push(request);
    }

    fn unblock(&self) {
        let mut state = self.state.lock();
        state.input_blocks = state.input_blocks.saturating_sub(1);
        if state.input_blocks == 0 {
            tracing::trace!("Inputs unblocked");
        }
    }
}

/// Keeps input blocked while alive.
#[derive(Debug)]
pub struct InputBlock {
    coordinator: Coordinator,
}

impl Drop for InputBlock {
    fn drop(&mut self) {
        self.coordinator.unblock();
    }
}

/// The application context views are built against.
#[derive(Debug)]
pub struct Application {
    style: Style,
    theme: Theme,
    fonts: FontStash,
    animator: Animator,
    focus_events: EventBus<FocusChange>,
    coordinator: Coordinator,
}

impl Application {
    /// Creates an application with the default style and theme.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an application from a loaded configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            style: config.style,
            theme: config.theme,
            fonts: FontStash::default(),
            animator: Animator::new(),
            focus_events: EventBus::new(),
            coordinator: Coordinator::default(),
        }
    }

    /// Parses a TOML style/theme document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed.
    pub fn from_config_str(source: &str) -> UiResult<Self> {
        Ok(Self::with_config(Config::from_toml_str(source)?))
    }

    /// Reads a TOML style/theme file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or is malformed.
    pub fn load_config(path: impl AsRef<Path>) -> UiResult<Self> {
        Ok(Self::with_config(Config::load(path)?))
    }

    /// Replaces the loaded fonts.
    #[must_use]
    pub fn with_fonts(mut self, fonts: FontStash) -> Self {
        self.fonts = fonts;
        self
    }

    /// Widget metrics.
    #[must_use]
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Role colors.
    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Loaded fonts.
    #[must_use]
    pub fn fonts(&self) -> &FontStash {
        &self.fonts
    }

    /// The animation and timer queue.
    #[must_use]
    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    /// The focus broadcast channel.
    #[must_use]
    pub fn focus_events(&self) -> &EventBus<FocusChange> {
        &self.focus_events
    }

    /// Focus and input bookkeeping.
    #[must_use]
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Blocks input until the returned guard is dropped.
    #[must_use = "input is unblocked as soon as the guard is dropped"]
    pub fn block_inputs(&self) -> InputBlock {
        self.coordinator.block_inputs()
    }

    /// Returns true while input is blocked.
    #[must_use]
    pub fn inputs_blocked(&self) -> bool {
        self.coordinator.inputs_blocked()
    }

    /// Queues a request to focus `view`, resolved on the next frame.
    pub fn request_focus(&self, view: ViewId, direction: FocusDirection) {
        self.coordinator.request_focus(view, direction);
    }

    /// Every focus request made so far, oldest first.
    #[must_use]
    pub fn focus_requests(&self) -> Vec<FocusRequest> {
        self.coordinator.state.lock().history.clone()
    }

    /// The focused view, if any.
    #[must_use]
    pub fn focused(&self) -> Option<ViewId> {
        self.coordinator
            .state
            .lock()
            .focused
            .as_ref()
            .map(|view| view.id())
    }

    /// Moves focus to `target` and broadcasts the change.
    pub fn give_focus(&self, target: Option<ViewHandle>) {
        let previous = {
            let mut state = self.coordinator.state.lock();
            let unchanged = match (&state.focused, &target) {
                (Some(current), Some(next)) => current.same_view(next),
                (None, None) => true,
                _ => false,
            };
            if unchanged {
                return;
            }
            std::mem::replace(&mut state.focused, target.clone())
        };

        if let Some(previous) = previous {
            previous.set_focused(false);
        }
        if let Some(target) = &target {
            target.set_focused(true);
        }

        let focused = target.map(|view| view.id());
        tracing::debug!("Focus moved to {:?}", focused.map(ViewId::raw));
        self.focus_events.emit(&FocusChange { focused });
    }

    /// Resolves queued focus requests against `root`, then draws it.
    pub fn frame(&self, root: &mut dyn View, canvas: &mut dyn Canvas) {
        let pending: Vec<FocusRequest> = self.coordinator.state.lock().pending.drain(..).collect();

        for request in pending {
            let old_focus = self.focused();
            let Some(view) = find_view_mut(root, request.view) else {
                tracing::warn!("Focus requested for detached view {}", request.view.raw());
                continue;
            };

            if let Some(target) = view.request_focus(request.direction, old_focus, false) {
                self.give_focus(Some(target));
            }
        }

        let mut ctx = FrameContext::new(canvas, self);
        root.frame(&mut ctx);
    }

    /// Advances the animation clock.
    pub fn tick(&self, elapsed: Duration) {
        self.animator.tick(elapsed);
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_input_block_nesting() {
        let app = Application::new();
        assert!(!app.inputs_blocked());

        let outer = app.block_inputs();
        let inner = app.block_inputs();
        drop(outer);
        assert!(app.inputs_blocked());

        drop(inner);
        assert!(!app.inputs_blocked());
    }

    #[test]
    fn test_give_focus_broadcasts_once() {
        let app = Application::new();
        let base = crate::view::ViewBase::new();
        let events = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&events);
        let _sub = app.focus_events().subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        app.give_focus(Some(base.handle()));
        app.give_focus(Some(base.handle()));

        assert_eq!(events.load(Ordering::SeqCst), 1);
        assert!(base.is_focused());
        assert_eq!(app.focused(), Some(base.id()));

        app.give_focus(None);
        assert!(!base.is_focused());
        assert_eq!(events.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_config_str() {
        let app = Application::from_config_str("[style.animation]\nshow_ms = 10\n").unwrap();
        assert_eq!(app.style().animation.show(), Duration::from_millis(10));
        assert!(Application::from_config_str("[style").is_err());
    }
}
