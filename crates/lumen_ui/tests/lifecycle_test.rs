//! Integration tests for the view lifecycle: layer transitions, focus
//! hand-off, label measurement and callback hygiene.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lumen_core::canvas::{Canvas, CommandCanvas, RenderCommand};
use lumen_core::geometry::Rect;
use lumen_ui::{
    Application, FocusDirection, FrameContext, Label, LabelStyle, LayerView, View, ViewBase,
    ViewHandle, ViewId,
};
use parking_lot::Mutex;

type Log = Arc<Mutex<Vec<String>>>;

/// A layer that records every hook it receives.
struct Probe {
    base: ViewBase,
    name: &'static str,
    log: Log,
}

impl Probe {
    fn boxed(name: &'static str, log: &Log) -> Box<dyn View> {
        let base = ViewBase::new();
        base.set_focusable(true);
        Box::new(Self {
            base,
            name,
            log: Arc::clone(log),
        })
    }

    fn record(&self, event: &str) {
        self.log.lock().push(format!("{event}:{}", self.name));
    }
}

impl View for Probe {
    fn base(&self) -> &ViewBase {
        &self.base
    }

    fn draw(&mut self, ctx: &mut FrameContext<'_>, rect: Rect) {
        self.record("draw");
        ctx.canvas.fill_rect(rect);
    }

    fn layout(&mut self, _ctx: &mut FrameContext<'_>) {
        self.record("layout");
    }

    fn will_appear(&mut self, _app: &Application) {
        self.record("appear");
    }

    fn will_disappear(&mut self, _app: &Application) {
        self.record("disappear");
    }

    fn request_focus(
        &mut self,
        _direction: FocusDirection,
        _old_focus: Option<ViewId>,
        _from_up: bool,
    ) -> Option<ViewHandle> {
        self.record("focus");
        self.base.default_focus()
    }
}

fn settle(app: &Application) {
    for _ in 0..30 {
        app.tick(Duration::from_millis(16));
    }
}

fn layered(log: &Log, count: usize) -> LayerView {
    const NAMES: [&str; 4] = ["a", "b", "c", "d"];
    let mut view = LayerView::new();
    view.base().set_boundaries(0, 0, 200, 100);
    for name in NAMES.iter().copied().take(count) {
        view.add_layer(Probe::boxed(name, log));
    }
    view
}

fn index_of(log: &[String], entry: &str) -> usize {
    log.iter()
        .position(|e| e == entry)
        .unwrap_or_else(|| panic!("{entry} missing from {log:?}"))
}

#[test]
fn test_hello_label_auto_sizes() {
    let app = Application::new();
    let mut label = Label::new(&app, LabelStyle::Regular, "Hello", false);
    assert_eq!(label.base().boundary().width, None);

    let mut canvas = CommandCanvas::new();
    {
        let mut ctx = FrameContext::new(&mut canvas, &app);
        label.layout(&mut ctx);
    }

    let text_width = label.text_width().unwrap();
    let text_height = label.text_height().unwrap();
    // Default metrics: 20px regular font, half-em advance.
    assert!((text_width - 50.0).abs() < f32::EPSILON);
    assert!((text_height - 20.0).abs() < f32::EPSILON);
    assert_eq!(label.base().width(), 50);
    assert_eq!(label.base().height(), 20);

    // Ticker untouched until a draw pass runs.
    assert!(!label.is_ticker_active());
    assert!(label.ticker_offset().abs() < f32::EPSILON);
    assert!(app.animator().is_empty());
    assert!(canvas.commands().is_empty());
}

#[test]
fn test_explicit_zero_size_is_kept() {
    let app = Application::new();
    let mut label = Label::new(&app, LabelStyle::Regular, "Hello", false);
    label.base().set_boundaries(0, 0, 0, 0);

    let mut canvas = CommandCanvas::new();
    let mut ctx = FrameContext::new(&mut canvas, &app);
    label.layout(&mut ctx);

    assert_eq!(label.base().width(), 0);
    assert_eq!(label.base().height(), 0);
}

#[test]
fn test_change_layer_superseded_before_show() {
    let app = Application::new();
    let log: Log = Arc::default();
    let mut view = layered(&log, 2);

    view.change_layer(&app, Some(1), true);
    view.change_layer(&app, Some(0), false);
    settle(&app);

    let log = log.lock().clone();
    assert!(index_of(&log, "disappear:b") < index_of(&log, "appear:a"));
    assert_eq!(view.layer_index(), Some(0));
    assert!(app.focus_requests().is_empty());
    assert!(!app.inputs_blocked());

    assert!(view.layer(1).is_some_and(|layer| layer.base().is_hidden()));
    assert!(view
        .layer(0)
        .is_some_and(|layer| (layer.base().alpha() - 1.0).abs() < f32::EPSILON));
}

#[test]
fn test_change_layer_out_of_range_is_ignored() {
    let app = Application::new();
    let log: Log = Arc::default();
    let mut view = layered(&log, 2);

    view.change_layer(&app, Some(0), false);
    settle(&app);
    log.lock().clear();

    view.change_layer(&app, Some(5), true);
    assert_eq!(view.layer_index(), Some(0));
    assert!(log.lock().is_empty());
    assert!(!app.inputs_blocked());
    assert!(app.animator().is_empty());
}

#[test]
fn test_change_layer_with_focus() {
    let app = Application::new();
    let log: Log = Arc::default();
    let mut view = layered(&log, 2);

    view.change_layer(&app, Some(1), true);
    assert!(app.inputs_blocked());
    settle(&app);
    assert!(!app.inputs_blocked());

    let requests = app.focus_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(Some(requests[0].view), view.layer(1).map(View::id));
    assert_eq!(requests[0].direction, FocusDirection::None);

    // Resolved on the next frame.
    let mut canvas = CommandCanvas::new();
    app.frame(&mut view, &mut canvas);
    assert_eq!(app.focused(), view.layer(1).map(View::id));
    assert!(view.layer(1).is_some_and(|layer| layer.base().is_focused()));
}

#[test]
fn test_layer_exclusivity() {
    let app = Application::new();
    let log: Log = Arc::default();
    let mut view = layered(&log, 3);
    let mut canvas = CommandCanvas::new();

    let sequence = [Some(2), Some(0), Some(7), None, Some(1), Some(1), None, Some(0)];
    for index in sequence {
        view.change_layer(&app, index, false);
        settle(&app);
        log.lock().clear();

        view.base().invalidate();
        app.frame(&mut view, &mut canvas);

        let touched: Vec<String> = log
            .lock()
            .iter()
            .filter(|e| e.starts_with("draw:") || e.starts_with("layout:"))
            .cloned()
            .collect();

        match view.layer_index() {
            Some(active) => {
                let name = ["a", "b", "c"][active];
                assert!(touched.iter().all(|e| e.ends_with(name)), "{touched:?}");
                assert!(touched.contains(&format!("draw:{name}")));
            }
            None => assert!(touched.is_empty(), "{touched:?}"),
        }
    }
    assert!(!app.inputs_blocked());
}

#[test]
fn test_focus_outline_after_content() {
    let app = Application::new();
    let log: Log = Arc::default();
    let mut probe = Probe::boxed("a", &log);
    probe.base().set_boundaries(10, 10, 50, 20);
    app.give_focus(Some(probe.base().handle()));

    let mut canvas = CommandCanvas::new();
    app.frame(probe.as_mut(), &mut canvas);
    let commands = canvas.end_frame();

    let content = commands
        .iter()
        .position(|c| matches!(c, RenderCommand::FillRect { .. }))
        .unwrap();
    let outline = commands
        .iter()
        .position(|c| matches!(c, RenderCommand::StrokeRect { .. }))
        .unwrap();
    assert!(content < outline);
    assert_eq!(
        commands[outline],
        RenderCommand::StrokeRect {
            bounds: Rect::new(5.0, 5.0, 60.0, 30.0),
            color: app.theme().focus_outline,
        }
    );

    // Unfocused: no outline at all.
    app.give_focus(None);
    canvas.begin_frame();
    app.frame(probe.as_mut(), &mut canvas);
    assert!(!canvas
        .commands()
        .iter()
        .any(|c| matches!(c, RenderCommand::StrokeRect { .. })));
}

#[test]
fn test_destroyed_label_gets_no_callbacks() {
    let app = Application::new();
    let parent = ViewBase::new();
    parent.set_boundaries(0, 0, 10, 10);

    let label = Label::new(&app, LabelStyle::Regular, "A rather long label", false);
    label.base().set_parent(Some(&parent.handle()));

    let before = app.focus_events().subscriber_count();
    drop(label);
    assert_eq!(app.focus_events().subscriber_count(), before - 1);

    // Focusing the former parent schedules nothing.
    app.give_focus(Some(parent.handle()));
    assert!(app.animator().is_empty());
}

#[test]
fn test_label_reacts_only_to_its_parent() {
    let app = Application::new();
    let parent = ViewBase::new();
    let stranger = ViewBase::new();

    let label = Label::new(&app, LabelStyle::Regular, "Hello", false);
    label.base().set_parent(Some(&parent.handle()));

    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let _watch = app.focus_events().subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    app.give_focus(Some(stranger.handle()));
    assert!(!label.is_ticker_active());

    app.give_focus(Some(parent.handle()));
    assert!(label.is_ticker_active());
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[test]
fn test_set_text_remeasures() {
    let app = Application::new();
    let mut label = Label::new(&app, LabelStyle::Regular, "Hi", false);
    let mut canvas = CommandCanvas::new();

    app.frame(&mut label, &mut canvas);
    assert_eq!(label.text_width(), Some(20.0));

    label.base().set_boundary(lumen_core::geometry::Boundary::default());
    label.set_text("Hello");
    assert!(label.text_width().is_none());
    assert!(label.base().needs_layout());

    canvas.begin_frame();
    app.frame(&mut label, &mut canvas);
    assert_eq!(label.text_width(), Some(50.0));
    assert_eq!(label.base().width(), 50);
}

#[test]
fn test_label_inside_layer_view() {
    let app = Application::new();
    let mut view = LayerView::new();
    view.base().set_boundaries(0, 0, 40, 30);
    view.add_layer(Box::new(Label::new(
        &app,
        LabelStyle::Regular,
        "Hello world",
        false,
    )));

    view.change_layer(&app, Some(0), false);
    settle(&app);

    let mut canvas = CommandCanvas::new();
    app.frame(&mut view, &mut canvas);

    // The label got the container's boundary and elides against it.
    let boundary = view.layer(0).map(|layer| layer.base().boundary());
    assert_eq!(boundary, Some(view.base().boundary()));
    let texts: Vec<&str> = canvas
        .commands()
        .iter()
        .filter_map(|c| match c {
            RenderCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].ends_with(lumen_ui::widget::ELLIPSIS));
}

#[test]
fn test_canvas_is_object_safe() {
    let mut canvas = CommandCanvas::new();
    let surface: &mut dyn Canvas = &mut canvas;
    surface.set_font_size(10.0);
    assert!((surface.text_bounds(0.0, 0.0, "abc").width() - 15.0).abs() < f32::EPSILON);
}
