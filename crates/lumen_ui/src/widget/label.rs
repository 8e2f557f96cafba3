//! Text label.
//!
//! Single-line labels measure themselves, elide overflowing text with an
//! ellipsis and, while their parent holds focus, scroll overflowing text as
//! a looping ticker. Multiline labels wrap inside their width and never
//! elide or scroll.
//!
//! ## Ticker
//!
//! ```text
//!   idle ──start──▶ waiting (1500 ms) ──▶ scrolling (0 → ticker width) ─┐
//!    ▲                  ▲                                               │
//!    │                  └───────────────────────────────────────────────┘
//!    └──stop (cancel tag, offset = 0)
//! ```
//!
//! The wait timer and the scroll tween share one tag, so a stop cancels
//! whichever is pending.

use std::sync::{Arc, Weak};
use std::time::Duration;

use lumen_core::animation::{AnimationTag, Animator, Easing, Tween};
use lumen_core::canvas::{HorizontalAlign, VerticalAlign};
use lumen_core::events::Subscription;
use lumen_core::geometry::Rect;
use lumen_core::style::{Color, FontId, FontStash, Style, Theme};
use parking_lot::Mutex;
use unicode_segmentation::UnicodeSegmentation;

use crate::app::{Application, FocusChange};
use crate::view::{FrameContext, View, ViewBase};

/// Glyph appended to elided text.
pub const ELLIPSIS: &str = "\u{2026}";

/// Spacing between the two copies of the text in the ticker string.
const TICKER_GAP: &str = "          ";

/// Pause before each scroll cycle.
const TICKER_WAIT: Duration = Duration::from_millis(1500);

/// Scroll duration per unit of ticker width, in milliseconds.
const TICKER_MS_PER_UNIT: f32 = 15.0;

/// Semantic role of a label. Selects its font size, line height and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelStyle {
    /// Body text.
    #[default]
    Regular,
    /// Slightly smaller body text.
    Medium,
    /// Small text.
    Small,
    /// Secondary description text.
    Description,
    /// Crash screen text.
    Crash,
    /// Plain button, enabled.
    ButtonPlain,
    /// Plain button, disabled.
    ButtonPlainDisabled,
    /// Borderless button.
    ButtonBorderless,
    /// Dialog button.
    ButtonDialog,
    /// List item title.
    ListItem,
    /// Notification text.
    Notification,
    /// Dialog body text.
    Dialog,
    /// List item value.
    ListItemValue,
    /// Faint list item value.
    ListItemValueFaint,
}

impl LabelStyle {
    /// Font size for this role.
    #[must_use]
    pub fn font_size(self, style: &Style) -> f32 {
        let label = &style.label;
        match self {
            Self::Regular => label.regular_font_size,
            Self::Medium => label.medium_font_size,
            Self::Small => label.small_font_size,
            Self::Description => label.description_font_size,
            Self::Crash => label.crash_font_size,
            Self::ButtonPlain
            | Self::ButtonPlainDisabled
            | Self::ButtonBorderless
            | Self::ButtonDialog => label.button_font_size,
            Self::ListItem => label.list_item_font_size,
            Self::Notification => label.notification_font_size,
            Self::Dialog => label.dialog_font_size,
            Self::ListItemValue | Self::ListItemValueFaint => style.list.item_value_size,
        }
    }

    /// Line height for this role. List values have none.
    #[must_use]
    pub fn line_height(self, style: &Style) -> f32 {
        match self {
            Self::Notification => style.label.notification_line_height,
            Self::ListItemValue | Self::ListItemValueFaint => 0.0,
            _ => style.label.line_height,
        }
    }

    /// Text color for this role.
    #[must_use]
    pub fn color(self, theme: &Theme) -> Color {
        match self {
            Self::Description => theme.description,
            Self::Crash => Color::WHITE,
            Self::ButtonPlain => theme.button_plain_enabled_text,
            Self::ButtonPlainDisabled => theme.button_plain_disabled_text,
            Self::Notification => theme.notification_text,
            Self::ButtonDialog => theme.dialog_button,
            Self::ListItemValue => theme.list_item_value,
            Self::ListItemValueFaint => theme.list_item_faint_value,
            _ => theme.text,
        }
    }
}

/// Direction of a text fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAnimation {
    /// Fade and grow in, then restart the ticker.
    EaseIn,
    /// Fade and shrink out.
    EaseOut,
}

/// Animated fields, shared with animation and focus callbacks.
#[derive(Debug)]
struct Motion {
    ticker_active: bool,
    ticker_offset: f32,
    ticker_width: Option<f32>,
    text_animation: f32,
}

/// Truncation fraction for an elided label, in `[0, 1]`.
///
/// `1` means the text fits next to an ellipsis and is left alone.
#[must_use]
pub fn ellipsis_fraction(width: f32, ellipsis_width: f32, text_width: f32) -> f32 {
    if text_width <= 0.0 {
        return 1.0;
    }
    ((width - ellipsis_width) / text_width).clamp(0.0, 1.0)
}

/// Keeps `fraction` of the graphemes of `text` and appends [`ELLIPSIS`].
/// A fraction of 1 returns `text` untouched.
#[must_use]
pub fn elide(text: &str, fraction: f32) -> String {
    if fraction >= 1.0 {
        return text.to_owned();
    }

    let count = text.graphemes(true).count();
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let keep = (count as f32 * fraction.max(0.0)) as usize;

    let mut elided: String = text.graphemes(true).take(keep).collect();
    elided.push_str(ELLIPSIS);
    elided
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_units(value: f32) -> u32 {
    value.max(0.0).ceil() as u32
}

fn start_ticker(animator: &Animator, tag: AnimationTag, motion: &Arc<Mutex<Motion>>) {
    animator.cancel_by_tag(tag);

    let motion = Arc::downgrade(motion);
    animator.start_timer(tag, TICKER_WAIT, move |animator| {
        scroll_ticker(animator, tag, motion);
    });
}

fn scroll_ticker(animator: &Animator, tag: AnimationTag, motion: Weak<Mutex<Motion>>) {
    let Some(shared) = motion.upgrade() else {
        return;
    };

    animator.cancel_by_tag(tag);
    let width = {
        let mut motion = shared.lock();
        motion.ticker_offset = 0.0;
        motion.ticker_width.unwrap_or(0.0)
    };

    let sink = Weak::clone(&motion);
    let duration = Duration::from_secs_f32((width * TICKER_MS_PER_UNIT / 1000.0).max(0.0));
    animator.schedule(
        Tween::new(tag, 0.0, width, duration)
            .on_update(move |offset| {
                if let Some(motion) = sink.upgrade() {
                    motion.lock().ticker_offset = offset;
                }
            })
            .on_complete(move |animator| {
                if let Some(motion) = motion.upgrade() {
                    start_ticker(animator, tag, &motion);
                }
            }),
    );
}

fn stop_ticker(animator: &Animator, tag: AnimationTag, motion: &Mutex<Motion>) {
    animator.cancel_by_tag(tag);
    motion.lock().ticker_offset = 0.0;
}

/// A text label.
pub struct Label {
    base: ViewBase,
    text: String,
    text_ticker: String,
    text_ellipsis: String,
    text_width: Option<f32>,
    text_height: Option<f32>,
    multiline: bool,
    label_style: LabelStyle,
    font_size: f32,
    line_height: f32,
    horizontal_align: HorizontalAlign,
    vertical_align: VerticalAlign,
    custom_color: Option<Color>,
    custom_font: Option<FontId>,
    motion: Arc<Mutex<Motion>>,
    ticker_tag: AnimationTag,
    text_animation_tag: AnimationTag,
    animator: Animator,
    _parent_focus: Subscription,
}

impl Label {
    /// Creates a label and subscribes it to focus changes of its parent.
    #[must_use]
    pub fn new(
        app: &Application,
        label_style: LabelStyle,
        text: impl Into<String>,
        multiline: bool,
    ) -> Self {
        let text = text.into();
        let base = ViewBase::new();
        let motion = Arc::new(Mutex::new(Motion {
            ticker_active: false,
            ticker_offset: 0.0,
            ticker_width: None,
            text_animation: 1.0,
        }));
        let ticker_tag = AnimationTag::mint();

        let node = base.downgrade();
        let shared = Arc::downgrade(&motion);
        let animator = app.animator().clone();
        let parent_focus = app.focus_events().subscribe(move |change: &FocusChange| {
            let (Some(node), Some(motion)) = (node.upgrade(), shared.upgrade()) else {
                return;
            };

            let parent = node.parent().map(|parent| parent.id());
            if parent.is_some() && change.focused == parent {
                // Parent focused
                start_ticker(&animator, ticker_tag, &motion);
                motion.lock().ticker_active = true;
            } else {
                stop_ticker(&animator, ticker_tag, &motion);
                motion.lock().ticker_active = false;
            }
        });

        Self {
            base,
            text_ticker: format!("{text}{TICKER_GAP}{text}"),
            text_ellipsis: String::new(),
            text,
            text_width: None,
            text_height: None,
            multiline,
            label_style,
            font_size: label_style.font_size(app.style()),
            line_height: label_style.line_height(app.style()),
            horizontal_align: HorizontalAlign::Left,
            vertical_align: VerticalAlign::Middle,
            custom_color: None,
            custom_font: None,
            motion,
            ticker_tag,
            text_animation_tag: AnimationTag::mint(),
            animator: app.animator().clone(),
            _parent_focus: parent_focus,
        }
    }

    /// The label's text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the text. Measurements are dropped and the label is
    /// invalidated, so the next frame remeasures.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.text_ticker = format!("{}{TICKER_GAP}{}", self.text, self.text);
        self.text_width = None;
        self.text_height = None;
        self.motion.lock().ticker_width = None;
        self.stop_ticker_animation();
        self.base.invalidate();
    }

    /// The looping string the ticker scrolls.
    #[must_use]
    pub fn ticker_text(&self) -> &str {
        &self.text_ticker
    }

    /// Elided text computed by the last layout pass.
    #[must_use]
    pub fn ellipsis_text(&self) -> &str {
        &self.text_ellipsis
    }

    /// Measured text width, if measured.
    #[must_use]
    pub fn text_width(&self) -> Option<f32> {
        self.text_width
    }

    /// Measured text height, if measured.
    #[must_use]
    pub fn text_height(&self) -> Option<f32> {
        self.text_height
    }

    /// Returns true for wrapping labels.
    #[must_use]
    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    /// Changes the role. Only the color follows; font size and line
    /// height keep the values chosen at construction.
    pub fn set_style(&mut self, label_style: LabelStyle) {
        self.label_style = label_style;
    }

    /// Current role.
    #[must_use]
    pub fn label_style(&self) -> LabelStyle {
        self.label_style
    }

    /// Sets the font size and invalidates the parent.
    pub fn set_font_size(&mut self, size: f32) {
        self.font_size = size;

        if let Some(parent) = self.base.parent() {
            parent.invalidate();
        }
    }

    /// Current font size.
    #[must_use]
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Current line height.
    #[must_use]
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Sets the horizontal alignment.
    pub fn set_horizontal_align(&mut self, align: HorizontalAlign) {
        self.horizontal_align = align;
    }

    /// Sets the vertical alignment.
    pub fn set_vertical_align(&mut self, align: VerticalAlign) {
        self.vertical_align = align;
    }

    /// Overrides the theme color.
    pub fn set_color(&mut self, color: Color) {
        self.custom_color = Some(color);
    }

    /// Goes back to the theme color.
    pub fn unset_color(&mut self) {
        self.custom_color = None;
    }

    /// Resolved text color.
    #[must_use]
    pub fn color(&self, theme: &Theme) -> Color {
        self.custom_color
            .unwrap_or_else(|| self.label_style.color(theme))
    }

    /// Overrides the font face.
    pub fn set_font(&mut self, font: FontId) {
        self.custom_font = Some(font);
    }

    /// Goes back to the regular font face.
    pub fn unset_font(&mut self) {
        self.custom_font = None;
    }

    /// Resolved font face.
    #[must_use]
    pub fn font(&self, fonts: &FontStash) -> FontId {
        self.custom_font.unwrap_or(fonts.regular)
    }

    /// Allows or forbids ticker scrolling. Does not start or stop it.
    pub fn set_ticker_state(&mut self, active: bool) {
        self.motion.lock().ticker_active = active;
    }

    /// Returns true while the ticker may run.
    #[must_use]
    pub fn is_ticker_active(&self) -> bool {
        self.motion.lock().ticker_active
    }

    /// Current ticker scroll offset.
    #[must_use]
    pub fn ticker_offset(&self) -> f32 {
        self.motion.lock().ticker_offset
    }

    /// Current fade/grow progress (1 when settled).
    #[must_use]
    pub fn text_animation(&self) -> f32 {
        self.motion.lock().text_animation
    }

    /// Tag of the ticker offset field.
    #[must_use]
    pub fn ticker_tag(&self) -> AnimationTag {
        self.ticker_tag
    }

    /// Tag of the text animation field.
    #[must_use]
    pub fn text_animation_tag(&self) -> AnimationTag {
        self.text_animation_tag
    }

    /// (Re)starts the ticker loop from the wait state.
    pub fn start_ticker_animation(&self) {
        tracing::trace!("Ticker start for label {}", self.base.id().raw());
        start_ticker(&self.animator, self.ticker_tag, &self.motion);
    }

    /// Cancels the ticker loop and rewinds it.
    pub fn stop_ticker_animation(&self) {
        stop_ticker(&self.animator, self.ticker_tag, &self.motion);
    }

    /// Fades the text in or out over the highlight duration. Fading in
    /// restarts the ticker when it completes.
    pub fn animate(&mut self, app: &Application, animation: LabelAnimation) {
        let animator = app.animator();
        animator.cancel_by_tag(self.text_animation_tag);

        let (from, to) = match animation {
            LabelAnimation::EaseIn => (0.0, 1.0),
            LabelAnimation::EaseOut => (1.0, 0.0),
        };
        self.motion.lock().text_animation = from;
        self.stop_ticker_animation();

        let sink = Arc::downgrade(&self.motion);
        let restart = Arc::downgrade(&self.motion);
        let ticker_tag = self.ticker_tag;
        animator.schedule(
            Tween::new(
                self.text_animation_tag,
                from,
                to,
                app.style().animation.highlight(),
            )
            .with_easing(Easing::QuadInOut)
            .on_update(move |value| {
                if let Some(motion) = sink.upgrade() {
                    motion.lock().text_animation = value;
                }
            })
            .on_complete(move |animator| {
                if animation != LabelAnimation::EaseIn {
                    return;
                }
                if let Some(motion) = restart.upgrade() {
                    start_ticker(animator, ticker_tag, &motion);
                }
            }),
        );
    }

    /// Returns true if the text is wider than the parent. Without a parent
    /// nothing overflows.
    #[allow(clippy::cast_precision_loss)]
    fn overflows_parent(&self, text_width: f32) -> bool {
        self.base
            .parent()
            .is_some_and(|parent| text_width > parent.boundary().width_or_zero() as f32)
    }

    fn anchor_y(&self, rect: Rect) -> f32 {
        match self.vertical_align {
            VerticalAlign::Top => rect.y,
            VerticalAlign::Bottom => rect.bottom(),
            VerticalAlign::Middle => rect.y + rect.height / 2.0,
        }
    }
}

impl View for Label {
    fn base(&self) -> &ViewBase {
        &self.base
    }

    #[allow(clippy::cast_precision_loss)]
    fn layout(&mut self, ctx: &mut FrameContext<'_>) {
        let font = self.font(ctx.app.fonts());
        let canvas = &mut *ctx.canvas;
        canvas.save();
        canvas.set_font_size(self.font_size);
        canvas.set_text_align(self.horizontal_align, VerticalAlign::Top);
        canvas.set_font_face(font);
        canvas.set_line_height(self.line_height);

        let mut boundary = self.base.boundary();
        let (x, y) = (boundary.x as f32, boundary.y as f32);

        if self.multiline {
            let bounds =
                canvas.text_box_bounds(x, y, boundary.width_or_zero() as f32, &self.text);
            self.text_height = Some(bounds.height());
        } else {
            let bounds = canvas.text_bounds(x, y, &self.text);
            let text_width = bounds.width();
            self.text_width = Some(text_width);
            self.text_height = Some(bounds.height());

            let ellipsis_width = canvas.text_bounds(x, y, ELLIPSIS).width();
            self.text_ellipsis = match boundary.width {
                Some(width) => elide(
                    &self.text,
                    ellipsis_fraction(width as f32, ellipsis_width, text_width),
                ),
                None => self.text.clone(),
            };

            if boundary.width.is_none() {
                boundary.width = Some(to_units(text_width));
            }
        }

        if boundary.height.is_none() {
            boundary.height = self.text_height.map(to_units);
        }

        self.base.set_boundary(boundary);
        canvas.restore();
    }

    fn draw(&mut self, ctx: &mut FrameContext<'_>, rect: Rect) {
        let color = self.color(ctx.app.theme());
        let font = self.font(ctx.app.fonts());
        let fade_font_size = ctx.app.style().list.item_value_size;
        let canvas = &mut *ctx.canvas;

        canvas.set_fill_color(color);
        canvas.set_font_size(self.font_size);
        canvas.set_font_face(font);

        if self.multiline {
            canvas.set_line_height(self.line_height);
            canvas.set_text_align(self.horizontal_align, VerticalAlign::Top);
            canvas.text_box(rect.x, rect.y, rect.width, &self.text);
            return;
        }

        canvas.set_line_height(1.0);
        canvas.set_text_align(self.horizontal_align, self.vertical_align);

        let x = match self.horizontal_align {
            HorizontalAlign::Left => rect.x,
            HorizontalAlign::Center => rect.x + rect.width / 2.0,
            HorizontalAlign::Right => rect.right(),
        };
        let y = self.anchor_y(rect);

        let text_width = match self.text_width {
            Some(width) => width,
            None => {
                let width = canvas.text_bounds(x, rect.y, &self.text).width();
                self.text_width = Some(width);
                width
            }
        };

        let needs_ticker_width = {
            let motion = self.motion.lock();
            motion.ticker_active && motion.ticker_width.is_none() && text_width > 0.0
        };
        if needs_ticker_width {
            let ticker_width = canvas.text_bounds(x, rect.y, &self.text_ticker).width() - text_width;
            self.motion.lock().ticker_width = Some(ticker_width);
            self.start_ticker_animation();
        }

        let (ticker_active, ticker_offset, text_animation) = {
            let motion = self.motion.lock();
            (motion.ticker_active, motion.ticker_offset, motion.text_animation)
        };
        let overflows = self.overflows_parent(text_width);

        if text_animation < 1.0 {
            canvas.set_fill_color(color.fade(text_animation));
            canvas.set_font_size(fade_font_size * text_animation);

            let text = if overflows { &self.text_ellipsis } else { &self.text };
            canvas.text(x, y, text);
            return;
        }

        if ticker_active && overflows {
            canvas.save();
            canvas.intersect_scissor(rect);
            canvas.text(x - ticker_offset, y, &self.text_ticker);
            canvas.restore();
        } else if overflows {
            canvas.text(x, y, &self.text_ellipsis);
        } else {
            canvas.text(x, y, &self.text);
        }
    }

    fn will_disappear(&mut self, _app: &Application) {
        self.stop_ticker_animation();
        self.set_ticker_state(false);
    }
}

impl Drop for Label {
    fn drop(&mut self) {
        self.animator.cancel_by_tag(self.ticker_tag);
        self.animator.cancel_by_tag(self.text_animation_tag);
    }
}

impl std::fmt::Debug for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Label")
            .field("id", &self.base.id())
            .field("text", &self.text)
            .field("label_style", &self.label_style)
            .field("multiline", &self.multiline)
            .finish_non_exhaustive()
    }
}
