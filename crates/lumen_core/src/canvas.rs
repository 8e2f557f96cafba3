//! Rendering backend contract.
//!
//! [`Canvas`] is an immediate-mode drawing surface in the spirit of a
//! vector-graphics context: a small state stack (colors, font, alignment,
//! scissor) plus shape and text primitives and text measurement.
//!
//! [`CommandCanvas`] implements it by recording [`RenderCommand`]s, with
//! measurement delegated to a [`TextMetrics`] implementation. It is what the
//! tests and benchmarks draw into; a GPU backend would replay the commands.

use unicode_segmentation::UnicodeSegmentation;

use crate::geometry::{Rect, TextBounds};
use crate::style::{Color, FontId};

/// Horizontal text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalAlign {
    /// `x` is the left edge.
    #[default]
    Left,
    /// `x` is the center.
    Center,
    /// `x` is the right edge.
    Right,
}

/// Vertical text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlign {
    /// `y` is the top edge.
    Top,
    /// `y` is the middle.
    #[default]
    Middle,
    /// `y` is the bottom edge.
    Bottom,
}

/// Immediate-mode drawing surface.
pub trait Canvas {
    /// Pushes the current state.
    fn save(&mut self);
    /// Pops the state pushed by the matching [`Canvas::save`].
    fn restore(&mut self);
    /// Multiplies every following color's alpha.
    fn set_global_alpha(&mut self, alpha: f32);
    /// Sets the fill color for shapes and text.
    fn set_fill_color(&mut self, color: Color);
    /// Sets the stroke color.
    fn set_stroke_color(&mut self, color: Color);
    /// Selects a font face.
    fn set_font_face(&mut self, font: FontId);
    /// Sets the font size.
    fn set_font_size(&mut self, size: f32);
    /// Sets the line height, as a multiple of the font size.
    fn set_line_height(&mut self, line_height: f32);
    /// Sets the text anchor.
    fn set_text_align(&mut self, horizontal: HorizontalAlign, vertical: VerticalAlign);
    /// Intersects the scissor region with `rect`.
    fn intersect_scissor(&mut self, rect: Rect);
    /// Strokes the outline of `rect`.
    fn stroke_rect(&mut self, rect: Rect);
    /// Fills `rect`.
    fn fill_rect(&mut self, rect: Rect);
    /// Draws a single line of text.
    fn text(&mut self, x: f32, y: f32, text: &str);
    /// Draws text wrapped at `break_width`.
    fn text_box(&mut self, x: f32, y: f32, break_width: f32, text: &str);
    /// Measures a single line of text.
    fn text_bounds(&mut self, x: f32, y: f32, text: &str) -> TextBounds;
    /// Measures text wrapped at `break_width`.
    fn text_box_bounds(&mut self, x: f32, y: f32, break_width: f32, text: &str) -> TextBounds;
}

/// Font shaping stand-in used by [`CommandCanvas`].
pub trait TextMetrics {
    /// Horizontal advance of `text` at `font_size`.
    fn advance(&self, text: &str, font_size: f32) -> f32;
}

/// Every grapheme advances by `font_size * advance_ratio`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    /// Advance per grapheme, relative to the font size.
    pub advance_ratio: f32,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self { advance_ratio: 0.5 }
    }
}

impl TextMetrics for MonospaceMetrics {
    #[allow(clippy::cast_precision_loss)]
    fn advance(&self, text: &str, font_size: f32) -> f32 {
        text.graphemes(true).count() as f32 * font_size * self.advance_ratio
    }
}

/// A recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Filled rectangle.
    FillRect {
        /// Bounds.
        bounds: Rect,
        /// Fill color.
        color: Color,
    },
    /// Rectangle outline.
    StrokeRect {
        /// Bounds.
        bounds: Rect,
        /// Stroke color.
        color: Color,
    },
    /// Single-line text.
    Text {
        /// Text content.
        text: String,
        /// Anchor X.
        x: f32,
        /// Anchor Y.
        y: f32,
        /// Text color.
        color: Color,
        /// Font size.
        font_size: f32,
        /// Font face.
        font: FontId,
        /// Horizontal anchor.
        horizontal: HorizontalAlign,
        /// Vertical anchor.
        vertical: VerticalAlign,
    },
    /// Wrapped text.
    TextBox {
        /// Text content.
        text: String,
        /// Left edge.
        x: f32,
        /// Top edge.
        y: f32,
        /// Wrap width.
        break_width: f32,
        /// Text color.
        color: Color,
        /// Font size.
        font_size: f32,
        /// Line height factor.
        line_height: f32,
    },
    /// Scissor rect (clip following commands).
    PushClip {
        /// Clip bounds.
        bounds: Rect,
    },
    /// Pop scissor rect.
    PopClip,
}

#[derive(Debug, Clone, Copy)]
struct DrawState {
    fill: Color,
    stroke: Color,
    alpha: f32,
    font: FontId,
    font_size: f32,
    line_height: f32,
    horizontal: HorizontalAlign,
    vertical: VerticalAlign,
    clip: Option<Rect>,
    clip_depth: usize,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            fill: Color::WHITE,
            stroke: Color::BLACK,
            alpha: 1.0,
            font: FontId::default(),
            font_size: 16.0,
            line_height: 1.0,
            horizontal: HorizontalAlign::Left,
            vertical: VerticalAlign::Top,
            clip: None,
            clip_depth: 0,
        }
    }
}

/// Canvas that records commands instead of rasterizing.
#[derive(Debug)]
pub struct CommandCanvas<M = MonospaceMetrics> {
    metrics: M,
    state: DrawState,
    stack: Vec<DrawState>,
    commands: Vec<RenderCommand>,
}

impl CommandCanvas<MonospaceMetrics> {
    /// Creates a canvas with the default monospace metrics.
    #[must_use]
    pub fn new() -> Self {
        Self::with_metrics(MonospaceMetrics::default())
    }
}

impl Default for CommandCanvas<MonospaceMetrics> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: TextMetrics> CommandCanvas<M> {
    /// Creates a canvas measuring text with `metrics`.
    #[must_use]
    pub fn with_metrics(metrics: M) -> Self {
        Self {
            metrics,
            state: DrawState::default(),
            stack: Vec::with_capacity(16),
            commands: Vec::with_capacity(256),
        }
    }

    /// Begins a new frame.
    pub fn begin_frame(&mut self) {
        self.state = DrawState::default();
        self.stack.clear();
        self.commands.clear();
    }

    /// Commands recorded so far.
    #[must_use]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Ends the frame and hands over the recorded commands.
    pub fn end_frame(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Returns the current clip rect.
    #[must_use]
    pub fn current_clip(&self) -> Option<Rect> {
        self.state.clip
    }

    /// Current font size.
    #[must_use]
    pub fn font_size(&self) -> f32 {
        self.state.font_size
    }

    fn faded(&self, color: Color) -> Color {
        color.fade(self.state.alpha)
    }

    /// Splits `text` into lines no wider than `break_width`, breaking at
    /// whitespace and at explicit newlines. Returns the line count and the
    /// widest line.
    fn wrap(&self, text: &str, break_width: f32) -> (usize, f32) {
        let size = self.state.font_size;
        let space = self.metrics.advance(" ", size);
        let mut lines = 0;
        let mut widest: f32 = 0.0;

        for paragraph in text.split('\n') {
            let mut line_width: f32 = 0.0;
            let mut line_has_words = false;
            lines += 1;

            for word in paragraph.split_whitespace() {
                let word_width = self.metrics.advance(word, size);
                let candidate = if line_has_words {
                    line_width + space + word_width
                } else {
                    word_width
                };

                if line_has_words && candidate > break_width {
                    widest = widest.max(line_width);
                    lines += 1;
                    line_width = word_width;
                } else {
                    line_width = candidate;
                }
                line_has_words = true;
            }
            widest = widest.max(line_width);
        }

        (lines, widest)
    }
}

impl<M: TextMetrics> Canvas for CommandCanvas<M> {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        let Some(previous) = self.stack.pop() else {
            tracing::warn!("Canvas restore without matching save");
            return;
        };

        for _ in previous.clip_depth..self.state.clip_depth {
            self.commands.push(RenderCommand::PopClip);
        }
        self.state = previous;
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_fill_color(&mut self, color: Color) {
        self.state.fill = color;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke = color;
    }

    fn set_font_face(&mut self, font: FontId) {
        self.state.font = font;
    }

    fn set_font_size(&mut self, size: f32) {
        self.state.font_size = size;
    }

    fn set_line_height(&mut self, line_height: f32) {
        self.state.line_height = line_height;
    }

    fn set_text_align(&mut self, horizontal: HorizontalAlign, vertical: VerticalAlign) {
        self.state.horizontal = horizontal;
        self.state.vertical = vertical;
    }

    fn intersect_scissor(&mut self, rect: Rect) {
        // Intersect with current clip if any
        let clip = match self.state.clip {
            Some(current) => current.intersection(&rect).unwrap_or(Rect::ZERO),
            None => rect,
        };

        self.state.clip = Some(clip);
        self.state.clip_depth += 1;
        self.commands.push(RenderCommand::PushClip { bounds: clip });
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.commands.push(RenderCommand::StrokeRect {
            bounds: rect,
            color: self.faded(self.state.stroke),
        });
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.commands.push(RenderCommand::FillRect {
            bounds: rect,
            color: self.faded(self.state.fill),
        });
    }

    fn text(&mut self, x: f32, y: f32, text: &str) {
        self.commands.push(RenderCommand::Text {
            text: text.to_owned(),
            x,
            y,
            color: self.faded(self.state.fill),
            font_size: self.state.font_size,
            font: self.state.font,
            horizontal: self.state.horizontal,
            vertical: self.state.vertical,
        });
    }

    fn text_box(&mut self, x: f32, y: f32, break_width: f32, text: &str) {
        self.commands.push(RenderCommand::TextBox {
            text: text.to_owned(),
            x,
            y,
            break_width,
            color: self.faded(self.state.fill),
            font_size: self.state.font_size,
            line_height: self.state.line_height,
        });
    }

    fn text_bounds(&mut self, x: f32, y: f32, text: &str) -> TextBounds {
        let width = self.metrics.advance(text, self.state.font_size);
        TextBounds::new(x, y, x + width, y + self.state.font_size)
    }

    #[allow(clippy::cast_precision_loss)]
    fn text_box_bounds(&mut self, x: f32, y: f32, break_width: f32, text: &str) -> TextBounds {
        let (lines, widest) = self.wrap(text, break_width);
        let line = self.state.font_size * self.state.line_height;
        TextBounds::new(x, y, x + widest, y + lines as f32 * line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monospace_bounds() {
        let mut canvas = CommandCanvas::new();
        canvas.set_font_size(20.0);

        let bounds = canvas.text_bounds(3.0, 4.0, "Hello");
        assert!((bounds.width() - 50.0).abs() < f32::EPSILON);
        assert!((bounds.height() - 20.0).abs() < f32::EPSILON);

        // One grapheme, two code points.
        let accented = canvas.text_bounds(0.0, 0.0, "e\u{301}");
        assert!((accented.width() - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_box_bounds_wrap() {
        let mut canvas = CommandCanvas::new();
        canvas.set_font_size(10.0);
        canvas.set_line_height(2.0);

        // "aaaa bbbb cccc" is 70 wide on one line; 45 fits two words each.
        let bounds = canvas.text_box_bounds(0.0, 0.0, 45.0, "aaaa bbbb cccc");
        assert!((bounds.height() - 40.0).abs() < f32::EPSILON);
        assert!((bounds.width() - 45.0).abs() < f32::EPSILON);

        let one_line = canvas.text_box_bounds(0.0, 0.0, 500.0, "aaaa bbbb cccc");
        assert!((one_line.height() - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_clip_stack() {
        let mut canvas = CommandCanvas::new();

        canvas.save();
        canvas.intersect_scissor(Rect::new(0.0, 0.0, 100.0, 100.0));
        canvas.intersect_scissor(Rect::new(50.0, 50.0, 100.0, 100.0));
        assert_eq!(canvas.current_clip(), Some(Rect::new(50.0, 50.0, 50.0, 50.0)));

        canvas.restore();
        assert!(canvas.current_clip().is_none());

        let pops = canvas
            .commands()
            .iter()
            .filter(|c| matches!(c, RenderCommand::PopClip))
            .count();
        assert_eq!(pops, 2);
    }

    #[test]
    fn test_global_alpha_fades() {
        let mut canvas = CommandCanvas::new();
        canvas.set_global_alpha(0.5);
        canvas.set_fill_color(Color::WHITE);
        canvas.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0));

        let batch = canvas.end_frame();
        assert_eq!(
            batch[0],
            RenderCommand::FillRect {
                bounds: Rect::new(0.0, 0.0, 1.0, 1.0),
                color: Color::WHITE.with_alpha(0.5),
            }
        );
    }
}
