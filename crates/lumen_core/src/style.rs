//! Style and theme snapshot.
//!
//! `Style` carries per-widget metrics (font sizes, line heights, animation
//! durations), `Theme` carries per-role colors. Both are read-only from the
//! widgets' point of view and can be loaded from a TOML document:
//!
//! ```toml
//! [style.label]
//! regular_font_size = 22.0
//!
//! [style.animation]
//! highlight_ms = 120
//!
//! [theme]
//! text = 0x2D2D2DFF
//! focus_outline = { r = 1.0, g = 0.0, b = 0.0, a = 1.0 }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{UiError, UiResult};

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "ColorRepr")]
pub struct Color {
    /// Red component (0-1).
    pub r: f32,
    /// Green component (0-1).
    pub g: f32,
    /// Blue component (0-1).
    pub b: f32,
    /// Alpha component (0-1).
    pub a: f32,
}

impl Color {
    /// Solid black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Solid white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    /// Solid red.
    pub const RED: Self = Self::rgba(1.0, 0.0, 0.0, 1.0);

    /// Creates a color from RGBA values (0-1).
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from RGB values (0-1) with full alpha.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Creates an opaque color from 8-bit channels.
    #[must_use]
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        )
    }

    /// Creates a color from hex value (0xRRGGBBAA).
    #[must_use]
    pub fn hex(hex: u32) -> Self {
        let [r, g, b, a] = hex.to_be_bytes();
        Self::rgba(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }

    /// Returns a new color with different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    /// Returns a new color with its alpha scaled by `factor`.
    #[must_use]
    pub fn fade(self, factor: f32) -> Self {
        self.with_alpha(self.a * factor)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Accepted spellings of a color in config files.
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(u32),
    Components {
        r: f32,
        g: f32,
        b: f32,
        #[serde(default = "opaque")]
        a: f32,
    },
}

fn opaque() -> f32 {
    1.0
}

impl From<ColorRepr> for Color {
    fn from(repr: ColorRepr) -> Self {
        match repr {
            ColorRepr::Hex(hex) => Self::hex(hex),
            ColorRepr::Components { r, g, b, a } => Self::rgba(r, g, b, a),
        }
    }
}

/// Handle to a font loaded by the rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FontId(pub i32);

/// Fonts the backend has loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontStash {
    /// Regular text face.
    pub regular: FontId,
}

/// Label font metrics.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct LabelMetrics {
    pub regular_font_size: f32,
    pub medium_font_size: f32,
    pub small_font_size: f32,
    pub description_font_size: f32,
    pub crash_font_size: f32,
    pub button_font_size: f32,
    pub list_item_font_size: f32,
    pub notification_font_size: f32,
    pub dialog_font_size: f32,
    pub line_height: f32,
    pub notification_line_height: f32,
}

impl Default for LabelMetrics {
    fn default() -> Self {
        Self {
            regular_font_size: 20.0,
            medium_font_size: 18.0,
            small_font_size: 16.0,
            description_font_size: 16.0,
            crash_font_size: 24.0,
            button_font_size: 18.0,
            list_item_font_size: 20.0,
            notification_font_size: 18.0,
            dialog_font_size: 24.0,
            line_height: 1.65,
            notification_line_height: 1.35,
        }
    }
}

/// List metrics.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ListMetrics {
    /// Font size of a list item's value text.
    pub item_value_size: f32,
}

impl Default for ListMetrics {
    fn default() -> Self {
        Self {
            item_value_size: 20.0,
        }
    }
}

/// Animation durations, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnimationDurations {
    /// View show/hide fade.
    pub show_ms: u64,
    /// Highlight and text appear/disappear.
    pub highlight_ms: u64,
}

impl AnimationDurations {
    /// Show/hide fade duration.
    #[must_use]
    pub fn show(&self) -> Duration {
        Duration::from_millis(self.show_ms)
    }

    /// Highlight duration.
    #[must_use]
    pub fn highlight(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }
}

impl Default for AnimationDurations {
    fn default() -> Self {
        Self {
            show_ms: 250,
            highlight_ms: 100,
        }
    }
}

/// Metrics for every widget style.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Label metrics.
    pub label: LabelMetrics,
    /// List metrics.
    pub list: ListMetrics,
    /// Animation durations.
    pub animation: AnimationDurations,
}

/// Colors for every semantic role.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Generic text.
    pub text: Color,
    /// Description text.
    pub description: Color,
    /// Text of an enabled plain button.
    pub button_plain_enabled_text: Color,
    /// Text of a disabled plain button.
    pub button_plain_disabled_text: Color,
    /// Notification text.
    pub notification_text: Color,
    /// Dialog button text.
    pub dialog_button: Color,
    /// List item value text.
    pub list_item_value: Color,
    /// Faint list item value text.
    pub list_item_faint_value: Color,
    /// Outline drawn around the focused view.
    pub focus_outline: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text: Color::rgb8(45, 45, 45),
            description: Color::rgb8(140, 140, 140),
            button_plain_enabled_text: Color::WHITE,
            button_plain_disabled_text: Color::rgb8(80, 80, 80),
            notification_text: Color::WHITE,
            dialog_button: Color::rgb8(49, 79, 235),
            list_item_value: Color::rgb8(43, 81, 226),
            list_item_faint_value: Color::rgb8(181, 184, 191),
            focus_outline: Color::RED,
        }
    }
}

/// Style and theme loaded together from one document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Widget metrics.
    pub style: Style,
    /// Role colors.
    pub theme: Theme,
}

impl Config {
    /// Parses a TOML document. Missing tables and keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::InvalidConfig`] if the document is malformed.
    pub fn from_toml_str(source: &str) -> UiResult<Self> {
        let config = toml::from_str(source)?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::Io`] if the file can't be read and
    /// [`UiError::InvalidConfig`] if it is malformed.
    pub fn load(path: impl AsRef<Path>) -> UiResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| UiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loading style config from {}", path.display());
        Self::from_toml_str(&source)
    }
}
