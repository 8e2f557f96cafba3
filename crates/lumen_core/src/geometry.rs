//! Geometry shared by views and the canvas.
//!
//! Views store their boundary in whole units with an explicit "unset"
//! state for each extent; the canvas works in continuous `f32` space.

/// A rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// X position (left edge).
    pub x: f32,
    /// Y position (top edge).
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// A zero-sized rect at the origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Returns the right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Returns true if two rectangles intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Returns the intersection of two rectangles, or None if they don't intersect.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }

        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        Some(Self::new(x, y, right - x, bottom - y))
    }

    /// Expands the rectangle by the given amount on all sides.
    #[must_use]
    pub fn expand(&self, amount: f32) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }
}

/// Measured extents of a piece of text, as reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextBounds {
    /// Left edge.
    pub xmin: f32,
    /// Top edge.
    pub ymin: f32,
    /// Right edge.
    pub xmax: f32,
    /// Bottom edge.
    pub ymax: f32,
}

impl TextBounds {
    /// Creates bounds from the four edges.
    #[must_use]
    pub const fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// `xmax - xmin`.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.xmax - self.xmin
    }

    /// `ymax - ymin`.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.ymax - self.ymin
    }
}

/// The boundary rectangle of a view.
///
/// `width`/`height` are `None` until set, which is distinct from an
/// explicit zero: widgets that size themselves to content only do so while
/// the extent is unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Boundary {
    /// X position (left edge).
    pub x: i32,
    /// Y position (top edge).
    pub y: i32,
    /// Width, if set.
    pub width: Option<u32>,
    /// Height, if set.
    pub height: Option<u32>,
}

impl Boundary {
    /// Creates a fully specified boundary.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width: Some(width),
            height: Some(height),
        }
    }

    /// Width, or 0 while unset.
    #[must_use]
    pub fn width_or_zero(&self) -> u32 {
        self.width.unwrap_or(0)
    }

    /// Height, or 0 while unset.
    #[must_use]
    pub fn height_or_zero(&self) -> u32 {
        self.height.unwrap_or(0)
    }

    /// Converts to canvas space. Unset extents become 0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.x as f32,
            self.y as f32,
            self.width_or_zero() as f32,
            self.height_or_zero() as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_expand() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0).expand(5.0);

        assert_eq!(rect, Rect::new(5.0, 15.0, 110.0, 60.0));
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);

        assert_eq!(a.intersection(&b), Some(Rect::new(50.0, 50.0, 50.0, 50.0)));
        assert_eq!(a.intersection(&Rect::new(200.0, 0.0, 10.0, 10.0)), None);
    }

    #[test]
    fn test_boundary_unset_is_not_zero() {
        let unset = Boundary::default();
        let zero = Boundary::new(0, 0, 0, 0);

        assert_ne!(unset, zero);
        assert_eq!(unset.width_or_zero(), 0);
        assert_eq!(unset.to_rect(), zero.to_rect());
    }
}
