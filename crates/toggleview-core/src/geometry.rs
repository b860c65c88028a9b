#![forbid(unsafe_code)]

//! Geometric primitives for hit testing.
//!
//! The controller never looks up view geometry itself. The host passes the
//! last known on-screen rectangles of both panels with each pointer down.

/// A rectangle in device pixels, origin at top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: f64,
    /// Top edge (inclusive).
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Left edge (alias for x).
    #[inline]
    pub const fn left(&self) -> f64 {
        self.x
    }

    /// Top edge (alias for y).
    #[inline]
    pub const fn top(&self) -> f64 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point is inside the rectangle.
    ///
    /// Edges are inclusive on the top-left and exclusive on the
    /// bottom-right, so adjacent rectangles never both claim a point.
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Grow the rectangle by `margin` on all four sides.
    ///
    /// A negative margin shrinks it; the size never drops below zero.
    #[must_use]
    pub fn outset(&self, margin: f64) -> Rect {
        let width = (self.width + 2.0 * margin).max(0.0);
        let height = (self.height + 2.0 * margin).max(0.0);
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            width,
            height,
        }
    }

    /// Translate the rectangle horizontally.
    #[inline]
    #[must_use]
    pub fn offset_x(&self, dx: f64) -> Rect {
        Rect {
            x: self.x + dx,
            ..*self
        }
    }
}

/// The last known on-screen rectangles of both panels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HitRects {
    pub left: Rect,
    pub right: Rect,
}

impl HitRects {
    /// Create hit rectangles from both panel bounds.
    #[must_use]
    pub const fn new(left: Rect, right: Rect) -> Self {
        Self { left, right }
    }

    /// Whether the point falls in either panel once both are grown by `slop`.
    #[must_use]
    pub fn accepts(&self, x: f64, y: f64, slop: f64) -> bool {
        self.left.outset(slop).contains(x, y) || self.right.outset(slop).contains(x, y)
    }

    /// Translate both rectangles horizontally.
    #[must_use]
    pub fn offset_x(&self, dx: f64) -> HitRects {
        HitRects {
            left: self.left.offset_x(dx),
            right: self.right.offset_x(dx),
        }
    }
}

/// Display density used to convert density-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Density {
    /// Device pixels per density-independent pixel.
    pub scale: f64,
}

impl Default for Density {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl Density {
    #[must_use]
    pub const fn new(scale: f64) -> Self {
        Self { scale }
    }

    /// Convert density-independent pixels to device pixels.
    #[inline]
    #[must_use]
    pub fn dp_to_px(&self, dp: f64) -> f64 {
        dp * self.scale
    }
}
