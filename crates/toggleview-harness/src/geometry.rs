#![forbid(unsafe_code)]

//! Simulated panel placement.
//!
//! The harness plays the host: it knows where both panels sit on screen for
//! any offset and hands those rectangles to the controller on pointer down.
//!
//! The right panel spans one viewport and starts at `offset`; the left panel
//! ends where the right one begins. With limits `[0, viewport_width]` the
//! visible screen is covered by exactly one panel at either limit.

use toggleview_core::{HitRects, PanelLayout, Rect};

/// Default simulated screen height in pixels.
pub const DEFAULT_HEIGHT: f64 = 1920.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelGeometry {
    pub viewport_width: f64,
    pub left_panel_width: f64,
    pub height: f64,
}

impl PanelGeometry {
    /// Geometry for a layout. A zero left panel width means a full-viewport
    /// left panel.
    #[must_use]
    pub fn from_layout(layout: &PanelLayout, height: f64) -> Self {
        let left_panel_width = if layout.left_panel_width > 0.0 {
            layout.left_panel_width
        } else {
            layout.viewport_width
        };
        Self {
            viewport_width: layout.viewport_width,
            left_panel_width,
            height,
        }
    }

    /// On-screen rectangles of both panels at `offset`.
    #[must_use]
    pub fn hit_rects(&self, offset: f64) -> HitRects {
        HitRects::new(
            Rect::new(
                offset - self.left_panel_width,
                0.0,
                self.left_panel_width,
                self.height,
            ),
            Rect::new(offset, 0.0, self.viewport_width, self.height),
        )
    }

    /// The visible screen.
    #[must_use]
    pub fn screen(&self) -> Rect {
        Rect::from_size(self.viewport_width, self.height)
    }

    /// Point at fractions of the screen width and height.
    #[must_use]
    pub fn point(&self, fx: f64, fy: f64) -> (f64, f64) {
        (self.viewport_width * fx, self.height * fy)
    }
}
