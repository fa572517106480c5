/// Conversions between canvas pixels and normalized device coordinates
use nalgebra::Point2;

/// Pixel dimensions of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Degenerate sizes are raised to one pixel.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1) as f32,
            height: height.max(1) as f32,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Canvas pixel (origin top-left, y down) to device coordinates
    /// (origin at the center, y up).
    pub fn screen_to_ndc(&self, x: f32, y: f32) -> Point2<f32> {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        Point2::new((x - half_w) / half_w, (half_h - y) / half_h)
    }

    /// Inverse of `screen_to_ndc`.
    pub fn ndc_to_screen(&self, x: f32, y: f32) -> Point2<f32> {
        Point2::new(
            (x + 1.0) * 0.5 * self.width,
            (1.0 - y) * 0.5 * self.height,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(400, 400)
    }
}
