/// Full-scene redraw over an abstract graphics backend
use nalgebra::Matrix4;
use tracing::{debug, warn};

use crate::color::Rgba;
use crate::error::RenderResult;
use crate::primitive::PrimitiveInstance;
use crate::transform::AffineTransform;

/// The graphics context operations the engine consumes.
///
/// Acquiring the surface and compiling the shader program happen when a
/// backend is constructed; a backend that exists is ready to draw.
pub trait Rasterizer {
    /// Clear the color buffer and, if requested, the depth buffer.
    fn clear(&mut self, color: bool, depth: bool);

    fn set_depth_test(&mut self, enabled: bool);

    /// Make `vertices` (packed xyz triples) the source for the next draw.
    fn upload_vertices(&mut self, vertices: &[f32]) -> RenderResult<()>;

    fn set_uniform_color(&mut self, color: Rgba);

    fn set_uniform_transform(&mut self, transform: &Matrix4<f32>);

    /// Diameter in pixels used by `draw_points`.
    fn set_point_size(&mut self, size: f32);

    fn draw_triangles(&mut self, vertex_count: usize);

    fn draw_points(&mut self, vertex_count: usize);
}

/// Outcome of one full redraw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub submitted: usize,
    pub skipped: usize,
}

/// Clears the surface and draws every instance in list order.
#[derive(Debug, Clone, Copy)]
pub struct FrameRenderer {
    depth: bool,
}

impl FrameRenderer {
    /// Renderer for flat marks: color clear only, painter's order.
    pub fn flat() -> Self {
        Self { depth: false }
    }

    /// Renderer for the 3D model: color and depth cleared, depth tested.
    pub fn depth_tested() -> Self {
        Self { depth: true }
    }

    pub fn uses_depth(&self) -> bool {
        self.depth
    }

    /// Redraw the whole surface. A failed vertex upload skips only that
    /// instance; the rest of the list is still drawn.
    pub fn render_frame<R: Rasterizer + ?Sized>(
        &self,
        rasterizer: &mut R,
        instances: &[PrimitiveInstance],
        global: &AffineTransform,
    ) -> FrameReport {
        rasterizer.set_depth_test(self.depth);
        rasterizer.clear(true, self.depth);

        let mut report = FrameReport::default();
        for (index, instance) in instances.iter().enumerate() {
            match instance.submit(rasterizer, global) {
                Ok(()) => report.submitted += 1,
                Err(err) => {
                    warn!(index, kind = ?instance.kind(), error = %err, "skipping primitive");
                    report.skipped += 1;
                }
            }
        }

        debug!(
            submitted = report.submitted,
            skipped = report.skipped,
            depth = self.depth,
            "frame rendered"
        );
        report
    }
}
