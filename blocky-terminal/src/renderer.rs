/// Software rasterizer with color and depth buffers, presented as half-block
/// characters
use blocky_core::{Rasterizer, RenderError, RenderResult, Rgba, Viewport};
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Point3};
use std::io::Write;

/// Upper half block: foreground paints the top pixel, background the bottom.
const HALF_BLOCK: char = '\u{2580}';

/// CPU rasterizer implementing the engine's graphics context.
///
/// Each terminal cell holds two vertically stacked pixels, so a surface of
/// `cols x rows` cells is `cols x 2*rows` pixels.
pub struct SoftwareRasterizer {
    width: usize,
    height: usize,
    clear_color: Rgba,
    color_buffer: Vec<Rgba>,
    depth_buffer: Vec<f32>,
    depth_test: bool,
    vertices: Vec<Point3<f32>>,
    color: Rgba,
    transform: Matrix4<f32>,
    point_size: f32,
}

impl SoftwareRasterizer {
    /// Acquire a pixel surface. Zero-sized surfaces cannot be drawn to.
    pub fn new(width: usize, height: usize, clear_color: Rgba) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::context(format!(
                "surface of {width}x{height} pixels has no area"
            )));
        }
        let size = width * height;
        Ok(Self {
            width,
            height,
            clear_color,
            color_buffer: vec![clear_color; size],
            depth_buffer: vec![f32::INFINITY; size],
            depth_test: false,
            vertices: Vec::new(),
            color: Rgba::WHITE,
            transform: Matrix4::identity(),
            point_size: 1.0,
        })
    }

    /// Surface sized for a terminal grid of `cols x rows` cells.
    pub fn for_cells(cols: u16, rows: u16, clear_color: Rgba) -> RenderResult<Self> {
        Self::new(cols as usize, rows as usize * 2, clear_color)
    }

    /// Reallocate the buffers; contents are reset to the clear color.
    pub fn resize(&mut self, width: usize, height: usize) {
        let width = width.max(1);
        let height = height.max(1);
        self.width = width;
        self.height = height;
        self.color_buffer = vec![self.clear_color; width * height];
        self.depth_buffer = vec![f32::INFINITY; width * height];
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width as u32, self.height as u32)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.color_buffer[y * self.width + x])
    }

    pub fn frame(&self) -> &[Rgba] {
        &self.color_buffer
    }

    /// Vertex to (screen x, screen y, ndc depth).
    fn project(&self, vertex: &Point3<f32>) -> (f32, f32, f32) {
        let ndc = self.transform.transform_point(vertex);
        let screen = self.viewport().ndc_to_screen(ndc.x, ndc.y);
        (screen.x, screen.y, ndc.z)
    }

    fn write_fragment(&mut self, x: usize, y: usize, depth: f32) {
        if !(-1.0..=1.0).contains(&depth) {
            return;
        }
        let idx = y * self.width + x;
        if self.depth_test {
            if depth >= self.depth_buffer[idx] {
                return;
            }
            self.depth_buffer[idx] = depth;
        }
        self.color_buffer[idx] = self.color;
    }

    fn rasterize_triangle(&mut self, coords: [(f32, f32, f32); 3]) {
        let [v0, v1, v2] = coords;

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                if let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                        self.write_fragment(x as usize, y as usize, depth);
                    }
                }
            }
        }
    }

    fn rasterize_point(&mut self, (sx, sy, depth): (f32, f32, f32)) {
        let half = self.point_size / 2.0;
        let (Some((min_x, max_x)), Some((min_y, max_y))) = (
            pixel_span(sx, half, self.width),
            pixel_span(sy, half, self.height),
        ) else {
            return;
        };

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                self.write_fragment(x, y, depth);
            }
        }
    }

    /// Write the color buffer to the terminal starting at cell row `top`.
    pub fn present<W: Write>(&self, writer: &mut W, top: u16) -> std::io::Result<()> {
        let mut last: Option<(Color, Color)> = None;

        for row in 0..self.height / 2 {
            writer.queue(cursor::MoveTo(0, top + row as u16))?;
            for x in 0..self.width {
                let upper = self.color_buffer[(row * 2) * self.width + x];
                let lower = self.color_buffer[(row * 2 + 1) * self.width + x];
                let colors = (terminal_color(upper), terminal_color(lower));

                if last != Some(colors) {
                    writer.queue(SetForegroundColor(colors.0))?;
                    writer.queue(SetBackgroundColor(colors.1))?;
                    last = Some(colors);
                }
                writer.queue(Print(HALF_BLOCK))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl Rasterizer for SoftwareRasterizer {
    fn clear(&mut self, color: bool, depth: bool) {
        if color {
            self.color_buffer.fill(self.clear_color);
        }
        if depth {
            self.depth_buffer.fill(f32::INFINITY);
        }
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    fn upload_vertices(&mut self, vertices: &[f32]) -> RenderResult<()> {
        if vertices.len() % 3 != 0 {
            return Err(RenderError::buffer(format!(
                "{} floats do not form xyz triples",
                vertices.len()
            )));
        }
        self.vertices.clear();
        self.vertices
            .extend(vertices.chunks_exact(3).map(|c| Point3::new(c[0], c[1], c[2])));
        Ok(())
    }

    fn set_uniform_color(&mut self, color: Rgba) {
        self.color = color;
    }

    fn set_uniform_transform(&mut self, transform: &Matrix4<f32>) {
        self.transform = *transform;
    }

    fn set_point_size(&mut self, size: f32) {
        self.point_size = size.max(1.0);
    }

    fn draw_triangles(&mut self, vertex_count: usize) {
        let count = vertex_count.min(self.vertices.len());
        for i in (0..count - count % 3).step_by(3) {
            let coords = [
                self.project(&self.vertices[i]),
                self.project(&self.vertices[i + 1]),
                self.project(&self.vertices[i + 2]),
            ];
            self.rasterize_triangle(coords);
        }
    }

    fn draw_points(&mut self, vertex_count: usize) {
        let count = vertex_count.min(self.vertices.len());
        for i in 0..count {
            let projected = self.project(&self.vertices[i]);
            self.rasterize_point(projected);
        }
    }
}

fn terminal_color(c: Rgba) -> Color {
    let [r, g, b] = c.to_rgb8();
    Color::Rgb { r, g, b }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

/// Pixels covered by `center +- half` along an axis of `limit` pixels, or
/// `None` when the span misses the surface. Bounds stay in f32 until clipped.
fn pixel_span(center: f32, half: f32, limit: usize) -> Option<(usize, usize)> {
    let lo = (center - half).round().max(0.0);
    let hi = ((center + half).round() - 1.0).min(limit as f32 - 1.0);
    (lo <= hi).then(|| (lo as usize, hi as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use blocky_core::{
        AffineTransform, FrameRenderer, FrameReport, GeometryFactory, SceneBuilder, Session,
    };
    use nalgebra::Point2;

    fn surface() -> SoftwareRasterizer {
        SoftwareRasterizer::new(40, 40, Rgba::BLACK).unwrap()
    }

    fn draw_marks(raster: &mut SoftwareRasterizer, session: &Session) -> FrameReport {
        FrameRenderer::flat().render_frame(raster, session.marks(), &AffineTransform::identity())
    }

    #[test]
    fn test_zero_surface_is_fatal() {
        let err = SoftwareRasterizer::new(0, 10, Rgba::BLACK).err().unwrap();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_point_lands_at_center() {
        let mut session = Session::default();
        session.set_selected_color(Rgba::RED);
        session.set_selected_size(4.0);
        session.place_mark(Point2::origin());

        let mut raster = surface();
        draw_marks(&mut raster, &session);

        assert_eq!(raster.pixel(20, 20), Some(Rgba::RED));
        assert_eq!(raster.pixel(18, 18), Some(Rgba::RED));
        assert_eq!(raster.pixel(0, 0), Some(Rgba::BLACK));
        assert_eq!(raster.pixel(40, 0), None);
    }

    #[test]
    fn test_later_marks_paint_over_earlier() {
        let mut session = Session::default();
        session.set_selected_kind(blocky_core::MarkKind::Circle);
        session.set_selected_size(100.0);
        session.set_selected_color(Rgba::GREEN);
        session.place_mark(Point2::origin());
        session.set_selected_color(Rgba::BLUE);
        session.place_mark(Point2::origin());

        let mut raster = surface();
        draw_marks(&mut raster, &session);
        assert_eq!(raster.pixel(20, 20), Some(Rgba::BLUE));

        session.undo();
        draw_marks(&mut raster, &session);
        assert_eq!(raster.pixel(20, 20), Some(Rgba::GREEN));
    }

    #[test]
    fn test_redraw_is_idempotent() {
        let mut session = Session::default();
        session.load_preset_scene();
        let mut raster = surface();

        draw_marks(&mut raster, &session);
        let first = raster.frame().to_vec();
        draw_marks(&mut raster, &session);
        assert_eq!(raster.frame(), first.as_slice());

        let builder = SceneBuilder::new(&mut GeometryFactory::new());
        let model = builder.build(&builder.rest_pose());
        let mut global = AffineTransform::identity();
        global.rotate(30.0, 0.0, 1.0, 0.0);
        FrameRenderer::depth_tested().render_frame(&mut raster, &model.instances, &global);
        let first = raster.frame().to_vec();
        FrameRenderer::depth_tested().render_frame(&mut raster, &model.instances, &global);
        assert_eq!(raster.frame(), first.as_slice());
    }

    #[test]
    fn test_depth_test_keeps_nearest() {
        let mut raster = surface();
        raster.set_depth_test(true);
        raster.clear(true, true);
        raster
            .upload_vertices(&[-1.0, -1.0, 0.0, 3.0, -1.0, 0.0, -1.0, 3.0, 0.0])
            .unwrap();

        let mut near = AffineTransform::identity();
        near.translate(0.0, 0.0, -0.5);
        raster.set_uniform_color(Rgba::RED);
        raster.set_uniform_transform(near.matrix());
        raster.draw_triangles(3);

        raster.set_uniform_color(Rgba::BLUE);
        raster.set_uniform_transform(AffineTransform::identity().matrix());
        raster.draw_triangles(3);

        assert_eq!(raster.pixel(10, 10), Some(Rgba::RED));
    }

    #[test]
    fn test_far_off_canvas_point_is_dropped() {
        let mut session = Session::default();
        session.place_mark(Point2::new(-1.0e10, 0.0));
        session.place_mark(Point2::new(0.0, 1.0e10));

        let mut raster = surface();
        let report = draw_marks(&mut raster, &session);
        assert_eq!(report.submitted, 2);
        assert!(raster.frame().iter().all(|c| *c == Rgba::BLACK));
    }

    #[test]
    fn test_pixel_span_clips_to_surface() {
        assert_eq!(pixel_span(20.0, 2.0, 40), Some((18, 21)));
        assert_eq!(pixel_span(0.0, 2.0, 40), Some((0, 1)));
        assert_eq!(pixel_span(-5.0e9, 2.0, 40), None);
        assert_eq!(pixel_span(5.0e9, 2.0, 40), None);
        assert_eq!(pixel_span(f32::NAN, 2.0, 40), None);
    }

    #[test]
    fn test_malformed_upload_is_rejected() {
        let mut raster = surface();
        let err = raster.upload_vertices(&[0.0, 1.0]).unwrap_err();
        assert!(!err.is_fatal());
    }
}
