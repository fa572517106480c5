/// Ordered list of user-placed 2D marks
use nalgebra::{Point2, Point3};
use std::sync::Arc;

use crate::color::Rgba;
use crate::geometry::{Geometry, GeometryFactory, Triangle};
use crate::primitive::{MarkKind, Placement, PrimitiveInstance, PrimitiveKind};
use crate::transform::AffineTransform;

/// Insertion order is draw order: later marks paint over earlier ones.
#[derive(Debug, Default)]
pub struct StrokeList {
    instances: Vec<PrimitiveInstance>,
    geometry: GeometryFactory,
}

impl StrokeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one mark at `position` (normalized device coordinates).
    /// `segments` only matters for circles and is raised to at least 3.
    pub fn place(
        &mut self,
        kind: MarkKind,
        position: Point2<f32>,
        color: Rgba,
        size: f32,
        segments: u32,
    ) -> &PrimitiveInstance {
        let (kind, geometry) = match kind {
            MarkKind::Point => (PrimitiveKind::Point, self.geometry.point()),
            MarkKind::Triangle => (PrimitiveKind::Triangle, self.geometry.triangle()),
            MarkKind::Circle => {
                let geometry = self.geometry.circle(segments);
                let segments = geometry.vertex_count() as u32 / 3;
                (PrimitiveKind::Circle { segments }, geometry)
            }
        };
        self.push(PrimitiveInstance::new(
            kind,
            geometry,
            color,
            Placement::Screen { position, size },
        ))
    }

    /// Append a triangle with explicit vertices in device coordinates.
    pub fn place_facet(&mut self, vertices: [Point2<f32>; 3], color: Rgba) -> &PrimitiveInstance {
        let [a, b, c] = vertices.map(|p| Point3::new(p.x, p.y, 0.0));
        let geometry = Arc::new(Geometry::from_triangles(&[Triangle::new(a, b, c)]));
        self.push(PrimitiveInstance::new(
            PrimitiveKind::Facet,
            geometry,
            color,
            Placement::World(AffineTransform::identity()),
        ))
    }

    fn push(&mut self, instance: PrimitiveInstance) -> &PrimitiveInstance {
        self.instances.push(instance);
        &self.instances[self.instances.len() - 1]
    }

    /// Drop the most recent mark. Returns it, or `None` on an empty list.
    pub fn undo(&mut self) -> Option<PrimitiveInstance> {
        self.instances.pop()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn all_instances(&self) -> &[PrimitiveInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_on_empty_is_noop() {
        let mut strokes = StrokeList::new();
        assert!(strokes.undo().is_none());
        assert!(strokes.is_empty());
        strokes.clear();
        assert!(strokes.is_empty());
    }

    #[test]
    fn test_place_then_undo_restores_length() {
        let mut strokes = StrokeList::new();
        strokes.place(MarkKind::Triangle, Point2::new(0.1, 0.1), Rgba::GREEN, 10.0, 10);
        let before = strokes.len();

        strokes.place(MarkKind::Circle, Point2::new(-0.3, 0.2), Rgba::BLUE, 15.0, 12);
        assert_eq!(strokes.len(), before + 1);

        let removed = strokes.undo().map(|m| m.kind());
        assert_eq!(removed, Some(PrimitiveKind::Circle { segments: 12 }));
        assert_eq!(strokes.len(), before);
    }

    #[test]
    fn test_point_placement() {
        let mut strokes = StrokeList::new();
        strokes.place(
            MarkKind::Point,
            Point2::new(0.0, 0.0),
            Rgba::new(1.0, 0.0, 0.0, 1.0),
            5.0,
            10,
        );

        let all = strokes.all_instances();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].kind(), PrimitiveKind::Point);
        assert_eq!(all[0].position(), Some(Point2::new(0.0, 0.0)));
        assert_eq!(all[0].color(), Rgba::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(all[0].size(), Some(5.0));
    }

    #[test]
    fn test_circle_segments_are_clamped() {
        let mut strokes = StrokeList::new();
        let mark = strokes.place(MarkKind::Circle, Point2::origin(), Rgba::WHITE, 5.0, 2);
        assert_eq!(mark.kind().segments(), Some(3));
        assert_eq!(mark.geometry().vertex_count(), 9);
    }

    #[test]
    fn test_draw_order_is_insertion_order() {
        let mut strokes = StrokeList::new();
        let colors = [Rgba::RED, Rgba::GREEN, Rgba::BLUE];
        for (i, color) in colors.iter().enumerate() {
            strokes.place(MarkKind::Point, Point2::new(i as f32 * 0.1, 0.0), *color, 5.0, 3);
        }
        let order: Vec<Rgba> = strokes.all_instances().iter().map(|m| m.color()).collect();
        assert_eq!(order, colors);

        strokes.clear();
        assert!(strokes.is_empty());
    }

    #[test]
    fn test_facet_keeps_vertices() {
        let mut strokes = StrokeList::new();
        let facet = strokes.place_facet(
            [Point2::new(-0.3, 0.85), Point2::new(-0.6, 0.2), Point2::new(-0.15, 0.2)],
            Rgba::rgb(0.75, 0.75, 0.75),
        );
        assert_eq!(facet.kind(), PrimitiveKind::Facet);
        assert_eq!(facet.geometry().packed(), &[-0.3, 0.85, 0.0, -0.6, 0.2, 0.0, -0.15, 0.2, 0.0]);
        assert_eq!(facet.model_transform(), AffineTransform::identity());
    }
}
