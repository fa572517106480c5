/// Drawable instances: one geometry, one color, one placement
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::color::Rgba;
use crate::error::RenderResult;
use crate::geometry::{Geometry, Topology};
use crate::render::Rasterizer;
use crate::transform::AffineTransform;

/// Screen-size units per normalized device unit for 2D marks.
pub const MARK_SIZE_UNIT: f32 = 200.0;

/// Shapes the user can place in 2D mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkKind {
    #[default]
    Point,
    Triangle,
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Point,
    Triangle,
    Circle { segments: u32 },
    Cube,
    /// Triangle with explicit vertices, used by preset drawings.
    Facet,
}

impl PrimitiveKind {
    pub fn segments(&self) -> Option<u32> {
        match self {
            Self::Circle { segments } => Some(*segments),
            _ => None,
        }
    }
}

/// Where an instance lands in normalized device space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Fully resolved model transform.
    World(AffineTransform),
    /// 2D mark centered or anchored at `position`, `size` in screen units.
    Screen { position: Point2<f32>, size: f32 },
}

/// One drawable. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct PrimitiveInstance {
    kind: PrimitiveKind,
    geometry: Arc<Geometry>,
    color: Rgba,
    placement: Placement,
}

impl PrimitiveInstance {
    pub fn new(
        kind: PrimitiveKind,
        geometry: Arc<Geometry>,
        color: Rgba,
        placement: Placement,
    ) -> Self {
        Self {
            kind,
            geometry,
            color: color.clamped(),
            placement,
        }
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    pub fn geometry(&self) -> &Arc<Geometry> {
        &self.geometry
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn position(&self) -> Option<Point2<f32>> {
        match self.placement {
            Placement::Screen { position, .. } => Some(position),
            Placement::World(_) => None,
        }
    }

    pub fn size(&self) -> Option<f32> {
        match self.placement {
            Placement::Screen { size, .. } => Some(size),
            Placement::World(_) => None,
        }
    }

    /// Model transform for the unit geometry. Points are only translated;
    /// their size goes to the rasterizer as a point-size hint.
    pub fn model_transform(&self) -> AffineTransform {
        match self.placement {
            Placement::World(transform) => transform,
            Placement::Screen { position, size } => {
                let mut t = AffineTransform::identity();
                t.translate(position.x, position.y, 0.0);
                match self.kind {
                    PrimitiveKind::Point | PrimitiveKind::Facet => {}
                    PrimitiveKind::Triangle
                    | PrimitiveKind::Circle { .. }
                    | PrimitiveKind::Cube => {
                        let extent = size / MARK_SIZE_UNIT;
                        t.scale(extent, extent, 1.0);
                    }
                }
                t
            }
        }
    }

    /// Bind color and `global * model`, upload vertices and draw.
    pub fn submit<R: Rasterizer + ?Sized>(
        &self,
        rasterizer: &mut R,
        global: &AffineTransform,
    ) -> RenderResult<()> {
        rasterizer.upload_vertices(self.geometry.packed())?;
        rasterizer.set_uniform_color(self.color);
        rasterizer.set_uniform_transform(global.then(&self.model_transform()).matrix());

        let count = self.geometry.vertex_count();
        match self.geometry.topology() {
            Topology::Points => {
                rasterizer.set_point_size(self.size().unwrap_or(1.0));
                rasterizer.draw_points(count);
            }
            Topology::Triangles => rasterizer.draw_triangles(count),
        }
        Ok(())
    }
}
