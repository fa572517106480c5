/// Vertex lists for the canonical unit primitives
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;
use std::f32::consts::TAU;
use std::sync::Arc;

/// Fewest segments a circle fan may have.
pub const MIN_CIRCLE_SEGMENTS: u32 = 3;
/// Most segments a circle fan may have.
pub const MAX_CIRCLE_SEGMENTS: u32 = 360;

/// How a geometry's vertices are assembled by the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Points,
    Triangles,
}

/// A triangle face defined by three positions
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
}

impl Triangle {
    pub fn new(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Unnormalized face normal following the vertex winding.
    pub fn winding_normal(&self) -> Vector3<f32> {
        let [v0, v1, v2] = self.vertices;
        (v1 - v0).cross(&(v2 - v0))
    }
}

/// Immutable vertex data for one primitive kind.
#[derive(Debug, Clone)]
pub struct Geometry {
    topology: Topology,
    positions: Vec<Point3<f32>>,
    /// Flattened xyz triples, kept alongside so uploads never re-pack.
    packed: Vec<f32>,
}

impl Geometry {
    pub fn new(topology: Topology, positions: Vec<Point3<f32>>) -> Self {
        let packed = positions.iter().flat_map(|p| [p.x, p.y, p.z]).collect();
        Self {
            topology,
            positions,
            packed,
        }
    }

    pub fn from_triangles(triangles: &[Triangle]) -> Self {
        let positions = triangles.iter().flat_map(|t| t.vertices).collect();
        Self::new(Topology::Triangles, positions)
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn positions(&self) -> &[Point3<f32>] {
        &self.positions
    }

    pub fn packed(&self) -> &[f32] {
        &self.packed
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Triangles in draw order. Empty for point geometry.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        let chunks = match self.topology {
            Topology::Triangles => self.positions.chunks_exact(3),
            Topology::Points => self.positions[..0].chunks_exact(3),
        };
        chunks.map(|c| Triangle::new(c[0], c[1], c[2]))
    }
}

/// Produces unit primitives and hands out shared copies afterwards.
#[derive(Debug, Default)]
pub struct GeometryFactory {
    point: Option<Arc<Geometry>>,
    triangle: Option<Arc<Geometry>>,
    cube: Option<Arc<Geometry>>,
    circles: HashMap<u32, Arc<Geometry>>,
}

impl GeometryFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single vertex at the origin; its size is a rasterizer hint.
    pub fn point(&mut self) -> Arc<Geometry> {
        self.point
            .get_or_insert_with(|| {
                Arc::new(Geometry::new(Topology::Points, vec![Point3::origin()]))
            })
            .clone()
    }

    /// Right triangle (0,0) (1,0) (0,1), counter-clockwise.
    pub fn triangle(&mut self) -> Arc<Geometry> {
        self.triangle
            .get_or_insert_with(|| {
                Arc::new(Geometry::from_triangles(&[Triangle::new(
                    Point3::new(0.0, 0.0, 0.0),
                    Point3::new(1.0, 0.0, 0.0),
                    Point3::new(0.0, 1.0, 0.0),
                )]))
            })
            .clone()
    }

    /// Unit-radius fan around the origin, one counter-clockwise triangle per
    /// segment. The count is clamped to
    /// `MIN_CIRCLE_SEGMENTS..=MAX_CIRCLE_SEGMENTS`.
    pub fn circle(&mut self, segments: u32) -> Arc<Geometry> {
        let segments = segments.clamp(MIN_CIRCLE_SEGMENTS, MAX_CIRCLE_SEGMENTS);
        self.circles
            .entry(segments)
            .or_insert_with(|| Arc::new(circle_fan(segments)))
            .clone()
    }

    /// Unit cube spanning [0,1] in x and y and [0,-1] in z.
    pub fn cube(&mut self) -> Arc<Geometry> {
        self.cube
            .get_or_insert_with(|| Arc::new(unit_cube()))
            .clone()
    }
}

fn circle_fan(segments: u32) -> Geometry {
    let step = TAU / segments as f32;
    let rim = |k: u32| {
        let angle = step * k as f32;
        Point3::new(angle.cos(), angle.sin(), 0.0)
    };

    let triangles: Vec<Triangle> = (0..segments)
        .map(|k| Triangle::new(Point3::origin(), rim(k), rim(k + 1)))
        .collect();
    Geometry::from_triangles(&triangles)
}

/// Every face is two triangles wound clockwise when seen from outside, so
/// each winding normal points into the cube. The front face lies at z = 0.
fn unit_cube() -> Geometry {
    let v = Point3::new;
    let t = Triangle::new;

    let faces = [
        // Front (z = 0)
        t(v(0.0, 0.0, 0.0), v(1.0, 1.0, 0.0), v(1.0, 0.0, 0.0)),
        t(v(0.0, 0.0, 0.0), v(0.0, 1.0, 0.0), v(1.0, 1.0, 0.0)),
        // Back (z = -1)
        t(v(0.0, 0.0, -1.0), v(1.0, 0.0, -1.0), v(1.0, 1.0, -1.0)),
        t(v(0.0, 0.0, -1.0), v(1.0, 1.0, -1.0), v(0.0, 1.0, -1.0)),
        // Top (y = 1)
        t(v(0.0, 1.0, 0.0), v(0.0, 1.0, -1.0), v(1.0, 1.0, -1.0)),
        t(v(0.0, 1.0, 0.0), v(1.0, 1.0, -1.0), v(1.0, 1.0, 0.0)),
        // Bottom (y = 0)
        t(v(0.0, 0.0, 0.0), v(1.0, 0.0, -1.0), v(0.0, 0.0, -1.0)),
        t(v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(1.0, 0.0, -1.0)),
        // Right (x = 1)
        t(v(1.0, 0.0, 0.0), v(1.0, 1.0, 0.0), v(1.0, 1.0, -1.0)),
        t(v(1.0, 0.0, 0.0), v(1.0, 1.0, -1.0), v(1.0, 0.0, -1.0)),
        // Left (x = 0)
        t(v(0.0, 0.0, 0.0), v(0.0, 1.0, -1.0), v(0.0, 1.0, 0.0)),
        t(v(0.0, 0.0, 0.0), v(0.0, 0.0, -1.0), v(0.0, 1.0, -1.0)),
    ];
    Geometry::from_triangles(&faces)
}
