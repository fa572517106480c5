/// Blocky Core Library - hierarchical transforms and full-scene redraw
///
/// This library provides the backend-independent engine: unit primitive
/// geometry, affine transform composition, the joint hierarchy of the blocky
/// animal, the 2D stroke list, animation, and the frame renderer that drives
/// any `Rasterizer` implementation.

pub mod animation;
pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod joint;
pub mod preset;
pub mod primitive;
pub mod projection;
pub mod render;
pub mod scene;
pub mod session;
pub mod stroke;
pub mod transform;

// Re-export commonly used types
pub use animation::{AnimationDriver, AnimationGroup, JointWave};
pub use color::Rgba;
pub use config::SessionConfig;
pub use error::{RenderError, RenderResult};
pub use geometry::{Geometry, GeometryFactory, Topology, Triangle};
pub use joint::{JointAngles, JointDef, JointId};
pub use primitive::{MarkKind, Placement, PrimitiveInstance, PrimitiveKind};
pub use projection::Viewport;
pub use render::{FrameRenderer, FrameReport, Rasterizer};
pub use scene::{BuiltScene, SceneBuilder};
pub use session::{Selection, Session};
pub use stroke::StrokeList;
pub use transform::AffineTransform;
