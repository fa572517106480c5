/// Initial session parameters
use serde::{Deserialize, Serialize};

use crate::animation::AnimationGroup;
use crate::color::Rgba;
use crate::primitive::MarkKind;

/// Starting values for a session. Every field has a default, so a partial
/// configuration file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Shape placed by the next click
    pub kind: MarkKind,
    pub color: Rgba,
    /// Mark size in screen units (points: pixels)
    pub size: f32,
    /// Circle segment count
    pub segments: u32,
    /// Rotation of the whole 3D scene about the y axis, in degrees
    pub global_rotation: f32,
    /// Animation groups running when the session starts
    pub animate: Vec<AnimationGroup>,
    pub clear_color: Rgba,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            kind: MarkKind::Point,
            color: Rgba::WHITE,
            size: 5.0,
            segments: 10,
            global_rotation: 0.0,
            animate: Vec::new(),
            clear_color: Rgba::BLACK,
        }
    }
}
