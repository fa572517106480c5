/// Fixed joint topology of the blocky animal and its mutable pose
use nalgebra::Vector3;

use crate::color::Rgba;

/// Every joint of the model, listed parent-before-child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointId {
    Hips,
    Torso,
    Neck,
    Head,
    LeftUpperArm,
    LeftForearm,
    RightUpperArm,
    RightForearm,
    LeftThigh,
    LeftShin,
    RightThigh,
    RightShin,
}

impl JointId {
    pub const COUNT: usize = 12;

    /// Walk order: each joint appears after its parent.
    pub const ALL: [JointId; Self::COUNT] = [
        Self::Hips,
        Self::Torso,
        Self::Neck,
        Self::Head,
        Self::LeftUpperArm,
        Self::LeftForearm,
        Self::RightUpperArm,
        Self::RightForearm,
        Self::LeftThigh,
        Self::LeftShin,
        Self::RightThigh,
        Self::RightShin,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn parent(self) -> Option<JointId> {
        match self {
            Self::Hips => None,
            Self::Torso | Self::LeftThigh | Self::RightThigh => Some(Self::Hips),
            Self::Neck | Self::LeftUpperArm | Self::RightUpperArm => Some(Self::Torso),
            Self::Head => Some(Self::Neck),
            Self::LeftForearm => Some(Self::LeftUpperArm),
            Self::RightForearm => Some(Self::RightUpperArm),
            Self::LeftShin => Some(Self::LeftThigh),
            Self::RightShin => Some(Self::RightThigh),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hips => "hips",
            Self::Torso => "torso",
            Self::Neck => "neck",
            Self::Head => "head",
            Self::LeftUpperArm => "left upper arm",
            Self::LeftForearm => "left forearm",
            Self::RightUpperArm => "right upper arm",
            Self::RightForearm => "right forearm",
            Self::LeftThigh => "left thigh",
            Self::LeftShin => "left shin",
            Self::RightThigh => "right thigh",
            Self::RightShin => "right shin",
        }
    }

    /// Next joint in walk order, wrapping around.
    pub fn next(self) -> JointId {
        Self::ALL[(self.index() + 1) % Self::COUNT]
    }

    pub fn prev(self) -> JointId {
        Self::ALL[(self.index() + Self::COUNT - 1) % Self::COUNT]
    }
}

/// Static parameters of one joint.
///
/// The joint frame is `parent * T(offset) * R(angle, axis) * S(scale)`.
/// The cube drawn for the joint adds `T(cube_offset) * S(cube_scale)` on top
/// of that frame without affecting children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointDef {
    pub id: JointId,
    pub offset: Vector3<f32>,
    pub axis: Vector3<f32>,
    pub rest_angle: f32,
    pub scale: Vector3<f32>,
    pub cube_offset: Vector3<f32>,
    pub cube_scale: Vector3<f32>,
    pub color: Rgba,
}

impl JointDef {
    pub fn parent(&self) -> Option<JointId> {
        self.id.parent()
    }
}

/// Cube of size `(w, h, d)` centered on the pivot in x and z, extending
/// from `y0` to `y0 + h`.
fn block(y0: f32, w: f32, h: f32, d: f32) -> (Vector3<f32>, Vector3<f32>) {
    (Vector3::new(-w / 2.0, y0, d / 2.0), Vector3::new(w, h, d))
}

fn joint(
    id: JointId,
    offset: [f32; 3],
    axis: [f32; 3],
    rest_angle: f32,
    cube: (Vector3<f32>, Vector3<f32>),
    color: Rgba,
) -> JointDef {
    JointDef {
        id,
        offset: Vector3::from(offset),
        axis: Vector3::from(axis),
        rest_angle,
        scale: Vector3::new(1.0, 1.0, 1.0),
        cube_offset: cube.0,
        cube_scale: cube.1,
        color,
    }
}

/// Joint table for the default blocky animal, in `JointId::ALL` order.
pub fn blocky_animal() -> [JointDef; JointId::COUNT] {
    use JointId::*;

    const X: [f32; 3] = [1.0, 0.0, 0.0];
    const Y: [f32; 3] = [0.0, 1.0, 0.0];
    const Z: [f32; 3] = [0.0, 0.0, 1.0];

    let fur = Rgba::rgb(0.55, 0.35, 0.2);
    let belly = Rgba::rgb(0.75, 0.55, 0.35);
    let skin = Rgba::rgb(0.9, 0.75, 0.6);
    let limb = Rgba::rgb(0.45, 0.28, 0.15);
    let paw = Rgba::rgb(0.3, 0.18, 0.1);

    [
        joint(Hips, [0.0, -0.15, 0.0], Y, 0.0, block(-0.05, 0.4, 0.15, 0.2), fur),
        joint(Torso, [0.0, 0.1, 0.0], Z, 0.0, block(0.0, 0.36, 0.45, 0.2), belly),
        joint(Neck, [0.0, 0.45, 0.0], Z, 0.0, block(0.0, 0.1, 0.08, 0.1), skin),
        joint(Head, [0.0, 0.08, 0.0], Y, 0.0, block(0.0, 0.24, 0.24, 0.24), skin),
        joint(LeftUpperArm, [-0.23, 0.42, 0.0], Z, -10.0, block(-0.3, 0.1, 0.3, 0.1), limb),
        joint(LeftForearm, [0.0, -0.3, 0.0], Z, 0.0, block(-0.28, 0.09, 0.28, 0.09), paw),
        joint(RightUpperArm, [0.23, 0.42, 0.0], Z, 10.0, block(-0.3, 0.1, 0.3, 0.1), limb),
        joint(RightForearm, [0.0, -0.3, 0.0], Z, 0.0, block(-0.28, 0.09, 0.28, 0.09), paw),
        joint(LeftThigh, [-0.1, -0.05, 0.0], X, 0.0, block(-0.35, 0.12, 0.35, 0.12), limb),
        joint(LeftShin, [0.0, -0.35, 0.0], X, 0.0, block(-0.3, 0.1, 0.3, 0.1), paw),
        joint(RightThigh, [0.1, -0.05, 0.0], X, 0.0, block(-0.35, 0.12, 0.35, 0.12), limb),
        joint(RightShin, [0.0, -0.35, 0.0], X, 0.0, block(-0.3, 0.1, 0.3, 0.1), paw),
    ]
}

/// Current angle, in degrees, of every joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointAngles {
    angles: [f32; JointId::COUNT],
}

impl JointAngles {
    pub fn zeroed() -> Self {
        Self {
            angles: [0.0; JointId::COUNT],
        }
    }

    /// Rest pose of a joint table.
    pub fn rest(defs: &[JointDef]) -> Self {
        let mut angles = Self::zeroed();
        for def in defs {
            angles.set(def.id, def.rest_angle);
        }
        angles
    }

    pub fn get(&self, joint: JointId) -> f32 {
        self.angles[joint.index()]
    }

    /// Non-finite input is ignored.
    pub fn set(&mut self, joint: JointId, degrees: f32) {
        if degrees.is_finite() {
            self.angles[joint.index()] = degrees;
        }
    }
}

impl Default for JointAngles {
    fn default() -> Self {
        Self::rest(&blocky_animal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parents_precede_children() {
        for (position, joint) in JointId::ALL.iter().enumerate() {
            assert_eq!(joint.index(), position);
            if let Some(parent) = joint.parent() {
                assert!(parent.index() < joint.index(), "{} before parent", joint.name());
            }
        }
        assert_eq!(JointId::ALL.iter().filter(|j| j.parent().is_none()).count(), 1);
    }

    #[test]
    fn test_table_matches_walk_order() {
        let defs = blocky_animal();
        for (def, id) in defs.iter().zip(JointId::ALL) {
            assert_eq!(def.id, id);
            assert!(def.axis.norm() > 0.0);
        }
    }

    #[test]
    fn test_rest_pose() {
        let angles = JointAngles::default();
        assert_eq!(angles.get(JointId::LeftUpperArm), -10.0);
        assert_eq!(angles.get(JointId::RightUpperArm), 10.0);
        assert_eq!(angles.get(JointId::Head), 0.0);
    }

    #[test]
    fn test_set_ignores_nan() {
        let mut angles = JointAngles::zeroed();
        angles.set(JointId::Head, 30.0);
        angles.set(JointId::Head, f32::NAN);
        assert_eq!(angles.get(JointId::Head), 30.0);
    }

    #[test]
    fn test_cycle_joints() {
        assert_eq!(JointId::RightShin.next(), JointId::Hips);
        assert_eq!(JointId::Hips.prev(), JointId::RightShin);
        assert_eq!(JointId::Torso.next(), JointId::Neck);
    }
}
