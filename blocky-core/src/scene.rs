/// Per-frame walk of the joint hierarchy into a flat instance list
use std::sync::Arc;

use crate::geometry::{Geometry, GeometryFactory};
use crate::joint::{blocky_animal, JointAngles, JointDef, JointId};
use crate::primitive::{Placement, PrimitiveInstance, PrimitiveKind};
use crate::transform::AffineTransform;

/// Output of one hierarchy walk.
#[derive(Debug, Clone)]
pub struct BuiltScene {
    /// One cube per joint, in walk order.
    pub instances: Vec<PrimitiveInstance>,
    /// Joint frames at the branch point, indexed by `JointId::index`.
    pub resolved: [AffineTransform; JointId::COUNT],
}

impl BuiltScene {
    pub fn resolved(&self, joint: JointId) -> &AffineTransform {
        &self.resolved[joint.index()]
    }
}

/// Rebuilds the whole model from the current pose on every call.
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    joints: [JointDef; JointId::COUNT],
    cube: Arc<Geometry>,
}

impl SceneBuilder {
    pub fn new(factory: &mut GeometryFactory) -> Self {
        Self::with_joints(factory, blocky_animal())
    }

    pub fn with_joints(factory: &mut GeometryFactory, joints: [JointDef; JointId::COUNT]) -> Self {
        Self {
            joints,
            cube: factory.cube(),
        }
    }

    pub fn joints(&self) -> &[JointDef] {
        &self.joints
    }

    pub fn joint(&self, id: JointId) -> &JointDef {
        &self.joints[id.index()]
    }

    pub fn rest_pose(&self) -> JointAngles {
        JointAngles::rest(&self.joints)
    }

    /// Resolve every joint top-down.
    ///
    /// A joint's frame is saved before its cube-only offset and scale are
    /// applied, and children branch from that saved frame.
    pub fn build(&self, angles: &JointAngles) -> BuiltScene {
        let mut resolved = [AffineTransform::identity(); JointId::COUNT];
        let mut instances = Vec::with_capacity(JointId::COUNT);

        for def in &self.joints {
            let mut local = match def.parent() {
                Some(parent) => resolved[parent.index()].copy(),
                None => AffineTransform::identity(),
            };
            local
                .translate(def.offset.x, def.offset.y, def.offset.z)
                .rotate(angles.get(def.id), def.axis.x, def.axis.y, def.axis.z)
                .scale(def.scale.x, def.scale.y, def.scale.z);

            resolved[def.id.index()] = local.copy();

            let mut cube = local;
            cube.translate(def.cube_offset.x, def.cube_offset.y, def.cube_offset.z)
                .scale(def.cube_scale.x, def.cube_scale.y, def.cube_scale.z);

            instances.push(PrimitiveInstance::new(
                PrimitiveKind::Cube,
                self.cube.clone(),
                def.color,
                Placement::World(cube),
            ));
        }

        BuiltScene {
            instances,
            resolved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};

    fn builder() -> SceneBuilder {
        SceneBuilder::new(&mut GeometryFactory::new())
    }

    fn pivot(scene: &BuiltScene, joint: JointId) -> Point3<f32> {
        scene.resolved(joint).transform_point(&Point3::origin())
    }

    #[test]
    fn test_one_cube_per_joint() {
        let builder = builder();
        let scene = builder.build(&builder.rest_pose());
        assert_eq!(scene.instances.len(), JointId::COUNT);
        for (instance, def) in scene.instances.iter().zip(builder.joints()) {
            assert_eq!(instance.kind(), PrimitiveKind::Cube);
            assert_eq!(instance.color(), def.color);
            assert_eq!(instance.geometry().vertex_count(), 36);
        }
    }

    #[test]
    fn test_child_copy_leaves_parent_untouched() {
        let builder = builder();
        let scene = builder.build(&builder.rest_pose());

        for joint in JointId::ALL {
            let Some(parent) = joint.parent() else {
                continue;
            };
            let before = scene.resolved(parent).elements();
            let def = builder.joint(joint);

            let mut child = scene.resolved(parent).copy();
            child
                .translate(def.offset.x, def.offset.y, def.offset.z)
                .rotate(45.0, def.axis.x, def.axis.y, def.axis.z)
                .scale(2.0, 2.0, 2.0);

            assert_eq!(scene.resolved(parent).elements(), before);
        }
    }

    #[test]
    fn test_siblings_do_not_alias() {
        let builder = builder();
        let rest = builder.build(&builder.rest_pose());

        let mut pose = builder.rest_pose();
        pose.set(JointId::LeftUpperArm, 70.0);
        let moved = builder.build(&pose);

        assert_ne!(
            moved.resolved(JointId::LeftForearm),
            rest.resolved(JointId::LeftForearm)
        );
        for joint in [
            JointId::Torso,
            JointId::Neck,
            JointId::Head,
            JointId::RightUpperArm,
            JointId::RightForearm,
        ] {
            assert_eq!(moved.resolved(joint), rest.resolved(joint), "{}", joint.name());
        }
    }

    #[test]
    fn test_children_branch_before_cube_scale() {
        let mut factory = GeometryFactory::new();
        let mut joints = blocky_animal();
        let base = SceneBuilder::with_joints(&mut factory, joints);

        joints[JointId::Torso.index()].cube_scale = Vector3::new(3.0, 5.0, 0.5);
        joints[JointId::Torso.index()].cube_offset = Vector3::new(1.0, 1.0, 1.0);
        let stretched = SceneBuilder::with_joints(&mut factory, joints);

        let a = base.build(&base.rest_pose());
        let b = stretched.build(&stretched.rest_pose());
        assert_eq!(a.resolved(JointId::Head), b.resolved(JointId::Head));
        assert_ne!(
            a.instances[JointId::Torso.index()].model_transform(),
            b.instances[JointId::Torso.index()].model_transform()
        );
    }

    #[test]
    fn test_pivot_positions_accumulate() {
        let builder = builder();
        let mut pose = JointAngles::zeroed();
        let scene = builder.build(&pose);

        // hips (0,-0.15) + torso (0,0.1) + neck (0,0.45) + head (0,0.08)
        let head = pivot(&scene, JointId::Head);
        assert!((head.y - 0.48).abs() < 1e-5);
        assert!(head.x.abs() < 1e-6);

        // Bending the torso 90 degrees about z swings the head onto -x.
        pose.set(JointId::Torso, 90.0);
        let bent = builder.build(&pose);
        let head = pivot(&bent, JointId::Head);
        assert!((head.x + 0.53).abs() < 1e-5);
        assert!((head.y + 0.05).abs() < 1e-5);
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let builder = builder();
        let pose = builder.rest_pose();
        let a = builder.build(&pose);
        let b = builder.build(&pose);
        assert_eq!(a.resolved, b.resolved);
        for (x, y) in a.instances.iter().zip(&b.instances) {
            assert_eq!(x.model_transform(), y.model_transform());
        }
    }
}
