/// Session state shared by the UI setters, the stroke list and the 3D model
use nalgebra::Point2;
use tracing::{debug, info};

use crate::animation::{AnimationDriver, AnimationGroup};
use crate::color::Rgba;
use crate::config::SessionConfig;
use crate::geometry::{GeometryFactory, MAX_CIRCLE_SEGMENTS, MIN_CIRCLE_SEGMENTS};
use crate::joint::{JointAngles, JointId};
use crate::preset;
use crate::primitive::{MarkKind, PrimitiveInstance};
use crate::projection::Viewport;
use crate::scene::{BuiltScene, SceneBuilder};
use crate::stroke::StrokeList;
use crate::transform::AffineTransform;

/// Smallest mark size accepted from the UI.
pub const MIN_MARK_SIZE: f32 = 1.0;

/// What the next placed mark looks like. Read at placement time only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub kind: MarkKind,
    pub color: Rgba,
    pub size: f32,
    pub segments: u32,
}

impl Selection {
    fn from_config(config: &SessionConfig) -> Self {
        let mut selection = Self {
            kind: config.kind,
            color: config.color.clamped(),
            size: MIN_MARK_SIZE,
            segments: MIN_CIRCLE_SEGMENTS,
        };
        selection.set_size(config.size);
        selection.set_segments(config.segments);
        selection
    }

    fn set_size(&mut self, size: f32) {
        if size.is_finite() {
            self.size = size.max(MIN_MARK_SIZE);
        }
    }

    fn set_segments(&mut self, segments: u32) {
        self.segments = segments.clamp(MIN_CIRCLE_SEGMENTS, MAX_CIRCLE_SEGMENTS);
    }
}

/// Everything a UI host mutates, plus the engine objects that read it.
#[derive(Debug)]
pub struct Session {
    viewport: Viewport,
    selection: Selection,
    strokes: StrokeList,
    builder: SceneBuilder,
    pose: JointAngles,
    driver: AnimationDriver,
    global_rotation: f32,
    clear_color: Rgba,
}

impl Session {
    pub fn new(config: &SessionConfig, viewport: Viewport) -> Self {
        let builder = SceneBuilder::new(&mut GeometryFactory::new());
        let pose = builder.rest_pose();
        let mut driver = AnimationDriver::walk_cycle();
        for group in &config.animate {
            driver.set_enabled(*group, true);
        }

        let mut session = Self {
            viewport,
            selection: Selection::from_config(config),
            strokes: StrokeList::new(),
            builder,
            pose,
            driver,
            global_rotation: 0.0,
            clear_color: config.clear_color,
        };
        session.set_global_rotation(config.global_rotation);
        info!(
            width = viewport.width,
            height = viewport.height,
            "session started"
        );
        session
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn clear_color(&self) -> Rgba {
        self.clear_color
    }

    // UI setters. Out-of-range values are clamped, never rejected.

    pub fn set_selected_color(&mut self, color: Rgba) {
        self.selection.color = color.clamped();
    }

    pub fn set_selected_size(&mut self, size: f32) {
        self.selection.set_size(size);
    }

    pub fn set_selected_segments(&mut self, segments: u32) {
        self.selection.set_segments(segments);
    }

    pub fn set_selected_kind(&mut self, kind: MarkKind) {
        self.selection.kind = kind;
    }

    /// Manual angle for a joint. A running animation group overwrites it on
    /// its next tick.
    pub fn set_joint_angle(&mut self, joint: JointId, degrees: f32) {
        self.pose.set(joint, degrees);
    }

    pub fn joint_angle(&self, joint: JointId) -> f32 {
        self.pose.get(joint)
    }

    pub fn set_animation_enabled(&mut self, group: AnimationGroup, enabled: bool) {
        self.driver.set_enabled(group, enabled);
    }

    pub fn animation_enabled(&self, group: AnimationGroup) -> bool {
        self.driver.is_enabled(group)
    }

    pub fn set_global_rotation(&mut self, degrees: f32) {
        if degrees.is_finite() {
            self.global_rotation = degrees % 360.0;
        }
    }

    pub fn global_rotation(&self) -> f32 {
        self.global_rotation
    }

    pub fn global_transform(&self) -> AffineTransform {
        let mut global = AffineTransform::identity();
        global.rotate(self.global_rotation, 0.0, 1.0, 0.0);
        global
    }

    pub fn reset_pose(&mut self) {
        self.pose = self.builder.rest_pose();
    }

    // 2D actions.

    /// Place a mark at a canvas pixel using the current selection.
    pub fn place_mark_at(&mut self, x: f32, y: f32) -> &PrimitiveInstance {
        let position = self.viewport.screen_to_ndc(x, y);
        self.place_mark(position)
    }

    /// Place a mark at a device-space position using the current selection.
    pub fn place_mark(&mut self, position: Point2<f32>) -> &PrimitiveInstance {
        let Selection {
            kind,
            color,
            size,
            segments,
        } = self.selection;
        debug!(?kind, x = position.x, y = position.y, "mark placed");
        self.strokes.place(kind, position, color, size, segments)
    }

    pub fn undo(&mut self) {
        self.strokes.undo();
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn load_preset_scene(&mut self) {
        let placed = preset::load_freighter(&mut self.strokes);
        info!(placed, "preset drawing loaded");
    }

    pub fn marks(&self) -> &[PrimitiveInstance] {
        self.strokes.all_instances()
    }

    // 3D frame.

    /// Advance running animation groups to `elapsed` seconds, then rebuild
    /// the model from the current pose.
    pub fn build_model(&mut self, elapsed: f32) -> BuiltScene {
        self.driver.tick(elapsed, &mut self.pose);
        self.builder.build(&self.pose)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&SessionConfig::default(), Viewport::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::PrimitiveKind;
    use crate::render::tests::RecordingRasterizer;
    use crate::render::{FrameRenderer, FrameReport};

    #[test]
    fn test_place_mark_at_center() {
        let mut session = Session::new(&SessionConfig::default(), Viewport::new(400, 400));
        session.set_selected_kind(MarkKind::Point);
        session.set_selected_color(Rgba::new(1.0, 0.0, 0.0, 1.0));
        session.set_selected_size(5.0);
        session.place_mark_at(200.0, 200.0);

        let marks = session.marks();
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].kind(), PrimitiveKind::Point);
        assert_eq!(marks[0].position(), Some(Point2::new(0.0, 0.0)));
        assert_eq!(marks[0].color(), Rgba::RED);
    }

    #[test]
    fn test_selection_changes_are_not_retroactive() {
        let mut session = Session::default();
        session.set_selected_color(Rgba::GREEN);
        session.place_mark(Point2::new(0.1, 0.1));
        session.set_selected_color(Rgba::BLUE);
        session.set_selected_size(40.0);

        let mark = &session.marks()[0];
        assert_eq!(mark.color(), Rgba::GREEN);
        assert_eq!(mark.size(), Some(5.0));
    }

    #[test]
    fn test_invalid_parameters_are_clamped() {
        let mut session = Session::default();
        session.set_selected_segments(1);
        session.set_selected_size(-4.0);
        session.set_selected_size(f32::NAN);
        assert_eq!(session.selection().segments, 3);
        assert_eq!(session.selection().size, MIN_MARK_SIZE);

        session.set_selected_kind(MarkKind::Circle);
        let mark = session.place_mark(Point2::origin());
        assert_eq!(mark.kind(), PrimitiveKind::Circle { segments: 3 });
    }

    #[test]
    fn test_literal_color_is_clamped_on_select() {
        let mut session = Session::default();
        session.set_selected_color(Rgba {
            r: 2.5,
            g: -1.0,
            b: 0.5,
            a: f32::NAN,
        });
        let mark = session.place_mark(Point2::origin());
        assert_eq!(mark.color().to_array(), [1.0, 0.0, 0.5, 0.0]);
    }

    #[test]
    fn test_segment_count_is_capped() {
        let mut session = Session::default();
        session.set_selected_segments(u32::MAX);
        assert_eq!(session.selection().segments, MAX_CIRCLE_SEGMENTS);

        session.set_selected_kind(MarkKind::Circle);
        let mark = session.place_mark(Point2::origin());
        assert_eq!(
            mark.kind(),
            PrimitiveKind::Circle {
                segments: MAX_CIRCLE_SEGMENTS
            }
        );
        assert_eq!(
            mark.geometry().vertex_count(),
            3 * MAX_CIRCLE_SEGMENTS as usize
        );
    }

    #[test]
    fn test_undo_and_clear() {
        let mut session = Session::default();
        session.undo();
        assert!(session.marks().is_empty());

        session.place_mark(Point2::origin());
        session.place_mark(Point2::new(0.5, 0.5));
        session.undo();
        assert_eq!(session.marks().len(), 1);
        session.clear();
        assert!(session.marks().is_empty());
    }

    #[test]
    fn test_preset_then_redraw() {
        let mut session = Session::default();
        session.load_preset_scene();
        let count = session.marks().len();
        assert!(count > 0);

        let mut raster = RecordingRasterizer::default();
        let report = FrameRenderer::flat().render_frame(
            &mut raster,
            session.marks(),
            &AffineTransform::identity(),
        );
        assert_eq!(report, FrameReport { submitted: count, skipped: 0 });
    }

    #[test]
    fn test_manual_angle_survives_when_stopped() {
        let mut session = Session::default();
        session.set_joint_angle(JointId::Head, 25.0);
        let scene = session.build_model(3.0);
        assert_eq!(session.joint_angle(JointId::Head), 25.0);
        assert_eq!(scene.instances.len(), JointId::COUNT);
    }

    #[test]
    fn test_animation_overrides_then_freezes() {
        let mut session = Session::default();
        session.set_joint_angle(JointId::Head, 25.0);
        session.set_animation_enabled(AnimationGroup::Limbs, true);
        session.build_model(1.0);
        let animated = session.joint_angle(JointId::Head);
        assert_ne!(animated, 25.0);

        session.set_animation_enabled(AnimationGroup::Limbs, false);
        session.build_model(9.0);
        assert_eq!(session.joint_angle(JointId::Head), animated);

        session.reset_pose();
        assert_eq!(session.joint_angle(JointId::Head), 0.0);
    }

    #[test]
    fn test_config_starts_animation() {
        let config = SessionConfig {
            animate: vec![AnimationGroup::Torso],
            global_rotation: 370.0,
            ..SessionConfig::default()
        };
        let session = Session::new(&config, Viewport::default());
        assert!(session.animation_enabled(AnimationGroup::Torso));
        assert!(!session.animation_enabled(AnimationGroup::Limbs));
        assert!((session.global_rotation() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_global_rotation_spins_about_y() {
        let mut session = Session::default();
        session.set_global_rotation(90.0);
        let p = session
            .global_transform()
            .transform_point(&nalgebra::Point3::new(1.0, 0.5, 0.0));
        assert!(p.x.abs() < 1e-6);
        assert!((p.y - 0.5).abs() < 1e-6);
        assert!((p.z + 1.0).abs() < 1e-6);
    }
}
