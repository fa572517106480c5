/// Time-driven joint angles for the animated model
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use tracing::info;

use crate::joint::{JointAngles, JointId};

/// Independently toggleable sets of animated joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationGroup {
    Torso,
    /// Head and all four limbs.
    Limbs,
}

impl AnimationGroup {
    pub const ALL: [AnimationGroup; 2] = [Self::Torso, Self::Limbs];
}

/// `angle(t) = center + amplitude * sin(frequency * t + phase)`, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointWave {
    pub joint: JointId,
    pub amplitude: f32,
    pub frequency: f32,
    pub phase: f32,
    pub center: f32,
}

impl JointWave {
    pub fn new(joint: JointId, amplitude: f32, frequency: f32, phase: f32) -> Self {
        Self {
            joint,
            amplitude,
            frequency,
            phase,
            center: 0.0,
        }
    }

    pub fn centered_at(mut self, center: f32) -> Self {
        self.center = center;
        self
    }

    pub fn angle_at(&self, t: f32) -> f32 {
        self.center + self.amplitude * (self.frequency * t + self.phase).sin()
    }
}

#[derive(Debug, Clone)]
struct Track {
    group: AnimationGroup,
    enabled: bool,
    waves: Vec<JointWave>,
}

/// Overwrites the angles of every running group on each tick.
///
/// `t` is seconds since the driver started, supplied by the host clock.
/// A stopped group leaves its joints at whatever value they last had.
#[derive(Debug, Clone, Default)]
pub struct AnimationDriver {
    tracks: Vec<Track>,
}

impl AnimationDriver {
    /// Driver with no groups; add them with `with_group`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Walk cycle for the blocky animal, all groups stopped.
    pub fn walk_cycle() -> Self {
        use JointId::*;

        Self::empty()
            .with_group(
                AnimationGroup::Torso,
                vec![
                    JointWave::new(Torso, 6.0, 2.0, 0.0),
                    JointWave::new(Hips, 8.0, 1.0, 0.0),
                ],
            )
            .with_group(
                AnimationGroup::Limbs,
                vec![
                    JointWave::new(Head, 15.0, 2.0, 0.5),
                    JointWave::new(LeftUpperArm, 40.0, 3.0, 0.0).centered_at(-10.0),
                    JointWave::new(RightUpperArm, 40.0, 3.0, PI).centered_at(10.0),
                    JointWave::new(LeftForearm, 20.0, 3.0, 0.5).centered_at(-20.0),
                    JointWave::new(RightForearm, 20.0, 3.0, PI + 0.5).centered_at(20.0),
                    JointWave::new(LeftThigh, 30.0, 3.0, PI),
                    JointWave::new(RightThigh, 30.0, 3.0, 0.0),
                    JointWave::new(LeftShin, 15.0, 3.0, PI + 0.5).centered_at(15.0),
                    JointWave::new(RightShin, 15.0, 3.0, 0.5).centered_at(15.0),
                ],
            )
    }

    /// Register (or replace) the waves of a group. New groups start stopped.
    pub fn with_group(mut self, group: AnimationGroup, waves: Vec<JointWave>) -> Self {
        match self.tracks.iter_mut().find(|t| t.group == group) {
            Some(track) => track.waves = waves,
            None => self.tracks.push(Track {
                group,
                enabled: false,
                waves,
            }),
        }
        self
    }

    pub fn set_enabled(&mut self, group: AnimationGroup, enabled: bool) {
        if let Some(track) = self.tracks.iter_mut().find(|t| t.group == group) {
            if track.enabled != enabled {
                info!(?group, enabled, "animation toggled");
            }
            track.enabled = enabled;
        }
    }

    pub fn is_enabled(&self, group: AnimationGroup) -> bool {
        self.tracks
            .iter()
            .any(|t| t.group == group && t.enabled)
    }

    pub fn any_enabled(&self) -> bool {
        self.tracks.iter().any(|t| t.enabled)
    }

    /// Whether a running group currently owns this joint's angle.
    pub fn drives(&self, joint: JointId) -> bool {
        self.tracks
            .iter()
            .filter(|t| t.enabled)
            .any(|t| t.waves.iter().any(|w| w.joint == joint))
    }

    /// Recompute every running joint at time `t`. Returns how many joint
    /// angles were written.
    pub fn tick(&self, t: f32, angles: &mut JointAngles) -> usize {
        let mut written = 0;
        for track in self.tracks.iter().filter(|track| track.enabled) {
            for wave in &track.waves {
                angles.set(wave.joint, wave.angle_at(t));
                written += 1;
            }
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    fn single_wave() -> AnimationDriver {
        AnimationDriver::empty().with_group(
            AnimationGroup::Torso,
            vec![JointWave::new(JointId::Torso, 10.0, 2.0, 0.0)],
        )
    }

    #[test]
    fn test_sine_wave_values() {
        let mut driver = single_wave();
        driver.set_enabled(AnimationGroup::Torso, true);

        let mut angles = JointAngles::zeroed();
        driver.tick(0.0, &mut angles);
        assert!(angles.get(JointId::Torso).abs() < 1e-6);

        driver.tick(FRAC_PI_4, &mut angles);
        assert!((angles.get(JointId::Torso) - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_stopping_freezes_angle() {
        let mut driver = single_wave();
        driver.set_enabled(AnimationGroup::Torso, true);

        let mut angles = JointAngles::zeroed();
        driver.tick(FRAC_PI_4, &mut angles);
        driver.set_enabled(AnimationGroup::Torso, false);

        for t in [1.0, 2.5, 100.0] {
            assert_eq!(driver.tick(t, &mut angles), 0);
            assert!((angles.get(JointId::Torso) - 10.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_running_group_overwrites_manual_angle() {
        let mut driver = single_wave();
        driver.set_enabled(AnimationGroup::Torso, true);

        let mut angles = JointAngles::zeroed();
        angles.set(JointId::Torso, 75.0);
        driver.tick(0.0, &mut angles);
        assert!(angles.get(JointId::Torso).abs() < 1e-6);
    }

    #[test]
    fn test_groups_are_independent() {
        let mut driver = AnimationDriver::walk_cycle();
        driver.set_enabled(AnimationGroup::Limbs, true);
        assert!(driver.is_enabled(AnimationGroup::Limbs));
        assert!(!driver.is_enabled(AnimationGroup::Torso));
        assert!(driver.drives(JointId::Head));
        assert!(!driver.drives(JointId::Torso));

        let mut angles = JointAngles::zeroed();
        angles.set(JointId::Torso, 12.0);
        driver.tick(1.3, &mut angles);
        assert_eq!(angles.get(JointId::Torso), 12.0);
        assert_ne!(angles.get(JointId::LeftThigh), 0.0);
    }

    #[test]
    fn test_unknown_group_toggle_is_noop() {
        let mut driver = AnimationDriver::empty();
        driver.set_enabled(AnimationGroup::Limbs, true);
        assert!(!driver.any_enabled());
    }
}
