//! Swing-arc attacker.
//!
//! The first quarter of the strike closes linearly to `attack_range` from
//! the target. The remainder sweeps the blade through `arc_degrees` about a
//! swing axis taken from the keyframe set, eased in and out with
//! smoothstep. The blade starts `arc × contact_fraction` short of the target
//! direction, so contact lands where the eased sweep reaches
//! `contact_fraction`.

use std::sync::Arc;

use glam::{Quat, Vec3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use volley_core::config::SwingArcParams;
use volley_core::constants::{GEOMETRY_EPSILON, SWING_ORIENT_FRACTION};
use volley_core::enums::{FinishReason, WeaponKind};
use volley_core::types::Pose;
use volley_curves::SwingKeyframeSet;

use super::{up_along, CompletionToken, StrikeClock, StrikeStep, Weapon};

#[derive(Debug)]
pub struct SwingArcWeapon {
    params: SwingArcParams,
    keyframes: Arc<SwingKeyframeSet>,
    rng: ChaCha8Rng,
    pose: Pose,
    clock: StrikeClock,
    swing: Option<Swing>,
}

#[derive(Debug, Clone, Copy)]
struct Swing {
    from: Vec3,
    start_orientation: Quat,
    /// Where the orient phase ends, `attack_range` short of the target.
    anchor: Vec3,
    /// Unit direction from the anchor to the target.
    aim: Vec3,
    /// World-space swing axis, perpendicular to `aim`.
    axis: Vec3,
}

impl SwingArcWeapon {
    pub fn new(
        params: SwingArcParams,
        keyframes: Arc<SwingKeyframeSet>,
        position: Vec3,
        seed: u64,
    ) -> Self {
        Self {
            params,
            keyframes,
            rng: ChaCha8Rng::seed_from_u64(seed),
            pose: Pose::at(position),
            clock: StrikeClock::default(),
            swing: None,
        }
    }

    /// Swing axis for an attack along `aim`: a random keyframe axis expressed
    /// relative to the aim direction, falling back to the plane normal.
    fn swing_axis(&mut self, aim: Vec3) -> Vec3 {
        let base = Quat::from_rotation_arc(Vec3::Z, aim);
        let candidate = match self.keyframes.random(&mut self.rng) {
            Some(keyframe) => base * keyframe.local_swing_axis,
            None => self.keyframes.plane_normal,
        };
        perpendicular_to(candidate, aim)
            .or_else(|| perpendicular_to(Vec3::Y, aim))
            .unwrap_or_else(|| aim.any_orthonormal_vector())
    }

    /// Blade angle (radians) relative to the aim direction at swing
    /// fraction `t`.
    fn blade_angle(&self, t: f32) -> f32 {
        let arc = self.params.arc_degrees.to_radians();
        arc * (t - self.params.contact_fraction)
    }
}

/// Ease-in-out over [0, 1].
pub(crate) fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// The `t` in [0, 1] with `smoothstep(t) == y`.
pub(crate) fn inverse_smoothstep(y: f32) -> f32 {
    let y = y.clamp(0.0, 1.0);
    0.5 - ((1.0 - 2.0 * y).asin() / 3.0).sin()
}

/// Component of `v` perpendicular to the unit vector `n`, normalized.
fn perpendicular_to(v: Vec3, n: Vec3) -> Option<Vec3> {
    let projected = v - n * v.dot(n);
    (projected.length() > GEOMETRY_EPSILON).then(|| projected.normalize())
}

impl Weapon for SwingArcWeapon {
    fn kind(&self) -> WeaponKind {
        WeaponKind::SwingArc
    }

    fn position(&self) -> Vec3 {
        self.pose.position
    }

    fn reach(&self) -> f32 {
        self.params.reach
    }

    fn attack(&mut self, duration: f32, target: Vec3) -> CompletionToken {
        let token = self.clock.start(duration);
        let from = self.pose.position;
        let to_target = target - from;
        let aim = to_target.try_normalize().unwrap_or(Vec3::X);
        let approach = (to_target.length() - self.params.attack_range).max(0.0);

        let axis = self.swing_axis(aim);
        self.swing = Some(Swing {
            from,
            start_orientation: self.pose.orientation,
            anchor: from + aim * approach,
            aim,
            axis,
        });
        token
    }

    fn impact_time(&mut self, duration: f32, _target: Vec3) -> f32 {
        let orient = duration * SWING_ORIENT_FRACTION;
        orient + (duration - orient) * inverse_smoothstep(self.params.contact_fraction)
    }

    fn advance(&mut self, dt: f32) -> StrikeStep {
        let Some(swing) = self.swing else {
            return StrikeStep::Idle;
        };

        self.clock.tick(dt);
        let progress = self.clock.progress();

        if progress < SWING_ORIENT_FRACTION {
            let t = progress / SWING_ORIENT_FRACTION;
            self.pose.position = swing.from.lerp(swing.anchor, t);
            self.pose.orientation = swing.start_orientation.slerp(up_along(swing.aim), t);
        } else {
            let t = (progress - SWING_ORIENT_FRACTION) / (1.0 - SWING_ORIENT_FRACTION);
            let eased = smoothstep(t);
            let blade = Quat::from_axis_angle(swing.axis, self.blade_angle(eased)) * swing.aim;
            self.pose.position = swing.anchor;
            self.pose.orientation = up_along(blade);
        }

        if self.clock.expired() {
            self.swing = None;
            return StrikeStep::Finished(FinishReason::Natural);
        }
        StrikeStep::Moving
    }

    fn cancel(&mut self) {
        self.swing = None;
    }

    fn pose(&self) -> Pose {
        self.pose
    }

    fn reposition(&mut self, pose: Pose) {
        self.swing = None;
        self.pose = pose;
    }
}
