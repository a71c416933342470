//! Velocity-driven attacker: flies straight at its aim point at a constant
//! approach speed, stopping once within `stopping_distance`.

use glam::Vec3;

use volley_core::config::VelocityDrivenParams;
use volley_core::constants::GEOMETRY_EPSILON;
use volley_core::enums::{FinishReason, WeaponKind};
use volley_core::types::Pose;

use super::{up_along, CompletionToken, StrikeClock, StrikeStep, Weapon};

#[derive(Debug)]
pub struct VelocityDrivenWeapon {
    params: VelocityDrivenParams,
    pose: Pose,
    clock: StrikeClock,
    aim: Option<Vec3>,
}

impl VelocityDrivenWeapon {
    pub fn new(params: VelocityDrivenParams, position: Vec3) -> Self {
        Self {
            params,
            pose: Pose::at(position),
            clock: StrikeClock::default(),
            aim: None,
        }
    }
}

impl Weapon for VelocityDrivenWeapon {
    fn kind(&self) -> WeaponKind {
        WeaponKind::VelocityDriven
    }

    fn position(&self) -> Vec3 {
        self.pose.position
    }

    fn reach(&self) -> f32 {
        self.params.reach
    }

    fn attack(&mut self, duration: f32, target: Vec3) -> CompletionToken {
        let token = self.clock.start(duration);
        self.pose.orientation = up_along(target - self.pose.position);
        self.aim = Some(target);
        token
    }

    fn impact_time(&mut self, duration: f32, target: Vec3) -> f32 {
        let gap = self.pose.position.distance(target) - self.params.stopping_distance;
        (gap / self.params.approach_speed).clamp(0.0, duration)
    }

    fn advance(&mut self, dt: f32) -> StrikeStep {
        let Some(aim) = self.aim else {
            return StrikeStep::Idle;
        };

        self.clock.tick(dt);

        let to_aim = aim - self.pose.position;
        let distance = to_aim.length();
        let gap = distance - self.params.stopping_distance;
        let arrived = if gap > GEOMETRY_EPSILON {
            let step = (self.params.approach_speed * dt).min(gap);
            self.pose.position += to_aim / distance * step;
            gap - step <= GEOMETRY_EPSILON
        } else {
            true
        };

        if arrived {
            self.aim = None;
            return StrikeStep::Finished(FinishReason::EarlyExit);
        }
        if self.clock.expired() {
            self.aim = None;
            return StrikeStep::Finished(FinishReason::Natural);
        }
        StrikeStep::Moving
    }

    fn cancel(&mut self) {
        self.aim = None;
    }

    fn pose(&self) -> Pose {
        self.pose
    }

    fn reposition(&mut self, pose: Pose) {
        self.aim = None;
        self.pose = pose;
    }
}
