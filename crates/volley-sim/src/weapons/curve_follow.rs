//! Curve-following attacker.
//!
//! Flies a library curve fitted from its position to the target, moving at
//! constant arc-length speed so progress through the duration maps directly
//! to distance along the path. The curve used by `impact_time` is held as
//! pending and reused by the following `attack`, so the prediction and the
//! flown path agree.

use std::sync::Arc;

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use volley_core::config::CurveFollowParams;
use volley_core::constants::CURVE_FOLLOW_TURN_RATE;
use volley_core::enums::{FinishReason, WeaponKind};
use volley_core::types::Pose;
use volley_curves::{CurveError, CurveLibrary, FittedCurve};

use super::{up_along, CompletionToken, StrikeClock, StrikeStep, Weapon};

#[derive(Debug)]
pub struct CurveFollowWeapon {
    params: CurveFollowParams,
    library: Arc<CurveLibrary>,
    rng: ChaCha8Rng,
    pose: Pose,
    clock: StrikeClock,
    /// Curve index drawn by `impact_time` and not yet flown.
    pending: Option<usize>,
    strike: Option<CurveStrike>,
}

#[derive(Debug)]
struct CurveStrike {
    /// `None` when no curve could be drawn; the strike ends on its first step.
    curve: Option<FittedCurve>,
    /// Arc length at which the strike stops early, if it overshoots.
    stop_at: Option<f32>,
}

impl CurveFollowWeapon {
    pub fn new(
        params: CurveFollowParams,
        library: Arc<CurveLibrary>,
        position: Vec3,
        seed: u64,
    ) -> Self {
        Self {
            params,
            library,
            rng: ChaCha8Rng::seed_from_u64(seed),
            pose: Pose::at(position),
            clock: StrikeClock::default(),
            pending: None,
            strike: None,
        }
    }

    /// Curve index for the next attack, drawing one if none is pending.
    fn pending_index(&mut self) -> Result<usize, CurveError> {
        match self.pending {
            Some(index) => Ok(index),
            None => {
                let index = self.library.random_index(&mut self.rng)?;
                self.pending = Some(index);
                Ok(index)
            }
        }
    }

    /// Fitted path of the current strike, if any.
    pub fn current_curve(&self) -> Option<&FittedCurve> {
        self.strike.as_ref().and_then(|s| s.curve.as_ref())
    }
}

impl Weapon for CurveFollowWeapon {
    fn kind(&self) -> WeaponKind {
        WeaponKind::CurveFollow
    }

    fn position(&self) -> Vec3 {
        self.pose.position
    }

    fn reach(&self) -> f32 {
        self.params.reach
    }

    fn attack(&mut self, duration: f32, target: Vec3) -> CompletionToken {
        let token = self.clock.start(duration);

        let curve = match self.pending_index() {
            Ok(index) => {
                self.pending = None;
                self.library
                    .fitted_curve(index, self.pose.position, target)
                    .ok()
            }
            Err(err) => {
                tracing::warn!(
                    target: "volley::weapons",
                    error = %err,
                    "curve_follow.no_curve"
                );
                None
            }
        };

        let stop_at = curve.as_ref().and_then(|fitted| {
            let overshoot = fitted.end().distance(target) - self.params.max_attack_distance;
            (overshoot > 0.0).then(|| fitted.total_arc_length - overshoot)
        });

        self.strike = Some(CurveStrike { curve, stop_at });
        token
    }

    fn impact_time(&mut self, duration: f32, target: Vec3) -> f32 {
        let index = match self.pending_index() {
            Ok(index) => index,
            Err(_) => return 0.0,
        };
        let record = match self.library.curve(index) {
            Ok(record) => record,
            Err(_) => return 0.0,
        };
        let scale = self.pose.position.distance(target) / record.distance_to_contact;
        record.impact_time(duration, scale, self.params.contact_offset)
    }

    fn advance(&mut self, dt: f32) -> StrikeStep {
        let Some(strike) = self.strike.as_ref() else {
            return StrikeStep::Idle;
        };
        let Some(curve) = strike.curve.as_ref() else {
            self.strike = None;
            return StrikeStep::Finished(FinishReason::EarlyExit);
        };

        self.clock.tick(dt);
        let distance = self.clock.progress() * curve.total_arc_length;

        if let Some(stop_at) = strike.stop_at {
            if distance >= stop_at {
                let (position, _) = curve.at_distance(stop_at);
                self.pose.position = position;
                self.strike = None;
                return StrikeStep::Finished(FinishReason::EarlyExit);
            }
        }

        if self.clock.expired() {
            self.pose.position = curve.end();
            self.strike = None;
            return StrikeStep::Finished(FinishReason::Natural);
        }

        let (position, tangent) = curve.at_distance(distance);
        self.pose.position = position;
        self.pose.orientation = self
            .pose
            .orientation
            .slerp(up_along(tangent), CURVE_FOLLOW_TURN_RATE);
        StrikeStep::Moving
    }

    fn cancel(&mut self) {
        self.strike = None;
    }

    fn pose(&self) -> Pose {
        self.pose
    }

    fn reposition(&mut self, pose: Pose) {
        self.strike = None;
        self.pose = pose;
    }
}
