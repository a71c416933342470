//! Attacker movement styles.
//!
//! Every attacker implements [`Weapon`]. An attack is owned state advanced
//! once per tick by the attack handle; `advance` reports `Finished` exactly
//! once per attack, after which the weapon is idle until the next `attack`.

pub mod curve_follow;
pub mod swing_arc;
pub mod velocity_driven;

use std::fmt;
use std::sync::Arc;

use glam::{Quat, Vec3};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use volley_core::config::WeaponTemplate;
use volley_core::enums::{FinishReason, WeaponKind};
use volley_core::types::Pose;
use volley_curves::{CurveLibrary, SwingKeyframeSet};

pub use curve_follow::CurveFollowWeapon;
pub use swing_arc::SwingArcWeapon;
pub use velocity_driven::VelocityDrivenWeapon;

/// Identifies one attack. Unique per weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionToken(pub u64);

/// Result of advancing a weapon by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeStep {
    /// No attack in progress.
    Idle,
    /// The attack is still in flight.
    Moving,
    /// The attack ended during this step.
    Finished(FinishReason),
}

/// Capability every attacker exposes to the scheduler.
pub trait Weapon: fmt::Debug + Send {
    fn kind(&self) -> WeaponKind;

    /// Current position in the swarm frame.
    fn position(&self) -> Vec3;

    /// Farthest aim point this weapon accepts from a lead prediction.
    fn reach(&self) -> f32;

    /// Begin an attack on `target` lasting `duration` seconds.
    fn attack(&mut self, duration: f32, target: Vec3) -> CompletionToken;

    /// Seconds from launch until the weapon reaches `target`, for an attack
    /// of `duration` seconds started now.
    fn impact_time(&mut self, duration: f32, target: Vec3) -> f32;

    /// Advance the in-flight attack by `dt` seconds.
    fn advance(&mut self, dt: f32) -> StrikeStep;

    /// Stop the in-flight attack where it is. Never produces `Finished`.
    fn cancel(&mut self);

    fn pose(&self) -> Pose;

    /// Move the weapon to `pose`, dropping any attack in progress.
    fn reposition(&mut self, pose: Pose);
}

/// Elapsed-time bookkeeping shared by the weapon implementations.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StrikeClock {
    pub duration: f32,
    pub elapsed: f32,
    next_token: u64,
}

impl StrikeClock {
    /// Reset the clock for a new attack and mint its token.
    pub fn start(&mut self, duration: f32) -> CompletionToken {
        self.duration = duration.max(0.0);
        self.elapsed = 0.0;
        self.next_token += 1;
        CompletionToken(self.next_token)
    }

    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    /// Fraction of the duration elapsed, in [0, 1].
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }

    pub fn expired(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Orientation whose local +Y points along `direction`.
pub(crate) fn up_along(direction: Vec3) -> Quat {
    match direction.try_normalize() {
        Some(dir) => Quat::from_rotation_arc(Vec3::Y, dir),
        None => Quat::IDENTITY,
    }
}

/// Instantiate a weapon from its template. Each weapon gets its own RNG
/// stream derived from `rng`.
pub fn build_weapon(
    template: &WeaponTemplate,
    position: Vec3,
    library: &Arc<CurveLibrary>,
    keyframes: &Arc<SwingKeyframeSet>,
    rng: &mut ChaCha8Rng,
) -> Box<dyn Weapon> {
    let seed: u64 = rng.gen();
    match template {
        WeaponTemplate::CurveFollow(params) => Box::new(CurveFollowWeapon::new(
            params.clone(),
            Arc::clone(library),
            position,
            seed,
        )),
        WeaponTemplate::SwingArc(params) => Box::new(SwingArcWeapon::new(
            params.clone(),
            Arc::clone(keyframes),
            position,
            seed,
        )),
        WeaponTemplate::VelocityDriven(params) => {
            Box::new(VelocityDrivenWeapon::new(params.clone(), position))
        }
    }
}
