//! Configuration surface for the swarm: scheduler timing, pool composition,
//! target kinematics and per-variant weapon parameters.
//!
//! Every section is `#[serde(default)]`, so a JSON file only needs to list
//! the knobs it changes.

use std::path::{Path, PathBuf};
use std::{fs, io};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::enums::WeaponKind;

/// Top-level configuration for one swarm.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Fixed simulation rate (Hz).
    pub tick_rate: u32,
    /// Rotation of the swarm frame relative to world space.
    pub frame_rotation: Quat,
    pub scheduler: SchedulerConfig,
    pub pool: PoolConfig,
    pub target: TargetConfig,
}

/// Timing policy for the attack scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub max_concurrent_swings: usize,
    pub chance_for_concurrency: f32,
    pub chance_for_prediction: f32,
    /// Seconds between concurrency checks.
    pub concurrency_check_interval: f32,
    pub interval_min: f32,
    pub interval_max: f32,
    pub duration_min: f32,
    pub duration_max: f32,
    /// Speed at which waiting attackers out of reach close in on the target
    /// (m/s). Zero leaves waiting attackers where they are.
    pub approach_speed: f32,
}

/// Attacker pool composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Attackers built when `use_random_count` is false.
    pub attacker_count: usize,
    pub use_random_count: bool,
    /// Inclusive range for the random attacker count.
    pub min_count: usize,
    pub max_count: usize,
    /// Attackers are scattered inside a sphere of this radius.
    pub position_range: f32,
    /// Attacker templates, cycled when the count exceeds the template list.
    pub templates: Vec<WeaponTemplate>,
}

/// Initial target state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub start_position: Vec3,
    /// World-space velocity. `None` means no velocity source is attached.
    pub velocity: Option<Vec3>,
    /// The target is reflected back when it leaves this radius.
    pub arena_radius: f32,
}

/// One attacker template with its movement parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum WeaponTemplate {
    CurveFollow(CurveFollowParams),
    SwingArc(SwingArcParams),
    VelocityDriven(VelocityDrivenParams),
}

/// Parameters for a curve-following attacker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveFollowParams {
    /// Along-path distance between geometric contact and effective impact.
    pub contact_offset: f32,
    /// Strikes stop early once the path would carry this far past the target.
    pub max_attack_distance: f32,
    /// Predicted aim points farther than this are rejected.
    pub reach: f32,
}

/// Parameters for a swing-arc attacker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwingArcParams {
    /// Total sweep angle of the swing (degrees).
    pub arc_degrees: f32,
    /// Distance kept from the target at the end of the approach.
    pub attack_range: f32,
    /// Fraction of the swing elapsed when the blade crosses the target direction.
    pub contact_fraction: f32,
    pub reach: f32,
}

/// Parameters for a velocity-driven attacker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityDrivenParams {
    /// Constant approach speed (m/s).
    pub approach_speed: f32,
    /// The strike ends once the attacker is this close to its aim point.
    pub stopping_distance: f32,
    pub reach: f32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse swarm config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read swarm config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid swarm config: {0}")]
    Invalid(String),
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_rate: TICK_RATE,
            frame_rotation: Quat::IDENTITY,
            scheduler: SchedulerConfig::default(),
            pool: PoolConfig::default(),
            target: TargetConfig::default(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_swings: DEFAULT_MAX_CONCURRENT_SWINGS,
            chance_for_concurrency: DEFAULT_CHANCE_FOR_CONCURRENCY,
            chance_for_prediction: DEFAULT_CHANCE_FOR_PREDICTION,
            concurrency_check_interval: DEFAULT_CONCURRENCY_CHECK_INTERVAL,
            interval_min: DEFAULT_INTERVAL_MIN,
            interval_max: DEFAULT_INTERVAL_MAX,
            duration_min: DEFAULT_DURATION_MIN,
            duration_max: DEFAULT_DURATION_MAX,
            approach_speed: DEFAULT_APPROACH_SPEED,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            attacker_count: DEFAULT_ATTACKER_COUNT,
            use_random_count: false,
            min_count: DEFAULT_MIN_ATTACKERS,
            max_count: DEFAULT_MAX_ATTACKERS,
            position_range: DEFAULT_POSITION_RANGE,
            templates: vec![
                WeaponTemplate::CurveFollow(CurveFollowParams::default()),
                WeaponTemplate::SwingArc(SwingArcParams::default()),
                WeaponTemplate::VelocityDriven(VelocityDrivenParams::default()),
            ],
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            start_position: Vec3::ZERO,
            velocity: Some(Vec3::ZERO),
            arena_radius: DEFAULT_ARENA_RADIUS,
        }
    }
}

impl Default for CurveFollowParams {
    fn default() -> Self {
        Self {
            contact_offset: 0.0,
            max_attack_distance: 10.0,
            reach: 12.0,
        }
    }
}

impl Default for SwingArcParams {
    fn default() -> Self {
        Self {
            arc_degrees: 150.0,
            attack_range: 0.5,
            contact_fraction: 0.35,
            reach: 12.0,
        }
    }
}

impl Default for VelocityDrivenParams {
    fn default() -> Self {
        Self {
            approach_speed: 5.0,
            stopping_distance: 0.1,
            reach: 12.0,
        }
    }
}

impl WeaponTemplate {
    pub fn kind(&self) -> WeaponKind {
        match self {
            WeaponTemplate::CurveFollow(_) => WeaponKind::CurveFollow,
            WeaponTemplate::SwingArc(_) => WeaponKind::SwingArc,
            WeaponTemplate::VelocityDriven(_) => WeaponKind::VelocityDriven,
        }
    }
}

impl SwarmConfig {
    /// Parse and validate a config from JSON text.
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let config: SwarmConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Seconds per tick.
    pub fn dt(&self) -> f64 {
        1.0 / self.tick_rate.max(1) as f64
    }

    /// Reject ranges and probabilities the scheduler cannot sample from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate must be positive".into()));
        }
        let rotation = self.frame_rotation;
        if !rotation.is_finite() || rotation.length() <= GEOMETRY_EPSILON {
            return Err(ConfigError::Invalid(format!(
                "frame_rotation must be a finite non-zero quaternion, got {rotation}"
            )));
        }

        let s = &self.scheduler;
        check_probability("chance_for_concurrency", s.chance_for_concurrency)?;
        check_probability("chance_for_prediction", s.chance_for_prediction)?;
        check_range("interval", s.interval_min, s.interval_max)?;
        check_range("duration", s.duration_min, s.duration_max)?;
        if s.duration_min <= 0.0 {
            return Err(ConfigError::Invalid(
                "duration_min must be positive".into(),
            ));
        }
        check_non_negative("concurrency_check_interval", s.concurrency_check_interval)?;
        check_non_negative("approach_speed", s.approach_speed)?;

        let p = &self.pool;
        if p.use_random_count && p.min_count > p.max_count {
            return Err(ConfigError::Invalid(format!(
                "pool count range is empty: min {} > max {}",
                p.min_count, p.max_count
            )));
        }
        check_non_negative("position_range", p.position_range)?;

        for template in &p.templates {
            match template {
                WeaponTemplate::CurveFollow(params) => {
                    check_finite("contact_offset", params.contact_offset)?;
                    check_non_negative("max_attack_distance", params.max_attack_distance)?;
                    check_non_negative("reach", params.reach)?;
                }
                WeaponTemplate::SwingArc(params) => {
                    check_finite("arc_degrees", params.arc_degrees)?;
                    check_non_negative("attack_range", params.attack_range)?;
                    check_probability("contact_fraction", params.contact_fraction)?;
                    check_non_negative("reach", params.reach)?;
                }
                WeaponTemplate::VelocityDriven(params) => {
                    if !(params.approach_speed.is_finite() && params.approach_speed > 0.0) {
                        return Err(ConfigError::Invalid(
                            "approach_speed must be positive".into(),
                        ));
                    }
                    check_non_negative("stopping_distance", params.stopping_distance)?;
                    check_non_negative("reach", params.reach)?;
                }
            }
        }

        let t = &self.target;
        if !t.start_position.is_finite() || !t.velocity.map_or(true, |v| v.is_finite()) {
            return Err(ConfigError::Invalid(
                "target start_position and velocity must be finite".into(),
            ));
        }
        check_non_negative("arena_radius", t.arena_radius)?;

        Ok(())
    }
}

fn check_probability(name: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

fn check_finite(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be finite, got {value}")))
    }
}

fn check_non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be finite and non-negative, got {value}"
        )))
    }
}

fn check_range(name: &str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && min <= max && min >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} range must satisfy 0 <= min <= max, got [{min}, {max}]"
        )))
    }
}
