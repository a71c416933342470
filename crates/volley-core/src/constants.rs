//! Simulation constants and tuning parameters.

/// Default simulation tick rate (Hz).
pub const TICK_RATE: u32 = 50;

// --- Scheduler defaults ---

/// Maximum number of attackers striking at once.
pub const DEFAULT_MAX_CONCURRENT_SWINGS: usize = 3;

/// Probability that a waiting attacker joins an active volley at each concurrency check.
pub const DEFAULT_CHANCE_FOR_CONCURRENCY: f32 = 0.25;

/// Probability that a launch leads the target instead of aiming at its live position.
pub const DEFAULT_CHANCE_FOR_PREDICTION: f32 = 0.4;

/// Seconds between concurrency checks.
pub const DEFAULT_CONCURRENCY_CHECK_INTERVAL: f32 = 0.2;

/// Launch interval range (seconds).
pub const DEFAULT_INTERVAL_MIN: f32 = 0.5;
pub const DEFAULT_INTERVAL_MAX: f32 = 1.5;

/// Strike duration range (seconds).
pub const DEFAULT_DURATION_MIN: f32 = 0.25;
pub const DEFAULT_DURATION_MAX: f32 = 1.0;

/// Speed at which waiting attackers close in on a target out of reach (m/s).
pub const DEFAULT_APPROACH_SPEED: f32 = 3.0;

// --- Pool defaults ---

/// Attackers instantiated when the random count is disabled.
pub const DEFAULT_ATTACKER_COUNT: usize = 3;

/// Random attacker count range (inclusive).
pub const DEFAULT_MIN_ATTACKERS: usize = 1;
pub const DEFAULT_MAX_ATTACKERS: usize = 3;

/// Radius of the sphere attackers are scattered in at pool build (meters).
pub const DEFAULT_POSITION_RANGE: f32 = 5.0;

// --- Target defaults ---

/// Radius the target is kept within by the motion system (meters).
pub const DEFAULT_ARENA_RADIUS: f32 = 8.0;

// --- Arc length integration ---

/// Runtime adaptive Simpson tolerance.
pub const ARC_LENGTH_TOLERANCE: f32 = 1e-4;

/// Runtime adaptive Simpson recursion budget.
pub const ARC_LENGTH_MAX_DEPTH: u32 = 16;

/// Bake-time tolerance (curves are generated once, offline).
pub const BAKE_ARC_LENGTH_TOLERANCE: f32 = 1e-5;

/// Bake-time recursion budget.
pub const BAKE_ARC_LENGTH_MAX_DEPTH: u32 = 30;

// --- Curve generation ---

/// Samples per baked curve.
pub const DEFAULT_NUM_SAMPLES: usize = 50;

/// Random interior control point offset (unit-chord scale).
pub const DEFAULT_PLACEMENT_OFFSET: f32 = 0.2;

/// Range the contact parameter is drawn from for random bakes.
pub const CONTACT_AT_MIN: f32 = 0.35;
pub const CONTACT_AT_MAX: f32 = 0.65;

// --- Weapons ---

/// Offsets smaller than this are treated as zero when predicting impact time.
pub const CONTACT_OFFSET_EPSILON: f32 = 0.001;

/// Fraction of a swing-arc strike spent closing distance before the swing.
pub const SWING_ORIENT_FRACTION: f32 = 0.25;

/// Slerp factor applied per tick when turning a curve follower to its tangent.
pub const CURVE_FOLLOW_TURN_RATE: f32 = 0.35;

/// Distances below this are treated as coincident points.
pub const GEOMETRY_EPSILON: f32 = 1e-6;
