use std::io::Write;

use glam::{Quat, Vec3};

use crate::commands::SwarmCommand;
use crate::config::*;
use crate::enums::*;
use crate::events::StrikeEvent;
use crate::state::SwarmSnapshot;
use crate::types::{SimTime, SwarmFrame};

/// Verify enums round-trip through serde_json.
#[test]
fn test_handle_state_serde() {
    for v in [HandleState::Idle, HandleState::Running] {
        let json = serde_json::to_string(&v).unwrap();
        let back: HandleState = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}

#[test]
fn test_weapon_kind_serde() {
    for v in [
        WeaponKind::CurveFollow,
        WeaponKind::SwingArc,
        WeaponKind::VelocityDriven,
    ] {
        let json = serde_json::to_string(&v).unwrap();
        let back: WeaponKind = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}

/// Verify SwarmCommand round-trips through serde (tagged union).
#[test]
fn test_swarm_command_serde() {
    let commands = vec![
        SwarmCommand::StartEpisode,
        SwarmCommand::Pause,
        SwarmCommand::Resume,
        SwarmCommand::StopAll,
        SwarmCommand::StopAttacker { handle: 2 },
        SwarmCommand::RebuildPool,
        SwarmCommand::SetTargetVelocity {
            velocity: Some(Vec3::new(1.0, 0.0, 0.0)),
        },
        SwarmCommand::SetTargetVelocity { velocity: None },
        SwarmCommand::TeleportTarget {
            position: Vec3::new(0.0, 1.0, 2.0),
        },
    ];
    for cmd in &commands {
        let json = serde_json::to_string(cmd).unwrap();
        let back: SwarmCommand = serde_json::from_str(&json).unwrap();
        // SwarmCommand doesn't derive PartialEq; compare JSON
        assert_eq!(json, serde_json::to_string(&back).unwrap());
    }
}

#[test]
fn test_strike_event_serde() {
    let events = vec![
        StrikeEvent::Launched {
            handle: 1,
            kind: WeaponKind::CurveFollow,
            token: 7,
            duration: 0.5,
            aim: Vec3::new(1.0, 2.0, 3.0),
            predicted: true,
        },
        StrikeEvent::Completed {
            handle: 1,
            token: 7,
            reason: FinishReason::EarlyExit,
        },
        StrikeEvent::Cancelled { handle: 3, token: 9 },
        StrikeEvent::PoolRebuilt { attacker_count: 4 },
    ];
    for event in &events {
        let json = serde_json::to_string(event).unwrap();
        let back: StrikeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(*event, back);
    }
}

#[test]
fn test_snapshot_serde() {
    let snapshot = SwarmSnapshot::default();
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: SwarmSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(snapshot.time.tick, back.time.tick);
    assert_eq!(snapshot.phase, back.phase);
    assert!(
        json.len() < 512,
        "Empty snapshot should be small, was {} bytes",
        json.len()
    );
}

// ---- Geometry ----

#[test]
fn test_swarm_frame_local_direction() {
    // Swarm frame yawed 90° about +Y: world +X is local +Z.
    let frame = SwarmFrame::new(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
    let local = frame.to_local_direction(Vec3::X);
    assert!(
        (local - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5,
        "expected +Z, got {local:?}"
    );

    let identity = SwarmFrame::default();
    assert_eq!(identity.to_local_direction(Vec3::X), Vec3::X);
}

#[test]
fn test_sim_time_advance() {
    let mut time = SimTime::default();
    for _ in 0..50 {
        time.advance(1.0 / 50.0);
    }
    assert_eq!(time.tick, 50);
    assert!((time.elapsed_secs - 1.0).abs() < 1e-9);
}

// ---- Config ----

#[test]
fn test_default_config_is_valid() {
    let config = SwarmConfig::default();
    config.validate().unwrap();
    assert_eq!(config.pool.templates.len(), 3);
    assert!((config.dt() - 0.02).abs() < 1e-12);
}

#[test]
fn test_partial_json_uses_defaults() {
    let config = SwarmConfig::from_json_str(
        r#"{
            "seed": 7,
            "scheduler": { "max_concurrent_swings": 1 },
            "pool": {
                "attacker_count": 5,
                "templates": [
                    { "kind": "CurveFollow", "contact_offset": 0.1 },
                    { "kind": "VelocityDriven" }
                ]
            }
        }"#,
    )
    .unwrap();

    assert_eq!(config.seed, 7);
    assert_eq!(config.scheduler.max_concurrent_swings, 1);
    assert_eq!(
        config.scheduler.chance_for_concurrency,
        SchedulerConfig::default().chance_for_concurrency
    );
    assert_eq!(config.pool.attacker_count, 5);
    assert_eq!(config.pool.templates.len(), 2);
    match &config.pool.templates[0] {
        WeaponTemplate::CurveFollow(params) => {
            assert!((params.contact_offset - 0.1).abs() < 1e-6);
            assert_eq!(params.max_attack_distance, 10.0);
        }
        other => panic!("expected CurveFollow, got {other:?}"),
    }
    assert_eq!(config.pool.templates[1].kind(), WeaponKind::VelocityDriven);
}

#[test]
fn test_invalid_probability_rejected() {
    let result = SwarmConfig::from_json_str(r#"{ "scheduler": { "chance_for_prediction": 1.5 } }"#);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_inverted_interval_rejected() {
    let mut config = SwarmConfig::default();
    config.scheduler.interval_min = 2.0;
    config.scheduler.interval_max = 1.0;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_inverted_random_count_rejected() {
    let mut config = SwarmConfig::default();
    config.pool.use_random_count = true;
    config.pool.min_count = 4;
    config.pool.max_count = 2;
    assert!(config.validate().is_err());

    // Inverted counts are fine while the random count is off.
    config.pool.use_random_count = false;
    assert!(config.validate().is_ok());
}

#[test]
fn test_non_finite_values_rejected() {
    let mut config = SwarmConfig::default();
    config.scheduler.concurrency_check_interval = f32::NAN;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let mut config = SwarmConfig::default();
    config.scheduler.chance_for_concurrency = f32::NAN;
    assert!(config.validate().is_err());

    let mut config = SwarmConfig::default();
    config.scheduler.approach_speed = f32::INFINITY;
    assert!(config.validate().is_err());

    let mut config = SwarmConfig::default();
    config.pool.position_range = f32::NAN;
    assert!(config.validate().is_err());

    let mut config = SwarmConfig::default();
    config.target.velocity = Some(Vec3::new(f32::NAN, 0.0, 0.0));
    assert!(config.validate().is_err());

    let mut config = SwarmConfig::default();
    config.pool.templates = vec![WeaponTemplate::CurveFollow(CurveFollowParams {
        reach: f32::NAN,
        ..CurveFollowParams::default()
    })];
    assert!(config.validate().is_err());
}

#[test]
fn test_degenerate_frame_rotation_rejected() {
    let mut config = SwarmConfig::default();
    config.frame_rotation = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    config.frame_rotation = Quat::from_xyzw(f32::NAN, 0.0, 0.0, 1.0);
    assert!(config.validate().is_err());

    // Unnormalized rotations are normalized by the frame.
    config.frame_rotation = Quat::from_xyzw(0.0, 0.0, 0.0, 2.0);
    assert!(config.validate().is_ok());
}

#[test]
fn test_negative_approach_speed_rejected() {
    let mut config = SwarmConfig::default();
    config.scheduler.approach_speed = -1.0;
    assert!(config.validate().is_err());

    // Zero disables the idle approach.
    config.scheduler.approach_speed = 0.0;
    assert!(config.validate().is_ok());
}

#[test]
fn test_malformed_json_is_parse_error() {
    let result = SwarmConfig::from_json_str("{ not json");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "seed": 99, "tick_rate": 60 }}"#).unwrap();

    let config = SwarmConfig::from_file(file.path()).unwrap();
    assert_eq!(config.seed, 99);
    assert_eq!(config.tick_rate, 60);

    let missing = SwarmConfig::from_file(std::path::Path::new("/nonexistent/volley.json"));
    assert!(matches!(missing, Err(ConfigError::Read { .. })));
}
