//! Tests for curve baking, library selection and fitting, and the file codecs.

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use volley_core::constants::*;

use crate::codec::{load_library, parse_library, serialize_library, write_library};
use crate::error::{CodecError, CurveError};
use crate::keyframes::{load_keyframes, parse_keyframes, serialize_keyframes, write_keyframes};
use crate::library::CurveLibrary;
use crate::bezier::BezierCurve;
use crate::record::{
    hump_control_points, random_control_points, sample_at_distance, CumulativeMode, CurveRecord,
};
use crate::SwingKeyframeSet;

fn symmetric_cubic() -> [Vec3; 4] {
    [
        Vec3::ZERO,
        Vec3::new(0.25, 0.5, 0.0),
        Vec3::new(0.75, 0.5, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
    ]
}

fn seeded_library(count: usize) -> CurveLibrary {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    CurveLibrary::generate(&mut rng, count, 4, DEFAULT_NUM_SAMPLES, CumulativeMode::Precise)
        .unwrap()
}

// ---- Baking ----

#[test]
fn test_symmetric_cubic_contact_ratio_is_half() {
    let record = CurveRecord::generate(DEFAULT_NUM_SAMPLES, 0.5, &symmetric_cubic()).unwrap();
    assert!(
        (record.contact_time_ratio - 0.5).abs() < 1e-3,
        "ratio was {}",
        record.contact_time_ratio
    );
    assert!((record.contact_point - Vec3::new(0.5, 0.375, 0.0)).length() < 1e-5);
}

#[test]
fn test_record_invariants() {
    let record = CurveRecord::generate(50, 0.4, &symmetric_cubic()).unwrap();
    assert_eq!(record.sampled_points.len(), 50);
    assert_eq!(record.sampled_tangents.len(), 50);
    assert_eq!(record.cumulative_arc_lengths.len(), 50);
    assert_eq!(record.sampled_points[0], Vec3::ZERO);
    assert_eq!(record.cumulative_arc_lengths[0], 0.0);
    assert!(record
        .cumulative_arc_lengths
        .windows(2)
        .all(|w| w[1] >= w[0]));
    let last = record.cumulative_arc_lengths[49];
    assert!(
        (last - record.total_arc_length).abs() < 1e-4,
        "last cumulative {last} vs total {}",
        record.total_arc_length
    );
    for tangent in &record.sampled_tangents {
        assert!((tangent.length() - 1.0).abs() < 1e-5);
    }
    assert!(record.contact_time_ratio > 0.0 && record.contact_time_ratio < 1.0);
}

#[test]
fn test_record_is_start_relative() {
    let offset = Vec3::new(3.0, -2.0, 1.0);
    let shifted: Vec<Vec3> = symmetric_cubic().iter().map(|p| *p + offset).collect();
    let a = CurveRecord::generate(20, 0.5, &symmetric_cubic()).unwrap();
    let b = CurveRecord::generate(20, 0.5, &shifted).unwrap();
    assert_eq!(b.sampled_points[0], Vec3::ZERO);
    assert!((a.total_arc_length - b.total_arc_length).abs() < 1e-4);
    assert!((a.contact_point - b.contact_point).length() < 1e-4);
}

#[test]
fn test_generate_rejects_bad_inputs() {
    let points = symmetric_cubic();
    assert_eq!(
        CurveRecord::generate(50, 0.0, &points),
        Err(CurveError::ContactOutOfRange(0.0))
    );
    assert_eq!(
        CurveRecord::generate(50, 1.0, &points),
        Err(CurveError::ContactOutOfRange(1.0))
    );
    assert_eq!(
        CurveRecord::generate(1, 0.5, &points),
        Err(CurveError::TooFewSamples(1))
    );
    assert_eq!(
        CurveRecord::generate(50, 0.5, &points[..2]),
        Err(CurveError::UnsupportedControlPoints(2))
    );
    assert_eq!(
        CurveRecord::generate(50, 0.5, &[Vec3::ONE; 3]),
        Err(CurveError::DegenerateCurve)
    );
}

#[test]
fn test_chord_mode_close_to_precise() {
    let points = symmetric_cubic();
    let precise = CurveRecord::generate_with(50, 0.5, &points, CumulativeMode::Precise).unwrap();
    let chord = CurveRecord::generate_with(50, 0.5, &points, CumulativeMode::Chord).unwrap();
    let p = precise.cumulative_arc_lengths[49];
    let c = chord.cumulative_arc_lengths[49];
    assert!(c <= p + 1e-5, "chords never exceed the arc: {c} > {p}");
    assert!((p - c) / p < 0.01, "chord sum too short: {c} vs {p}");
}

#[test]
fn test_random_control_points_shape() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    for count in 3..=5 {
        let points = random_control_points(&mut rng, count, DEFAULT_PLACEMENT_OFFSET).unwrap();
        assert_eq!(points.len(), count);
        assert_eq!(points[0], Vec3::ZERO);
        assert_eq!(points[count - 1], Vec3::X);
        for p in &points[1..count - 1] {
            assert!(p.z >= 0.0, "interior z must be non-negative: {p:?}");
        }
    }
    assert_eq!(
        random_control_points(&mut rng, 6, 0.2),
        Err(CurveError::UnsupportedControlPoints(6))
    );
}

#[test]
fn test_impact_time_with_and_without_offset() {
    let record = CurveRecord::generate(50, 0.5, &symmetric_cubic()).unwrap();
    let base = record.impact_time(2.0, 1.0, 0.0);
    assert!((base - 2.0 * record.contact_time_ratio).abs() < 1e-6);

    // Offsets below the threshold are ignored.
    assert_eq!(record.impact_time(2.0, 1.0, 0.0005), base);

    let offset = 0.1;
    let scale = 2.0;
    let expected = 2.0 * (record.arc_length_to_contact - offset / scale) / record.total_arc_length;
    let with_offset = record.impact_time(2.0, scale, offset);
    assert!((with_offset - expected).abs() < 1e-6);
    assert!(with_offset < base);
}

#[test]
fn test_hump_control_points_pass_through_hump() {
    let hump = Vec3::new(0.5, 0.4, 0.1);
    for count in 3..=5 {
        let points = hump_control_points(count, hump).unwrap();
        assert_eq!(points.len(), count);
        assert_eq!(points[0], Vec3::ZERO);
        assert_eq!(points[count - 1], Vec3::X);
        let curve = BezierCurve::from_points(&points).unwrap();
        assert!(
            (curve.evaluate(0.5) - hump).length() < 1e-5,
            "{count} points miss the hump"
        );
    }
    assert_eq!(
        hump_control_points(6, hump),
        Err(CurveError::UnsupportedControlPoints(6))
    );
}

// ---- Library ----

#[test]
fn test_generated_library_records_are_valid() {
    let library = seeded_library(5);
    assert_eq!(library.len(), 5);
    for record in library.records() {
        assert_eq!(record.sampled_points[0], Vec3::ZERO);
        assert!(record.contact_time_ratio > 0.0 && record.contact_time_ratio < 1.0);
        assert!(record.distance_to_contact > 0.0);
    }
}

#[test]
fn test_generate_through_hump() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let hump = Vec3::new(0.5, 0.6, 0.0);
    let library =
        CurveLibrary::generate_through(&mut rng, 6, 3, hump, 41, CumulativeMode::Precise).unwrap();
    assert_eq!(library.len(), 6);
    for record in library.records() {
        assert_eq!(record.num_samples(), 41);
        assert!(record.contact_time_ratio > 0.0 && record.contact_time_ratio < 1.0);
        // Sample 20 of 41 sits at t = 0.5.
        let middle = record.sampled_points[20];
        assert!(middle.distance(hump) <= DEFAULT_PLACEMENT_OFFSET + 1e-4);
    }
}

#[test]
fn test_fit_maps_start_and_contact_onto_target() {
    let library = seeded_library(3);
    let start = Vec3::new(1.0, 2.0, 3.0);
    let target = Vec3::new(-2.0, 4.0, 0.5);

    for index in 0..library.len() {
        let record = library.curve(index).unwrap();
        let fitted = library.fitted_curve(index, start, target).unwrap();

        assert!((fitted.start() - start).length() < 1e-5);
        assert!(
            (fitted.contact_point - target).length() < 1e-4,
            "curve {index}: contact {:?} vs target {target:?}",
            fitted.contact_point
        );
        let expected_scale = start.distance(target) / record.distance_to_contact;
        assert!((fitted.scale - expected_scale).abs() < 1e-5);
        assert!(
            (fitted.total_arc_length - record.total_arc_length * fitted.scale).abs() < 1e-4
        );
        assert_eq!(fitted.points.len(), record.sampled_points.len());
    }
}

#[test]
fn test_fit_degenerate_distance_collapses_onto_start() {
    let record = CurveRecord::generate(10, 0.5, &symmetric_cubic()).unwrap();
    let start = Vec3::new(1.0, 1.0, 1.0);
    let fitted = CurveLibrary::fit(&record, start, start);
    assert_eq!(fitted.scale, 0.0);
    assert!(fitted.points.iter().all(|p| *p == start));
    assert_eq!(fitted.total_arc_length, 0.0);
}

#[test]
fn test_fit_opposite_direction() {
    // Contact direction is +X-ish; target straight down -X.
    let record = CurveRecord::generate(10, 0.5, &symmetric_cubic()).unwrap();
    let start = Vec3::ZERO;
    let target = -record.contact_point.normalize() * 2.0;
    let fitted = CurveLibrary::fit(&record, start, target);
    assert!((fitted.contact_point - target).length() < 1e-4);
}

#[test]
fn test_empty_library_errors() {
    let library = CurveLibrary::default();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    assert_eq!(library.curve(0), Err(CurveError::NoCurveAvailable));
    assert_eq!(library.random_index(&mut rng), Err(CurveError::NoCurveAvailable));
    assert!(matches!(
        library.random_fitted_curve(&mut rng, Vec3::ZERO, Vec3::X),
        Err(CurveError::NoCurveAvailable)
    ));
}

#[test]
fn test_index_out_of_range() {
    let library = seeded_library(2);
    assert_eq!(
        library.contact_time_ratio(5),
        Err(CurveError::IndexOutOfRange { index: 5, len: 2 })
    );
    assert!(library.contact_time_ratio(1).is_ok());
}

#[test]
fn test_random_index_in_range() {
    let library = seeded_library(4);
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for _ in 0..100 {
        let index = library.random_index(&mut rng).unwrap();
        assert!(index < 4);
    }
}

#[test]
fn test_sample_at_distance_interpolates() {
    let points = [Vec3::ZERO, Vec3::X, Vec3::new(2.0, 0.0, 0.0)];
    let tangents = [Vec3::X; 3];
    let lengths = [0.0, 1.0, 2.0];

    let (mid, tangent) = sample_at_distance(&points, &tangents, &lengths, 1.5);
    assert!((mid - Vec3::new(1.5, 0.0, 0.0)).length() < 1e-6);
    assert_eq!(tangent, Vec3::X);

    let (before, _) = sample_at_distance(&points, &tangents, &lengths, -1.0);
    assert_eq!(before, Vec3::ZERO);
    let (after, _) = sample_at_distance(&points, &tangents, &lengths, 9.0);
    assert_eq!(after, points[2]);
}

// ---- Codecs ----

#[test]
fn test_vcl_file_roundtrip() {
    let library = seeded_library(3);
    let file = tempfile::NamedTempFile::new().unwrap();
    write_library(&library, file.path()).unwrap();
    let loaded = load_library(file.path()).unwrap();

    assert_eq!(loaded.len(), library.len());
    for (a, b) in library.records().iter().zip(loaded.records()) {
        for (pa, pb) in a.sampled_points.iter().zip(&b.sampled_points) {
            assert!((*pa - *pb).length() <= 1e-6);
        }
        for (la, lb) in a.cumulative_arc_lengths.iter().zip(&b.cumulative_arc_lengths) {
            assert!((la - lb).abs() <= 1e-6);
        }
        assert!((a.contact_time_ratio - b.contact_time_ratio).abs() <= 1e-6);
        assert!((a.distance_to_contact - b.distance_to_contact).abs() <= 1e-6);
    }
}

#[test]
fn test_vcl_truncated_data_rejected() {
    let bytes = serialize_library(&seeded_library(1));
    for cut in [3, 11, 20, bytes.len() - 1] {
        assert!(
            matches!(parse_library(&bytes[..cut]), Err(CodecError::Truncated { .. })),
            "cut at {cut} should be truncated"
        );
    }
}

#[test]
fn test_vcl_mismatched_array_rejected() {
    let mut library = seeded_library(1);
    let mut records = library.records().to_vec();
    records[0].sampled_tangents.pop();
    library = CurveLibrary::new(records);
    let bytes = serialize_library(&library);
    assert!(matches!(
        parse_library(&bytes),
        Err(CodecError::LengthMismatch {
            field: "sampled_tangents",
            ..
        })
    ));
}

/// Serialize a one-curve library after `corrupt` edits its record, then parse it back.
fn parse_corrupted(corrupt: impl FnOnce(&mut CurveRecord)) -> Result<CurveLibrary, CodecError> {
    let mut records = seeded_library(2).records().to_vec();
    corrupt(&mut records[1]);
    parse_library(&serialize_library(&CurveLibrary::new(records)))
}

fn assert_invalid_record(result: Result<CurveLibrary, CodecError>, expected_reason: &str) {
    match result {
        Err(CodecError::InvalidRecord { index, reason }) => {
            assert_eq!(index, 1);
            assert!(
                reason.contains(expected_reason),
                "reason '{reason}' should mention '{expected_reason}'"
            );
        }
        other => panic!("expected InvalidRecord, got {other:?}"),
    }
}

#[test]
fn test_vcl_rejects_empty_record() {
    let result = parse_corrupted(|r| {
        r.sampled_points.clear();
        r.sampled_tangents.clear();
        r.cumulative_arc_lengths.clear();
    });
    assert_invalid_record(result, "samples");
}

#[test]
fn test_vcl_rejects_single_sample_record() {
    let result = parse_corrupted(|r| {
        r.sampled_points.truncate(1);
        r.sampled_tangents.truncate(1);
        r.cumulative_arc_lengths.truncate(1);
    });
    assert_invalid_record(result, "samples");
}

#[test]
fn test_vcl_rejects_contact_ratio_out_of_range() {
    assert_invalid_record(parse_corrupted(|r| r.contact_time_ratio = 1.0), "contact_time_ratio");
    assert_invalid_record(parse_corrupted(|r| r.contact_time_ratio = -0.2), "contact_time_ratio");
}

#[test]
fn test_vcl_rejects_non_positive_contact_distance() {
    assert_invalid_record(parse_corrupted(|r| r.distance_to_contact = 0.0), "distance_to_contact");
    assert_invalid_record(
        parse_corrupted(|r| r.distance_to_contact = -1.0),
        "distance_to_contact",
    );
}

#[test]
fn test_vcl_rejects_bad_cumulative_lengths() {
    assert_invalid_record(
        parse_corrupted(|r| r.cumulative_arc_lengths[0] = 0.5),
        "start at 0",
    );
    assert_invalid_record(
        parse_corrupted(|r| {
            let last = r.cumulative_arc_lengths.len() - 1;
            r.cumulative_arc_lengths[last] = 0.0;
        }),
        "decrease",
    );
}

#[test]
fn test_vcl_rejects_non_finite_values() {
    assert_invalid_record(parse_corrupted(|r| r.total_arc_length = f32::NAN), "non-finite");
    assert_invalid_record(
        parse_corrupted(|r| r.sampled_points[3] = Vec3::new(f32::INFINITY, 0.0, 0.0)),
        "non-finite",
    );
}

#[test]
fn test_missing_library_file() {
    let result = load_library(std::path::Path::new("/nonexistent/curves.vcl"));
    assert!(matches!(result, Err(CodecError::Read { .. })));
}

#[test]
fn test_keyframe_bake_and_roundtrip() {
    let set = SwingKeyframeSet::bake(Vec3::new(0.0, 2.0, 0.0), 8, 150.0);
    assert_eq!(set.len(), 8);
    assert!((set.plane_normal - Vec3::Y).length() < 1e-6);
    for kf in &set.keyframes {
        assert!(kf.local_swing_axis.dot(set.plane_normal).abs() < 1e-5);
        let sweep = kf.relative_start.angle_between(kf.relative_end).to_degrees();
        assert!((sweep - 150.0).abs() < 0.1, "sweep was {sweep}");
    }

    let file = tempfile::NamedTempFile::new().unwrap();
    write_keyframes(&set, file.path()).unwrap();
    let loaded = load_keyframes(file.path()).unwrap();
    assert_eq!(loaded, set);
}

#[test]
fn test_keyframe_selection() {
    let set = SwingKeyframeSet::bake(Vec3::Y, 4, 90.0);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    assert!(set.random(&mut rng).is_some());
    assert!(set.by_index(3).is_some());
    assert!(set.by_index(4).is_none());

    let empty = SwingKeyframeSet::default();
    assert!(empty.random(&mut rng).is_none());
}

#[test]
fn test_keyframe_bad_magic() {
    let mut bytes = serialize_keyframes(&SwingKeyframeSet::bake(Vec3::Y, 2, 90.0));
    bytes[..4].copy_from_slice(b"VCLB");
    assert!(matches!(
        parse_keyframes(&bytes),
        Err(CodecError::BadMagic { .. })
    ));
}
