//! Baked curve records.
//!
//! A [`CurveRecord`] is a shape-only trajectory: dense samples, unit
//! tangents and cumulative arc lengths, all relative to a start at the
//! origin. Records are produced once (offline or at load) and never mutated;
//! fitting them onto a live start/target pair happens in the library.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use volley_core::constants::*;

use crate::bezier::{
    sample_t, solve_cubic_hump, solve_quadratic_hump, solve_quartic_hump, BezierCurve,
};
use crate::error::CurveError;

/// How per-sample cumulative arc lengths are computed at bake time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CumulativeMode {
    /// Adaptive integration from t = 0 to each sample.
    #[default]
    Precise,
    /// Running sum of straight segments between samples. Fast, slightly short.
    Chord,
}

/// Immutable precomputed curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveRecord {
    /// Samples in ascending parameter order. `sampled_points[0]` is the origin.
    pub sampled_points: Vec<Vec3>,
    /// Unit tangents at each sample.
    pub sampled_tangents: Vec<Vec3>,
    /// Arc length from the start to each sample. Starts at 0, non-decreasing.
    pub cumulative_arc_lengths: Vec<f32>,
    /// Point on the curve designated as the moment of impact.
    pub contact_point: Vec3,
    /// Straight-line distance from the start to `contact_point`.
    pub distance_to_contact: f32,
    pub total_arc_length: f32,
    pub arc_length_to_contact: f32,
    /// `arc_length_to_contact / total_arc_length`, strictly inside (0, 1).
    pub contact_time_ratio: f32,
}

impl CurveRecord {
    /// Bake a record with precise cumulative arc lengths.
    pub fn generate(
        num_samples: usize,
        contact_at: f32,
        control_points: &[Vec3],
    ) -> Result<Self, CurveError> {
        Self::generate_with(num_samples, contact_at, control_points, CumulativeMode::Precise)
    }

    /// Bake a record from 3, 4 or 5 control points.
    ///
    /// Control points are translated so the first lies at the origin.
    /// `contact_at` is the curve parameter of the contact point.
    pub fn generate_with(
        num_samples: usize,
        contact_at: f32,
        control_points: &[Vec3],
        mode: CumulativeMode,
    ) -> Result<Self, CurveError> {
        if !(contact_at > 0.0 && contact_at < 1.0) {
            return Err(CurveError::ContactOutOfRange(contact_at));
        }
        if num_samples < 2 {
            return Err(CurveError::TooFewSamples(num_samples));
        }

        let origin = control_points.first().copied().unwrap_or(Vec3::ZERO);
        let relative: Vec<Vec3> = control_points.iter().map(|p| *p - origin).collect();
        let curve = BezierCurve::from_points(&relative)?;

        let tolerance = BAKE_ARC_LENGTH_TOLERANCE;
        let depth = BAKE_ARC_LENGTH_MAX_DEPTH;

        let contact_point = curve.evaluate(contact_at);
        let distance_to_contact = contact_point.length();
        let (total_arc_length, _) = curve.arc_length_with_segments(tolerance, depth);
        let arc_length_to_contact = curve.arc_length(0.0, contact_at, tolerance, depth);

        if total_arc_length <= GEOMETRY_EPSILON || distance_to_contact <= GEOMETRY_EPSILON {
            return Err(CurveError::DegenerateCurve);
        }

        let sampled_points = curve.sample_points(num_samples)?;
        let sampled_tangents = curve.sample_tangents(num_samples)?;

        let cumulative_arc_lengths = match mode {
            CumulativeMode::Precise => (0..num_samples)
                .map(|i| curve.arc_length(0.0, sample_t(i, num_samples), tolerance, depth))
                .collect(),
            CumulativeMode::Chord => {
                let mut lengths = Vec::with_capacity(num_samples);
                let mut running = 0.0;
                lengths.push(running);
                for pair in sampled_points.windows(2) {
                    running += pair[0].distance(pair[1]);
                    lengths.push(running);
                }
                lengths
            }
        };

        Ok(Self {
            sampled_points,
            sampled_tangents,
            cumulative_arc_lengths,
            contact_point,
            distance_to_contact,
            total_arc_length,
            arc_length_to_contact,
            contact_time_ratio: arc_length_to_contact / total_arc_length,
        })
    }

    /// Bake a random record: random interior control points and a contact
    /// parameter drawn from `[CONTACT_AT_MIN, CONTACT_AT_MAX]`.
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        control_point_count: usize,
        num_samples: usize,
        mode: CumulativeMode,
    ) -> Result<Self, CurveError> {
        let points = random_control_points(rng, control_point_count, DEFAULT_PLACEMENT_OFFSET)?;
        let contact_at = rng.gen_range(CONTACT_AT_MIN..=CONTACT_AT_MAX);
        Self::generate_with(num_samples, contact_at, &points, mode)
    }

    /// Bake a random record passing through `hump` (jittered by up to
    /// `DEFAULT_PLACEMENT_OFFSET`) halfway along its parameter range.
    pub fn random_through<R: Rng + ?Sized>(
        rng: &mut R,
        control_point_count: usize,
        hump: Vec3,
        num_samples: usize,
        mode: CumulativeMode,
    ) -> Result<Self, CurveError> {
        let mut jitter = random_in_unit_sphere(rng) * DEFAULT_PLACEMENT_OFFSET;
        jitter.z = jitter.z.abs();
        let points = hump_control_points(control_point_count, hump + jitter)?;
        let contact_at = rng.gen_range(CONTACT_AT_MIN..=CONTACT_AT_MAX);
        Self::generate_with(num_samples, contact_at, &points, mode)
    }

    pub fn num_samples(&self) -> usize {
        self.sampled_points.len()
    }

    /// Predicted time of contact for a strike of `duration` seconds flown at
    /// `scale`, with the effective impact `contact_offset` along the path
    /// from the geometric contact.
    pub fn impact_time(&self, duration: f32, scale: f32, contact_offset: f32) -> f32 {
        let time = if contact_offset.abs() > CONTACT_OFFSET_EPSILON && scale > GEOMETRY_EPSILON {
            duration * (self.arc_length_to_contact - contact_offset / scale) / self.total_arc_length
        } else {
            duration * self.contact_time_ratio
        };
        time.clamp(0.0, duration)
    }
}

/// Control points for a random strike shape.
///
/// The first point is the origin and the last is `(1, 0, 0)`. Interior
/// points sit on the chord, offset by a random vector inside a sphere of
/// radius `placement_offset` with non-negative z.
pub fn random_control_points<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    placement_offset: f32,
) -> Result<Vec<Vec3>, CurveError> {
    if !(3..=5).contains(&count) {
        return Err(CurveError::UnsupportedControlPoints(count));
    }

    let end = Vec3::X;
    let mut points = Vec::with_capacity(count);
    points.push(Vec3::ZERO);
    for i in 1..count - 1 {
        let along = Vec3::ZERO.lerp(end, i as f32 / (count - 1) as f32);
        let mut offset = random_in_unit_sphere(rng) * placement_offset;
        offset.z = offset.z.abs();
        points.push(along + offset);
    }
    points.push(end);
    Ok(points)
}

/// Control points from the origin to `(1, 0, 0)` whose curve passes
/// through `hump` at t = 0.5.
///
/// Quartic outer-inner points sit on the chord at its quarter marks.
pub fn hump_control_points(count: usize, hump: Vec3) -> Result<Vec<Vec3>, CurveError> {
    let (start, end) = (Vec3::ZERO, Vec3::X);
    match count {
        3 => Ok(vec![start, solve_quadratic_hump(start, end, hump), end]),
        4 => {
            let inner = solve_cubic_hump(start, end, hump);
            Ok(vec![start, inner, inner, end])
        }
        5 => {
            let p1 = start.lerp(end, 0.25);
            let p3 = start.lerp(end, 0.75);
            let p2 = solve_quartic_hump(start, p1, p3, end, hump);
            Ok(vec![start, p1, p2, p3, end])
        }
        _ => Err(CurveError::UnsupportedControlPoints(count)),
    }
}

/// Uniform point inside the unit sphere (rejection sampling).
pub fn random_in_unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

/// Position and unit tangent at arc length `distance` along sampled data.
///
/// Interpolates linearly between the two samples bracketing `distance`;
/// distances outside the path clamp to its ends.
pub fn sample_at_distance(
    points: &[Vec3],
    tangents: &[Vec3],
    lengths: &[f32],
    distance: f32,
) -> (Vec3, Vec3) {
    let n = points.len().min(tangents.len()).min(lengths.len());
    if n == 0 {
        return (Vec3::ZERO, Vec3::ZERO);
    }
    if distance <= lengths[0] {
        return (points[0], tangents[0]);
    }
    if distance >= lengths[n - 1] {
        return (points[n - 1], tangents[n - 1]);
    }

    // First sample strictly beyond `distance`.
    let upper = lengths[..n].partition_point(|&len| len <= distance).clamp(1, n - 1);
    let lower = upper - 1;
    let span = lengths[upper] - lengths[lower];
    let f = if span > GEOMETRY_EPSILON {
        (distance - lengths[lower]) / span
    } else {
        0.0
    };

    let position = points[lower].lerp(points[upper], f);
    let tangent = tangents[lower].lerp(tangents[upper], f).normalize_or_zero();
    (position, tangent)
}
