//! Bézier curve math for quadratic, cubic and quartic curves in 3-space.
//!
//! Provides closed-form evaluation and derivatives, instantaneous speed,
//! adaptive Simpson arc length, uniform sampling, and helpers that solve a
//! middle control point so a curve passes through a chosen "hump".

use glam::Vec3;

use crate::error::CurveError;

/// A Bézier curve with a supported number of control points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BezierCurve {
    Quadratic([Vec3; 3]),
    Cubic([Vec3; 4]),
    Quartic([Vec3; 5]),
}

impl BezierCurve {
    /// Build a curve from 3, 4 or 5 control points.
    pub fn from_points(points: &[Vec3]) -> Result<Self, CurveError> {
        match *points {
            [p0, p1, p2] => Ok(BezierCurve::Quadratic([p0, p1, p2])),
            [p0, p1, p2, p3] => Ok(BezierCurve::Cubic([p0, p1, p2, p3])),
            [p0, p1, p2, p3, p4] => Ok(BezierCurve::Quartic([p0, p1, p2, p3, p4])),
            _ => Err(CurveError::UnsupportedControlPoints(points.len())),
        }
    }

    pub fn control_points(&self) -> &[Vec3] {
        match self {
            BezierCurve::Quadratic(p) => p,
            BezierCurve::Cubic(p) => p,
            BezierCurve::Quartic(p) => p,
        }
    }

    /// Polynomial degree (control points - 1).
    pub fn degree(&self) -> usize {
        self.control_points().len() - 1
    }

    /// Point on the curve at parameter `t`.
    pub fn evaluate(&self, t: f32) -> Vec3 {
        let u = 1.0 - t;
        match *self {
            // C(t) = u²·p0 + 2ut·p1 + t²·p2
            BezierCurve::Quadratic([p0, p1, p2]) => u * u * p0 + 2.0 * u * t * p1 + t * t * p2,
            // C(t) = u³·p0 + 3u²t·p1 + 3ut²·p2 + t³·p3
            BezierCurve::Cubic([p0, p1, p2, p3]) => {
                u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
            }
            // C(t) = u⁴·p0 + 4u³t·p1 + 6u²t²·p2 + 4ut³·p3 + t⁴·p4
            BezierCurve::Quartic([p0, p1, p2, p3, p4]) => {
                u * u * u * u * p0
                    + 4.0 * u * u * u * t * p1
                    + 6.0 * u * u * t * t * p2
                    + 4.0 * u * t * t * t * p3
                    + t * t * t * t * p4
            }
        }
    }

    /// First derivative dC/dt at parameter `t`.
    pub fn derivative(&self, t: f32) -> Vec3 {
        let u = 1.0 - t;
        match *self {
            // C'(t) = 2[u·(p1-p0) + t·(p2-p1)]
            BezierCurve::Quadratic([p0, p1, p2]) => 2.0 * (u * (p1 - p0) + t * (p2 - p1)),
            // C'(t) = 3[u²·(p1-p0) + 2ut·(p2-p1) + t²·(p3-p2)]
            BezierCurve::Cubic([p0, p1, p2, p3]) => {
                3.0 * (u * u * (p1 - p0) + 2.0 * u * t * (p2 - p1) + t * t * (p3 - p2))
            }
            // C'(t) = 4[u³·(p1-p0) + 3u²t·(p2-p1) + 3ut²·(p3-p2) + t³·(p4-p3)]
            BezierCurve::Quartic([p0, p1, p2, p3, p4]) => {
                4.0 * (u * u * u * (p1 - p0)
                    + 3.0 * u * u * t * (p2 - p1)
                    + 3.0 * u * t * t * (p3 - p2)
                    + t * t * t * (p4 - p3))
            }
        }
    }

    /// Instantaneous speed |C'(t)|.
    pub fn speed(&self, t: f32) -> f32 {
        self.derivative(t).length()
    }

    /// Arc length over `[start_t, end_t]` by adaptive Simpson integration of speed.
    ///
    /// An empty or inverted interval has zero length.
    pub fn arc_length(&self, start_t: f32, end_t: f32, tolerance: f32, max_depth: u32) -> f32 {
        if end_t <= start_t {
            return 0.0;
        }

        let start_d = self.speed(start_t);
        let end_d = self.speed(end_t);
        let middle_d = self.speed(0.5 * (start_t + end_t));
        let whole = simpson(start_t, end_t, start_d, end_d, middle_d);

        self.adaptive_simpson(
            start_t, end_t, start_d, end_d, middle_d, whole, tolerance, max_depth,
        )
        .max(0.0)
    }

    #[allow(clippy::too_many_arguments)]
    fn adaptive_simpson(
        &self,
        start_t: f32,
        end_t: f32,
        start_d: f32,
        end_d: f32,
        middle_d: f32,
        whole: f32,
        tolerance: f32,
        depth: u32,
    ) -> f32 {
        let middle_t = 0.5 * (start_t + end_t);
        let left_d = self.speed(0.5 * (start_t + middle_t));
        let right_d = self.speed(0.5 * (middle_t + end_t));

        let left = simpson(start_t, middle_t, start_d, middle_d, left_d);
        let right = simpson(middle_t, end_t, middle_d, end_d, right_d);

        let delta = left + right - whole;
        if depth == 0 || delta.abs() < 15.0 * tolerance {
            // Richardson correction
            return left + right + delta / 15.0;
        }

        let half_tolerance = 0.5 * tolerance;
        self.adaptive_simpson(
            start_t,
            middle_t,
            start_d,
            middle_d,
            left_d,
            left,
            half_tolerance,
            depth - 1,
        ) + self.adaptive_simpson(
            middle_t,
            end_t,
            middle_d,
            end_d,
            right_d,
            right,
            half_tolerance,
            depth - 1,
        )
    }

    /// Total arc length plus cumulative lengths at the `degree + 1` uniform
    /// parameter breaks `0, 1/degree, ..., 1`.
    pub fn arc_length_with_segments(&self, tolerance: f32, max_depth: u32) -> (f32, Vec<f32>) {
        let segments = self.degree();
        let mut cumulative = Vec::with_capacity(segments + 1);
        cumulative.push(0.0);

        for i in 1..=segments {
            let start_t = (i - 1) as f32 / segments as f32;
            let end_t = i as f32 / segments as f32;
            let previous = cumulative[i - 1];
            cumulative.push(previous + self.arc_length(start_t, end_t, tolerance, max_depth));
        }

        (cumulative[segments], cumulative)
    }

    /// `num_samples` points at evenly spaced parameters from 0 to 1 inclusive.
    pub fn sample_points(&self, num_samples: usize) -> Result<Vec<Vec3>, CurveError> {
        check_samples(num_samples)?;
        Ok((0..num_samples)
            .map(|i| self.evaluate(sample_t(i, num_samples)))
            .collect())
    }

    /// Unit tangents at the same parameters as [`BezierCurve::sample_points`].
    ///
    /// A vanishing derivative yields a zero tangent.
    pub fn sample_tangents(&self, num_samples: usize) -> Result<Vec<Vec3>, CurveError> {
        check_samples(num_samples)?;
        Ok((0..num_samples)
            .map(|i| self.derivative(sample_t(i, num_samples)).normalize_or_zero())
            .collect())
    }
}

/// Parameter of sample `i` out of `num_samples`.
pub fn sample_t(i: usize, num_samples: usize) -> f32 {
    i as f32 / (num_samples - 1) as f32
}

fn check_samples(num_samples: usize) -> Result<(), CurveError> {
    if num_samples < 2 {
        return Err(CurveError::TooFewSamples(num_samples));
    }
    Ok(())
}

/// Simpson's rule over `[start_t, end_t]` from endpoint and midpoint values.
pub fn simpson(start_t: f32, end_t: f32, start_d: f32, end_d: f32, middle_d: f32) -> f32 {
    (end_t - start_t) * (start_d + 4.0 * middle_d + end_d) / 6.0
}

fn shape(points: &[Vec3]) -> Result<BezierCurve, CurveError> {
    BezierCurve::from_points(points).inspect_err(|err| {
        tracing::error!(
            target: "volley::curves",
            control_points = points.len(),
            error = %err,
            "bezier.unsupported_shape"
        );
    })
}

// --- Slice-based entry points ---

/// Evaluate the curve defined by `points` at `t`.
pub fn evaluate(t: f32, points: &[Vec3]) -> Result<Vec3, CurveError> {
    Ok(shape(points)?.evaluate(t))
}

/// Derivative of the curve defined by `points` at `t`.
pub fn derivative(t: f32, points: &[Vec3]) -> Result<Vec3, CurveError> {
    Ok(shape(points)?.derivative(t))
}

/// Speed of the curve defined by `points` at `t`.
pub fn speed(t: f32, points: &[Vec3]) -> Result<f32, CurveError> {
    Ok(shape(points)?.speed(t))
}

/// Arc length of the curve defined by `points` over `[start_t, end_t]`.
pub fn arc_length(
    start_t: f32,
    end_t: f32,
    tolerance: f32,
    max_depth: u32,
    points: &[Vec3],
) -> Result<f32, CurveError> {
    Ok(shape(points)?.arc_length(start_t, end_t, tolerance, max_depth))
}

/// Evenly spaced samples of the curve defined by `points`.
pub fn sample_points(num_samples: usize, points: &[Vec3]) -> Result<Vec<Vec3>, CurveError> {
    shape(points)?.sample_points(num_samples)
}

/// Evenly spaced unit tangents of the curve defined by `points`.
pub fn sample_tangents(num_samples: usize, points: &[Vec3]) -> Result<Vec<Vec3>, CurveError> {
    shape(points)?.sample_tangents(num_samples)
}

// --- Hump solvers ---

/// Middle control point of a quadratic through `hump` at t = 0.5.
pub fn solve_quadratic_hump(p0: Vec3, p2: Vec3, hump: Vec3) -> Vec3 {
    // B(0.5) = p0/4 + p1/2 + p2/4
    (hump - 0.25 * p0 - 0.25 * p2) / 0.5
}

/// Shared inner control point of a cubic whose two inner points coincide,
/// chosen so the curve passes through `hump` at t = 0.5.
pub fn solve_cubic_hump(p0: Vec3, p3: Vec3, hump: Vec3) -> Vec3 {
    // B(0.5) = (p0 + 3·p1 + 3·p2 + p3) / 8 with p1 = p2
    (hump - p0 / 8.0 - p3 / 8.0) / 0.75
}

/// Middle control point of a quartic through `hump` at t = 0.5.
pub fn solve_quartic_hump(p0: Vec3, p1: Vec3, p3: Vec3, p4: Vec3, hump: Vec3) -> Vec3 {
    // B(0.5) = (p0 + 4·p1 + 6·p2 + 4·p3 + p4) / 16
    let others = p0 / 16.0 + p1 / 4.0 + p3 / 4.0 + p4 / 16.0;
    (hump - others) / (3.0 / 8.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use volley_core::constants::*;

    fn assert_close(actual: f32, expected: f32, tol: f32, what: &str) {
        assert!(
            (actual - expected).abs() <= tol,
            "{what}: expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_straight_quadratic_arc_length_is_one() {
        let points = [Vec3::ZERO, Vec3::new(0.5, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)];
        let length = arc_length(0.0, 1.0, ARC_LENGTH_TOLERANCE, ARC_LENGTH_MAX_DEPTH, &points)
            .unwrap();
        assert_close(length, 1.0, 1e-4, "straight quadratic");
    }

    #[test]
    fn test_colinear_arc_length_matches_chord() {
        // Uneven spacing along one line still traces exactly the chord.
        let a = Vec3::new(-1.0, 2.0, 0.5);
        let b = Vec3::new(3.0, -2.0, 4.5);
        let lerp = |s: f32| a.lerp(b, s);
        let chord = a.distance(b);

        let shapes: [&[Vec3]; 3] = [
            &[a, lerp(0.2), b],
            &[a, lerp(0.3), lerp(0.6), b],
            &[a, lerp(0.1), lerp(0.5), lerp(0.7), b],
        ];
        for points in shapes {
            let length =
                arc_length(0.0, 1.0, BAKE_ARC_LENGTH_TOLERANCE, BAKE_ARC_LENGTH_MAX_DEPTH, points)
                    .unwrap();
            let relative = (length - chord).abs() / chord;
            assert!(
                relative < 1e-4,
                "{} control points: length {length} vs chord {chord}",
                points.len()
            );
        }
    }

    #[test]
    fn test_quarter_circle_cubic_arc_length() {
        // Standard cubic approximation of a unit quarter circle.
        let k = 0.552_284_8;
        let curve = BezierCurve::from_points(&[
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, k, 0.0),
            Vec3::new(k, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ])
        .unwrap();
        let length = curve.arc_length(0.0, 1.0, BAKE_ARC_LENGTH_TOLERANCE, BAKE_ARC_LENGTH_MAX_DEPTH);
        assert_close(length, std::f32::consts::FRAC_PI_2, 1e-3, "quarter circle");
    }

    #[test]
    fn test_arc_length_monotonic_in_end_t() {
        let points = [
            Vec3::ZERO,
            Vec3::new(0.2, 0.6, 0.1),
            Vec3::new(0.7, -0.4, 0.3),
            Vec3::new(0.9, 0.5, -0.2),
            Vec3::new(1.0, 0.0, 0.0),
        ];
        let curve = BezierCurve::from_points(&points).unwrap();
        let mut previous = 0.0;
        for i in 0..=100 {
            let t = i as f32 / 100.0;
            let length = curve.arc_length(0.0, t, ARC_LENGTH_TOLERANCE, ARC_LENGTH_MAX_DEPTH);
            assert!(length >= 0.0);
            assert!(
                length + 1e-6 >= previous,
                "arc length decreased at t={t}: {previous} -> {length}"
            );
            previous = length;
        }
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let shapes: [&[Vec3]; 3] = [
            &[Vec3::ZERO, Vec3::new(0.5, 1.0, 0.0), Vec3::new(1.0, 0.0, 0.5)],
            &[
                Vec3::ZERO,
                Vec3::new(0.2, 0.8, 0.0),
                Vec3::new(0.8, -0.3, 0.4),
                Vec3::new(1.0, 0.0, 0.0),
            ],
            &[
                Vec3::ZERO,
                Vec3::new(0.1, 0.5, 0.2),
                Vec3::new(0.5, 0.9, -0.1),
                Vec3::new(0.8, 0.2, 0.3),
                Vec3::new(1.0, 0.0, 0.0),
            ],
        ];
        let h = 1e-3;
        for points in shapes {
            let curve = BezierCurve::from_points(points).unwrap();
            for t in [0.1, 0.35, 0.5, 0.8] {
                let numeric = (curve.evaluate(t + h) - curve.evaluate(t - h)) / (2.0 * h);
                let analytic = curve.derivative(t);
                assert!(
                    (numeric - analytic).length() < 1e-2,
                    "degree {} at t={t}: numeric {numeric:?} vs analytic {analytic:?}",
                    curve.degree()
                );
            }
        }
    }

    #[test]
    fn test_endpoints_interpolated() {
        let points = [
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(4.0, 0.0, 1.0),
            Vec3::new(-2.0, 1.0, 0.0),
            Vec3::new(0.5, 0.5, 0.5),
        ];
        assert_eq!(evaluate(0.0, &points).unwrap(), points[0]);
        assert!((evaluate(1.0, &points).unwrap() - points[3]).length() < 1e-6);
    }

    #[test]
    fn test_unsupported_point_counts_rejected() {
        let two = [Vec3::ZERO, Vec3::X];
        let six = [Vec3::ZERO; 6];
        assert_eq!(
            evaluate(0.5, &two),
            Err(CurveError::UnsupportedControlPoints(2))
        );
        assert_eq!(
            derivative(0.5, &six),
            Err(CurveError::UnsupportedControlPoints(6))
        );
        assert!(arc_length(0.0, 1.0, 1e-4, 16, &[]).is_err());
        assert!(sample_points(10, &two).is_err());
    }

    #[test]
    fn test_sampling_counts_and_unit_tangents() {
        let points = [Vec3::ZERO, Vec3::new(0.5, 0.5, 0.0), Vec3::new(1.0, 0.0, 0.0)];
        let samples = sample_points(50, &points).unwrap();
        let tangents = sample_tangents(50, &points).unwrap();
        assert_eq!(samples.len(), 50);
        assert_eq!(tangents.len(), 50);
        assert_eq!(samples[0], points[0]);
        assert!((samples[49] - points[2]).length() < 1e-6);
        for tangent in &tangents {
            assert_close(tangent.length(), 1.0, 1e-5, "tangent length");
        }
        assert_eq!(sample_points(1, &points), Err(CurveError::TooFewSamples(1)));
    }

    #[test]
    fn test_segment_lengths_sum_to_total() {
        let curve = BezierCurve::from_points(&[
            Vec3::ZERO,
            Vec3::new(0.3, 0.4, 0.0),
            Vec3::new(0.6, -0.2, 0.1),
            Vec3::new(1.0, 0.0, 0.0),
        ])
        .unwrap();
        let (total, cumulative) = curve.arc_length_with_segments(1e-5, 30);
        assert_eq!(cumulative.len(), 4);
        assert_eq!(cumulative[0], 0.0);
        assert!(cumulative.windows(2).all(|w| w[1] >= w[0]));
        let direct = curve.arc_length(0.0, 1.0, 1e-5, 30);
        assert_close(total, direct, 1e-4, "segmented total");
    }

    #[test]
    fn test_hump_solvers_pass_through_hump() {
        let p0 = Vec3::ZERO;
        let p4 = Vec3::new(1.0, 0.0, 0.0);
        let hump = Vec3::new(0.5, 0.3, 0.1);

        let p1 = solve_quadratic_hump(p0, p4, hump);
        let quadratic = BezierCurve::from_points(&[p0, p1, p4]).unwrap();
        assert!((quadratic.evaluate(0.5) - hump).length() < 1e-5);

        let inner = solve_cubic_hump(p0, p4, hump);
        let cubic = BezierCurve::from_points(&[p0, inner, inner, p4]).unwrap();
        assert!((cubic.evaluate(0.5) - hump).length() < 1e-5);

        let q1 = Vec3::new(0.2, 0.1, 0.0);
        let q3 = Vec3::new(0.8, 0.1, 0.0);
        let q2 = solve_quartic_hump(p0, q1, q3, p4, hump);
        let quartic = BezierCurve::from_points(&[p0, q1, q2, q3, p4]).unwrap();
        assert!((quartic.evaluate(0.5) - hump).length() < 1e-5);
    }

    #[test]
    fn test_inverted_interval_is_zero() {
        let curve =
            BezierCurve::from_points(&[Vec3::ZERO, Vec3::Y, Vec3::new(1.0, 1.0, 0.0)]).unwrap();
        assert_eq!(curve.arc_length(0.7, 0.2, 1e-4, 16), 0.0);
        assert_eq!(curve.arc_length(0.4, 0.4, 1e-4, 16), 0.0);
    }
}
