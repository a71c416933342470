//! Curve library: selection of baked records and fitting onto live geometry.
//!
//! Fitting is a rigid transform: uniform scale so the baked contact distance
//! matches the start→target distance, then the shortest rotation taking the
//! baked contact direction onto the start→target direction.

use glam::{Quat, Vec3};
use rand::Rng;

use volley_core::constants::GEOMETRY_EPSILON;

use crate::error::CurveError;
use crate::record::{sample_at_distance, CumulativeMode, CurveRecord};

/// Read-only collection of baked curves. Share it as `Arc<CurveLibrary>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveLibrary {
    curves: Vec<CurveRecord>,
}

/// A record transformed onto a concrete start and target.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedCurve {
    pub points: Vec<Vec3>,
    pub tangents: Vec<Vec3>,
    pub arc_lengths: Vec<f32>,
    pub scale: f32,
    pub rotation: Quat,
    /// Contact point in the fitted frame. Coincides with the target.
    pub contact_point: Vec3,
    pub total_arc_length: f32,
    pub arc_length_to_contact: f32,
}

impl CurveLibrary {
    pub fn new(curves: Vec<CurveRecord>) -> Self {
        Self { curves }
    }

    /// Bake `count` random curves.
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        count: usize,
        control_point_count: usize,
        num_samples: usize,
        mode: CumulativeMode,
    ) -> Result<Self, CurveError> {
        Self::bake(count, || {
            CurveRecord::random(rng, control_point_count, num_samples, mode)
        })
    }

    /// Bake `count` random curves that all pass near `hump` at mid-parameter.
    pub fn generate_through<R: Rng + ?Sized>(
        rng: &mut R,
        count: usize,
        control_point_count: usize,
        hump: Vec3,
        num_samples: usize,
        mode: CumulativeMode,
    ) -> Result<Self, CurveError> {
        Self::bake(count, || {
            CurveRecord::random_through(rng, control_point_count, hump, num_samples, mode)
        })
    }

    fn bake(
        count: usize,
        mut draw: impl FnMut() -> Result<CurveRecord, CurveError>,
    ) -> Result<Self, CurveError> {
        let mut curves = Vec::with_capacity(count);
        while curves.len() < count {
            match draw() {
                Ok(record) => curves.push(record),
                // Random interior points can land on the origin; draw again.
                Err(CurveError::DegenerateCurve) => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(Self { curves })
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn records(&self) -> &[CurveRecord] {
        &self.curves
    }

    pub fn curve(&self, index: usize) -> Result<&CurveRecord, CurveError> {
        if self.curves.is_empty() {
            return Err(log_selection_error(CurveError::NoCurveAvailable));
        }
        self.curves.get(index).ok_or_else(|| {
            log_selection_error(CurveError::IndexOutOfRange {
                index,
                len: self.curves.len(),
            })
        })
    }

    pub fn random_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize, CurveError> {
        if self.curves.is_empty() {
            return Err(log_selection_error(CurveError::NoCurveAvailable));
        }
        Ok(rng.gen_range(0..self.curves.len()))
    }

    pub fn random_curve<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&CurveRecord, CurveError> {
        let index = self.random_index(rng)?;
        self.curve(index)
    }

    pub fn fitted_curve(
        &self,
        index: usize,
        start: Vec3,
        target: Vec3,
    ) -> Result<FittedCurve, CurveError> {
        Ok(Self::fit(self.curve(index)?, start, target))
    }

    pub fn random_fitted_curve<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        start: Vec3,
        target: Vec3,
    ) -> Result<FittedCurve, CurveError> {
        Ok(Self::fit(self.random_curve(rng)?, start, target))
    }

    pub fn contact_time_ratio(&self, index: usize) -> Result<f32, CurveError> {
        Ok(self.curve(index)?.contact_time_ratio)
    }

    /// Transform `record` so it starts at `start` and passes its contact
    /// point through `target`.
    ///
    /// A zero start→target distance collapses the curve onto `start`.
    pub fn fit(record: &CurveRecord, start: Vec3, target: Vec3) -> FittedCurve {
        let to_target = target - start;
        let distance = to_target.length();

        let (scale, rotation) =
            if distance <= GEOMETRY_EPSILON || record.distance_to_contact <= GEOMETRY_EPSILON {
                (0.0, Quat::IDENTITY)
            } else {
                let from = record.contact_point.normalize_or_zero();
                let to = to_target / distance;
                let rotation = if from == Vec3::ZERO {
                    Quat::IDENTITY
                } else {
                    Quat::from_rotation_arc(from, to)
                };
                (distance / record.distance_to_contact, rotation)
            };

        let place = |p: &Vec3| start + rotation * (*p * scale);

        FittedCurve {
            points: record.sampled_points.iter().map(place).collect(),
            tangents: record.sampled_tangents.iter().map(|t| rotation * *t).collect(),
            arc_lengths: record
                .cumulative_arc_lengths
                .iter()
                .map(|len| len * scale)
                .collect(),
            scale,
            rotation,
            contact_point: place(&record.contact_point),
            total_arc_length: record.total_arc_length * scale,
            arc_length_to_contact: record.arc_length_to_contact * scale,
        }
    }
}

impl FittedCurve {
    pub fn start(&self) -> Vec3 {
        self.points.first().copied().unwrap_or(Vec3::ZERO)
    }

    pub fn end(&self) -> Vec3 {
        self.points.last().copied().unwrap_or(Vec3::ZERO)
    }

    /// Position and unit tangent `distance` meters along the fitted path.
    pub fn at_distance(&self, distance: f32) -> (Vec3, Vec3) {
        sample_at_distance(&self.points, &self.tangents, &self.arc_lengths, distance)
    }
}

fn log_selection_error(err: CurveError) -> CurveError {
    tracing::error!(target: "volley::curves", error = %err, "library.selection_failed");
    err
}
