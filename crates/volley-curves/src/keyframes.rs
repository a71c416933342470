//! Swing keyframes: precomputed swing planes for swing-arc attackers, and
//! the .vkf binary format they are stored in.
//!
//! ```text
//! magic b"VKFS" | version u16 | reserved u16
//! plane_normal f32 × 3 | count u32
//! per keyframe: angle f32, start quat f32 × 4 (x, y, z, w),
//!               end quat f32 × 4, axis f32 × 3, upward u8
//! ```

use std::path::Path;

use glam::{Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::codec::{ByteReader, ByteWriter};
use crate::error::CodecError;

/// .vkf magic bytes.
const VKF_MAGIC: [u8; 4] = *b"VKFS";

/// Current format version.
const VKF_VERSION: u16 = 1;

/// One swing: an axis in the attacker's local frame plus the blade's
/// start and end rotations about it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingKeyframe {
    /// Angle (degrees) of the swing axis around the plane normal.
    pub angle: f32,
    pub relative_start: Quat,
    pub relative_end: Quat,
    pub local_swing_axis: Vec3,
    pub is_upward_swing: bool,
}

/// Load-once keyframe collection. Share it as `Arc<SwingKeyframeSet>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwingKeyframeSet {
    pub plane_normal: Vec3,
    pub keyframes: Vec<SwingKeyframe>,
}

impl Default for SwingKeyframeSet {
    fn default() -> Self {
        Self {
            plane_normal: Vec3::Y,
            keyframes: Vec::new(),
        }
    }
}

impl SwingKeyframeSet {
    /// Bake `count` swings with axes spread evenly around `plane_normal`,
    /// each sweeping `arc_degrees`.
    pub fn bake(plane_normal: Vec3, count: usize, arc_degrees: f32) -> Self {
        let normal = plane_normal.try_normalize().unwrap_or(Vec3::Y);
        let reference = normal.any_orthonormal_vector();
        let half_arc = arc_degrees.to_radians() * 0.5;

        let keyframes = (0..count)
            .map(|i| {
                let angle = 360.0 * i as f32 / count as f32;
                let axis = Quat::from_axis_angle(normal, angle.to_radians()) * reference;
                SwingKeyframe {
                    angle,
                    relative_start: Quat::from_axis_angle(axis, -half_arc),
                    relative_end: Quat::from_axis_angle(axis, half_arc),
                    local_swing_axis: axis,
                    is_upward_swing: angle.to_radians().sin() > 0.0,
                }
            })
            .collect();

        Self {
            plane_normal: normal,
            keyframes,
        }
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Bounds-checked access.
    pub fn by_index(&self, index: usize) -> Option<&SwingKeyframe> {
        let keyframe = self.keyframes.get(index);
        if keyframe.is_none() {
            tracing::warn!(
                target: "volley::keyframes",
                index,
                len = self.keyframes.len(),
                "keyframes.index_out_of_range"
            );
        }
        keyframe
    }

    /// Uniformly random keyframe, or `None` for an empty set.
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&SwingKeyframe> {
        if self.keyframes.is_empty() {
            tracing::warn!(target: "volley::keyframes", "keyframes.empty");
            return None;
        }
        self.keyframes.get(rng.gen_range(0..self.keyframes.len()))
    }
}

/// Load a keyframe set from a .vkf file.
pub fn load_keyframes(path: &Path) -> Result<SwingKeyframeSet, CodecError> {
    let data = std::fs::read(path).map_err(|source| CodecError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let set = parse_keyframes(&data)?;
    tracing::info!(
        target: "volley::keyframes",
        path = %path.display(),
        keyframes = set.len(),
        "keyframes.loaded"
    );
    Ok(set)
}

/// Parse a keyframe set from a byte buffer.
pub fn parse_keyframes(data: &[u8]) -> Result<SwingKeyframeSet, CodecError> {
    let mut reader = ByteReader::new(data);
    reader.expect_header(VKF_MAGIC, VKF_VERSION)?;

    let plane_normal = reader.vec3("plane_normal")?;
    let count = reader.u32("keyframe_count")? as usize;
    let mut keyframes = Vec::with_capacity(count.min(data.len()));
    for _ in 0..count {
        keyframes.push(SwingKeyframe {
            angle: reader.f32("angle")?,
            relative_start: reader.quat("relative_start")?,
            relative_end: reader.quat("relative_end")?,
            local_swing_axis: reader.vec3("local_swing_axis")?,
            is_upward_swing: reader.u8("is_upward_swing")? != 0,
        });
    }
    reader.finish()?;

    Ok(SwingKeyframeSet {
        plane_normal,
        keyframes,
    })
}

/// Write a keyframe set to a .vkf file.
pub fn write_keyframes(set: &SwingKeyframeSet, path: &Path) -> Result<(), CodecError> {
    std::fs::write(path, serialize_keyframes(set)).map_err(|source| CodecError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a keyframe set to .vkf bytes.
pub fn serialize_keyframes(set: &SwingKeyframeSet) -> Vec<u8> {
    let mut buf = ByteWriter::with_header(VKF_MAGIC, VKF_VERSION);
    buf.vec3(set.plane_normal);
    buf.u32(set.keyframes.len() as u32);
    for kf in &set.keyframes {
        buf.f32(kf.angle);
        buf.quat(kf.relative_start);
        buf.quat(kf.relative_end);
        buf.vec3(kf.local_swing_axis);
        buf.u8(u8::from(kf.is_upward_swing));
    }
    buf.into_bytes()
}
