//! .vcl binary format loader and writer.
//!
//! Compact little-endian curve library format:
//!
//! ```text
//! magic b"VCLB" | version u16 | reserved u16 | curve_count u32
//! per record:
//!   point_count u32
//!   points   len u32, len × (f32, f32, f32)
//!   tangents len u32, len × (f32, f32, f32)
//!   lengths  len u32, len × f32
//!   contact_point f32 × 3
//!   distance_to_contact, total_arc_length, arc_length_to_contact, contact_time_ratio f32
//! ```

use std::path::Path;

use glam::{Quat, Vec3};

use volley_core::constants::GEOMETRY_EPSILON;

use crate::error::CodecError;
use crate::library::CurveLibrary;
use crate::record::CurveRecord;

/// .vcl magic bytes.
const VCL_MAGIC: [u8; 4] = *b"VCLB";

/// Current format version.
const VCL_VERSION: u16 = 1;

/// Load a curve library from a .vcl file.
pub fn load_library(path: &Path) -> Result<CurveLibrary, CodecError> {
    let data = std::fs::read(path).map_err(|source| CodecError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let library = parse_library(&data)?;
    tracing::info!(
        target: "volley::curves",
        path = %path.display(),
        curves = library.len(),
        "library.loaded"
    );
    Ok(library)
}

/// Parse a curve library from a byte buffer.
pub fn parse_library(data: &[u8]) -> Result<CurveLibrary, CodecError> {
    let mut reader = ByteReader::new(data);
    reader.expect_header(VCL_MAGIC, VCL_VERSION)?;

    let curve_count = reader.u32("curve_count")? as usize;
    let mut curves = Vec::with_capacity(curve_count.min(data.len()));
    for index in 0..curve_count {
        let record = read_record(&mut reader)?;
        validate_record(index, &record)?;
        curves.push(record);
    }
    reader.finish()?;

    Ok(CurveLibrary::new(curves))
}

fn read_record(reader: &mut ByteReader<'_>) -> Result<CurveRecord, CodecError> {
    let point_count = reader.u32("point_count")? as usize;

    let sampled_points = reader.vec3_array("sampled_points")?;
    check_len("sampled_points", point_count, sampled_points.len())?;
    let sampled_tangents = reader.vec3_array("sampled_tangents")?;
    check_len("sampled_tangents", point_count, sampled_tangents.len())?;
    let cumulative_arc_lengths = reader.f32_array("cumulative_arc_lengths")?;
    check_len("cumulative_arc_lengths", point_count, cumulative_arc_lengths.len())?;

    Ok(CurveRecord {
        sampled_points,
        sampled_tangents,
        cumulative_arc_lengths,
        contact_point: reader.vec3("contact_point")?,
        distance_to_contact: reader.f32("distance_to_contact")?,
        total_arc_length: reader.f32("total_arc_length")?,
        arc_length_to_contact: reader.f32("arc_length_to_contact")?,
        contact_time_ratio: reader.f32("contact_time_ratio")?,
    })
}

/// Reject records a bake could never have produced.
fn validate_record(index: usize, record: &CurveRecord) -> Result<(), CodecError> {
    let invalid = |reason| Err(CodecError::InvalidRecord { index, reason });

    if record.sampled_points.len() < 2 {
        return invalid("fewer than 2 samples");
    }
    let scalars = [
        record.distance_to_contact,
        record.total_arc_length,
        record.arc_length_to_contact,
        record.contact_time_ratio,
    ];
    let vectors = record
        .sampled_points
        .iter()
        .chain(&record.sampled_tangents)
        .chain(std::iter::once(&record.contact_point));
    if !scalars.iter().all(|v| v.is_finite())
        || !vectors.into_iter().all(|v| v.is_finite())
        || !record.cumulative_arc_lengths.iter().all(|v| v.is_finite())
    {
        return invalid("non-finite value");
    }
    if record.distance_to_contact <= GEOMETRY_EPSILON {
        return invalid("distance_to_contact must be positive");
    }
    if record.total_arc_length <= GEOMETRY_EPSILON {
        return invalid("total_arc_length must be positive");
    }
    if record.arc_length_to_contact < 0.0
        || record.arc_length_to_contact > record.total_arc_length + GEOMETRY_EPSILON
    {
        return invalid("arc_length_to_contact outside [0, total_arc_length]");
    }
    if record.contact_time_ratio <= 0.0 || record.contact_time_ratio >= 1.0 {
        return invalid("contact_time_ratio outside (0, 1)");
    }

    let lengths = &record.cumulative_arc_lengths;
    if lengths.first().map_or(true, |first| first.abs() > GEOMETRY_EPSILON) {
        return invalid("cumulative_arc_lengths must start at 0");
    }
    if lengths.windows(2).any(|w| w[1] + GEOMETRY_EPSILON < w[0]) {
        return invalid("cumulative_arc_lengths must not decrease");
    }
    Ok(())
}

fn check_len(field: &'static str, expected: usize, found: usize) -> Result<(), CodecError> {
    if expected == found {
        Ok(())
    } else {
        Err(CodecError::LengthMismatch {
            field,
            expected,
            found,
        })
    }
}

/// Write a curve library to a .vcl file.
pub fn write_library(library: &CurveLibrary, path: &Path) -> Result<(), CodecError> {
    std::fs::write(path, serialize_library(library)).map_err(|source| CodecError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a curve library to .vcl bytes.
pub fn serialize_library(library: &CurveLibrary) -> Vec<u8> {
    let mut buf = ByteWriter::with_header(VCL_MAGIC, VCL_VERSION);
    buf.u32(library.len() as u32);

    for record in library.records() {
        buf.u32(record.sampled_points.len() as u32);
        buf.vec3_array(&record.sampled_points);
        buf.vec3_array(&record.sampled_tangents);
        buf.u32(record.cumulative_arc_lengths.len() as u32);
        for &len in &record.cumulative_arc_lengths {
            buf.f32(len);
        }
        buf.vec3(record.contact_point);
        buf.f32(record.distance_to_contact);
        buf.f32(record.total_arc_length);
        buf.f32(record.arc_length_to_contact);
        buf.f32(record.contact_time_ratio);
    }

    buf.into_bytes()
}

// --- Byte-level helpers shared with the keyframe codec ---

/// Bounds-checked little-endian cursor.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], CodecError> {
        let end = self.offset + N;
        let bytes = self
            .data
            .get(self.offset..end)
            .and_then(|slice| <[u8; N]>::try_from(slice).ok())
            .ok_or(CodecError::Truncated {
                field,
                offset: self.offset,
            })?;
        self.offset = end;
        Ok(bytes)
    }

    /// Check magic and version, then skip the reserved word.
    pub(crate) fn expect_header(&mut self, magic: [u8; 4], version: u16) -> Result<(), CodecError> {
        let found = self.take::<4>("magic")?;
        if found != magic {
            return Err(CodecError::BadMagic {
                expected: magic,
                found,
            });
        }
        let found_version = self.u16("version")?;
        if found_version != version {
            return Err(CodecError::UnsupportedVersion(found_version));
        }
        self.u16("reserved")?;
        Ok(())
    }

    pub(crate) fn u8(&mut self, field: &'static str) -> Result<u8, CodecError> {
        Ok(self.take::<1>(field)?[0])
    }

    pub(crate) fn u16(&mut self, field: &'static str) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.take(field)?))
    }

    pub(crate) fn u32(&mut self, field: &'static str) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.take(field)?))
    }

    pub(crate) fn f32(&mut self, field: &'static str) -> Result<f32, CodecError> {
        Ok(f32::from_le_bytes(self.take(field)?))
    }

    pub(crate) fn vec3(&mut self, field: &'static str) -> Result<Vec3, CodecError> {
        Ok(Vec3::new(self.f32(field)?, self.f32(field)?, self.f32(field)?))
    }

    pub(crate) fn quat(&mut self, field: &'static str) -> Result<Quat, CodecError> {
        Ok(Quat::from_xyzw(
            self.f32(field)?,
            self.f32(field)?,
            self.f32(field)?,
            self.f32(field)?,
        ))
    }

    /// Length-prefixed array count, rejected early if the remaining bytes
    /// cannot hold `element_size × len`.
    fn array_len(&mut self, field: &'static str, element_size: usize) -> Result<usize, CodecError> {
        let len = self.u32(field)? as usize;
        let remaining = self.data.len() - self.offset;
        if len.saturating_mul(element_size) > remaining {
            return Err(CodecError::Truncated {
                field,
                offset: self.offset,
            });
        }
        Ok(len)
    }

    pub(crate) fn vec3_array(&mut self, field: &'static str) -> Result<Vec<Vec3>, CodecError> {
        let len = self.array_len(field, 12)?;
        (0..len).map(|_| self.vec3(field)).collect()
    }

    pub(crate) fn f32_array(&mut self, field: &'static str) -> Result<Vec<f32>, CodecError> {
        let len = self.array_len(field, 4)?;
        (0..len).map(|_| self.f32(field)).collect()
    }

    /// Fail if any bytes are left unread.
    pub(crate) fn finish(&self) -> Result<(), CodecError> {
        match self.data.len() - self.offset {
            0 => Ok(()),
            trailing => Err(CodecError::TrailingBytes(trailing)),
        }
    }
}

/// Little-endian byte buffer builder.
pub(crate) struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Start a buffer with magic, version and a zero reserved word.
    pub(crate) fn with_header(magic: [u8; 4], version: u16) -> Self {
        let mut writer = Self { buf: Vec::new() };
        writer.buf.extend_from_slice(&magic);
        writer.u16(version);
        writer.u16(0);
        writer
    }

    pub(crate) fn u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub(crate) fn u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub(crate) fn u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub(crate) fn f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub(crate) fn vec3(&mut self, v: Vec3) {
        self.f32(v.x);
        self.f32(v.y);
        self.f32(v.z);
    }

    pub(crate) fn quat(&mut self, q: Quat) {
        self.f32(q.x);
        self.f32(q.y);
        self.f32(q.z);
        self.f32(q.w);
    }

    pub(crate) fn vec3_array(&mut self, values: &[Vec3]) {
        self.u32(values.len() as u32);
        for &v in values {
            self.vec3(v);
        }
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
