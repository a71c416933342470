//! Error types for curve math, library selection and the binary codecs.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    #[error("unsupported bezier shape: {0} control points (expected 3, 4 or 5)")]
    UnsupportedControlPoints(usize),
    #[error("at least 2 samples are required, got {0}")]
    TooFewSamples(usize),
    #[error("contact parameter must lie strictly inside (0, 1), got {0}")]
    ContactOutOfRange(f32),
    #[error("curve library is empty")]
    NoCurveAvailable,
    #[error("curve index {index} out of range for library of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("curve has zero length")]
    DegenerateCurve,
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("bad magic bytes: expected {expected:?}, found {found:?}")]
    BadMagic { expected: [u8; 4], found: [u8; 4] },
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),
    #[error("unexpected end of data reading {field} at byte {offset}")]
    Truncated { field: &'static str, offset: usize },
    #[error("{field} has {found} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("curve record {index} is invalid: {reason}")]
    InvalidRecord { index: usize, reason: &'static str },
    #[error("{0} trailing bytes after the last record")]
    TrailingBytes(usize),
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
