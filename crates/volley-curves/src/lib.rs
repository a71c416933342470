//! Bézier trajectory engine for the volley swarm.
//!
//! - `bezier`: curve evaluation, derivatives and adaptive arc length
//! - `record`: immutable baked curves
//! - `library`: curve selection and fitting onto live start/target pairs
//! - `codec`: .vcl curve library format
//! - `keyframes`: swing keyframe sets and the .vkf format

pub mod bezier;
pub mod codec;
pub mod error;
pub mod keyframes;
pub mod library;
pub mod record;

pub use error::{CodecError, CurveError};
pub use keyframes::{SwingKeyframe, SwingKeyframeSet};
pub use library::{CurveLibrary, FittedCurve};
pub use record::{CumulativeMode, CurveRecord};

#[cfg(test)]
mod tests;
