//! Beamlines and path sampling.
//!
//! A [`Beamline`] pairs an ordered list of elements with their lengths and
//! fixes the phase-space dimension of every matrix built from it. The
//! [`PathSampler`] walks a beamline in uniform steps and records the
//! transfer matrix from the entrance to each position.

mod line;
mod sampler;
mod validate;

pub use line::Beamline;
pub use sampler::{
    decimal_places, sample, sampling_step, PathSample, PathSampler, SamplePoint, MAX_SAMPLING_DECIMALS,
};
pub use validate::validate_beamline;
