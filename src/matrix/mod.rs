//! Transport matrices and their composition.
//!
//! A transport matrix maps the phase-space vector at the entrance of an
//! element to the vector at its exit. Coordinates are ordered
//!
//! ```text
//! (x, x', y, y')            Dimension::Transverse
//! (x, x', y, y', l, δ)      Dimension::Full { gamma }
//! ```
//!
//! The horizontal block occupies indices 0-1, the vertical block 2-3. In the
//! 6-D variant the longitudinal pair (4-5) is coupled to the horizontal plane
//! through dispersion terms of bending magnets.
//!
//! Matrices are plain values. Composition produces a new matrix and leaves
//! its inputs untouched.

mod compose;
mod transport;

pub use compose::compose;
pub use transport::{Dimension, Plane, TransportMatrix, TransverseBlock};

/// Threshold below which an angle-coupling term counts as zero.
pub const MIN_COUPLING: f64 = 1e-15;
