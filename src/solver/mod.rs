//! Quadrupole strength optimization.
//!
//! Searches the quadrupole strengths of a template beamline that give a
//! required imaging condition at the beamline exit.
//!
//! ## Imaging conditions
//!
//! With the horizontal block `[[M11, M12], [M21, M22]]` (and `M33`..`M44`
//! vertically), a condition names the entries that must vanish in both
//! planes:
//!
//! ```text
//! point-to-point      M12 = M34 = 0     x_out independent of x'_in
//! point-to-parallel   M11 = M33 = 0     x_out independent of x_in
//! ```
//!
//! The residual is the sum of squares of those entries, minimized with
//! Nelder-Mead. A search succeeds when the residual is at most
//! `precision²`, so every nulled entry is within `precision` of zero.
//!
//! ## Symmetric templates
//!
//! A mirror-symmetric binding gives quadrupole `q` and quadrupole `n-1-q` the
//! same strength, halving the search space for symmetric lines such as a
//! triplet.

mod binding;
mod optimizer;
pub mod scan;
mod triplet;

pub use binding::StrengthBinding;
pub use optimizer::{ImagingMode, OptimizedStrengths, OptimizerConfig, StrengthOptimizer};
pub use triplet::{optimize_triplet, SymmetricTriplet, TripletPolarity};

/// Default tolerance on each nulled matrix entry.
pub const DEFAULT_PRECISION: f64 = 1e-3;

/// Default Nelder-Mead iteration cap.
pub const DEFAULT_MAX_ITERATIONS: u64 = 100;

/// Starting strength (1/m²) of every free parameter when no guess is given.
pub const DEFAULT_INITIAL_STRENGTH: f64 = 2.0;

/// Relative offset of the initial simplex vertices along each axis.
pub const SIMPLEX_STEP: f64 = 0.05;

/// Absolute simplex offset for a zero starting value.
pub const SIMPLEX_ZERO_STEP: f64 = 0.00025;
