//! # Ionoptics
//!
//! Linear ion-optics for beamline design.
//!
//! This library provides:
//! - First-order transport matrices of drifts, quadrupoles and dipoles in
//!   transverse (4-D) and full (6-D) phase space
//! - Beamline composition and path-length sampling of the transfer matrix
//! - Thick-to-thin lens reduction (principal planes, focal lengths)
//! - Nelder-Mead search for quadrupole strengths that reach an imaging
//!   condition, with optional mirror symmetry
//! - Kicker and septum injection geometry
//! - A small text format for describing beamlines
//!
//! ## Architecture
//!
//! - [`matrix`] - Transport matrix storage and composition
//! - [`elements`] - Element matrices
//! - [`beamline`] - Element sequences, validation and path sampling
//! - [`lens`] - Principal planes and thin-lens equivalents
//! - [`solver`] - Strength binding, optimizer and threshold scan
//! - [`injection`] - Kicker and septum path lengths
//! - [`dsl`] - Parser for the beamline description language
//! - [`report`] - Tab-separated output (CLI only)
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! ionoptics triplet.beamline optimize --image p2par --symmetric
//! ionoptics triplet.beamline sample > envelope.tsv
//! ```
//!
//! ### Library
//!
//! ```
//! use ionoptics::{Beamline, Element, ImagingMode, OptimizerConfig, StrengthOptimizer};
//!
//! let template = Beamline::new(
//!     vec![
//!         Element::Drift,
//!         Element::focusing(0.0),
//!         Element::Drift,
//!         Element::defocusing(0.0),
//!         Element::Drift,
//!         Element::focusing(0.0),
//!         Element::Drift,
//!     ],
//!     vec![1.0, 0.5, 1.0, 0.5, 1.0, 0.5, 1.0],
//! )?;
//!
//! let config = OptimizerConfig::new()
//!     .with_imaging(ImagingMode::PointToParallel)
//!     .with_symmetric(true);
//! let result = StrengthOptimizer::with_config(config).optimize(&template)?;
//! assert_eq!(result.strengths.len(), 2);
//! # Ok::<(), ionoptics::OpticsError>(())
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmBeamline } from 'ionoptics';
//!
//! const line = new WasmBeamline(beamlineText);
//! const m = line.transfer_matrix();
//! ```
//!
//! ## Conventions
//!
//! Lengths are in m, angles in rad and quadrupole strengths `k` in 1/m².
//! Matrices act on `(x, x', y, y')`, extended by `(l, δ)` in 6-D. A
//! beamline `[E0, E1, ..., En]` composes to `Mn · ... · M1 · M0`.

pub mod beamline;
pub mod dsl;
pub mod elements;
pub mod error;
pub mod injection;
pub mod lens;
pub mod matrix;
pub mod solver;

#[cfg(feature = "cli")]
pub mod report;

// Re-export main types for convenience
pub use beamline::{sample, Beamline, PathSample, PathSampler, SamplePoint};
pub use elements::{dipole, drift, qdf, qf, quadrupole, Element};
pub use error::{OpticsError, Result};
pub use lens::{focal_lengths, principal_planes, thin_equivalent, PrincipalPlanes};
pub use matrix::{compose, Dimension, Plane, TransportMatrix};
pub use solver::{
    optimize_triplet, ImagingMode, OptimizedStrengths, OptimizerConfig, StrengthBinding, StrengthOptimizer,
    SymmetricTriplet, TripletPolarity,
};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmBeamline;
