//! Quadrupole magnets.
//!
//! A quadrupole with strength `k > 0` focuses one transverse plane and
//! defocuses the other. With `ω = √k`:
//!
//! ```text
//! focusing block:    [ cos ωL        sin ωL / ω ]
//!                    [ -ω sin ωL     cos ωL     ]
//!
//! defocusing block:  [ cosh ωL       sinh ωL / ω ]
//!                    [ ω sinh ωL     cosh ωL     ]
//! ```
//!
//! The thin-lens approximation keeps only the first-order kick:
//! `[[1, 0], [∓kL, 1]]`.

use crate::error::{OpticsError, Result};
use crate::matrix::{Dimension, TransportMatrix, TransverseBlock};

use super::drift::drift;

/// Which plane a quadrupole focuses for positive strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// Focuses horizontally, defocuses vertically (`qf`).
    Focusing,
    /// Defocuses horizontally, focuses vertically (`qdf`).
    Defocusing,
}

impl Polarity {
    /// Sign applied to the strength when evaluating through [`quadrupole`].
    pub fn sign(&self) -> f64 {
        match self {
            Polarity::Focusing => 1.0,
            Polarity::Defocusing => -1.0,
        }
    }
}

/// A quadrupole descriptor (length is supplied per evaluation).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrupole {
    pub polarity: Polarity,
    /// Strength k (1/m²), non-negative by convention
    pub strength: f64,
    /// Use the first-order thin-lens matrix
    pub thin: bool,
}

impl Quadrupole {
    pub fn new(polarity: Polarity, strength: f64) -> Self {
        Self {
            polarity,
            strength,
            thin: false,
        }
    }

    /// Switch to the thin-lens approximation.
    pub fn with_thin(mut self, thin: bool) -> Self {
        self.thin = thin;
        self
    }

    /// Signed strength: positive focuses horizontally.
    pub fn signed_strength(&self) -> f64 {
        self.polarity.sign() * self.strength
    }

    /// Transport matrix over `length`.
    pub fn matrix(&self, length: f64, dimension: Dimension) -> Result<TransportMatrix> {
        quadrupole(length, self.signed_strength(), self.thin, dimension)
    }
}

fn focusing_block(length: f64, omega: f64) -> TransverseBlock {
    let (s, c) = (omega * length).sin_cos();
    TransverseBlock {
        m11: c,
        m12: s / omega,
        m21: -omega * s,
        m22: c,
    }
}

fn defocusing_block(length: f64, omega: f64) -> TransverseBlock {
    let phi = omega * length;
    let (sh, ch) = (phi.sinh(), phi.cosh());
    TransverseBlock {
        m11: ch,
        m12: sh / omega,
        m21: omega * sh,
        m22: ch,
    }
}

fn thin_block(kick: f64) -> TransverseBlock {
    TransverseBlock {
        m11: 1.0,
        m12: 0.0,
        m21: kick,
        m22: 1.0,
    }
}

fn check_finite(length: f64, strength: f64) -> Result<()> {
    if !length.is_finite() {
        return Err(OpticsError::geometry(format!("quadrupole length must be finite, got {}", length)));
    }
    if !strength.is_finite() {
        return Err(OpticsError::parameter("k", format!("quadrupole strength must be finite, got {}", strength)));
    }
    Ok(())
}

/// Transport matrix of a quadrupole with signed strength.
///
/// `k > 0` focuses horizontally, `k < 0` focuses vertically with `|k|`.
/// `k == 0` returns exactly the drift matrix of the same length; the
/// `1/√k` terms are never evaluated.
///
/// With `thin` set, both blocks become `[[1, 0], [∓kL, 1]]` (horizontal kick
/// `-kL`, vertical kick `+kL`) and the longitudinal block is identity.
///
/// Fails with [`OpticsError::InvalidParameter`] when `√|k|·L` is so large
/// that `cosh`/`sinh` overflow (beyond about 710).
pub fn quadrupole(length: f64, k: f64, thin: bool, dimension: Dimension) -> Result<TransportMatrix> {
    check_finite(length, k)?;

    if thin {
        let kick = k * length;
        return Ok(TransportMatrix::from_blocks(dimension, thin_block(-kick), thin_block(kick)));
    }

    if k == 0.0 {
        return Ok(drift(length, dimension));
    }

    let omega = k.abs().sqrt();
    let (horizontal, vertical) = if k > 0.0 {
        (focusing_block(length, omega), defocusing_block(length, omega))
    } else {
        (defocusing_block(length, omega), focusing_block(length, omega))
    };

    if !horizontal.entries().iter().chain(&vertical.entries()).all(|v| v.is_finite()) {
        return Err(OpticsError::parameter(
            "k",
            format!("strength {} over length {} overflows the hyperbolic terms", k, length),
        ));
    }

    let mut m = TransportMatrix::from_blocks(dimension, horizontal, vertical);
    if let Dimension::Full { .. } = dimension {
        m.set(4, 5, length * dimension.inverse_gamma_squared());
    }
    Ok(m)
}

/// Horizontally focusing quadrupole (`k >= 0`).
pub fn qf(length: f64, k: f64, thin: bool, dimension: Dimension) -> Result<TransportMatrix> {
    if k < 0.0 {
        return Err(OpticsError::parameter(
            "k",
            format!("qf expects a non-negative strength, got {} (use quadrupole for signed k)", k),
        ));
    }
    quadrupole(length, k, thin, dimension)
}

/// Horizontally defocusing quadrupole (`k >= 0`).
pub fn qdf(length: f64, k: f64, thin: bool, dimension: Dimension) -> Result<TransportMatrix> {
    if k < 0.0 {
        return Err(OpticsError::parameter(
            "k",
            format!("qdf expects a non-negative strength, got {} (use quadrupole for signed k)", k),
        ));
    }
    quadrupole(length, -k, thin, dimension)
}
