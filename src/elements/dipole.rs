//! Bending dipole with edge focusing.
//!
//! The dipole is described by its full arc length `L_max` and total bend
//! angle; the bend radius is `ρ₀ = L_max / angle`. Evaluating the matrix over
//! a partial length `L` bends by `α = L / ρ₀`, which is what the path sampler
//! needs inside the magnet.
//!
//! Face angles add thin edge lenses with strength `tan(e) / ρ₀`
//! (`E21 = tan e / ρ₀`, `E43 = -tan e / ρ₀`): defocusing horizontally and
//! focusing vertically for positive `e`. The vertical edge term is only
//! approximate.
//!
//! Both edges are applied at every evaluated length. The result is exact at
//! the magnet exit and only approximate for intermediate lengths, where a
//! real trajectory has not yet crossed the exit face.

use crate::error::{OpticsError, Result};
use crate::matrix::{compose, Dimension, TransportMatrix, TransverseBlock};

use super::drift::drift_block;

/// A sector/rectangular bending magnet descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dipole {
    /// Full arc length of the magnet (m)
    pub arc_length: f64,
    /// Total bend angle over the full arc (rad)
    pub bend_angle: f64,
    /// Entry face angle (rad)
    pub entry_face: f64,
    /// Exit face angle (rad)
    pub exit_face: f64,
}

impl Dipole {
    /// Sector bend: both faces perpendicular to the reference orbit.
    pub fn sector(arc_length: f64, bend_angle: f64) -> Self {
        Self {
            arc_length,
            bend_angle,
            entry_face: 0.0,
            exit_face: 0.0,
        }
    }

    /// Rectangular bend: both face angles equal half the bend angle.
    pub fn rectangular(arc_length: f64, bend_angle: f64) -> Self {
        Self {
            arc_length,
            bend_angle,
            entry_face: bend_angle / 2.0,
            exit_face: bend_angle / 2.0,
        }
    }

    /// Set the face angles.
    pub fn with_faces(mut self, entry_face: f64, exit_face: f64) -> Self {
        self.entry_face = entry_face;
        self.exit_face = exit_face;
        self
    }

    /// Bend radius `ρ₀ = L_max / angle`.
    pub fn radius(&self) -> Result<f64> {
        if !self.arc_length.is_finite() || self.arc_length <= 0.0 {
            return Err(OpticsError::geometry(format!(
                "dipole arc length must be positive, got {}",
                self.arc_length
            )));
        }
        if !self.bend_angle.is_finite() || self.bend_angle == 0.0 {
            return Err(OpticsError::geometry(format!(
                "dipole bend angle must be finite and non-zero, got {}",
                self.bend_angle
            )));
        }
        Ok(self.arc_length / self.bend_angle)
    }

    /// Transport matrix over `length` of the arc.
    pub fn matrix(&self, length: f64, dimension: Dimension) -> Result<TransportMatrix> {
        dipole(
            length,
            self.arc_length,
            self.bend_angle,
            self.entry_face,
            self.exit_face,
            dimension,
        )
    }
}

fn edge(face_angle: f64, rho: f64, dimension: Dimension) -> TransportMatrix {
    let kick = face_angle.tan() / rho;
    TransportMatrix::from_blocks(
        dimension,
        TransverseBlock {
            m11: 1.0,
            m12: 0.0,
            m21: kick,
            m22: 1.0,
        },
        TransverseBlock {
            m11: 1.0,
            m12: 0.0,
            m21: -kick,
            m22: 1.0,
        },
    )
}

fn body(length: f64, rho: f64, dimension: Dimension) -> TransportMatrix {
    let alpha = length / rho;
    let (s, c) = alpha.sin_cos();
    let horizontal = TransverseBlock {
        m11: c,
        m12: rho * s,
        m21: -s / rho,
        m22: c,
    };
    let mut m = TransportMatrix::from_blocks(dimension, horizontal, drift_block(length));

    if let Dimension::Full { .. } = dimension {
        m.set(0, 5, rho * (1.0 - c));
        m.set(1, 5, s);
        m.set(4, 0, -s);
        m.set(4, 1, -rho * (1.0 - c));
        m.set(4, 5, length * dimension.inverse_gamma_squared() - rho * (alpha - s));
    }
    m
}

/// Transport matrix of a dipole evaluated over `length` of its arc.
///
/// `arc_length` and `bend_angle` describe the full magnet; `length` may be
/// any part of it. The result is `compose([entry edge, body, exit edge])`.
pub fn dipole(
    length: f64,
    arc_length: f64,
    bend_angle: f64,
    entry_face: f64,
    exit_face: f64,
    dimension: Dimension,
) -> Result<TransportMatrix> {
    let rho = Dipole::sector(arc_length, bend_angle).radius()?;
    if !length.is_finite() {
        return Err(OpticsError::geometry(format!("dipole length must be finite, got {}", length)));
    }

    compose(&[
        edge(entry_face, rho, dimension),
        body(length, rho, dimension),
        edge(exit_face, rho, dimension),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::PI;

    const T: Dimension = Dimension::Transverse;

    #[test]
    fn test_sector_bend_body() {
        let m = dipole(1.0, 1.0, 0.5, 0.0, 0.0, T).unwrap();
        let rho = 2.0;
        assert_relative_eq!(m.get(0, 0), 0.5f64.cos());
        assert_relative_eq!(m.get(0, 1), rho * 0.5f64.sin());
        assert_relative_eq!(m.get(1, 0), -0.5f64.sin() / rho);
        // Vertical plane is a drift
        assert_eq!(m.vertical().entries(), [1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_partial_length_rescales_angle() {
        // Half the arc of a 90 degree bend is a 45 degree bend with the same radius
        let half = dipole(0.5, 1.0, PI / 2.0, 0.0, 0.0, T).unwrap();
        let rho = 1.0 / (PI / 2.0);
        assert_relative_eq!(half.get(0, 0), (PI / 4.0).cos(), epsilon = 1e-12);
        assert_relative_eq!(half.get(0, 1), rho * (PI / 4.0).sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_edge_focusing_composition() {
        let e = 0.2_f64;
        let rho = 2.0;
        let m = dipole(1.0, 1.0, 0.5, e, e, T).unwrap();
        let expected = compose(&[edge(e, rho, T), body(1.0, rho, T), edge(e, rho, T)]).unwrap();
        assert_eq!(m, expected);

        // Vertical: drift sandwiched by two focusing kicks
        let kick = e.tan() / rho;
        assert_abs_diff_eq!(m.get(2, 2), 1.0 - kick, epsilon = 1e-12);
        assert_abs_diff_eq!(m.get(3, 2), -2.0 * kick + kick * kick, epsilon = 1e-12);
    }

    #[test]
    fn test_rectangular_faces() {
        let b = Dipole::rectangular(2.0, 0.4);
        assert_eq!(b.entry_face, 0.2);
        assert_eq!(b.exit_face, 0.2);
    }

    #[test]
    fn test_invalid_geometry() {
        assert!(matches!(dipole(1.0, 0.0, 0.5, 0.0, 0.0, T), Err(OpticsError::InvalidGeometry { .. })));
        assert!(matches!(dipole(1.0, 1.0, 0.0, 0.0, 0.0, T), Err(OpticsError::InvalidGeometry { .. })));
        assert!(matches!(dipole(1.0, -1.0, 0.5, 0.0, 0.0, T), Err(OpticsError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_dispersion_terms() {
        let m = dipole(1.0, 1.0, 0.5, 0.0, 0.0, Dimension::Full { gamma: f64::INFINITY }).unwrap();
        let rho = 2.0;
        let alpha = 0.5f64;
        assert_relative_eq!(m.get(0, 5), rho * (1.0 - alpha.cos()));
        assert_relative_eq!(m.get(1, 5), alpha.sin());
        assert_relative_eq!(m.get(4, 0), -alpha.sin());
        assert_relative_eq!(m.get(4, 5), -rho * (alpha - alpha.sin()));
        // No vertical dispersion
        assert_eq!(m.get(2, 5), 0.0);
    }

    #[test]
    fn test_six_dimensional_body_is_symplectic() {
        // R51 and R52 follow from R16 and R26 for a symplectic map
        let m = dipole(0.8, 1.2, 0.6, 0.0, 0.0, Dimension::Full { gamma: 3.0 }).unwrap();
        let r51 = -(m.get(0, 0) * m.get(1, 5) - m.get(1, 0) * m.get(0, 5));
        let r52 = -(m.get(0, 1) * m.get(1, 5) - m.get(1, 1) * m.get(0, 5));
        assert_abs_diff_eq!(m.get(4, 0), r51, epsilon = 1e-12);
        assert_abs_diff_eq!(m.get(4, 1), r52, epsilon = 1e-12);
    }
}
