//! Thick-to-thin lens reduction.
//!
//! Any transverse block with a non-zero `M21` can be written as a thin lens
//! placed between two drifts:
//!
//! ```text
//! M = D(z2) · T · D(z1)      T = [[1, 0], [M21, 1]]
//! ```
//!
//! `z1` and `z2` locate the principal planes relative to the entrance and
//! exit of the system. Removing the drifts recovers the thin lens `T`.

use log::debug;

use crate::elements::drift;
use crate::error::{OpticsError, Result};
use crate::matrix::{compose, Dimension, Plane, TransportMatrix, TransverseBlock, MIN_COUPLING};

/// Principal-plane positions `(z1, z2)` of one plane.
///
/// `z1` is measured from the entrance, `z2` from the exit. Positive values lie
/// inside the system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrincipalPlanes {
    pub horizontal: (f64, f64),
    pub vertical: (f64, f64),
}

impl PrincipalPlanes {
    /// Principal planes of one transverse plane.
    pub fn plane(&self, plane: Plane) -> (f64, f64) {
        match plane {
            Plane::Horizontal => self.horizontal,
            Plane::Vertical => self.vertical,
        }
    }
}

/// Thin-lens focal lengths of each plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocalLengths {
    pub horizontal: f64,
    pub vertical: f64,
}

fn coupling(block: &TransverseBlock, plane: Plane) -> Result<f64> {
    if block.m21.abs() < MIN_COUPLING {
        return Err(OpticsError::DegenerateOptics { plane });
    }
    Ok(block.m21)
}

fn plane_positions(m: &TransportMatrix, plane: Plane) -> Result<(f64, f64)> {
    let block = m.block(plane);
    let m21 = coupling(&block, plane)?;
    Ok(((block.m22 - 1.0) / m21, (block.m11 - 1.0) / m21))
}

/// Principal-plane positions of a thick system, per plane.
///
/// Returns [`OpticsError::DegenerateOptics`] when a plane has no focusing
/// (`|M21|` below [`MIN_COUPLING`]), e.g. a pure drift.
pub fn principal_planes(m: &TransportMatrix) -> Result<PrincipalPlanes> {
    Ok(PrincipalPlanes {
        horizontal: plane_positions(m, Plane::Horizontal)?,
        vertical: plane_positions(m, Plane::Vertical)?,
    })
}

/// Thin-lens equivalents of a thick system, `(horizontal, vertical)`.
///
/// Each result is `compose([drift(-z1), M, drift(-z2)])` with that plane's
/// principal planes; the reduced plane becomes `[[1, 0], [M21, 1]]`. The
/// other plane of each result carries no meaning. Sandwich drifts use the
/// ultra-relativistic limit, so a 6-D longitudinal block is kept as in `M`.
pub fn thin_equivalent(m: &TransportMatrix) -> Result<(TransportMatrix, TransportMatrix)> {
    let planes = principal_planes(m)?;
    let dimension = match m.size() {
        6 => Dimension::Full { gamma: f64::INFINITY },
        _ => Dimension::Transverse,
    };

    let reduce = |(z1, z2): (f64, f64)| compose(&[drift(-z1, dimension), m.clone(), drift(-z2, dimension)]);

    debug!(
        "principal planes: horizontal ({:.6}, {:.6}), vertical ({:.6}, {:.6})",
        planes.horizontal.0, planes.horizontal.1, planes.vertical.0, planes.vertical.1
    );

    Ok((reduce(planes.horizontal)?, reduce(planes.vertical)?))
}

/// Thin-lens focal lengths `f = -1/M21` per plane.
///
/// Positive for a focusing plane.
pub fn focal_lengths(m: &TransportMatrix) -> Result<FocalLengths> {
    let focal = |plane| coupling(&m.block(plane), plane).map(|m21| -1.0 / m21);
    Ok(FocalLengths {
        horizontal: focal(Plane::Horizontal)?,
        vertical: focal(Plane::Vertical)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beamline::Beamline;
    use crate::elements::{quadrupole, Element};
    use approx::assert_abs_diff_eq;

    fn doublet() -> TransportMatrix {
        Beamline::new(
            vec![Element::focusing(1.8), Element::Drift, Element::defocusing(1.5)],
            vec![0.4, 0.6, 0.4],
        )
        .unwrap()
        .transfer_matrix()
        .unwrap()
    }

    fn assert_thin(block: TransverseBlock, m21: f64) {
        assert_abs_diff_eq!(block.m11, 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(block.m12, 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(block.m21, m21, epsilon = 1e-12);
        assert_abs_diff_eq!(block.m22, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_thin_equivalent_reduces_both_planes() {
        let m = doublet();
        let (h, v) = thin_equivalent(&m).unwrap();
        assert_thin(h.horizontal(), m.horizontal().m21);
        assert_thin(v.vertical(), m.vertical().m21);
    }

    #[test]
    fn test_thin_quadrupole_planes_at_centre() {
        // A thin lens is its own principal plane
        let m = quadrupole(0.5, 2.0, true, Dimension::Transverse).unwrap();
        let planes = principal_planes(&m).unwrap();
        assert_abs_diff_eq!(planes.horizontal.0, 0.0);
        assert_abs_diff_eq!(planes.horizontal.1, 0.0);
        assert_abs_diff_eq!(planes.plane(Plane::Vertical).0, 0.0);
    }

    #[test]
    fn test_thick_quadrupole_planes_symmetric() {
        let m = quadrupole(0.5, 2.0, false, Dimension::Transverse).unwrap();
        let planes = principal_planes(&m).unwrap();
        // symmetric element: equal distances from both faces
        assert_abs_diff_eq!(planes.horizontal.0, planes.horizontal.1, epsilon = 1e-12);
        assert_abs_diff_eq!(planes.vertical.0, planes.vertical.1, epsilon = 1e-12);
    }

    #[test]
    fn test_drift_is_degenerate() {
        let m = drift(2.0, Dimension::Transverse);
        assert!(matches!(
            principal_planes(&m),
            Err(OpticsError::DegenerateOptics {
                plane: Plane::Horizontal
            })
        ));
        assert!(thin_equivalent(&m).is_err());
        assert!(focal_lengths(&m).is_err());
    }

    #[test]
    fn test_focal_lengths_sign() {
        let m = quadrupole(0.2, 1.0, true, Dimension::Transverse).unwrap();
        let f = focal_lengths(&m).unwrap();
        assert_abs_diff_eq!(f.horizontal, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(f.vertical, -5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_full_dimension_keeps_longitudinal_block() {
        let d = Dimension::Full { gamma: 1.5 };
        let m = Beamline::with_dimension(
            vec![Element::Drift, Element::focusing(2.0), Element::Drift],
            vec![0.5, 0.3, 0.5],
            d,
        )
        .unwrap()
        .transfer_matrix()
        .unwrap();
        let (h, _) = thin_equivalent(&m).unwrap();
        assert_eq!(h.size(), 6);
        assert_abs_diff_eq!(h.get(4, 5), m.get(4, 5), epsilon = 1e-12);
        assert_thin(h.horizontal(), m.horizontal().m21);
    }
}
