//! Ion-optical element models.
//!
//! This module provides transfer matrices for all supported elements:
//! - Drift: field-free propagation
//! - Quadrupole: focusing (`qf`) and defocusing (`qdf`) magnets, plus the
//!   unified signed-strength [`quadrupole`]
//! - Dipole: bending magnet with entry/exit edge focusing
//!
//! Each element is a stateless descriptor. Its length is supplied when the
//! matrix is evaluated, so the same descriptor can be evaluated over any part
//! of its length.

mod dipole;
mod drift;
mod quadrupole;

pub use dipole::{dipole, Dipole};
pub use drift::drift;
pub use quadrupole::{qdf, qf, quadrupole, Polarity, Quadrupole};

use std::fmt;

use crate::dsl::{ElementDef, ElementType};
use crate::error::{OpticsError, Result};
use crate::matrix::{Dimension, TransportMatrix};

/// A beamline element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Element {
    Drift,
    Quadrupole(Quadrupole),
    Dipole(Dipole),
}

impl Element {
    /// Horizontally focusing quadrupole of strength `k`.
    pub fn focusing(k: f64) -> Self {
        Element::Quadrupole(Quadrupole::new(Polarity::Focusing, k))
    }

    /// Horizontally defocusing quadrupole of strength `k`.
    pub fn defocusing(k: f64) -> Self {
        Element::Quadrupole(Quadrupole::new(Polarity::Defocusing, k))
    }

    /// Sector bend with perpendicular faces.
    pub fn sbend(arc_length: f64, bend_angle: f64) -> Self {
        Element::Dipole(Dipole::sector(arc_length, bend_angle))
    }

    /// Rectangular bend (face angles of half the bend angle).
    pub fn rbend(arc_length: f64, bend_angle: f64) -> Self {
        Element::Dipole(Dipole::rectangular(arc_length, bend_angle))
    }

    /// Create an element from a beamline description entry.
    ///
    /// The entry's length is not part of the element; it is collected by the
    /// beamline builder.
    pub fn from_def(def: &ElementDef) -> Result<Self> {
        let param = |key: &str| def.params.get(key).copied();
        let thin = param("thin").map(|v| v > 0.5).unwrap_or(false);

        match def.element_type {
            ElementType::Drift => Ok(Element::Drift),

            ElementType::FocusingQuad | ElementType::DefocusingQuad => {
                let k = param("k").unwrap_or(0.0);
                if k < 0.0 {
                    return Err(OpticsError::invalid_element(
                        &def.name,
                        def.line,
                        "quadrupole strength must be non-negative (use QF/QD for the sign)",
                    ));
                }
                let polarity = if def.element_type == ElementType::FocusingQuad {
                    Polarity::Focusing
                } else {
                    Polarity::Defocusing
                };
                Ok(Element::Quadrupole(Quadrupole::new(polarity, k).with_thin(thin)))
            }

            ElementType::SectorBend | ElementType::RectangularBend => {
                let angle = param("angle").ok_or_else(|| {
                    OpticsError::invalid_element(&def.name, def.line, "bend requires angle=<rad>")
                })?;
                let base = if def.element_type == ElementType::RectangularBend {
                    Dipole::rectangular(def.length, angle)
                } else {
                    Dipole::sector(def.length, angle)
                };
                let dipole = base.with_faces(
                    param("e1").unwrap_or(base.entry_face),
                    param("e2").unwrap_or(base.exit_face),
                );
                // Reject a zero angle or arc here, where the line number is known
                dipole
                    .radius()
                    .map_err(|e| OpticsError::invalid_element(&def.name, def.line, e.to_string()))?;
                Ok(Element::Dipole(dipole))
            }
        }
    }

    /// Transport matrix of this element over `length`.
    pub fn matrix(&self, length: f64, dimension: Dimension) -> Result<TransportMatrix> {
        match self {
            Element::Drift => Ok(drift(length, dimension)),
            Element::Quadrupole(q) => q.matrix(length, dimension),
            Element::Dipole(b) => b.matrix(length, dimension),
        }
    }

    /// Check if this element has an adjustable strength.
    pub fn is_quadrupole(&self) -> bool {
        matches!(self, Element::Quadrupole(_))
    }

    /// Replace the strength of a quadrupole; other elements are returned as is.
    pub fn with_strength(&self, k: f64) -> Self {
        match self {
            Element::Quadrupole(q) => Element::Quadrupole(Quadrupole { strength: k, ..*q }),
            other => *other,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Drift => write!(f, "drift"),
            Element::Quadrupole(q) => {
                let name = match q.polarity {
                    Polarity::Focusing => "qf",
                    Polarity::Defocusing => "qd",
                };
                write!(f, "{}(k={})", name, q.strength)?;
                if q.thin {
                    write!(f, " thin")?;
                }
                Ok(())
            }
            Element::Dipole(b) => write!(
                f,
                "dipole(angle={}, e1={}, e2={})",
                b.bend_angle, b.entry_face, b.exit_face
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn def(element_type: ElementType, length: f64, params: &[(&str, f64)]) -> ElementDef {
        ElementDef {
            element_type,
            name: "E1".to_string(),
            length,
            params: params.iter().map(|(k, v)| (k.to_string(), *v)).collect::<HashMap<_, _>>(),
            line: 1,
        }
    }

    #[test]
    fn test_quadrupole_slot_detection() {
        assert!(Element::focusing(1.0).is_quadrupole());
        assert!(Element::defocusing(1.0).is_quadrupole());
        assert!(!Element::Drift.is_quadrupole());
        assert!(!Element::sbend(1.0, 0.1).is_quadrupole());
    }

    #[test]
    fn test_with_strength_keeps_polarity() {
        let q = Element::defocusing(1.0).with_strength(3.0);
        match q {
            Element::Quadrupole(q) => {
                assert_eq!(q.polarity, Polarity::Defocusing);
                assert_eq!(q.strength, 3.0);
            }
            _ => panic!("expected quadrupole"),
        }
        assert_eq!(Element::Drift.with_strength(3.0), Element::Drift);
    }

    #[test]
    fn test_from_def() {
        let q = Element::from_def(&def(ElementType::FocusingQuad, 0.5, &[("k", 2.0), ("thin", 1.0)])).unwrap();
        assert_eq!(q, Element::Quadrupole(Quadrupole::new(Polarity::Focusing, 2.0).with_thin(true)));

        let b = Element::from_def(&def(ElementType::RectangularBend, 1.0, &[("angle", 0.4), ("e2", 0.0)])).unwrap();
        assert_eq!(b, Element::Dipole(Dipole::rectangular(1.0, 0.4).with_faces(0.2, 0.0)));
    }

    #[test]
    fn test_from_def_errors() {
        assert!(Element::from_def(&def(ElementType::SectorBend, 1.0, &[])).is_err());
        assert!(Element::from_def(&def(ElementType::SectorBend, 1.0, &[("angle", 0.0)])).is_err());
        assert!(Element::from_def(&def(ElementType::DefocusingQuad, 1.0, &[("k", -1.0)])).is_err());
    }

    #[test]
    fn test_matrix_dispatch() {
        let d = Dimension::Transverse;
        assert_eq!(Element::Drift.matrix(2.0, d).unwrap(), drift(2.0, d));
        assert_eq!(Element::defocusing(1.5).matrix(0.3, d).unwrap(), qdf(0.3, 1.5, false, d).unwrap());
    }
}
