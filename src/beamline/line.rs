//! Beamline structure.

use crate::dsl::BeamlineAst;
use crate::elements::Element;
use crate::error::{OpticsError, Result};
use crate::matrix::{compose, Dimension, TransportMatrix};

use super::validate::validate_beamline;

/// An ordered sequence of elements with their lengths.
///
/// The first element is the most upstream. `elements[i]` is evaluated over
/// `lengths[i]`; both lists always have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Beamline {
    elements: Vec<Element>,
    lengths: Vec<f64>,
    dimension: Dimension,
}

impl Beamline {
    /// Create a transverse (4-D) beamline.
    pub fn new(elements: Vec<Element>, lengths: Vec<f64>) -> Result<Self> {
        Self::with_dimension(elements, lengths, Dimension::Transverse)
    }

    /// Create a beamline in the given phase-space dimension.
    pub fn with_dimension(elements: Vec<Element>, lengths: Vec<f64>, dimension: Dimension) -> Result<Self> {
        let beamline = Self {
            elements,
            lengths,
            dimension,
        };
        validate_beamline(&beamline)?;
        Ok(beamline)
    }

    /// Build a beamline from a parsed description.
    pub fn from_ast(ast: &BeamlineAst) -> Result<Self> {
        let dimension = match (ast.dimension, ast.gamma) {
            (Some(6), gamma) => Dimension::Full {
                gamma: gamma.unwrap_or(f64::INFINITY),
            },
            (Some(4) | None, None) => Dimension::Transverse,
            (Some(4) | None, Some(_)) => {
                return Err(OpticsError::parameter(
                    "gamma",
                    ".gamma only applies to '.dimension 6' beamlines",
                ));
            }
            (Some(other), _) => {
                return Err(OpticsError::parameter(
                    "dimension",
                    format!("dimension must be 4 or 6, got {}", other),
                ));
            }
        };

        let elements = ast
            .elements
            .iter()
            .map(Element::from_def)
            .collect::<Result<Vec<_>>>()?;
        let lengths = ast.elements.iter().map(|def| def.length).collect();

        Self::with_dimension(elements, lengths, dimension)
    }

    /// The elements, upstream first.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// The element lengths, parallel to [`elements`](Self::elements).
    pub fn lengths(&self) -> &[f64] {
        &self.lengths
    }

    /// Phase-space dimension of every matrix this beamline produces.
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the beamline has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Total path length.
    pub fn total_length(&self) -> f64 {
        self.lengths.iter().sum()
    }

    /// Element indices of all quadrupoles, upstream first.
    pub fn quadrupole_slots(&self) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_quadrupole())
            .map(|(i, _)| i)
            .collect()
    }

    /// Full-length matrix of every element, upstream first.
    pub fn element_matrices(&self) -> Result<Vec<TransportMatrix>> {
        self.elements
            .iter()
            .zip(&self.lengths)
            .map(|(element, &length)| element.matrix(length, self.dimension))
            .collect()
    }

    /// Transfer matrix from the beamline entrance to its exit.
    pub fn transfer_matrix(&self) -> Result<TransportMatrix> {
        compose(&self.element_matrices()?)
    }

    /// A copy with the elements replaced, keeping lengths and dimension.
    pub(crate) fn with_elements(&self, elements: Vec<Element>) -> Result<Self> {
        Self::with_dimension(elements, self.lengths.clone(), self.dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl;
    use crate::elements::{drift, qf};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mismatched_lengths() {
        let result = Beamline::new(vec![Element::Drift, Element::Drift], vec![1.0]);
        assert!(matches!(result, Err(OpticsError::MalformedBeamline { .. })));
    }

    #[test]
    fn test_transfer_matrix_order() {
        let d = Dimension::Transverse;
        let line = Beamline::new(vec![Element::Drift, Element::focusing(2.0)], vec![1.0, 0.5]).unwrap();
        let expected = qf(0.5, 2.0, false, d).unwrap().mul(&drift(1.0, d)).unwrap();
        assert_eq!(line.transfer_matrix().unwrap(), expected);
        assert_abs_diff_eq!(line.total_length(), 1.5);
    }

    #[test]
    fn test_quadrupole_slots() {
        let line = Beamline::new(
            vec![Element::Drift, Element::focusing(1.0), Element::Drift, Element::defocusing(1.0)],
            vec![1.0, 0.2, 1.0, 0.2],
        )
        .unwrap();
        assert_eq!(line.quadrupole_slots(), vec![1, 3]);
    }

    #[test]
    fn test_from_ast() {
        let ast = dsl::parse(".dimension 6\n.gamma 2\nDRIFT D1 1.0\nQD Q1 0.5 k=1.5").unwrap();
        let line = Beamline::from_ast(&ast).unwrap();
        assert_eq!(line.dimension(), Dimension::Full { gamma: 2.0 });
        assert_eq!(line.elements()[1], Element::defocusing(1.5));
        assert_eq!(line.lengths(), &[1.0, 0.5]);
        assert_eq!(line.transfer_matrix().unwrap().size(), 6);
    }

    #[test]
    fn test_demo_files() {
        let triplet = Beamline::from_ast(&dsl::parse(include_str!("../../demos/triplet.beamline")).unwrap()).unwrap();
        assert_eq!(triplet.quadrupole_slots(), vec![1, 3, 5]);

        let bend = Beamline::from_ast(&dsl::parse(include_str!("../../demos/bend.beamline")).unwrap()).unwrap();
        assert_eq!(bend.dimension(), Dimension::Full { gamma: 1.05 });
        assert!(bend.transfer_matrix().is_ok());
    }

    #[test]
    fn test_from_ast_gamma_without_dimension() {
        let ast = dsl::parse(".gamma 2\nDRIFT D1 1.0").unwrap();
        assert!(Beamline::from_ast(&ast).is_err());
    }
}
