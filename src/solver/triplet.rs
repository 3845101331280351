//! Symmetric quadrupole triplet.

use crate::beamline::Beamline;
use crate::elements::Element;
use crate::error::Result;

use super::optimizer::{ImagingMode, OptimizedStrengths, OptimizerConfig, StrengthOptimizer};

/// Polarity pattern of a triplet, upstream first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TripletPolarity {
    #[default]
    FocusDefocusFocus,
    DefocusFocusDefocus,
}

/// Geometry of a mirror-symmetric triplet (lengths in m).
///
/// ```text
/// | outer | Q1 | gap | Q2 | gap | Q1 | outer |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetricTriplet {
    /// Drift before the first and after the last quadrupole
    pub outer_drift: f64,
    /// Length of the two outer quadrupoles
    pub quad_length: f64,
    /// Length of the centre quadrupole
    pub center_length: f64,
    /// Drift between neighbouring quadrupoles
    pub gap: f64,
    pub polarity: TripletPolarity,
}

impl SymmetricTriplet {
    /// Template beamline with zero strengths.
    pub fn template(&self) -> Result<Beamline> {
        let (outer, center) = match self.polarity {
            TripletPolarity::FocusDefocusFocus => (Element::focusing(0.0), Element::defocusing(0.0)),
            TripletPolarity::DefocusFocusDefocus => (Element::defocusing(0.0), Element::focusing(0.0)),
        };
        Beamline::new(
            vec![Element::Drift, outer, Element::Drift, center, Element::Drift, outer, Element::Drift],
            vec![
                self.outer_drift,
                self.quad_length,
                self.gap,
                self.center_length,
                self.gap,
                self.quad_length,
                self.outer_drift,
            ],
        )
    }
}

/// Strengths `(outer, centre)` imaging a symmetric triplet.
///
/// `initial` defaults to 2.0 for both strengths.
pub fn optimize_triplet(
    triplet: &SymmetricTriplet,
    imaging: ImagingMode,
    precision: f64,
    max_iterations: u64,
    initial: Option<[f64; 2]>,
) -> Result<OptimizedStrengths> {
    let mut config = OptimizerConfig::new()
        .with_imaging(imaging)
        .with_symmetric(true)
        .with_precision(precision)
        .with_max_iterations(max_iterations);
    if let Some(guess) = initial {
        config = config.with_initial_guess(guess.to_vec());
    }
    StrengthOptimizer::with_config(config).optimize(&triplet.template()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OpticsError;
    use crate::solver::{DEFAULT_MAX_ITERATIONS, DEFAULT_PRECISION};
    use approx::assert_abs_diff_eq;

    fn geometry() -> SymmetricTriplet {
        SymmetricTriplet {
            outer_drift: 1.0,
            quad_length: 0.5,
            center_length: 0.5,
            gap: 1.0,
            polarity: TripletPolarity::FocusDefocusFocus,
        }
    }

    #[test]
    fn test_template_layout() {
        let line = geometry().template().unwrap();
        assert_eq!(line.len(), 7);
        assert_eq!(line.quadrupole_slots(), vec![1, 3, 5]);
        assert_eq!(line.elements()[3], Element::defocusing(0.0));
        assert_abs_diff_eq!(line.total_length(), 5.5);
    }

    #[test]
    fn test_point_to_parallel_triplet() {
        let result = optimize_triplet(
            &geometry(),
            ImagingMode::PointToParallel,
            DEFAULT_PRECISION,
            DEFAULT_MAX_ITERATIONS,
            Some([2.0, 2.0]),
        )
        .unwrap();

        assert_eq!(result.strengths.len(), 2);
        assert_abs_diff_eq!(result.strengths[0], 2.99, epsilon = 0.05);
        assert_abs_diff_eq!(result.strengths[1], 2.21, epsilon = 0.05);

        let m = result.beamline.transfer_matrix().unwrap();
        assert!(m.get(0, 0).abs() < DEFAULT_PRECISION);
        assert!(m.get(2, 2).abs() < DEFAULT_PRECISION);
    }

    #[test]
    fn test_unreachable_precision() {
        let result = optimize_triplet(&geometry(), ImagingMode::PointToParallel, 1e-12, 3, None);
        assert!(matches!(result, Err(OpticsError::ConvergenceFailure { .. })));
    }

    #[test]
    fn test_negative_length_rejected() {
        let triplet = SymmetricTriplet {
            gap: -0.5,
            ..geometry()
        };
        assert!(optimize_triplet(&triplet, ImagingMode::PointToPoint, 1e-3, 10, None).is_err());
    }
}
