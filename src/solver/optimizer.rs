//! Nelder-Mead search for imaging strengths.

use std::collections::BTreeMap;
use std::fmt;

use argmin::core::{CostFunction, Executor, State};
use argmin::solver::neldermead::NelderMead;
use log::{debug, warn};

use crate::beamline::Beamline;
use crate::error::{OpticsError, Result};
use crate::matrix::TransportMatrix;

use super::binding::StrengthBinding;
use super::{DEFAULT_INITIAL_STRENGTH, DEFAULT_MAX_ITERATIONS, DEFAULT_PRECISION, SIMPLEX_STEP, SIMPLEX_ZERO_STEP};

/// Imaging condition at the beamline exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImagingMode {
    /// `M12 = M34 = 0`: a point at the entrance is imaged to a point.
    PointToPoint,
    /// `M11 = M33 = 0`: a point at the entrance leaves as a parallel beam.
    #[default]
    PointToParallel,
}

impl ImagingMode {
    /// Flat row-major indices of the nulled entries in a matrix of `size`.
    fn nulled(&self, size: usize) -> [usize; 2] {
        match self {
            ImagingMode::PointToPoint => [1, 2 * size + 3],
            ImagingMode::PointToParallel => [0, 2 * size + 2],
        }
    }

    /// Sum of squares of the nulled entries.
    pub fn residual(&self, m: &TransportMatrix) -> f64 {
        let data = m.as_slice();
        self.nulled(m.size()).iter().map(|&i| data[i] * data[i]).sum()
    }
}

impl fmt::Display for ImagingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImagingMode::PointToPoint => write!(f, "point-to-point"),
            ImagingMode::PointToParallel => write!(f, "point-to-parallel"),
        }
    }
}

/// Configuration for the strength optimizer.
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Imaging condition to reach.
    pub imaging: ImagingMode,
    /// Mirror-symmetric strength binding.
    pub symmetric: bool,
    /// Tolerance on each nulled entry.
    pub precision: f64,
    /// Nelder-Mead iteration cap.
    pub max_iterations: u64,
    /// Starting point; `None` starts every free parameter at 2.0.
    pub initial_guess: Option<Vec<f64>>,
    /// Fixed values by free-parameter index.
    pub fixed: BTreeMap<usize, f64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            imaging: ImagingMode::default(),
            symmetric: false,
            precision: DEFAULT_PRECISION,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            initial_guess: None,
            fixed: BTreeMap::new(),
        }
    }
}

impl OptimizerConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_imaging(mut self, imaging: ImagingMode) -> Self {
        self.imaging = imaging;
        self
    }

    pub fn with_symmetric(mut self, symmetric: bool) -> Self {
        self.symmetric = symmetric;
        self
    }

    /// Set the tolerance on each nulled entry.
    ///
    /// The search stops once the residual drops to `precision²`.
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_initial_guess(mut self, initial_guess: Vec<f64>) -> Self {
        self.initial_guess = Some(initial_guess);
        self
    }

    /// Hold one free parameter at `value`.
    pub fn with_fixed(mut self, index: usize, value: f64) -> Self {
        self.fixed.insert(index, value);
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.precision.is_finite() && self.precision > 0.0) {
            return Err(OpticsError::parameter(
                "precision",
                format!("precision must be positive, got {}", self.precision),
            ));
        }
        if self.max_iterations == 0 {
            return Err(OpticsError::parameter("max_iterations", "iteration cap must be at least 1"));
        }
        Ok(())
    }
}

/// A successful strength search.
#[derive(Debug, Clone)]
pub struct OptimizedStrengths {
    /// Free parameters, fixed values written in.
    pub strengths: Vec<f64>,
    /// Strength of every quadrupole slot, upstream first.
    pub slot_strengths: Vec<f64>,
    /// Residual at the solution.
    pub residual: f64,
    /// Nelder-Mead iterations used.
    pub iterations: u64,
    /// The template with the solution bound in.
    pub beamline: Beamline,
}

/// Residual of a bound template, as seen by the minimizer.
struct ImagingResidual<'a> {
    binding: &'a StrengthBinding,
    imaging: ImagingMode,
}

impl ImagingResidual<'_> {
    fn evaluate(&self, free: &[f64]) -> Result<f64> {
        let m = match self.binding.bind(free)?.transfer_matrix() {
            Ok(m) => m,
            // cosh overflow at extreme strengths
            Err(OpticsError::InvalidParameter { ref param, .. }) if param == "k" => return Ok(f64::MAX),
            Err(e) => return Err(e),
        };
        let residual = self.imaging.residual(&m);
        Ok(if residual.is_finite() { residual } else { f64::MAX })
    }
}

impl CostFunction for ImagingResidual<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        self.evaluate(param).map_err(argmin::core::Error::from)
    }
}

/// Searches quadrupole strengths for an imaging condition.
#[derive(Debug, Clone, Default)]
pub struct StrengthOptimizer {
    config: OptimizerConfig,
}

impl StrengthOptimizer {
    /// Create an optimizer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an optimizer with custom configuration.
    pub fn with_config(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Search strengths for `template`.
    ///
    /// The template's own quadrupole strengths are ignored; its polarities,
    /// lengths and other elements are kept. Fails with
    /// [`OpticsError::ConvergenceFailure`] if the residual is still above
    /// `precision²` when the search stops.
    pub fn optimize(&self, template: &Beamline) -> Result<OptimizedStrengths> {
        let config = &self.config;
        config.validate()?;

        let binding = StrengthBinding::new(template, config.symmetric, &config.fixed)?;
        let initial = match &config.initial_guess {
            Some(guess) => {
                if guess.len() != binding.free_count() {
                    return Err(OpticsError::parameter(
                        "initial_guess",
                        format!(
                            "expected {} starting values, got {}",
                            binding.free_count(),
                            guess.len()
                        ),
                    ));
                }
                guess.clone()
            }
            None => vec![DEFAULT_INITIAL_STRENGTH; binding.free_count()],
        };

        let target = config.precision * config.precision;
        debug!(
            "optimizing {} quadrupoles ({} free) for {}, target residual {:e}",
            binding.slot_count(),
            binding.free_count(),
            config.imaging,
            target
        );

        let problem = ImagingResidual {
            binding: &binding,
            imaging: config.imaging,
        };

        // Evaluate the start first so binding errors surface unwrapped
        let start_residual = problem.evaluate(&initial)?;
        let (best, residual, iterations, reason) = if start_residual <= target {
            (initial, start_residual, 0, "initial guess satisfies precision".to_string())
        } else {
            let solver: NelderMead<Vec<f64>, f64> = NelderMead::new(initial_simplex(&initial));
            let result = Executor::new(problem, solver)
                .configure(|state| state.max_iters(config.max_iterations).target_cost(target))
                .run()?;

            let state = result.state();
            let best = state
                .get_best_param()
                .cloned()
                .ok_or_else(|| OpticsError::Minimizer {
                    message: "minimizer returned no parameters".to_string(),
                })?;
            let reason = state
                .get_termination_reason()
                .map(|r| format!("{:?}", r))
                .unwrap_or_else(|| "not terminated".to_string());
            (best, state.get_best_cost(), state.get_iter(), reason)
        };

        if residual > target {
            warn!(
                "no {} solution after {} iterations (residual {:e}, target {:e})",
                config.imaging, iterations, residual, target
            );
            return Err(OpticsError::convergence_failure(iterations, residual, reason));
        }

        debug!("converged in {} iterations, residual {:e}", iterations, residual);

        Ok(OptimizedStrengths {
            strengths: binding.apply_fixed(&best)?,
            slot_strengths: binding.resolve(&best)?,
            residual,
            iterations,
            beamline: binding.bind(&best)?,
        })
    }
}

/// Start vertex plus one vertex per axis, offset by 5 % of that coordinate.
fn initial_simplex(x0: &[f64]) -> Vec<Vec<f64>> {
    let mut simplex = Vec::with_capacity(x0.len() + 1);
    simplex.push(x0.to_vec());
    for i in 0..x0.len() {
        let mut vertex = x0.to_vec();
        vertex[i] = if vertex[i] != 0.0 {
            vertex[i] * (1.0 + SIMPLEX_STEP)
        } else {
            SIMPLEX_ZERO_STEP
        };
        simplex.push(vertex);
    }
    simplex
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Element;
    use approx::assert_abs_diff_eq;

    fn triplet_template() -> Beamline {
        Beamline::new(
            vec![
                Element::Drift,
                Element::focusing(0.0),
                Element::Drift,
                Element::defocusing(0.0),
                Element::Drift,
                Element::focusing(0.0),
                Element::Drift,
            ],
            vec![1.0, 0.5, 1.0, 0.5, 1.0, 0.5, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_residual_entries() {
        let m = TransportMatrix::from_rows(&[
            &[0.1, 0.2, 0.0, 0.0],
            &[0.0, 1.0, 0.0, 0.0],
            &[0.0, 0.0, 0.3, 0.4],
            &[0.0, 0.0, 0.0, 1.0],
        ])
        .unwrap();
        assert_abs_diff_eq!(ImagingMode::PointToParallel.residual(&m), 0.01 + 0.09, epsilon = 1e-15);
        assert_abs_diff_eq!(ImagingMode::PointToPoint.residual(&m), 0.04 + 0.16, epsilon = 1e-15);
    }

    #[test]
    fn test_residual_full_dimension() {
        let mut m = TransportMatrix::identity(crate::matrix::Dimension::Full { gamma: 2.0 });
        m.set(0, 1, 0.5);
        m.set(2, 3, 0.5);
        assert_abs_diff_eq!(ImagingMode::PointToPoint.residual(&m), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(ImagingMode::PointToParallel.residual(&m), 2.0, epsilon = 1e-15);
    }

    #[test]
    fn test_extreme_strengths_cost_maximum() {
        let binding = StrengthBinding::new(&triplet_template(), true, &BTreeMap::new()).unwrap();
        let problem = ImagingResidual {
            binding: &binding,
            imaging: ImagingMode::PointToParallel,
        };
        assert_eq!(problem.evaluate(&[1e7, 1e7]).unwrap(), f64::MAX);
        assert!(problem.evaluate(&[2.0, 2.0]).unwrap() < f64::MAX);
    }

    #[test]
    fn test_initial_simplex() {
        let simplex = initial_simplex(&[2.0, 0.0]);
        assert_eq!(simplex.len(), 3);
        assert_eq!(simplex[0], vec![2.0, 0.0]);
        assert_abs_diff_eq!(simplex[1][0], 2.1, epsilon = 1e-12);
        assert_eq!(simplex[2], vec![2.0, SIMPLEX_ZERO_STEP]);
    }

    #[test]
    fn test_symmetric_triplet_point_to_parallel() {
        let config = OptimizerConfig::new()
            .with_imaging(ImagingMode::PointToParallel)
            .with_symmetric(true)
            .with_initial_guess(vec![2.0, 2.0]);
        let result = StrengthOptimizer::with_config(config).optimize(&triplet_template()).unwrap();

        assert_eq!(result.strengths.len(), 2);
        assert_eq!(result.slot_strengths[0], result.slot_strengths[2]);
        assert!(result.residual <= DEFAULT_PRECISION * DEFAULT_PRECISION);

        let m = result.beamline.transfer_matrix().unwrap();
        assert!(m.get(0, 0).abs() < DEFAULT_PRECISION);
        assert!(m.get(2, 2).abs() < DEFAULT_PRECISION);
    }

    #[test]
    fn test_four_quadrupole_symmetry() {
        let template = Beamline::new(
            vec![
                Element::focusing(0.0),
                Element::Drift,
                Element::defocusing(0.0),
                Element::Drift,
                Element::defocusing(0.0),
                Element::Drift,
                Element::focusing(0.0),
                Element::Drift,
            ],
            vec![0.4, 0.5, 0.4, 0.3, 0.4, 0.5, 0.4, 2.0],
        )
        .unwrap();
        let config = OptimizerConfig::new()
            .with_imaging(ImagingMode::PointToPoint)
            .with_symmetric(true)
            .with_max_iterations(500);
        let result = StrengthOptimizer::with_config(config).optimize(&template).unwrap();
        let k = &result.slot_strengths;
        assert_eq!(k.len(), 4);
        assert_eq!(k[0], k[3]);
        assert_eq!(k[1], k[2]);
        assert!(result.residual <= DEFAULT_PRECISION * DEFAULT_PRECISION);
    }

    #[test]
    fn test_fixed_value_is_forced() {
        let config = OptimizerConfig::new()
            .with_fixed(1, 3.7)
            .with_max_iterations(300);
        let result = StrengthOptimizer::with_config(config).optimize(&triplet_template()).unwrap();

        assert_eq!(result.strengths.len(), 3);
        assert_eq!(result.strengths[1], 3.7);
        assert_eq!(result.slot_strengths[1], 3.7);
        assert!(result.residual <= DEFAULT_PRECISION * DEFAULT_PRECISION);

        assert_eq!(result.beamline.elements()[3], Element::defocusing(3.7));
        let m = result.beamline.transfer_matrix().unwrap();
        assert!(m.get(0, 0).abs() < DEFAULT_PRECISION);
        assert!(m.get(2, 2).abs() < DEFAULT_PRECISION);
    }

    #[test]
    fn test_template_without_quadrupoles() {
        let line = Beamline::new(vec![Element::Drift], vec![1.0]).unwrap();
        assert!(matches!(
            StrengthOptimizer::new().optimize(&line),
            Err(OpticsError::MalformedBeamline { .. })
        ));
    }

    #[test]
    fn test_wrong_initial_guess_length() {
        let config = OptimizerConfig::new().with_symmetric(true).with_initial_guess(vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            StrengthOptimizer::with_config(config).optimize(&triplet_template()),
            Err(OpticsError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_iteration_cap_reports_failure() {
        let config = OptimizerConfig::new()
            .with_symmetric(true)
            .with_precision(1e-9)
            .with_max_iterations(1);
        match StrengthOptimizer::with_config(config).optimize(&triplet_template()) {
            Err(OpticsError::ConvergenceFailure { iterations, residual, .. }) => {
                assert!(iterations <= 1);
                assert!(residual > 1e-18);
            }
            other => panic!("expected convergence failure, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_precision() {
        let config = OptimizerConfig::new().with_precision(0.0);
        assert!(StrengthOptimizer::with_config(config).optimize(&triplet_template()).is_err());
    }
}
