//! Brute-force threshold scan over two parameters.
//!
//! For every value of an outer parameter, an inner parameter is stepped from
//! a start value until a function of both crosses a limit. Useful when the
//! function is cheap and the smallest (or first) crossing value is wanted
//! rather than a minimum.

use log::trace;

use crate::error::{OpticsError, Result};

/// Crossing condition of a threshold scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanDirection {
    /// Stop once `f < limit`.
    #[default]
    Below,
    /// Stop once `f > limit`.
    Above,
}

impl ScanDirection {
    fn reached(&self, value: f64, limit: f64) -> bool {
        match self {
            ScanDirection::Below => value < limit,
            ScanDirection::Above => value > limit,
        }
    }
}

/// One crossing found by [`threshold_scan`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanPoint {
    pub outer: f64,
    /// First inner value meeting the condition, rounded to 3 decimals
    pub inner: f64,
}

fn round3(value: f64) -> f64 {
    (value * 1e3).round() / 1e3
}

/// Step the inner parameter for every outer value until `f` crosses `limit`.
///
/// The inner value for step `n` is `start + n·step`. Fails with
/// [`OpticsError::ConvergenceFailure`] when more than `max_steps` steps are
/// needed for any outer value, and passes on errors from `f`.
pub fn threshold_scan<F>(
    mut f: F,
    outer_values: &[f64],
    start: f64,
    step: f64,
    limit: f64,
    direction: ScanDirection,
    max_steps: u64,
) -> Result<Vec<ScanPoint>>
where
    F: FnMut(f64, f64) -> Result<f64>,
{
    if !(step.is_finite() && step != 0.0) {
        return Err(OpticsError::parameter("step", format!("scan step must be non-zero, got {}", step)));
    }

    outer_values
        .iter()
        .map(|&outer| {
            let mut steps = 0u64;
            let mut inner = start;
            let mut value = f(outer, inner)?;
            while !direction.reached(value, limit) {
                if steps == max_steps {
                    return Err(OpticsError::convergence_failure(
                        steps,
                        value,
                        format!("no crossing of {} for outer value {}", limit, outer),
                    ));
                }
                steps += 1;
                inner = start + steps as f64 * step;
                value = f(outer, inner)?;
            }
            trace!("scan: outer {} crossed at {} after {} steps", outer, inner, steps);
            Ok(ScanPoint {
                outer,
                inner: round3(inner),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_scan_below() {
        // 1/(x·y) < 1 first holds for y > 1/x
        let points = threshold_scan(
            |x, y| Ok(1.0 / (x * y)),
            &[1.0, 2.0, 4.0],
            0.1,
            0.07,
            1.0,
            ScanDirection::Below,
            1000,
        )
        .unwrap();
        assert_eq!(points.len(), 3);
        assert_abs_diff_eq!(points[0].inner, 1.01, epsilon = 1e-12);
        assert_abs_diff_eq!(points[1].inner, 0.52, epsilon = 1e-12);
        assert_abs_diff_eq!(points[2].inner, 0.31, epsilon = 1e-12);
        assert_eq!(points[2].outer, 4.0);
    }

    #[test]
    fn test_scan_above() {
        let points = threshold_scan(|a, b| Ok(a + b), &[0.0], 0.0, 0.25, 1.0, ScanDirection::Above, 100).unwrap();
        assert_abs_diff_eq!(points[0].inner, 1.25);
    }

    #[test]
    fn test_already_satisfied() {
        let points = threshold_scan(|_, _| Ok(0.0), &[1.0], 0.5, 0.1, 1.0, ScanDirection::Below, 0).unwrap();
        assert_abs_diff_eq!(points[0].inner, 0.5);
    }

    #[test]
    fn test_step_cap() {
        let result = threshold_scan(|_, _| Ok(2.0), &[1.0], 0.0, 0.1, 1.0, ScanDirection::Below, 50);
        assert!(matches!(
            result,
            Err(OpticsError::ConvergenceFailure { iterations: 50, .. })
        ));
    }

    #[test]
    fn test_errors_propagate() {
        let result = threshold_scan(
            |_, _| Err(OpticsError::geometry("no intersection")),
            &[1.0],
            0.0,
            0.1,
            1.0,
            ScanDirection::Below,
            10,
        );
        assert!(matches!(result, Err(OpticsError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_zero_step_rejected() {
        assert!(threshold_scan(|_, _| Ok(2.0), &[1.0], 0.0, 0.0, 1.0, ScanDirection::Below, 10).is_err());
    }
}
