//! Path-length sampling of the transfer matrix.
//!
//! Walks a beamline element by element and, inside each element, in uniform
//! sub-steps. At every step the matrix from the beamline entrance to the
//! current position is recorded, giving the transverse matrix entries as
//! functions of the cumulative path length `s`.
//!
//! The step is `10^-d`, where `d` is the largest number of decimal digits
//! among the element lengths. Sampling resolution is therefore set by how the
//! lengths are written: `1.0` and `0.5` sample every 0.1 m, `0.25` every
//! 0.01 m.

use log::debug;

use crate::error::{OpticsError, Result};
use crate::matrix::{compose, TransportMatrix};

use super::Beamline;

/// Largest number of length decimals accepted for sampling.
pub const MAX_SAMPLING_DECIMALS: usize = 6;

/// Transfer-matrix entries at one path position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    /// Cumulative path length from the beamline entrance (m)
    pub s: f64,
    /// Horizontal block `[M11, M12, M21, M22]`
    pub horizontal: [f64; 4],
    /// Vertical block `[M33, M34, M43, M44]`
    pub vertical: [f64; 4],
}

impl SamplePoint {
    fn new(s: f64, m: &TransportMatrix) -> Self {
        Self {
            s,
            horizontal: m.horizontal().entries(),
            vertical: m.vertical().entries(),
        }
    }
}

/// Ordered path samples of a beamline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathSample {
    pub points: Vec<SamplePoint>,
    /// Sampling step (m)
    pub step: f64,
}

impl PathSample {
    /// Cumulative path positions.
    pub fn positions(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.s).collect()
    }

    /// One horizontal entry along the path (`index` 0..4 = M11, M12, M21, M22).
    ///
    /// `None` for an index outside the block.
    pub fn horizontal(&self, index: usize) -> Option<Vec<f64>> {
        (index < 4).then(|| self.points.iter().map(|p| p.horizontal[index]).collect())
    }

    /// One vertical entry along the path (`index` 0..4 = M33, M34, M43, M44).
    ///
    /// `None` for an index outside the block.
    pub fn vertical(&self, index: usize) -> Option<Vec<f64>> {
        (index < 4).then(|| self.points.iter().map(|p| p.vertical[index]).collect())
    }

    /// The final sample, at the beamline exit.
    pub fn last(&self) -> Option<&SamplePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Number of fractional digits in the shortest decimal form of `value`.
///
/// Whole numbers count as one digit, so a length of `2.0` samples at 0.1.
pub fn decimal_places(value: f64) -> usize {
    let text = format!("{}", value.abs());
    let digits = text.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0);
    digits.max(1)
}

/// Sampling resolution of a beamline: decimal places and step.
pub fn sampling_step(beamline: &Beamline) -> Result<(usize, f64)> {
    let decimals = beamline
        .lengths()
        .iter()
        .map(|&l| decimal_places(l))
        .max()
        .unwrap_or(1);

    if decimals > MAX_SAMPLING_DECIMALS {
        return Err(OpticsError::parameter(
            "lengths",
            format!(
                "lengths need {} decimal places, sampling supports at most {}; round the lengths",
                decimals, MAX_SAMPLING_DECIMALS
            ),
        ));
    }

    Ok((decimals, 10f64.powi(-(decimals as i32))))
}

/// Lazy path sampler over a beamline.
///
/// Yields one [`SamplePoint`] per sub-step of every element (offsets from 0
/// up to, but not including, the element length), followed by a closing
/// sample at the beamline exit holding the full transfer matrix.
pub struct PathSampler<'a> {
    beamline: &'a Beamline,
    /// Full-length element matrices
    full: Vec<TransportMatrix>,
    /// Steps per unit length (10^d)
    scale: f64,
    /// Product of all elements upstream of `element`
    upstream: Option<TransportMatrix>,
    /// Path length upstream of `element`
    upstream_s: f64,
    element: usize,
    step: usize,
    finished: bool,
}

impl<'a> PathSampler<'a> {
    /// Create a sampler for the given beamline.
    ///
    /// Lengths with more than [`MAX_SAMPLING_DECIMALS`] decimal places are
    /// rejected with [`OpticsError::InvalidParameter`].
    pub fn new(beamline: &'a Beamline) -> Result<Self> {
        let (decimals, step) = sampling_step(beamline)?;
        let full = beamline.element_matrices()?;
        debug!(
            "sampling {} elements over {:.6} m at step {} ({} decimals)",
            beamline.len(),
            beamline.total_length(),
            step,
            decimals
        );

        Ok(Self {
            beamline,
            full,
            scale: 10f64.powi(decimals as i32),
            upstream: None,
            upstream_s: 0.0,
            element: 0,
            step: 0,
            finished: false,
        })
    }

    /// Sampling step (m).
    pub fn step_size(&self) -> f64 {
        1.0 / self.scale
    }

    fn steps_in(&self, element: usize) -> usize {
        (self.beamline.lengths()[element] * self.scale).round() as usize
    }

    fn sample_at(&self, offset: f64) -> Result<TransportMatrix> {
        let partial = self.beamline.elements()[self.element].matrix(offset, self.beamline.dimension())?;
        match &self.upstream {
            Some(upstream) => compose(&[upstream.clone(), partial]),
            None => Ok(partial),
        }
    }

    /// Move past the current element, folding it into the upstream product.
    fn finish_element(&mut self) -> Result<()> {
        let full = &self.full[self.element];
        self.upstream = Some(match self.upstream.take() {
            Some(upstream) => full.mul(&upstream)?,
            None => full.clone(),
        });
        self.upstream_s += self.beamline.lengths()[self.element];
        self.element += 1;
        self.step = 0;
        Ok(())
    }

    fn next_point(&mut self) -> Result<Option<SamplePoint>> {
        while self.element < self.beamline.len() {
            if self.step < self.steps_in(self.element) {
                let offset = self.step as f64 / self.scale;
                let m = self.sample_at(offset)?;
                self.step += 1;
                return Ok(Some(SamplePoint::new(self.upstream_s + offset, &m)));
            }
            self.finish_element()?;
        }

        if self.finished {
            return Ok(None);
        }
        self.finished = true;

        let exit = self
            .upstream
            .as_ref()
            .ok_or_else(|| OpticsError::malformed("beamline has no elements"))?;
        Ok(Some(SamplePoint::new(self.beamline.total_length(), exit)))
    }
}

impl Iterator for PathSampler<'_> {
    type Item = Result<SamplePoint>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_point() {
            Ok(point) => point.map(Ok),
            Err(e) => {
                self.finished = true;
                self.element = self.beamline.len();
                Some(Err(e))
            }
        }
    }
}

/// Sample the transfer matrix along the whole beamline.
///
/// Fails with [`OpticsError::InvalidParameter`] when a length needs more than
/// [`MAX_SAMPLING_DECIMALS`] decimal places; round such lengths first.
pub fn sample(beamline: &Beamline) -> Result<PathSample> {
    let sampler = PathSampler::new(beamline)?;
    let step = sampler.step_size();
    let points = sampler.collect::<Result<Vec<_>>>()?;
    Ok(PathSample { points, step })
}
