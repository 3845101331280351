//! Dense transport matrix storage.

use std::fmt;

use crate::error::{OpticsError, Result};

/// Phase-space dimension of a transport matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    /// Uncoupled horizontal and vertical planes (4×4).
    Transverse,
    /// Transverse planes plus path-length / momentum coordinates (6×6).
    ///
    /// `gamma` is the Lorentz factor of the reference particle; it sets the
    /// `L/γ²` longitudinal drift term. `f64::INFINITY` is accepted and means
    /// the ultra-relativistic limit.
    Full { gamma: f64 },
}

impl Default for Dimension {
    fn default() -> Self {
        Dimension::Transverse
    }
}

impl Dimension {
    /// Matrix size for this dimension.
    pub fn size(&self) -> usize {
        match self {
            Dimension::Transverse => 4,
            Dimension::Full { .. } => 6,
        }
    }

    /// Coefficient of `L` in the longitudinal drift term (`1/γ²`).
    ///
    /// Returns 0 for the transverse variant, which has no such term.
    pub fn inverse_gamma_squared(&self) -> f64 {
        match self {
            Dimension::Transverse => 0.0,
            Dimension::Full { gamma } => 1.0 / (gamma * gamma),
        }
    }

    /// Check that the Lorentz factor is physical.
    pub fn validate(&self) -> Result<()> {
        if let Dimension::Full { gamma } = self {
            if gamma.is_nan() || *gamma < 1.0 {
                return Err(OpticsError::parameter(
                    "gamma",
                    format!("Lorentz factor must be >= 1, got {}", gamma),
                ));
            }
        }
        Ok(())
    }
}

/// A transverse plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plane {
    Horizontal,
    Vertical,
}

impl Plane {
    /// Both transverse planes, horizontal first.
    pub const BOTH: [Plane; 2] = [Plane::Horizontal, Plane::Vertical];

    /// Index of the position coordinate of this plane.
    pub fn offset(&self) -> usize {
        match self {
            Plane::Horizontal => 0,
            Plane::Vertical => 2,
        }
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plane::Horizontal => write!(f, "horizontal"),
            Plane::Vertical => write!(f, "vertical"),
        }
    }
}

/// The 2×2 block of one transverse plane.
///
/// Entries use lens-theory numbering within the block: `m11` is the
/// position-to-position term, `m12` position-from-angle, `m21`
/// angle-from-position, `m22` angle-to-angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransverseBlock {
    pub m11: f64,
    pub m12: f64,
    pub m21: f64,
    pub m22: f64,
}

impl TransverseBlock {
    /// Determinant of the block (1 for any lossless linear element).
    pub fn determinant(&self) -> f64 {
        self.m11 * self.m22 - self.m12 * self.m21
    }

    /// The block entries in `[m11, m12, m21, m22]` order.
    pub fn entries(&self) -> [f64; 4] {
        [self.m11, self.m12, self.m21, self.m22]
    }
}

/// A square transport matrix, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportMatrix {
    /// Matrix entries (row-major)
    data: Vec<f64>,
    /// Matrix dimension
    size: usize,
}

impl TransportMatrix {
    /// Identity matrix for the given phase-space dimension.
    pub fn identity(dimension: Dimension) -> Self {
        let size = dimension.size();
        let mut data = vec![0.0; size * size];
        for i in 0..size {
            data[i * size + i] = 1.0;
        }
        Self { data, size }
    }

    /// Identity matrix with the two transverse blocks replaced.
    ///
    /// Every element model starts from this: the off-block entries stay 0
    /// and any longitudinal entries stay at identity.
    pub fn from_blocks(dimension: Dimension, horizontal: TransverseBlock, vertical: TransverseBlock) -> Self {
        let mut m = Self::identity(dimension);
        m.set_block(Plane::Horizontal, horizontal);
        m.set_block(Plane::Vertical, vertical);
        m
    }

    /// Build a matrix from explicit rows.
    pub fn from_rows(rows: &[&[f64]]) -> Result<Self> {
        let size = rows.len();
        if size != 4 && size != 6 {
            return Err(OpticsError::malformed(format!(
                "transport matrices are 4x4 or 6x6, got {} rows",
                size
            )));
        }
        let mut data = Vec::with_capacity(size * size);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(OpticsError::malformed(format!(
                    "row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    size
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self { data, size })
    }

    /// Matrix dimension (4 or 6).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get matrix element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.size + col]
    }

    /// Set matrix element at (row, col).
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.size + col] = value;
    }

    /// Row-major view of all entries.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// The 2×2 block of a transverse plane.
    pub fn block(&self, plane: Plane) -> TransverseBlock {
        let o = plane.offset();
        TransverseBlock {
            m11: self.get(o, o),
            m12: self.get(o, o + 1),
            m21: self.get(o + 1, o),
            m22: self.get(o + 1, o + 1),
        }
    }

    /// Overwrite the 2×2 block of a transverse plane.
    pub fn set_block(&mut self, plane: Plane, block: TransverseBlock) {
        let o = plane.offset();
        self.set(o, o, block.m11);
        self.set(o, o + 1, block.m12);
        self.set(o + 1, o, block.m21);
        self.set(o + 1, o + 1, block.m22);
    }

    /// Horizontal block (indices 0-1).
    pub fn horizontal(&self) -> TransverseBlock {
        self.block(Plane::Horizontal)
    }

    /// Vertical block (indices 2-3).
    pub fn vertical(&self) -> TransverseBlock {
        self.block(Plane::Vertical)
    }

    /// The eight transverse entries: `M11, M12, M21, M22, M33, M34, M43, M44`.
    pub fn transverse_entries(&self) -> [f64; 8] {
        let h = self.horizontal();
        let v = self.vertical();
        [h.m11, h.m12, h.m21, h.m22, v.m11, v.m12, v.m21, v.m22]
    }

    /// Matrix product `self · rhs`.
    pub fn mul(&self, rhs: &TransportMatrix) -> Result<TransportMatrix> {
        if self.size != rhs.size {
            return Err(OpticsError::malformed(format!(
                "cannot multiply a {0}x{0} matrix with a {1}x{1} matrix",
                self.size, rhs.size
            )));
        }
        let n = self.size;
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            for k in 0..n {
                let a = self.data[i * n + k];
                if a == 0.0 {
                    continue;
                }
                for j in 0..n {
                    data[i * n + j] += a * rhs.data[k * n + j];
                }
            }
        }
        Ok(TransportMatrix { data, size: n })
    }

    /// Map an entrance phase-space vector to the exit vector.
    pub fn apply(&self, vector: &[f64]) -> Result<Vec<f64>> {
        if vector.len() != self.size {
            return Err(OpticsError::parameter(
                "vector",
                format!("expected {} coordinates, got {}", self.size, vector.len()),
            ));
        }
        let n = self.size;
        Ok((0..n)
            .map(|i| (0..n).map(|j| self.data[i * n + j] * vector[j]).sum())
            .collect())
    }
}

impl fmt::Display for TransportMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.data.chunks(self.size) {
            let cells: Vec<String> = row.iter().map(|v| format!("{:>12.6}", v)).collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}
