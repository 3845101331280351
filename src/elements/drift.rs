//! Field-free drift space.

use crate::matrix::{Dimension, TransportMatrix, TransverseBlock};

/// Transverse block of a drift of length `length`.
pub(crate) fn drift_block(length: f64) -> TransverseBlock {
    TransverseBlock {
        m11: 1.0,
        m12: length,
        m21: 0.0,
        m22: 1.0,
    }
}

/// Transport matrix of a drift.
///
/// Ballistic propagation: position picks up `L · angle` in both planes. In the
/// 6-D variant the path-length coordinate picks up `L/γ² · δ`.
///
/// Negative lengths are allowed; they undo a positive drift of the same
/// length and are used by the thick-to-thin reduction.
pub fn drift(length: f64, dimension: Dimension) -> TransportMatrix {
    let block = drift_block(length);
    let mut m = TransportMatrix::from_blocks(dimension, block, block);
    if let Dimension::Full { .. } = dimension {
        m.set(4, 5, length * dimension.inverse_gamma_squared());
    }
    m
}
