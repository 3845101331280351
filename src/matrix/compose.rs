//! Sequential composition of transport matrices.

use crate::error::{OpticsError, Result};

use super::TransportMatrix;

/// Compose an ordered list of transport matrices into one.
///
/// `matrices[0]` is the most upstream element. Each following matrix is
/// left-multiplied onto the accumulated product, so the result is
/// `M[n-1] · … · M[1] · M[0]` and maps the beamline entrance directly to its
/// exit.
///
/// A single matrix is returned unchanged. An empty list, or matrices of
/// different sizes, are rejected.
pub fn compose(matrices: &[TransportMatrix]) -> Result<TransportMatrix> {
    let (first, rest) = matrices
        .split_first()
        .ok_or_else(|| OpticsError::malformed("cannot compose an empty matrix list"))?;

    rest.iter().try_fold(first.clone(), |acc, next| next.mul(&acc))
}
