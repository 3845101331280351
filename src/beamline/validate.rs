//! Beamline validation.

use crate::error::{OpticsError, Result};

use super::Beamline;

/// Validate a beamline.
///
/// Checks:
/// - One length per element
/// - At least one element
/// - Every length is finite and non-negative
/// - The Lorentz factor (6-D only) is physical
pub fn validate_beamline(beamline: &Beamline) -> Result<()> {
    let (elements, lengths) = (beamline.elements(), beamline.lengths());

    if elements.len() != lengths.len() {
        return Err(OpticsError::malformed(format!(
            "{} elements but {} lengths",
            elements.len(),
            lengths.len()
        )));
    }

    if elements.is_empty() {
        return Err(OpticsError::malformed("beamline has no elements"));
    }

    for (i, &length) in lengths.iter().enumerate() {
        if !length.is_finite() || length < 0.0 {
            return Err(OpticsError::geometry(format!(
                "element {} ({}) has invalid length {}",
                i, elements[i], length
            )));
        }
    }

    beamline.dimension().validate()
}
