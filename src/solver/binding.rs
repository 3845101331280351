//! Mapping from a search vector to quadrupole strengths.

use std::collections::BTreeMap;

use crate::beamline::Beamline;
use crate::error::{OpticsError, Result};

/// Binds free optimizer parameters to the quadrupole slots of a template.
///
/// Quadrupole slots are numbered upstream first. With mirror symmetry, slot
/// `q` and slot `n-1-q` share one free parameter, so a line of `n`
/// quadrupoles has `ceil(n/2)` free parameters. Fixed values are keyed by
/// free-parameter index and always win over the search vector.
#[derive(Debug, Clone)]
pub struct StrengthBinding {
    template: Beamline,
    /// Element index of each quadrupole slot
    slots: Vec<usize>,
    symmetric: bool,
    fixed: BTreeMap<usize, f64>,
}

impl StrengthBinding {
    /// Bind a template beamline.
    ///
    /// Fails if the template has no quadrupoles or a fixed index is out of
    /// range.
    pub fn new(template: &Beamline, symmetric: bool, fixed: &BTreeMap<usize, f64>) -> Result<Self> {
        let slots = template.quadrupole_slots();
        if slots.is_empty() {
            return Err(OpticsError::malformed("template has no quadrupoles to optimize"));
        }

        let binding = Self {
            template: template.clone(),
            slots,
            symmetric,
            fixed: fixed.clone(),
        };

        let free_count = binding.free_count();
        if let Some((&index, _)) = binding.fixed.range(free_count..).next() {
            return Err(OpticsError::parameter(
                "fixed",
                format!(
                    "fixed index {} out of range, template has {} free parameters",
                    index, free_count
                ),
            ));
        }
        if let Some((index, value)) = binding.fixed.iter().find(|(_, v)| !v.is_finite()) {
            return Err(OpticsError::parameter(
                "fixed",
                format!("fixed value for index {} is not finite: {}", index, value),
            ));
        }

        Ok(binding)
    }

    /// Number of quadrupole slots in the template.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of free parameters.
    pub fn free_count(&self) -> usize {
        if self.symmetric {
            self.slots.len().div_ceil(2)
        } else {
            self.slots.len()
        }
    }

    /// Free-parameter index driving quadrupole slot `slot`.
    pub fn free_index(&self, slot: usize) -> usize {
        if self.symmetric {
            slot.min(self.slots.len() - 1 - slot)
        } else {
            slot
        }
    }

    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    pub fn template(&self) -> &Beamline {
        &self.template
    }

    /// The search vector with fixed values written in.
    pub fn apply_fixed(&self, free: &[f64]) -> Result<Vec<f64>> {
        self.check_len(free)?;
        let mut values = free.to_vec();
        for (&index, &value) in &self.fixed {
            values[index] = value;
        }
        Ok(values)
    }

    /// Strength of every quadrupole slot for a search vector.
    pub fn resolve(&self, free: &[f64]) -> Result<Vec<f64>> {
        let values = self.apply_fixed(free)?;
        Ok((0..self.slots.len()).map(|q| values[self.free_index(q)]).collect())
    }

    /// Concrete beamline for a search vector.
    ///
    /// Each quadrupole keeps its declared polarity. A negative strength turns
    /// it into the opposite lens.
    pub fn bind(&self, free: &[f64]) -> Result<Beamline> {
        let strengths = self.resolve(free)?;
        let mut elements = self.template.elements().to_vec();
        for (&slot, &k) in self.slots.iter().zip(&strengths) {
            elements[slot] = elements[slot].with_strength(k);
        }
        self.template.with_elements(elements)
    }

    fn check_len(&self, free: &[f64]) -> Result<()> {
        if free.len() != self.free_count() {
            return Err(OpticsError::parameter(
                "strengths",
                format!("expected {} free parameters, got {}", self.free_count(), free.len()),
            ));
        }
        Ok(())
    }
}
