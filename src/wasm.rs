//! WASM bindings for Ionoptics.
//!
//! JavaScript-friendly access to beamline matrices, path samples and the
//! strength optimizer, e.g. for an interactive beamline plot.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmBeamline } from 'ionoptics';
//!
//! await init();
//!
//! const line = new WasmBeamline(`
//!   DRIFT D0 1.0
//!   QF    Q1 0.5 k=2.0
//!   DRIFT D1 1.0
//! `);
//!
//! const s = line.sample_positions();
//! const m11 = line.sample_entry(0);
//! ```

use wasm_bindgen::prelude::*;

use crate::beamline::{sample, Beamline, PathSample};
use crate::dsl;
use crate::error::OpticsError;
use crate::solver::{ImagingMode, OptimizerConfig, StrengthOptimizer};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn js_error(e: OpticsError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// WASM-compatible beamline.
///
/// Parses the beamline once and caches its path samples.
#[wasm_bindgen]
pub struct WasmBeamline {
    beamline: Beamline,
    samples: PathSample,
}

#[wasm_bindgen]
impl WasmBeamline {
    /// Create a beamline from its text description.
    #[wasm_bindgen(constructor)]
    pub fn new(description: &str) -> Result<WasmBeamline, JsValue> {
        let ast = dsl::parse(description).map_err(js_error)?;
        let beamline = Beamline::from_ast(&ast).map_err(js_error)?;
        let samples = sample(&beamline).map_err(js_error)?;
        Ok(WasmBeamline { beamline, samples })
    }

    /// Transfer matrix entries, row-major.
    #[wasm_bindgen]
    pub fn transfer_matrix(&self) -> Result<Vec<f64>, JsValue> {
        self.beamline
            .transfer_matrix()
            .map(|m| m.as_slice().to_vec())
            .map_err(js_error)
    }

    /// Matrix size (4 or 6).
    #[wasm_bindgen(getter)]
    pub fn size(&self) -> usize {
        self.beamline.dimension().size()
    }

    /// Path positions of the samples.
    #[wasm_bindgen]
    pub fn sample_positions(&self) -> Vec<f64> {
        self.samples.positions()
    }

    /// One transverse entry along the path.
    ///
    /// `index` 0-3 selects M11, M12, M21, M22; 4-7 selects M33, M34, M43, M44.
    #[wasm_bindgen]
    pub fn sample_entry(&self, index: usize) -> Result<Vec<f64>, JsValue> {
        let series = match index {
            0..=3 => self.samples.horizontal(index),
            _ => index.checked_sub(4).and_then(|i| self.samples.vertical(i)),
        };
        series.ok_or_else(|| {
            js_error(OpticsError::WasmError {
                message: format!("entry index must be 0-7, got {}", index),
            })
        })
    }

    /// Search quadrupole strengths and rebind the beamline to them.
    ///
    /// `point_to_point` selects the imaging condition (point-to-parallel
    /// otherwise). Returns the strength of every quadrupole, upstream first.
    #[wasm_bindgen]
    pub fn optimize(
        &mut self,
        point_to_point: bool,
        symmetric: bool,
        precision: f64,
        max_iterations: u32,
    ) -> Result<Vec<f64>, JsValue> {
        let imaging = if point_to_point {
            ImagingMode::PointToPoint
        } else {
            ImagingMode::PointToParallel
        };
        let config = OptimizerConfig::new()
            .with_imaging(imaging)
            .with_symmetric(symmetric)
            .with_precision(precision)
            .with_max_iterations(u64::from(max_iterations));

        let result = StrengthOptimizer::with_config(config)
            .optimize(&self.beamline)
            .map_err(js_error)?;
        self.samples = sample(&result.beamline).map_err(js_error)?;
        self.beamline = result.beamline;
        Ok(result.slot_strengths)
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
