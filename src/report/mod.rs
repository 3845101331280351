//! Tab-separated output for the CLI frontend.
//!
//! Every table starts with a header row. Numbers are written with enough
//! digits to round-trip the values they were computed from.

use std::io::{self, Write};

use crate::beamline::PathSample;
use crate::error::{OpticsError, Result};
use crate::lens::{FocalLengths, PrincipalPlanes};
use crate::matrix::TransportMatrix;
use crate::solver::OptimizedStrengths;

const TRANSVERSE_HEADER: [&str; 8] = ["M11", "M12", "M21", "M22", "M33", "M34", "M43", "M44"];

/// Table writer over any output stream.
pub struct TsvWriter<W: Write> {
    out: W,
}

impl<W: Write> TsvWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Write one row of cells.
    pub fn row<I, T>(&mut self, cells: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: std::fmt::Display,
    {
        let line = cells.into_iter().map(|c| c.to_string()).collect::<Vec<_>>().join("\t");
        writeln!(self.out, "{}", line).map_err(output_error)
    }

    /// Flush the output stream.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().map_err(output_error)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn output_error(e: io::Error) -> OpticsError {
    OpticsError::OutputError { message: e.to_string() }
}

/// Full matrix, one row per line.
pub fn write_matrix<W: Write>(w: &mut TsvWriter<W>, m: &TransportMatrix) -> Result<()> {
    let size = m.size();
    w.row((1..=size).map(|c| format!("c{}", c)))?;
    for row in m.as_slice().chunks(size) {
        w.row(row)?;
    }
    Ok(())
}

/// Path samples, one position per line.
pub fn write_samples<W: Write>(w: &mut TsvWriter<W>, samples: &PathSample) -> Result<()> {
    w.row(std::iter::once("s").chain(TRANSVERSE_HEADER))?;
    for point in &samples.points {
        let s = format!("{:.6}", point.s);
        let entries = point.horizontal.iter().chain(&point.vertical).map(|v| v.to_string());
        w.row(std::iter::once(s).chain(entries))?;
    }
    Ok(())
}

/// Principal planes, focal lengths and thin-lens entries per plane.
pub fn write_thin_lens<W: Write>(
    w: &mut TsvWriter<W>,
    planes: &PrincipalPlanes,
    focal: &FocalLengths,
    thin: &(TransportMatrix, TransportMatrix),
) -> Result<()> {
    w.row(["plane", "z1", "z2", "f", "T11", "T12", "T21", "T22"])?;
    let rows = [
        ("horizontal", planes.horizontal, focal.horizontal, thin.0.horizontal()),
        ("vertical", planes.vertical, focal.vertical, thin.1.vertical()),
    ];
    for (name, (z1, z2), f, block) in rows {
        let mut cells = vec![name.to_string(), z1.to_string(), z2.to_string(), f.to_string()];
        cells.extend(block.entries().iter().map(|v| v.to_string()));
        w.row(cells)?;
    }
    Ok(())
}

/// Optimized strengths: one line per quadrupole slot, then the residual.
pub fn write_strengths<W: Write>(w: &mut TsvWriter<W>, result: &OptimizedStrengths) -> Result<()> {
    w.row(["slot", "element", "k"])?;
    let slots = result.beamline.quadrupole_slots();
    for (q, (&element, k)) in slots.iter().zip(&result.slot_strengths).enumerate() {
        w.row([q.to_string(), element.to_string(), k.to_string()])?;
    }
    w.row(["residual".to_string(), String::new(), result.residual.to_string()])?;
    w.row(["iterations".to_string(), String::new(), result.iterations.to_string()])?;
    Ok(())
}
