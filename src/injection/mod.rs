//! Kicker and septum injection geometry.
//!
//! A kicker deflects the incoming beam by `kick`; the beam then drifts to a
//! septum, whose field adds the permanent angle `perm`. The geometry here
//! gives the deflected path lengths needed to reach the required
//! separations, and the smallest kick that keeps the whole arrangement
//! below a length budget.
//!
//! ```text
//!  kicker       s1          septum        s2
//! [======]  ----------->  [=========]  ---------->  x_add reached
//! ```
//!
//! All angles are in rad, lengths in m and rigidities in T·m.

use log::debug;

use crate::error::{OpticsError, Result};
use crate::solver::scan::{threshold_scan, ScanDirection};

/// Angles below this sine are treated as parallel to the axis.
const MIN_SINE: f64 = 1e-15;

/// Field layout of the septum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeptumType {
    /// Single DC field region.
    #[default]
    Dc,
    /// Two opposite field regions; the permanent angle acts twice.
    OppositeField,
}

/// Fixed layout of a kicker and septum pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KickerSeptumLayout {
    /// Transverse position of the septum blade
    pub septum_position: f64,
    /// Additional separation required after the septum
    pub additional_separation: f64,
    /// Beam offset at the kicker entrance
    pub initial_offset: f64,
    /// Beam angle at the kicker entrance
    pub initial_angle: f64,
    pub kicker_length: f64,
    pub septum_length: f64,
    pub septum_type: SeptumType,
}

/// Deflected path lengths through a kicker and septum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InjectionPath {
    /// `kicker_to_septum + septum_length + septum_to_separation`
    pub total: f64,
    /// Kicker exit to septum entrance
    pub kicker_to_septum: f64,
    /// Septum exit to the point of full separation
    pub septum_to_separation: f64,
}

fn reach(distance: f64, angle: f64, what: &str) -> Result<f64> {
    let sine = angle.sin();
    if sine.abs() < MIN_SINE {
        return Err(OpticsError::geometry(format!(
            "{}: beam angle {} never reaches the separation",
            what, angle
        )));
    }
    Ok(distance / sine)
}

/// Path lengths for a kick angle `kick` and septum angle `perm`.
pub fn path_length(layout: &KickerSeptumLayout, kick: f64, perm: f64) -> Result<InjectionPath> {
    let init = layout.initial_angle;

    // Offset grows by half the kick inside the kicker
    let offset = layout.initial_offset + layout.kicker_length * kick / 2.0;
    let kicker_to_septum = reach(layout.septum_position - offset, kick + init, "kicker to septum")?;

    let orbit = layout.septum_length * perm / 2.0;
    let drift = layout.septum_length * kick;
    let septum_to_separation = match layout.septum_type {
        SeptumType::Dc => reach(
            layout.additional_separation - orbit - drift,
            kick + perm + init,
            "septum to separation",
        )?,
        SeptumType::OppositeField => reach(
            layout.additional_separation - 2.0 * orbit - drift,
            kick + 2.0 * perm + init,
            "septum to separation",
        )?,
    };

    Ok(InjectionPath {
        total: kicker_to_septum + septum_to_separation + layout.septum_length,
        kicker_to_septum,
        septum_to_separation,
    })
}

/// Separation after a kicker, drift, thin quadrupole and second drift.
///
/// The kick `kick` from a kicker of length `l_kick` opens a separation over
/// the drift `l1`; the quadrupole (`k`, `l`) adds `k·l·separation` to the
/// angle, which then acts over half the quadrupole and the drift `l2`.
pub fn quadrupole_deflection(k: f64, l: f64, kick: f64, l_kick: f64, l1: f64, l2: f64) -> f64 {
    let separation = kick * l1 + l_kick * kick / 2.0;
    let angle = k * l * separation + kick;
    angle * l2 + l * angle / 2.0 + separation
}

/// Magnetic field (T) bending by `angle` over `length` at rigidity `brho`.
pub fn field_for_angle(angle: f64, length: f64, brho: f64) -> Result<f64> {
    if !(length.is_finite() && length > 0.0) {
        return Err(OpticsError::geometry(format!(
            "magnet length must be positive, got {}",
            length
        )));
    }
    Ok(angle * brho / length)
}

/// Smallest kick for one septum angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KickSolution {
    pub perm: f64,
    /// Kick angle, rounded to 3 decimals
    pub kick: f64,
    pub path: InjectionPath,
}

/// Smallest kick keeping the total path below `max_path`, per septum angle.
///
/// Kicks are scanned upwards from `start_kick` in steps of `step`.
pub fn minimum_kicks(
    layout: &KickerSeptumLayout,
    perms: &[f64],
    start_kick: f64,
    step: f64,
    max_path: f64,
    max_steps: u64,
) -> Result<Vec<KickSolution>> {
    let points = threshold_scan(
        |perm, kick| path_length(layout, kick, perm).map(|p| p.total),
        perms,
        start_kick,
        step,
        max_path,
        ScanDirection::Below,
        max_steps,
    )?;

    points
        .into_iter()
        .map(|point| {
            let path = path_length(layout, point.inner, point.outer)?;
            debug!(
                "perm {:.4} rad: kick {:.3} rad, arms {:.3} m / {:.3} m",
                point.outer, point.inner, path.kicker_to_septum, path.septum_to_separation
            );
            Ok(KickSolution {
                perm: point.outer,
                kick: point.inner,
                path,
            })
        })
        .collect()
}
