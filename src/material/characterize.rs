//! Characteristic values of a normalized engineering stress-strain curve.
//!
//! - **E**: line through the origin fitted to the modulus window `[e_start, e_end)`
//! - **Rp0.2**: sample closest to the 0.2% offset line `(ε − 0.002)·E`
//! - **Rm**: maximum stress
//! - **Ag**: total strain at Rm minus its elastic part `Rm/E`
//! - **Af**: plastic strain at the last sample (test stopped before fracture) or
//!   just before the steepest stress drop (specimen fractured)

use crate::domain::{Curve, MaterialCharacteristics, PROOF_STRAIN_OFFSET};
use crate::error::AppError;
use crate::math::fit_origin_line;

/// Compute all characteristic values. The input curve is not modified.
pub fn characterize(
    curve: &Curve,
    e_start: usize,
    e_end: usize,
    fracture_stress_threshold: f64,
) -> Result<MaterialCharacteristics, AppError> {
    if curve.is_empty() {
        return Err(AppError::NoSamples);
    }

    let e = elastic_modulus(curve, e_start, e_end)?;

    let rp02_index = proof_stress_index(curve, e);
    let rp02 = curve.stress(rp02_index);

    let rm_index = ultimate_index(curve);
    let rm = curve.stress(rm_index);

    if rp02_index >= rm_index {
        return Err(AppError::fit(
            "Yield point",
            rp02_index,
            rm_index,
            format!(
                "Rp0.2 index {rp02_index} is not before the Rm index {rm_index}; check the modulus window [{e_start}, {e_end})"
            ),
        ));
    }

    let ag = curve.strain(rm_index) - rm / e;

    let af_index = failure_index(curve, fracture_stress_threshold);
    let af = curve.strain(af_index) - curve.stress(af_index) / e;

    log::debug!("modulus window [{e_start}, {e_end}) -> E={e:.3}; Rp02 at {rp02_index}, Rm at {rm_index}, Af at {af_index}");

    Ok(MaterialCharacteristics {
        e,
        rp02,
        rp02_index,
        rm,
        rm_index,
        ag,
        af,
    })
}

/// Least-squares slope of `σ = E·ε` over `[e_start, e_end)`.
///
/// `e_end` is clamped to the curve length. Fewer than two distinct strain
/// values in the window is a fit error.
pub fn elastic_modulus(curve: &Curve, e_start: usize, e_end: usize) -> Result<f64, AppError> {
    let end = e_end.min(curve.len());
    if end < e_end {
        log::warn!(
            "modulus window end {e_end} exceeds curve length {}; using [{e_start}, {end})",
            curve.len()
        );
    }
    let window = curve.points().get(e_start..end).unwrap_or(&[]);

    let mut distinct: Vec<f64> = window.iter().map(|p| p.strain).collect();
    distinct.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    distinct.dedup();
    if distinct.len() < 2 {
        return Err(AppError::fit(
            "Elastic modulus",
            e_start,
            e_end,
            format!("window contains {} distinct strain value(s), need at least 2", distinct.len()),
        ));
    }

    let x: Vec<f64> = window.iter().map(|p| p.strain).collect();
    let y: Vec<f64> = window.iter().map(|p| p.stress).collect();

    match fit_origin_line(&x, &y) {
        Some(e) if e.is_finite() && e > 0.0 => Ok(e),
        Some(e) => Err(AppError::fit(
            "Elastic modulus",
            e_start,
            e_end,
            format!("fitted modulus {e} is not positive"),
        )),
        None => Err(AppError::fit("Elastic modulus", e_start, e_end, "least-squares solve failed")),
    }
}

/// Index minimizing `|σ − (ε − 0.002)·E|` (first one on ties).
pub fn proof_stress_index(curve: &Curve, e: f64) -> usize {
    argmin_by(curve.points().iter().map(|p| (p.stress - (p.strain - PROOF_STRAIN_OFFSET) * e).abs()))
}

/// First index of the maximum stress.
pub fn ultimate_index(curve: &Curve) -> usize {
    argmin_by(curve.points().iter().map(|p| -p.stress))
}

/// Sample used for the failure strain.
///
/// If the last stress is above `threshold` the test was stopped early and the last
/// sample is used. Otherwise fracture is located at the steepest single-step
/// drop and the sample just before it is used.
pub fn failure_index(curve: &Curve, threshold: f64) -> usize {
    let last = curve.len().saturating_sub(1);
    let stopped_early = curve.last().is_some_and(|p| p.stress > threshold);
    if stopped_early || curve.len() < 2 {
        return last;
    }

    let drops = curve.points().windows(2).map(|w| w[1].stress - w[0].stress);
    // drops[k] is the step into sample k + 1, so the sample before it is k.
    argmin_by(drops)
}

fn argmin_by(values: impl Iterator<Item = f64>) -> usize {
    let mut best = 0usize;
    let mut best_v = f64::INFINITY;
    for (i, v) in values.enumerate() {
        if v < best_v {
            best = i;
            best_v = v;
        }
    }
    best
}
