//! Sparse re-sampling of a fitted curve into an LS-DYNA material card record.
//!
//! The record maps the fixed placeholder keys of a `*MAT_PIECEWISE_LINEAR_PLASTICITY`
//! template (`Title, mid, ro, E, pr, fail, a0..a100, o0..o100`) to fixed-width
//! strings. Curve slots that are not used hold the LS-DYNA comment marker `$`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::{CardMeta, ExtrapolatedCurve, SpacingMode};
use crate::error::AppError;
use crate::io::template::substitute;
use crate::math::linspace_indices;

pub const MIN_EXPORT_POINTS: usize = 2;
pub const MAX_EXPORT_POINTS: usize = 100;

/// Number of `a{i}`/`o{i}` slot pairs in every record.
pub const CURVE_SLOTS: usize = 101;

/// Placeholder written into unused curve slots.
pub const SLOT_SENTINEL: &str = "$";

/// Share of the weighted export points placed in the lower half of the curve.
const WEIGHTED_LOWER_SHARE: f64 = 0.6;

const CURVE_WIDTH: usize = 20;
const SCALAR_WIDTH: usize = 10;

/// Key/value record substituted into the material card template.
pub type ExportRecord = BTreeMap<String, String>;

/// Select curve indices to export.
///
/// `Equal` yields `n + 1` evenly spaced indices over the whole curve. `Weighted`
/// puts `round(0.6 n)` indices into the lower half and the rest into the upper
/// half; the merged set is ascending and free of duplicates.
pub fn select_indices(len: usize, n: usize, spacing: SpacingMode) -> Result<Vec<usize>, AppError> {
    if !(MIN_EXPORT_POINTS..=MAX_EXPORT_POINTS).contains(&n) {
        return Err(AppError::ExportPointNo { value: n });
    }
    if len == 0 {
        return Err(AppError::NoSamples);
    }
    let last = len - 1;

    if spacing == SpacingMode::Equal {
        return Ok(linspace_indices(0, last, n + 1));
    }

    let lower = (n as f64 * WEIGHTED_LOWER_SHARE).round_ties_even() as usize;
    let upper = n - lower;
    let half = last / 2;

    let mut ids = linspace_indices(0, half, lower);
    ids.extend(linspace_indices((half + 1).min(last), last, upper));
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

/// Build the template record for a fitted curve.
pub fn build_record(
    curve: &ExtrapolatedCurve,
    e: f64,
    meta: &CardMeta,
    n: usize,
    spacing: SpacingMode,
) -> Result<ExportRecord, AppError> {
    let ids = select_indices(curve.len(), n, spacing)?;

    let mut record = ExportRecord::new();
    record.insert("Title".to_string(), meta.title.clone());
    record.insert("mid".to_string(), rjust(&meta.mid, SCALAR_WIDTH));
    record.insert("ro".to_string(), rjust(&meta.ro, SCALAR_WIDTH));
    record.insert("E".to_string(), rjust(&format_rounded(e, 2), SCALAR_WIDTH));
    record.insert("pr".to_string(), rjust(&meta.pr, SCALAR_WIDTH));
    record.insert("fail".to_string(), rjust(&meta.fail, SCALAR_WIDTH));

    for slot in 0..CURVE_SLOTS {
        let (a, o) = match ids.get(slot) {
            Some(&i) => (
                rjust(&format_rounded(curve.strain[i], 3), CURVE_WIDTH),
                rjust(&format_rounded(curve.stress[i], 3), CURVE_WIDTH),
            ),
            None => (SLOT_SENTINEL.to_string(), SLOT_SENTINEL.to_string()),
        };
        record.insert(format!("a{slot}"), a);
        record.insert(format!("o{slot}"), o);
    }

    log::debug!("Export record holds {} curve points", ids.len().min(CURVE_SLOTS));
    Ok(record)
}

/// Substitute `record` into the `.k` template and overwrite `dest`.
///
/// The destination has to exist already.
pub fn write_material_card(record: &ExportRecord, template_path: &Path, dest: &Path) -> Result<PathBuf, AppError> {
    let is_k_file = template_path.is_file() && template_path.extension().is_some_and(|ext| ext == "k");
    if !is_k_file {
        return Err(AppError::template(template_path, "expected an existing '.k' file"));
    }
    if !dest.is_file() {
        return Err(AppError::File {
            path: dest.to_path_buf(),
        });
    }

    let template = std::fs::read_to_string(template_path)
        .map_err(|e| AppError::template(template_path, format!("read failed: {e}")))?;
    let card = substitute(&template, record).map_err(|reason| AppError::template(template_path, reason))?;

    std::fs::write(dest, card)
        .map_err(|e| AppError::Io(format!("Failed to write material card '{}': {e}", dest.display())))?;
    log::info!("Material card written to {}", dest.display());
    Ok(dest.to_path_buf())
}

/// Round to `decimals` and print the shortest form, keeping at least one
/// fractional digit (`210000.0`, `0.05`, `-0.0`).
fn format_rounded(value: f64, decimals: usize) -> String {
    let mut s = format!("{value:.decimals$}");
    if s.contains('.') {
        while s.ends_with('0') && !s.ends_with(".0") {
            s.pop();
        }
    }
    s
}

fn rjust(value: &str, width: usize) -> String {
    format!("{value:>width$}")
}
