//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the characterization/fitting code stays clean and testable
//! - output changes are localized

use std::path::Path;

use crate::domain::{ExtrapolatedCurve, ExtrapolationEnd, FitConfig, FitModel, MaterialCharacteristics};

/// Format the full run summary (input + characteristics + fitted model).
pub fn format_run_summary(
    source: Option<&Path>,
    chars: &MaterialCharacteristics,
    curve: &ExtrapolatedCurve,
    config: &FitConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== cf - Flow Curve Fit ===\n");
    if let Some(path) = source {
        out.push_str(&format!("Input: {}\n", path.display()));
    }
    out.push_str(&format!(
        "Modulus window: [{}, {}) | method={} ({}) | end={} | resolution={}\n",
        config.e_start,
        config.e_end,
        config.model.display_name(),
        config.model.code(),
        fmt_end(config.end),
        config.resolution,
    ));

    out.push_str("\nMaterial characteristics:\n");
    out.push_str(&format!("- E    : {:.2}\n", chars.e));
    out.push_str(&format!("- Rp0.2: {:.3} (index {})\n", chars.rp02, chars.rp02_index));
    out.push_str(&format!("- Rm   : {:.3} (index {})\n", chars.rm, chars.rm_index));
    out.push_str(&format!("- Ag   : {:.5}\n", chars.ag));
    out.push_str(&format!("- Af   : {:.5}\n", chars.af));

    out.push_str("\nFitted model:\n");
    let (start, end) = chars.fit_window();
    out.push_str(&format!("- {} over [{start}, {end})\n", curve.model.kind().display_name()));
    out.push_str(&format_params(&curve.model));
    if let (Some(first), Some(last)) = (curve.strain.first(), curve.strain.last()) {
        out.push_str(&format!(
            "- grid : {} points, plastic strain [{:.4}, {:.4}]\n",
            curve.len(),
            first,
            last
        ));
    }
    out.push('\n');

    out
}

/// Format selected rows of the extrapolated curve.
pub fn format_curve_table(curve: &ExtrapolatedCurve, ids: &[usize]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:>6} {:>14} {:>14}\n", "index", "plastic_strain", "true_stress").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<6} {:-<14} {:-<14}\n", "", "", "").trim_end());
    out.push('\n');

    for &i in ids {
        let (Some(e), Some(s)) = (curve.strain.get(i), curve.stress.get(i)) else {
            continue;
        };
        out.push_str(format!("{i:>6} {e:>14.5} {s:>14.3}\n").trim_end());
        out.push('\n');
    }

    out
}

fn format_params(model: &FitModel) -> String {
    let names = model.param_names();
    let values = model.params();
    let width = names.iter().map(|n| n.len()).max().unwrap_or(0);

    let mut out = String::new();
    for (name, value) in names.iter().zip(&values) {
        out.push_str(&format!("- {name:<width$}: {value:.6}\n"));
    }
    out.push_str(&format!("- params: {}\n", fmt_vec(&values)));
    out
}

fn fmt_end(end: ExtrapolationEnd) -> String {
    match end {
        ExtrapolationEnd::Full => "full".to_string(),
        ExtrapolationEnd::UpTo(k) => format!("index {k}"),
    }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}
