//! Read/write curve JSON files.
//!
//! Curve JSON is the "portable" representation of a fit cycle:
//! - material characteristics (E, Rp02, Rm, Ag, Af and their indices)
//! - model kind + parameters
//! - the extrapolated true-stress grid for quick plotting
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::domain::{CurveFile, CurveGrid, ExtrapolatedCurve, MaterialCharacteristics};
use crate::error::AppError;

pub const TOOL_NAME: &str = "cf";

/// Assemble the JSON document for a finished cycle.
pub fn curve_file(
    material: &MaterialCharacteristics,
    extrapolated: &ExtrapolatedCurve,
    source: Option<&Path>,
) -> CurveFile {
    CurveFile {
        tool: TOOL_NAME.to_string(),
        generated_at: Utc::now(),
        source: source.map(|p| p.display().to_string()),
        material: *material,
        model: extrapolated.model,
        grid: CurveGrid {
            strain: extrapolated.strain.clone(),
            stress: extrapolated.stress.clone(),
        },
    }
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, curve: &CurveFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::Io(format!("Failed to create curve JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, curve)
        .map_err(|e| AppError::Io(format!("Failed to write curve JSON: {e}")))?;
    log::info!("Curve JSON written to {}", path.display());
    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    if !path.is_file() {
        return Err(AppError::File {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path)
        .map_err(|e| AppError::Io(format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    let curve: CurveFile =
        serde_json::from_reader(file).map_err(|e| AppError::Io(format!("Invalid curve JSON: {e}")))?;
    if curve.grid.strain.len() != curve.grid.stress.len() {
        return Err(AppError::Io(format!(
            "Invalid curve JSON: grid has {} strains but {} stresses",
            curve.grid.strain.len(),
            curve.grid.stress.len()
        )));
    }
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitModel, SwiftParams, VoceParams};

    #[test]
    fn json_keeps_model_and_grid() {
        let material = MaterialCharacteristics {
            e: 205_000.0,
            rp02: 352.0,
            rp02_index: 130,
            rm: 481.0,
            rm_index: 400,
            ag: 0.147,
            af: 0.22,
        };
        let extrapolated = ExtrapolatedCurve {
            strain: vec![0.0, 0.5, 1.0],
            stress: vec![350.0, 700.0, 820.0],
            model: FitModel::SwiftVoce {
                alpha: 0.4,
                swift: SwiftParams { c: 800.0, phi: 0.01, n: 0.2 },
                voce: VoceParams { sigma: 340.0, r: 220.0, b: 18.0 },
            },
        };

        let doc = curve_file(&material, &extrapolated, Some(Path::new("spec1.csv")));
        let path = std::env::temp_dir().join(format!("flow_curves_curve_{}.json", std::process::id()));
        write_curve_json(&path, &doc).unwrap();
        let back = read_curve_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(back.tool, "cf");
        assert_eq!(back.source.as_deref(), Some("spec1.csv"));
        assert_eq!(back.material, material);
        assert_eq!(back.model, extrapolated.model);
        assert_eq!(back.grid.stress, extrapolated.stress);
    }

    #[test]
    fn mismatched_grid_is_rejected() {
        let path = std::env::temp_dir().join(format!("flow_curves_bad_{}.json", std::process::id()));
        let text = r#"{"tool":"cf","generated_at":"2024-01-01T00:00:00Z","source":null,
            "material":{"e":1.0,"rp02":1.0,"rp02_index":1,"rm":2.0,"rm_index":2,"ag":0.1,"af":0.2},
            "model":{"kind":"swift","c":800.0,"phi":0.01,"n":0.2},
            "grid":{"strain":[0.0,1.0],"stress":[1.0]}}"#;
        std::fs::write(&path, text).unwrap();
        let result = read_curve_json(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
