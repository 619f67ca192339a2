//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during characterization and fitting
//! - exported to JSON (curve files) and `.k` material cards
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Stress (in input units) above which the last sample is taken as "test stopped
/// before fracture" rather than "specimen fractured".
pub const DEFAULT_FRACTURE_STRESS_THRESHOLD: f64 = 50.0;

/// Offset strain used for the proof stress Rp0.2.
pub const PROOF_STRAIN_OFFSET: f64 = 0.002;

/// Default number of points produced by an extrapolation.
pub const DEFAULT_RESOLUTION: usize = 100;

/// A single (strain, stress) sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub strain: f64,
    pub stress: f64,
}

impl CurvePoint {
    pub fn new(strain: f64, stress: f64) -> Self {
        Self { strain, stress }
    }
}

/// Ordered stress-strain samples in acquisition order.
///
/// Strain is not required to be monotonic. Transforms always produce new curves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    points: Vec<CurvePoint>,
}

impl Curve {
    pub fn new(points: Vec<CurvePoint>) -> Self {
        Self { points }
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        Self::new(pairs.iter().map(|&(e, s)| CurvePoint::new(e, s)).collect())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn strain(&self, i: usize) -> f64 {
        self.points[i].strain
    }

    pub fn stress(&self, i: usize) -> f64 {
        self.points[i].stress
    }

    pub fn strains(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.strain).collect()
    }

    pub fn stresses(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.stress).collect()
    }

    pub fn last(&self) -> Option<&CurvePoint> {
        self.points.last()
    }
}

/// Characteristic values derived from the normalized engineering curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialCharacteristics {
    /// Elastic (Young's) modulus.
    pub e: f64,
    /// Proof stress at 0.2% plastic strain.
    pub rp02: f64,
    pub rp02_index: usize,
    /// Ultimate tensile strength.
    pub rm: f64,
    pub rm_index: usize,
    /// Uniform (plastic) strain at Rm.
    pub ag: f64,
    /// Plastic strain at failure.
    pub af: f64,
}

impl MaterialCharacteristics {
    /// Index window `[Rp02_index, Rm_index)` used for flow-curve fitting.
    pub fn fit_window(&self) -> (usize, usize) {
        (self.rp02_index, self.rm_index)
    }
}

/// True stress/strain up to (excluding) the ultimate-strength index.
#[derive(Debug, Clone, PartialEq)]
pub struct TrueCurve {
    pub curve: Curve,
}

/// Post-yield branch of the true curve, strain re-zeroed at `Rp02_index`.
///
/// `points[k]` belongs to global curve index `offset + k`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlasticCurve {
    pub offset: usize,
    pub curve: Curve,
}

impl PlasticCurve {
    /// Global index one past the last plastic sample (`Rm_index`).
    pub fn end_index(&self) -> usize {
        self.offset + self.curve.len()
    }

    /// Plastic strain at a global curve index, if inside the branch.
    pub fn strain_at_global(&self, index: usize) -> Option<f64> {
        index
            .checked_sub(self.offset)
            .filter(|&k| k < self.curve.len())
            .map(|k| self.curve.strain(k))
    }
}

/// Which flow-curve model to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    Swift,
    Voce,
    SwiftVoce,
}

impl ModelKind {
    /// Decode the persisted integer code (0=Swift, 1=Voce, 2=Swift-Voce).
    pub fn from_code(code: i64) -> Result<Self, AppError> {
        match code {
            0 => Ok(ModelKind::Swift),
            1 => Ok(ModelKind::Voce),
            2 => Ok(ModelKind::SwiftVoce),
            other => Err(AppError::Config(format!(
                "extrapolation method must be 0 (Swift), 1 (Voce) or 2 (Swift-Voce), got {other}"
            ))),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            ModelKind::Swift => 0,
            ModelKind::Voce => 1,
            ModelKind::SwiftVoce => 2,
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Swift => "Swift",
            ModelKind::Voce => "Voce",
            ModelKind::SwiftVoce => "Swift-Voce",
        }
    }
}

/// Swift (power-law) hardening: `c·(phi + ε)^n`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwiftParams {
    pub c: f64,
    pub phi: f64,
    pub n: f64,
}

/// Voce (saturation) hardening: `sigma + R·(1 − exp(−B·ε))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoceParams {
    pub sigma: f64,
    pub r: f64,
    pub b: f64,
}

/// A fitted flow-curve model with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FitModel {
    Swift(SwiftParams),
    Voce(VoceParams),
    SwiftVoce {
        alpha: f64,
        swift: SwiftParams,
        voce: VoceParams,
    },
}

impl FitModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            FitModel::Swift(_) => ModelKind::Swift,
            FitModel::Voce(_) => ModelKind::Voce,
            FitModel::SwiftVoce { .. } => ModelKind::SwiftVoce,
        }
    }

    /// Flat parameter vector in display order.
    pub fn params(&self) -> Vec<f64> {
        match self {
            FitModel::Swift(p) => vec![p.c, p.phi, p.n],
            FitModel::Voce(p) => vec![p.sigma, p.r, p.b],
            FitModel::SwiftVoce { alpha, swift, voce } => {
                vec![*alpha, swift.c, swift.phi, swift.n, voce.sigma, voce.r, voce.b]
            }
        }
    }

    /// Parameter names matching `params()`.
    pub fn param_names(&self) -> &'static [&'static str] {
        match self {
            FitModel::Swift(_) => &["c", "phi", "n"],
            FitModel::Voce(_) => &["sigma", "R", "B"],
            FitModel::SwiftVoce { .. } => &["alpha", "c", "phi", "n", "sigma", "R", "B"],
        }
    }
}

/// Upper strain bound of an extrapolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtrapolationEnd {
    /// Plastic strain `[0, 1]`, sampled with `resolution + 1` points.
    Full,
    /// Up to the plastic strain at global index `k - 1`, `resolution` points.
    UpTo(usize),
}

/// Fitted curve re-sampled on a uniform strain grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrapolatedCurve {
    pub strain: Vec<f64>,
    pub stress: Vec<f64>,
    pub model: FitModel,
}

impl ExtrapolatedCurve {
    pub fn len(&self) -> usize {
        self.strain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strain.is_empty()
    }
}

/// Spacing of the exported points along the extrapolated curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SpacingMode {
    /// Evenly spaced over the whole curve.
    Equal,
    /// 60% of points in the lower half of the curve, 40% in the upper half.
    Weighted,
}

/// User-supplied metadata for a material card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardMeta {
    pub title: String,
    pub mid: String,
    pub ro: String,
    pub pr: String,
    pub fail: String,
}

/// A full run's configuration as understood by the pipeline.
///
/// Derived from defaults, environment and CLI flags (in that order).
#[derive(Debug, Clone, PartialEq)]
pub struct FitConfig {
    /// First sample index of the modulus window (inclusive).
    pub e_start: usize,
    /// Last sample index of the modulus window (exclusive).
    pub e_end: usize,
    pub model: ModelKind,
    pub end: ExtrapolationEnd,
    pub resolution: usize,
    pub fracture_stress_threshold: f64,
    /// `.k` template used by `cf export`.
    pub template_path: Option<PathBuf>,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            e_start: 0,
            e_end: 300,
            model: ModelKind::Swift,
            end: ExtrapolationEnd::Full,
            resolution: DEFAULT_RESOLUTION,
            fracture_stress_threshold: DEFAULT_FRACTURE_STRESS_THRESHOLD,
            template_path: None,
        }
    }
}

/// A saved curve file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub source: Option<String>,
    pub material: MaterialCharacteristics,
    pub model: FitModel,
    pub grid: CurveGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub strain: Vec<f64>,
    pub stress: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_codes_round_trip() {
        for kind in [ModelKind::Swift, ModelKind::Voce, ModelKind::SwiftVoce] {
            assert_eq!(ModelKind::from_code(kind.code()).unwrap(), kind);
        }
        assert!(matches!(ModelKind::from_code(3), Err(AppError::Config(_))));
    }

    #[test]
    fn blend_params_follow_display_order() {
        let model = FitModel::SwiftVoce {
            alpha: 0.25,
            swift: SwiftParams { c: 800.0, phi: 0.01, n: 0.2 },
            voce: VoceParams { sigma: 300.0, r: 200.0, b: 15.0 },
        };
        assert_eq!(model.params(), vec![0.25, 800.0, 0.01, 0.2, 300.0, 200.0, 15.0]);
        assert_eq!(model.params().len(), model.param_names().len());
        assert_eq!(model.kind(), ModelKind::SwiftVoce);
    }

    #[test]
    fn plastic_curve_resolves_global_indices() {
        let plastic = PlasticCurve {
            offset: 10,
            curve: Curve::from_pairs(&[(0.0, 300.0), (0.01, 320.0), (0.02, 330.0)]),
        };
        assert_eq!(plastic.end_index(), 13);
        assert_eq!(plastic.strain_at_global(11), Some(0.01));
        assert_eq!(plastic.strain_at_global(9), None);
        assert_eq!(plastic.strain_at_global(13), None);
    }
}
