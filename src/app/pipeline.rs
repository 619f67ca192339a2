//! Shared characterization/fit cycle used by every CLI command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! normalized curve -> characteristics -> true curve -> plastic branch -> fit/extrapolation
//!
//! The commands can then focus on presentation (summary, plot, exports).

use std::path::Path;

use crate::domain::{
    Curve, ExtrapolatedCurve, FitConfig, MaterialCharacteristics, PlasticCurve, TrueCurve,
};
use crate::error::AppError;
use crate::fit::extrapolate;
use crate::io::load_curve;
use crate::material::{characterize, plastic_curve, true_curve};

/// All computed outputs of a single cycle.
#[derive(Debug, Clone)]
pub struct CycleOutput {
    pub curve: Curve,
    pub characteristics: MaterialCharacteristics,
    pub true_curve: TrueCurve,
    pub plastic: PlasticCurve,
    pub extrapolated: ExtrapolatedCurve,
}

/// Load `path` and run a full cycle on it.
pub fn run_file(path: &Path, config: &FitConfig) -> Result<CycleOutput, AppError> {
    let curve = load_curve(path)?;
    run_cycle(curve, config)
}

/// Run a full cycle on an already normalized curve.
///
/// Either every stage succeeds or the first error is returned; nothing is
/// defaulted.
pub fn run_cycle(curve: Curve, config: &FitConfig) -> Result<CycleOutput, AppError> {
    config.validate()?;

    // 1) Characteristic values.
    let characteristics = characterize(
        &curve,
        config.e_start,
        config.e_end,
        config.fracture_stress_threshold,
    )?;
    log::info!(
        "E={:.2} Rp0.2={:.3}@{} Rm={:.3}@{} Ag={:.5} Af={:.5}",
        characteristics.e,
        characteristics.rp02,
        characteristics.rp02_index,
        characteristics.rm,
        characteristics.rm_index,
        characteristics.ag,
        characteristics.af
    );

    // 2) True curve up to Rm, plastic branch from Rp0.2.
    let true_curve = true_curve(&curve, characteristics.rm_index);
    let plastic = plastic_curve(&true_curve, characteristics.rp02_index)?;

    // 3) Fit + re-sample.
    let extrapolated = extrapolate(
        &plastic,
        &characteristics,
        config.model,
        config.end,
        config.resolution,
    )?;
    log::info!(
        "{} parameters {:?} ({} grid points)",
        config.model.display_name(),
        extrapolated.model.params(),
        extrapolated.len()
    );

    Ok(CycleOutput {
        curve,
        characteristics,
        true_curve,
        plastic,
        extrapolated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SpecimenSpec, generate_specimen};
    use crate::domain::{ExtrapolationEnd, FitModel, ModelKind};

    fn specimen() -> Curve {
        let spec = SpecimenSpec {
            noise_std: 0.5,
            ..SpecimenSpec::default()
        };
        generate_specimen(&spec, 7).unwrap()
    }

    fn config(model: ModelKind) -> FitConfig {
        FitConfig {
            e_start: 0,
            e_end: 100,
            model,
            ..FitConfig::default()
        }
    }

    #[test]
    fn full_cycle_for_every_model() {
        let curve = specimen();
        for model in [ModelKind::Swift, ModelKind::Voce, ModelKind::SwiftVoce] {
            let out = run_cycle(curve.clone(), &config(model)).unwrap();

            assert!((out.characteristics.e - 210_000.0).abs() / 210_000.0 < 0.02);
            assert!(out.characteristics.rp02_index < out.characteristics.rm_index);
            assert_eq!(out.true_curve.curve.len(), out.characteristics.rm_index);
            assert_eq!(
                out.characteristics.fit_window(),
                (out.plastic.offset, out.plastic.end_index())
            );

            assert_eq!(out.extrapolated.model.kind(), model);
            assert_eq!(out.extrapolated.len(), 101);
            assert!(out.extrapolated.model.params().iter().all(|p| p.is_finite()));
            assert!(out.extrapolated.stress.iter().all(|s| s.is_finite()));
            if let FitModel::SwiftVoce { alpha, .. } = out.extrapolated.model {
                assert!((0.0..=1.0).contains(&alpha));
            }
        }
    }

    #[test]
    fn bounded_extrapolation_stays_inside_the_branch() {
        let curve = specimen();
        let first = run_cycle(curve.clone(), &config(ModelKind::Voce)).unwrap();
        let k = first.characteristics.rm_index;

        let cfg = FitConfig {
            end: ExtrapolationEnd::UpTo(k),
            resolution: 40,
            ..config(ModelKind::Voce)
        };
        let out = run_cycle(curve, &cfg).unwrap();
        assert_eq!(out.extrapolated.len(), 40);
        let last = *out.extrapolated.strain.last().unwrap();
        assert_eq!(Some(last), out.plastic.strain_at_global(k - 1));
    }

    #[test]
    fn degenerate_modulus_window_is_a_fit_error() {
        for (e_start, e_end) in [(50, 50), (50, 51), (usize::MAX, 10)] {
            let cfg = FitConfig {
                e_start,
                e_end,
                ..FitConfig::default()
            };
            let err = run_cycle(specimen(), &cfg).unwrap_err();
            assert!(
                matches!(&err, AppError::Fit { stage, .. } if stage == "Elastic modulus"),
                "[{e_start}, {e_end}): {err}"
            );
            assert_eq!(err.exit_code(), 4);
        }
    }
}
