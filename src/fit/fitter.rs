//! Single-model flow-curve fits and extrapolation.
//!
//! Given the plastic branch `[Rp02_index, Rm_index)` we:
//! - build an analytic initial guess (Swift from Ag/Rm, Voce from the branch itself)
//! - refine it with Levenberg–Marquardt
//! - re-sample the fitted law on a uniform strain grid

use std::f64::consts::E;

use crate::domain::{
    ExtrapolatedCurve, ExtrapolationEnd, FitModel, MaterialCharacteristics, ModelKind, PlasticCurve, SwiftParams,
    VoceParams,
};
use crate::error::AppError;
use crate::fit::blend::fit_swift_voce;
use crate::math::{LeastSquaresModel, LmOptions, levenberg_marquardt, linspace};
use crate::models::{SwiftLaw, VoceLaw, predict};

/// Initial phi for the Swift law.
const SWIFT_PHI_SEED: f64 = 0.1;

/// Best fit for a single law.
#[derive(Debug, Clone, Copy)]
pub struct ModelFit<P> {
    pub params: P,
    pub sse: f64,
}

/// Swift seed: `n0 = ln(Ag + 1)`, `c0 = Rm·(e/n0)^n0`, `phi0 = 0.1`.
pub fn swift_seed(ag: f64, rm: f64) -> SwiftParams {
    let n = (ag + 1.0).ln();
    SwiftParams {
        c: rm * (E / n).powf(n),
        phi: SWIFT_PHI_SEED,
        n,
    }
}

/// Voce seed from the plastic branch.
///
/// `sigma0` is the first plastic stress, `R0` the remaining rise to the maximum,
/// and `B0` the inverse of the strain where half of that rise is reached.
pub fn voce_seed(plastic: &PlasticCurve) -> VoceParams {
    let stresses = plastic.curve.stresses();
    let sigma = stresses.first().copied().unwrap_or(f64::NAN);
    let max = stresses.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let r = max - sigma;

    let target = sigma + 0.5 * r;
    let mut half_idx = 0usize;
    let mut best = f64::INFINITY;
    for (i, s) in stresses.iter().enumerate() {
        let d = (s - target).abs();
        if d < best {
            best = d;
            half_idx = i;
        }
    }
    let eps_50 = if plastic.curve.is_empty() {
        f64::NAN
    } else {
        plastic.curve.strain(half_idx)
    };

    VoceParams { sigma, r, b: 1.0 / eps_50 }
}

/// Fit the Swift law to the whole plastic branch.
pub fn fit_swift(plastic: &PlasticCurve, ag: f64, rm: f64) -> Result<ModelFit<SwiftParams>, AppError> {
    fit_swift_with(plastic, ag, rm, &LmOptions::default())
}

/// `fit_swift` with explicit solver settings.
pub fn fit_swift_with(
    plastic: &PlasticCurve,
    ag: f64,
    rm: f64,
    opts: &LmOptions,
) -> Result<ModelFit<SwiftParams>, AppError> {
    let seed = swift_seed(ag, rm);
    log::debug!("Swift seed: c={:.4} phi={:.4} n={:.4}", seed.c, seed.phi, seed.n);

    let fit = run_solver(&SwiftLaw, ModelKind::Swift, plastic, &[seed.c, seed.phi, seed.n], opts)?;
    Ok(ModelFit {
        params: SwiftLaw::params(&fit.0),
        sse: fit.1,
    })
}

/// Fit the Voce law to the whole plastic branch.
pub fn fit_voce(plastic: &PlasticCurve) -> Result<ModelFit<VoceParams>, AppError> {
    fit_voce_with(plastic, &LmOptions::default())
}

/// `fit_voce` with explicit solver settings.
pub fn fit_voce_with(plastic: &PlasticCurve, opts: &LmOptions) -> Result<ModelFit<VoceParams>, AppError> {
    let seed = voce_seed(plastic);
    log::debug!("Voce seed: sigma={:.4} R={:.4} B={:.4}", seed.sigma, seed.r, seed.b);

    let fit = run_solver(&VoceLaw, ModelKind::Voce, plastic, &[seed.sigma, seed.r, seed.b], opts)?;
    Ok(ModelFit {
        params: VoceLaw::params(&fit.0),
        sse: fit.1,
    })
}

fn run_solver<M: LeastSquaresModel>(
    model: &M,
    kind: ModelKind,
    plastic: &PlasticCurve,
    seed: &[f64],
    opts: &LmOptions,
) -> Result<(Vec<f64>, f64), AppError> {
    let (start, end) = (plastic.offset, plastic.end_index());
    if seed.iter().any(|v| !v.is_finite()) {
        return Err(AppError::fit(
            kind.display_name(),
            start,
            end,
            format!("initial guess {seed:?} is not finite"),
        ));
    }

    let x = plastic.curve.strains();
    let y = plastic.curve.stresses();
    let report = levenberg_marquardt(model, &x, &y, seed, opts)
        .map_err(|failure| AppError::fit(kind.display_name(), start, end, failure.to_string()))?;

    log::debug!(
        "{} converged after {} iterations ({} evaluations), SSE={:.6e}",
        kind.display_name(),
        report.iterations,
        report.evaluations,
        report.sse
    );
    Ok((report.params, report.sse))
}

/// Uniform plastic-strain grid for re-sampling a fitted law.
pub fn strain_grid(plastic: &PlasticCurve, end: ExtrapolationEnd, resolution: usize) -> Result<Vec<f64>, AppError> {
    match end {
        ExtrapolationEnd::Full => Ok(linspace(0.0, 1.0, resolution + 1)),
        ExtrapolationEnd::UpTo(k) => {
            let upper = k
                .checked_sub(1)
                .and_then(|i| plastic.strain_at_global(i))
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "extrapolation end index {k} is outside the plastic branch ({}, {}]",
                        plastic.offset,
                        plastic.end_index()
                    ))
                })?;
            Ok(linspace(0.0, upper, resolution))
        }
    }
}

/// Fit `kind` to the plastic branch and re-sample it over `end`.
pub fn extrapolate(
    plastic: &PlasticCurve,
    chars: &MaterialCharacteristics,
    kind: ModelKind,
    end: ExtrapolationEnd,
    resolution: usize,
) -> Result<ExtrapolatedCurve, AppError> {
    if resolution == 0 {
        return Err(AppError::Config("resolution must be > 0".to_string()));
    }

    let model = match kind {
        ModelKind::Swift => FitModel::Swift(fit_swift(plastic, chars.ag, chars.rm)?.params),
        ModelKind::Voce => FitModel::Voce(fit_voce(plastic)?.params),
        ModelKind::SwiftVoce => fit_swift_voce(plastic, chars)?,
    };

    let strain = strain_grid(plastic, end, resolution)?;
    let stress: Vec<f64> = strain.iter().map(|&e| predict(&model, e)).collect();

    if stress.iter().any(|s| !s.is_finite()) {
        return Err(AppError::fit(
            kind.display_name(),
            plastic.offset,
            plastic.end_index(),
            format!("fitted parameters {:?} give non-finite stresses on the extrapolation grid", model.params()),
        ));
    }

    Ok(ExtrapolatedCurve { strain, stress, model })
}
