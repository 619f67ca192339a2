//! Swift-Voce blend: `alpha·Swift + (1 − alpha)·Voce`.
//!
//! Both laws are fitted independently over the same window and evaluated on a
//! shared grid whose length equals the fit-window length. The weight is the
//! least-squares coefficient of `(Swift − Voce)` against the Voce residuals:
//!
//! ```text
//! alpha = |Σ (m − v)(s − v)| / Σ (s − v)²   clipped to [0, 1]
//! ```
//!
//! Falls back to an even blend when the two laws coincide on the window or the
//! ratio exceeds `BLEND_RATIO_LIMIT`.

use crate::domain::{ExtrapolationEnd, FitModel, MaterialCharacteristics, PlasticCurve};
use crate::error::AppError;
use crate::fit::fitter::{fit_swift, fit_voce, strain_grid};
use crate::models::{swift, voce};

/// Denominator below which Swift and Voce are treated as identical.
pub const BLEND_DENOMINATOR_EPS: f64 = 1e-4;

/// Raw weight ratio above which the weighting is numerically meaningless.
pub const BLEND_RATIO_LIMIT: f64 = 10.0;

/// Weight of the Swift law, always in `[0, 1]`.
pub fn blend_weight(measured: &[f64], swift_stress: &[f64], voce_stress: &[f64]) -> f64 {
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for ((&m, &s), &v) in measured.iter().zip(swift_stress).zip(voce_stress) {
        let diff = s - v;
        numerator += (m - v) * diff;
        denominator += diff * diff;
    }

    if !(denominator >= BLEND_DENOMINATOR_EPS) {
        return 0.5;
    }
    let ratio = numerator.abs() / denominator;
    if !(ratio <= BLEND_RATIO_LIMIT) {
        log::warn!("Swift-Voce weight ratio {ratio:.3} exceeds {BLEND_RATIO_LIMIT}; using an even blend");
        return 0.5;
    }
    ratio.clamp(0.0, 1.0)
}

/// Fit Swift and Voce separately and combine them with `blend_weight`.
pub fn fit_swift_voce(plastic: &PlasticCurve, chars: &MaterialCharacteristics) -> Result<FitModel, AppError> {
    let (swift_fit, voce_fit) = rayon::join(|| fit_swift(plastic, chars.ag, chars.rm), || fit_voce(plastic));
    let swift_p = swift_fit?.params;
    let voce_p = voce_fit?.params;

    let window = plastic.curve.len();
    let grid = strain_grid(plastic, ExtrapolationEnd::UpTo(plastic.end_index()), window)?;
    let swift_stress: Vec<f64> = grid.iter().map(|&e| swift(e, &swift_p)).collect();
    let voce_stress: Vec<f64> = grid.iter().map(|&e| voce(e, &voce_p)).collect();

    let alpha = blend_weight(&plastic.curve.stresses(), &swift_stress, &voce_stress);
    log::debug!("Swift-Voce weight alpha={alpha:.4} over {window} samples");

    Ok(FitModel::SwiftVoce {
        alpha,
        swift: swift_p,
        voce: voce_p,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Curve, SwiftParams, VoceParams};
    use crate::math::linspace;
    use rand::prelude::*;
    use rand::rngs::StdRng;

    #[test]
    fn identical_models_give_even_blend() {
        let curve = [300.0, 350.0, 380.0, 400.0];
        let measured = [310.0, 340.0, 390.0, 395.0];
        assert_eq!(blend_weight(&measured, &curve, &curve), 0.5);
    }

    #[test]
    fn measured_equal_to_swift_gives_full_swift_weight() {
        let s = [300.0, 360.0, 400.0, 430.0];
        let v = [300.0, 340.0, 370.0, 380.0];
        assert!((blend_weight(&s, &s, &v) - 1.0).abs() < 1e-12);
        assert!(blend_weight(&v, &s, &v).abs() < 1e-12);
    }

    #[test]
    fn unstable_ratio_falls_back_to_even_blend() {
        let v = [300.0, 300.0];
        let m = [300.0, 400.0];
        // Denominator 4e-4 passes the epsilon, ratio 2 / 4e-4 = 5000 does not.
        assert_eq!(blend_weight(&m, &[300.0, 300.02], &v), 0.5);
        // Denominator 2.5e-5 is below the epsilon.
        assert_eq!(blend_weight(&m, &[300.0, 300.005], &v), 0.5);
    }

    #[test]
    fn weight_is_always_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let swift_p = SwiftParams {
                c: rng.gen_range(400.0..1200.0),
                phi: rng.gen_range(0.001..0.1),
                n: rng.gen_range(0.05..0.5),
            };
            let voce_p = VoceParams {
                sigma: rng.gen_range(150.0..500.0),
                r: rng.gen_range(10.0..400.0),
                b: rng.gen_range(1.0..60.0),
            };
            let grid = linspace(0.0, 0.2, 50);
            let s: Vec<f64> = grid.iter().map(|&e| swift(e, &swift_p)).collect();
            let v: Vec<f64> = grid.iter().map(|&e| voce(e, &voce_p)).collect();
            let m: Vec<f64> = s
                .iter()
                .zip(&v)
                .map(|(a, b)| 0.5 * (a + b) + rng.gen_range(-20.0..20.0))
                .collect();
            let alpha = blend_weight(&m, &s, &v);
            assert!((0.0..=1.0).contains(&alpha), "alpha={alpha}");
        }
    }

    #[test]
    fn blend_of_mixed_data_lands_between_models() {
        let swift_p = SwiftParams { c: 750.0, phi: 0.01, n: 0.18 };
        let voce_p = VoceParams { sigma: 320.0, r: 180.0, b: 25.0 };
        let pairs: Vec<(f64, f64)> = linspace(0.0, 0.15, 80)
            .into_iter()
            .map(|e| (e, 0.3 * swift(e, &swift_p) + 0.7 * voce(e, &voce_p)))
            .collect();
        let plastic = PlasticCurve {
            offset: 40,
            curve: Curve::from_pairs(&pairs),
        };
        let chars = MaterialCharacteristics {
            e: 200_000.0,
            rp02: pairs[0].1,
            rp02_index: 40,
            rm: 470.0,
            rm_index: 120,
            ag: 0.15,
            af: 0.25,
        };

        match fit_swift_voce(&plastic, &chars).unwrap() {
            FitModel::SwiftVoce { alpha, .. } => assert!((0.0..=1.0).contains(&alpha)),
            other => panic!("unexpected model {other:?}"),
        }
    }
}
