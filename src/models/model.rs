//! Flow-curve model evaluation for Swift / Voce / Swift-Voce.
//!
//! The fitter relies on two primitive operations per model:
//! - predict `σ(ε)` given parameters (for residuals, re-sampling and plots)
//! - the gradient `∂σ/∂p` (for the Levenberg–Marquardt Jacobian)
//!
//! Parameter slices follow the flat order used by `FitModel::params()`.

use crate::domain::{FitModel, SwiftParams, VoceParams};
use crate::math::LeastSquaresModel;

/// `c·(phi + ε)^n`
pub fn swift(strain: f64, p: &SwiftParams) -> f64 {
    p.c * (p.phi + strain).powf(p.n)
}

/// `sigma + R·(1 − exp(−B·ε))`
pub fn voce(strain: f64, p: &VoceParams) -> f64 {
    p.sigma + p.r * (1.0 - (-p.b * strain).exp())
}

/// `alpha·Swift + (1 − alpha)·Voce`
pub fn swift_voce(strain: f64, alpha: f64, swift_p: &SwiftParams, voce_p: &VoceParams) -> f64 {
    alpha * swift(strain, swift_p) + (1.0 - alpha) * voce(strain, voce_p)
}

/// Predict the flow stress at `strain` for a fitted model.
pub fn predict(model: &FitModel, strain: f64) -> f64 {
    match model {
        FitModel::Swift(p) => swift(strain, p),
        FitModel::Voce(p) => voce(strain, p),
        FitModel::SwiftVoce { alpha, swift: s, voce: v } => swift_voce(strain, *alpha, s, v),
    }
}

/// Swift law as a least-squares model over `[c, phi, n]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwiftLaw;

impl SwiftLaw {
    pub fn params(p: &[f64]) -> SwiftParams {
        SwiftParams { c: p[0], phi: p[1], n: p[2] }
    }
}

impl LeastSquaresModel for SwiftLaw {
    fn param_count(&self) -> usize {
        3
    }

    fn value(&self, p: &[f64], x: f64) -> f64 {
        swift(x, &Self::params(p))
    }

    fn gradient(&self, p: &[f64], x: f64, out: &mut [f64]) {
        let (c, phi, n) = (p[0], p[1], p[2]);
        let base = phi + x;
        let pow = base.powf(n);
        out[0] = pow;
        out[1] = c * n * base.powf(n - 1.0);
        out[2] = c * pow * base.ln();
    }
}

/// Voce law as a least-squares model over `[sigma, R, B]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoceLaw;

impl VoceLaw {
    pub fn params(p: &[f64]) -> VoceParams {
        VoceParams { sigma: p[0], r: p[1], b: p[2] }
    }
}

impl LeastSquaresModel for VoceLaw {
    fn param_count(&self) -> usize {
        3
    }

    fn value(&self, p: &[f64], x: f64) -> f64 {
        voce(x, &Self::params(p))
    }

    fn gradient(&self, p: &[f64], x: f64, out: &mut [f64]) {
        let (r, b) = (p[1], p[2]);
        let decay = (-b * x).exp();
        out[0] = 1.0;
        out[1] = 1.0 - decay;
        out[2] = r * x * decay;
    }
}
