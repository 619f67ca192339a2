//! Levenberg–Marquardt solver for small nonlinear least-squares problems.
//!
//! Minimizes `Σ (y_i − f(p; x_i))²` over a parameter vector `p` of length 1–3.
//! Each iteration solves the damped normal equations
//!
//! ```text
//! (JᵀJ + λ·diag(JᵀJ)) δ = Jᵀr
//! ```
//!
//! with the SVD solver from [`super::ols`]. Steps that do not reduce the SSE
//! (or produce non-finite residuals) are rejected and the damping is raised.

use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use crate::math::ols::solve_least_squares;

/// A model `f(p; x)` with an analytic gradient `∂f/∂p`.
pub trait LeastSquaresModel {
    fn param_count(&self) -> usize;

    fn value(&self, params: &[f64], x: f64) -> f64;

    /// Write `∂f/∂p_j` at `x` into `out[j]`.
    fn gradient(&self, params: &[f64], x: f64, out: &mut [f64]);
}

#[derive(Debug, Clone)]
pub struct LmOptions {
    /// Relative SSE reduction below which an accepted step ends the solve.
    pub ftol: f64,
    /// Relative step size below which the solve ends.
    pub xtol: f64,
    /// Gradient threshold, relative to `1 + SSE`.
    pub gtol: f64,
    /// Model evaluation budget; `None` means `200·(m+1)`.
    pub max_evals: Option<usize>,
    pub initial_damping: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            ftol: 1.49012e-8,
            xtol: 1.49012e-8,
            gtol: 1e-12,
            max_evals: None,
            initial_damping: 1e-3,
        }
    }
}

/// Converged solution.
#[derive(Debug, Clone)]
pub struct LmReport {
    pub params: Vec<f64>,
    pub sse: f64,
    pub iterations: usize,
    pub evaluations: usize,
}

/// Why a solve stopped without a usable solution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LmFailure {
    #[error("improper input: {0}")]
    InvalidInput(String),
    #[error("model produced non-finite values at the current parameters")]
    NonFinite,
    #[error("no convergence after {evaluations} function evaluations")]
    BudgetExhausted { evaluations: usize },
    #[error("damping grew without reducing the residual")]
    DampingBlowUp,
}

const MAX_DAMPING: f64 = 1e16;
const MIN_DAMPING: f64 = 1e-15;

/// Fit `model` to `(x, y)` starting from `p0`.
pub fn levenberg_marquardt<M: LeastSquaresModel>(
    model: &M,
    x: &[f64],
    y: &[f64],
    p0: &[f64],
    opts: &LmOptions,
) -> Result<LmReport, LmFailure> {
    let m = model.param_count();
    let n = x.len();
    if p0.len() != m {
        return Err(LmFailure::InvalidInput(format!(
            "expected {m} initial parameters, got {}",
            p0.len()
        )));
    }
    if n != y.len() {
        return Err(LmFailure::InvalidInput(format!("{n} x values but {} y values", y.len())));
    }
    if n < m {
        return Err(LmFailure::InvalidInput(format!(
            "{n} samples cannot determine {m} parameters"
        )));
    }
    if p0.iter().any(|v| !v.is_finite()) {
        return Err(LmFailure::InvalidInput("initial guess is not finite".to_string()));
    }

    let max_evals = opts.max_evals.unwrap_or(200 * (m + 1));

    let mut p = DVector::from_column_slice(p0);
    let (mut r, mut sse) = residuals(model, x, y, &p);
    let mut evaluations = 1usize;
    if !sse.is_finite() {
        return Err(LmFailure::NonFinite);
    }

    let mut jac = DMatrix::<f64>::zeros(n, m);
    let mut row = vec![0.0; m];
    let mut lambda: Option<f64> = None;
    let mut iterations = 0usize;

    loop {
        if sse == 0.0 {
            return Ok(report(&p, sse, iterations, evaluations));
        }

        for i in 0..n {
            model.gradient(p.as_slice(), x[i], &mut row);
            for j in 0..m {
                jac[(i, j)] = row[j];
            }
        }
        if jac.iter().any(|v| !v.is_finite()) {
            return Err(LmFailure::NonFinite);
        }

        let jt = jac.transpose();
        let a = &jt * &jac;
        let g = &jt * &r;

        if g.amax() <= opts.gtol * (1.0 + sse) {
            return Ok(report(&p, sse, iterations, evaluations));
        }

        let mut lam = lambda.unwrap_or_else(|| {
            let max_diag = (0..m).map(|j| a[(j, j)]).fold(0.0_f64, f64::max);
            (opts.initial_damping * max_diag).max(MIN_DAMPING)
        });

        // Inner loop: raise damping until a step reduces the SSE.
        loop {
            let mut damped = a.clone();
            for j in 0..m {
                damped[(j, j)] += lam * a[(j, j)].max(1e-12);
            }

            let step = solve_least_squares(&damped, &g);
            if let Some(delta) = step {
                let candidate = &p + &delta;
                let (r_new, sse_new) = residuals(model, x, y, &candidate);
                evaluations += 1;

                let step_small = delta.norm() <= opts.xtol * (opts.xtol + p.norm());

                if sse_new.is_finite() && sse_new < sse {
                    let rel = (sse - sse_new) / sse;
                    p = candidate;
                    r = r_new;
                    sse = sse_new;
                    lam = (lam / 3.0).max(MIN_DAMPING);
                    lambda = Some(lam);
                    iterations += 1;

                    log::trace!("lm iter={iterations} sse={sse:.6e} lambda={lam:.3e}");

                    if rel <= opts.ftol || step_small {
                        return Ok(report(&p, sse, iterations, evaluations));
                    }
                    break;
                }

                if step_small {
                    return Ok(report(&p, sse, iterations, evaluations));
                }
            }

            lam *= 4.0;
            if lam > MAX_DAMPING {
                return Err(LmFailure::DampingBlowUp);
            }
            if evaluations >= max_evals {
                return Err(LmFailure::BudgetExhausted { evaluations });
            }
        }

        if evaluations >= max_evals {
            return Err(LmFailure::BudgetExhausted { evaluations });
        }
    }
}

fn residuals<M: LeastSquaresModel>(model: &M, x: &[f64], y: &[f64], p: &DVector<f64>) -> (DVector<f64>, f64) {
    let r = DVector::from_iterator(
        x.len(),
        x.iter().zip(y).map(|(&xi, &yi)| yi - model.value(p.as_slice(), xi)),
    );
    let sse = r.norm_squared();
    (r, sse)
}

fn report(p: &DVector<f64>, sse: f64, iterations: usize, evaluations: usize) -> LmReport {
    LmReport {
        params: p.iter().copied().collect(),
        sse,
        iterations,
        evaluations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `a·exp(b·x)`.
    struct Exponential;

    impl LeastSquaresModel for Exponential {
        fn param_count(&self) -> usize {
            2
        }

        fn value(&self, p: &[f64], x: f64) -> f64 {
            p[0] * (p[1] * x).exp()
        }

        fn gradient(&self, p: &[f64], x: f64, out: &mut [f64]) {
            let e = (p[1] * x).exp();
            out[0] = e;
            out[1] = p[0] * x * e;
        }
    }

    #[test]
    fn recovers_exponential_parameters() {
        let x: Vec<f64> = (0..30).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = x.iter().map(|&v| 2.5 * (0.7 * v).exp()).collect();

        let fit = levenberg_marquardt(&Exponential, &x, &y, &[1.0, 0.3], &LmOptions::default()).unwrap();
        assert!((fit.params[0] - 2.5).abs() < 1e-6, "a={}", fit.params[0]);
        assert!((fit.params[1] - 0.7).abs() < 1e-6, "b={}", fit.params[1]);
        assert!(fit.sse < 1e-8);
    }

    #[test]
    fn rejects_underdetermined_problem() {
        let err = levenberg_marquardt(&Exponential, &[1.0], &[2.0], &[1.0, 1.0], &LmOptions::default())
            .unwrap_err();
        assert!(matches!(err, LmFailure::InvalidInput(_)));
    }

    #[test]
    fn rejects_non_finite_start() {
        let err = levenberg_marquardt(&Exponential, &[0.0, 1.0], &[1.0, 2.0], &[f64::NAN, 1.0], &LmOptions::default())
            .unwrap_err();
        assert!(matches!(err, LmFailure::InvalidInput(_)));
    }

    #[test]
    fn tiny_budget_is_reported() {
        let x: Vec<f64> = (0..30).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = x.iter().map(|&v| 2.5 * (0.7 * v).exp()).collect();
        let opts = LmOptions {
            max_evals: Some(2),
            ..LmOptions::default()
        };
        let err = levenberg_marquardt(&Exponential, &x, &y, &[0.1, 3.0], &opts).unwrap_err();
        assert!(matches!(err, LmFailure::BudgetExhausted { .. }));
        assert!(err.to_string().starts_with("no convergence after"), "{err}");
    }
}
