//! Linear least squares solver.
//!
//! Two places in the pipeline reduce to a small linear least-squares problem:
//!
//! ```text
//! minimize ‖X β − y‖²
//! ```
//!
//! - the elastic modulus (one column: strain, through the origin)
//! - each damped Gauss–Newton step of the Levenberg–Marquardt solver
//!
//! Implementation choices:
//! - SVD handles tall design matrices directly (nalgebra's `QR::solve` expects
//!   square systems).
//! - Parameter dimension is tiny (1–3 columns), so SVD cost is negligible.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Slope of the line through the origin `y = m·x` minimizing squared residuals.
///
/// Returns `None` when all `x` are zero (no information about the slope).
pub fn fit_origin_line(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.is_empty() || x.len() != y.len() || x.iter().all(|v| *v == 0.0) {
        return None;
    }
    let xm = DMatrix::from_column_slice(x.len(), 1, x);
    let yv = DVector::from_column_slice(y);
    let beta = solve_least_squares(&xm, &yv)?;
    Some(beta[0])
}
