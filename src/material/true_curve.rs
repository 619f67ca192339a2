//! Engineering → true stress/strain conversion.
//!
//! Valid only up to necking onset (Rm): beyond it the uniform-deformation
//! assumption no longer holds, so samples at and after `Rm_index` are dropped.

use crate::domain::{Curve, CurvePoint, PlasticCurve, TrueCurve};
use crate::error::AppError;

/// `ε_true = ln(1 + ε_eng)`, `σ_true = σ_eng·exp(ε_true)` for indices `0..rm_index`.
pub fn true_curve(curve: &Curve, rm_index: usize) -> TrueCurve {
    let end = rm_index.min(curve.len());
    let points = curve.points()[..end]
        .iter()
        .map(|p| {
            let strain = p.strain.ln_1p();
            CurvePoint::new(strain, p.stress * strain.exp())
        })
        .collect();
    TrueCurve {
        curve: Curve::new(points),
    }
}

/// Post-yield branch: true strain re-zeroed at `rp02_index`, true stress unchanged.
pub fn plastic_curve(true_curve: &TrueCurve, rp02_index: usize) -> Result<PlasticCurve, AppError> {
    let curve = &true_curve.curve;
    if rp02_index >= curve.len() {
        return Err(AppError::fit(
            "Plastic branch",
            rp02_index,
            curve.len(),
            "yield index is not below the ultimate index",
        ));
    }

    let origin = curve.strain(rp02_index);
    let points = curve.points()[rp02_index..]
        .iter()
        .map(|p| CurvePoint::new(p.strain - origin, p.stress))
        .collect();

    Ok(PlasticCurve {
        offset: rp02_index,
        curve: Curve::new(points),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eng() -> Curve {
        Curve::from_pairs(&[(0.0, 0.0), (0.001, 200.0), (0.01, 300.0), (0.05, 400.0), (0.1, 450.0), (0.12, 440.0)])
    }

    #[test]
    fn conversion_stops_before_rm() {
        let t = true_curve(&eng(), 4);
        assert_eq!(t.curve.len(), 4);
        let e = 0.05f64;
        assert!((t.curve.strain(3) - (1.0 + e).ln()).abs() < 1e-15);
        assert!((t.curve.stress(3) - 400.0 * (1.0 + e)).abs() < 1e-9);
    }

    #[test]
    fn plastic_branch_starts_at_zero_strain() {
        let t = true_curve(&eng(), 4);
        let p = plastic_curve(&t, 1).unwrap();
        assert_eq!(p.offset, 1);
        assert_eq!(p.end_index(), 4);
        assert_eq!(p.curve.strain(0), 0.0);
        assert!((p.curve.strain(2) - (1.05f64.ln() - 1.001f64.ln())).abs() < 1e-14);
        assert_eq!(p.curve.stress(2), t.curve.stress(3));
    }

    #[test]
    fn yield_at_or_after_rm_is_rejected() {
        let t = true_curve(&eng(), 2);
        assert!(plastic_curve(&t, 2).is_err());
    }
}
