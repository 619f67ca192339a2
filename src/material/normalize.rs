//! Zero-offset a raw (strain, stress) table so the first sample is the origin.

use crate::domain::{Curve, CurvePoint};
use crate::error::AppError;

/// Subtract the first row's strain and stress from every row.
pub fn normalize(raw: &[CurvePoint]) -> Result<Curve, AppError> {
    let first = *raw.first().ok_or(AppError::NoSamples)?;
    Ok(Curve::new(
        raw.iter()
            .map(|p| CurvePoint::new(p.strain - first.strain, p.stress - first.stress))
            .collect(),
    ))
}
