//! Synthetic tensile-test specimens.
//!
//! The generated engineering curve has four regions:
//!
//! 1. linear elastic loading up to the yield stress
//! 2. quadratic hardening to the ultimate point (zero slope at Rm)
//! 3. quadratic softening (necking) down to the fracture stress
//! 4. a single post-fracture sample at zero stress
//!
//! Optional Gaussian noise is added to every stress except the origin.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Curve, CurvePoint};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct SpecimenSpec {
    pub modulus: f64,
    pub yield_stress: f64,
    pub ultimate_stress: f64,
    /// Total engineering strain at the ultimate point.
    pub ultimate_strain: f64,
    pub fracture_strain: f64,
    pub fracture_stress: f64,
    pub elastic_samples: usize,
    pub plastic_samples: usize,
    /// Standard deviation of additive stress noise (0 disables noise).
    pub noise_std: f64,
}

impl Default for SpecimenSpec {
    fn default() -> Self {
        Self {
            modulus: 210_000.0,
            yield_stress: 350.0,
            ultimate_stress: 480.0,
            ultimate_strain: 0.15,
            fracture_strain: 0.22,
            fracture_stress: 380.0,
            elastic_samples: 120,
            plastic_samples: 400,
            noise_std: 0.0,
        }
    }
}

impl SpecimenSpec {
    fn validate(&self) -> Result<(), AppError> {
        let yield_strain = self.yield_stress / self.modulus;
        if !(self.modulus.is_finite() && self.modulus > 0.0) {
            return Err(AppError::Config("specimen modulus must be > 0".to_string()));
        }
        if !(self.yield_stress > 0.0 && self.ultimate_stress > self.yield_stress) {
            return Err(AppError::Config(
                "specimen stresses must satisfy 0 < yield < ultimate".to_string(),
            ));
        }
        if !(self.ultimate_strain > yield_strain && self.fracture_strain > self.ultimate_strain) {
            return Err(AppError::Config(
                "specimen strains must satisfy yield < ultimate < fracture".to_string(),
            ));
        }
        if !(self.fracture_stress >= 0.0 && self.fracture_stress < self.ultimate_stress) {
            return Err(AppError::Config(
                "specimen fracture stress must be in [0, ultimate)".to_string(),
            ));
        }
        if self.elastic_samples < 2 || self.plastic_samples < 2 {
            return Err(AppError::Config("specimen needs at least 2 elastic and 2 plastic samples".to_string()));
        }
        if !(self.noise_std.is_finite() && self.noise_std >= 0.0) {
            return Err(AppError::Config("specimen noise must be finite and >= 0".to_string()));
        }
        Ok(())
    }

    /// Noise-free engineering stress at `strain` (before fracture).
    pub fn stress_at(&self, strain: f64) -> f64 {
        let yield_strain = self.yield_stress / self.modulus;
        if strain <= yield_strain {
            return self.modulus * strain;
        }
        if strain <= self.ultimate_strain {
            let t = (strain - yield_strain) / (self.ultimate_strain - yield_strain);
            let one_minus = 1.0 - t;
            return self.yield_stress + (self.ultimate_stress - self.yield_stress) * (1.0 - one_minus * one_minus);
        }
        let u = ((strain - self.ultimate_strain) / (self.fracture_strain - self.ultimate_strain)).min(1.0);
        self.ultimate_stress - (self.ultimate_stress - self.fracture_stress) * u * u
    }
}

/// Generate a specimen curve; `seed` only matters when noise is enabled.
pub fn generate_specimen(spec: &SpecimenSpec, seed: u64) -> Result<Curve, AppError> {
    spec.validate()?;

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, spec.noise_std)
        .map_err(|e| AppError::Config(format!("noise distribution error: {e}")))?;

    let yield_strain = spec.yield_stress / spec.modulus;
    let elastic_step = yield_strain / spec.elastic_samples as f64;
    let plastic_step = (spec.fracture_strain - yield_strain) / spec.plastic_samples as f64;

    let mut points = Vec::with_capacity(spec.elastic_samples + spec.plastic_samples + 2);

    for i in 0..spec.elastic_samples {
        let strain = elastic_step * i as f64;
        points.push(CurvePoint::new(strain, spec.modulus * strain));
    }
    for i in 0..=spec.plastic_samples {
        let strain = yield_strain + plastic_step * i as f64;
        points.push(CurvePoint::new(strain, spec.stress_at(strain)));
    }
    points.push(CurvePoint::new(spec.fracture_strain + plastic_step, 0.0));

    if spec.noise_std > 0.0 {
        for p in points.iter_mut().skip(1) {
            p.stress += normal.sample(&mut rng);
        }
    }

    Ok(Curve::new(points))
}

/// Write a curve as a two-column `strain;stress` CSV with a header.
pub fn write_specimen_csv(path: &std::path::Path, curve: &Curve) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .map_err(|e| AppError::Io(format!("Failed to create specimen CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["strain", "stress"])
        .map_err(|e| AppError::Io(format!("Failed to write specimen CSV header: {e}")))?;
    for p in curve.points() {
        writer
            .write_record([format!("{:.8}", p.strain), format!("{:.4}", p.stress)])
            .map_err(|e| AppError::Io(format!("Failed to write specimen CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::Io(format!("Failed to flush specimen CSV: {e}")))?;
    Ok(())
}
