//! Environment layer of the fit configuration.
//!
//! `FitConfig` is built from defaults, then overridden from the environment
//! (a `.env` file is loaded first if present), then from CLI flags in `app`.
//!
//! Recognised keys:
//!
//! | key                            | field                       |
//! |--------------------------------|-----------------------------|
//! | `CF_E_START`                   | `e_start`                   |
//! | `CF_E_END`                     | `e_end`                     |
//! | `CF_EXTRAPOLATION_METHOD`      | `model` (0 Swift, 1 Voce, 2 Swift-Voce) |
//! | `CF_TEMPLATE_PATH`             | `template_path`             |
//! | `CF_FRACTURE_STRESS_THRESHOLD` | `fracture_stress_threshold` |

use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::{FitConfig, ModelKind};
use crate::error::AppError;

pub const ENV_E_START: &str = "CF_E_START";
pub const ENV_E_END: &str = "CF_E_END";
pub const ENV_EXTRAPOLATION_METHOD: &str = "CF_EXTRAPOLATION_METHOD";
pub const ENV_TEMPLATE_PATH: &str = "CF_TEMPLATE_PATH";
pub const ENV_FRACTURE_STRESS_THRESHOLD: &str = "CF_FRACTURE_STRESS_THRESHOLD";

impl FitConfig {
    /// Defaults overridden by the process environment and `.env`.
    pub fn from_env() -> Result<Self, AppError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the `CF_*` keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = FitConfig::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get(ENV_E_START) {
            config.e_start = parse_value(ENV_E_START, &v)?;
        }
        if let Some(v) = get(ENV_E_END) {
            config.e_end = parse_value(ENV_E_END, &v)?;
        }
        if let Some(v) = get(ENV_EXTRAPOLATION_METHOD) {
            config.model = ModelKind::from_code(parse_value(ENV_EXTRAPOLATION_METHOD, &v)?)?;
        }
        if let Some(v) = get(ENV_TEMPLATE_PATH) {
            config.template_path = Some(PathBuf::from(v.trim_matches('"')));
        }
        if let Some(v) = get(ENV_FRACTURE_STRESS_THRESHOLD) {
            config.fracture_stress_threshold = parse_value(ENV_FRACTURE_STRESS_THRESHOLD, &v)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject combinations no cycle can run with.
    pub fn validate(&self) -> Result<(), AppError> {
        // Windows with fewer than two distinct strains fail later as a modulus fit error.
        if self.e_end.saturating_sub(self.e_start) < 50 {
            log::warn!(
                "Modulus window [{}, {}) spans fewer than 50 samples",
                self.e_start,
                self.e_end
            );
        }
        if self.resolution < 2 {
            return Err(AppError::Config(format!(
                "resolution must be at least 2 (got {})",
                self.resolution
            )));
        }
        if !(self.fracture_stress_threshold.is_finite() && self.fracture_stress_threshold >= 0.0) {
            return Err(AppError::Config(format!(
                "fracture stress threshold must be finite and >= 0 (got {})",
                self.fracture_stress_threshold
            )));
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| AppError::Config(format!("{key}='{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = FitConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.e_start, 0);
        assert_eq!(config.e_end, 300);
        assert_eq!(config.model, ModelKind::Swift);
        assert_eq!(config.fracture_stress_threshold, 50.0);
        assert!(config.template_path.is_none());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = FitConfig::from_lookup(lookup_from(&[
            (ENV_E_START, "10"),
            (ENV_E_END, " 120 "),
            (ENV_EXTRAPOLATION_METHOD, "2"),
            (ENV_TEMPLATE_PATH, "\"/tmp/mat24.k\""),
            (ENV_FRACTURE_STRESS_THRESHOLD, "25.5"),
        ]))
        .unwrap();
        assert_eq!((config.e_start, config.e_end), (10, 120));
        assert_eq!(config.model, ModelKind::SwiftVoce);
        assert_eq!(config.template_path, Some(PathBuf::from("/tmp/mat24.k")));
        assert_eq!(config.fracture_stress_threshold, 25.5);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        for pairs in [
            [(ENV_E_START, "abc")],
            [(ENV_EXTRAPOLATION_METHOD, "3")],
            [(ENV_FRACTURE_STRESS_THRESHOLD, "-1")],
        ] {
            let result = FitConfig::from_lookup(lookup_from(&pairs));
            assert!(matches!(result, Err(AppError::Config(_))), "{pairs:?}");
        }
    }

    #[test]
    fn degenerate_modulus_window_passes_validation() {
        for (start, end) in [(usize::MAX, 10), (50, 50), (10, 11)] {
            let config = FitConfig {
                e_start: start,
                e_end: end,
                ..FitConfig::default()
            };
            assert!(config.validate().is_ok(), "[{start}, {end})");
        }
    }
}
