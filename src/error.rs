//! Error taxonomy shared by every stage of a characterization/fit cycle.
//!
//! Each variant carries enough context (path, column count, window bounds) to
//! be shown verbatim to the user, and maps to a process exit code.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Input or output path does not resolve to an existing file.
    #[error("FileError - The provided file: {} does not exist.", path.display())]
    File { path: PathBuf },

    /// The input table does not have exactly two columns.
    #[error("DataError - Expected 2 columns (strain, stress) but found {columns}.")]
    Data { columns: usize },

    /// Missing/invalid template document or failed placeholder substitution.
    #[error("TemplateError - Invalid template {}: {reason}", path.display())]
    Template { path: PathBuf, reason: String },

    /// Requested export point count is outside `[2, 100]`.
    #[error("ExportPointNoError - Number of export points must be between 2 and 100 (got {value}).")]
    ExportPointNo { value: usize },

    /// Numerical fit failed (degenerate window or solver non-convergence).
    #[error("FitError - {stage} fit over window [{start}, {end}) failed: {reason}")]
    Fit {
        stage: String,
        start: usize,
        end: usize,
        reason: String,
    },

    /// The input table contains no data rows.
    #[error("The input table contains no data rows.")]
    NoSamples,

    /// A value in the input table could not be parsed.
    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// Invalid configuration value (env or CLI).
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Underlying I/O failure with context.
    #[error("{0}")]
    Io(String),
}

impl AppError {
    pub fn fit(stage: impl Into<String>, start: usize, end: usize, reason: impl Into<String>) -> Self {
        Self::Fit {
            stage: stage.into(),
            start,
            end,
            reason: reason.into(),
        }
    }

    pub fn template(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Template {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::NoSamples => 3,
            AppError::Fit { .. } => 4,
            _ => 2,
        }
    }
}
