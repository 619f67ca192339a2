//! Command-line parsing for the tensile-test flow curve fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the characterization/fitting code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{ModelKind, SpacingMode};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cf", version, about = "Tensile-test characterization and flow curve fitting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Characterize a tensile test, fit a flow curve and print the summary.
    Fit(FitArgs),
    /// Fit and write an LS-DYNA material card from a `.k` template.
    Export(ExportArgs),
    /// Plot a previously exported curve JSON.
    Plot(PlotArgs),
    /// Write a synthetic tensile-test CSV.
    Sample(SampleArgs),
}

/// Options shared by every command that runs a fit cycle.
///
/// Unset options fall back to the environment (`CF_*`, `.env`) and then to
/// the built-in defaults.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Two-column (strain, stress) CSV file.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// First sample of the modulus window.
    #[arg(long)]
    pub e_start: Option<usize>,

    /// End (exclusive) of the modulus window.
    #[arg(long)]
    pub e_end: Option<usize>,

    /// Flow curve model.
    #[arg(short = 'm', long, value_enum)]
    pub method: Option<ModelKind>,

    /// Number of re-sampled points on the fitted curve.
    #[arg(long, default_value_t = crate::domain::DEFAULT_RESOLUTION)]
    pub resolution: usize,

    /// Extrapolate only up to this curve index instead of plastic strain 1.0.
    #[arg(long, value_name = "INDEX")]
    pub end_index: Option<usize>,

    /// Last-sample stress below which the specimen counts as fractured.
    #[arg(long)]
    pub fracture_threshold: Option<f64>,

    /// Render an ASCII plot in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export curve (characteristics + model + fitted grid) to JSON.
    #[arg(long = "export-curve", value_name = "JSON")]
    pub export_curve: Option<PathBuf>,
}

/// Options for writing a material card.
#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub fit: FitArgs,

    /// Existing `.k` file to overwrite with the card.
    #[arg(short = 'o', long, value_name = "K_FILE")]
    pub dest: PathBuf,

    /// `.k` template with `$%key` placeholders (defaults to CF_TEMPLATE_PATH).
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Card title.
    #[arg(long, default_value = "")]
    pub title: String,

    /// Material id.
    #[arg(long, default_value = "1")]
    pub mid: String,

    /// Density.
    #[arg(long, default_value = "7.85e-9")]
    pub ro: String,

    /// Poisson ratio.
    #[arg(long, default_value = "0.3")]
    pub pr: String,

    /// Failure strain (defaults to Af rounded to 2 decimals).
    #[arg(long)]
    pub fail: Option<String>,

    /// Number of exported curve points (2..=100).
    #[arg(short = 'n', long, default_value_t = 20)]
    pub points: usize,

    /// Point spacing along the fitted curve.
    #[arg(long, value_enum, default_value_t = SpacingMode::Equal)]
    pub spacing: SpacingMode,
}

/// Options for plotting a saved curve.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Curve JSON file produced by `cf fit --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for generating a synthetic specimen.
#[derive(Debug, Args)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: PathBuf,

    /// Random seed for the stress noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Standard deviation of the stress noise.
    #[arg(long, default_value_t = 0.5)]
    pub noise: f64,

    /// Young's modulus.
    #[arg(long, default_value_t = 210_000.0)]
    pub modulus: f64,

    /// Yield stress.
    #[arg(long, default_value_t = 350.0)]
    pub yield_stress: f64,

    /// Ultimate tensile strength.
    #[arg(long, default_value_t = 480.0)]
    pub ultimate_stress: f64,
}
