//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - layers defaults, environment and flags into a `FitConfig`
//! - runs the characterization/fit cycle
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, ExportArgs, FitArgs, PlotArgs, SampleArgs};
use crate::data::{SpecimenSpec, generate_specimen, write_specimen_csv};
use crate::domain::{CardMeta, ExtrapolationEnd, FitConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `cf` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Export(args) => handle_export(args),
        Command::Plot(args) => handle_plot(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args, FitConfig::from_env()?)?;
    let run = pipeline::run_file(&args.input, &config)?;

    println!(
        "{}",
        crate::report::format_run_summary(Some(&args.input), &run.characteristics, &run.extrapolated, &config)
    );

    let ids = crate::io::select_indices(run.extrapolated.len(), 10, crate::domain::SpacingMode::Equal)?;
    println!("{}", crate::report::format_curve_table(&run.extrapolated, &ids));

    if args.plot {
        let plot = crate::plot::render_flow_plot(&run.plastic, &run.extrapolated, args.width, args.height);
        println!("{plot}");
    }

    if let Some(path) = &args.export_curve {
        let doc = crate::io::curve_file(&run.characteristics, &run.extrapolated, Some(&args.input));
        crate::io::write_curve_json(path, &doc)?;
    }

    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args.fit, FitConfig::from_env()?)?;
    let template = args
        .template
        .clone()
        .or_else(|| config.template_path.clone())
        .ok_or_else(|| AppError::Config("no template given (use --template or CF_TEMPLATE_PATH)".to_string()))?;

    let run = pipeline::run_file(&args.fit.input, &config)?;

    let meta = CardMeta {
        title: args.title.clone(),
        mid: args.mid.clone(),
        ro: args.ro.clone(),
        pr: args.pr.clone(),
        fail: args
            .fail
            .clone()
            .unwrap_or_else(|| format!("{:.2}", run.characteristics.af)),
    };
    let record = crate::io::build_record(
        &run.extrapolated,
        run.characteristics.e,
        &meta,
        args.points,
        args.spacing,
    )?;
    let written = crate::io::write_material_card(&record, &template, &args.dest)?;

    println!(
        "{}",
        crate::report::format_run_summary(Some(&args.fit.input), &run.characteristics, &run.extrapolated, &config)
    );
    println!("Material card written to {}", written.display());
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let curve = crate::io::read_curve_json(&args.curve)?;
    let plot = crate::plot::render_curve_file(&curve, args.width, args.height);
    println!("{plot}");
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let spec = SpecimenSpec {
        modulus: args.modulus,
        yield_stress: args.yield_stress,
        ultimate_stress: args.ultimate_stress,
        noise_std: args.noise,
        ..SpecimenSpec::default()
    };
    let curve = generate_specimen(&spec, args.seed)?;
    write_specimen_csv(&args.output, &curve)?;
    log::info!("Wrote {} samples to {}", curve.len(), args.output.display());
    println!("Synthetic specimen written to {}", args.output.display());
    Ok(())
}

/// Apply CLI overrides on top of an environment-derived configuration.
pub fn fit_config_from_args(args: &FitArgs, base: FitConfig) -> Result<FitConfig, AppError> {
    let config = FitConfig {
        e_start: args.e_start.unwrap_or(base.e_start),
        e_end: args.e_end.unwrap_or(base.e_end),
        model: args.method.unwrap_or(base.model),
        end: args.end_index.map_or(ExtrapolationEnd::Full, ExtrapolationEnd::UpTo),
        resolution: args.resolution,
        fracture_stress_threshold: args.fracture_threshold.unwrap_or(base.fracture_stress_threshold),
        template_path: base.template_path,
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::ModelKind;

    fn fit_args(argv: &[&str]) -> FitArgs {
        let mut full = vec!["cf", "fit", "a.csv"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Fit(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn flags_override_environment() {
        let base = FitConfig {
            e_start: 5,
            e_end: 200,
            model: ModelKind::Voce,
            ..FitConfig::default()
        };
        let config = fit_config_from_args(&fit_args(&["--e-end", "90", "--end-index", "150"]), base).unwrap();
        assert_eq!(config.e_start, 5);
        assert_eq!(config.e_end, 90);
        assert_eq!(config.model, ModelKind::Voce);
        assert_eq!(config.end, ExtrapolationEnd::UpTo(150));
    }

    #[test]
    fn invalid_override_is_rejected() {
        let result = fit_config_from_args(&fit_args(&["--resolution", "1"]), FitConfig::default());
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
