use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use geoprox::cli::cli::Args;
use geoprox::config::app_config::AppConfig;
use geoprox::core::session::{run_session, SessionOptions};
use geoprox::utils::logging;

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init_logging(args.enable_timing(), args.debug_logging()) {
        eprintln!("Failed to set up logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => {
            logging::print_timing_report();
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    // Configuration problems abort before any file is read.
    let mut config = match args.env_file() {
        Some(path) => AppConfig::load_from_file(Path::new(path)),
        None => AppConfig::load(),
    }
    .context("invalid configuration")?;

    if let Some(meters) = args.proximity_distance() {
        config = config.with_proximity_distance(meters).context("invalid --proximity-distance")?;
    }

    let options = SessionOptions {
        base_dir: PathBuf::from(args.base_dir()),
        aggressors: args.aggressors().map(PathBuf::from),
        victims: args.victims().map(PathBuf::from),
        output_file: args.output_file().to_string(),
        parallel: args.parallel(),
        export_csv: args.export_csv(),
    };

    println!("Proximity mapper");
    println!("Proximity distance: {}m, secured areas: {}, valid precision: {}",
             config.proximity_distance, config.secured_areas.len(), config.valid_precision);

    let summary = run_session(&config, &options)?;

    println!("{} of {} victim positions within {}m of an aggressor ({} alerts)",
             summary.outcome.near_count(),
             summary.outcome.results.len(),
             config.proximity_distance,
             summary.outcome.trigger_count());
    println!("Map generated successfully: {}", summary.map_path.display());
    for file in &summary.export_files {
        println!("Exported: {}", file.display());
    }

    Ok(())
}
