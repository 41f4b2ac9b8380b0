use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::distance::DistanceOracle;
use super::proximity::{MatchOutcome, ProximityMatcher};
use super::zones;
use crate::config::app_config::AppConfig;
use crate::data::file_chooser::choose_file;
use crate::data::records_loader::{load_entity_set, resolve_csv_file, LoadOptions};
use crate::models::location_record::EntityRole;
use crate::render::proximity_layers::compose_map;
use crate::utils::csv_export::CsvExporter;
use crate::utils::workspace::Workspace;

/// Everything one run needs besides the configuration.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub base_dir: PathBuf,
    pub aggressors: Option<PathBuf>,
    pub victims: Option<PathBuf>,
    pub output_file: String,
    pub parallel: bool,
    pub export_csv: bool,
}

#[derive(Debug)]
pub struct SessionSummary {
    pub map_path: PathBuf,
    pub export_files: Vec<PathBuf>,
    pub outcome: MatchOutcome,
    pub cached_pairs: usize,
}

/// Resolves an explicit path, or asks on the console when none was given.
fn select_input<R: BufRead, W: Write>(
    explicit: Option<&Path>,
    data_dir: &Path,
    role: EntityRole,
    input: &mut R,
    output: &mut W,
) -> Result<PathBuf> {
    let path = match explicit {
        Some(path) => resolve_csv_file(path),
        None => choose_file(data_dir, role, input, output),
    };
    path.with_context(|| format!("could not select the {} file", role.label().to_lowercase()))
}

/// Runs one session reading file choices from stdin when needed.
pub fn run_session(config: &AppConfig, options: &SessionOptions) -> Result<SessionSummary> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    run_session_with_io(config, options, &mut input, &mut output)
}

pub fn run_session_with_io<R: BufRead, W: Write>(
    config: &AppConfig,
    options: &SessionOptions,
    input: &mut R,
    output: &mut W,
) -> Result<SessionSummary> {
    let workspace = Workspace::setup(&options.base_dir)
        .with_context(|| format!("could not prepare workspace in {}", options.base_dir.display()))?;

    let aggressor_file = select_input(options.aggressors.as_deref(), &workspace.data_dir, EntityRole::Aggressor, input, output)?;
    let victim_file = select_input(options.victims.as_deref(), &workspace.data_dir, EntityRole::Victim, input, output)?;

    let load_options = LoadOptions {
        location_column: config.location_column.clone(),
        valid_precision: config.valid_precision,
    };
    let aggressors = load_entity_set(&aggressor_file, EntityRole::Aggressor, &load_options)
        .with_context(|| format!("failed to load aggressors from {}", aggressor_file.display()))?;
    let victims = load_entity_set(&victim_file, EntityRole::Victim, &load_options)
        .with_context(|| format!("failed to load victims from {}", victim_file.display()))?;

    let oracle = DistanceOracle::new();
    let matcher = ProximityMatcher::new(&oracle);
    let outcome = if options.parallel {
        matcher.run_parallel(&victims, &aggressors, config.proximity_distance)
    } else {
        matcher.run(&victims, &aggressors, config.proximity_distance)
    }
    .context("proximity matching failed")?;

    debug!(
        cached_pairs = oracle.cached_pairs(),
        hits = oracle.hits(),
        misses = oracle.misses(),
        "distance cache"
    );

    let footprints = zones::expand(&config.secured_areas, config.proximity_distance);
    let map = compose_map(&footprints, &config.secured_areas, &victims, &aggressors, &outcome);
    let map_path = map
        .save(&workspace.result_dir, &options.output_file)
        .with_context(|| format!("could not write map to {}", workspace.result_dir.display()))?;

    let export_files = if options.export_csv {
        let exporter = CsvExporter::new(&workspace.result_dir)
            .map_err(|e| anyhow::anyhow!(e))
            .context("could not create export directory")?;
        exporter
            .export_outcome(&outcome)
            .map_err(|e| anyhow::anyhow!(e))
            .context("could not export results")?
    } else {
        Vec::new()
    };

    info!(
        near = outcome.near_count(),
        alerts = outcome.trigger_count(),
        map = %map_path.display(),
        "session complete"
    );

    Ok(SessionSummary {
        map_path,
        export_files,
        cached_pairs: oracle.cached_pairs(),
        outcome,
    })
}
