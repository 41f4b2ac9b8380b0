use clap::Parser;

use crate::config::constants::DEFAULT_OUTPUT_FILE;

#[derive(Parser, Debug)]
#[command(author, version, about = "Maps victim observations that fall within range of aggressor observations", long_about = None)]
pub struct Args {
    #[arg(short, long, help = "Aggressor CSV file, or a directory holding exactly one CSV")]
    aggressors: Option<String>,

    #[arg(long, help = "Victim CSV file, or a directory holding exactly one CSV")]
    victims: Option<String>,

    #[arg(short, long, default_value = ".", help = "Directory containing data/ and result/")]
    base_dir: String,

    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    output_file: String,

    #[arg(long, help = "Env file to read instead of ./.env")]
    env_file: Option<String>,

    #[arg(short = 'd', long, help = "Override PROXIMITY_DISTANCE (meters)")]
    proximity_distance: Option<f64>,

    #[arg(short, long, default_value_t = false)]
    parallel: bool,

    #[arg(long, help = "Also write results and routes as CSV", default_value_t = false)]
    export_csv: bool,

    #[arg(long, default_value_t = false)]
    enable_timing: bool,

    #[arg(long, default_value_t = false)]
    debug_logging: bool,
}

impl Args {
    pub fn aggressors(&self) -> Option<&str> {
        self.aggressors.as_deref()
    }

    pub fn victims(&self) -> Option<&str> {
        self.victims.as_deref()
    }

    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }

    pub fn output_file(&self) -> &str {
        &self.output_file
    }

    pub fn env_file(&self) -> Option<&str> {
        self.env_file.as_deref()
    }

    pub fn proximity_distance(&self) -> Option<f64> {
        self.proximity_distance
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    pub fn export_csv(&self) -> bool {
        self.export_csv
    }

    pub fn enable_timing(&self) -> bool {
        self.enable_timing
    }

    pub fn debug_logging(&self) -> bool {
        self.debug_logging
    }
}
