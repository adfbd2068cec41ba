//! Command-line argument parsing for the headless terrain streamer.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Verdant command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "verdant", about = "Streams biome terrain around a scripted viewer")]
pub struct CliArgs {
    /// World seed.
    #[arg(long)]
    pub seed: Option<i64>,

    /// Spawn window radius in chunks.
    #[arg(long)]
    pub view_distance: Option<u32>,

    /// Background generation threads (0 = synchronous).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Number of simulation ticks to run.
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Disable the water plane.
    #[arg(long)]
    pub no_water: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if let Some(vd) = args.view_distance {
            self.world.view_distance = vd;
        }
        if let Some(workers) = args.workers {
            self.generation.worker_threads = workers;
        }
        if let Some(ticks) = args.ticks {
            self.viewer.ticks = ticks;
        }
        if args.no_water {
            self.water.enabled = false;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
