//! The `verdant` binary: a headless fly-through over streamed terrain.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use verdant_app::platform::PlatformDirs;
use verdant_app::{AppError, RunSummary, run_headless};
use verdant_config::{CliArgs, Config};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let dirs = match args.config.as_deref() {
        Some(dir) => PlatformDirs::with_config_dir(dir),
        None => match PlatformDirs::resolve() {
            Ok(dirs) => dirs,
            Err(e) => {
                eprintln!("Failed to resolve platform directories: {e}");
                return ExitCode::FAILURE;
            }
        },
    };

    let config = match load_config(&dirs, &args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    verdant_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!(config_dir = %dirs.config_dir.display(), "verdant starting");

    match run_headless(&config) {
        Ok(summary) => {
            report(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(dirs: &PlatformDirs, args: &CliArgs) -> Result<Config, AppError> {
    dirs.create_dirs()?;
    let mut config = Config::load_or_create(&dirs.config_dir)?;
    config.apply_cli_overrides(args);
    config.validate()?;
    Ok(config)
}

fn report(summary: &RunSummary) {
    println!("Verdant fly-through");
    println!("  ticks:        {} ({:.1}s simulated)", summary.ticks, summary.sim_time);
    println!(
        "  viewer:       ({:.1}, {:.1}, {:.1}) in chunk {}",
        summary.final_position.x,
        summary.final_position.y,
        summary.final_position.z,
        summary
            .final_chunk
            .map_or_else(|| "-".to_string(), |c| c.to_string())
    );
    println!(
        "  chunks:       {} spawned, {} despawned, peak {}",
        summary.spawned, summary.despawned, summary.peak_loaded
    );
    println!(
        "  tiles:        {} constructed, {} destroyed",
        summary.tiles_constructed, summary.tiles_destroyed
    );
    println!("  decorations:  {} spawned", summary.decorations_spawned);
    for (prototype, count) in &summary.decorations_by_prototype {
        println!("    {prototype:<16} {count}");
    }
}
