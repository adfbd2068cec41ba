//! Configuration for the Verdant terrain streamer.
//!
//! Settings persist to disk as a RON file. Supports CLI overrides via clap,
//! hot-reload detection, and forward/backward compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BiomeSettings, BlendPolicy, Config, DebugConfig, GenerationConfig, PlacementSettings,
    SmoothEdges, VegetationSettings, ViewerConfig, WaterConfig, WorldConfig, default_biomes,
};
pub use error::ConfigError;
