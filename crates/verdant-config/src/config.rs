//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration for a streaming session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Chunk geometry, noise and window settings.
    pub world: WorldConfig,
    /// Water plane settings.
    pub water: WaterConfig,
    /// Generation throughput and pooling settings.
    pub generation: GenerationConfig,
    /// Biome table, in registration order.
    pub biomes: Vec<BiomeSettings>,
    /// Scripted viewer for the headless runner.
    pub viewer: ViewerConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// How overlapping biome ranges combine at a point.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum BlendPolicy {
    /// Every biome whose faded range covers the point contributes by weight.
    #[default]
    Weighted,
    /// The first registered biome whose range contains the point wins outright.
    FirstMatch,
}

/// Edge handling for the one-ring height smoothing pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SmoothEdges {
    /// Sample one ring outside the chunk so edge vertices see a full 3x3 window.
    #[default]
    Apron,
    /// Edge and corner vertices average over their in-chunk neighbours only.
    Clamp,
}

/// World generation and streaming window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// World seed. Height, heat and wetness channels use 1x, 2x and 3x this value.
    pub seed: i64,
    /// Quads per chunk side; the vertex grid is `chunk_resolution + 1` wide.
    pub chunk_resolution: u32,
    /// World units between adjacent vertices.
    pub vertex_spacing: f32,
    /// Spawn window radius in chunks (Chebyshev).
    pub view_distance: u32,
    /// Extra rings kept loaded beyond the spawn window before eviction.
    pub hysteresis: u32,
    /// Noise scale for the heat channel.
    pub heat_noise_scale: f64,
    /// Noise scale for the wetness channel.
    pub wetness_noise_scale: f64,
    /// Width of the linear fade band outside each biome's climate range.
    pub fade_margin: f64,
    /// Biome combination policy.
    pub blend: BlendPolicy,
    /// Smoothing edge policy.
    pub smooth_edges: SmoothEdges,
    /// Hand a copy of each terrain mesh to the collision binding.
    pub collision: bool,
    /// Material handle applied to every terrain tile.
    pub terrain_material: String,
}

/// Water plane configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WaterConfig {
    /// Pair a water tile with every terrain chunk.
    pub enabled: bool,
    /// World-space height of the water plane.
    pub height: f32,
    /// RGBA colour of the water plane.
    pub color: [f32; 4],
    /// Material handle applied to every water tile.
    pub material: String,
}

/// Generation throughput and pool sizing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Background generation threads. `0` builds every chunk synchronously.
    pub worker_threads: usize,
    /// Maximum generation jobs submitted but not yet applied.
    pub max_in_flight: usize,
    /// Cap on idle tiles kept per pool. `None` keeps every released tile.
    pub max_free_tiles: Option<usize>,
}

/// How vegetation candidates are drawn.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlacementSettings {
    /// Each lattice vertex is accepted with probability `density`.
    #[default]
    PerVertex,
    /// `ceil(density * chunk_area)` uniform points are drawn in the footprint.
    PerArea,
}

/// One vegetation rule: a prototype, its density and its height band.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VegetationSettings {
    /// Decoration prototype handle. A rule without one is skipped.
    pub prototype: Option<String>,
    /// Per-vertex probability or instances per square world unit.
    pub density: f32,
    /// Candidate draw strategy.
    pub placement: PlacementSettings,
    /// Inclusive lower bound of the normalised height band.
    pub min_height_frac: f32,
    /// Exclusive upper bound of the normalised height band.
    pub max_height_frac: f32,
    /// Uniform vertical offset range added to the surface height.
    pub vertical_jitter: (f32, f32),
}

/// Serializable description of one biome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BiomeSettings {
    /// Unique biome name.
    pub name: String,
    /// Heat range lower bound in `[0, 1]`.
    pub min_heat: f64,
    /// Heat range upper bound in `[0, 1]`.
    pub max_heat: f64,
    /// Wetness range lower bound in `[0, 1]`.
    pub min_wetness: f64,
    /// Wetness range upper bound in `[0, 1]`.
    pub max_wetness: f64,
    /// Noise scale of the biome's height channel.
    pub noise_scale: f64,
    /// Height of a full-scale noise value.
    pub height_multiplier: f64,
    /// Height offset added after scaling.
    pub base_height: f64,
    /// Vertex colour.
    pub color: [f32; 4],
    /// Optional texture handle.
    pub texture: Option<String>,
    /// Vegetation rules.
    pub vegetation: Vec<VegetationSettings>,
}

/// Scripted viewer used by the headless runner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    /// Starting world position `(x, y, z)`.
    pub start: [f64; 3],
    /// Velocity in world units per second.
    pub velocity: [f64; 3],
    /// Number of fixed simulation ticks to run.
    pub ticks: u64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            chunk_resolution: 64,
            vertex_spacing: 1.0,
            view_distance: 4,
            hysteresis: 1,
            heat_noise_scale: 100.0,
            wetness_noise_scale: 100.0,
            fade_margin: 0.05,
            blend: BlendPolicy::Weighted,
            smooth_edges: SmoothEdges::Apron,
            collision: true,
            terrain_material: "terrain/vertex_color".to_string(),
        }
    }
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            height: 0.0,
            color: [0.0, 0.5, 1.0, 0.5],
            material: "water/unlit".to_string(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            max_in_flight: 16,
            max_free_tiles: None,
        }
    }
}

impl Default for VegetationSettings {
    fn default() -> Self {
        Self {
            prototype: None,
            density: 0.0,
            placement: PlacementSettings::PerVertex,
            min_height_frac: 0.0,
            max_height_frac: 1.0,
            vertical_jitter: (0.0, 0.0),
        }
    }
}

impl Default for BiomeSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            min_heat: 0.0,
            max_heat: 1.0,
            min_wetness: 0.0,
            max_wetness: 1.0,
            noise_scale: 60.0,
            height_multiplier: 25.0,
            base_height: 0.0,
            color: [0.2, 0.6, 0.2, 1.0],
            texture: None,
            vegetation: Vec::new(),
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            start: [0.0, 10.0, 0.0],
            velocity: [12.0, 0.0, 4.0],
            ticks: 600,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// The biome table written into a freshly created `config.ron`.
pub fn default_biomes() -> Vec<BiomeSettings> {
    vec![
        BiomeSettings {
            name: "tundra".into(),
            min_heat: 0.0,
            max_heat: 0.3,
            min_wetness: 0.0,
            max_wetness: 1.0,
            noise_scale: 80.0,
            height_multiplier: 12.0,
            base_height: 2.0,
            color: [0.85, 0.88, 0.9, 1.0],
            texture: Some("tundra_snow".into()),
            vegetation: vec![VegetationSettings {
                prototype: Some("dead_shrub".into()),
                density: 0.002,
                placement: PlacementSettings::PerArea,
                min_height_frac: 0.3,
                max_height_frac: 0.8,
                vertical_jitter: (-0.1, 0.0),
            }],
        },
        BiomeSettings {
            name: "plains".into(),
            min_heat: 0.3,
            max_heat: 0.7,
            min_wetness: 0.0,
            max_wetness: 0.5,
            noise_scale: 90.0,
            height_multiplier: 8.0,
            base_height: 1.0,
            color: [0.45, 0.7, 0.3, 1.0],
            texture: Some("plains_grass".into()),
            vegetation: vec![VegetationSettings {
                prototype: Some("grass_tuft".into()),
                density: 0.02,
                placement: PlacementSettings::PerVertex,
                min_height_frac: 0.2,
                max_height_frac: 1.0,
                vertical_jitter: (0.0, 0.05),
            }],
        },
        BiomeSettings {
            name: "forest".into(),
            min_heat: 0.3,
            max_heat: 0.7,
            min_wetness: 0.5,
            max_wetness: 1.0,
            noise_scale: 60.0,
            height_multiplier: 18.0,
            base_height: 2.0,
            color: [0.15, 0.45, 0.15, 1.0],
            texture: Some("forest_floor".into()),
            vegetation: vec![
                VegetationSettings {
                    prototype: Some("pine".into()),
                    density: 0.004,
                    placement: PlacementSettings::PerArea,
                    min_height_frac: 0.4,
                    max_height_frac: 0.7,
                    vertical_jitter: (-0.2, 0.0),
                },
                VegetationSettings {
                    prototype: Some("fern".into()),
                    density: 0.05,
                    placement: PlacementSettings::PerVertex,
                    min_height_frac: 0.1,
                    max_height_frac: 0.6,
                    vertical_jitter: (0.0, 0.0),
                },
            ],
        },
        BiomeSettings {
            name: "desert".into(),
            min_heat: 0.7,
            max_heat: 1.0,
            min_wetness: 0.0,
            max_wetness: 0.4,
            noise_scale: 120.0,
            height_multiplier: 10.0,
            base_height: 0.5,
            color: [0.9, 0.8, 0.5, 1.0],
            texture: Some("desert_sand".into()),
            vegetation: vec![VegetationSettings {
                prototype: Some("cactus".into()),
                density: 0.001,
                placement: PlacementSettings::PerArea,
                min_height_frac: 0.2,
                max_height_frac: 0.9,
                vertical_jitter: (-0.3, 0.0),
            }],
        },
        BiomeSettings {
            name: "mountains".into(),
            min_heat: 0.7,
            max_heat: 1.0,
            min_wetness: 0.4,
            max_wetness: 1.0,
            noise_scale: 40.0,
            height_multiplier: 45.0,
            base_height: 5.0,
            color: [0.5, 0.48, 0.45, 1.0],
            texture: Some("mountain_rock".into()),
            vegetation: Vec::new(),
        },
    ]
}

impl Config {
    /// Configuration with the default biome table filled in.
    ///
    /// `Config::default()` leaves `biomes` empty so that a file omitting the
    /// section means "no biomes"; this constructor is what new installs get.
    pub fn with_default_biomes() -> Self {
        Self {
            biomes: default_biomes(),
            ..Self::default()
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::with_default_biomes();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Reject settings that would make chunk geometry degenerate.
    ///
    /// Biome and vegetation contents are not checked here; malformed rules
    /// are skipped at generation time instead.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.chunk_resolution == 0 {
            return Err(ConfigError::Invalid {
                field: "world.chunk_resolution",
                reason: "must be at least 1".into(),
            });
        }
        if !(self.world.vertex_spacing.is_finite() && self.world.vertex_spacing > 0.0) {
            return Err(ConfigError::Invalid {
                field: "world.vertex_spacing",
                reason: format!("must be positive, got {}", self.world.vertex_spacing),
            });
        }
        if !(self.world.fade_margin.is_finite() && self.world.fade_margin >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "world.fade_margin",
                reason: format!("must be non-negative, got {}", self.world.fade_margin),
            });
        }
        Ok(())
    }

    /// Chunk world size: `chunk_resolution * vertex_spacing`.
    pub fn chunk_world_size(&self) -> f64 {
        self.world.chunk_resolution as f64 * self.world.vertex_spacing as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::with_default_biomes();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(4))
                .unwrap();
        assert!(!ron_str.is_empty());
        assert!(ron_str.contains("view_distance: 4"));
        assert!(ron_str.contains("\"forest\""));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::with_default_biomes();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(world: (seed: 7), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.chunk_resolution, 64);
        assert_eq!(config.water, WaterConfig::default());
        assert!(config.biomes.is_empty());
    }

    #[test]
    fn test_extra_field_ignored() {
        let ron_str = "(future_setting: true)";
        let result: Result<Config, _> = ron::from_str(ron_str);
        assert!(result.is_ok());
    }

    #[test]
    fn test_partial_biome_uses_field_defaults() {
        let ron_str = r#"(biomes: [(name: "swamp", min_wetness: 0.8)])"#;
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.biomes.len(), 1);
        assert_eq!(config.biomes[0].name, "swamp");
        assert_eq!(config.biomes[0].min_wetness, 0.8);
        assert_eq!(config.biomes[0].max_heat, 1.0);
        assert!(config.biomes[0].vegetation.is_empty());
    }

    #[test]
    fn test_enum_settings_parse() {
        let ron_str = "(world: (blend: FirstMatch, smooth_edges: Clamp))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.world.blend, BlendPolicy::FirstMatch);
        assert_eq!(config.world.smooth_edges, SmoothEdges::Clamp);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_default_biomes();
        config.world.seed = 99;
        config.world.view_distance = 2;
        config.water.enabled = false;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_biomes() {
        let dir = tempfile::tempdir().unwrap();
        let created = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(created.biomes.len(), 5);
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.world.view_distance = 9;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_some());
        assert_eq!(result.unwrap().world.view_distance, 9);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_resolution() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());
        config.world.chunk_resolution = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "world.chunk_resolution",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_spacing() {
        let mut config = Config::default();
        config.world.vertex_spacing = -1.0;
        assert!(config.validate().is_err());
        config.world.vertex_spacing = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_chunk_world_size() {
        let mut config = Config::default();
        config.world.chunk_resolution = 240;
        config.world.vertex_spacing = 0.5;
        assert_eq!(config.chunk_world_size(), 120.0);
    }
}
