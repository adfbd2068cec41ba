//! Procedural terrain generation: world-space noise, biome classification and
//! blending, per-chunk seeding and vegetation scatter.

mod coord;
mod noise_field;
mod seed;
mod vegetation;

pub mod biome;

pub use biome::{
    BiomeDef, BiomeId, BiomeTable, BiomeTableError, ClimateRange, HeightBiomeSampler,
    PrototypeHandle, SamplerParams, SurfaceSample, VegetationRule,
};
pub use coord::ChunkCoord;
pub use noise_field::{ChannelOffsets, MIN_SCALE, NoiseField, SEED_BIAS};
pub use seed::{chunk_rng, derive_chunk_seed};
pub use vegetation::{ChunkFootprint, Placement, VegetationScatter};
pub use verdant_config::{BlendPolicy, PlacementSettings};
