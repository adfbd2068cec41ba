//! Biome system: definitions, climate ranges, the ordered biome table, and the
//! height/colour sampler that blends biomes across fade bands.
//!
//! Biomes are keyed on two noise channels, heat and wetness, each in `[0, 1]`.
//! Overlapping ranges blend; only the nearest-biome fallback has a precedence
//! rule (first registered wins).

mod climate;
mod def;
mod sampler;
mod table;

pub use climate::{ClimateRange, fade};
pub use def::{BiomeDef, PrototypeHandle, VegetationRule};
pub use sampler::{HeightBiomeSampler, SamplerParams, SurfaceSample};
pub use table::{BiomeId, BiomeTable, BiomeTableError};
