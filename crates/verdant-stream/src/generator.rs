//! Per-chunk surface generation: sculpted heights and colours plus vegetation
//! placements, computed without touching any tile.

use verdant_config::Config;
use verdant_mesh::{ChunkMeshBuilder, SculptParams, SurfaceBuffers};
use verdant_terrain::{
    BiomeId, BiomeTable, ChunkCoord, HeightBiomeSampler, Placement, SamplerParams,
    VegetationScatter,
};

use crate::StreamError;

/// Everything needed to populate one terrain tile.
#[derive(Clone, Debug, Default)]
pub struct GeneratedSurface {
    /// Chunk this surface was built for.
    pub coord: ChunkCoord,
    /// Smoothed heights and colours.
    pub surface: SurfaceBuffers,
    /// Vegetation to spawn.
    pub placements: Vec<Placement>,
    /// Dominant biome at the chunk centre.
    pub center_biome: Option<BiomeId>,
}

/// Pure chunk generator. `Send + Sync`; shared with worker threads.
#[derive(Debug)]
pub struct ChunkGenerator {
    sampler: HeightBiomeSampler,
    scatter: VegetationScatter,
    builder: ChunkMeshBuilder,
}

impl ChunkGenerator {
    /// Creates a generator from its parts.
    pub fn new(sampler: HeightBiomeSampler, sculpt: SculptParams) -> Self {
        let scatter = VegetationScatter::new(sampler.params().seed, sculpt.footprint());
        Self {
            sampler,
            scatter,
            builder: ChunkMeshBuilder::new(sculpt),
        }
    }

    /// Builds the biome table and generator from configuration.
    pub fn from_config(config: &Config) -> Result<Self, StreamError> {
        let table = BiomeTable::from_settings(&config.biomes)?;
        let sampler = HeightBiomeSampler::new(table, SamplerParams::from_world(&config.world));
        Ok(Self::new(sampler, SculptParams::from_world(&config.world)))
    }

    /// Generates the surface for `coord` into `out`, reusing its buffers.
    pub fn generate(&self, coord: ChunkCoord, out: &mut GeneratedSurface) {
        out.coord = coord;
        self.builder.sculpt(&self.sampler, coord, &mut out.surface);
        out.placements.clear();
        self.scatter.scatter(&self.sampler, coord, &mut out.placements);
        let (cx, cz) = self.builder.params().footprint().center_world(coord);
        out.center_biome = self.sampler.dominant_biome(cx, cz);
    }

    /// The biome sampler.
    pub fn sampler(&self) -> &HeightBiomeSampler {
        &self.sampler
    }

    /// Sculpt parameters.
    pub fn sculpt_params(&self) -> &SculptParams {
        self.builder.params()
    }
}
