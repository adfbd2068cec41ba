//! Height/biome sampler: reads heat and wetness noise at a world point,
//! weights every biome by its fade and blends height and colour.

use glam::Vec4;
use verdant_config::{BlendPolicy, WorldConfig};

use super::{BiomeDef, BiomeId, BiomeTable};
use crate::noise_field::{ChannelOffsets, NoiseField};

/// Colour of terrain when no biome is registered.
pub const NEUTRAL_COLOR: Vec4 = Vec4::new(0.5, 0.5, 0.5, 1.0);

/// Tunables of a [`HeightBiomeSampler`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplerParams {
    /// World seed, threaded into every channel offset.
    pub seed: i64,
    /// World units per heat feature.
    pub heat_scale: f64,
    /// World units per wetness feature.
    pub wetness_scale: f64,
    /// Width of the linear fade outside each biome's climate range.
    pub fade_margin: f64,
    /// How overlapping biomes combine.
    pub blend: BlendPolicy,
}

impl SamplerParams {
    /// Extracts sampler parameters from the world section of the config.
    pub fn from_world(world: &WorldConfig) -> Self {
        Self {
            seed: world.seed,
            heat_scale: world.heat_noise_scale,
            wetness_scale: world.wetness_noise_scale,
            fade_margin: world.fade_margin,
            blend: world.blend,
        }
    }
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self::from_world(&WorldConfig::default())
    }
}

/// Everything known about the terrain surface at one world point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSample {
    /// Final terrain height in world units.
    pub height: f64,
    /// Blended biome noise in `[0, 1]`, before height scaling.
    pub height01: f64,
    /// Blended vertex colour.
    pub color: Vec4,
    /// Heat channel value.
    pub heat: f64,
    /// Wetness channel value.
    pub wetness: f64,
    /// Biome with the largest weight, `None` only for an empty table.
    pub dominant: Option<BiomeId>,
    /// `true` when the result came from weighted blending rather than a
    /// single biome.
    pub blended: bool,
}

/// Maps world `(x, z)` to height, colour and dominant biome.
///
/// Pure and deterministic: the same table, params and point always yield a
/// bit-identical sample, on any thread.
#[derive(Clone, Debug)]
pub struct HeightBiomeSampler {
    noise: NoiseField,
    table: BiomeTable,
    params: SamplerParams,
    offsets: ChannelOffsets,
}

impl HeightBiomeSampler {
    /// Creates a sampler over `table`.
    pub fn new(table: BiomeTable, params: SamplerParams) -> Self {
        Self {
            noise: NoiseField::default(),
            table,
            offsets: ChannelOffsets::from_seed(params.seed),
            params,
        }
    }

    /// The biome table being sampled.
    pub fn table(&self) -> &BiomeTable {
        &self.table
    }

    /// The sampler's parameters.
    pub fn params(&self) -> &SamplerParams {
        &self.params
    }

    /// Heat and wetness at a world point.
    pub fn climate(&self, x: f64, z: f64) -> (f64, f64) {
        let heat = self
            .noise
            .sample(x, z, self.params.heat_scale, self.offsets.heat);
        let wetness = self
            .noise
            .sample(x, z, self.params.wetness_scale, self.offsets.wetness);
        (heat, wetness)
    }

    /// Samples the surface at world `(x, z)`.
    pub fn sample(&self, x: f64, z: f64) -> SurfaceSample {
        let (heat, wetness) = self.climate(x, z);
        if self.table.is_empty() {
            return SurfaceSample {
                height: 0.0,
                height01: 0.0,
                color: NEUTRAL_COLOR,
                heat,
                wetness,
                dominant: None,
                blended: false,
            };
        }

        let sampled = match self.params.blend {
            BlendPolicy::Weighted => self.blend_weighted(x, z, heat, wetness),
            BlendPolicy::FirstMatch => self.first_match(x, z, heat, wetness),
        };
        sampled.unwrap_or_else(|| {
            let id = self.nearest(heat, wetness);
            self.single(id, x, z, heat, wetness)
        })
    }

    /// Dominant biome at a world point.
    pub fn dominant_biome(&self, x: f64, z: f64) -> Option<BiomeId> {
        self.sample(x, z).dominant
    }

    fn blend_weighted(&self, x: f64, z: f64, heat: f64, wetness: f64) -> Option<SurfaceSample> {
        let mut weight_sum = 0.0;
        let mut height_sum = 0.0;
        let mut noise_sum = 0.0;
        let mut color_sum = Vec4::ZERO;
        let mut dominant: Option<(BiomeId, f64)> = None;

        for (id, biome) in self.table.iter() {
            let w = biome
                .climate
                .fade_weight(heat, wetness, self.params.fade_margin);
            if w <= 0.0 {
                continue;
            }
            let n = self.biome_noise(biome, x, z);
            height_sum += biome.height_at(n) * w;
            noise_sum += n * w;
            color_sum += biome.color * w as f32;
            weight_sum += w;
            // Strict: the earlier registration keeps equal weights.
            if dominant.is_none_or(|(_, best)| w > best) {
                dominant = Some((id, w));
            }
        }

        if weight_sum <= 0.0 {
            return None;
        }
        let mut color = color_sum / weight_sum as f32;
        color.w = 1.0;
        Some(SurfaceSample {
            height: height_sum / weight_sum,
            height01: noise_sum / weight_sum,
            color,
            heat,
            wetness,
            dominant: dominant.map(|(id, _)| id),
            blended: true,
        })
    }

    fn first_match(&self, x: f64, z: f64, heat: f64, wetness: f64) -> Option<SurfaceSample> {
        let (id, _) = self
            .table
            .iter()
            .find(|(_, b)| b.climate.contains(heat, wetness))?;
        Some(self.single(id, x, z, heat, wetness))
    }

    /// Biome whose range is closest in heat/wetness space. Ties go to the
    /// first registered.
    fn nearest(&self, heat: f64, wetness: f64) -> BiomeId {
        let mut best = BiomeId(0);
        let mut best_dist = f64::INFINITY;
        for (id, biome) in self.table.iter() {
            let d = biome.climate.distance_sq(heat, wetness);
            if d < best_dist {
                best = id;
                best_dist = d;
            }
        }
        best
    }

    fn single(&self, id: BiomeId, x: f64, z: f64, heat: f64, wetness: f64) -> SurfaceSample {
        let Some(biome) = self.table.get(id) else {
            return SurfaceSample {
                height: 0.0,
                height01: 0.0,
                color: NEUTRAL_COLOR,
                heat,
                wetness,
                dominant: None,
                blended: false,
            };
        };
        let n = self.biome_noise(biome, x, z);
        SurfaceSample {
            height: biome.height_at(n),
            height01: n,
            color: biome.color,
            heat,
            wetness,
            dominant: Some(id),
            blended: false,
        }
    }

    fn biome_noise(&self, biome: &BiomeDef, x: f64, z: f64) -> f64 {
        self.noise
            .sample(x, z, biome.noise_scale, self.offsets.height)
    }
}
