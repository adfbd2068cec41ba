//! Vegetation scatter: deterministic, biome-aware placement of decoration
//! prototypes over one chunk's footprint.

use std::f32::consts::TAU;

use glam::DVec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use verdant_config::{PlacementSettings, WorldConfig};

use crate::ChunkCoord;
use crate::biome::{BiomeId, HeightBiomeSampler, PrototypeHandle, VegetationRule};
use crate::seed::chunk_rng;

/// A decoration to spawn.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    /// Prototype to instantiate.
    pub prototype: PrototypeHandle,
    /// World-space anchor position.
    pub position: DVec3,
    /// Rotation about +Y, in radians, in `[0, 2pi)`.
    pub yaw: f32,
    /// Biome whose rule produced this placement.
    pub biome: BiomeId,
}

/// Lattice geometry of the chunk being scattered over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkFootprint {
    /// Vertices per side.
    pub resolution: u32,
    /// World units between adjacent vertices.
    pub spacing: f64,
}

impl ChunkFootprint {
    /// Footprint from the world config, whose `chunk_resolution` counts quads.
    pub fn from_world(world: &WorldConfig) -> Self {
        Self {
            resolution: world.chunk_resolution.saturating_add(1),
            spacing: world.vertex_spacing as f64,
        }
    }

    /// World size of one side of the chunk: `(resolution - 1) * spacing`.
    pub fn world_size(&self) -> f64 {
        self.resolution.saturating_sub(1) as f64 * self.spacing
    }

    /// World `(x, z)` of lattice vertex `(i, j)`. Shared edges of neighbouring
    /// chunks resolve to identical positions.
    pub fn vertex_world(&self, coord: ChunkCoord, i: u32, j: u32) -> (f64, f64) {
        self.lattice_world(coord, i as i64, j as i64)
    }

    /// Like [`vertex_world`](Self::vertex_world) but accepts indices outside
    /// the chunk, e.g. `-1` for the apron ring.
    pub fn lattice_world(&self, coord: ChunkCoord, i: i64, j: i64) -> (f64, f64) {
        let stride = self.resolution.saturating_sub(1) as i64;
        (
            (coord.x as i64 * stride + i) as f64 * self.spacing,
            (coord.y as i64 * stride + j) as f64 * self.spacing,
        )
    }

    /// World `(x, z)` of the chunk centre.
    pub fn center_world(&self, coord: ChunkCoord) -> (f64, f64) {
        let (x0, z0) = self.vertex_world(coord, 0, 0);
        let half = self.world_size() * 0.5;
        (x0 + half, z0 + half)
    }
}

/// Places vegetation for a chunk from its biomes' rules.
#[derive(Clone, Copy, Debug)]
pub struct VegetationScatter {
    world_seed: i64,
    footprint: ChunkFootprint,
}

impl VegetationScatter {
    /// Creates a scatter for chunks of the given footprint.
    pub fn new(world_seed: i64, footprint: ChunkFootprint) -> Self {
        Self {
            world_seed,
            footprint,
        }
    }

    /// The chunk footprint.
    pub fn footprint(&self) -> ChunkFootprint {
        self.footprint
    }

    /// Appends this chunk's placements to `out`.
    ///
    /// The result depends only on the world seed, `coord` and the sampler, so
    /// a chunk revisited later scatters identically.
    pub fn scatter(
        &self,
        sampler: &HeightBiomeSampler,
        coord: ChunkCoord,
        out: &mut Vec<Placement>,
    ) {
        if sampler.table().is_empty() || self.footprint.resolution == 0 {
            return;
        }
        let mut rng = chunk_rng(self.world_seed, coord);
        self.scatter_per_vertex(sampler, coord, &mut rng, out);
        self.scatter_per_area(sampler, coord, &mut rng, out);
    }

    fn scatter_per_vertex(
        &self,
        sampler: &HeightBiomeSampler,
        coord: ChunkCoord,
        rng: &mut ChaCha8Rng,
        out: &mut Vec<Placement>,
    ) {
        let has_rules = sampler
            .table()
            .iter()
            .any(|(_, b)| {
                b.vegetation
                    .iter()
                    .any(|r| active_prototype(r, PlacementSettings::PerVertex).is_some())
            });
        if !has_rules {
            return;
        }
        let n = self.footprint.resolution;
        for j in 0..n {
            for i in 0..n {
                let (x, z) = self.footprint.vertex_world(coord, i, j);
                let sample = sampler.sample(x, z);
                let Some(biome_id) = sample.dominant else {
                    continue;
                };
                let Some(biome) = sampler.table().get(biome_id) else {
                    continue;
                };
                for rule in &biome.vegetation {
                    let Some(prototype) = active_prototype(rule, PlacementSettings::PerVertex)
                    else {
                        continue;
                    };
                    if rng.random::<f32>() >= rule.density {
                        continue;
                    }
                    if !rule.height_in_band(sample.height01) {
                        continue;
                    }
                    out.push(place(rule, prototype, biome_id, x, sample.height, z, rng));
                }
            }
        }
    }

    fn scatter_per_area(
        &self,
        sampler: &HeightBiomeSampler,
        coord: ChunkCoord,
        rng: &mut ChaCha8Rng,
        out: &mut Vec<Placement>,
    ) {
        let size = self.footprint.world_size();
        if size <= 0.0 {
            return;
        }
        let area = size * size;
        let (x0, z0) = self.footprint.vertex_world(coord, 0, 0);

        for (biome_id, biome) in sampler.table().iter() {
            for rule in &biome.vegetation {
                let Some(prototype) = active_prototype(rule, PlacementSettings::PerArea) else {
                    continue;
                };
                let attempts = (rule.density as f64 * area).ceil() as usize;
                for _ in 0..attempts {
                    let x = x0 + rng.random::<f64>() * size;
                    let z = z0 + rng.random::<f64>() * size;
                    let sample = sampler.sample(x, z);
                    if sample.dominant != Some(biome_id) {
                        continue;
                    }
                    if !rule.height_in_band(sample.height01) {
                        continue;
                    }
                    out.push(place(rule, prototype, biome_id, x, sample.height, z, rng));
                }
            }
        }
    }
}

/// The rule's prototype, if the rule uses `placement` and is well formed.
fn active_prototype(rule: &VegetationRule, placement: PlacementSettings) -> Option<&PrototypeHandle> {
    if rule.placement != placement || !rule.is_well_formed() {
        return None;
    }
    rule.prototype.as_ref()
}

fn place(
    rule: &VegetationRule,
    prototype: &PrototypeHandle,
    biome: BiomeId,
    x: f64,
    height: f64,
    z: f64,
    rng: &mut ChaCha8Rng,
) -> Placement {
    let (lo, hi) = rule.vertical_jitter;
    let jitter = lo + (hi - lo) * rng.random::<f32>();
    let yaw = rng.random::<f32>() * TAU;
    Placement {
        prototype: prototype.clone(),
        position: DVec3::new(x, height + jitter as f64, z),
        yaw: if yaw >= TAU { 0.0 } else { yaw },
        biome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{BiomeDef, BiomeTable, ClimateRange, SamplerParams};
    use glam::Vec4;
    use verdant_config::default_biomes;

    fn footprint() -> ChunkFootprint {
        ChunkFootprint {
            resolution: 16,
            spacing: 1.0,
        }
    }

    fn single_biome_sampler(rules: Vec<VegetationRule>) -> HeightBiomeSampler {
        let mut table = BiomeTable::new();
        table
            .register(BiomeDef {
                name: "meadow".into(),
                climate: ClimateRange::FULL,
                noise_scale: 30.0,
                height_multiplier: 10.0,
                base_height: 0.0,
                color: Vec4::ONE,
                texture: None,
                vegetation: rules,
            })
            .unwrap();
        HeightBiomeSampler::new(table, SamplerParams::default())
    }

    fn rule(placement: PlacementSettings, density: f32) -> VegetationRule {
        VegetationRule {
            prototype: Some("bush".into()),
            density,
            placement,
            min_height_frac: 0.0,
            max_height_frac: 1.01,
            vertical_jitter: (-0.5, 0.5),
        }
    }

    #[test]
    fn test_scatter_is_deterministic_per_chunk() {
        let table = BiomeTable::from_settings(&default_biomes()).unwrap();
        let sampler = HeightBiomeSampler::new(table, SamplerParams::default());
        let scatter = VegetationScatter::new(7, footprint());
        let coord = ChunkCoord::new(3, -2);

        let mut a = Vec::new();
        let mut b = Vec::new();
        scatter.scatter(&sampler, coord, &mut a);
        scatter.scatter(&sampler, coord, &mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_density_one_places_on_every_vertex() {
        let sampler = single_biome_sampler(vec![rule(PlacementSettings::PerVertex, 1.0)]);
        let scatter = VegetationScatter::new(1, footprint());
        let mut out = Vec::new();
        scatter.scatter(&sampler, ChunkCoord::new(0, 0), &mut out);
        assert_eq!(out.len(), 16 * 16);
        for p in &out {
            assert!((0.0..TAU).contains(&p.yaw));
            let surface = sampler.sample(p.position.x, p.position.z).height;
            assert!((p.position.y - surface).abs() <= 0.5 + 1e-6);
        }
    }

    #[test]
    fn test_per_area_count_is_ceil_of_density_times_area() {
        let sampler = single_biome_sampler(vec![rule(PlacementSettings::PerArea, 0.01)]);
        let scatter = VegetationScatter::new(1, footprint());
        let mut out = Vec::new();
        scatter.scatter(&sampler, ChunkCoord::new(2, 2), &mut out);
        // 15 x 15 footprint at density 0.01 -> ceil(2.25) = 3.
        assert_eq!(out.len(), 3);
        let (x0, z0) = footprint().vertex_world(ChunkCoord::new(2, 2), 0, 0);
        for p in &out {
            assert!(p.position.x >= x0 && p.position.x < x0 + 15.0);
            assert!(p.position.z >= z0 && p.position.z < z0 + 15.0);
        }
    }

    #[test]
    fn test_malformed_rule_skipped_siblings_apply() {
        let mut bad = rule(PlacementSettings::PerVertex, 1.0);
        bad.prototype = None;
        let mut inverted = rule(PlacementSettings::PerVertex, 1.0);
        inverted.min_height_frac = 0.9;
        inverted.max_height_frac = 0.1;
        let mut good = rule(PlacementSettings::PerVertex, 1.0);
        good.prototype = Some("flower".into());

        let sampler = single_biome_sampler(vec![bad, inverted, good]);
        let scatter = VegetationScatter::new(1, footprint());
        let mut out = Vec::new();
        scatter.scatter(&sampler, ChunkCoord::new(0, 0), &mut out);
        assert_eq!(out.len(), 16 * 16);
        assert!(out.iter().all(|p| p.prototype.as_str() == "flower"));
    }

    #[test]
    fn test_height_band_filters() {
        let mut r = rule(PlacementSettings::PerVertex, 1.0);
        r.min_height_frac = 0.5;
        r.max_height_frac = 0.5;
        let sampler = single_biome_sampler(vec![r]);
        let scatter = VegetationScatter::new(1, footprint());
        let mut out = Vec::new();
        scatter.scatter(&sampler, ChunkCoord::new(0, 0), &mut out);
        assert!(out.is_empty(), "an empty band admits nothing");
    }

    #[test]
    fn test_empty_table_places_nothing() {
        let sampler = HeightBiomeSampler::new(BiomeTable::new(), SamplerParams::default());
        let scatter = VegetationScatter::new(1, footprint());
        let mut out = Vec::new();
        scatter.scatter(&sampler, ChunkCoord::new(0, 0), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_footprint_from_world_counts_vertices() {
        let world = WorldConfig {
            chunk_resolution: 240,
            vertex_spacing: 0.5,
            ..Default::default()
        };
        let f = ChunkFootprint::from_world(&world);
        assert_eq!(f.resolution, 241);
        assert_eq!(f.world_size(), 120.0);
    }

    #[test]
    fn test_vertex_world_shares_edges() {
        let f = footprint();
        let left = f.vertex_world(ChunkCoord::new(0, 0), 15, 4);
        let right = f.vertex_world(ChunkCoord::new(1, 0), 0, 4);
        assert_eq!(left, right);
        let neg = f.vertex_world(ChunkCoord::new(-1, 0), 15, 0);
        assert_eq!(neg, f.vertex_world(ChunkCoord::new(0, 0), 0, 0));
    }
}
