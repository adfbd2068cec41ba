//! Sculpts chunk surfaces: samples heights and colours for every lattice
//! vertex, then smooths heights over one ring.

use glam::Vec4;
use verdant_config::{SmoothEdges, WorldConfig};
use verdant_terrain::{ChunkCoord, ChunkFootprint, HeightBiomeSampler};

use crate::smooth::{smooth_clamped, smooth_with_apron};

/// Inputs that fix the shape of every chunk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SculptParams {
    /// Vertices per side.
    pub resolution: u32,
    /// World units between adjacent vertices.
    pub spacing: f64,
    /// Smoothing policy for edge vertices.
    pub smooth_edges: SmoothEdges,
}

impl SculptParams {
    /// Parameters from the world config, whose `chunk_resolution` counts quads.
    pub fn from_world(world: &WorldConfig) -> Self {
        let footprint = ChunkFootprint::from_world(world);
        Self {
            resolution: footprint.resolution,
            spacing: footprint.spacing,
            smooth_edges: world.smooth_edges,
        }
    }

    /// The lattice footprint these parameters describe.
    pub fn footprint(&self) -> ChunkFootprint {
        ChunkFootprint {
            resolution: self.resolution,
            spacing: self.spacing,
        }
    }
}

/// Per-vertex surface values for one chunk, reused across builds.
#[derive(Clone, Debug, Default)]
pub struct SurfaceBuffers {
    /// Smoothed heights, row-major `z * n + x`.
    pub heights: Vec<f32>,
    /// Vertex colours, same layout.
    pub colors: Vec<Vec4>,
    raw: Vec<f64>,
}

impl SurfaceBuffers {
    /// Creates empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices written by the last sculpt.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Returns `true` if nothing has been sculpted.
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }
}

/// Stateless surface builder. Shareable across threads.
#[derive(Clone, Copy, Debug)]
pub struct ChunkMeshBuilder {
    params: SculptParams,
}

impl ChunkMeshBuilder {
    /// Creates a builder.
    pub fn new(params: SculptParams) -> Self {
        Self { params }
    }

    /// The builder's parameters.
    pub fn params(&self) -> &SculptParams {
        &self.params
    }

    /// Fills `out` with smoothed heights and colours for `coord`.
    ///
    /// Buffers are resized in place; capacity is kept between calls.
    pub fn sculpt(&self, sampler: &HeightBiomeSampler, coord: ChunkCoord, out: &mut SurfaceBuffers) {
        let footprint = self.params.footprint();
        let n = footprint.resolution as usize;

        out.heights.clear();
        out.heights.resize(n * n, 0.0);
        out.colors.clear();
        out.colors.reserve(n * n);
        out.raw.clear();

        match self.params.smooth_edges {
            SmoothEdges::Apron => {
                let w = n + 2;
                out.raw.reserve(w * w);
                // Colours come from the inner samples only.
                for j in -1..=n as i64 {
                    for i in -1..=n as i64 {
                        let (x, z) = footprint.lattice_world(coord, i, j);
                        let sample = sampler.sample(x, z);
                        out.raw.push(sample.height);
                        if (0..n as i64).contains(&i) && (0..n as i64).contains(&j) {
                            out.colors.push(sample.color);
                        }
                    }
                }
                smooth_with_apron(&out.raw, n, &mut out.heights);
            }
            SmoothEdges::Clamp => {
                out.raw.reserve(n * n);
                for j in 0..n as u32 {
                    for i in 0..n as u32 {
                        let (x, z) = footprint.vertex_world(coord, i, j);
                        let sample = sampler.sample(x, z);
                        out.raw.push(sample.height);
                        out.colors.push(sample.color);
                    }
                }
                smooth_clamped(&out.raw, n, &mut out.heights);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_config::default_biomes;
    use verdant_terrain::{BiomeTable, SamplerParams};

    fn sampler() -> HeightBiomeSampler {
        let table = BiomeTable::from_settings(&default_biomes()).unwrap();
        HeightBiomeSampler::new(table, SamplerParams::default())
    }

    fn builder(smooth_edges: SmoothEdges) -> ChunkMeshBuilder {
        ChunkMeshBuilder::new(SculptParams {
            resolution: 17,
            spacing: 1.0,
            smooth_edges,
        })
    }

    #[test]
    fn test_sculpt_fills_every_vertex() {
        let mut out = SurfaceBuffers::new();
        builder(SmoothEdges::Apron).sculpt(&sampler(), ChunkCoord::new(0, 0), &mut out);
        assert_eq!(out.heights.len(), 17 * 17);
        assert_eq!(out.colors.len(), 17 * 17);
        assert!(out.heights.iter().all(|h| h.is_finite()));
    }

    #[test]
    fn test_seam_continuity_x() {
        let sampler = sampler();
        let b = builder(SmoothEdges::Apron);
        let mut left = SurfaceBuffers::new();
        let mut right = SurfaceBuffers::new();
        b.sculpt(&sampler, ChunkCoord::new(-1, 2), &mut left);
        b.sculpt(&sampler, ChunkCoord::new(0, 2), &mut right);
        let n = 17;
        for z in 0..n {
            let l = left.heights[z * n + (n - 1)];
            let r = right.heights[z * n];
            assert!((l - r).abs() <= 1e-4, "row {z}: {l} vs {r}");
            assert_eq!(left.colors[z * n + (n - 1)], right.colors[z * n]);
        }
    }

    #[test]
    fn test_seam_continuity_z() {
        let sampler = sampler();
        let b = builder(SmoothEdges::Apron);
        let mut near = SurfaceBuffers::new();
        let mut far = SurfaceBuffers::new();
        b.sculpt(&sampler, ChunkCoord::new(4, 0), &mut near);
        b.sculpt(&sampler, ChunkCoord::new(4, 1), &mut far);
        let n = 17;
        for x in 0..n {
            let a = near.heights[(n - 1) * n + x];
            let c = far.heights[x];
            assert!((a - c).abs() <= 1e-4, "column {x}: {a} vs {c}");
        }
    }

    #[test]
    fn test_sculpt_reuses_buffers() {
        let sampler = sampler();
        let b = builder(SmoothEdges::Apron);
        let mut out = SurfaceBuffers::new();
        b.sculpt(&sampler, ChunkCoord::new(0, 0), &mut out);
        let first = out.heights.clone();
        let ptr = out.heights.as_ptr();
        b.sculpt(&sampler, ChunkCoord::new(9, 9), &mut out);
        assert_eq!(out.heights.as_ptr(), ptr);
        b.sculpt(&sampler, ChunkCoord::new(0, 0), &mut out);
        assert_eq!(out.heights, first);
    }

    #[test]
    fn test_clamp_mode_differs_only_near_edges() {
        let sampler = sampler();
        let mut apron = SurfaceBuffers::new();
        let mut clamp = SurfaceBuffers::new();
        builder(SmoothEdges::Apron).sculpt(&sampler, ChunkCoord::new(1, 1), &mut apron);
        builder(SmoothEdges::Clamp).sculpt(&sampler, ChunkCoord::new(1, 1), &mut clamp);
        let n = 17;
        for z in 1..n - 1 {
            for x in 1..n - 1 {
                let i = z * n + x;
                assert!((apron.heights[i] - clamp.heights[i]).abs() < 1e-4);
            }
        }
        assert_eq!(apron.colors, clamp.colors);
    }

    #[test]
    fn test_empty_table_is_flat() {
        let sampler = HeightBiomeSampler::new(BiomeTable::new(), SamplerParams::default());
        let mut out = SurfaceBuffers::new();
        builder(SmoothEdges::Apron).sculpt(&sampler, ChunkCoord::new(0, 0), &mut out);
        assert!(out.heights.iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_params_from_world() {
        let world = WorldConfig {
            chunk_resolution: 32,
            vertex_spacing: 2.0,
            ..Default::default()
        };
        let p = SculptParams::from_world(&world);
        assert_eq!(p.resolution, 33);
        assert_eq!(p.spacing, 2.0);
        assert_eq!(p.footprint().world_size(), 64.0);
    }
}
