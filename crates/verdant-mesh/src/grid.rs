//! Flat grid topology shared by every chunk of the same size.

use std::collections::HashMap;
use std::sync::Arc;

use glam::{Vec2, Vec3};

/// Vertex layout, UVs and triangle indices of an `n x n` flat grid.
///
/// Immutable once built; chunks hold it behind an [`Arc`] and only own their
/// per-vertex heights and colours.
#[derive(Debug, PartialEq)]
pub struct GridTopology {
    resolution: u32,
    spacing: f32,
    local: Vec<Vec3>,
    uvs: Vec<Vec2>,
    indices: Vec<u32>,
}

impl GridTopology {
    /// Builds the grid. Vertex `(x, z)` sits at index `z * n + x`.
    ///
    /// Each quad is split into two triangles wound
    /// `(i, i + n, i + 1)` and `(i + 1, i + n, i + n + 1)`.
    pub fn new(resolution: u32, spacing: f32) -> Self {
        let n = resolution as usize;
        let mut local = Vec::with_capacity(n * n);
        let mut uvs = Vec::with_capacity(n * n);
        let denom = resolution.saturating_sub(1).max(1) as f32;
        for z in 0..resolution {
            for x in 0..resolution {
                local.push(Vec3::new(x as f32 * spacing, 0.0, z as f32 * spacing));
                uvs.push(Vec2::new(x as f32 / denom, z as f32 / denom));
            }
        }

        let quads = n.saturating_sub(1);
        let mut indices = Vec::with_capacity(quads * quads * 6);
        for z in 0..quads {
            for x in 0..quads {
                let i = (z * n + x) as u32;
                let n = resolution;
                indices.extend_from_slice(&[i, i + n, i + 1, i + 1, i + n, i + n + 1]);
            }
        }

        Self {
            resolution,
            spacing,
            local,
            uvs,
            indices,
        }
    }

    /// Vertices per side.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// World units between adjacent vertices.
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Chunk-local flat vertex positions (Y = 0).
    pub fn local_positions(&self) -> &[Vec3] {
        &self.local
    }

    /// Texture coordinates in `[0, 1]^2`.
    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    /// Triangle list indices.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.local.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Builds each distinct `(resolution, spacing)` topology once.
#[derive(Debug, Default)]
pub struct GridCache {
    grids: HashMap<(u32, u32), Arc<GridTopology>>,
}

impl GridCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared topology, building it on first use.
    pub fn get_or_build(&mut self, resolution: u32, spacing: f32) -> Arc<GridTopology> {
        self.grids
            .entry((resolution, spacing.to_bits()))
            .or_insert_with(|| Arc::new(GridTopology::new(resolution, spacing)))
            .clone()
    }

    /// Number of distinct topologies built.
    pub fn len(&self) -> usize {
        self.grids.len()
    }

    /// Returns `true` if nothing has been built yet.
    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}
