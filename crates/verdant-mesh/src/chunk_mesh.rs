//! Per-tile mesh data: owned heights and colours over a shared grid topology.

use std::sync::Arc;

use glam::{Vec2, Vec3, Vec4};

use crate::builder::SurfaceBuffers;
use crate::grid::GridTopology;

/// Owned vertex/index copy handed to a physics backend.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollisionMesh {
    /// Chunk-local vertex positions.
    pub vertices: Vec<Vec3>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
}

/// The mesh of one tile.
///
/// Positions and colours are rewritten in place on every rebuild; the
/// topology is shared with every tile of the same size.
#[derive(Clone, Debug)]
pub struct ChunkMesh {
    topology: Arc<GridTopology>,
    positions: Vec<Vec3>,
    colors: Vec<Vec4>,
}

impl ChunkMesh {
    /// Creates a flat mesh filled with `color`.
    pub fn flat(topology: Arc<GridTopology>, color: Vec4) -> Self {
        let positions = topology.local_positions().to_vec();
        let colors = vec![color; positions.len()];
        Self {
            topology,
            positions,
            colors,
        }
    }

    /// Switches to `topology` if it differs, resetting vertices to flat.
    ///
    /// Returns `true` when the topology changed.
    pub fn ensure_topology(&mut self, topology: &Arc<GridTopology>) -> bool {
        if Arc::ptr_eq(&self.topology, topology) {
            return false;
        }
        self.topology = Arc::clone(topology);
        self.positions.clear();
        self.positions
            .extend_from_slice(self.topology.local_positions());
        let fill = self.colors.first().copied().unwrap_or(Vec4::ONE);
        self.colors.clear();
        self.colors.resize(self.positions.len(), fill);
        true
    }

    /// Writes sculpted heights into Y and colours into the colour slots.
    ///
    /// Returns `false` and leaves the mesh untouched when `surface` was built
    /// for a different vertex count.
    pub fn apply(&mut self, surface: &SurfaceBuffers) -> bool {
        if surface.heights.len() != self.positions.len()
            || surface.colors.len() != self.colors.len()
        {
            return false;
        }
        for (p, &h) in self.positions.iter_mut().zip(&surface.heights) {
            p.y = h;
        }
        self.colors.copy_from_slice(&surface.colors);
        true
    }

    /// Sets every vertex to `color`.
    pub fn fill_color(&mut self, color: Vec4) {
        self.colors.fill(color);
    }

    /// The shared grid topology.
    pub fn topology(&self) -> &Arc<GridTopology> {
        &self.topology
    }

    /// Chunk-local vertex positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Vertex colours.
    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    /// Texture coordinates.
    pub fn uvs(&self) -> &[Vec2] {
        self.topology.uvs()
    }

    /// Triangle list indices.
    pub fn indices(&self) -> &[u32] {
        self.topology.indices()
    }

    /// Owned copy of the current geometry for collision.
    pub fn collision_copy(&self) -> CollisionMesh {
        CollisionMesh {
            vertices: self.positions.clone(),
            indices: self.topology.indices().to_vec(),
        }
    }
}
