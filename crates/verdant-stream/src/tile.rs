//! Pooled tile objects: terrain and water.
//!
//! A tile is built once, then reassigned to a new chunk coordinate every time
//! the pool hands it out. Only its per-chunk state (heights, colours,
//! decorations, transform) changes between assignments.

use std::fmt;
use std::sync::Arc;

use glam::{DVec3, Vec4};
use verdant_mesh::{ChunkMesh, GridTopology};
use verdant_terrain::{BiomeId, ChunkCoord};

use crate::bindings::{Bindings, DecorationHandle, GeometryView, MaterialHandle};
use crate::generator::GeneratedSurface;

/// Which pool a tile belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TileKind {
    /// Heightfield terrain.
    Terrain,
    /// Flat water plane.
    Water,
}

/// Stable identity of a tile for its whole lifetime, across reuses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    /// Owning pool.
    pub kind: TileKind,
    /// Construction index within that pool.
    pub index: u32,
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            TileKind::Terrain => "terrain",
            TileKind::Water => "water",
        };
        write!(f, "{kind}#{}", self.index)
    }
}

/// A tile that can live in a [`TilePool`](crate::TilePool).
pub trait PooledTile {
    /// Pool this tile type belongs to.
    const KIND: TileKind;

    /// The tile's identity.
    fn id(&self) -> TileId;

    /// Whether the tile is currently assigned to a chunk.
    fn is_active(&self) -> bool;

    /// Hides the tile and drops everything it owns for its current chunk.
    fn deactivate(&mut self, bindings: &mut Bindings<'_>);
}

/// World-space origin of a chunk at height `y`.
pub(crate) fn chunk_origin(coord: ChunkCoord, chunk_world_size: f64, y: f64) -> DVec3 {
    let (x, z) = coord.world_origin(chunk_world_size);
    DVec3::new(x, y, z)
}

/// Heightfield tile with owned vegetation.
#[derive(Debug)]
pub struct TerrainTile {
    id: TileId,
    coord: ChunkCoord,
    origin: DVec3,
    mesh: ChunkMesh,
    decorations: Vec<DecorationHandle>,
    center_biome: Option<BiomeId>,
    active: bool,
    ticket: Option<u64>,
}

impl TerrainTile {
    /// Constructs an inactive tile over `topology`.
    pub fn new(id: TileId, topology: Arc<GridTopology>) -> Self {
        Self {
            id,
            coord: ChunkCoord::default(),
            origin: DVec3::ZERO,
            mesh: ChunkMesh::flat(topology, Vec4::ONE),
            decorations: Vec::new(),
            center_biome: None,
            active: false,
            ticket: None,
        }
    }

    /// Assigns the tile to `coord` and places it, still hidden.
    pub(crate) fn assign(
        &mut self,
        coord: ChunkCoord,
        chunk_world_size: f64,
        topology: &Arc<GridTopology>,
        material: &MaterialHandle,
        bindings: &mut Bindings<'_>,
    ) {
        self.mesh.ensure_topology(topology);
        self.coord = coord;
        self.origin = chunk_origin(coord, chunk_world_size, 0.0);
        self.active = true;
        self.ticket = None;
        bindings.render.set_material(self.id, material);
        bindings.render.set_transform(self.id, self.origin);
    }

    /// Writes a generated surface into the mesh, pushes it to the bindings,
    /// spawns its vegetation and shows the tile.
    pub(crate) fn apply(
        &mut self,
        generated: &GeneratedSurface,
        collision: bool,
        bindings: &mut Bindings<'_>,
    ) {
        if !self.mesh.apply(&generated.surface) {
            tracing::warn!(tile = %self.id, coord = %self.coord, "surface size mismatch, tile left flat");
        }
        bindings.render.set_geometry(
            self.id,
            &GeometryView {
                positions: self.mesh.positions(),
                colors: self.mesh.colors(),
                uvs: self.mesh.uvs(),
                indices: self.mesh.indices(),
            },
        );
        if collision {
            if let Some(c) = bindings.collision.as_deref_mut() {
                c.set_collision_mesh(self.id, self.mesh.collision_copy());
            }
        }
        for p in &generated.placements {
            let handle = bindings
                .decorations
                .spawn(&p.prototype, p.position, p.yaw, self.id);
            self.decorations.push(handle);
        }
        self.center_biome = generated.center_biome;
        self.ticket = None;
        bindings.render.set_visible(self.id, true);
    }

    pub(crate) fn set_ticket(&mut self, ticket: u64) {
        self.ticket = Some(ticket);
    }

    /// Pending async generation ticket, if the surface is not built yet.
    pub fn ticket(&self) -> Option<u64> {
        self.ticket
    }

    /// Chunk the tile is assigned to (stale while inactive).
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// World-space origin.
    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    /// Current mesh.
    pub fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }

    /// Handles of decorations spawned for the current chunk.
    pub fn decorations(&self) -> &[DecorationHandle] {
        &self.decorations
    }

    /// Dominant biome at the chunk centre.
    pub fn center_biome(&self) -> Option<BiomeId> {
        self.center_biome
    }
}

impl PooledTile for TerrainTile {
    const KIND: TileKind = TileKind::Terrain;

    fn id(&self) -> TileId {
        self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self, bindings: &mut Bindings<'_>) {
        bindings.render.set_visible(self.id, false);
        for handle in self.decorations.drain(..) {
            bindings.decorations.despawn(handle);
        }
        self.center_biome = None;
        self.ticket = None;
        self.active = false;
    }
}

/// Flat water plane tile.
#[derive(Debug)]
pub struct WaterTile {
    id: TileId,
    coord: ChunkCoord,
    origin: DVec3,
    mesh: ChunkMesh,
    uploaded: bool,
    active: bool,
}

impl WaterTile {
    /// Constructs an inactive water plane of `color` over `topology`.
    pub fn new(id: TileId, topology: Arc<GridTopology>, color: Vec4) -> Self {
        Self {
            id,
            coord: ChunkCoord::default(),
            origin: DVec3::ZERO,
            mesh: ChunkMesh::flat(topology, color),
            uploaded: false,
            active: false,
        }
    }

    /// Assigns the plane to `coord` at `height` and shows it.
    ///
    /// Geometry is uploaded on first use only; it never changes afterwards.
    pub(crate) fn assign(
        &mut self,
        coord: ChunkCoord,
        chunk_world_size: f64,
        height: f32,
        material: &MaterialHandle,
        bindings: &mut Bindings<'_>,
    ) {
        if !self.uploaded {
            bindings.render.set_geometry(
                self.id,
                &GeometryView {
                    positions: self.mesh.positions(),
                    colors: self.mesh.colors(),
                    uvs: self.mesh.uvs(),
                    indices: self.mesh.indices(),
                },
            );
            self.uploaded = true;
        }
        self.coord = coord;
        self.origin = chunk_origin(coord, chunk_world_size, height as f64);
        self.active = true;
        bindings.render.set_material(self.id, material);
        bindings.render.set_transform(self.id, self.origin);
        bindings.render.set_visible(self.id, true);
    }

    /// Chunk the plane is assigned to (stale while inactive).
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// World-space origin, including the water height.
    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    /// Current mesh.
    pub fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }
}

impl PooledTile for WaterTile {
    const KIND: TileKind = TileKind::Water;

    fn id(&self) -> TileId {
        self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self, bindings: &mut Bindings<'_>) {
        bindings.render.set_visible(self.id, false);
        self.active = false;
    }
}
