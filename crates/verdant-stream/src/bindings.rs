//! Collaborator seams: rendering, collision and decoration spawning.
//!
//! The streaming controller never owns GPU, physics or scene objects. It
//! describes what each tile should look like through these traits and the
//! host engine decides how to realise it.

use std::sync::Arc;

use glam::{DVec3, Vec2, Vec3, Vec4};
use verdant_mesh::CollisionMesh;
use verdant_terrain::PrototypeHandle;

use crate::tile::TileId;

/// Opaque material reference, resolved by the render backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub Arc<str>);

impl From<&str> for MaterialHandle {
    fn from(name: &str) -> Self {
        Self(Arc::from(name))
    }
}

/// Handle to a spawned decoration, issued by the [`DecorationBinding`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecorationHandle(pub u64);

/// Borrowed view of a tile's current geometry.
#[derive(Clone, Copy, Debug)]
pub struct GeometryView<'a> {
    /// Tile-local vertex positions.
    pub positions: &'a [Vec3],
    /// Vertex colours.
    pub colors: &'a [Vec4],
    /// Texture coordinates.
    pub uvs: &'a [Vec2],
    /// Triangle list indices.
    pub indices: &'a [u32],
}

/// Presents tiles on screen.
pub trait RenderBinding {
    /// Replaces the tile's vertex data.
    fn set_geometry(&mut self, tile: TileId, geometry: &GeometryView<'_>);
    /// Assigns the tile's material.
    fn set_material(&mut self, tile: TileId, material: &MaterialHandle);
    /// Places the tile's local origin in world space.
    fn set_transform(&mut self, tile: TileId, origin: DVec3);
    /// Shows or hides the tile.
    fn set_visible(&mut self, tile: TileId, visible: bool);
    /// Frees every backend resource of the tile. Called once, at pool teardown
    /// or when a capped pool drops a surplus tile.
    fn destroy(&mut self, tile: TileId);
}

/// Receives collision geometry for terrain tiles.
pub trait CollisionBinding {
    /// Replaces the tile's collider. The mesh is an owned copy.
    fn set_collision_mesh(&mut self, tile: TileId, mesh: CollisionMesh);
}

/// Spawns and removes vegetation instances.
pub trait DecorationBinding {
    /// Instantiates `prototype` at `position` with rotation `yaw` about +Y.
    fn spawn(
        &mut self,
        prototype: &PrototypeHandle,
        position: DVec3,
        yaw: f32,
        owner: TileId,
    ) -> DecorationHandle;
    /// Removes a previously spawned instance.
    fn despawn(&mut self, handle: DecorationHandle);
}

/// The set of collaborators passed to every controller call.
pub struct Bindings<'a> {
    /// Render backend.
    pub render: &'a mut dyn RenderBinding,
    /// Physics backend, if collision is wanted.
    pub collision: Option<&'a mut dyn CollisionBinding>,
    /// Scene backend for vegetation.
    pub decorations: &'a mut dyn DecorationBinding,
}

impl<'a> Bindings<'a> {
    /// Bindings without a collision backend.
    pub fn new(
        render: &'a mut dyn RenderBinding,
        decorations: &'a mut dyn DecorationBinding,
    ) -> Self {
        Self {
            render,
            collision: None,
            decorations,
        }
    }

    /// Adds a collision backend.
    pub fn with_collision(mut self, collision: &'a mut dyn CollisionBinding) -> Self {
        self.collision = Some(collision);
        self
    }
}
