//! Bindings that record what a real backend would have been asked to do.
//!
//! The headless binary has no renderer, physics or scene graph. These types
//! keep just enough per-tile state to report on a run and to catch a
//! controller that, say, shows a tile it never gave geometry.

use glam::DVec3;
use rustc_hash::FxHashMap;
use tracing::trace;
use verdant_stream::{
    CollisionBinding, CollisionMesh, DecorationBinding, DecorationHandle, GeometryView,
    MaterialHandle, PrototypeHandle, RenderBinding, TileId,
};

/// What the render side knows about one tile.
#[derive(Clone, Debug, Default)]
pub struct TileRecord {
    /// Vertices in the last geometry upload.
    pub vertex_count: usize,
    /// Last assigned material.
    pub material: Option<MaterialHandle>,
    /// Last world origin.
    pub origin: DVec3,
    /// Current visibility.
    pub visible: bool,
}

/// Render binding that keeps a [`TileRecord`] per tile.
#[derive(Debug, Default)]
pub struct HeadlessRender {
    tiles: FxHashMap<TileId, TileRecord>,
    geometry_uploads: u64,
    destroyed: u64,
}

impl HeadlessRender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record of a live tile.
    pub fn tile(&self, id: TileId) -> Option<&TileRecord> {
        self.tiles.get(&id)
    }

    /// Tiles currently shown.
    pub fn visible_count(&self) -> usize {
        self.tiles.values().filter(|t| t.visible).count()
    }

    /// Tiles with backend state (not yet destroyed).
    pub fn live_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn geometry_uploads(&self) -> u64 {
        self.geometry_uploads
    }

    pub fn destroyed(&self) -> u64 {
        self.destroyed
    }
}

impl RenderBinding for HeadlessRender {
    fn set_geometry(&mut self, tile: TileId, geometry: &GeometryView<'_>) {
        self.geometry_uploads += 1;
        self.tiles.entry(tile).or_default().vertex_count = geometry.positions.len();
    }

    fn set_material(&mut self, tile: TileId, material: &MaterialHandle) {
        self.tiles.entry(tile).or_default().material = Some(material.clone());
    }

    fn set_transform(&mut self, tile: TileId, origin: DVec3) {
        self.tiles.entry(tile).or_default().origin = origin;
    }

    fn set_visible(&mut self, tile: TileId, visible: bool) {
        let record = self.tiles.entry(tile).or_default();
        if visible && record.vertex_count == 0 {
            tracing::warn!(%tile, "tile shown without geometry");
        }
        record.visible = visible;
    }

    fn destroy(&mut self, tile: TileId) {
        trace!(%tile, "destroy");
        self.tiles.remove(&tile);
        self.destroyed += 1;
    }
}

/// Collision binding that remembers each tile's triangle count.
#[derive(Debug, Default)]
pub struct HeadlessCollision {
    triangles: FxHashMap<TileId, usize>,
    updates: u64,
}

impl HeadlessCollision {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of collider replacements received.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Triangles in the tile's current collider.
    pub fn triangles(&self, tile: TileId) -> Option<usize> {
        self.triangles.get(&tile).copied()
    }
}

impl CollisionBinding for HeadlessCollision {
    fn set_collision_mesh(&mut self, tile: TileId, mesh: CollisionMesh) {
        self.updates += 1;
        self.triangles.insert(tile, mesh.indices.len() / 3);
    }
}

/// Decoration binding that hands out sequential handles and counts instances
/// per prototype.
#[derive(Debug, Default)]
pub struct HeadlessDecorations {
    next: u64,
    live: FxHashMap<DecorationHandle, (PrototypeHandle, TileId)>,
    spawned: u64,
    despawned: u64,
    unknown_despawns: u64,
}

impl HeadlessDecorations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instances currently in the scene.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Live instances owned by `tile`.
    pub fn owned_by(&self, tile: TileId) -> usize {
        self.live.values().filter(|(_, owner)| *owner == tile).count()
    }

    /// Live instances per prototype name, sorted by name.
    pub fn live_by_prototype(&self) -> Vec<(String, usize)> {
        let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
        for (prototype, _) in self.live.values() {
            *counts.entry(prototype.as_str()).or_default() += 1;
        }
        let mut counts: Vec<(String, usize)> =
            counts.into_iter().map(|(name, n)| (name.to_string(), n)).collect();
        counts.sort();
        counts
    }

    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    pub fn despawned(&self) -> u64 {
        self.despawned
    }

    /// Despawn calls for handles that were never issued or already removed.
    pub fn unknown_despawns(&self) -> u64 {
        self.unknown_despawns
    }
}

impl DecorationBinding for HeadlessDecorations {
    fn spawn(
        &mut self,
        prototype: &PrototypeHandle,
        position: DVec3,
        yaw: f32,
        owner: TileId,
    ) -> DecorationHandle {
        let handle = DecorationHandle(self.next);
        self.next += 1;
        self.spawned += 1;
        trace!(%owner, prototype = prototype.as_str(), ?position, yaw, "spawn decoration");
        self.live.insert(handle, (prototype.clone(), owner));
        handle
    }

    fn despawn(&mut self, handle: DecorationHandle) {
        if self.live.remove(&handle).is_some() {
            self.despawned += 1;
        } else {
            self.unknown_despawns += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3, Vec4};
    use verdant_stream::TileKind;

    use super::*;

    fn terrain(index: u32) -> TileId {
        TileId {
            kind: TileKind::Terrain,
            index,
        }
    }

    #[test]
    fn test_render_tracks_tiles() {
        let mut render = HeadlessRender::new();
        let positions = [Vec3::ZERO; 4];
        let colors = [Vec4::ONE; 4];
        let uvs = [Vec2::ZERO; 4];
        let indices = [0, 2, 1, 1, 2, 3];
        let view = GeometryView {
            positions: &positions,
            colors: &colors,
            uvs: &uvs,
            indices: &indices,
        };

        render.set_geometry(terrain(0), &view);
        render.set_transform(terrain(0), DVec3::new(32.0, 0.0, 0.0));
        render.set_visible(terrain(0), true);
        render.set_visible(terrain(1), false);

        assert_eq!(render.visible_count(), 1);
        assert_eq!(render.live_count(), 2);
        assert_eq!(render.tile(terrain(0)).unwrap().vertex_count, 4);
        assert_eq!(render.geometry_uploads(), 1);

        render.destroy(terrain(0));
        assert_eq!(render.visible_count(), 0);
        assert_eq!(render.destroyed(), 1);
    }

    #[test]
    fn test_decorations_count_by_prototype() {
        let mut decorations = HeadlessDecorations::new();
        let pine = PrototypeHandle::from("pine");
        let rock = PrototypeHandle::from("rock");

        let a = decorations.spawn(&pine, DVec3::ZERO, 0.0, terrain(0));
        decorations.spawn(&pine, DVec3::X, 0.0, terrain(1));
        decorations.spawn(&rock, DVec3::Z, 1.0, terrain(1));
        assert_eq!(a, DecorationHandle(0));

        assert_eq!(
            decorations.live_by_prototype(),
            vec![("pine".to_string(), 2), ("rock".to_string(), 1)]
        );
        assert_eq!(decorations.owned_by(terrain(1)), 2);

        decorations.despawn(a);
        decorations.despawn(a);
        assert_eq!(decorations.live_count(), 2);
        assert_eq!(decorations.despawned(), 1);
        assert_eq!(decorations.unknown_despawns(), 1);
    }

    #[test]
    fn test_collision_keeps_latest_mesh() {
        let mut collision = HeadlessCollision::new();
        collision.set_collision_mesh(
            terrain(3),
            CollisionMesh {
                vertices: vec![Vec3::ZERO; 4],
                indices: vec![0, 2, 1, 1, 2, 3],
            },
        );
        collision.set_collision_mesh(terrain(3), CollisionMesh::default());
        assert_eq!(collision.updates(), 2);
        assert_eq!(collision.triangles(terrain(3)), Some(0));
    }
}
