//! Tile pools: LIFO free lists that recycle tiles instead of destroying them.
//!
//! A tile is owned by exactly one place at a time: the loaded set (as an
//! active tile) or a pool's free list (inactive). Moving the value between
//! them is the only way to change state.

use crate::bindings::{Bindings, RenderBinding};
use crate::tile::{PooledTile, TileId, TileKind};

/// Lifetime counters of a pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Tiles ever constructed.
    pub constructed: u64,
    /// Calls to [`TilePool::get`].
    pub gets: u64,
    /// Calls to [`TilePool::release`].
    pub releases: u64,
    /// Tiles destroyed (surplus over the cap, or at teardown).
    pub destroyed: u64,
}

/// Free list of inactive tiles of one kind.
#[derive(Debug)]
pub struct TilePool<T: PooledTile> {
    free: Vec<T>,
    next_index: u32,
    max_free: Option<usize>,
    stats: PoolStats,
}

impl<T: PooledTile> TilePool<T> {
    /// Creates an unbounded pool.
    pub fn new() -> Self {
        Self::with_max_free(None)
    }

    /// Creates a pool that keeps at most `max_free` inactive tiles; further
    /// releases destroy the tile.
    pub fn with_max_free(max_free: Option<usize>) -> Self {
        Self {
            free: Vec::new(),
            next_index: 0,
            max_free,
            stats: PoolStats::default(),
        }
    }

    /// Pops the most recently released tile, or constructs one with `build`
    /// and a fresh id.
    pub fn get(&mut self, build: impl FnOnce(TileId) -> T) -> T {
        self.stats.gets += 1;
        if let Some(tile) = self.free.pop() {
            return tile;
        }
        let id = TileId {
            kind: T::KIND,
            index: self.next_index,
        };
        self.next_index = self.next_index.wrapping_add(1);
        self.stats.constructed += 1;
        build(id)
    }

    /// Deactivates `tile` and puts it on the free list.
    pub fn release(&mut self, mut tile: T, bindings: &mut Bindings<'_>) {
        self.stats.releases += 1;
        tile.deactivate(bindings);
        if self.max_free.is_some_and(|cap| self.free.len() >= cap) {
            bindings.render.destroy(tile.id());
            self.stats.destroyed += 1;
            return;
        }
        self.free.push(tile);
    }

    /// Destroys every free tile through the render binding. Returns how many
    /// were destroyed.
    pub fn teardown(&mut self, render: &mut dyn RenderBinding) -> usize {
        let count = self.free.len();
        for tile in self.free.drain(..) {
            render.destroy(tile.id());
        }
        self.stats.destroyed += count as u64;
        count
    }

    /// Number of inactive tiles waiting for reuse.
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Ids of the inactive tiles.
    pub fn free_ids(&self) -> impl Iterator<Item = TileId> + '_ {
        self.free.iter().map(PooledTile::id)
    }

    /// Lifetime counters.
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Kind of tile this pool holds.
    pub fn kind(&self) -> TileKind {
        T::KIND
    }
}

impl<T: PooledTile> Default for TilePool<T> {
    fn default() -> Self {
        Self::new()
    }
}
