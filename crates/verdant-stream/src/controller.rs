//! Streaming controller: keeps the square window of chunks around the viewer
//! loaded, with a hysteresis ring before eviction, recycling tiles through
//! the pools.
//!
//! Each [`update`](StreamingController::update) is level-triggered: it diffs
//! the desired window against the loaded set, so calling it twice without the
//! viewer moving does nothing the second time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::{DVec3, Vec4};
use rustc_hash::FxHashMap;
use verdant_config::Config;
use verdant_mesh::{GridCache, GridTopology};
use verdant_terrain::ChunkCoord;

use crate::async_generation::{AsyncChunkGenerator, FinishedJob, GenerationJob};
use crate::bindings::{Bindings, MaterialHandle};
use crate::generator::{ChunkGenerator, GeneratedSurface};
use crate::pool::TilePool;
use crate::tile::{PooledTile, TerrainTile, WaterTile};
use crate::StreamError;

/// Largest accepted view distance. The window is `(2d + 1)^2` chunks.
pub const MAX_VIEW_DISTANCE: u32 = 128;

/// Water plane appearance.
#[derive(Clone, Debug, PartialEq)]
pub struct WaterSettings {
    /// World-space Y of the plane.
    pub height: f32,
    /// Vertex colour.
    pub color: Vec4,
    /// Render material.
    pub material: MaterialHandle,
}

/// Streaming tunables.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamSettings {
    /// Spawn window radius in chunks.
    pub view_distance: u32,
    /// Extra rings kept before eviction.
    pub hysteresis: u32,
    /// Send collision copies of terrain meshes.
    pub collision: bool,
    /// Material of every terrain tile.
    pub terrain_material: MaterialHandle,
    /// Water planes, if enabled.
    pub water: Option<WaterSettings>,
    /// Generation worker threads; 0 builds every chunk inline.
    pub worker_threads: usize,
    /// Cap on outstanding worker jobs.
    pub max_in_flight: usize,
    /// Cap on each pool's free list.
    pub max_free_tiles: Option<usize>,
}

impl StreamSettings {
    /// Reads and validates the streaming parts of the config.
    pub fn from_config(config: &Config) -> Result<Self, StreamError> {
        let settings = Self {
            view_distance: config.world.view_distance,
            hysteresis: config.world.hysteresis,
            collision: config.world.collision,
            terrain_material: MaterialHandle::from(config.world.terrain_material.as_str()),
            water: config.water.enabled.then(|| WaterSettings {
                height: config.water.height,
                color: Vec4::from_array(config.water.color),
                material: MaterialHandle::from(config.water.material.as_str()),
            }),
            worker_threads: config.generation.worker_threads,
            max_in_flight: config.generation.max_in_flight,
            max_free_tiles: config.generation.max_free_tiles,
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), StreamError> {
        if self.view_distance > MAX_VIEW_DISTANCE {
            return Err(StreamError::InvalidSetting {
                field: "world.view_distance",
                reason: format!("must be at most {MAX_VIEW_DISTANCE}, got {}", self.view_distance),
            });
        }
        if self.worker_threads > 0 && self.max_in_flight == 0 {
            return Err(StreamError::InvalidSetting {
                field: "generation.max_in_flight",
                reason: "must be positive when workers are enabled".into(),
            });
        }
        Ok(())
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            view_distance: 4,
            hysteresis: 1,
            collision: true,
            terrain_material: MaterialHandle::from("terrain/vertex_color"),
            water: None,
            worker_threads: 0,
            max_in_flight: 16,
            max_free_tiles: None,
        }
    }
}

/// The tiles occupying one loaded coordinate.
#[derive(Debug)]
pub struct LoadedChunk {
    /// Terrain tile.
    pub terrain: TerrainTile,
    /// Water plane, when water is enabled.
    pub water: Option<WaterTile>,
}

/// What one update did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Viewer chunk after the update (unchanged on a stall).
    pub viewer_chunk: Option<ChunkCoord>,
    /// Coordinates newly loaded.
    pub spawned: usize,
    /// Coordinates released.
    pub despawned: usize,
    /// Worker results applied to tiles.
    pub completed: usize,
    /// Window coordinates left for a later tick because workers were full.
    pub deferred: usize,
}

/// Owns the loaded set and the tile pools.
pub struct StreamingController {
    settings: StreamSettings,
    generator: Arc<ChunkGenerator>,
    grids: GridCache,
    topology: Arc<GridTopology>,
    chunk_world_size: f64,
    loaded: FxHashMap<ChunkCoord, LoadedChunk>,
    terrain_pool: TilePool<TerrainTile>,
    water_pool: TilePool<WaterTile>,
    /// Window offsets, nearest ring first.
    window: Vec<(i32, i32)>,
    viewer_chunk: Option<ChunkCoord>,
    scratch: GeneratedSurface,
    evict: Vec<ChunkCoord>,
    workers: Option<AsyncChunkGenerator>,
    next_ticket: u64,
}

impl StreamingController {
    /// Creates a controller. Starts worker threads when
    /// `settings.worker_threads > 0`.
    pub fn new(settings: StreamSettings, generator: ChunkGenerator) -> Result<Self, StreamError> {
        settings.validate()?;
        let sculpt = *generator.sculpt_params();
        if sculpt.resolution < 2 {
            return Err(StreamError::InvalidSetting {
                field: "world.chunk_resolution",
                reason: "chunks need at least one quad per side".into(),
            });
        }
        if !(sculpt.spacing.is_finite() && sculpt.spacing > 0.0) {
            return Err(StreamError::InvalidSetting {
                field: "world.vertex_spacing",
                reason: format!("must be positive, got {}", sculpt.spacing),
            });
        }
        let chunk_world_size = sculpt.footprint().world_size();

        let mut grids = GridCache::new();
        let topology = grids.get_or_build(sculpt.resolution, sculpt.spacing as f32);

        let generator = Arc::new(generator);
        let workers = if settings.worker_threads > 0 {
            let threads = settings
                .worker_threads
                .min(AsyncChunkGenerator::max_useful_threads());
            Some(AsyncChunkGenerator::new(
                Arc::clone(&generator),
                threads,
                settings.max_in_flight,
            )?)
        } else {
            None
        };

        tracing::info!(
            view_distance = settings.view_distance,
            hysteresis = settings.hysteresis,
            chunk_world_size,
            workers = settings.worker_threads,
            water = settings.water.is_some(),
            "streaming controller ready"
        );

        Ok(Self {
            window: window_offsets(settings.view_distance),
            terrain_pool: TilePool::with_max_free(settings.max_free_tiles),
            water_pool: TilePool::with_max_free(settings.max_free_tiles),
            settings,
            generator,
            grids,
            topology,
            chunk_world_size,
            loaded: FxHashMap::default(),
            viewer_chunk: None,
            scratch: GeneratedSurface::default(),
            evict: Vec::new(),
            workers,
            next_ticket: 0,
        })
    }

    /// Builds settings, biome table and generator from configuration.
    pub fn from_config(config: &Config) -> Result<Self, StreamError> {
        let settings = StreamSettings::from_config(config)?;
        let generator = ChunkGenerator::from_config(config)?;
        Self::new(settings, generator)
    }

    /// Runs one streaming tick for a viewer at world position `viewer`.
    ///
    /// `None` stalls: finished worker results are still applied but the
    /// window does not move.
    pub fn update(&mut self, viewer: Option<DVec3>, bindings: &mut Bindings<'_>) -> UpdateStats {
        let mut stats = UpdateStats {
            viewer_chunk: self.viewer_chunk,
            completed: self.apply_finished(bindings),
            ..Default::default()
        };

        let Some(position) = viewer else {
            tracing::trace!("no viewer this tick, streaming stalled");
            return stats;
        };

        let center = ChunkCoord::from_world(position.x, position.z, self.chunk_world_size);
        if self.viewer_chunk != Some(center) {
            tracing::trace!(from = ?self.viewer_chunk, to = %center, "viewer changed chunk");
        }
        self.viewer_chunk = Some(center);
        stats.viewer_chunk = Some(center);

        // Evict first so released tiles are reused by this tick's spawns.
        stats.despawned = self.despawn_outside(center, bindings);
        let (spawned, deferred) = self.spawn_window(center, bindings);
        stats.spawned = spawned;
        stats.deferred = deferred;

        if stats.spawned > 0 || stats.despawned > 0 {
            tracing::debug!(
                viewer = %center,
                spawned = stats.spawned,
                despawned = stats.despawned,
                loaded = self.loaded.len(),
                "streaming window updated"
            );
        }
        stats
    }

    /// Blocks until every loaded tile has its surface or `timeout` elapses.
    /// Returns the number of results applied. A no-op without workers.
    pub fn finish_pending(&mut self, timeout: Duration, bindings: &mut Bindings<'_>) -> usize {
        let deadline = Instant::now() + timeout;
        let mut applied = 0;
        while self.pending_count() > 0 {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                break;
            };
            let Some(done) = self.workers.as_ref().and_then(|w| w.wait_result(remaining)) else {
                break;
            };
            if self.apply_one(done, bindings) {
                applied += 1;
            }
        }
        applied
    }

    /// Releases every loaded tile, then destroys all pooled tiles through the
    /// render binding. Returns the number of tiles destroyed.
    ///
    /// The controller is empty afterwards and may be updated again.
    pub fn shutdown(&mut self, bindings: &mut Bindings<'_>) -> usize {
        let mut coords: Vec<ChunkCoord> = self.loaded.keys().copied().collect();
        coords.sort_unstable();
        for coord in coords {
            self.release_chunk(coord, bindings);
        }
        let destroyed =
            self.terrain_pool.teardown(&mut *bindings.render)
                + self.water_pool.teardown(&mut *bindings.render);
        self.viewer_chunk = None;
        tracing::info!(destroyed, "streaming controller shut down");
        destroyed
    }

    fn despawn_outside(&mut self, center: ChunkCoord, bindings: &mut Bindings<'_>) -> usize {
        let limit = self.settings.view_distance.saturating_add(self.settings.hysteresis);
        let mut evict = std::mem::take(&mut self.evict);
        evict.clear();
        evict.extend(
            self.loaded
                .keys()
                .filter(|c| c.chebyshev(center) > limit)
                .copied(),
        );
        evict.sort_unstable();
        for &coord in &evict {
            self.release_chunk(coord, bindings);
        }
        let count = evict.len();
        self.evict = evict;
        count
    }

    fn spawn_window(&mut self, center: ChunkCoord, bindings: &mut Bindings<'_>) -> (usize, usize) {
        let mut spawned = 0;
        let mut deferred = 0;
        for i in 0..self.window.len() {
            let (dx, dy) = self.window[i];
            let coord = center.offset(dx, dy);
            if self.loaded.contains_key(&coord) {
                continue;
            }
            let saturated = self
                .workers
                .as_ref()
                .is_some_and(|w| w.in_flight_count() >= self.settings.max_in_flight as u64);
            if saturated {
                deferred += 1;
                continue;
            }
            self.spawn_chunk(coord, bindings);
            spawned += 1;
        }
        (spawned, deferred)
    }

    fn spawn_chunk(&mut self, coord: ChunkCoord, bindings: &mut Bindings<'_>) {
        let topology = Arc::clone(&self.topology);
        let mut terrain = self
            .terrain_pool
            .get(|id| TerrainTile::new(id, Arc::clone(&topology)));
        terrain.assign(
            coord,
            self.chunk_world_size,
            &topology,
            &self.settings.terrain_material,
            bindings,
        );

        let submitted = match &self.workers {
            Some(workers) => {
                let ticket = self.next_ticket;
                self.next_ticket = self.next_ticket.wrapping_add(1);
                match workers.submit(GenerationJob { coord, ticket }) {
                    Ok(()) => {
                        terrain.set_ticket(ticket);
                        bindings.render.set_visible(terrain.id(), false);
                        true
                    }
                    Err(_) => false,
                }
            }
            None => false,
        };
        if !submitted {
            self.generator.generate(coord, &mut self.scratch);
            terrain.apply(&self.scratch, self.settings.collision, bindings);
        }

        let water = self.settings.water.as_ref().map(|settings| {
            let mut tile = self
                .water_pool
                .get(|id| WaterTile::new(id, Arc::clone(&topology), settings.color));
            tile.assign(
                coord,
                self.chunk_world_size,
                settings.height,
                &settings.material,
                bindings,
            );
            tile
        });

        self.loaded.insert(coord, LoadedChunk { terrain, water });
    }

    fn release_chunk(&mut self, coord: ChunkCoord, bindings: &mut Bindings<'_>) {
        let Some(chunk) = self.loaded.remove(&coord) else {
            return;
        };
        if let (Some(ticket), Some(workers)) = (chunk.terrain.ticket(), &self.workers) {
            workers.cancel(ticket);
        }
        self.terrain_pool.release(chunk.terrain, bindings);
        if let Some(water) = chunk.water {
            self.water_pool.release(water, bindings);
        }
    }

    fn apply_finished(&mut self, bindings: &mut Bindings<'_>) -> usize {
        let finished = match &self.workers {
            Some(workers) => workers.drain_results(),
            None => return 0,
        };
        let mut applied = 0;
        for done in finished {
            if self.apply_one(done, bindings) {
                applied += 1;
            }
        }
        applied
    }

    /// Applies a worker result if its tile still waits for that ticket.
    fn apply_one(&mut self, done: FinishedJob, bindings: &mut Bindings<'_>) -> bool {
        match self.loaded.get_mut(&done.job.coord) {
            Some(chunk) if chunk.terrain.ticket() == Some(done.job.ticket) => {
                chunk
                    .terrain
                    .apply(&done.surface, self.settings.collision, bindings);
                true
            }
            _ => {
                tracing::trace!(
                    coord = %done.job.coord,
                    ticket = done.job.ticket,
                    "discarding stale generation result"
                );
                false
            }
        }
    }

    /// Number of loaded coordinates.
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    /// Whether `coord` is loaded.
    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.loaded.contains_key(&coord)
    }

    /// Tiles at `coord`, if loaded.
    pub fn loaded_chunk(&self, coord: ChunkCoord) -> Option<&LoadedChunk> {
        self.loaded.get(&coord)
    }

    /// Loaded coordinates, in no particular order.
    pub fn loaded_coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.loaded.keys().copied()
    }

    /// Loaded terrain tiles still waiting for a worker result.
    pub fn pending_count(&self) -> usize {
        self.loaded
            .values()
            .filter(|c| c.terrain.ticket().is_some())
            .count()
    }

    /// The terrain tile pool.
    pub fn terrain_pool(&self) -> &TilePool<TerrainTile> {
        &self.terrain_pool
    }

    /// The water tile pool.
    pub fn water_pool(&self) -> &TilePool<WaterTile> {
        &self.water_pool
    }

    /// Viewer chunk as of the last non-stalled update.
    pub fn viewer_chunk(&self) -> Option<ChunkCoord> {
        self.viewer_chunk
    }

    /// Active settings.
    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }

    /// The shared chunk generator.
    pub fn generator(&self) -> &Arc<ChunkGenerator> {
        &self.generator
    }

    /// World size of one chunk side.
    pub fn chunk_world_size(&self) -> f64 {
        self.chunk_world_size
    }

    /// Grid topologies built so far.
    pub fn grid_cache(&self) -> &GridCache {
        &self.grids
    }
}

/// Offsets of the `(2d + 1)^2` window, ring by ring from the centre, each
/// ring in row order.
fn window_offsets(view_distance: u32) -> Vec<(i32, i32)> {
    let r = view_distance as i32;
    let side = (2 * r + 1) as usize;
    let mut offsets = Vec::with_capacity(side * side);
    for ring in 0..=r {
        for dy in -ring..=ring {
            for dx in -ring..=ring {
                if dx.abs().max(dy.abs()) == ring {
                    offsets.push((dx, dy));
                }
            }
        }
    }
    offsets
}
