//! Headless fly-through: moves a scripted viewer across the world for a fixed
//! number of ticks and streams terrain around it.

use std::time::{Duration, Instant};

use glam::DVec3;
use tracing::{debug, info};
use verdant_config::{Config, ConfigError, ViewerConfig};
use verdant_stream::{Bindings, ChunkCoord, StreamError, StreamingController};

use crate::game_loop::{FIXED_DT, GameLoop};
use crate::headless::{HeadlessCollision, HeadlessDecorations, HeadlessRender};
use crate::platform::PlatformError;

/// How long shutdown waits for outstanding worker jobs.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that end a run before it starts.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Stream(#[from] StreamError),
}

/// A viewer moving at constant velocity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlyThrough {
    position: DVec3,
    velocity: DVec3,
}

impl FlyThrough {
    pub fn new(position: DVec3, velocity: DVec3) -> Self {
        Self { position, velocity }
    }

    pub fn from_config(viewer: &ViewerConfig) -> Self {
        Self::new(
            DVec3::from_array(viewer.start),
            DVec3::from_array(viewer.velocity),
        )
    }

    /// Advances the viewer by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        self.position += self.velocity * dt;
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }
}

/// Totals for one run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// Simulation ticks executed.
    pub ticks: u64,
    /// Simulated seconds.
    pub sim_time: f64,
    /// Viewer position after the last tick.
    pub final_position: DVec3,
    /// Viewer chunk after the last tick.
    pub final_chunk: Option<ChunkCoord>,
    /// Coordinates loaded over the run.
    pub spawned: usize,
    /// Coordinates released over the run, shutdown excluded.
    pub despawned: usize,
    /// Worker results applied, including the final drain.
    pub completed: usize,
    /// Largest loaded set seen after any tick.
    pub peak_loaded: usize,
    /// Loaded set just before shutdown.
    pub loaded_at_end: usize,
    /// Tiles constructed by both pools.
    pub tiles_constructed: u64,
    /// Tiles destroyed at shutdown.
    pub tiles_destroyed: usize,
    /// Decoration instances spawned over the run.
    pub decorations_spawned: u64,
    /// Live decorations per prototype just before shutdown.
    pub decorations_by_prototype: Vec<(String, usize)>,
    /// Collider replacements sent.
    pub collision_updates: u64,
    /// Decorations still alive after shutdown. Zero unless something leaked.
    pub leaked_decorations: usize,
}

/// Runs `config.viewer.ticks` fixed steps with headless bindings.
///
/// # Errors
///
/// Returns [`AppError::Stream`] if the streaming settings or biome table are
/// rejected, or worker threads cannot be started.
pub fn run_headless(config: &Config) -> Result<RunSummary, AppError> {
    let mut controller = StreamingController::from_config(config)?;
    let mut viewer = FlyThrough::from_config(&config.viewer);
    let mut game_loop = GameLoop::new();

    let mut render = HeadlessRender::new();
    let mut decorations = HeadlessDecorations::new();
    let mut collision = HeadlessCollision::new();

    let mut summary = RunSummary::default();
    let started = Instant::now();
    info!(
        ticks = config.viewer.ticks,
        seed = config.world.seed,
        view_distance = config.world.view_distance,
        workers = config.generation.worker_threads,
        "starting fly-through"
    );

    {
        let mut bindings = Bindings::new(&mut render, &mut decorations);
        if config.world.collision {
            bindings = bindings.with_collision(&mut collision);
        }

        // Tick zero loads the starting window before the viewer moves.
        let first = controller.update(Some(viewer.position()), &mut bindings);
        summary.spawned += first.spawned;
        summary.completed += first.completed;
        summary.final_chunk = first.viewer_chunk;
        summary.peak_loaded = controller.loaded_count();

        while game_loop.update_count() < config.viewer.ticks {
            game_loop.advance(FIXED_DT, |dt, sim_time| {
                viewer.step(dt);
                let stats = controller.update(Some(viewer.position()), &mut bindings);
                summary.spawned += stats.spawned;
                summary.despawned += stats.despawned;
                summary.completed += stats.completed;
                summary.peak_loaded = summary.peak_loaded.max(controller.loaded_count());
                if stats.viewer_chunk != summary.final_chunk {
                    debug!(
                        sim_time,
                        chunk = ?stats.viewer_chunk,
                        loaded = controller.loaded_count(),
                        pending = controller.pending_count(),
                        "viewer entered chunk"
                    );
                }
                summary.final_chunk = stats.viewer_chunk;
            });
        }

        summary.completed += controller.finish_pending(DRAIN_TIMEOUT, &mut bindings);
        if controller.pending_count() > 0 {
            tracing::warn!(
                pending = controller.pending_count(),
                "workers did not finish before shutdown"
            );
        }
    }

    summary.loaded_at_end = controller.loaded_count();
    summary.tiles_constructed = controller.terrain_pool().stats().constructed
        + controller.water_pool().stats().constructed;
    summary.decorations_by_prototype = decorations.live_by_prototype();
    summary.tiles_destroyed =
        controller.shutdown(&mut Bindings::new(&mut render, &mut decorations));

    summary.ticks = game_loop.update_count();
    summary.sim_time = game_loop.total_sim_time();
    summary.final_position = viewer.position();
    summary.decorations_spawned = decorations.spawned();
    summary.collision_updates = collision.updates();
    summary.leaked_decorations = decorations.live_count();

    info!(
        ticks = summary.ticks,
        spawned = summary.spawned,
        despawned = summary.despawned,
        peak_loaded = summary.peak_loaded,
        tiles = summary.tiles_constructed,
        decorations = summary.decorations_spawned,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "fly-through finished"
    );
    if summary.leaked_decorations > 0 || render.live_count() > 0 {
        tracing::warn!(
            decorations = summary.leaked_decorations,
            tiles = render.live_count(),
            "backend state left after shutdown"
        );
    }

    Ok(summary)
}
