//! Chunk streaming: keeps a window of terrain and water tiles around a moving
//! viewer, recycling tiles through pools and optionally generating surfaces on
//! worker threads.

pub mod async_generation;
pub mod bindings;
pub mod controller;
pub mod error;
pub mod generator;
pub mod pool;
pub mod tile;

pub use async_generation::{AsyncChunkGenerator, FinishedJob, GenerationJob};
pub use bindings::{
    Bindings, CollisionBinding, DecorationBinding, DecorationHandle, GeometryView,
    MaterialHandle, RenderBinding,
};
pub use controller::{
    LoadedChunk, MAX_VIEW_DISTANCE, StreamSettings, StreamingController, UpdateStats,
    WaterSettings,
};
pub use error::StreamError;
pub use generator::{ChunkGenerator, GeneratedSurface};
pub use pool::{PoolStats, TilePool};
pub use tile::{PooledTile, TerrainTile, TileId, TileKind, WaterTile};
pub use verdant_mesh::CollisionMesh;
pub use verdant_terrain::{ChunkCoord, PrototypeHandle};
