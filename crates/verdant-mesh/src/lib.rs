//! Heightfield chunk meshes: a cached flat grid topology per chunk size,
//! in-place sculpting from the biome sampler, and one-ring smoothing.

pub mod builder;
pub mod chunk_mesh;
pub mod grid;
pub mod smooth;

pub use builder::{ChunkMeshBuilder, SculptParams, SurfaceBuffers};
pub use chunk_mesh::{ChunkMesh, CollisionMesh};
pub use grid::{GridCache, GridTopology};
pub use smooth::{smooth_clamped, smooth_with_apron};
pub use verdant_config::SmoothEdges;
