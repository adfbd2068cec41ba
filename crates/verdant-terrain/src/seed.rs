//! Per-chunk seeded RNG derivation.
//!
//! Scatter randomness is reproducible per `(world_seed, coord)`; no ambient
//! generator state is involved.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::ChunkCoord;

/// Derive a u64 seed for a chunk from the world seed and chunk coordinate.
///
/// Uses SipHash (via std's `DefaultHasher`) to combine both into a
/// well-distributed u64.
pub fn derive_chunk_seed(world_seed: i64, coord: ChunkCoord) -> u64 {
    let mut hasher = DefaultHasher::new();
    world_seed.hash(&mut hasher);
    coord.x.hash(&mut hasher);
    coord.y.hash(&mut hasher);
    hasher.finish()
}

/// Deterministic RNG for a specific chunk.
pub fn chunk_rng(world_seed: i64, coord: ChunkCoord) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_chunk_seed(world_seed, coord))
}
