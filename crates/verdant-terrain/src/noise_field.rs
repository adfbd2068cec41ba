//! Deterministic 2D noise sampled in world space.
//!
//! Every terrain channel (height, heat, wetness) reads the same Perlin field
//! through a different coordinate offset, so one permutation table serves the
//! whole world and adjacent chunks sample one continuous function.

use noise::{NoiseFn, Perlin};

/// Smallest noise scale accepted; smaller or non-finite scales are clamped.
pub const MIN_SCALE: f64 = 1e-6;

/// Added to the world seed before deriving channel offsets, so that seed 0
/// still separates the channels.
pub const SEED_BIAS: f64 = 7919.0;

/// Pure function `(x, z, scale, offset) -> [0, 1]` over the whole real plane.
#[derive(Clone, Copy, Debug)]
pub struct NoiseField {
    perlin: Perlin,
}

impl NoiseField {
    /// Creates a field with the given permutation seed.
    pub fn new(permutation_seed: u32) -> Self {
        Self {
            perlin: Perlin::new(permutation_seed),
        }
    }

    /// Samples the field at world `(x, z)`.
    ///
    /// Larger `scale` values stretch features over more world units. The raw
    /// Perlin value in `[-1, 1]` is remapped to `[0, 1]` and clamped.
    pub fn sample(&self, x: f64, z: f64, scale: f64, seed_offset: f64) -> f64 {
        let scale = if scale.is_finite() && scale.abs() >= MIN_SCALE {
            scale.abs()
        } else {
            MIN_SCALE
        };
        let nx = (x + seed_offset) / scale;
        let nz = (z + seed_offset) / scale;
        if !(nx.is_finite() && nz.is_finite()) {
            return 0.5;
        }
        let raw = self.perlin.get([nx, nz]);
        ((raw + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Coordinate offsets for the three noise channels of one world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelOffsets {
    /// Offset for biome height noise.
    pub height: f64,
    /// Offset for the heat channel.
    pub heat: f64,
    /// Offset for the wetness channel.
    pub wetness: f64,
}

impl ChannelOffsets {
    /// Offsets `s`, `2s`, `3s` where `s = seed + SEED_BIAS`.
    pub fn from_seed(seed: i64) -> Self {
        let s = seed as f64 + SEED_BIAS;
        Self {
            height: s,
            heat: s * 2.0,
            wetness: s * 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_in_unit_range() {
        let field = NoiseField::default();
        for i in 0..200 {
            for j in 0..50 {
                let v = field.sample(i as f64 * 3.7 - 300.0, j as f64 * 11.3, 25.0, 12345.0);
                assert!((0.0..=1.0).contains(&v), "sample {v} out of range");
            }
        }
    }

    #[test]
    fn test_sample_deterministic() {
        let a = NoiseField::new(3);
        let b = NoiseField::new(3);
        let v1 = a.sample(101.25, -44.5, 60.0, 20264.0);
        let v2 = b.sample(101.25, -44.5, 60.0, 20264.0);
        assert_eq!(v1.to_bits(), v2.to_bits());
    }

    #[test]
    fn test_sample_is_continuous() {
        let field = NoiseField::default();
        let step = 0.01;
        for i in 0..5_000 {
            let x = i as f64 * step;
            let delta = (field.sample(x + step, 7.0, 30.0, 0.0) - field.sample(x, 7.0, 30.0, 0.0)).abs();
            assert!(delta < 0.01, "jump of {delta} at x={x}");
        }
    }

    #[test]
    fn test_degenerate_scale_is_total() {
        let field = NoiseField::default();
        for scale in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let v = field.sample(10.0, 20.0, scale, 1.0);
            assert!((0.0..=1.0).contains(&v), "scale {scale} produced {v}");
        }
        let v = field.sample(f64::MAX, f64::MAX, MIN_SCALE, f64::MAX);
        assert!((0.0..=1.0).contains(&v));
    }

    #[test]
    fn test_channels_decorrelated() {
        let field = NoiseField::default();
        let offsets = ChannelOffsets::from_seed(0);
        let mut differing = 0;
        for i in 0..100 {
            let x = i as f64 * 17.0;
            let heat = field.sample(x, 3.0, 100.0, offsets.heat);
            let wet = field.sample(x, 3.0, 100.0, offsets.wetness);
            if (heat - wet).abs() > 1e-3 {
                differing += 1;
            }
        }
        assert!(differing > 80, "heat and wetness track each other ({differing}/100 differ)");
    }

    #[test]
    fn test_channel_offsets_are_multiples() {
        let o = ChannelOffsets::from_seed(100);
        assert_eq!(o.heat, o.height * 2.0);
        assert_eq!(o.wetness, o.height * 3.0);
    }
}
