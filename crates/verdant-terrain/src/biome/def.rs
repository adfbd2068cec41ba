//! Biome definition: describes the properties of a single biome type.

use std::sync::Arc;

use glam::Vec4;
use verdant_config::{BiomeSettings, PlacementSettings, VegetationSettings};

use super::ClimateRange;

/// Opaque reference to a decoration prototype (e.g. a tree asset).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrototypeHandle(pub Arc<str>);

impl PrototypeHandle {
    /// Returns the prototype name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PrototypeHandle {
    fn from(name: &str) -> Self {
        Self(Arc::from(name))
    }
}

/// One vegetation placement rule of a biome.
#[derive(Clone, Debug)]
pub struct VegetationRule {
    /// Decoration to spawn. Rules without one are skipped.
    pub prototype: Option<PrototypeHandle>,
    /// Per-vertex acceptance probability, or instances per square world unit.
    pub density: f32,
    /// How candidate points are chosen.
    pub placement: PlacementSettings,
    /// Lower bound of the normalised height band (inclusive).
    pub min_height_frac: f32,
    /// Upper bound of the normalised height band (exclusive).
    pub max_height_frac: f32,
    /// Uniform vertical offset range added to the surface height.
    pub vertical_jitter: (f32, f32),
}

impl VegetationRule {
    /// Whether the rule can place anything: it names a prototype, has a
    /// positive finite density and an ordered height band.
    pub fn is_well_formed(&self) -> bool {
        self.prototype.is_some()
            && self.density.is_finite()
            && self.density > 0.0
            && self.min_height_frac <= self.max_height_frac
    }

    /// Whether a normalised height falls inside `[min_height_frac, max_height_frac)`.
    pub fn height_in_band(&self, height01: f64) -> bool {
        height01 >= self.min_height_frac as f64 && height01 < self.max_height_frac as f64
    }
}

impl From<&VegetationSettings> for VegetationRule {
    fn from(s: &VegetationSettings) -> Self {
        Self {
            prototype: s
                .prototype
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(PrototypeHandle::from),
            density: s.density,
            placement: s.placement,
            min_height_frac: s.min_height_frac,
            max_height_frac: s.max_height_frac,
            vertical_jitter: s.vertical_jitter,
        }
    }
}

/// Full descriptor for a biome type. Immutable once registered.
#[derive(Clone, Debug)]
pub struct BiomeDef {
    /// Human-readable biome name (e.g., "forest").
    pub name: String,
    /// Heat/wetness rectangle where the biome has full weight.
    pub climate: ClimateRange,
    /// World units per noise feature for this biome's height.
    pub noise_scale: f64,
    /// Height of a noise value of 1.
    pub height_multiplier: f64,
    /// Constant added to the biome's height.
    pub base_height: f64,
    /// Vertex colour (RGBA).
    pub color: Vec4,
    /// Optional texture reference passed through to rendering.
    pub texture: Option<String>,
    /// Vegetation rules, applied in order.
    pub vegetation: Vec<VegetationRule>,
}

impl BiomeDef {
    /// Unscaled height for a normalised noise value.
    pub fn height_at(&self, noise01: f64) -> f64 {
        noise01 * self.height_multiplier + self.base_height
    }
}

impl From<&BiomeSettings> for BiomeDef {
    fn from(s: &BiomeSettings) -> Self {
        Self {
            name: s.name.clone(),
            climate: ClimateRange {
                min_heat: s.min_heat,
                max_heat: s.max_heat,
                min_wetness: s.min_wetness,
                max_wetness: s.max_wetness,
            },
            noise_scale: s.noise_scale,
            height_multiplier: s.height_multiplier,
            base_height: s.base_height,
            color: Vec4::from_array(s.color),
            texture: s.texture.clone(),
            vegetation: s.vegetation.iter().map(VegetationRule::from).collect(),
        }
    }
}
