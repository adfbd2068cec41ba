//! Biome table: maps [`BiomeId`] to [`BiomeDef`] with name-based lookup.
//!
//! Registration order is meaningful: it breaks ties in dominant-biome
//! selection and the nearest-biome fallback.

use hashbrown::HashMap;
use verdant_config::BiomeSettings;

use super::BiomeDef;

/// Unique identifier for a biome: its registration index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BiomeId(pub u16);

/// Errors that can occur when registering biomes.
#[derive(Debug, thiserror::Error)]
pub enum BiomeTableError {
    /// A biome with this name is already registered.
    #[error("duplicate biome name: {0}")]
    DuplicateName(String),
    /// A climate range is inverted or not finite.
    #[error("biome {0} has an invalid heat/wetness range")]
    InvalidRange(String),
    /// More biomes than a [`BiomeId`] can address.
    #[error("biome table is full ({0} entries)")]
    Full(usize),
}

/// Ordered set of biome definitions with O(1) lookup by ID.
#[derive(Clone, Debug, Default)]
pub struct BiomeTable {
    biomes: Vec<BiomeDef>,
    name_to_id: HashMap<String, BiomeId>,
}

impl BiomeTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from configuration entries, in order.
    ///
    /// Malformed vegetation rules are kept but reported once here; sampling
    /// skips them.
    pub fn from_settings(settings: &[BiomeSettings]) -> Result<Self, BiomeTableError> {
        let mut table = Self::new();
        for s in settings {
            let def = BiomeDef::from(s);
            let skipped = def.vegetation.iter().filter(|r| !r.is_well_formed()).count();
            if skipped > 0 {
                tracing::warn!(
                    biome = %def.name,
                    skipped,
                    "ignoring malformed vegetation rules"
                );
            }
            table.register(def)?;
        }
        Ok(table)
    }

    /// Registers a new biome definition, returning its assigned [`BiomeId`].
    ///
    /// # Errors
    ///
    /// Returns [`BiomeTableError::DuplicateName`] if a biome with the same name
    /// exists and [`BiomeTableError::InvalidRange`] for an unordered range.
    pub fn register(&mut self, def: BiomeDef) -> Result<BiomeId, BiomeTableError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(BiomeTableError::DuplicateName(def.name));
        }
        if !def.climate.is_valid() {
            return Err(BiomeTableError::InvalidRange(def.name));
        }
        let index = u16::try_from(self.biomes.len())
            .map_err(|_| BiomeTableError::Full(self.biomes.len()))?;
        let id = BiomeId(index);
        self.name_to_id.insert(def.name.clone(), id);
        self.biomes.push(def);
        Ok(id)
    }

    /// Returns the definition for the given biome ID, if registered.
    pub fn get(&self, id: BiomeId) -> Option<&BiomeDef> {
        self.biomes.get(id.0 as usize)
    }

    /// Looks up a biome ID by name.
    pub fn lookup_by_name(&self, name: &str) -> Option<BiomeId> {
        self.name_to_id.get(name).copied()
    }

    /// Iterates biomes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (BiomeId, &BiomeDef)> {
        self.biomes
            .iter()
            .enumerate()
            .map(|(i, def)| (BiomeId(i as u16), def))
    }

    /// Returns the number of registered biomes.
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    /// Returns `true` if no biomes are registered.
    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }
}
