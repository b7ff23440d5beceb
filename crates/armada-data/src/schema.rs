//! Raw data-file schema types.
//!
//! These structs mirror the on-disk shape of technology data files
//! (RON/JSON/TOML) and are deliberately dumb: strings and plain numbers,
//! no handles. The loader converts them into resolved declarations.

use armada_core::id::{Capability, EquipmentCategory, ImprovementLevel};
use armada_core::spec::ImageRef;
use serde::{Deserialize, Serialize};

/// One technology as written in a data file. Prerequisites are names;
/// the graph builder resolves them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechData {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Research-screen icon.
    #[serde(default)]
    pub image: Option<ImageRef>,

    pub research_cost: u32,

    #[serde(default)]
    pub prerequisites: Vec<String>,

    #[serde(default)]
    pub unlocks: Vec<UnlockData>,

    #[serde(default)]
    pub row: u32,

    #[serde(default)]
    pub column: u32,

    /// Marks the seed of the open-ended research chain.
    #[serde(default)]
    pub future_tech: bool,
}

/// Unlock entry as written in a data file. Key components reuse the
/// engine's snake_case enum spellings (`"beam_weapon"`, `"two"`, ...);
/// sentinel values are rejected when the key is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockData {
    Equipment {
        category: EquipmentCategory,
        level: ImprovementLevel,
    },
    Capability {
        capability: Capability,
        level: ImprovementLevel,
    },
}

/// Wrapper for TOML files, which cannot have a top-level array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlTechs {
    pub technologies: Vec<TechData>,
}
