//! Technology graph for the Armada strategy engine.
//!
//! Technologies form a directed acyclic graph of research prerequisites.
//! The graph is built from declarations in two phases so that a
//! declaration may name a prerequisite that appears later in the input:
//! phase one registers every technology by name, phase two resolves
//! prerequisite names to handles and rejects dangling references and
//! cycles.
//!
//! # Overview
//!
//! Game content declares technologies as [`TechDeclaration`]s (raw
//! prerequisite *names*). [`TechGraph::build`] turns them into resolved
//! [`Technology`] values addressed by [`TechHandle`]s. Once built, the
//! graph is read-mostly; the one sanctioned mutation is
//! [`TechGraph::successor_of`], which extends the open-ended "Future
//! Tech" chain by one link whenever the current tail is completed.
//!
//! Per-player views are produced by [`TechGraph::materialize`], which
//! applies the player's read-time modifiers without touching the shared
//! graph.

use std::collections::{HashMap, HashSet, VecDeque};

use armada_core::cache::{CacheError, SpecCache};
use armada_core::fixed::Fixed64;
use armada_core::id::{CapabilityId, SpecId};
use armada_core::player::PlayerModifiers;
use armada_core::spec::{EquipmentSpec, ImageRef};
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Identifies a technology in the graph. Cheap to copy and compare.
    pub struct TechHandle;
}

/// Display name of the first link in the open-ended research chain.
pub const FUTURE_TECH_NAME: &str = "Future Tech";

/// Flat research cost increase from one Future Tech link to the next.
pub const FUTURE_TECH_COST_INCREMENT: u32 = 500;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Graph construction and lookup failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TechError {
    #[error("technology '{name}' is declared more than once")]
    DuplicateTechnology { name: String },

    #[error("technology '{tech}' requires unknown prerequisite '{prerequisite}'")]
    DanglingPrerequisite { tech: String, prerequisite: String },

    #[error("prerequisite cycle detected through technology '{name}'")]
    CycleDetected { name: String },

    #[error("unknown technology '{name}'")]
    UnknownTechnology { name: String },

    #[error("technology '{name}' is not part of the Future Tech chain")]
    NotFutureTech { name: String },

    #[error("stale or foreign technology handle")]
    InvalidHandle,

    #[error(transparent)]
    Cache(#[from] CacheError),
}

// ---------------------------------------------------------------------------
// Declarations and resolved technologies
// ---------------------------------------------------------------------------

/// What completing a technology makes available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unlock {
    /// Unlocks every specification instance cached under this key.
    Equipment(SpecId),

    /// Unlocks a capability stat at a level.
    Capability(CapabilityId),
}

/// Position of a technology in the research screen grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreePosition {
    pub row: u32,
    pub column: u32,
}

/// A technology as declared by game content: prerequisites are raw names,
/// not yet resolved against the rest of the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechDeclaration {
    pub name: String,
    pub description: String,
    pub image: Option<ImageRef>,
    pub research_cost: u32,
    pub prerequisites: Vec<String>,
    pub unlocks: Vec<Unlock>,
    pub position: TreePosition,
    /// Marks the seed of the open-ended research chain.
    pub future_tech: bool,
}

/// A resolved technology. Prerequisites are handles into the same graph.
/// Immutable after the graph is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Technology {
    pub name: String,
    pub description: String,
    pub image: Option<ImageRef>,
    pub research_cost: u32,
    pub prerequisites: Vec<TechHandle>,
    pub unlocks: Vec<Unlock>,
    pub position: TreePosition,
    /// 1-based position in the Future Tech chain; zero for ordinary
    /// technologies.
    pub future_index: u32,
}

impl Technology {
    pub fn is_future_tech(&self) -> bool {
        self.future_index > 0
    }
}

/// One player's view of a technology: the shared definition plus the
/// player's read-time adjustments. Borrowed, never a copy of the graph
/// or the catalog.
#[derive(Debug)]
pub struct PlayerTech<'a> {
    pub technology: &'a Technology,
    /// Research cost after the player's modifiers.
    pub research_cost: Fixed64,
    /// Whether every prerequisite is already completed by this player.
    pub available: bool,
    /// Whether this player has completed the technology itself.
    pub completed: bool,
    /// Every cached instance the technology's equipment unlocks cover.
    pub unlocked_specs: Vec<&'a EquipmentSpec>,
}

// ---------------------------------------------------------------------------
// The graph
// ---------------------------------------------------------------------------

/// The resolved technology DAG.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechGraph {
    techs: SlotMap<TechHandle, Technology>,
    by_name: HashMap<String, TechHandle>,
}

impl TechGraph {
    /// Build the graph from declarations.
    ///
    /// Phase one registers every technology by name, so declarations may
    /// reference prerequisites that appear later in the input. Phase two
    /// resolves prerequisite names to handles, then rejects cycles.
    pub fn build(declarations: Vec<TechDeclaration>) -> Result<Self, TechError> {
        let mut techs: SlotMap<TechHandle, Technology> = SlotMap::with_key();
        let mut by_name: HashMap<String, TechHandle> = HashMap::new();

        // Phase one: register names; prerequisites stay unresolved.
        let mut pending: Vec<(TechHandle, Vec<String>)> = Vec::new();
        for decl in declarations {
            if by_name.contains_key(&decl.name) {
                return Err(TechError::DuplicateTechnology { name: decl.name });
            }
            let future_index = u32::from(decl.future_tech);
            let handle = techs.insert(Technology {
                name: decl.name.clone(),
                description: decl.description,
                image: decl.image,
                research_cost: decl.research_cost,
                prerequisites: Vec::new(),
                unlocks: decl.unlocks,
                position: decl.position,
                future_index,
            });
            by_name.insert(decl.name, handle);
            pending.push((handle, decl.prerequisites));
        }

        // Phase two: resolve prerequisite names.
        for (handle, names) in pending {
            let mut resolved = Vec::with_capacity(names.len());
            for name in names {
                let Some(&prereq) = by_name.get(&name) else {
                    return Err(TechError::DanglingPrerequisite {
                        tech: techs[handle].name.clone(),
                        prerequisite: name,
                    });
                };
                resolved.push(prereq);
            }
            techs[handle].prerequisites = resolved;
        }

        let graph = Self { techs, by_name };
        graph.check_acyclic()?;
        Ok(graph)
    }

    /// Kahn's algorithm over prerequisite edges. Any node left with a
    /// positive in-degree sits on a cycle.
    fn check_acyclic(&self) -> Result<(), TechError> {
        // Edges run prerequisite -> dependent; in-degree counts a
        // technology's own prerequisites.
        let mut in_degree: HashMap<TechHandle, usize> = HashMap::new();
        let mut dependents: HashMap<TechHandle, Vec<TechHandle>> = HashMap::new();
        for (handle, tech) in &self.techs {
            in_degree.insert(handle, tech.prerequisites.len());
            for &prereq in &tech.prerequisites {
                dependents.entry(prereq).or_default().push(handle);
            }
        }

        let mut queue: VecDeque<TechHandle> = in_degree
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(&h, _)| h)
            .collect();
        let mut visited = 0usize;
        while let Some(handle) = queue.pop_front() {
            visited += 1;
            if let Some(deps) = dependents.get(&handle) {
                for &dep in deps {
                    if let Some(deg) = in_degree.get_mut(&dep) {
                        *deg -= 1;
                        if *deg == 0 {
                            queue.push_back(dep);
                        }
                    }
                }
            }
        }

        if visited == self.techs.len() {
            return Ok(());
        }
        // Name any node still blocked; it participates in (or depends on) a
        // cycle.
        let name = in_degree
            .iter()
            .find(|(_, deg)| **deg > 0)
            .map(|(&h, _)| self.techs[h].name.clone())
            .unwrap_or_default();
        Err(TechError::CycleDetected { name })
    }

    pub fn len(&self) -> usize {
        self.techs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.techs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TechHandle, &Technology)> {
        self.techs.iter()
    }

    /// Look a technology up by handle.
    pub fn get(&self, handle: TechHandle) -> Result<&Technology, TechError> {
        self.techs.get(handle).ok_or(TechError::InvalidHandle)
    }

    /// Resolve a display name to a handle.
    pub fn resolve(&self, name: &str) -> Result<TechHandle, TechError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| TechError::UnknownTechnology {
                name: name.to_string(),
            })
    }

    /// Whether every prerequisite of `handle` appears in `completed`.
    pub fn prerequisites_met(
        &self,
        handle: TechHandle,
        completed: &HashSet<TechHandle>,
    ) -> Result<bool, TechError> {
        let tech = self.get(handle)?;
        Ok(tech.prerequisites.iter().all(|p| completed.contains(p)))
    }

    /// Verify that every equipment unlock in the graph points at a cache
    /// key that actually holds instances.
    pub fn validate_unlocks(&self, cache: &SpecCache) -> Result<(), TechError> {
        for tech in self.techs.values() {
            for unlock in &tech.unlocks {
                if let Unlock::Equipment(id) = unlock {
                    cache.get_all(id.category, id.level)?;
                }
            }
        }
        Ok(())
    }

    /// Extend the Future Tech chain: create and insert the successor of
    /// `prev`, one column further along, prerequisite on `prev`, with the
    /// research cost raised by the flat increment. Returns the new handle.
    ///
    /// Fails with [`TechError::NotFutureTech`] if `prev` is an ordinary
    /// technology.
    pub fn successor_of(&mut self, prev: TechHandle) -> Result<TechHandle, TechError> {
        let tail = self.get(prev)?;
        if !tail.is_future_tech() {
            return Err(TechError::NotFutureTech {
                name: tail.name.clone(),
            });
        }
        let index = tail.future_index + 1;
        let successor = Technology {
            name: format!("{FUTURE_TECH_NAME} {index}"),
            description: tail.description.clone(),
            image: tail.image.clone(),
            research_cost: tail
                .research_cost
                .saturating_add(FUTURE_TECH_COST_INCREMENT),
            prerequisites: vec![prev],
            unlocks: Vec::new(),
            position: TreePosition {
                row: tail.position.row,
                column: tail.position.column + 1,
            },
            future_index: index,
        };
        if self.by_name.contains_key(&successor.name) {
            return Err(TechError::DuplicateTechnology {
                name: successor.name,
            });
        }
        let name = successor.name.clone();
        let handle = self.techs.insert(successor);
        self.by_name.insert(name, handle);
        Ok(handle)
    }

    /// One player's view of a technology. Applies the player's read-time
    /// research cost modifier and resolves equipment unlocks through the
    /// cache; neither the shared graph nor the catalog is touched.
    pub fn materialize<'a>(
        &'a self,
        handle: TechHandle,
        cache: &'a SpecCache,
        modifiers: &PlayerModifiers,
        completed: &HashSet<TechHandle>,
    ) -> Result<PlayerTech<'a>, TechError> {
        let technology = self.get(handle)?;
        let mut unlocked_specs = Vec::new();
        for unlock in &technology.unlocks {
            if let Unlock::Equipment(id) = unlock {
                unlocked_specs.extend(cache.get_all(id.category, id.level)?);
            }
        }
        let base = Fixed64::from_num(technology.research_cost);
        Ok(PlayerTech {
            technology,
            research_cost: modifiers.research_cost(base),
            available: technology
                .prerequisites
                .iter()
                .all(|p| completed.contains(p)),
            completed: completed.contains(&handle),
            unlocked_specs,
        })
    }
}

// ===========================================================================
// Tests
// ===========================================================================
