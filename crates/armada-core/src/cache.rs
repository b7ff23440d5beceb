//! The specification factory/cache: the single source of truth for
//! equipment specification instances.
//!
//! Exactly one canonical instance list exists per (category, level) key.
//! [`SpecCache::populate`] enumerates every concrete key in a fixed order
//! and runs the matching generator, so the whole catalog is a pure
//! function of the population seed. Consumers address instances through
//! [`SpecId`] value keys or [`SpecHandle`] slot keys and only ever see
//! shared references; nothing mutates a cached instance.
//!
//! Population is idempotent (a second call without [`SpecCache::reset`]
//! is a no-op) and atomic: generation runs into staging storage and the
//! cache commits only if every key succeeded.

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::generate;
use crate::id::{EquipmentCategory, ImprovementLevel, SpecHandle, SpecId};
use crate::rng::SimRng;
use crate::spec::{EquipmentSpec, SpecError, SpecWarning};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Lookup and population failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// The sentinel category has no generator and no cache slots.
    #[error("the undefined equipment category is not supported")]
    UnsupportedCategory,

    /// The key is well formed but no instances exist for it.
    #[error("no specifications exist for ({:?}, {:?})", id.category, id.level)]
    UnknownCombination { id: SpecId },

    /// A single-instance lookup found zero or several instances.
    #[error("expected exactly one specification for ({:?}, {:?}), found {count}", id.category, id.level)]
    AmbiguousResult { id: SpecId, count: usize },

    /// The cache has not been populated (or was reset).
    #[error("specification cache is not initialized")]
    NotInitialized,

    #[error(transparent)]
    Spec(#[from] SpecError),
}

// ---------------------------------------------------------------------------
// The cache
// ---------------------------------------------------------------------------

/// Process-wide cache of canonical specification instances.
#[derive(Debug)]
pub struct SpecCache {
    specs: SlotMap<SpecHandle, EquipmentSpec>,
    by_id: HashMap<SpecId, Vec<SpecHandle>>,
    /// Every handle in insertion order; backs uniform random lookups.
    order: Vec<SpecHandle>,
    warnings: Vec<SpecWarning>,
    seed: u64,
    populated: bool,
}

impl SpecCache {
    /// Create an unpopulated cache. Every lookup fails with
    /// [`CacheError::NotInitialized`] until [`SpecCache::populate`] runs.
    pub fn new(seed: u64) -> Self {
        Self {
            specs: SlotMap::with_key(),
            by_id: HashMap::new(),
            order: Vec::new(),
            warnings: Vec::new(),
            seed,
            populated: false,
        }
    }

    /// Build the full catalog: every concrete category at every concrete
    /// level, in declaration order. Idempotent; returns immediately if the
    /// cache is already populated. On error the cache is left untouched.
    pub fn populate(&mut self) -> Result<(), CacheError> {
        if self.populated {
            return Ok(());
        }

        // Stage everything first so a mid-generation failure cannot leave
        // a partially filled cache behind.
        let mut rng = SimRng::new(self.seed);
        let mut staged: Vec<(SpecId, generate::Generated)> = Vec::new();
        for category in EquipmentCategory::concrete() {
            for level in ImprovementLevel::concrete() {
                let id = SpecId::new(category, level)?;
                staged.push((id, generate::generate(category, level, &mut rng)?));
            }
        }

        for (id, generated) in staged {
            let mut handles = Vec::with_capacity(generated.specs.len());
            for spec in generated.specs {
                let handle = self.specs.insert(spec);
                handles.push(handle);
                self.order.push(handle);
            }
            if !handles.is_empty() {
                self.by_id.insert(id, handles);
            }
            self.warnings.extend(generated.warnings);
        }
        self.populated = true;
        Ok(())
    }

    /// Clear every instance and return to the unpopulated state. The seed
    /// is kept; repopulating reproduces the identical catalog.
    pub fn reset(&mut self) {
        self.specs.clear();
        self.by_id.clear();
        self.order.clear();
        self.warnings.clear();
        self.populated = false;
    }

    /// Replace the population seed. Only meaningful before the next
    /// populate; has no effect on already cached instances.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// Total number of cached instances across all keys.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Warn-only diagnostics raised during population.
    pub fn warnings(&self) -> &[SpecWarning] {
        &self.warnings
    }

    fn slot(&self, category: EquipmentCategory, level: ImprovementLevel) -> Result<(SpecId, &[SpecHandle]), CacheError> {
        if !self.populated {
            return Err(CacheError::NotInitialized);
        }
        if category == EquipmentCategory::None {
            return Err(CacheError::UnsupportedCategory);
        }
        let id = SpecId::new(category, level)?;
        match self.by_id.get(&id) {
            Some(handles) => Ok((id, handles.as_slice())),
            None => Err(CacheError::UnknownCombination { id }),
        }
    }

    /// Handles for every instance under a key, in canonical order.
    pub fn handles(
        &self,
        category: EquipmentCategory,
        level: ImprovementLevel,
    ) -> Result<&[SpecHandle], CacheError> {
        self.slot(category, level).map(|(_, handles)| handles)
    }

    /// Every instance under a key, in canonical order.
    pub fn get_all(
        &self,
        category: EquipmentCategory,
        level: ImprovementLevel,
    ) -> Result<Vec<&EquipmentSpec>, CacheError> {
        let (_, handles) = self.slot(category, level)?;
        Ok(handles.iter().map(|&h| &self.specs[h]).collect())
    }

    /// The sole instance under a key. Fails with
    /// [`CacheError::AmbiguousResult`] when the key holds several.
    pub fn get_single(
        &self,
        category: EquipmentCategory,
        level: ImprovementLevel,
    ) -> Result<&EquipmentSpec, CacheError> {
        let (id, handles) = self.slot(category, level)?;
        match handles {
            [handle] => Ok(&self.specs[*handle]),
            _ => Err(CacheError::AmbiguousResult {
                id,
                count: handles.len(),
            }),
        }
    }

    /// Resolve a handle to its instance. `None` for stale handles left
    /// over from before a reset.
    pub fn get(&self, handle: SpecHandle) -> Option<&EquipmentSpec> {
        self.specs.get(handle)
    }

    /// A uniformly random cached instance, drawn from the injected RNG.
    pub fn random_spec(&self, rng: &mut SimRng) -> Result<&EquipmentSpec, CacheError> {
        if !self.populated {
            return Err(CacheError::NotInitialized);
        }
        let handle = self.order[rng.next_below(self.order.len())];
        Ok(&self.specs[handle])
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> SpecCache {
        let mut cache = SpecCache::new(42);
        cache.populate().unwrap();
        cache
    }

    #[test]
    fn unpopulated_lookups_fail() {
        let cache = SpecCache::new(42);
        assert!(matches!(
            cache.get_all(EquipmentCategory::ShipHull, ImprovementLevel::One),
            Err(CacheError::NotInitialized)
        ));
        assert!(matches!(
            cache.random_spec(&mut SimRng::new(1)),
            Err(CacheError::NotInitialized)
        ));
    }

    #[test]
    fn populate_builds_every_concrete_key() {
        let cache = populated();
        for category in EquipmentCategory::concrete() {
            for level in ImprovementLevel::concrete() {
                // FTL dampeners below level three are the one legitimate gap.
                let low_dampener = category == EquipmentCategory::FtlDampener
                    && level.rank() < ImprovementLevel::Three.rank();
                let result = cache.get_all(category, level);
                if low_dampener {
                    assert!(matches!(result, Err(CacheError::UnknownCombination { .. })));
                } else {
                    assert!(!result.unwrap().is_empty(), "{category:?} {level:?}");
                }
            }
        }
    }

    #[test]
    fn populate_is_idempotent() {
        let mut cache = populated();
        let len = cache.len();
        let handles: Vec<_> = cache
            .handles(EquipmentCategory::Engine, ImprovementLevel::Two)
            .unwrap()
            .to_vec();
        cache.populate().unwrap();
        assert_eq!(cache.len(), len);
        assert_eq!(
            cache
                .handles(EquipmentCategory::Engine, ImprovementLevel::Two)
                .unwrap(),
            handles.as_slice()
        );
    }

    #[test]
    fn level_one_ship_hulls_are_frigate_and_destroyer() {
        let cache = populated();
        let hulls = cache
            .get_all(EquipmentCategory::ShipHull, ImprovementLevel::One)
            .unwrap();
        let names: Vec<_> = hulls.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Frigate Hull", "Destroyer Hull"]);
    }

    #[test]
    fn repeated_lookups_return_the_same_instances() {
        let cache = populated();
        let a = cache
            .handles(EquipmentCategory::ShipHull, ImprovementLevel::One)
            .unwrap();
        let b = cache
            .handles(EquipmentCategory::ShipHull, ImprovementLevel::One)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn get_single_rejects_multi_instance_keys() {
        let cache = populated();
        let result = cache.get_single(EquipmentCategory::BeamWeapon, ImprovementLevel::One);
        assert!(matches!(
            result,
            Err(CacheError::AmbiguousResult { count: 3, .. })
        ));
    }

    #[test]
    fn get_single_returns_sole_instance() {
        let cache = populated();
        let engine = cache
            .get_single(EquipmentCategory::Engine, ImprovementLevel::Three)
            .unwrap();
        assert_eq!(engine.category(), EquipmentCategory::Engine);
        assert_eq!(engine.level(), ImprovementLevel::Three);
    }

    #[test]
    fn missing_combination_is_reported() {
        let cache = populated();
        let result = cache.get_all(EquipmentCategory::FtlDampener, ImprovementLevel::One);
        assert!(matches!(result, Err(CacheError::UnknownCombination { .. })));
        assert!(
            cache
                .get_all(EquipmentCategory::FtlDampener, ImprovementLevel::Three)
                .is_ok()
        );
    }

    #[test]
    fn sentinel_key_components_are_rejected() {
        let cache = populated();
        assert!(matches!(
            cache.get_all(EquipmentCategory::None, ImprovementLevel::One),
            Err(CacheError::UnsupportedCategory)
        ));
        assert!(matches!(
            cache.get_all(EquipmentCategory::Engine, ImprovementLevel::None),
            Err(CacheError::Spec(SpecError::InvalidKey { .. }))
        ));
    }

    #[test]
    fn reset_returns_to_unpopulated() {
        let mut cache = populated();
        assert!(cache.is_populated());
        cache.reset();
        assert!(!cache.is_populated());
        assert!(cache.is_empty());
        assert!(matches!(
            cache.get_all(EquipmentCategory::Engine, ImprovementLevel::One),
            Err(CacheError::NotInitialized)
        ));
    }

    #[test]
    fn same_seed_reproduces_the_catalog() {
        let a = populated();
        let b = populated();
        assert_eq!(a.len(), b.len());
        let cost = |c: &SpecCache| {
            c.get_single(EquipmentCategory::Engine, ImprovementLevel::Two)
                .unwrap()
                .common
                .construction_cost
        };
        assert_eq!(cost(&a), cost(&b));
    }

    #[test]
    fn different_seeds_vary_the_stats() {
        let mut a = SpecCache::new(1);
        a.populate().unwrap();
        let mut b = SpecCache::new(2);
        b.populate().unwrap();
        let cost = |c: &SpecCache| {
            c.get_single(EquipmentCategory::Engine, ImprovementLevel::Two)
                .unwrap()
                .common
                .construction_cost
        };
        assert_ne!(cost(&a), cost(&b));
    }

    #[test]
    fn random_spec_is_deterministic_per_rng_seed() {
        let cache = populated();
        let a = cache.random_spec(&mut SimRng::new(77)).unwrap();
        let b = cache.random_spec(&mut SimRng::new(77)).unwrap();
        assert_eq!(a.name(), b.name());
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn random_spec_covers_multiple_keys() {
        let cache = populated();
        let mut rng = SimRng::new(3);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(cache.random_spec(&mut rng).unwrap().id());
        }
        assert!(seen.len() > 10);
    }

    #[test]
    fn stale_handles_resolve_to_none_after_reset() {
        let mut cache = populated();
        let handle = cache
            .handles(EquipmentCategory::Engine, ImprovementLevel::One)
            .unwrap()[0];
        cache.reset();
        assert!(cache.get(handle).is_none());
    }
}
