//! Armada Core -- the content catalog and specification cache for the
//! Armada strategy engine.
//!
//! This crate provides the equipment specification catalog (the variant
//! family describing weapons, hulls, sensors, countermeasures, shields,
//! engines, and command modules), the process-wide factory/cache that
//! builds exactly one canonical instance list per (category, level) key,
//! deterministic seeded randomness, and the per-player decorator hooks.
//!
//! # Cache Lifecycle
//!
//! A [`cache::SpecCache`] moves through an explicit lifecycle:
//!
//! 1. **Unpopulated** -- created with a seed; every lookup fails with
//!    [`cache::CacheError::NotInitialized`].
//! 2. **Populated** -- [`cache::SpecCache::populate`] enumerates every
//!    concrete category x level pair and runs the matching generator.
//!    Population is idempotent; a second call without a reset is a no-op.
//! 3. **Read-mostly** -- consumers hold shared references (or
//!    [`id::SpecHandle`] keys) and never mutate instances.
//! 4. **Reset** -- [`cache::SpecCache::reset`] clears everything at the
//!    "new game" boundary, returning to step 1.
//!
//! # Key Types
//!
//! - [`id::SpecId`] -- value-equality composite key (category, level).
//! - [`spec::EquipmentSpec`] -- immutable specification, validated at
//!   construction; category-specific payloads live in [`spec::SpecBody`].
//! - [`cache::SpecCache`] -- the single source of truth for instances.
//! - [`rng::SimRng`] -- SplitMix64 PRNG; every random decision takes an
//!   injected instance so tests stay deterministic.
//! - [`player::PlayerModifiers`] -- per-player adjustment hooks applied at
//!   materialization time, never to cached instances.

pub mod cache;
pub mod fixed;
pub mod generate;
pub mod id;
pub mod player;
pub mod rng;
pub mod spec;
