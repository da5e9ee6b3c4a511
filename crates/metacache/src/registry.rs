// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-type descriptor cache.
//!
//! # Architecture
//!
//! - **Uncached**: [`DescriptorRegistry::get_descriptor`] always builds a
//!   fresh descriptor and never touches the map.
//! - **Cached**: [`DescriptorRegistry::get_or_build`] looks the type up in a
//!   `DashMap` keyed by `TypeId`. A miss builds outside any map lock, then
//!   installs first-writer-wins. Racing builders may each build; only the
//!   installed descriptor is ever returned, the rest are dropped.
//!
//! # Performance
//!
//! - Hit: one shard read lock plus an `Arc` clone
//! - Config: `ArcSwap`, readers never block
//! - Stats: relaxed atomics

use crate::config::RegistryConfig;
use crate::error::Result;
use crate::info::{Reflect, TypeInfo};
use crate::meta::TypeDescriptor;
use arc_swap::ArcSwap;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Snapshot of registry counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Descriptors built (cached and uncached).
    pub builds: u64,
    /// Cached lookups served from the map.
    pub hits: u64,
    /// Cached lookups that had to build.
    pub misses: u64,
    /// Builds that lost an install race and were dropped.
    pub discarded: u64,
}

#[derive(Debug, Default)]
struct Counters {
    builds: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    discarded: AtomicU64,
}

/// Owner of the type to descriptor cache.
///
/// Construct one per process (or per isolated context) and pass it
/// explicitly; there is no global instance.
pub struct DescriptorRegistry {
    cache: DashMap<TypeId, Arc<TypeDescriptor>>,
    config: ArcSwap<RegistryConfig>,
    counters: Counters,
}

impl Default for DescriptorRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl DescriptorRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            cache: DashMap::new(),
            config: ArcSwap::from_pointee(config),
            counters: Counters::default(),
        }
    }

    // ===================================================================
    // Configuration
    // ===================================================================

    /// Current configuration.
    pub fn config(&self) -> Arc<RegistryConfig> {
        self.config.load_full()
    }

    /// Replace the configuration. Descriptors already cached keep theirs.
    pub fn set_config(&self, config: RegistryConfig) {
        self.config.store(Arc::new(config));
        log::debug!("[registry] configuration replaced");
    }

    // ===================================================================
    // Uncached access
    // ===================================================================

    /// Build a fresh descriptor for `T`.
    pub fn get_descriptor<T: Reflect>(&self) -> Result<TypeDescriptor> {
        self.describe(&TypeInfo::of::<T>())
    }

    /// Build a fresh descriptor from a declaration.
    pub fn describe(&self, info: &TypeInfo) -> Result<TypeDescriptor> {
        let config = self.config.load();
        let desc = TypeDescriptor::build(info, &config)?;
        self.counters.builds.fetch_add(1, Ordering::Relaxed);
        Ok(desc)
    }

    // ===================================================================
    // Cached access
    // ===================================================================

    /// Cached descriptor for `T`, built on first request.
    pub fn get_or_build<T: Reflect>(&self) -> Result<Arc<TypeDescriptor>> {
        if let Some(desc) = self.lookup(TypeId::of::<T>()) {
            return Ok(desc);
        }
        self.build_and_install(&TypeInfo::of::<T>())
    }

    /// Cached descriptor for the type `info` declares.
    pub fn get_or_build_info(&self, info: Arc<TypeInfo>) -> Result<Arc<TypeDescriptor>> {
        if let Some(desc) = self.lookup(info.type_ident().id()) {
            return Ok(desc);
        }
        self.build_and_install(&info)
    }

    fn lookup(&self, id: TypeId) -> Option<Arc<TypeDescriptor>> {
        let found = self.cache.get(&id).map(|entry| Arc::clone(entry.value()));
        if found.is_some() {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    fn build_and_install(&self, info: &TypeInfo) -> Result<Arc<TypeDescriptor>> {
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        let built = Arc::new(self.describe(info)?);

        match self.cache.entry(info.type_ident().id()) {
            Entry::Occupied(entry) => {
                self.counters.discarded.fetch_add(1, Ordering::Relaxed);
                log::debug!(
                    "[registry] `{}` was installed concurrently, discarding duplicate build",
                    info.name()
                );
                Ok(Arc::clone(entry.get()))
            }
            Entry::Vacant(entry) => {
                log::debug!("[registry] installed `{}`", info.name());
                Ok(Arc::clone(entry.insert(built).value()))
            }
        }
    }

    /// Cached descriptor for `id`, without building.
    pub fn cached(&self, id: TypeId) -> Option<Arc<TypeDescriptor>> {
        self.cache.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, id: TypeId) -> bool {
        self.cache.contains_key(&id)
    }

    /// Number of cached descriptors.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Evict one type. Callers holding the descriptor keep it.
    pub fn remove(&self, id: TypeId) -> Option<Arc<TypeDescriptor>> {
        self.cache.remove(&id).map(|(_, desc)| desc)
    }

    /// Evict everything.
    pub fn clear(&self) {
        self.cache.clear();
        log::debug!("[registry] cache cleared");
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            builds: self.counters.builds.load(Ordering::Relaxed),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            discarded: self.counters.discarded.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for DescriptorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorRegistry")
            .field("cached", &self.cache.len())
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::TypeInfoBuilder;

    #[derive(Default)]
    struct Probe {
        level: u8,
    }

    impl Reflect for Probe {
        fn reflect(t: &mut TypeInfoBuilder<Self>) {
            t.constructor(|(): ()| Probe::default());
            t.field("level", |p| &p.level, |p| &mut p.level);
        }
    }

    #[test]
    fn test_uncached_never_installs() {
        let registry = DescriptorRegistry::default();
        let a = registry.get_descriptor::<Probe>().expect("build");
        let b = registry.get_descriptor::<Probe>().expect("build");
        assert!(registry.is_empty());
        assert_eq!(a.fields().len(), b.fields().len());
        assert_eq!(registry.stats().builds, 2);
    }

    #[test]
    fn test_cached_identity_and_stats() {
        let registry = DescriptorRegistry::default();
        let a = registry.get_or_build::<Probe>().expect("build");
        let b = registry.get_or_build::<Probe>().expect("hit");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(registry.contains(TypeId::of::<Probe>()));
        assert_eq!(
            registry.stats(),
            RegistryStats {
                builds: 1,
                hits: 1,
                misses: 1,
                discarded: 0
            }
        );
    }

    #[test]
    fn test_remove_and_clear() {
        let registry = DescriptorRegistry::default();
        let first = registry.get_or_build::<Probe>().expect("build");
        let removed = registry.remove(TypeId::of::<Probe>()).expect("cached");
        assert!(Arc::ptr_eq(&first, &removed));
        assert!(registry.cached(TypeId::of::<Probe>()).is_none());

        let second = registry.get_or_build::<Probe>().expect("rebuild");
        assert!(!Arc::ptr_eq(&first, &second));
        registry.clear();
        assert_eq!(registry.len(), 0);
        assert_eq!(first.field("level").map(|f| f.can_write()), Some(true));
    }

    #[test]
    fn test_set_config_affects_later_builds() {
        let registry = DescriptorRegistry::default();
        assert!(registry.config().exclude_object_methods);
        registry.set_config(RegistryConfig::new().exclude_object_methods(false));
        let desc = registry.get_descriptor::<Probe>().expect("build");
        assert!(desc.methods().contains_key("type_name"));
    }
}
