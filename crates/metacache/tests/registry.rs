// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::cast_precision_loss)] // Stats/metrics need this
#![allow(clippy::cast_sign_loss)] // Test data conversions
#![allow(clippy::cast_possible_truncation)] // Test parameters
#![allow(clippy::float_cmp)] // Test assertions with constants
#![allow(clippy::unreadable_literal)] // Large test constants
#![allow(clippy::doc_markdown)] // Test documentation
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure
#![allow(clippy::missing_errors_doc)] // Test documentation
#![allow(clippy::items_after_statements)] // Test helpers
#![allow(clippy::module_name_repetitions)] // Test modules
#![allow(clippy::too_many_lines)] // Example/test code
#![allow(clippy::match_same_arms)] // Test pattern matching
#![allow(clippy::no_effect_underscore_binding)] // Test variables
#![allow(clippy::wildcard_imports)] // Test utility imports
#![allow(clippy::redundant_closure_for_method_calls)] // Test code clarity
#![allow(clippy::similar_names)] // Test variable naming
#![allow(clippy::shadow_unrelated)] // Test scoping
#![allow(clippy::needless_pass_by_value)] // Test functions
#![allow(clippy::cast_possible_wrap)] // Test conversions
#![allow(clippy::single_match_else)] // Test clarity
#![allow(clippy::needless_continue)] // Test logic
#![allow(clippy::cast_lossless)] // Test simplicity
#![allow(clippy::match_wild_err_arm)] // Test error handling
#![allow(clippy::explicit_iter_loop)] // Test iteration
#![allow(clippy::must_use_candidate)] // Test functions
#![allow(clippy::if_not_else)] // Test conditionals
#![allow(clippy::map_unwrap_or)] // Test options
#![allow(clippy::match_wildcard_for_single_variants)] // Test patterns
#![allow(clippy::ignored_unit_patterns)] // Test closures


//! Registry caching: identity, concurrent misses, eviction and config swaps.

use metacache::{
    DescriptorRegistry, Reflect, RegistryConfig, RegistryStats, TypeInfo, TypeInfoBuilder,
};
use std::any::TypeId;
use std::collections::BTreeSet;
use std::sync::{Arc, Barrier};

#[derive(Debug, Default, Clone, PartialEq)]
struct Order {
    id: u64,
    total: f64,
    note: Option<String>,
}

impl Reflect for Order {
    fn reflect(t: &mut TypeInfoBuilder<Self>) {
        t.constructor(|(): ()| Order::default());
        t.constructor(|(id,): (u64,)| Order { id, ..Order::default() });
        t.field("id", |o| &o.id, |o| &mut o.id);
        t.field("total", |o| &o.total, |o| &mut o.total);
        t.property("note", |o: &Order| o.note.clone(), |o, v| o.note = v);
        t.method("is_free", |o: &Order, (): ()| o.total == 0.0);
        t.derive_eq();
    }
}

fn member_names(registry: &DescriptorRegistry) -> BTreeSet<String> {
    registry
        .get_or_build::<Order>()
        .expect("build")
        .members()
        .iter()
        .map(|m| format!("{:?}", m))
        .collect()
}

#[test]
fn test_cached_lookups_are_identical() {
    let registry = DescriptorRegistry::default();
    let a = registry.get_or_build::<Order>().expect("build");
    let b = registry.get_or_build::<Order>().expect("build");
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(member_names(&registry), member_names(&registry));
    assert_eq!(registry.len(), 1);
    assert!(Arc::ptr_eq(
        &a,
        &registry.cached(TypeId::of::<Order>()).expect("cached")
    ));
}

#[test]
fn test_uncached_builds_fresh_equal_descriptors() {
    let registry = DescriptorRegistry::default();
    let a = registry.get_descriptor::<Order>().expect("build");
    let b = registry.get_descriptor::<Order>().expect("build");
    let names = |d: &metacache::TypeDescriptor| {
        d.members()
            .iter()
            .map(|m| m.name().to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(names(&a), names(&b));
    assert!(!registry.contains(TypeId::of::<Order>()));
    assert_eq!(registry.stats().builds, 2);
}

#[test]
fn test_info_entry_point_shares_cache() {
    let registry = DescriptorRegistry::default();
    let from_info = registry
        .get_or_build_info(TypeInfo::of::<Order>())
        .expect("build");
    let from_type = registry.get_or_build::<Order>().expect("hit");
    assert!(Arc::ptr_eq(&from_info, &from_type));
}

#[test]
fn test_concurrent_misses_converge() {
    const THREADS: usize = 8;
    let registry = DescriptorRegistry::default();
    let barrier = Barrier::new(THREADS);

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let registry = &registry;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    registry.get_or_build::<Order>().expect("build")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .collect()
    });

    let first = &results[0];
    assert!(results.iter().all(|d| Arc::ptr_eq(d, first)));
    assert_eq!(registry.len(), 1);

    let stats = registry.stats();
    assert_eq!(stats.hits + stats.misses, THREADS as u64);
    assert!(stats.builds >= 1);
    assert_eq!(stats.builds, stats.misses);
    assert_eq!(stats.discarded, stats.misses - 1);
}

#[test]
fn test_concurrent_use_of_cached_descriptor() {
    let registry = DescriptorRegistry::default();
    let desc = registry.get_or_build::<Order>().expect("build");

    std::thread::scope(|s| {
        for i in 0..8u64 {
            let desc = Arc::clone(&desc);
            s.spawn(move || {
                let mut order = desc.create_default_as::<Order>().expect("default");
                desc.field("id")
                    .expect("id")
                    .set(&mut order, metacache::Value::new(i))
                    .expect("set id");
                assert_eq!(order.id, i);
                let free = desc.method_overloads("is_free")[0]
                    .invoke(Some(&mut order), Vec::new())
                    .expect("is_free");
                assert_eq!(free.downcast_ref::<bool>(), Some(&true));
            });
        }
    });
}

#[test]
fn test_config_swap_only_affects_new_builds() {
    let registry = DescriptorRegistry::default();
    let before = registry.get_or_build::<Order>().expect("build");
    assert!(before.method_overloads("equals").is_empty());

    registry.set_config(RegistryConfig::new().exclude_object_methods(false));
    let cached = registry.get_or_build::<Order>().expect("hit");
    assert!(Arc::ptr_eq(&before, &cached));
    assert!(cached.method_overloads("equals").is_empty());

    registry.clear();
    let rebuilt = registry.get_or_build::<Order>().expect("rebuild");
    assert_eq!(rebuilt.method_overloads("equals").len(), 1);
}

#[test]
fn test_stats_snapshot() {
    let registry = DescriptorRegistry::new(RegistryConfig::default());
    assert_eq!(registry.stats(), RegistryStats::default());
    let _ = registry.get_or_build::<Order>().expect("build");
    let _ = registry.get_or_build::<Order>().expect("hit");
    let _ = registry.get_or_build::<Order>().expect("hit");
    let stats = registry.stats();
    assert_eq!((stats.builds, stats.hits, stats.misses), (1, 2, 1));
}
