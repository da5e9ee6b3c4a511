// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry configuration.
//!
//! A [`RegistryConfig`] is a plain value with builder-style setters. The
//! registry holds it behind an `ArcSwap`, so replacing it never blocks
//! readers; descriptors already built keep the configuration they were
//! built with.
//!
//! ```rust
//! use metacache::{RegistryConfig, TypeIdent};
//!
//! #[derive(Clone, Copy, PartialEq)]
//! enum Level { Low, High }
//!
//! let config = RegistryConfig::new()
//!     .exclude_object_methods(false)
//!     .with_enum::<Level>();
//! assert!(config.classify(TypeIdent::of::<Level>()).is_some());
//! ```

use crate::type_ident::{builtin_primitive, register_primitive, Primitive, TypeIdent, ValueKind};
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Discovery and classification settings.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Skip the universal object methods (`to_string`, `hash_code`,
    /// `type_name`, `equals(Value)`) during method discovery.
    pub exclude_object_methods: bool,

    /// Skip `get_<P>` / `set_<P>` methods backing a discovered property.
    pub exclude_property_accessors: bool,

    /// Primitive-like types beyond the built-in table.
    extra_primitives: HashMap<TypeId, Primitive>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            exclude_object_methods: true,
            exclude_property_accessors: true,
            extra_primitives: HashMap::new(),
        }
    }
}

impl RegistryConfig {
    /// Create a config with defaults (both exclusions on).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set object-method exclusion.
    pub fn exclude_object_methods(mut self, exclude: bool) -> Self {
        self.exclude_object_methods = exclude;
        self
    }

    /// Set property-accessor exclusion.
    pub fn exclude_property_accessors(mut self, exclude: bool) -> Self {
        self.exclude_property_accessors = exclude;
        self
    }

    /// Treat the user enum `E` (and `Option<E>`) as primitive-like.
    pub fn with_enum<E: Any>(self) -> Self {
        self.with_primitive::<E>(ValueKind::Enum)
    }

    /// Classify `T` (and `Option<T>`) as `kind`.
    pub fn with_primitive<T: Any>(mut self, kind: ValueKind) -> Self {
        register_primitive::<T>(&mut self.extra_primitives, kind);
        self
    }

    /// Primitive-like classification of `ty`: built-in table first, then
    /// the registered extras.
    pub fn classify(&self, ty: TypeIdent) -> Option<Primitive> {
        builtin_primitive(ty.id()).or_else(|| self.extra_primitives.get(&ty.id()).copied())
    }
}
