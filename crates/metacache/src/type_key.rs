// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Ordered argument-type signatures used to tell overloads apart.

use crate::info::FromArgs;
use crate::type_ident::TypeIdent;
use crate::value::Value;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

const SEED: u64 = 32;
const NULL_MIX: u64 = 12;
const MUL_EVEN: u64 = 115;
const MUL_ODD: u64 = 58;

/// Position-sensitive signature of argument types.
///
/// `None` stands for an untyped (null) argument and only equals another
/// `None` at the same position. The hash alternates multipliers per
/// position so permuted signatures such as `(i32, i64)` and `(i64, i32)`
/// land in different buckets.
#[derive(Clone)]
pub struct TypeKey {
    types: Box<[Option<TypeIdent>]>,
    hash: u64,
}

impl TypeKey {
    /// Key over `types`, in order.
    pub fn new(types: Vec<Option<TypeIdent>>) -> Self {
        let hash = combine(&types);
        Self {
            types: types.into_boxed_slice(),
            hash,
        }
    }

    /// The empty signature (zero-argument callables).
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Signature of an argument tuple type, e.g. `TypeKey::of::<(i32, String)>()`.
    pub fn of<A: FromArgs>() -> Self {
        Self::from(A::param_types().as_slice())
    }

    /// Signature of concrete argument values; `Void` maps to `None`.
    pub fn of_values(values: &[Value]) -> Self {
        Self::new(values.iter().map(Value::type_ident).collect())
    }

    /// Types in order.
    #[inline]
    pub fn types(&self) -> &[Option<TypeIdent>] {
        &self.types
    }

    /// Number of positions.
    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether this is the empty signature.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn ident_hash(ty: &TypeIdent) -> u64 {
    let mut hasher = DefaultHasher::new();
    ty.hash(&mut hasher);
    hasher.finish()
}

fn combine(types: &[Option<TypeIdent>]) -> u64 {
    let mut code = SEED;
    let mut odd = false;
    for ty in types {
        match ty {
            None => code ^= NULL_MIX,
            Some(ty) => {
                let mul = if odd { MUL_ODD } else { MUL_EVEN };
                code = code.wrapping_mul(mul).wrapping_add(ident_hash(ty));
                odd = !odd;
            }
        }
    }
    code
}

impl From<&[TypeIdent]> for TypeKey {
    fn from(types: &[TypeIdent]) -> Self {
        Self::new(types.iter().copied().map(Some).collect())
    }
}

impl From<Vec<TypeIdent>> for TypeKey {
    fn from(types: Vec<TypeIdent>) -> Self {
        Self::from(types.as_slice())
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.types == other.types
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey{self}")
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, ty) in self.types.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match ty {
                Some(ty) => f.write_str(ty.name())?,
                None => f.write_str("_")?,
            }
        }
        f.write_str(")")
    }
}
