// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type identities and the primitive-like classification table.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;
use std::time::{Duration, SystemTime};

/// Identity of a Rust type: its `TypeId` plus a readable name.
///
/// Equality and hashing only look at the `TypeId`.
#[derive(Clone, Copy)]
pub struct TypeIdent {
    id: TypeId,
    name: &'static str,
}

impl TypeIdent {
    /// Identity of `T`.
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Identity of `()`, the value type of constructors and unit methods.
    #[inline]
    #[must_use]
    pub fn void() -> Self {
        Self::of::<()>()
    }

    /// Underlying `TypeId`.
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Full Rust type name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this is `()`.
    #[inline]
    pub fn is_void(&self) -> bool {
        self.id == TypeId::of::<()>()
    }
}

impl PartialEq for TypeIdent {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeIdent {}

impl PartialEq<TypeId> for TypeIdent {
    #[inline]
    fn eq(&self, other: &TypeId) -> bool {
        self.id == *other
    }
}

impl Hash for TypeIdent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeIdent({})", self.name)
    }
}

impl fmt::Display for TypeIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Primitive-like value kinds.
///
/// These are the types that take part in value coercion without nested
/// object construction. `Enum` covers user types registered through
/// [`RegistryConfig`](crate::RegistryConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    String,
    SystemTime,
    Duration,
    #[cfg(feature = "uuid")]
    Uuid,
    #[cfg(feature = "chrono")]
    DateTime,
    #[cfg(feature = "chrono")]
    NaiveDate,
    #[cfg(feature = "chrono")]
    NaiveDateTime,
    #[cfg(feature = "chrono")]
    NaiveTime,
    Enum,
}

impl ValueKind {
    /// Whether this kind is an integer.
    pub fn is_integer(self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    /// Whether this kind is a signed integer.
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::I128 | Self::Isize
        )
    }

    /// Whether this kind is an unsigned integer.
    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            Self::U8 | Self::U16 | Self::U32 | Self::U64 | Self::U128 | Self::Usize
        )
    }

    /// Whether this kind is a float.
    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Width in bits of a numeric kind (`usize`/`isize` use the target width).
    pub fn bits(self) -> Option<u32> {
        match self {
            Self::I8 | Self::U8 => Some(8),
            Self::I16 | Self::U16 => Some(16),
            Self::I32 | Self::U32 | Self::F32 => Some(32),
            Self::I64 | Self::U64 | Self::F64 => Some(64),
            Self::I128 | Self::U128 => Some(128),
            Self::Isize | Self::Usize => Some(usize::BITS),
            _ => None,
        }
    }

    /// Whether every value of `self` is exactly representable as `to`.
    pub fn widens_to(self, to: ValueKind) -> bool {
        if self == to {
            return true;
        }
        let (Some(from_bits), Some(to_bits)) = (self.bits(), to.bits()) else {
            return false;
        };
        match (self, to) {
            (Self::F32, Self::F64) => true,
            (f, _) if f.is_float() => false,
            // Exact when the float mantissa holds every source value.
            (_, Self::F32) => from_bits <= 16,
            (_, Self::F64) => from_bits <= 32,
            (f, t) if f.is_signed() && t.is_signed() => from_bits <= to_bits,
            (f, t) if f.is_unsigned() && t.is_unsigned() => from_bits <= to_bits,
            (f, t) if f.is_unsigned() && t.is_signed() => from_bits < to_bits,
            _ => false,
        }
    }
}

/// Classification of a primitive-like type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Primitive {
    /// Underlying kind.
    pub kind: ValueKind,
    /// Whether the type is the `Option<_>` wrapper of the kind.
    pub nullable: bool,
}

impl Primitive {
    /// Whether a value of `self` can be coerced to `to` without loss.
    pub fn coerces_to(self, to: Primitive) -> bool {
        if self.nullable && !to.nullable {
            return false;
        }
        if self.kind == ValueKind::Enum || to.kind == ValueKind::Enum {
            return false;
        }
        self.kind.widens_to(to.kind)
    }
}

fn insert<T: Any>(table: &mut HashMap<TypeId, Primitive>, kind: ValueKind) {
    table.insert(
        TypeId::of::<T>(),
        Primitive {
            kind,
            nullable: false,
        },
    );
    table.insert(
        TypeId::of::<Option<T>>(),
        Primitive {
            kind,
            nullable: true,
        },
    );
}

fn builtin_table() -> &'static HashMap<TypeId, Primitive> {
    static TABLE: OnceLock<HashMap<TypeId, Primitive>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = HashMap::new();
        insert::<bool>(&mut table, ValueKind::Bool);
        insert::<char>(&mut table, ValueKind::Char);
        insert::<i8>(&mut table, ValueKind::I8);
        insert::<i16>(&mut table, ValueKind::I16);
        insert::<i32>(&mut table, ValueKind::I32);
        insert::<i64>(&mut table, ValueKind::I64);
        insert::<i128>(&mut table, ValueKind::I128);
        insert::<isize>(&mut table, ValueKind::Isize);
        insert::<u8>(&mut table, ValueKind::U8);
        insert::<u16>(&mut table, ValueKind::U16);
        insert::<u32>(&mut table, ValueKind::U32);
        insert::<u64>(&mut table, ValueKind::U64);
        insert::<u128>(&mut table, ValueKind::U128);
        insert::<usize>(&mut table, ValueKind::Usize);
        insert::<f32>(&mut table, ValueKind::F32);
        insert::<f64>(&mut table, ValueKind::F64);
        insert::<String>(&mut table, ValueKind::String);
        insert::<SystemTime>(&mut table, ValueKind::SystemTime);
        insert::<Duration>(&mut table, ValueKind::Duration);
        #[cfg(feature = "uuid")]
        insert::<uuid::Uuid>(&mut table, ValueKind::Uuid);
        #[cfg(feature = "chrono")]
        {
            insert::<chrono::DateTime<chrono::Utc>>(&mut table, ValueKind::DateTime);
            insert::<chrono::DateTime<chrono::Local>>(&mut table, ValueKind::DateTime);
            insert::<chrono::DateTime<chrono::FixedOffset>>(&mut table, ValueKind::DateTime);
            insert::<chrono::NaiveDate>(&mut table, ValueKind::NaiveDate);
            insert::<chrono::NaiveDateTime>(&mut table, ValueKind::NaiveDateTime);
            insert::<chrono::NaiveTime>(&mut table, ValueKind::NaiveTime);
        }
        table
    })
}

/// Classify `id` against the built-in table.
pub fn builtin_primitive(id: TypeId) -> Option<Primitive> {
    builtin_table().get(&id).copied()
}

/// Register `T` and `Option<T>` under `kind` in a caller-owned table.
pub(crate) fn register_primitive<T: Any>(table: &mut HashMap<TypeId, Primitive>, kind: ValueKind) {
    insert::<T>(table, kind);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ident_equality() {
        assert_eq!(TypeIdent::of::<i32>(), TypeIdent::of::<i32>());
        assert_ne!(TypeIdent::of::<i32>(), TypeIdent::of::<i64>());
        assert!(TypeIdent::void().is_void());
        assert!(TypeIdent::of::<String>().name().ends_with("String"));
    }

    #[test]
    fn test_builtin_classification() {
        let p = builtin_primitive(TypeId::of::<u16>()).expect("u16");
        assert_eq!(p.kind, ValueKind::U16);
        assert!(!p.nullable);

        let p = builtin_primitive(TypeId::of::<Option<String>>()).expect("Option<String>");
        assert_eq!(p.kind, ValueKind::String);
        assert!(p.nullable);

        assert!(builtin_primitive(TypeId::of::<Vec<u8>>()).is_none());
    }

    #[test]
    fn test_widening_rules() {
        assert!(ValueKind::I32.widens_to(ValueKind::I64));
        assert!(ValueKind::U8.widens_to(ValueKind::I16));
        assert!(!ValueKind::U16.widens_to(ValueKind::I16));
        assert!(!ValueKind::I64.widens_to(ValueKind::I32));
        assert!(!ValueKind::I8.widens_to(ValueKind::U64));
        assert!(ValueKind::I32.widens_to(ValueKind::F64));
        assert!(!ValueKind::I64.widens_to(ValueKind::F64));
        assert!(!ValueKind::I32.widens_to(ValueKind::F32));
        assert!(ValueKind::F32.widens_to(ValueKind::F64));
        assert!(!ValueKind::F64.widens_to(ValueKind::F32));
        assert!(!ValueKind::String.widens_to(ValueKind::I32));
    }

    #[test]
    fn test_nullable_coercion() {
        let i32_p = Primitive {
            kind: ValueKind::I32,
            nullable: false,
        };
        let opt_i64 = Primitive {
            kind: ValueKind::I64,
            nullable: true,
        };
        assert!(i32_p.coerces_to(opt_i64));
        assert!(!opt_i64.coerces_to(Primitive {
            kind: ValueKind::I64,
            nullable: false,
        }));
    }
}
