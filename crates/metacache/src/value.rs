// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Boxed values passed through accessors and invokers.
//!
//! A [`Value`] is either the `Void` sentinel (what a unit-returning method
//! yields) or a boxed payload tagged with its [`TypeIdent`]. Coercion to a
//! declared type accepts exact matches and lossless widening between
//! primitive-like kinds, nothing else.

use crate::type_ident::{builtin_primitive, Primitive, TypeIdent, ValueKind};
use std::any::{Any, TypeId};
use std::fmt;
use std::time::{Duration, SystemTime};

type Payload = Box<dyn Any + Send + Sync>;

enum Repr {
    Void,
    Boxed { ty: TypeIdent, data: Payload },
}

/// A type-erased value.
pub struct Value(Repr);

impl Value {
    /// Box `value`. A `Value` is returned as is, never nested.
    #[inline]
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        let mut slot = Some(value);
        if let Some(inner) = (&mut slot as &mut dyn Any)
            .downcast_mut::<Option<Value>>()
            .and_then(Option::take)
        {
            return inner;
        }
        match slot {
            Some(value) => Self(Repr::Boxed {
                ty: TypeIdent::of::<T>(),
                data: Box::new(value),
            }),
            None => Self::void(),
        }
    }

    /// The "no value" sentinel.
    #[inline]
    pub const fn void() -> Self {
        Self(Repr::Void)
    }

    /// Whether this is the sentinel.
    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self.0, Repr::Void)
    }

    /// Type of the payload (`None` for the sentinel).
    #[inline]
    pub fn type_ident(&self) -> Option<TypeIdent> {
        match &self.0 {
            Repr::Void => None,
            Repr::Boxed { ty, .. } => Some(*ty),
        }
    }

    /// Payload type name, `"void"` for the sentinel.
    pub fn type_name(&self) -> &'static str {
        self.type_ident().map_or("void", |ty| ty.name())
    }

    /// Whether the payload is exactly a `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        matches!(&self.0, Repr::Boxed { data, .. } if data.is::<T>())
    }

    /// Borrow the payload as `T`.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match &self.0 {
            Repr::Void => None,
            Repr::Boxed { data, .. } => data.downcast_ref::<T>(),
        }
    }

    /// Mutably borrow the payload as `T`.
    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        match &mut self.0 {
            Repr::Void => None,
            Repr::Boxed { data, .. } => data.downcast_mut::<T>(),
        }
    }

    /// Take the payload as exactly `T`, or get the value back.
    pub fn downcast<T: Any>(self) -> Result<T, Value> {
        match self.0 {
            Repr::Void => Err(Self(Repr::Void)),
            Repr::Boxed { ty, data } => match data.downcast::<T>() {
                Ok(v) => Ok(*v),
                Err(data) => Err(Self(Repr::Boxed { ty, data })),
            },
        }
    }

    /// Payload as `&dyn Any`, for passing a boxed instance to an accessor.
    pub fn as_any(&self) -> Option<&(dyn Any + Send + Sync)> {
        match &self.0 {
            Repr::Void => None,
            Repr::Boxed { data, .. } => Some(data.as_ref()),
        }
    }

    /// Payload as `&mut dyn Any`.
    pub fn as_any_mut(&mut self) -> Option<&mut (dyn Any + Send + Sync)> {
        match &mut self.0 {
            Repr::Void => None,
            Repr::Boxed { data, .. } => Some(data.as_mut()),
        }
    }

    /// Convert to `T`, widening primitive-like values when no precision is lost.
    ///
    /// A target of `Value` receives `self` unchanged. `Void` converts to `()`
    /// and to `None` of a nullable primitive. On failure the value is
    /// returned untouched.
    pub fn coerce<T: Any + Send + Sync>(self) -> Result<T, Value> {
        let target = TypeId::of::<T>();
        if target == TypeId::of::<Value>() {
            let boxed: Box<dyn Any> = Box::new(self);
            return boxed.downcast::<T>().map(|v| *v).map_err(|b| {
                b.downcast::<Value>().map_or_else(|_| Value::void(), |v| *v)
            });
        }

        match self.0 {
            Repr::Void => {
                let produced = if target == TypeId::of::<()>() {
                    Some(Box::new(()) as Payload)
                } else {
                    null_of(target)
                };
                match produced.map(|b| b.downcast::<T>()) {
                    Some(Ok(v)) => Ok(*v),
                    _ => Err(Value::void()),
                }
            }
            Repr::Boxed { ty, data } => match data.downcast::<T>() {
                Ok(v) => Ok(*v),
                Err(data) => match widen(data, ty, target) {
                    Ok(widened) => widened.downcast::<T>().map(|v| *v).map_err(|data| {
                        Value(Repr::Boxed {
                            ty: TypeIdent::of::<T>(),
                            data,
                        })
                    }),
                    Err(data) => Err(Value(Repr::Boxed { ty, data })),
                },
            },
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::void()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Repr::Void => f.write_str("Void"),
            Repr::Boxed { ty, .. } => write!(f, "Value({})", ty.name()),
        }
    }
}

/// Build a `Vec<Value>` from expressions.
///
/// ```
/// let args = metacache::args![1i32, 2i64, String::from("x")];
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    () => { ::std::vec::Vec::<$crate::Value>::new() };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::new($arg)),+]
    };
}

// =======================================================================
// Widening
// =======================================================================

#[derive(Clone, Copy)]
enum Num {
    I(i128),
    U(u128),
    F(f64),
}

macro_rules! read_as {
    ($data:expr, $nullable:expr, $t:ty, $variant:ident, $wide:ty) => {
        if $nullable {
            $data
                .downcast_ref::<Option<$t>>()
                .map(|v| v.map(|x| Num::$variant(x as $wide)))
        } else {
            $data
                .downcast_ref::<$t>()
                .map(|x| Some(Num::$variant(*x as $wide)))
        }
    };
}

/// Outer `None`: not a numeric payload. Inner `None`: a null `Option`.
fn read_num(data: &(dyn Any + Send + Sync), p: Primitive) -> Option<Option<Num>> {
    let n = p.nullable;
    match p.kind {
        ValueKind::I8 => read_as!(data, n, i8, I, i128),
        ValueKind::I16 => read_as!(data, n, i16, I, i128),
        ValueKind::I32 => read_as!(data, n, i32, I, i128),
        ValueKind::I64 => read_as!(data, n, i64, I, i128),
        ValueKind::I128 => read_as!(data, n, i128, I, i128),
        ValueKind::Isize => read_as!(data, n, isize, I, i128),
        ValueKind::U8 => read_as!(data, n, u8, U, u128),
        ValueKind::U16 => read_as!(data, n, u16, U, u128),
        ValueKind::U32 => read_as!(data, n, u32, U, u128),
        ValueKind::U64 => read_as!(data, n, u64, U, u128),
        ValueKind::U128 => read_as!(data, n, u128, U, u128),
        ValueKind::Usize => read_as!(data, n, usize, U, u128),
        ValueKind::F32 => read_as!(data, n, f32, F, f64),
        ValueKind::F64 => read_as!(data, n, f64, F, f64),
        _ => None,
    }
}

macro_rules! write_as {
    ($num:expr, $nullable:expr, $t:ty) => {{
        let v: Option<$t> = $num.map(|n| match n {
            Num::I(x) => x as $t,
            Num::U(x) => x as $t,
            Num::F(x) => x as $t,
        });
        if $nullable {
            Some(Box::new(v) as Payload)
        } else {
            v.map(|x| Box::new(x) as Payload)
        }
    }};
}

fn write_num(num: Option<Num>, p: Primitive) -> Option<Payload> {
    let n = p.nullable;
    match p.kind {
        ValueKind::I8 => write_as!(num, n, i8),
        ValueKind::I16 => write_as!(num, n, i16),
        ValueKind::I32 => write_as!(num, n, i32),
        ValueKind::I64 => write_as!(num, n, i64),
        ValueKind::I128 => write_as!(num, n, i128),
        ValueKind::Isize => write_as!(num, n, isize),
        ValueKind::U8 => write_as!(num, n, u8),
        ValueKind::U16 => write_as!(num, n, u16),
        ValueKind::U32 => write_as!(num, n, u32),
        ValueKind::U64 => write_as!(num, n, u64),
        ValueKind::U128 => write_as!(num, n, u128),
        ValueKind::Usize => write_as!(num, n, usize),
        ValueKind::F32 => write_as!(num, n, f32),
        ValueKind::F64 => write_as!(num, n, f64),
        _ => None,
    }
}

macro_rules! try_wrap_some {
    ($data:ident, $target:expr, $($t:ty),+ $(,)?) => {
        $(
            if $target == TypeId::of::<Option<$t>>() && $data.is::<$t>() {
                return match $data.downcast::<$t>() {
                    Ok(v) => Ok(Box::new(Some(*v))),
                    Err(data) => Err(data),
                };
            }
        )+
    };
}

/// Wrap a non-numeric primitive into its `Option<_>`.
fn wrap_some(data: Payload, target: TypeId) -> Result<Payload, Payload> {
    try_wrap_some!(data, target, bool, char, String, SystemTime, Duration);
    #[cfg(feature = "uuid")]
    try_wrap_some!(data, target, uuid::Uuid);
    #[cfg(feature = "chrono")]
    try_wrap_some!(
        data,
        target,
        chrono::DateTime<chrono::Utc>,
        chrono::DateTime<chrono::Local>,
        chrono::DateTime<chrono::FixedOffset>,
        chrono::NaiveDate,
        chrono::NaiveDateTime,
        chrono::NaiveTime,
    );
    Err(data)
}

macro_rules! try_none {
    ($target:expr, $($t:ty),+ $(,)?) => {
        $(
            if $target == TypeId::of::<Option<$t>>() {
                return Some(Box::new(None::<$t>) as Payload);
            }
        )+
    };
}

/// `None` of the nullable primitive `target`. Matched by exact type since
/// several chrono types share a kind.
fn null_of(target: TypeId) -> Option<Payload> {
    try_none!(
        target, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
        bool, char, String, SystemTime, Duration,
    );
    #[cfg(feature = "uuid")]
    try_none!(target, uuid::Uuid);
    #[cfg(feature = "chrono")]
    try_none!(
        target,
        chrono::DateTime<chrono::Utc>,
        chrono::DateTime<chrono::Local>,
        chrono::DateTime<chrono::FixedOffset>,
        chrono::NaiveDate,
        chrono::NaiveDateTime,
        chrono::NaiveTime,
    );
    None
}

fn widen(data: Payload, from: TypeIdent, target: TypeId) -> Result<Payload, Payload> {
    let (Some(src), Some(dst)) = (builtin_primitive(from.id()), builtin_primitive(target)) else {
        return Err(data);
    };
    if !src.coerces_to(dst) {
        return Err(data);
    }
    if src.kind.bits().is_some() && dst.kind.bits().is_some() {
        let Some(num) = read_num(data.as_ref(), src) else {
            return Err(data);
        };
        return write_num(num, dst).ok_or(data);
    }
    wrap_some(data, target)
}
