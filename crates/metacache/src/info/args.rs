// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binding of boxed argument arrays to typed parameter tuples.

use crate::error::{MetaError, Result};
use crate::type_ident::TypeIdent;
use crate::value::Value;
use std::any::Any;

/// A parameter list: `()`, `(A,)`, `(A, B)` ... up to eight owned arguments.
///
/// Binding checks the argument count first, then coerces each argument to
/// its exact parameter type with [`Value::coerce`].
pub trait FromArgs: Sized + Send + Sync + 'static {
    /// Number of parameters.
    const ARITY: usize;

    /// Declared parameter types, in order.
    fn param_types() -> Vec<TypeIdent>;

    /// Bind `args` positionally. `member` names the callable in errors.
    fn from_args(member: &str, args: Vec<Value>) -> Result<Self>;
}

pub(crate) fn bind_one<A: Any + Send + Sync>(member: &str, index: usize, arg: Value) -> Result<A> {
    arg.coerce::<A>().map_err(|rejected| MetaError::ArgumentType {
        member: member.to_string(),
        index,
        expected: TypeIdent::of::<A>().name(),
        got: rejected.type_name(),
    })
}

fn check_arity(member: &str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(MetaError::ArgumentCount {
            member: member.to_string(),
            expected,
            got,
        })
    }
}

impl FromArgs for () {
    const ARITY: usize = 0;

    fn param_types() -> Vec<TypeIdent> {
        Vec::new()
    }

    fn from_args(member: &str, args: Vec<Value>) -> Result<Self> {
        check_arity(member, 0, args.len())
    }
}

macro_rules! impl_from_args {
    ($arity:expr; $($ty:ident => $idx:tt),+) => {
        impl<$($ty),+> FromArgs for ($($ty,)+)
        where
            $($ty: Any + Send + Sync),+
        {
            const ARITY: usize = $arity;

            fn param_types() -> Vec<TypeIdent> {
                vec![$(TypeIdent::of::<$ty>()),+]
            }

            fn from_args(member: &str, args: Vec<Value>) -> Result<Self> {
                check_arity(member, $arity, args.len())?;
                let mut args = args.into_iter();
                Ok(($(
                    bind_one::<$ty>(member, $idx, args.next().unwrap_or_default())?,
                )+))
            }
        }
    };
}

impl_from_args!(1; A => 0);
impl_from_args!(2; A => 0, B => 1);
impl_from_args!(3; A => 0, B => 1, C => 2);
impl_from_args!(4; A => 0, B => 1, C => 2, D => 3);
impl_from_args!(5; A => 0, B => 1, C => 2, D => 3, E => 4);
impl_from_args!(6; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);
impl_from_args!(7; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6);
impl_from_args!(8; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7);
