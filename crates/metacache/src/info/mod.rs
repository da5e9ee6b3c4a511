// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Raw type declarations.
//!
//! A type publishes its members once through [`Reflect`]. The resulting
//! [`TypeInfo`] is the slow, general description of the type: every member
//! carries an erased *compiler* that, when called, produces the fast handle
//! the descriptors cache.
//!
//! # Example
//!
//! ```rust
//! use metacache::{Reflect, TypeInfo, TypeInfoBuilder};
//!
//! #[derive(Default)]
//! struct Point { x: i32, y: i32 }
//!
//! impl Reflect for Point {
//!     fn reflect(t: &mut TypeInfoBuilder<Self>) {
//!         t.constructor(|(): ()| Point::default());
//!         t.field("x", |p| &p.x, |p| &mut p.x);
//!         t.field("y", |p| &p.y, |p| &mut p.y);
//!         t.method("len2", |p: &Point, (): ()| p.x * p.x + p.y * p.y);
//!     }
//! }
//!
//! let info = TypeInfo::of::<Point>();
//! assert_eq!(info.name(), "Point");
//! ```

mod args;
mod builder;

pub use args::FromArgs;
pub use builder::{MemberSink, TypeInfoBuilder};

use crate::annotations::Attribute;
use crate::error::{MetaError, Result};
use crate::type_ident::TypeIdent;
use crate::value::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

pub(crate) type GetHandle = Box<dyn Fn(&dyn Any) -> Result<Value> + Send + Sync>;
pub(crate) type SetHandle = Box<dyn Fn(&mut dyn Any, Value) -> Result<()> + Send + Sync>;
pub(crate) type InvokeHandle =
    Box<dyn Fn(Option<&mut dyn Any>, Vec<Value>) -> Result<Value> + Send + Sync>;
pub(crate) type ConstructHandle = Box<dyn Fn(Vec<Value>) -> Result<Value> + Send + Sync>;

/// Erased factory producing a compiled handle.
pub(crate) type Compiler<H> = Arc<dyn Fn() -> H + Send + Sync>;

/// A type that publishes its members.
pub trait Reflect: Any + Send + Sync + Sized {
    /// Declare members on `t`.
    fn reflect(t: &mut TypeInfoBuilder<Self>);
}

/// How a method receives its instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// No instance (associated function).
    Static,
    /// `&self`.
    Ref,
    /// `&mut self`.
    Mut,
}

/// Member kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Property,
    Method,
    Constructor,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Field => "field",
            Self::Property => "property",
            Self::Method => "method",
            Self::Constructor => "constructor",
        };
        f.write_str(s)
    }
}

/// Declared parameter of a method or constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    /// Parameter name, when declared.
    pub name: Option<String>,
    /// Parameter type.
    pub ty: TypeIdent,
    /// Zero-based position.
    pub position: usize,
}

impl ParamInfo {
    pub(crate) fn list(types: Vec<TypeIdent>) -> Vec<ParamInfo> {
        types
            .into_iter()
            .enumerate()
            .map(|(position, ty)| ParamInfo {
                name: None,
                ty,
                position,
            })
            .collect()
    }
}

/// Raw field declaration.
#[derive(Clone)]
pub struct FieldInfo {
    pub(crate) declaring: TypeIdent,
    pub(crate) name: String,
    pub(crate) value_type: TypeIdent,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) compile_get: Compiler<GetHandle>,
    /// `None` for read-only fields.
    pub(crate) compile_set: Option<Compiler<SetHandle>>,
}

impl FieldInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaring_type(&self) -> TypeIdent {
        self.declaring
    }

    pub fn value_type(&self) -> TypeIdent {
        self.value_type
    }

    pub fn is_readonly(&self) -> bool {
        self.compile_set.is_none()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

/// Raw property declaration.
#[derive(Clone)]
pub struct PropertyInfo {
    pub(crate) declaring: TypeIdent,
    pub(crate) name: String,
    pub(crate) value_type: TypeIdent,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) compile_get: Option<Compiler<GetHandle>>,
    pub(crate) compile_set: Option<Compiler<SetHandle>>,
}

impl PropertyInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaring_type(&self) -> TypeIdent {
        self.declaring
    }

    pub fn value_type(&self) -> TypeIdent {
        self.value_type
    }

    pub fn can_read(&self) -> bool {
        self.compile_get.is_some()
    }

    pub fn can_write(&self) -> bool {
        self.compile_set.is_some()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

/// Raw method declaration.
#[derive(Clone)]
pub struct MethodInfo {
    pub(crate) declaring: TypeIdent,
    pub(crate) name: String,
    pub(crate) return_type: TypeIdent,
    pub(crate) params: Vec<ParamInfo>,
    pub(crate) receiver: Receiver,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) compile: Compiler<InvokeHandle>,
}

impl MethodInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaring_type(&self) -> TypeIdent {
        self.declaring
    }

    /// Return type (`()` for unit methods).
    pub fn return_type(&self) -> TypeIdent {
        self.return_type
    }

    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    pub fn receiver(&self) -> Receiver {
        self.receiver
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

/// Raw constructor declaration.
#[derive(Clone)]
pub struct ConstructorInfo {
    pub(crate) declaring: TypeIdent,
    pub(crate) params: Vec<ParamInfo>,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) compile: Compiler<ConstructHandle>,
}

impl ConstructorInfo {
    /// Constructors are all named `new`.
    pub const NAME: &'static str = "new";

    pub fn declaring_type(&self) -> TypeIdent {
        self.declaring
    }

    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

/// One declared member.
#[derive(Clone)]
pub enum MemberInfo {
    Field(FieldInfo),
    Property(PropertyInfo),
    Method(MethodInfo),
    Constructor(ConstructorInfo),
}

impl MemberInfo {
    pub fn name(&self) -> &str {
        match self {
            Self::Field(f) => &f.name,
            Self::Property(p) => &p.name,
            Self::Method(m) => &m.name,
            Self::Constructor(_) => ConstructorInfo::NAME,
        }
    }

    pub fn kind(&self) -> MemberKind {
        match self {
            Self::Field(_) => MemberKind::Field,
            Self::Property(_) => MemberKind::Property,
            Self::Method(_) => MemberKind::Method,
            Self::Constructor(_) => MemberKind::Constructor,
        }
    }

    pub fn declaring_type(&self) -> TypeIdent {
        match self {
            Self::Field(f) => f.declaring,
            Self::Property(p) => p.declaring,
            Self::Method(m) => m.declaring,
            Self::Constructor(c) => c.declaring,
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        match self {
            Self::Field(f) => &f.attributes,
            Self::Property(p) => &p.attributes,
            Self::Method(m) => &m.attributes,
            Self::Constructor(c) => &c.attributes,
        }
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
        match self {
            Self::Field(f) => &mut f.attributes,
            Self::Property(p) => &mut p.attributes,
            Self::Method(m) => &mut m.attributes,
            Self::Constructor(c) => &mut c.attributes,
        }
    }

    pub(crate) fn params_mut(&mut self) -> Option<&mut Vec<ParamInfo>> {
        match self {
            Self::Method(m) => Some(&mut m.params),
            Self::Constructor(c) => Some(&mut c.params),
            _ => None,
        }
    }
}

impl fmt::Debug for MemberInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberInfo")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .field("declaring", &self.declaring_type())
            .finish_non_exhaustive()
    }
}

/// Full declaration of one type.
#[derive(Clone, Debug)]
pub struct TypeInfo {
    pub(crate) ty: TypeIdent,
    pub(crate) name: String,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) members: Vec<MemberInfo>,
}

impl TypeInfo {
    /// Run `T`'s declaration.
    pub fn of<T: Reflect>() -> Arc<TypeInfo> {
        let mut builder = TypeInfoBuilder::<T>::new();
        T::reflect(&mut builder);
        Arc::new(builder.finish())
    }

    pub fn type_ident(&self) -> TypeIdent {
        self.ty
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Members in declaration order.
    pub fn members(&self) -> &[MemberInfo] {
        &self.members
    }

    /// Reject declarations no descriptor can be built from.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(MetaError::invalid(format!(
                "type `{}` has an empty name",
                self.ty.name()
            )));
        }
        for member in &self.members {
            check_member(self.ty, member.name(), member.declaring_type())?;
        }
        Ok(())
    }
}

/// Shared validity check for member declarations.
pub(crate) fn check_member(owner: TypeIdent, name: &str, declaring: TypeIdent) -> Result<()> {
    if name.trim().is_empty() {
        return Err(MetaError::invalid(format!(
            "member of `{}` has an empty name",
            owner.name()
        )));
    }
    if declaring != owner {
        return Err(MetaError::invalid(format!(
            "member `{name}` is declared on `{}`, not `{}`",
            declaring.name(),
            owner.name()
        )));
    }
    Ok(())
}

/// Short display name of a Rust type: path and generic arguments stripped.
pub(crate) fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Resolve an instance passed either directly or boxed in a [`Value`].
pub(crate) fn instance_ref<T: Any>(inst: &dyn Any) -> Option<&T> {
    inst.downcast_ref::<T>()
        .or_else(|| inst.downcast_ref::<Value>().and_then(Value::downcast_ref::<T>))
}

pub(crate) fn instance_mut<T: Any>(inst: &mut dyn Any) -> Option<&mut T> {
    if inst.is::<T>() {
        return inst.downcast_mut::<T>();
    }
    inst.downcast_mut::<Value>().and_then(Value::downcast_mut::<T>)
}
