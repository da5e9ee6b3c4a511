// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # metacache - cached runtime type introspection
//!
//! Types publish their members once through [`Reflect`]. A
//! [`DescriptorRegistry`] turns that declaration into a [`TypeDescriptor`]:
//! name-keyed maps of field and property accessors, method overloads and
//! constructors, each holding a handle compiled on first use and reused
//! afterwards.
//!
//! ## Quick Start
//!
//! ```rust
//! use metacache::{args, DescriptorRegistry, Reflect, Result, TypeIdent, TypeInfoBuilder};
//!
//! #[derive(Default)]
//! struct User { name: String, age: u32 }
//!
//! impl Reflect for User {
//!     fn reflect(t: &mut TypeInfoBuilder<Self>) {
//!         t.constructor(|(): ()| User::default());
//!         t.constructor(|(name, age): (String, u32)| User { name, age });
//!         t.field("name", |u| &u.name, |u| &mut u.name);
//!         t.field("age", |u| &u.age, |u| &mut u.age);
//!         t.method("is_adult", |u: &User, (): ()| u.age >= 18);
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let registry = DescriptorRegistry::default();
//!     let desc = registry.get_or_build::<User>()?;
//!
//!     let ctor = desc
//!         .find_constructor(&[TypeIdent::of::<String>(), TypeIdent::of::<u32>()])
//!         .expect("declared");
//!     let mut user = ctor.construct(args!["ada".to_string(), 36u32])?;
//!
//!     let age = desc.field("age").expect("declared");
//!     age.set(&mut user, metacache::Value::new(37u8))?;
//!     assert_eq!(age.get_as::<u32>(&user)?, 37);
//!
//!     let adult = desc.method_overloads("is_adult")[0].invoke(Some(&mut user), args![])?;
//!     assert_eq!(adult.downcast_ref::<bool>(), Some(&true));
//!     Ok(())
//! }
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TypeKey`] | Ordered parameter-type signature for overload lookup |
//! | [`ReadWriteAccessor`] | Cached get/set for a field or property |
//! | [`MethodInvoker`] | Cached call handle for one method overload |
//! | [`ConstructorInvoker`] | Cached construction handle for one signature |
//! | [`TypeDescriptor`] | All members of one type |
//! | [`DescriptorRegistry`] | Per-type descriptor cache |
//!
//! ## Features
//!
//! - `chrono` (default): chrono date/time types classify as primitive-like
//! - `uuid` (default): `Uuid` classifies as primitive-like

pub mod annotations;
pub mod config;
pub mod error;
mod info;
pub mod meta;
pub mod registry;
pub mod type_ident;
pub mod type_key;
pub mod value;

pub use annotations::{Annotations, Attribute, RuleEntry, ValidationRule};
pub use config::RegistryConfig;
pub use error::{ErrorKind, MetaError, Result};
pub use info::{
    ConstructorInfo, FieldInfo, FromArgs, MemberInfo, MemberKind, MemberSink, MethodInfo,
    ParamInfo, PropertyInfo, Receiver, Reflect, TypeInfo, TypeInfoBuilder,
};
pub use meta::{
    ConstructorInvoker, Member, MemberDescriptor, MemberMeta, MethodInvoker, ReadWriteAccessor,
    TypeDescriptor,
};
pub use registry::{DescriptorRegistry, RegistryStats};
pub use type_ident::{Primitive, TypeIdent, ValueKind};
pub use type_key::TypeKey;
pub use value::Value;
