// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-type descriptor: the built, immutable member maps of one type.
//!
//! Building walks the declaration exactly once, in a fixed order:
//! attributes, constructors, fields, properties, then methods. Methods come
//! last because property-accessor exclusion needs the property map.

use super::accessor::ReadWriteAccessor;
use super::constructor::ConstructorInvoker;
use super::member::MemberDescriptor;
use super::method::MethodInvoker;
use crate::annotations::{Annotations, Attribute};
use crate::config::RegistryConfig;
use crate::error::{MetaError, Result};
use crate::info::{MemberInfo, MemberKind, MethodInfo, TypeInfo};
use crate::type_ident::TypeIdent;
use crate::type_key::TypeKey;
use crate::value::Value;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Any kept member, in discovery order.
#[derive(Clone)]
pub enum Member {
    Field(Arc<ReadWriteAccessor>),
    Property(Arc<ReadWriteAccessor>),
    Method(Arc<MethodInvoker>),
    Constructor(Arc<ConstructorInvoker>),
}

impl Member {
    /// The member as its shared descriptor contract.
    pub fn descriptor(&self) -> &dyn MemberDescriptor {
        match self {
            Self::Field(a) | Self::Property(a) => a.as_ref() as &dyn MemberDescriptor,
            Self::Method(m) => m.as_ref(),
            Self::Constructor(c) => c.as_ref(),
        }
    }

    pub fn name(&self) -> &str {
        self.descriptor().name()
    }

    pub fn kind(&self) -> MemberKind {
        self.descriptor().kind()
    }

    fn same_as(&self, other: &Member) -> bool {
        match (self, other) {
            (Self::Field(a), Self::Field(b)) | (Self::Property(a), Self::Property(b)) => {
                Arc::ptr_eq(a, b)
            }
            (Self::Method(a), Self::Method(b)) => Arc::ptr_eq(a, b),
            (Self::Constructor(a), Self::Constructor(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.kind(), self.name())
    }
}

/// Introspected members of one type, with cached handles.
pub struct TypeDescriptor {
    ty: TypeIdent,
    name: String,
    attributes: Vec<Attribute>,
    annotations: Annotations,
    fields: HashMap<String, Arc<ReadWriteAccessor>>,
    properties: HashMap<String, Arc<ReadWriteAccessor>>,
    methods: HashMap<String, Vec<Arc<MethodInvoker>>>,
    constructors: HashMap<TypeKey, Arc<ConstructorInvoker>>,
    default_constructor: Option<Arc<ConstructorInvoker>>,
    members: Vec<Member>,
}

/// Replace `old` in discovery order with `new`, or append.
fn record(members: &mut Vec<Member>, old: Option<Member>, new: Member) {
    match old.and_then(|old| members.iter().position(|m| m.same_as(&old))) {
        Some(idx) => members[idx] = new,
        None => members.push(new),
    }
}

fn is_object_method(info: &MethodInfo) -> bool {
    match (info.name(), info.params()) {
        ("to_string" | "hash_code" | "type_name", []) => true,
        ("equals", [param]) => param.ty == TypeIdent::of::<Value>(),
        _ => false,
    }
}

fn is_property_accessor(
    info: &MethodInfo,
    properties: &HashMap<String, Arc<ReadWriteAccessor>>,
) -> bool {
    let name = info.name();
    if name.len() <= 4 {
        return false;
    }
    name.strip_prefix("get_")
        .or_else(|| name.strip_prefix("set_"))
        .is_some_and(|prop| properties.contains_key(prop))
}

impl TypeDescriptor {
    /// Build a descriptor from a declaration.
    ///
    /// Fails with `InvalidArgument` on an invalid declaration; nothing is
    /// returned half-built.
    pub fn build(info: &TypeInfo, config: &RegistryConfig) -> Result<Self> {
        info.validate()?;
        let owner = info.type_ident();
        log::debug!("[descriptor] building `{}` ({})", info.name(), owner);

        let mut desc = Self {
            ty: owner,
            name: info.name().to_string(),
            attributes: info.attributes().to_vec(),
            annotations: Annotations::from_attributes(info.attributes()),
            fields: HashMap::new(),
            properties: HashMap::new(),
            methods: HashMap::new(),
            constructors: HashMap::new(),
            default_constructor: None,
            members: Vec::new(),
        };

        for member in info.members() {
            if let MemberInfo::Constructor(c) = member {
                let ctor = Arc::new(ConstructorInvoker::new(owner, c, config)?);
                desc.add_constructor(ctor);
            }
        }
        for member in info.members() {
            if let MemberInfo::Field(f) = member {
                let acc = Arc::new(ReadWriteAccessor::for_field(owner, f, config)?);
                let old = desc.fields.insert(f.name().to_string(), Arc::clone(&acc));
                desc.warn_duplicate("field", f.name(), old.is_some());
                record(&mut desc.members, old.map(Member::Field), Member::Field(acc));
            }
        }
        for member in info.members() {
            if let MemberInfo::Property(p) = member {
                let acc = Arc::new(ReadWriteAccessor::for_property(owner, p, config)?);
                let old = desc.properties.insert(p.name().to_string(), Arc::clone(&acc));
                desc.warn_duplicate("property", p.name(), old.is_some());
                record(&mut desc.members, old.map(Member::Property), Member::Property(acc));
            }
        }
        for member in info.members() {
            if let MemberInfo::Method(m) = member {
                if config.exclude_property_accessors && is_property_accessor(m, &desc.properties) {
                    continue;
                }
                if config.exclude_object_methods && is_object_method(m) {
                    continue;
                }
                let invoker = Arc::new(MethodInvoker::new(owner, m, config)?);
                desc.add_method(invoker);
            }
        }

        log::debug!(
            "[descriptor] built `{}`: {} constructors, {} fields, {} properties, {} method names",
            desc.name,
            desc.constructors.len(),
            desc.fields.len(),
            desc.properties.len(),
            desc.methods.len()
        );
        Ok(desc)
    }

    fn warn_duplicate(&self, what: &str, name: &str, duplicate: bool) {
        if duplicate {
            log::warn!(
                "[descriptor] `{}` declares {} `{}` twice, keeping the last",
                self.name,
                what,
                name
            );
        }
    }

    fn add_constructor(&mut self, ctor: Arc<ConstructorInvoker>) {
        let key = ctor.type_key().clone();
        let old = self.constructors.insert(key.clone(), Arc::clone(&ctor));
        self.warn_duplicate("constructor", &key.to_string(), old.is_some());
        if ctor.is_default() {
            self.default_constructor = Some(Arc::clone(&ctor));
        }
        record(
            &mut self.members,
            old.map(Member::Constructor),
            Member::Constructor(ctor),
        );
    }

    fn add_method(&mut self, invoker: Arc<MethodInvoker>) {
        let overloads = self.methods.entry(invoker.name().to_string()).or_default();
        let old = overloads
            .iter()
            .position(|m| m.type_key() == invoker.type_key())
            .map(|idx| std::mem::replace(&mut overloads[idx], Arc::clone(&invoker)));
        if old.is_none() {
            overloads.push(Arc::clone(&invoker));
        }
        let label = format!("{}{}", invoker.name(), invoker.type_key());
        self.warn_duplicate("method", &label, old.is_some());
        record(&mut self.members, old.map(Member::Method), Member::Method(invoker));
    }

    pub fn type_ident(&self) -> TypeIdent {
        self.ty
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes declared on the type.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Type-level annotations (computed at build time).
    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn fields(&self) -> &HashMap<String, Arc<ReadWriteAccessor>> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Arc<ReadWriteAccessor>> {
        self.fields.get(name)
    }

    pub fn properties(&self) -> &HashMap<String, Arc<ReadWriteAccessor>> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Arc<ReadWriteAccessor>> {
        self.properties.get(name)
    }

    /// Methods by name; each list keeps declaration order.
    pub fn methods(&self) -> &HashMap<String, Vec<Arc<MethodInvoker>>> {
        &self.methods
    }

    /// All overloads named `name` (empty when none).
    pub fn method_overloads(&self, name: &str) -> &[Arc<MethodInvoker>] {
        self.methods
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Overload of `name` whose parameter types are exactly `params`.
    pub fn find_method(&self, name: &str, params: &[TypeIdent]) -> Option<&Arc<MethodInvoker>> {
        self.find_method_by_key(name, &TypeKey::from(params))
    }

    pub fn find_method_by_key(&self, name: &str, key: &TypeKey) -> Option<&Arc<MethodInvoker>> {
        self.method_overloads(name)
            .iter()
            .find(|m| m.type_key() == key)
    }

    pub fn constructors(&self) -> &HashMap<TypeKey, Arc<ConstructorInvoker>> {
        &self.constructors
    }

    /// Constructor whose parameter types are exactly `params`, in order.
    /// No widening is applied at lookup.
    pub fn find_constructor(&self, params: &[TypeIdent]) -> Option<&Arc<ConstructorInvoker>> {
        self.find_constructor_by_key(&TypeKey::from(params))
    }

    pub fn find_constructor_by_key(&self, key: &TypeKey) -> Option<&Arc<ConstructorInvoker>> {
        self.constructors.get(key)
    }

    pub fn default_constructor(&self) -> Option<&Arc<ConstructorInvoker>> {
        self.default_constructor.as_ref()
    }

    /// Construct with the zero-argument constructor.
    pub fn create_default(&self) -> Result<Value> {
        match &self.default_constructor {
            Some(ctor) => ctor.construct_default(),
            None => Err(MetaError::MissingConstructor {
                type_name: self.name.clone(),
            }),
        }
    }

    /// Typed [`create_default`](Self::create_default).
    pub fn create_default_as<T: Any>(&self) -> Result<T> {
        match &self.default_constructor {
            Some(ctor) => ctor.construct_as(Vec::new()),
            None => Err(MetaError::MissingConstructor {
                type_name: self.name.clone(),
            }),
        }
    }

    /// Every kept member in discovery order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type", &self.ty)
            .field("name", &self.name)
            .field("members", &self.members)
            .finish()
    }
}
