// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent declaration of a type's members.

use super::{
    instance_mut, instance_ref, short_type_name, Compiler, ConstructHandle, ConstructorInfo,
    FieldInfo, FromArgs, GetHandle, InvokeHandle, MemberInfo, MethodInfo, ParamInfo,
    PropertyInfo, Receiver, SetHandle, TypeInfo,
};
use crate::annotations::{Attribute, ValidationRule};
use crate::error::{MetaError, Result};
use crate::type_ident::TypeIdent;
use crate::value::Value;
use std::any::{Any, TypeId};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

/// Collects the declaration of `T`. Handed to [`Reflect::reflect`](super::Reflect::reflect).
pub struct TypeInfoBuilder<T> {
    name: String,
    attributes: Vec<Attribute>,
    members: Vec<MemberInfo>,
    _marker: PhantomData<fn() -> T>,
}

/// Attribute sink for the member just declared.
pub struct MemberSink<'a> {
    member: &'a mut MemberInfo,
}

impl MemberSink<'_> {
    pub fn annotate(self, attr: Attribute) -> Self {
        self.member.attributes_mut().push(attr);
        self
    }

    pub fn display_name(self, name: impl Into<String>) -> Self {
        self.annotate(Attribute::display(name))
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        self.annotate(Attribute::Description(description.into()))
    }

    pub fn rule(self, rule: ValidationRule) -> Self {
        self.annotate(Attribute::rule(rule))
    }

    pub fn rule_with_message(self, rule: ValidationRule, message: impl Into<String>) -> Self {
        self.annotate(Attribute::Validation {
            rule,
            message: Some(message.into()),
        })
    }

    /// Name parameters positionally. Ignored on fields and properties.
    pub fn params(self, names: &[&str]) -> Self {
        if let Some(params) = self.member.params_mut() {
            for (param, name) in params.iter_mut().zip(names) {
                param.name = Some((*name).to_string());
            }
        }
        self
    }
}

fn instance_mismatch<T>(member: &str) -> MetaError {
    MetaError::InstanceMismatch {
        member: member.to_string(),
        expected: std::any::type_name::<T>(),
    }
}

fn value_mismatch<V>(member: &str, rejected: &Value) -> MetaError {
    MetaError::ValueType {
        member: member.to_string(),
        expected: std::any::type_name::<V>(),
        got: rejected.type_name(),
    }
}

fn into_value<R: Any + Send + Sync>(ret: R) -> Value {
    if TypeId::of::<R>() == TypeId::of::<()>() {
        Value::void()
    } else {
        Value::new(ret)
    }
}

fn compile_get<T, V, F>(member: Arc<str>, read: Arc<F>) -> Compiler<GetHandle>
where
    T: Any,
    V: Any + Send + Sync,
    F: Fn(&T) -> V + Send + Sync + 'static,
{
    Arc::new(move || {
        let member = Arc::clone(&member);
        let read = Arc::clone(&read);
        Box::new(move |inst: &dyn Any| -> Result<Value> {
            let target = instance_ref::<T>(inst).ok_or_else(|| instance_mismatch::<T>(&member))?;
            Ok(Value::new(read(target)))
        }) as GetHandle
    })
}

fn compile_set<T, V, F>(member: Arc<str>, write: Arc<F>) -> Compiler<SetHandle>
where
    T: Any,
    V: Any + Send + Sync,
    F: Fn(&mut T, V) + Send + Sync + 'static,
{
    Arc::new(move || {
        let member = Arc::clone(&member);
        let write = Arc::clone(&write);
        Box::new(move |inst: &mut dyn Any, value: Value| -> Result<()> {
            let target = instance_mut::<T>(inst).ok_or_else(|| instance_mismatch::<T>(&member))?;
            let value = value
                .coerce::<V>()
                .map_err(|rejected| value_mismatch::<V>(&member, &rejected))?;
            write(target, value);
            Ok(())
        }) as SetHandle
    })
}

fn compile_ref<T, A, R, F>(member: Arc<str>, f: Arc<F>) -> Compiler<InvokeHandle>
where
    T: Any,
    A: FromArgs,
    R: Any + Send + Sync,
    F: Fn(&T, A) -> R + Send + Sync + 'static,
{
    Arc::new(move || {
        let member = Arc::clone(&member);
        let f = Arc::clone(&f);
        Box::new(move |inst: Option<&mut dyn Any>, args: Vec<Value>| -> Result<Value> {
            let target = inst
                .as_deref()
                .and_then(instance_ref::<T>)
                .ok_or_else(|| instance_mismatch::<T>(&member))?;
            let args = A::from_args(&member, args)?;
            Ok(into_value(f(target, args)))
        }) as InvokeHandle
    })
}

fn compile_mut<T, A, R, F>(member: Arc<str>, f: Arc<F>) -> Compiler<InvokeHandle>
where
    T: Any,
    A: FromArgs,
    R: Any + Send + Sync,
    F: Fn(&mut T, A) -> R + Send + Sync + 'static,
{
    Arc::new(move || {
        let member = Arc::clone(&member);
        let f = Arc::clone(&f);
        Box::new(move |inst: Option<&mut dyn Any>, args: Vec<Value>| -> Result<Value> {
            let target = inst
                .and_then(instance_mut::<T>)
                .ok_or_else(|| instance_mismatch::<T>(&member))?;
            let args = A::from_args(&member, args)?;
            Ok(into_value(f(target, args)))
        }) as InvokeHandle
    })
}

fn compile_static<A, R, F>(member: Arc<str>, f: Arc<F>) -> Compiler<InvokeHandle>
where
    A: FromArgs,
    R: Any + Send + Sync,
    F: Fn(A) -> R + Send + Sync + 'static,
{
    Arc::new(move || {
        let member = Arc::clone(&member);
        let f = Arc::clone(&f);
        Box::new(move |_inst: Option<&mut dyn Any>, args: Vec<Value>| -> Result<Value> {
            let args = A::from_args(&member, args)?;
            Ok(into_value(f(args)))
        }) as InvokeHandle
    })
}

impl<T: Any + Send + Sync> TypeInfoBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            name: short_type_name(std::any::type_name::<T>()).to_string(),
            attributes: Vec::new(),
            members: Vec::new(),
            _marker: PhantomData,
        }
    }

    fn ident() -> TypeIdent {
        TypeIdent::of::<T>()
    }

    fn push(&mut self, member: MemberInfo) -> MemberSink<'_> {
        let idx = self.members.len();
        self.members.push(member);
        MemberSink {
            member: &mut self.members[idx],
        }
    }

    fn push_method(
        &mut self,
        name: &str,
        receiver: Receiver,
        params: Vec<TypeIdent>,
        return_type: TypeIdent,
        compile: Compiler<InvokeHandle>,
    ) -> MemberSink<'_> {
        self.push(MemberInfo::Method(MethodInfo {
            declaring: Self::ident(),
            name: name.to_string(),
            return_type,
            params: ParamInfo::list(params),
            receiver,
            attributes: Vec::new(),
            compile,
        }))
    }

    /// Override the type name (defaults to the unqualified Rust name).
    pub fn rename(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    /// Attach an attribute to the type itself.
    pub fn annotate(&mut self, attr: Attribute) -> &mut Self {
        self.attributes.push(attr);
        self
    }

    /// Read/write field projected by reference.
    pub fn field<V, G, M>(&mut self, name: &str, get: G, get_mut: M) -> MemberSink<'_>
    where
        V: Clone + Send + Sync + 'static,
        G: Fn(&T) -> &V + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        let member: Arc<str> = Arc::from(name);
        let read = Arc::new(move |t: &T| get(t).clone());
        let write = Arc::new(move |t: &mut T, v: V| *get_mut(t) = v);
        self.push(MemberInfo::Field(FieldInfo {
            declaring: Self::ident(),
            name: name.to_string(),
            value_type: TypeIdent::of::<V>(),
            attributes: Vec::new(),
            compile_get: compile_get::<T, V, _>(Arc::clone(&member), read),
            compile_set: Some(compile_set::<T, V, _>(member, write)),
        }))
    }

    /// Field without write access.
    pub fn readonly_field<V, G>(&mut self, name: &str, get: G) -> MemberSink<'_>
    where
        V: Clone + Send + Sync + 'static,
        G: Fn(&T) -> &V + Send + Sync + 'static,
    {
        let read = Arc::new(move |t: &T| get(t).clone());
        self.push(MemberInfo::Field(FieldInfo {
            declaring: Self::ident(),
            name: name.to_string(),
            value_type: TypeIdent::of::<V>(),
            attributes: Vec::new(),
            compile_get: compile_get::<T, V, _>(Arc::from(name), read),
            compile_set: None,
        }))
    }

    fn push_property<V>(
        &mut self,
        name: &str,
        get: Option<Compiler<GetHandle>>,
        set: Option<Compiler<SetHandle>>,
    ) -> MemberSink<'_>
    where
        V: Any,
    {
        self.push(MemberInfo::Property(PropertyInfo {
            declaring: Self::ident(),
            name: name.to_string(),
            value_type: TypeIdent::of::<V>(),
            attributes: Vec::new(),
            compile_get: get,
            compile_set: set,
        }))
    }

    fn getter_method<V, G>(&mut self, name: &str, get: &Arc<G>)
    where
        V: Any + Send + Sync,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        let accessor = format!("get_{name}");
        let get = Arc::clone(get);
        let f = Arc::new(move |t: &T, (): ()| get(t));
        let compile = compile_ref::<T, (), V, _>(Arc::from(accessor.as_str()), f);
        self.push_method(&accessor, Receiver::Ref, Vec::new(), TypeIdent::of::<V>(), compile);
    }

    fn setter_method<V, S>(&mut self, name: &str, set: &Arc<S>)
    where
        V: Any + Send + Sync,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let accessor = format!("set_{name}");
        let set = Arc::clone(set);
        let f = Arc::new(move |t: &mut T, (v,): (V,)| set(t, v));
        let compile = compile_mut::<T, (V,), (), _>(Arc::from(accessor.as_str()), f);
        self.push_method(
            &accessor,
            Receiver::Mut,
            vec![TypeIdent::of::<V>()],
            TypeIdent::void(),
            compile,
        );
    }

    /// Computed read/write property. Also publishes `get_<name>` and `set_<name>`.
    pub fn property<V, G, S>(&mut self, name: &str, get: G, set: S) -> MemberSink<'_>
    where
        V: Send + Sync + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let get = Arc::new(get);
        let set = Arc::new(set);
        self.getter_method::<V, G>(name, &get);
        self.setter_method::<V, S>(name, &set);
        let member: Arc<str> = Arc::from(name);
        let read = compile_get::<T, V, G>(Arc::clone(&member), get);
        let write = compile_set::<T, V, S>(member, set);
        self.push_property::<V>(name, Some(read), Some(write))
    }

    /// Property with a getter only. Also publishes `get_<name>`.
    pub fn readonly_property<V, G>(&mut self, name: &str, get: G) -> MemberSink<'_>
    where
        V: Send + Sync + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        let get = Arc::new(get);
        self.getter_method::<V, G>(name, &get);
        let read = compile_get::<T, V, G>(Arc::from(name), get);
        self.push_property::<V>(name, Some(read), None)
    }

    /// Property with a setter only. Also publishes `set_<name>`.
    pub fn writeonly_property<V, S>(&mut self, name: &str, set: S) -> MemberSink<'_>
    where
        V: Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let set = Arc::new(set);
        self.setter_method::<V, S>(name, &set);
        let write = compile_set::<T, V, S>(Arc::from(name), set);
        self.push_property::<V>(name, None, Some(write))
    }

    /// Method taking `&self`.
    pub fn method<A, R, F>(&mut self, name: &str, f: F) -> MemberSink<'_>
    where
        A: FromArgs,
        R: Send + Sync + 'static,
        F: Fn(&T, A) -> R + Send + Sync + 'static,
    {
        let compile = compile_ref::<T, A, R, F>(Arc::from(name), Arc::new(f));
        self.push_method(name, Receiver::Ref, A::param_types(), TypeIdent::of::<R>(), compile)
    }

    /// Method taking `&mut self`.
    pub fn method_mut<A, R, F>(&mut self, name: &str, f: F) -> MemberSink<'_>
    where
        A: FromArgs,
        R: Send + Sync + 'static,
        F: Fn(&mut T, A) -> R + Send + Sync + 'static,
    {
        let compile = compile_mut::<T, A, R, F>(Arc::from(name), Arc::new(f));
        self.push_method(name, Receiver::Mut, A::param_types(), TypeIdent::of::<R>(), compile)
    }

    /// Associated function (no instance).
    pub fn static_method<A, R, F>(&mut self, name: &str, f: F) -> MemberSink<'_>
    where
        A: FromArgs,
        R: Send + Sync + 'static,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let compile = compile_static::<A, R, F>(Arc::from(name), Arc::new(f));
        self.push_method(name, Receiver::Static, A::param_types(), TypeIdent::of::<R>(), compile)
    }

    /// Constructor with parameter tuple `A`.
    pub fn constructor<A, F>(&mut self, f: F) -> MemberSink<'_>
    where
        A: FromArgs,
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let compile: Compiler<ConstructHandle> = Arc::new(move || {
            let f = Arc::clone(&f);
            Box::new(move |args: Vec<Value>| -> Result<Value> {
                let args = A::from_args(ConstructorInfo::NAME, args)?;
                Ok(Value::new(f(args)))
            }) as ConstructHandle
        });
        self.push(MemberInfo::Constructor(ConstructorInfo {
            declaring: Self::ident(),
            params: ParamInfo::list(A::param_types()),
            attributes: Vec::new(),
            compile,
        }))
    }

    /// Publish `to_string()`.
    pub fn derive_display(&mut self) -> &mut Self
    where
        T: fmt::Display,
    {
        self.method("to_string", |t: &T, (): ()| t.to_string());
        self
    }

    /// Publish `equals(Value)`. A value of another type is never equal.
    pub fn derive_eq(&mut self) -> &mut Self
    where
        T: PartialEq,
    {
        self.method("equals", |t: &T, (other,): (Value,)| {
            other.downcast_ref::<T>().is_some_and(|o| o == t)
        });
        self
    }

    /// Publish `hash_code()`.
    pub fn derive_hash(&mut self) -> &mut Self
    where
        T: Hash,
    {
        self.method("hash_code", |t: &T, (): ()| {
            let mut hasher = DefaultHasher::new();
            t.hash(&mut hasher);
            hasher.finish()
        });
        self
    }

    pub(crate) fn finish(mut self) -> TypeInfo {
        let type_name = self.name.clone();
        self.method("type_name", move |_: &T, (): ()| type_name.clone());
        TypeInfo {
            ty: Self::ident(),
            name: self.name,
            attributes: self.attributes,
            members: self.members,
        }
    }
}

impl<T> fmt::Debug for TypeInfoBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfoBuilder")
            .field("name", &self.name)
            .field("members", &self.members.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::Annotations;
    use crate::args;
    use crate::info::{MemberKind, Reflect};

    #[derive(Debug, Default, Clone, PartialEq, Hash)]
    struct Counter {
        count: i32,
        label: String,
    }

    impl fmt::Display for Counter {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}={}", self.label, self.count)
        }
    }

    impl Reflect for Counter {
        fn reflect(t: &mut TypeInfoBuilder<Self>) {
            t.constructor(|(): ()| Counter::default());
            t.field("count", |c| &c.count, |c| &mut c.count)
                .display_name("Count")
                .description("how many")
                .rule(ValidationRule::Range {
                    min: 0.0,
                    max: 100.0,
                });
            t.property("label", |c: &Counter| c.label.clone(), |c, v| c.label = v);
            t.method_mut("bump", |c: &mut Counter, (by,): (i32,)| c.count += by)
                .params(&["by"]);
            t.derive_display().derive_eq().derive_hash();
        }
    }

    fn member<'a>(info: &'a TypeInfo, name: &str) -> &'a MemberInfo {
        info.members()
            .iter()
            .find(|m| m.name() == name)
            .unwrap_or_else(|| panic!("member {name} not declared"))
    }

    #[test]
    fn test_declaration_order_and_kinds() {
        let info = TypeInfo::of::<Counter>();
        assert_eq!(info.name(), "Counter");
        assert!(info.validate().is_ok());

        let kinds: Vec<_> = info.members().iter().map(|m| (m.kind(), m.name().to_string())).collect();
        assert_eq!(kinds[0], (MemberKind::Constructor, "new".to_string()));
        assert_eq!(kinds[1], (MemberKind::Field, "count".to_string()));
        assert!(kinds.contains(&(MemberKind::Method, "get_label".to_string())));
        assert!(kinds.contains(&(MemberKind::Method, "set_label".to_string())));
        assert_eq!(kinds.last().map(|k| k.1.as_str()), Some("type_name"));
    }

    #[test]
    fn test_sink_attributes_and_params() {
        let info = TypeInfo::of::<Counter>();
        let count = member(&info, "count");
        assert_eq!(count.attributes().len(), 3);
        let ann = Annotations::from_attributes(count.attributes());
        assert_eq!(ann.display_name(), Some("Count"));
        assert_eq!(ann.description(), Some("how many"));
        match member(&info, "bump") {
            MemberInfo::Method(m) => {
                assert_eq!(m.params()[0].name.as_deref(), Some("by"));
                assert_eq!(m.receiver(), Receiver::Mut);
                assert!(m.return_type().is_void());
            }
            other => panic!("unexpected member {other:?}"),
        }
    }

    #[test]
    fn test_compiled_field_handles() {
        let info = TypeInfo::of::<Counter>();
        let MemberInfo::Field(field) = member(&info, "count") else {
            panic!("count is not a field");
        };
        let get = (field.compile_get)();
        let set = field.compile_set.as_ref().map(|c| c()).expect("writable");

        let mut counter = Counter::default();
        set(&mut counter, Value::new(5i16)).expect("widening set");
        assert_eq!(counter.count, 5);
        let read = get(&counter).expect("get");
        assert_eq!(read.downcast_ref::<i32>(), Some(&5));

        let err = set(&mut counter, Value::new("x".to_string())).unwrap_err();
        assert!(matches!(err, MetaError::ValueType { .. }));
        assert!(matches!(get(&7u8).unwrap_err(), MetaError::InstanceMismatch { .. }));
    }

    #[test]
    fn test_compiled_methods() {
        let info = TypeInfo::of::<Counter>();
        let MemberInfo::Method(bump) = member(&info, "bump") else {
            panic!("bump is not a method");
        };
        let invoke = (bump.compile)();
        let mut counter = Counter::default();
        let ret = invoke(Some(&mut counter), args![3i32]).expect("invoke");
        assert!(ret.is_void());
        assert_eq!(counter.count, 3);
        assert!(invoke(None, args![1i32]).is_err());

        let MemberInfo::Method(equals) = member(&info, "equals") else {
            panic!("equals is not a method");
        };
        let equals = (equals.compile)();
        let same = equals(Some(&mut counter.clone()), args![Value::new(counter.clone())])
            .expect("equals");
        assert_eq!(same.downcast_ref::<bool>(), Some(&true));

        let MemberInfo::Method(type_name) = member(&info, "type_name") else {
            panic!("type_name is not a method");
        };
        let name = (type_name.compile)()(Some(&mut counter), Vec::new()).expect("type_name");
        assert_eq!(name.downcast_ref::<String>().map(String::as_str), Some("Counter"));
    }
}
