// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Constructor invokers.

use super::member::{MemberDescriptor, MemberMeta};
use crate::config::RegistryConfig;
use crate::error::{MetaError, Result};
use crate::info::{Compiler, ConstructHandle, ConstructorInfo, MemberKind, ParamInfo};
use crate::type_ident::TypeIdent;
use crate::type_key::TypeKey;
use crate::value::Value;
use std::any::Any;
use std::fmt;
use std::sync::OnceLock;

/// Cached construction handle for one constructor signature.
pub struct ConstructorInvoker {
    meta: MemberMeta,
    params: Vec<ParamInfo>,
    key: TypeKey,
    compile: Compiler<ConstructHandle>,
    handle: OnceLock<ConstructHandle>,
}

impl ConstructorInvoker {
    /// Invoker for a constructor declared on `owner`.
    pub fn new(owner: TypeIdent, info: &ConstructorInfo, config: &RegistryConfig) -> Result<Self> {
        let meta = MemberMeta::new(
            owner,
            info.declaring,
            ConstructorInfo::NAME,
            MemberKind::Constructor,
            TypeIdent::void(),
            &info.attributes,
            config,
        )?;
        let key = TypeKey::from(info.params.iter().map(|p| p.ty).collect::<Vec<_>>());
        Ok(Self {
            meta,
            params: info.params.clone(),
            key,
            compile: info.compile.clone(),
            handle: OnceLock::new(),
        })
    }

    /// Build a new instance from `args`.
    pub fn construct(&self, args: Vec<Value>) -> Result<Value> {
        let handle = self.handle.get_or_init(|| {
            log::trace!(
                "[invoker] compiling constructor `{}{}`",
                self.meta.declaring_type(),
                self.key
            );
            (self.compile)()
        });
        handle(args)
    }

    /// Zero-argument construction. The empty argument list does not allocate.
    pub fn construct_default(&self) -> Result<Value> {
        self.construct(Vec::new())
    }

    /// Construct and unbox as `T`.
    pub fn construct_as<T: Any>(&self, args: Vec<Value>) -> Result<T> {
        self.construct(args)?
            .downcast::<T>()
            .map_err(|built| MetaError::ValueType {
                member: ConstructorInfo::NAME.to_string(),
                expected: std::any::type_name::<T>(),
                got: built.type_name(),
            })
    }

    pub fn parameters(&self) -> &[ParamInfo] {
        &self.params
    }

    /// Parameter-type signature.
    pub fn type_key(&self) -> &TypeKey {
        &self.key
    }

    /// Whether this is the zero-argument constructor.
    pub fn is_default(&self) -> bool {
        self.key.is_empty()
    }

    pub fn is_compiled(&self) -> bool {
        self.handle.get().is_some()
    }
}

impl MemberDescriptor for ConstructorInvoker {
    fn meta(&self) -> &MemberMeta {
        &self.meta
    }
}

impl fmt::Debug for ConstructorInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInvoker")
            .field("type", &self.meta.declaring_type())
            .field("signature", &self.key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::info::{MemberInfo, Reflect, TypeInfo, TypeInfoBuilder};

    #[derive(Debug, PartialEq)]
    struct Pair {
        a: i32,
        b: String,
    }

    impl Reflect for Pair {
        fn reflect(t: &mut TypeInfoBuilder<Self>) {
            t.constructor(|(): ()| Pair { a: 0, b: String::new() });
            t.constructor(|(a, b): (i32, String)| Pair { a, b });
        }
    }

    fn invokers() -> Vec<ConstructorInvoker> {
        let info = TypeInfo::of::<Pair>();
        let owner = info.type_ident();
        info.members()
            .iter()
            .filter_map(|m| match m {
                MemberInfo::Constructor(c) => Some(c),
                _ => None,
            })
            .map(|c| ConstructorInvoker::new(owner, c, &RegistryConfig::default()).expect("ctor"))
            .collect()
    }

    #[test]
    fn test_default_and_typed() {
        let ctors = invokers();
        assert_eq!(ctors.len(), 2);
        assert!(ctors[0].is_default());
        assert!(ctors[0].value_type().is_void());
        assert!(!ctors[0].is_primitive_like());

        let built = ctors[0].construct_default().expect("default");
        assert_eq!(built.downcast_ref::<Pair>(), Some(&Pair { a: 0, b: String::new() }));

        let pair: Pair = ctors[1]
            .construct_as(args![5i16, "x".to_string()])
            .expect("construct");
        assert_eq!(pair, Pair { a: 5, b: "x".into() });
        assert_eq!(ctors[1].type_key(), &TypeKey::of::<(i32, String)>());
    }

    #[test]
    fn test_construct_errors() {
        let ctors = invokers();
        assert!(matches!(
            ctors[1].construct(args![1i32]).unwrap_err(),
            MetaError::ArgumentCount { expected: 2, got: 1, .. }
        ));
        assert!(matches!(
            ctors[0].construct_as::<u8>(Vec::new()).unwrap_err(),
            MetaError::ValueType { .. }
        ));
    }

    #[test]
    fn test_value_type_ignores_owner_classification() {
        let info = TypeInfo::of::<Pair>();
        let config = RegistryConfig::new().with_enum::<Pair>();
        let ctor = info
            .members()
            .iter()
            .find_map(|m| match m {
                MemberInfo::Constructor(c) => Some(c),
                _ => None,
            })
            .map(|c| ConstructorInvoker::new(info.type_ident(), c, &config).expect("ctor"))
            .expect("declared");
        assert!(ctor.value_type().is_void());
        assert!(ctor.primitive().is_none());
    }
}
