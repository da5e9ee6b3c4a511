// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Method invokers.

use super::member::{MemberDescriptor, MemberMeta};
use crate::config::RegistryConfig;
use crate::error::Result;
use crate::info::{Compiler, InvokeHandle, MemberKind, MethodInfo, ParamInfo, Receiver};
use crate::type_ident::TypeIdent;
use crate::type_key::TypeKey;
use crate::value::Value;
use std::any::Any;
use std::fmt;
use std::sync::OnceLock;

/// Cached call handle for one method overload.
pub struct MethodInvoker {
    meta: MemberMeta,
    params: Vec<ParamInfo>,
    key: TypeKey,
    receiver: Receiver,
    compile: Compiler<InvokeHandle>,
    handle: OnceLock<InvokeHandle>,
}

impl MethodInvoker {
    /// Invoker for a method declared on `owner`.
    pub fn new(owner: TypeIdent, info: &MethodInfo, config: &RegistryConfig) -> Result<Self> {
        let meta = MemberMeta::new(
            owner,
            info.declaring,
            &info.name,
            MemberKind::Method,
            info.return_type,
            &info.attributes,
            config,
        )?;
        let key = TypeKey::from(info.params.iter().map(|p| p.ty).collect::<Vec<_>>());
        Ok(Self {
            meta,
            params: info.params.clone(),
            key,
            receiver: info.receiver,
            compile: info.compile.clone(),
            handle: OnceLock::new(),
        })
    }

    /// Call the method.
    ///
    /// `instance` is the object (or a `Value` boxing it) and is ignored by
    /// static methods. Unit-returning methods yield [`Value::void`].
    pub fn invoke(&self, instance: Option<&mut dyn Any>, args: Vec<Value>) -> Result<Value> {
        let handle = self.handle.get_or_init(|| {
            log::trace!("[invoker] compiling method `{}{}`", self.meta.name(), self.key);
            (self.compile)()
        });
        handle(instance, args)
    }

    pub fn parameters(&self) -> &[ParamInfo] {
        &self.params
    }

    /// Parameter-type signature.
    pub fn type_key(&self) -> &TypeKey {
        &self.key
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn receiver(&self) -> Receiver {
        self.receiver
    }

    pub fn is_static(&self) -> bool {
        self.receiver == Receiver::Static
    }

    /// Whether the method takes `&mut self`.
    pub fn mutates(&self) -> bool {
        self.receiver == Receiver::Mut
    }

    pub fn is_compiled(&self) -> bool {
        self.handle.get().is_some()
    }
}

impl MemberDescriptor for MethodInvoker {
    fn meta(&self) -> &MemberMeta {
        &self.meta
    }
}

impl fmt::Debug for MethodInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInvoker")
            .field("name", &self.meta.name())
            .field("signature", &self.key)
            .field("receiver", &self.receiver)
            .field("returns", &self.meta.value_type())
            .finish()
    }
}
