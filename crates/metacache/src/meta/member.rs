// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! State shared by every member descriptor.

use crate::annotations::{Annotations, Attribute};
use crate::config::RegistryConfig;
use crate::error::Result;
use crate::info::{check_member, MemberKind};
use crate::type_ident::{Primitive, TypeIdent};
use std::fmt;
use std::sync::OnceLock;

/// Identity, value type and annotations of one member.
pub struct MemberMeta {
    declaring: TypeIdent,
    name: String,
    kind: MemberKind,
    value_type: TypeIdent,
    primitive: Option<Primitive>,
    attributes: Vec<Attribute>,
    annotations: OnceLock<Annotations>,
}

impl MemberMeta {
    /// Fails with `InvalidArgument` when `name` is empty or `declaring`
    /// is not `owner`.
    pub(crate) fn new(
        owner: TypeIdent,
        declaring: TypeIdent,
        name: &str,
        kind: MemberKind,
        value_type: TypeIdent,
        attributes: &[Attribute],
        config: &RegistryConfig,
    ) -> Result<Self> {
        check_member(owner, name, declaring)?;
        Ok(Self {
            declaring,
            name: name.to_string(),
            kind,
            value_type,
            primitive: config.classify(value_type),
            attributes: attributes.to_vec(),
            annotations: OnceLock::new(),
        })
    }
}

impl fmt::Debug for MemberMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberMeta")
            .field("declaring", &self.declaring)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("value_type", &self.value_type)
            .finish_non_exhaustive()
    }
}

/// Common contract of accessors and invokers.
///
/// Implementors only provide [`meta`](MemberDescriptor::meta); everything
/// else reads the shared [`MemberMeta`].
pub trait MemberDescriptor {
    fn meta(&self) -> &MemberMeta;

    fn name(&self) -> &str {
        &self.meta().name
    }

    fn kind(&self) -> MemberKind {
        self.meta().kind
    }

    fn declaring_type(&self) -> TypeIdent {
        self.meta().declaring
    }

    /// Field/property type, method return type, or the constructed type.
    fn value_type(&self) -> TypeIdent {
        self.meta().value_type
    }

    fn primitive(&self) -> Option<Primitive> {
        self.meta().primitive
    }

    /// Whether the value type (or its `Option`) is primitive-like.
    fn is_primitive_like(&self) -> bool {
        self.meta().primitive.is_some()
    }

    fn attributes(&self) -> &[Attribute] {
        &self.meta().attributes
    }

    /// Computed on first access, then cached.
    fn annotations(&self) -> &Annotations {
        let meta = self.meta();
        meta.annotations
            .get_or_init(|| Annotations::from_attributes(&meta.attributes))
    }
}

impl MemberDescriptor for MemberMeta {
    fn meta(&self) -> &MemberMeta {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::ValidationRule;
    use crate::error::ErrorKind;

    struct Owner;

    fn meta(name: &str, declaring: TypeIdent) -> Result<MemberMeta> {
        MemberMeta::new(
            TypeIdent::of::<Owner>(),
            declaring,
            name,
            MemberKind::Field,
            TypeIdent::of::<Option<u32>>(),
            &[Attribute::rule(ValidationRule::Required)],
            &RegistryConfig::default(),
        )
    }

    #[test]
    fn test_identity_and_classification() {
        let m = meta("age", TypeIdent::of::<Owner>()).expect("valid");
        assert_eq!(m.name(), "age");
        assert_eq!(m.kind(), MemberKind::Field);
        assert!(m.is_primitive_like());
        assert!(m.primitive().is_some_and(|p| p.nullable));
    }

    #[test]
    fn test_annotations_cached() {
        let m = meta("age", TypeIdent::of::<Owner>()).expect("valid");
        assert!(m.meta().annotations.get().is_none());
        assert!(m.annotations().is_required());
        let first: *const Annotations = m.annotations();
        let second: *const Annotations = m.annotations();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_member() {
        let err = meta("", TypeIdent::of::<Owner>()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = meta("age", TypeIdent::of::<u8>()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
