// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read/write accessors for fields and properties.

use super::member::{MemberDescriptor, MemberMeta};
use crate::config::RegistryConfig;
use crate::error::{MetaError, Result};
use crate::info::{Compiler, FieldInfo, GetHandle, MemberKind, PropertyInfo, SetHandle};
use crate::type_ident::TypeIdent;
use crate::value::Value;
use std::any::Any;
use std::fmt;
use std::sync::OnceLock;

/// Cached get/set pair for one field or property.
///
/// Each handle is compiled on first use and kept for the accessor's
/// lifetime. `can_read`/`can_write` are fixed at construction.
pub struct ReadWriteAccessor {
    meta: MemberMeta,
    compile_get: Option<Compiler<GetHandle>>,
    compile_set: Option<Compiler<SetHandle>>,
    getter: OnceLock<GetHandle>,
    setter: OnceLock<SetHandle>,
}

impl ReadWriteAccessor {
    /// Accessor for a field declared on `owner`.
    pub fn for_field(owner: TypeIdent, info: &FieldInfo, config: &RegistryConfig) -> Result<Self> {
        let meta = MemberMeta::new(
            owner,
            info.declaring,
            &info.name,
            MemberKind::Field,
            info.value_type,
            &info.attributes,
            config,
        )?;
        Ok(Self::from_parts(
            meta,
            Some(info.compile_get.clone()),
            info.compile_set.clone(),
        ))
    }

    /// Accessor for a property declared on `owner`.
    pub fn for_property(
        owner: TypeIdent,
        info: &PropertyInfo,
        config: &RegistryConfig,
    ) -> Result<Self> {
        let meta = MemberMeta::new(
            owner,
            info.declaring,
            &info.name,
            MemberKind::Property,
            info.value_type,
            &info.attributes,
            config,
        )?;
        Ok(Self::from_parts(
            meta,
            info.compile_get.clone(),
            info.compile_set.clone(),
        ))
    }

    fn from_parts(
        meta: MemberMeta,
        compile_get: Option<Compiler<GetHandle>>,
        compile_set: Option<Compiler<SetHandle>>,
    ) -> Self {
        Self {
            meta,
            compile_get,
            compile_set,
            getter: OnceLock::new(),
            setter: OnceLock::new(),
        }
    }

    #[inline]
    pub fn can_read(&self) -> bool {
        self.compile_get.is_some()
    }

    #[inline]
    pub fn can_write(&self) -> bool {
        self.compile_set.is_some()
    }

    /// Whether either handle has been compiled.
    pub fn is_compiled(&self) -> bool {
        self.getter.get().is_some() || self.setter.get().is_some()
    }

    fn unsupported(&self, operation: &'static str) -> MetaError {
        MetaError::UnsupportedOperation {
            member: self.meta.name().to_string(),
            operation,
        }
    }

    /// Read the member from `instance` (the object or a `Value` boxing it).
    pub fn get(&self, instance: &dyn Any) -> Result<Value> {
        let Some(compile) = &self.compile_get else {
            return Err(self.unsupported("read"));
        };
        let handle = self.getter.get_or_init(|| {
            log::trace!("[accessor] compiling getter for `{}`", self.meta.name());
            compile()
        });
        handle(instance)
    }

    /// Read and coerce to `V`.
    pub fn get_as<V: Any + Send + Sync>(&self, instance: &dyn Any) -> Result<V> {
        self.get(instance)?
            .coerce::<V>()
            .map_err(|rejected| MetaError::ValueType {
                member: self.meta.name().to_string(),
                expected: std::any::type_name::<V>(),
                got: rejected.type_name(),
            })
    }

    /// Write `value`, coercing it to the member type.
    pub fn set(&self, instance: &mut dyn Any, value: Value) -> Result<()> {
        let Some(compile) = &self.compile_set else {
            return Err(self.unsupported("write"));
        };
        let handle = self.setter.get_or_init(|| {
            log::trace!("[accessor] compiling setter for `{}`", self.meta.name());
            compile()
        });
        handle(instance, value)
    }
}

impl MemberDescriptor for ReadWriteAccessor {
    fn meta(&self) -> &MemberMeta {
        &self.meta
    }
}

impl fmt::Debug for ReadWriteAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadWriteAccessor")
            .field("name", &self.meta.name())
            .field("kind", &self.meta.kind())
            .field("can_read", &self.can_read())
            .field("can_write", &self.can_write())
            .field("compiled", &self.is_compiled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::info::{MemberInfo, Reflect, TypeInfo, TypeInfoBuilder};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};

    #[derive(Default)]
    struct Sensor {
        id: u32,
        reading: f64,
        secret: String,
    }

    impl Reflect for Sensor {
        fn reflect(t: &mut TypeInfoBuilder<Self>) {
            t.readonly_field("id", |s| &s.id);
            t.field("reading", |s| &s.reading, |s| &mut s.reading);
            t.writeonly_property("secret", |s: &mut Sensor, v: String| s.secret = v);
            t.readonly_property("label", |s: &Sensor| format!("sensor-{}", s.id));
        }
    }

    fn accessor(name: &str) -> ReadWriteAccessor {
        let info = TypeInfo::of::<Sensor>();
        let config = RegistryConfig::default();
        let owner = info.type_ident();
        let built = info.members().iter().find_map(|m| match m {
            MemberInfo::Field(f) if f.name() == name => {
                Some(ReadWriteAccessor::for_field(owner, f, &config))
            }
            MemberInfo::Property(p) if p.name() == name => {
                Some(ReadWriteAccessor::for_property(owner, p, &config))
            }
            _ => None,
        });
        match built {
            Some(Ok(acc)) => acc,
            other => panic!("no accessor for {name}: {other:?}"),
        }
    }

    #[test]
    fn test_lazy_compile() {
        let acc = accessor("reading");
        assert!(!acc.is_compiled());
        let mut sensor = Sensor::default();
        acc.set(&mut sensor, Value::new(2.5f64)).expect("set");
        assert!(acc.is_compiled());
        assert_eq!(acc.get_as::<f64>(&sensor).expect("get"), 2.5);
    }

    #[test]
    fn test_guards() {
        let id = accessor("id");
        assert!(id.can_read() && !id.can_write());
        let mut sensor = Sensor { id: 3, ..Sensor::default() };
        let err = id.set(&mut sensor, Value::new(4u32)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
        assert!(!id.is_compiled());

        let secret = accessor("secret");
        assert!(!secret.can_read() && secret.can_write());
        let err = secret.get(&sensor).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
        secret.set(&mut sensor, Value::new("k".to_string())).expect("write-only set");
        assert_eq!(sensor.secret, "k");
    }

    #[test]
    fn test_boxed_instance_and_property() {
        let label = accessor("label");
        let boxed = Value::new(Sensor { id: 9, ..Sensor::default() });
        assert_eq!(label.get_as::<String>(&boxed).expect("get"), "sensor-9");
        assert!(label.is_primitive_like());
    }

    #[test]
    fn test_type_errors() {
        let reading = accessor("reading");
        let mut sensor = Sensor::default();
        let err = reading.set(&mut sensor, Value::new(1i64)).unwrap_err();
        assert!(matches!(err, MetaError::ValueType { .. }));
        let err = reading.get(&0u8).unwrap_err();
        assert!(matches!(err, MetaError::InstanceMismatch { .. }));
        let err = reading.get_as::<i32>(&sensor).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_concurrent_first_use_compiles_once() {
        let info = TypeInfo::of::<Sensor>();
        let Some(MemberInfo::Field(field)) = info.members().iter().find(|m| m.name() == "reading")
        else {
            panic!("reading is not a field");
        };

        let compiles = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&compiles);
        let inner = field.compile_get.clone();
        let counted_get: Compiler<GetHandle> = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            inner()
        });
        let counted = FieldInfo {
            compile_get: counted_get,
            ..field.clone()
        };
        let acc = ReadWriteAccessor::for_field(info.type_ident(), &counted, &RegistryConfig::default())
            .expect("accessor");

        let sensor = Sensor {
            reading: 1.25,
            ..Sensor::default()
        };
        let barrier = Barrier::new(8);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    barrier.wait();
                    assert_eq!(acc.get_as::<f64>(&sensor).expect("get"), 1.25);
                });
            }
        });

        assert_eq!(compiles.load(Ordering::SeqCst), 1);
        acc.get(&sensor).expect("cached get");
        assert_eq!(compiles.load(Ordering::SeqCst), 1);
    }
}
