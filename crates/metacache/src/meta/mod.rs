// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built descriptors: per-member accessors and invokers, and the per-type
//! [`TypeDescriptor`] that groups them.
//!
//! Every handle is compiled lazily into a `OnceLock` owned by its member,
//! so the first successful compilation is the one all callers observe and
//! no two members ever contend.

mod accessor;
mod constructor;
mod member;
mod method;
mod type_descriptor;

pub use accessor::ReadWriteAccessor;
pub use constructor::ConstructorInvoker;
pub use member::{MemberDescriptor, MemberMeta};
pub use method::MethodInvoker;
pub use type_descriptor::{Member, TypeDescriptor};
