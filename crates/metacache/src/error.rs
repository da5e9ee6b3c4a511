// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for descriptor construction and member access.
//!
//! Lookups that can legitimately miss (a constructor signature, a field
//! name) return `Option` instead of an error. Everything here signals a
//! caller bug or an invalid declaration.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, MetaError>;

/// Coarse error category, stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid or type-mismatched input to a descriptor operation.
    InvalidArgument,
    /// Read of a non-readable member or write of a non-writable member.
    UnsupportedOperation,
    /// Default construction requested on a type without a zero-argument constructor.
    MissingConstructor,
}

/// Errors raised by descriptors, accessors and invokers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetaError {
    /// Invalid declaration or argument that has no more specific variant.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The instance passed to a member is missing or of the wrong type.
    #[error("member `{member}` requires an instance of `{expected}`")]
    InstanceMismatch {
        /// Member name.
        member: String,
        /// Declaring type name.
        expected: &'static str,
    },

    /// Wrong number of arguments for a method or constructor.
    #[error("`{member}` takes {expected} argument(s), got {got}")]
    ArgumentCount {
        /// Member name.
        member: String,
        /// Declared parameter count.
        expected: usize,
        /// Supplied argument count.
        got: usize,
    },

    /// An argument cannot be coerced to the declared parameter type.
    #[error("`{member}` argument {index}: expected `{expected}`, got `{got}`")]
    ArgumentType {
        /// Member name.
        member: String,
        /// Zero-based argument position.
        index: usize,
        /// Declared parameter type.
        expected: &'static str,
        /// Supplied value type.
        got: &'static str,
    },

    /// A value written to a field or property cannot be coerced to its type.
    #[error("`{member}` stores `{expected}`, got `{got}`")]
    ValueType {
        /// Member name.
        member: String,
        /// Declared value type.
        expected: &'static str,
        /// Supplied value type.
        got: &'static str,
    },

    /// Read of a write-only member or write of a read-only member.
    #[error("`{member}` does not support {operation}")]
    UnsupportedOperation {
        /// Member name.
        member: String,
        /// `"read"` or `"write"`.
        operation: &'static str,
    },

    /// No zero-argument constructor is declared.
    #[error("type `{type_name}` has no zero-argument constructor")]
    MissingConstructor {
        /// Type name.
        type_name: String,
    },
}

impl MetaError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_)
            | Self::InstanceMismatch { .. }
            | Self::ArgumentCount { .. }
            | Self::ArgumentType { .. }
            | Self::ValueType { .. } => ErrorKind::InvalidArgument,
            Self::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            Self::MissingConstructor { .. } => ErrorKind::MissingConstructor,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
