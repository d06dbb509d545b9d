// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeKind taxonomy of [`Any`](super::Any) values.
//!
//! Each kind carries a one-character code, the same code used in type
//! signatures exchanged with the broker layer.

use std::fmt;

/// Category of value held by an [`Any`](super::Any).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TypeKind {
    /// No value assigned.
    #[default]
    Untyped = 0,
    Void = b'v',
    Bool = b'b',
    Int32 = b'i',
    Int64 = b'l',
    Float64 = b'd',
    String = b's',
    Enum = b'E',
    Sequence = b'Q',
    Record = b'R',
    /// Remote object reference (class or interface instance).
    Instance = b'C',
    /// Process-local object handle.
    Local = b'L',
    /// Nested Any.
    Any = b'Y',
}

impl TypeKind {
    /// All kinds, in code table order.
    pub const ALL: [TypeKind; 13] = [
        TypeKind::Untyped,
        TypeKind::Void,
        TypeKind::Bool,
        TypeKind::Int32,
        TypeKind::Int64,
        TypeKind::Float64,
        TypeKind::String,
        TypeKind::Enum,
        TypeKind::Sequence,
        TypeKind::Record,
        TypeKind::Instance,
        TypeKind::Local,
        TypeKind::Any,
    ];

    /// One-character code (`'\0'` for `Untyped`).
    pub const fn code(self) -> char {
        self as u8 as char
    }

    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    pub const fn name(self) -> &'static str {
        match self {
            TypeKind::Untyped => "UNTYPED",
            TypeKind::Void => "VOID",
            TypeKind::Bool => "BOOL",
            TypeKind::Int32 => "INT32",
            TypeKind::Int64 => "INT64",
            TypeKind::Float64 => "FLOAT64",
            TypeKind::String => "STRING",
            TypeKind::Enum => "ENUM",
            TypeKind::Sequence => "SEQUENCE",
            TypeKind::Record => "RECORD",
            TypeKind::Instance => "INSTANCE",
            TypeKind::Local => "LOCAL",
            TypeKind::Any => "ANY",
        }
    }

    /// Bool, integer, float and enum kinds.
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            TypeKind::Bool | TypeKind::Int32 | TypeKind::Int64 | TypeKind::Float64 | TypeKind::Enum
        )
    }

    /// Kinds whose payload is a reference-counted object handle.
    pub const fn is_object(self) -> bool {
        matches!(self, TypeKind::Instance | TypeKind::Local)
    }

    /// Kinds whose payload is deep-copied on clone.
    pub const fn is_aggregate(self) -> bool {
        matches!(self, TypeKind::Sequence | TypeKind::Record | TypeKind::Any)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
