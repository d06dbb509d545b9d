// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic tagged values.
//!
//! [`Any`] carries one value of any [`TypeKind`] across a boundary that does
//! not share static types: scalars, strings, enum values, sequences, records,
//! object handles and nested `Any`s.
//!
//! # Example
//!
//! ```
//! use plic::any::{Any, AnyRecord, TypeKind};
//!
//! let point = Any::Record(AnyRecord::new().with("x", 3i32).with("y", 4i32));
//! assert_eq!(point.kind(), TypeKind::Record);
//! assert_eq!(point.field("y").unwrap().get::<i32>().unwrap(), 4);
//!
//! let copy = point.clone();
//! assert_eq!(copy, point);
//! ```

use std::fmt;

mod convert;
mod kind;
mod object;
mod value;

pub use convert::{FromAny, IntoAny};
pub use kind::TypeKind;
pub use object::{eq_by_value, AnyObject, ObjectHandle, RemoteHandle};
pub use value::{Any, AnyEnum, AnyRecord};

/// Errors from checked access to an [`Any`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyError {
    TypeMismatch { expected: TypeKind, got: TypeKind },
    FieldNotFound(String),
    IndexOutOfBounds { index: usize, length: usize },
    /// Integer does not fit the requested Rust type.
    OutOfRange { kind: TypeKind, value: i64 },
    /// Text does not parse as a value of `kind`.
    Parse { kind: TypeKind, text: String },
}

impl fmt::Display for AnyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { expected, got } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, got)
            }
            Self::FieldNotFound(name) => write!(f, "Field not found: {}", name),
            Self::IndexOutOfBounds { index, length } => {
                write!(f, "Index out of bounds: {} >= {}", index, length)
            }
            Self::OutOfRange { kind, value } => {
                write!(f, "{} value {} out of range for target type", kind, value)
            }
            Self::Parse { kind, text } => write!(f, "Cannot parse {:?} as {}", text, kind),
        }
    }
}

impl std::error::Error for AnyError {}
