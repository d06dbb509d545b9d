// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversion traits between Rust values and [`Any`].
//!
//! `IntoAny` picks the kind from the Rust type; `FromAny` checks it.
//! An `Any` converts to itself unchanged; use `Box<Any>` to store or read
//! a nested `Any` kind.

use super::kind::TypeKind;
use super::object::{ObjectHandle, RemoteHandle};
use super::value::{Any, AnyEnum, AnyRecord};
use super::AnyError;

/// Trait for converting to Any.
pub trait IntoAny {
    fn into_any(self) -> Any;
}

/// Trait for converting from Any.
pub trait FromAny: Sized {
    fn from_any(value: &Any) -> Result<Self, AnyError>;
}

fn mismatch<T>(expected: TypeKind, value: &Any) -> Result<T, AnyError> {
    Err(AnyError::TypeMismatch {
        expected,
        got: value.kind(),
    })
}

macro_rules! impl_into_any {
    ($ty:ty, $variant:ident) => {
        impl IntoAny for $ty {
            fn into_any(self) -> Any {
                Any::$variant(self.into())
            }
        }

        impl From<$ty> for Any {
            fn from(value: $ty) -> Self {
                value.into_any()
            }
        }
    };
}

impl_into_any!(bool, Bool);
impl_into_any!(i8, Int32);
impl_into_any!(i16, Int32);
impl_into_any!(i32, Int32);
impl_into_any!(u8, Int32);
impl_into_any!(u16, Int32);
impl_into_any!(i64, Int64);
impl_into_any!(u32, Int64);
impl_into_any!(f32, Float64);
impl_into_any!(f64, Float64);
impl_into_any!(String, String);
impl_into_any!(&str, String);
impl_into_any!(AnyEnum, Enum);
impl_into_any!(AnyRecord, Record);

impl IntoAny for Any {
    fn into_any(self) -> Any {
        self
    }
}

impl IntoAny for Box<Any> {
    fn into_any(self) -> Any {
        Any::Any(self)
    }
}

/// Object handles travel as `Local`.
impl IntoAny for ObjectHandle {
    fn into_any(self) -> Any {
        Any::Local(self)
    }
}

/// Remote references travel as `Instance`.
impl IntoAny for RemoteHandle {
    fn into_any(self) -> Any {
        Any::Instance(ObjectHandle::new(self))
    }
}

impl<T: IntoAny> IntoAny for Vec<T> {
    fn into_any(self) -> Any {
        Any::Sequence(self.into_iter().map(IntoAny::into_any).collect())
    }
}

impl<T: IntoAny> From<Vec<T>> for Any {
    fn from(value: Vec<T>) -> Self {
        value.into_any()
    }
}

impl FromAny for bool {
    fn from_any(value: &Any) -> Result<Self, AnyError> {
        match value {
            Any::Bool(v) => Ok(*v),
            other => mismatch(TypeKind::Bool, other),
        }
    }
}

impl FromAny for i64 {
    fn from_any(value: &Any) -> Result<Self, AnyError> {
        match value {
            Any::Int32(v) => Ok(i64::from(*v)),
            Any::Int64(v) => Ok(*v),
            Any::Enum(v) => Ok(v.value),
            other => mismatch(TypeKind::Int64, other),
        }
    }
}

macro_rules! impl_from_any_narrow {
    ($ty:ty) => {
        impl FromAny for $ty {
            fn from_any(value: &Any) -> Result<Self, AnyError> {
                let wide = match value {
                    Any::Int32(v) => i64::from(*v),
                    Any::Int64(v) => *v,
                    Any::Enum(v) => v.value,
                    other => return mismatch(TypeKind::Int32, other),
                };
                <$ty>::try_from(wide).map_err(|_| AnyError::OutOfRange {
                    kind: value.kind(),
                    value: wide,
                })
            }
        }
    };
}

impl_from_any_narrow!(i8);
impl_from_any_narrow!(i16);
impl_from_any_narrow!(i32);
impl_from_any_narrow!(u8);
impl_from_any_narrow!(u16);
impl_from_any_narrow!(u32);
impl_from_any_narrow!(u64);
impl_from_any_narrow!(usize);

impl FromAny for f64 {
    fn from_any(value: &Any) -> Result<Self, AnyError> {
        match value {
            Any::Float64(v) => Ok(*v),
            Any::Int32(v) => Ok(f64::from(*v)),
            Any::Int64(v) => Ok(*v as f64),
            other => mismatch(TypeKind::Float64, other),
        }
    }
}

impl FromAny for f32 {
    fn from_any(value: &Any) -> Result<Self, AnyError> {
        f64::from_any(value).map(|v| v as f32)
    }
}

impl FromAny for String {
    fn from_any(value: &Any) -> Result<Self, AnyError> {
        match value {
            Any::String(v) => Ok(v.clone()),
            other => mismatch(TypeKind::String, other),
        }
    }
}

impl FromAny for AnyEnum {
    fn from_any(value: &Any) -> Result<Self, AnyError> {
        match value {
            Any::Enum(v) => Ok(v.clone()),
            other => mismatch(TypeKind::Enum, other),
        }
    }
}

impl FromAny for AnyRecord {
    fn from_any(value: &Any) -> Result<Self, AnyError> {
        match value {
            Any::Record(v) => Ok(v.clone()),
            other => mismatch(TypeKind::Record, other),
        }
    }
}

impl FromAny for ObjectHandle {
    fn from_any(value: &Any) -> Result<Self, AnyError> {
        match value {
            Any::Instance(handle) | Any::Local(handle) => Ok(handle.clone()),
            other => mismatch(TypeKind::Instance, other),
        }
    }
}

impl FromAny for RemoteHandle {
    fn from_any(value: &Any) -> Result<Self, AnyError> {
        match value {
            Any::Instance(handle) => handle.downcast_ref::<RemoteHandle>().copied().ok_or(
                AnyError::TypeMismatch {
                    expected: TypeKind::Instance,
                    got: TypeKind::Local,
                },
            ),
            other => mismatch(TypeKind::Instance, other),
        }
    }
}

impl FromAny for Any {
    fn from_any(value: &Any) -> Result<Self, AnyError> {
        Ok(value.clone())
    }
}

impl FromAny for Box<Any> {
    fn from_any(value: &Any) -> Result<Self, AnyError> {
        match value {
            Any::Any(inner) => Ok(inner.clone()),
            other => mismatch(TypeKind::Any, other),
        }
    }
}

impl<T: FromAny> FromAny for Vec<T> {
    fn from_any(value: &Any) -> Result<Self, AnyError> {
        match value {
            Any::Sequence(items) => items.iter().map(T::from_any).collect(),
            other => mismatch(TypeKind::Sequence, other),
        }
    }
}
