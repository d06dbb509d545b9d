// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The `Any` tagged value.

use super::convert::{FromAny, IntoAny};
use super::kind::TypeKind;
use super::object::ObjectHandle;
use super::AnyError;
use crate::idl::{IdlResult, StorageKind, TypeInfo};
use std::fmt;

/// Enum value tagged with its enum type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AnyEnum {
    pub type_name: String,
    pub value: i64,
}

impl AnyEnum {
    pub fn new(type_name: impl Into<String>, value: i64) -> Self {
        Self {
            type_name: type_name.into(),
            value,
        }
    }
}

/// Ordered list of named fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnyRecord {
    fields: Vec<(String, Any)>,
}

impl AnyRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `set`.
    pub fn with(mut self, name: impl Into<String>, value: impl IntoAny) -> Self {
        self.set(name, value);
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Any> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Any> {
        self.fields
            .iter_mut()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Replace the field in place, or append it.
    pub fn set(&mut self, name: impl Into<String>, value: impl IntoAny) {
        let name = name.into();
        let value = value.into_any();
        match self.get_mut(&name) {
            Some(slot) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Any> {
        let index = self.fields.iter().position(|(field, _)| field == name)?;
        Some(self.fields.remove(index).1)
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Any)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<N: Into<String>> FromIterator<(N, Any)> for AnyRecord {
    fn from_iter<I: IntoIterator<Item = (N, Any)>>(iter: I) -> Self {
        let mut record = AnyRecord::new();
        for (name, value) in iter {
            record.set(name, value);
        }
        record
    }
}

/// Generic, owning value.
///
/// The variant is the kind; there is no separate tag to keep in sync.
/// Cloning deep-copies sequences, records and nested values, and shares
/// object handles.
#[derive(Debug, Clone, Default)]
pub enum Any {
    #[default]
    Untyped,
    Void,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    String(String),
    Enum(AnyEnum),
    Sequence(Vec<Any>),
    Record(AnyRecord),
    Instance(ObjectHandle),
    Local(ObjectHandle),
    Any(Box<Any>),
}

impl Any {
    pub fn kind(&self) -> TypeKind {
        match self {
            Any::Untyped => TypeKind::Untyped,
            Any::Void => TypeKind::Void,
            Any::Bool(_) => TypeKind::Bool,
            Any::Int32(_) => TypeKind::Int32,
            Any::Int64(_) => TypeKind::Int64,
            Any::Float64(_) => TypeKind::Float64,
            Any::String(_) => TypeKind::String,
            Any::Enum(_) => TypeKind::Enum,
            Any::Sequence(_) => TypeKind::Sequence,
            Any::Record(_) => TypeKind::Record,
            Any::Instance(_) => TypeKind::Instance,
            Any::Local(_) => TypeKind::Local,
            Any::Any(_) => TypeKind::Any,
        }
    }

    pub fn is_untyped(&self) -> bool {
        matches!(self, Any::Untyped)
    }

    /// Drop the payload and return to `Untyped`.
    pub fn clear(&mut self) {
        *self = Any::Untyped;
    }

    /// Replace the value; the new kind follows from `T`.
    pub fn set<T: IntoAny>(&mut self, value: T) {
        *self = value.into_any();
    }

    /// Checked extraction.
    pub fn get<T: FromAny>(&self) -> Result<T, AnyError> {
        T::from_any(self)
    }

    /// Flag-style extraction: stores into `out` and returns `true` on
    /// success, leaves `out` untouched otherwise.
    pub fn extract<T: FromAny>(&self, out: &mut T) -> bool {
        match T::from_any(self) {
            Ok(value) => {
                *out = value;
                true
            }
            Err(_) => false,
        }
    }

    pub fn from_enum(type_name: impl Into<String>, value: i64) -> Self {
        Any::Enum(AnyEnum::new(type_name, value))
    }

    /// Integer view: bool as 0/1, floats truncated, strings 1 when
    /// non-empty. `None` for kinds without a numeric reading.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Any::Bool(v) => Some(i64::from(*v)),
            Any::Int32(v) => Some(i64::from(*v)),
            Any::Int64(v) => Some(*v),
            Any::Float64(v) => Some(*v as i64),
            Any::Enum(v) => Some(v.value),
            Any::String(v) => Some(i64::from(!v.is_empty())),
            Any::Any(inner) => inner.as_int(),
            _ => None,
        }
    }

    /// Floating point view, same table as [`Any::as_int`] but widening.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Any::Float64(v) => Some(*v),
            Any::Int64(v) => Some(*v as f64),
            Any::Any(inner) => inner.as_float(),
            other => other.as_int().map(|v| v as f64),
        }
    }

    /// String view of scalar kinds; numbers are printed in decimal and
    /// bools as `0`/`1`.
    pub fn as_string(&self) -> Option<String> {
        match self {
            Any::String(v) => Some(v.clone()),
            Any::Bool(v) => Some(i64::from(*v).to_string()),
            Any::Int32(v) => Some(v.to_string()),
            Any::Int64(v) => Some(v.to_string()),
            Any::Float64(v) => Some(v.to_string()),
            Any::Enum(v) => Some(v.value.to_string()),
            Any::Any(inner) => inner.as_string(),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Any]> {
        match self {
            Any::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&AnyRecord> {
        match self {
            Any::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut AnyRecord> {
        match self {
            Any::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Record field `name`.
    pub fn field(&self, name: &str) -> Result<&Any, AnyError> {
        let record = self.as_record().ok_or(AnyError::TypeMismatch {
            expected: TypeKind::Record,
            got: self.kind(),
        })?;
        record
            .get(name)
            .ok_or_else(|| AnyError::FieldNotFound(name.to_string()))
    }

    /// Sequence element `index`.
    pub fn index(&self, index: usize) -> Result<&Any, AnyError> {
        let items = self.as_sequence().ok_or(AnyError::TypeMismatch {
            expected: TypeKind::Sequence,
            got: self.kind(),
        })?;
        items.get(index).ok_or(AnyError::IndexOutOfBounds {
            index,
            length: items.len(),
        })
    }

    /// Zero value for a type entry declared in `namespace`.
    ///
    /// Records get one default per field, sequences start empty, enums take
    /// their first declared value and are tagged `namespace::name`, the key
    /// used by the enum registry. Record fields share the record's
    /// namespace. References and instances have no standalone zero and stay
    /// `Untyped`.
    pub fn default_for(namespace: &str, info: &TypeInfo<'_>) -> IdlResult<Any> {
        let value = match info.storage() {
            StorageKind::Int => Any::Int64(0),
            StorageKind::Float => Any::Float64(0.0),
            StorageKind::String => Any::String(String::new()),
            StorageKind::Any => Any::Any(Box::new(Any::Untyped)),
            StorageKind::Enum => {
                let first = info.enum_values()?.first().map_or(0, |v| v.value);
                let type_name = if namespace.is_empty() {
                    info.name().to_string()
                } else {
                    format!("{}::{}", namespace, info.name())
                };
                Any::from_enum(type_name, first)
            }
            StorageKind::Sequence => Any::Sequence(Vec::new()),
            StorageKind::Record => {
                let mut record = AnyRecord::new();
                for field in info.fields()? {
                    record.set(field.name(), Any::default_for(namespace, &field)?);
                }
                Any::Record(record)
            }
            StorageKind::Untyped | StorageKind::TypeReference | StorageKind::Instance => {
                Any::Untyped
            }
        };
        Ok(value)
    }
}

impl PartialEq for Any {
    /// Kinds must match. Object kinds defer to the object's own equality
    /// and are unequal when it has none.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Any::Untyped, Any::Untyped) | (Any::Void, Any::Void) => true,
            (Any::Bool(a), Any::Bool(b)) => a == b,
            (Any::Int32(a), Any::Int32(b)) => a == b,
            (Any::Int64(a), Any::Int64(b)) => a == b,
            (Any::Float64(a), Any::Float64(b)) => a == b,
            (Any::String(a), Any::String(b)) => a == b,
            (Any::Enum(a), Any::Enum(b)) => a == b,
            (Any::Sequence(a), Any::Sequence(b)) => a == b,
            (Any::Record(a), Any::Record(b)) => a == b,
            (Any::Instance(a), Any::Instance(b)) | (Any::Local(a), Any::Local(b)) => a == b,
            (Any::Any(a), Any::Any(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Any {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Any::Untyped => f.write_str("<untyped>"),
            Any::Void => f.write_str("void"),
            Any::Bool(v) => write!(f, "{}", v),
            Any::Int32(v) => write!(f, "{}", v),
            Any::Int64(v) => write!(f, "{}", v),
            Any::Float64(v) => write!(f, "{:?}", v),
            Any::String(v) => write!(f, "{:?}", v),
            Any::Enum(v) => write!(f, "{}({})", v.type_name, v.value),
            Any::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Any::Record(record) => {
                f.write_str("{")?;
                for (i, (name, value)) in record.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                f.write_str("}")
            }
            Any::Instance(handle) | Any::Local(handle) => write!(f, "{}", handle),
            Any::Any(inner) => write!(f, "Any({})", inner),
        }
    }
}
