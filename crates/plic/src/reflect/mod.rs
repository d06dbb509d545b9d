// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reflection: enum metadata and property access by name.
//!
//! Property values travel as [`Any`](crate::any::Any); string access goes
//! through [`marshal`] on top of the same accessors.
//!
//! # Example
//!
//! ```
//! use plic::reflect::{PropertyBuilder, PropertyList};
//!
//! #[derive(Default)]
//! struct Slider {
//!     value: f64,
//! }
//!
//! let list = PropertyList::new(&[PropertyBuilder::float(
//!     "value",
//!     |s: &Slider| s.value,
//!     |s: &mut Slider, v| s.value = v,
//! )
//! .range(0.0, 1.0, 0.1)
//! .shared()]);
//!
//! let mut slider = Slider::default();
//! list.set_string(&mut slider, "value", "0.5").unwrap();
//! assert_eq!(list.get_string(&slider, "value").unwrap(), "0.5");
//! assert!(list.set_string(&mut slider, "value", "2").is_err());
//! ```

use crate::any::AnyError;
use std::fmt;

mod enum_info;
pub mod marshal;
mod property;

pub use enum_info::{EnumInfo, EnumRegistry, EnumValue};
pub use property::{FnProperty, Property, PropertyBuilder, PropertyList, PropertyRange, PropertyRef};

/// Errors from property access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    NotFound(String),
    ReadOnly(String),
    WriteOnly(String),
    InvalidValue { property: String, reason: String },
    /// More parent lists than `MAX_PARENT_LISTS`.
    TooManyParents { count: usize },
    Value(AnyError),
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "Property not found: {}", name),
            Self::ReadOnly(name) => write!(f, "Property is read-only: {}", name),
            Self::WriteOnly(name) => write!(f, "Property is write-only: {}", name),
            Self::InvalidValue { property, reason } => {
                write!(f, "Invalid value for {}: {}", property, reason)
            }
            Self::TooManyParents { count } => write!(
                f,
                "Too many parent property lists: {} > {}",
                count,
                crate::config::MAX_PARENT_LISTS
            ),
            Self::Value(err) => write!(f, "Value error: {}", err),
        }
    }
}

impl std::error::Error for PropertyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Value(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AnyError> for PropertyError {
    fn from(err: AnyError) -> Self {
        Self::Value(err)
    }
}
