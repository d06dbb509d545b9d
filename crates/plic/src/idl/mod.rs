// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type package decoding.
//!
//! A type package is the binary form of compiled IDL: a magic header, the
//! package name, and an offset table of namespaces, each holding an offset
//! table of type entries.
//!
//! ```text
//! "PlicTypePkg_" "01\r\n" <string:pkg_name> <OffsetTable of namespaces>
//!   namespace: <string:full_name> <OffsetTable of types>
//!   type:      <"\n_" tag> <string:name> <aux_count> <aux strings>
//!              [<item_count>] [<body>]
//! ```
//!
//! # Error tiers
//!
//! - Parse time: every format violation is returned as an [`IdlError`].
//!   Malformed input is expected and never panics.
//! - Post validation: once a table was accepted, an inconsistency found
//!   while indexing it is a corruption signal and aborts the process
//!   through `fatal!`.
//!
//! # Example
//!
//! ```
//! use plic::idl::{PackageBuilder, StorageKind, TypeEntry, TypeRegistry};
//!
//! let bytes = PackageBuilder::new("pkg")
//!     .namespace("Foo", vec![TypeEntry::leaf(StorageKind::String, "label")])
//!     .build()
//!     .unwrap();
//!
//! let mut registry = TypeRegistry::new();
//! registry.register_package(bytes).unwrap();
//!
//! let namespaces = registry.list_namespaces();
//! assert_eq!(namespaces[0].fullname(), "Foo");
//! assert_eq!(namespaces[0].list_types()[0].name(), "label");
//! ```

use std::fmt;

/// Post-validation failure: log and abort.
///
/// Reserved for structures that were validated earlier and turned out to be
/// inconsistent. Parse-time problems return [`IdlError`] instead.
macro_rules! fatal {
    ($($arg:tt)*) => {{
        log::error!("[idl] FATAL: {}", format_args!($($arg)*));
        std::process::abort()
    }};
}
pub(crate) use fatal;

mod builder;
mod cursor;
mod offset_table;
mod registry;
mod type_info;

pub use builder::{EnumEntry, PackageBuilder, TypeEntry};
pub use cursor::{
    ceil4, encode_ascii_int, encode_packed_int, encode_string, parse_int, parse_string, Cursor,
    StringRef, Writer,
};
pub use offset_table::{ByteRange, OffsetTable};
pub use registry::{TypeNamespace, TypeRegistry};
pub use type_info::{EnumValueEntry, StorageKind, TypeInfo};

/// Errors raised while decoding (or encoding) a type package.
#[derive(Debug)]
pub enum IdlError {
    /// Fewer bytes remain than the field requires.
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// Four bytes that are neither the packed nor the ASCII integer form.
    InvalidInteger { offset: usize },
    /// Package does not start with the expected magic.
    BadMagic,
    /// Offset table header is inconsistent with its region.
    InvalidTable { offset: usize, reason: String },
    /// Offsets are not strictly increasing (entry `index` would be empty).
    ZeroLengthEntry { index: usize },
    /// Type entry is malformed (bad storage tag, trailing bytes, ...).
    InvalidFormat { offset: usize, reason: String },
    /// A name or annotation is not valid UTF-8.
    InvalidUtf8 { offset: usize },
    /// `TypeInfo::parse` called on an already parsed instance.
    AlreadyParsed,
    /// Value cannot be represented by the package integer forms.
    ValueTooLarge { value: u64 },
    /// Reading a package file failed.
    Io(std::io::Error),
}

impl fmt::Display for IdlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated {
                offset,
                needed,
                available,
            } => write!(
                f,
                "truncated at offset {}: need {} bytes, {} available",
                offset, needed, available
            ),
            Self::InvalidInteger { offset } => write!(f, "invalid integer at offset {}", offset),
            Self::BadMagic => write!(f, "bad type package magic"),
            Self::InvalidTable { offset, reason } => {
                write!(f, "invalid offset table at offset {}: {}", offset, reason)
            }
            Self::ZeroLengthEntry { index } => {
                write!(f, "offset table entry {} has zero or negative length", index)
            }
            Self::InvalidFormat { offset, reason } => {
                write!(f, "invalid type entry at offset {}: {}", offset, reason)
            }
            Self::InvalidUtf8 { offset } => write!(f, "invalid UTF-8 string at offset {}", offset),
            Self::AlreadyParsed => write!(f, "type info already parsed"),
            Self::ValueTooLarge { value } => {
                write!(f, "value {} does not fit a package integer", value)
            }
            Self::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for IdlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for IdlError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

pub type IdlResult<T> = Result<T, IdlError>;
