// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type entries: storage tag, name, aux annotations and an opaque body.

use super::cursor::Cursor;
use super::{IdlError, IdlResult};
use crate::any::TypeKind;
use crate::config::TYPE_TAG_SIZE;
use std::fmt;

/// Storage kind encoded by the 4-byte tag opening a type entry.
///
/// | Tag      | Kind            | item count        | body |
/// |----------|-----------------|-------------------|------|
/// | `\n__i`  | Int             |                   |      |
/// | `\n__d`  | Float           |                   |      |
/// | `\n__s`  | String          |                   |      |
/// | `\n__a`  | Any             |                   |      |
/// | `\n__c`  | Instance        | prerequisites     | yes  |
/// | `\n_Es`  | Enum            | values            | yes  |
/// | `\n_Ts`  | TypeReference   |                   | yes  |
/// | `\n_Qa`  | Sequence        |                   | yes  |
/// | `\n_Ra`  | Record          | fields            | yes  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageKind {
    /// Not parsed yet.
    #[default]
    Untyped,
    Int,
    Float,
    String,
    Any,
    /// Class or interface.
    Instance,
    Enum,
    TypeReference,
    Sequence,
    Record,
}

impl StorageKind {
    /// Decode the two tag bytes following `\n_`.
    pub fn from_tag(tag: [u8; 2]) -> Option<Self> {
        match tag {
            [b'_', b'i'] => Some(Self::Int),
            [b'_', b'd'] => Some(Self::Float),
            [b'_', b's'] => Some(Self::String),
            [b'_', b'a'] => Some(Self::Any),
            [b'_', b'c'] => Some(Self::Instance),
            [b'E', b's'] => Some(Self::Enum),
            [b'T', b's'] => Some(Self::TypeReference),
            [b'Q', b'a'] => Some(Self::Sequence),
            [b'R', b'a'] => Some(Self::Record),
            _ => None,
        }
    }

    /// Full 4-byte tag for this kind (`None` for `Untyped`).
    pub const fn tag(self) -> Option<[u8; 4]> {
        let pair = match self {
            Self::Untyped => return None,
            Self::Int => *b"_i",
            Self::Float => *b"_d",
            Self::String => *b"_s",
            Self::Any => *b"_a",
            Self::Instance => *b"_c",
            Self::Enum => *b"Es",
            Self::TypeReference => *b"Ts",
            Self::Sequence => *b"Qa",
            Self::Record => *b"Ra",
        };
        Some([b'\n', b'_', pair[0], pair[1]])
    }

    /// Kinds followed by an item count after the aux strings.
    pub const fn has_item_count(self) -> bool {
        matches!(self, Self::Record | Self::Enum | Self::Instance)
    }

    /// Kinds carrying a kind-specific body.
    pub const fn has_body(self) -> bool {
        matches!(
            self,
            Self::TypeReference | Self::Enum | Self::Record | Self::Sequence | Self::Instance
        )
    }

    /// Value category an [`crate::Any`] of this storage holds.
    ///
    /// References map to `Untyped` until resolved.
    pub const fn type_kind(self) -> TypeKind {
        match self {
            Self::Untyped | Self::TypeReference => TypeKind::Untyped,
            Self::Int => TypeKind::Int64,
            Self::Float => TypeKind::Float64,
            Self::String => TypeKind::String,
            Self::Any => TypeKind::Any,
            Self::Instance => TypeKind::Instance,
            Self::Enum => TypeKind::Enum,
            Self::Sequence => TypeKind::Sequence,
            Self::Record => TypeKind::Record,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Untyped => "UNTYPED",
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::String => "STRING",
            Self::Any => "ANY",
            Self::Instance => "INSTANCE",
            Self::Enum => "ENUM",
            Self::TypeReference => "TYPE_REFERENCE",
            Self::Sequence => "SEQUENCE",
            Self::Record => "RECORD",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One declared value of an enum type entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumValueEntry<'a> {
    pub ident: &'a str,
    pub value: i64,
    pub label: &'a str,
    pub blurb: &'a str,
}

/// Decoded type entry borrowing from the package buffer.
///
/// Write-once: a default instance is `Untyped` until [`TypeInfo::parse`]
/// succeeds, and a second `parse` fails with [`IdlError::AlreadyParsed`].
/// Error offsets are relative to the entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeInfo<'a> {
    storage: StorageKind,
    name: &'a str,
    aux: Vec<&'a str>,
    item_count: u32,
    body: &'a [u8],
}

impl<'a> TypeInfo<'a> {
    /// Parse a type entry in one step.
    pub fn from_bytes(data: &'a [u8]) -> IdlResult<Self> {
        let mut info = Self::default();
        info.parse(data)?;
        Ok(info)
    }

    /// Parse `data` (exactly one type entry) into this instance.
    pub fn parse(&mut self, data: &'a [u8]) -> IdlResult<()> {
        if self.storage != StorageKind::Untyped {
            return Err(IdlError::AlreadyParsed);
        }

        let mut cursor = Cursor::new(data);
        let tag = cursor.read_bytes(TYPE_TAG_SIZE)?;
        let storage = match tag {
            [b'\n', b'_', a, b] => StorageKind::from_tag([*a, *b]),
            _ => None,
        }
        .ok_or_else(|| IdlError::InvalidFormat {
            offset: 0,
            reason: format!("bad storage tag {:?}", String::from_utf8_lossy(tag)),
        })?;

        let name = cursor.read_str()?;
        let aux_count = cursor.read_int()?;
        let mut aux = Vec::with_capacity(aux_count.min(64) as usize);
        for _ in 0..aux_count {
            aux.push(cursor.read_str()?);
        }

        let item_count = if storage.has_item_count() {
            cursor.read_int()?
        } else {
            0
        };

        let body = if storage.has_body() {
            cursor.rest()
        } else if !cursor.is_eof() {
            return Err(IdlError::InvalidFormat {
                offset: cursor.offset(),
                reason: format!(
                    "{} trailing bytes after {} entry '{}'",
                    cursor.remaining(),
                    storage,
                    name
                ),
            });
        } else {
            &[]
        };

        log::trace!("[idl] parsed {} '{}' ({} aux)", storage, name, aux.len());

        self.storage = storage;
        self.name = name;
        self.aux = aux;
        self.item_count = item_count;
        self.body = body;
        Ok(())
    }

    pub fn is_parsed(&self) -> bool {
        self.storage != StorageKind::Untyped
    }

    pub fn storage(&self) -> StorageKind {
        self.storage
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn aux_strings(&self) -> &[&'a str] {
        &self.aux
    }

    pub fn n_aux_strings(&self) -> usize {
        self.aux.len()
    }

    /// Value part of the first `key=value` aux string with a matching key.
    pub fn aux_value(&self, key: &str) -> Option<&'a str> {
        self.aux.iter().find_map(|entry| match entry.split_once('=') {
            Some((k, v)) if k == key => Some(v),
            _ => None,
        })
    }

    /// Field count for records, value count for enums, prerequisite count
    /// for instances; zero otherwise.
    pub fn item_count(&self) -> u32 {
        self.item_count
    }

    /// Raw kind-specific body.
    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    fn expect_storage(&self, storage: StorageKind) -> IdlResult<()> {
        if self.storage == storage {
            Ok(())
        } else {
            Err(IdlError::InvalidFormat {
                offset: 0,
                reason: format!("'{}' is {}, not {}", self.name, self.storage, storage),
            })
        }
    }

    /// Target type name of a type reference.
    pub fn reference_name(&self) -> IdlResult<&'a str> {
        self.expect_storage(StorageKind::TypeReference)?;
        Cursor::new(self.body).read_str()
    }

    /// Element type of a sequence.
    pub fn element_type(&self) -> IdlResult<TypeInfo<'a>> {
        self.expect_storage(StorageKind::Sequence)?;
        let entry = Cursor::new(self.body).read_blob()?;
        TypeInfo::from_bytes(entry)
    }

    /// Fields of a record; each field entry is named after the field.
    pub fn fields(&self) -> IdlResult<Vec<TypeInfo<'a>>> {
        self.expect_storage(StorageKind::Record)?;
        let mut cursor = Cursor::new(self.body);
        (0..self.item_count)
            .map(|_| TypeInfo::from_bytes(cursor.read_blob()?))
            .collect()
    }

    /// Declared values of an enum.
    pub fn enum_values(&self) -> IdlResult<Vec<EnumValueEntry<'a>>> {
        self.expect_storage(StorageKind::Enum)?;
        let mut cursor = Cursor::new(self.body);
        let mut values = Vec::with_capacity(self.item_count as usize);
        for _ in 0..self.item_count {
            let ident = cursor.read_str()?;
            let offset = cursor.offset();
            let raw = cursor.read_str()?;
            let value = raw.trim().parse::<i64>().map_err(|_| IdlError::InvalidFormat {
                offset,
                reason: format!("enum value '{}' of {} is not an integer", raw, ident),
            })?;
            let label = cursor.read_str()?;
            let blurb = cursor.read_str()?;
            values.push(EnumValueEntry {
                ident,
                value,
                label,
                blurb,
            });
        }
        Ok(values)
    }

    /// Base interfaces of an instance type.
    pub fn prerequisites(&self) -> IdlResult<Vec<&'a str>> {
        self.expect_storage(StorageKind::Instance)?;
        let mut cursor = Cursor::new(self.body);
        (0..self.item_count).map(|_| cursor.read_str()).collect()
    }
}
