// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder producing type package bytes.
//!
//! Integers are written in the ASCII form, so a single table region is
//! limited to `ASCII_INT_MAX` bytes.

use super::cursor::Writer;
use super::type_info::StorageKind;
use super::{IdlError, IdlResult};
use crate::config::PACKAGE_MAGIC;

/// Enum value declaration for [`TypeEntry::enumeration`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntry {
    pub ident: String,
    pub value: i64,
    pub label: String,
    pub blurb: String,
}

impl EnumEntry {
    pub fn new(ident: impl Into<String>, value: i64) -> Self {
        Self {
            ident: ident.into(),
            value,
            label: String::new(),
            blurb: String::new(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn blurb(mut self, blurb: impl Into<String>) -> Self {
        self.blurb = blurb.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TypeBody {
    None,
    Reference(String),
    Sequence(Box<TypeEntry>),
    Record(Vec<TypeEntry>),
    Enum(Vec<EnumEntry>),
    Instance(Vec<String>),
}

/// One type entry to be written into a namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeEntry {
    storage: StorageKind,
    name: String,
    aux: Vec<String>,
    body: TypeBody,
}

impl TypeEntry {
    fn with_body(storage: StorageKind, name: impl Into<String>, body: TypeBody) -> Self {
        Self {
            storage,
            name: name.into(),
            aux: Vec::new(),
            body,
        }
    }

    /// Entry without a body (`Int`, `Float`, `String`, `Any`).
    pub fn leaf(storage: StorageKind, name: impl Into<String>) -> Self {
        Self::with_body(storage, name, TypeBody::None)
    }

    pub fn reference(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::with_body(
            StorageKind::TypeReference,
            name,
            TypeBody::Reference(target.into()),
        )
    }

    pub fn sequence(name: impl Into<String>, element: TypeEntry) -> Self {
        Self::with_body(
            StorageKind::Sequence,
            name,
            TypeBody::Sequence(Box::new(element)),
        )
    }

    pub fn record(name: impl Into<String>, fields: Vec<TypeEntry>) -> Self {
        Self::with_body(StorageKind::Record, name, TypeBody::Record(fields))
    }

    pub fn enumeration(name: impl Into<String>, values: Vec<EnumEntry>) -> Self {
        Self::with_body(StorageKind::Enum, name, TypeBody::Enum(values))
    }

    pub fn instance(name: impl Into<String>, prerequisites: Vec<String>) -> Self {
        Self::with_body(
            StorageKind::Instance,
            name,
            TypeBody::Instance(prerequisites),
        )
    }

    /// Append an aux annotation (conventionally `key=value`).
    pub fn aux(mut self, entry: impl Into<String>) -> Self {
        self.aux.push(entry.into());
        self
    }

    /// Encode this entry.
    pub fn encode(&self) -> IdlResult<Vec<u8>> {
        let tag = self.storage.tag().ok_or_else(|| IdlError::InvalidFormat {
            offset: 0,
            reason: format!("entry '{}' has no storage kind", self.name),
        })?;

        let mut writer = Writer::new();
        writer.write_bytes(&tag);
        writer.write_string(&self.name)?;
        writer.write_len(self.aux.len())?;
        for entry in &self.aux {
            writer.write_string(entry)?;
        }

        if self.storage.has_item_count() {
            let count = match &self.body {
                TypeBody::Record(fields) => fields.len(),
                TypeBody::Enum(values) => values.len(),
                TypeBody::Instance(prerequisites) => prerequisites.len(),
                _ => 0,
            };
            writer.write_len(count)?;
        }

        match &self.body {
            TypeBody::None => {}
            TypeBody::Reference(target) => writer.write_string(target)?,
            TypeBody::Sequence(element) => writer.write_blob(&element.encode()?)?,
            TypeBody::Record(fields) => {
                for field in fields {
                    writer.write_blob(&field.encode()?)?;
                }
            }
            TypeBody::Enum(values) => {
                for value in values {
                    writer.write_string(&value.ident)?;
                    writer.write_string(&value.value.to_string())?;
                    writer.write_string(&value.label)?;
                    writer.write_string(&value.blurb)?;
                }
            }
            TypeBody::Instance(prerequisites) => {
                for name in prerequisites {
                    writer.write_string(name)?;
                }
            }
        }

        Ok(writer.into_inner())
    }
}

/// Write an offset table over already encoded entries.
fn write_offset_table(writer: &mut Writer, entries: &[Vec<u8>]) -> IdlResult<()> {
    writer.write_len(entries.len())?;
    let mut offset = 0usize;
    for entry in entries {
        writer.write_len(offset)?;
        offset += entry.len();
    }
    writer.write_len(offset)?;
    for entry in entries {
        writer.write_bytes(entry);
    }
    Ok(())
}

/// Builder for a complete type package.
///
/// ```
/// use plic::idl::{PackageBuilder, TypeEntry, StorageKind};
///
/// let bytes = PackageBuilder::new("pkg")
///     .namespace("Foo", Vec::new())
///     .build()
///     .unwrap();
/// assert!(bytes.starts_with(b"PlicTypePkg_01\r\n"));
/// ```
#[derive(Debug, Clone)]
pub struct PackageBuilder {
    name: String,
    namespaces: Vec<(String, Vec<TypeEntry>)>,
}

impl PackageBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespaces: Vec::new(),
        }
    }

    /// Add a namespace with its types.
    pub fn namespace(mut self, full_name: impl Into<String>, types: Vec<TypeEntry>) -> Self {
        self.namespaces.push((full_name.into(), types));
        self
    }

    /// Encode the package.
    pub fn build(&self) -> IdlResult<Vec<u8>> {
        let mut namespace_entries = Vec::with_capacity(self.namespaces.len());
        for (full_name, types) in &self.namespaces {
            let type_entries = types
                .iter()
                .map(TypeEntry::encode)
                .collect::<IdlResult<Vec<_>>>()?;
            let mut entry = Writer::new();
            entry.write_string(full_name)?;
            write_offset_table(&mut entry, &type_entries)?;
            namespace_entries.push(entry.into_inner());
        }

        let mut writer = Writer::new();
        writer.write_bytes(PACKAGE_MAGIC);
        writer.write_string(&self.name)?;
        write_offset_table(&mut writer, &namespace_entries)?;

        log::debug!(
            "[idl] built package '{}': {} namespaces, {} bytes",
            self.name,
            self.namespaces.len(),
            writer.len()
        );
        Ok(writer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idl::{parse_string, OffsetTable, TypeInfo};

    #[test]
    fn test_empty_namespace_layout() {
        let bytes = PackageBuilder::new("pkg")
            .namespace("Foo", Vec::new())
            .build()
            .unwrap();

        let mut expected = PACKAGE_MAGIC.to_vec();
        expected.extend_from_slice(b"0003pkg\0");
        // namespace table: count=1, offset 0, tail=16
        expected.extend_from_slice(b"000100000016");
        // namespace entry: "Foo", then type table count=0, tail=0
        expected.extend_from_slice(b"0003Foo\0");
        expected.extend_from_slice(b"00000000");
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_entry_encoding_parses_back() {
        let entry = TypeEntry::record(
            "Point",
            vec![
                TypeEntry::leaf(StorageKind::Int, "x"),
                TypeEntry::leaf(StorageKind::Int, "y").aux("label=Y"),
            ],
        )
        .aux("blurb=2D point");
        let bytes = entry.encode().unwrap();
        let info = TypeInfo::from_bytes(&bytes).unwrap();
        assert_eq!(info.item_count(), 2);
        assert_eq!(info.aux_value("blurb"), Some("2D point"));
        assert_eq!(info.fields().unwrap()[1].aux_value("label"), Some("Y"));
    }

    #[test]
    fn test_untyped_entry_rejected() {
        let entry = TypeEntry::leaf(StorageKind::Untyped, "nothing");
        assert!(matches!(
            entry.encode(),
            Err(IdlError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_namespace_table_validates() {
        let bytes = PackageBuilder::new("p")
            .namespace("A", vec![TypeEntry::leaf(StorageKind::Float, "f")])
            .namespace("B", vec![TypeEntry::leaf(StorageKind::String, "s")])
            .build()
            .unwrap();
        let (_, next) = parse_string(&bytes, PACKAGE_MAGIC.len()).unwrap();
        let table = OffsetTable::validate(&bytes, next).unwrap();
        assert_eq!(table.len(), 2);
    }
}
