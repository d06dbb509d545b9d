// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry of type packages.
//!
//! The registry owns every registered package buffer; namespaces and type
//! infos handed out borrow from it and cannot outlive it. Registration is
//! the trust boundary: the namespace table (and, in eager mode, everything
//! below it) is validated there, and indexing later treats inconsistencies
//! as fatal.

use super::cursor::{parse_string, Cursor, StringRef};
use super::offset_table::{ByteRange, OffsetTable};
use super::type_info::{StorageKind, TypeInfo};
use super::{IdlError, IdlResult};
use crate::config::{ValidationMode, MAX_REFERENCE_DEPTH, PACKAGE_MAGIC};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug)]
struct Package {
    data: Arc<[u8]>,
    name: StringRef,
    namespaces: OffsetTable,
}

/// Decode a namespace entry: full name, then the nested type table.
fn decode_namespace(data: &[u8], range: ByteRange) -> IdlResult<(&str, OffsetTable)> {
    let entry = data.get(..range.end).ok_or(IdlError::Truncated {
        offset: range.start,
        needed: range.len(),
        available: data.len().saturating_sub(range.start),
    })?;
    let mut cursor = Cursor::at(entry, range.start);
    let full_name = cursor.read_str()?;
    let types = OffsetTable::validate(entry, cursor.offset())?;
    Ok((full_name, types))
}

/// A namespace of a registered package.
#[derive(Debug, Clone)]
pub struct TypeNamespace<'a> {
    data: &'a [u8],
    full_name: &'a str,
    types: OffsetTable,
}

impl<'a> TypeNamespace<'a> {
    pub fn fullname(&self) -> &'a str {
        self.full_name
    }

    /// Number of type entries.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Decode every type entry of this namespace.
    pub fn list_types(&self) -> Vec<TypeInfo<'a>> {
        self.types
            .ranges()
            .enumerate()
            .map(|(index, range)| self.decode_type(index, range))
            .collect()
    }

    /// First type entry named `name`.
    pub fn find_type(&self, name: &str) -> Option<TypeInfo<'a>> {
        self.list_types().into_iter().find(|info| info.name() == name)
    }

    fn decode_type(&self, index: usize, range: ByteRange) -> TypeInfo<'a> {
        let data: &'a [u8] = self.data;
        let Some(entry) = range.slice(data) else {
            super::fatal!(
                "type entry {} of namespace '{}' lies outside its package",
                index,
                self.full_name
            )
        };
        match TypeInfo::from_bytes(entry) {
            Ok(info) => info,
            Err(e) => super::fatal!(
                "type entry {} of namespace '{}' is inconsistent: {}",
                index,
                self.full_name,
                e
            ),
        }
    }
}

/// Aggregates one or more registered type packages.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    packages: Vec<Package>,
    validation: ValidationMode,
}

impl TypeRegistry {
    /// Create an empty registry with eager validation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with the given validation mode.
    pub fn with_validation(validation: ValidationMode) -> Self {
        Self {
            packages: Vec::new(),
            validation,
        }
    }

    pub fn validation(&self) -> ValidationMode {
        self.validation
    }

    /// Validate and register a package buffer.
    ///
    /// The buffer is kept as is; nothing decoded from it is copied.
    pub fn register_package(&mut self, buf: impl Into<Arc<[u8]>>) -> IdlResult<()> {
        let data: Arc<[u8]> = buf.into();

        if !data.starts_with(PACKAGE_MAGIC) {
            return Err(IdlError::BadMagic);
        }
        let (name, next) = parse_string(&data, PACKAGE_MAGIC.len())?;
        let package_name = name.as_str(&data)?;
        let namespaces = OffsetTable::validate(&data, next)?;

        if self.validation == ValidationMode::Eager {
            for range in namespaces.ranges() {
                let (_, types) = decode_namespace(&data, range)?;
                for type_range in types.ranges() {
                    let entry = type_range.slice(&data).ok_or(IdlError::Truncated {
                        offset: type_range.start,
                        needed: type_range.len(),
                        available: data.len().saturating_sub(type_range.start),
                    })?;
                    TypeInfo::from_bytes(entry)?;
                }
            }
        }

        log::debug!(
            "[idl] registered package '{}': {} namespaces, {} bytes ({:?} validation)",
            package_name,
            namespaces.len(),
            data.len(),
            self.validation
        );

        self.packages.push(Package {
            data,
            name,
            namespaces,
        });
        Ok(())
    }

    /// Read a package file and register it.
    pub fn register_file(&mut self, path: impl AsRef<Path>) -> IdlResult<()> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        log::debug!("[idl] loading package file {}", path.display());
        self.register_package(bytes)
    }

    /// Number of registered packages.
    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    /// Names of registered packages, in registration order.
    pub fn package_names(&self) -> Vec<&str> {
        self.packages
            .iter()
            .map(|package| match package.name.as_str(&package.data) {
                Ok(name) => name,
                Err(e) => super::fatal!("registered package name became invalid: {}", e),
            })
            .collect()
    }

    /// Decode every namespace of every registered package.
    pub fn list_namespaces(&self) -> Vec<TypeNamespace<'_>> {
        let mut namespaces = Vec::new();
        for package in &self.packages {
            for (index, range) in package.namespaces.ranges().enumerate() {
                match decode_namespace(&package.data, range) {
                    Ok((full_name, types)) => namespaces.push(TypeNamespace {
                        data: &package.data,
                        full_name,
                        types,
                    }),
                    Err(e) => super::fatal!("namespace entry {} is inconsistent: {}", index, e),
                }
            }
        }
        namespaces
    }

    /// First namespace called `full_name`.
    pub fn find_namespace(&self, full_name: &str) -> Option<TypeNamespace<'_>> {
        self.list_namespaces()
            .into_iter()
            .find(|namespace| namespace.fullname() == full_name)
    }

    /// Look up a type by `Namespace::Name`, or by bare name across all
    /// namespaces.
    pub fn find_type(&self, name: &str) -> Option<TypeInfo<'_>> {
        self.find_scoped("", name).map(|(_, info)| info)
    }

    /// Qualified names are absolute. A bare name is searched in `scope`
    /// first, then in every namespace in registration order.
    fn find_scoped(&self, scope: &str, name: &str) -> Option<(&str, TypeInfo<'_>)> {
        if let Some((namespace, type_name)) = name.rsplit_once("::") {
            let namespace = self.find_namespace(namespace)?;
            let info = namespace.find_type(type_name)?;
            return Some((namespace.fullname(), info));
        }
        let namespaces = self.list_namespaces();
        namespaces
            .iter()
            .filter(|namespace| !scope.is_empty() && namespace.fullname() == scope)
            .chain(namespaces.iter())
            .find_map(|namespace| {
                namespace
                    .find_type(name)
                    .map(|info| (namespace.fullname(), info))
            })
    }

    /// Follow type references until a concrete type is reached.
    ///
    /// Bare target names are searched across all namespaces and the first
    /// match wins; use [`TypeRegistry::resolve_in`] when the namespace of
    /// `info` is known. Returns `None` for dangling references and for
    /// chains longer than `MAX_REFERENCE_DEPTH` (cycles).
    pub fn resolve<'r>(&'r self, info: &TypeInfo<'r>) -> Option<TypeInfo<'r>> {
        self.resolve_in("", info)
    }

    /// Like [`TypeRegistry::resolve`] for a type declared in `namespace`:
    /// bare targets are looked up in the namespace of the referencing entry
    /// before the global search.
    pub fn resolve_in<'r>(&'r self, namespace: &str, info: &TypeInfo<'r>) -> Option<TypeInfo<'r>> {
        let mut scope = namespace;
        let mut current = info.clone();
        for _ in 0..MAX_REFERENCE_DEPTH {
            if current.storage() != StorageKind::TypeReference {
                return Some(current);
            }
            let target = current.reference_name().ok()?;
            (scope, current) = match self.find_scoped(scope, target) {
                Some(found) => found,
                None => {
                    log::debug!("[idl] dangling type reference to '{}'", target);
                    return None;
                }
            };
        }
        log::warn!(
            "[idl] type reference chain from '{}' exceeds depth {}",
            info.name(),
            MAX_REFERENCE_DEPTH
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idl::{EnumEntry, PackageBuilder, TypeEntry, Writer};

    fn geo_package() -> Vec<u8> {
        PackageBuilder::new("geo")
            .namespace(
                "Geo",
                vec![
                    TypeEntry::record(
                        "Point",
                        vec![
                            TypeEntry::leaf(StorageKind::Float, "x"),
                            TypeEntry::leaf(StorageKind::Float, "y"),
                        ],
                    ),
                    TypeEntry::reference("Origin", "Geo::Point"),
                    TypeEntry::reference("Alias", "Origin"),
                    TypeEntry::enumeration(
                        "Axis",
                        vec![EnumEntry::new("AXIS_X", 0), EnumEntry::new("AXIS_Y", 1)],
                    ),
                ],
            )
            .namespace("Geo::Extra", vec![TypeEntry::leaf(StorageKind::String, "Tag")])
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_and_list() {
        let mut registry = TypeRegistry::new();
        registry.register_package(geo_package()).unwrap();

        assert_eq!(registry.package_names(), vec!["geo"]);
        let namespaces = registry.list_namespaces();
        assert_eq!(namespaces.len(), 2);
        assert_eq!(namespaces[0].fullname(), "Geo");
        assert_eq!(namespaces[0].type_count(), 4);
        let names: Vec<&str> = namespaces[0].list_types().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["Point", "Origin", "Alias", "Axis"]);
    }

    #[test]
    fn test_bad_magic() {
        let mut registry = TypeRegistry::new();
        let mut bytes = geo_package();
        bytes[0] = b'Q';
        assert!(matches!(
            registry.register_package(bytes),
            Err(IdlError::BadMagic)
        ));
        assert!(matches!(
            registry.register_package(&b"Plic"[..]),
            Err(IdlError::BadMagic)
        ));
        assert_eq!(registry.package_count(), 0);
    }

    #[test]
    fn test_truncated_package_rejected() {
        let bytes = geo_package();
        let mut registry = TypeRegistry::new();
        for cut in [PACKAGE_MAGIC.len() + 2, PACKAGE_MAGIC.len() + 8, bytes.len() - 1] {
            assert!(registry.register_package(&bytes[..cut]).is_err(), "cut {}", cut);
        }
        assert_eq!(registry.package_count(), 0);
    }

    /// Package whose single namespace holds one unparsable type entry.
    fn package_with_bad_type() -> Vec<u8> {
        let mut bad_type = Writer::new();
        bad_type.write_bytes(b"\n__z");
        bad_type.write_string("broken").unwrap();
        bad_type.write_int(0).unwrap();
        let bad_type = bad_type.into_inner();

        let mut namespace = Writer::new();
        namespace.write_string("Bad").unwrap();
        namespace.write_int(1).unwrap();
        namespace.write_int(0).unwrap();
        namespace.write_len(bad_type.len()).unwrap();
        namespace.write_bytes(&bad_type);
        let namespace = namespace.into_inner();

        let mut package = Writer::new();
        package.write_bytes(PACKAGE_MAGIC);
        package.write_string("bad").unwrap();
        package.write_int(1).unwrap();
        package.write_int(0).unwrap();
        package.write_len(namespace.len()).unwrap();
        package.write_bytes(&namespace);
        package.into_inner()
    }

    #[test]
    fn test_eager_validation_rejects_bad_type() {
        let mut registry = TypeRegistry::new();
        assert!(matches!(
            registry.register_package(package_with_bad_type()),
            Err(IdlError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_lazy_validation_defers_type_checks() {
        let mut registry = TypeRegistry::with_validation(ValidationMode::Lazy);
        registry.register_package(package_with_bad_type()).unwrap();
        let namespaces = registry.list_namespaces();
        assert_eq!(namespaces[0].fullname(), "Bad");
        assert_eq!(namespaces[0].type_count(), 1);
        // list_types() would abort here; only the table is inspected.
    }

    #[test]
    fn test_find_and_resolve() {
        let mut registry = TypeRegistry::new();
        registry.register_package(geo_package()).unwrap();

        let point = registry.find_type("Geo::Point").unwrap();
        assert_eq!(point.storage(), StorageKind::Record);
        assert_eq!(
            registry.find_type("Geo::Extra::Tag").unwrap().storage(),
            StorageKind::String
        );
        assert!(registry.find_type("Geo::Missing").is_none());
        assert!(registry.find_type("Nowhere::Point").is_none());

        let alias = registry.find_type("Alias").unwrap();
        let resolved = registry.resolve(&alias).unwrap();
        assert_eq!(resolved.name(), "Point");
        assert_eq!(registry.resolve(&point).unwrap(), point);
    }

    #[test]
    fn test_resolve_cycle_and_dangling() {
        let bytes = PackageBuilder::new("loop")
            .namespace(
                "L",
                vec![
                    TypeEntry::reference("A", "L::B"),
                    TypeEntry::reference("B", "L::A"),
                    TypeEntry::reference("C", "L::Nope"),
                ],
            )
            .build()
            .unwrap();
        let mut registry = TypeRegistry::new();
        registry.register_package(bytes).unwrap();
        let a = registry.find_type("L::A").unwrap();
        assert!(registry.resolve(&a).is_none());
        let c = registry.find_type("L::C").unwrap();
        assert!(registry.resolve(&c).is_none());
    }

    #[test]
    fn test_resolve_in_prefers_own_namespace() {
        let bytes = PackageBuilder::new("scoped")
            .namespace(
                "A",
                vec![
                    TypeEntry::leaf(StorageKind::Int, "Target"),
                    TypeEntry::reference("Hop", "Target"),
                ],
            )
            .namespace(
                "B",
                vec![
                    TypeEntry::leaf(StorageKind::String, "Target"),
                    TypeEntry::reference("Ref", "Target"),
                    TypeEntry::reference("Via", "A::Hop"),
                ],
            )
            .build()
            .unwrap();
        let mut registry = TypeRegistry::new();
        registry.register_package(bytes).unwrap();

        let reference = registry.find_type("B::Ref").unwrap();
        assert_eq!(
            registry.resolve_in("B", &reference).unwrap().storage(),
            StorageKind::String
        );
        // Without a scope the first namespace declaring the name wins.
        assert_eq!(registry.resolve(&reference).unwrap().storage(), StorageKind::Int);

        // The scope follows the chain into the namespace of each hop.
        let via = registry.find_type("B::Via").unwrap();
        assert_eq!(
            registry.resolve_in("B", &via).unwrap().storage(),
            StorageKind::Int
        );
    }

    /// Package whose namespace entry carries a type table with a bad tail.
    fn package_with_bad_namespace() -> Vec<u8> {
        let mut namespace = Writer::new();
        namespace.write_string("Broken").unwrap();
        namespace.write_int(0).unwrap();
        namespace.write_int(5).unwrap();
        let namespace = namespace.into_inner();

        let mut package = Writer::new();
        package.write_bytes(PACKAGE_MAGIC);
        package.write_string("broken").unwrap();
        package.write_int(1).unwrap();
        package.write_int(0).unwrap();
        package.write_len(namespace.len()).unwrap();
        package.write_bytes(&namespace);
        package.into_inner()
    }

    const FATAL_CHILD_ENV: &str = "PLIC_FATAL_CHILD";

    /// Re-run test `name` in a child process with `FATAL_CHILD_ENV` set and
    /// assert that it aborted.
    fn assert_child_aborts(name: &str) {
        let exe = std::env::current_exe().unwrap();
        let output = std::process::Command::new(exe)
            .args([name, "--exact", "--nocapture", "--test-threads=1"])
            .env(FATAL_CHILD_ENV, "1")
            .output()
            .unwrap();
        assert!(
            !output.status.success(),
            "child returned normally: {}",
            String::from_utf8_lossy(&output.stdout)
        );
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            // SIGABRT
            assert_eq!(output.status.signal(), Some(6));
        }
    }

    #[test]
    fn test_lazy_list_types_aborts_on_bad_entry() {
        if std::env::var_os(FATAL_CHILD_ENV).is_some() {
            let mut registry = TypeRegistry::with_validation(ValidationMode::Lazy);
            registry.register_package(package_with_bad_type()).unwrap();
            let types = registry.list_namespaces()[0].list_types();
            // Reaching this point makes the parent assertion fail.
            println!("decoded {} types", types.len());
            return;
        }
        assert_child_aborts("idl::registry::tests::test_lazy_list_types_aborts_on_bad_entry");
    }

    #[test]
    fn test_lazy_list_namespaces_aborts_on_bad_table() {
        if std::env::var_os(FATAL_CHILD_ENV).is_some() {
            let mut registry = TypeRegistry::with_validation(ValidationMode::Lazy);
            registry.register_package(package_with_bad_namespace()).unwrap();
            let namespaces = registry.list_namespaces();
            println!("decoded {} namespaces", namespaces.len());
            return;
        }
        // Eager mode refuses the same package up front.
        assert!(matches!(
            TypeRegistry::new().register_package(package_with_bad_namespace()),
            Err(IdlError::InvalidTable { .. })
        ));
        assert_child_aborts("idl::registry::tests::test_lazy_list_namespaces_aborts_on_bad_table");
    }

    #[test]
    fn test_multiple_packages_aggregate() {
        let mut registry = TypeRegistry::new();
        registry.register_package(geo_package()).unwrap();
        registry
            .register_package(PackageBuilder::new("empty").namespace("Foo", Vec::new()).build().unwrap())
            .unwrap();
        assert_eq!(registry.package_names(), vec!["geo", "empty"]);
        assert_eq!(registry.list_namespaces().len(), 3);
        assert!(registry.find_namespace("Foo").unwrap().list_types().is_empty());
    }
}
