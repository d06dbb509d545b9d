// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Enum introspection: name <-> value mapping and the enum registry.
//!
//! Lookups never fail hard. Values outside the declared set print as plain
//! numbers and unknown names fall back to numeric parsing, so data from a
//! newer peer still round-trips.

use crate::idl::{IdlResult, TypeInfo};
use dashmap::DashMap;
use std::sync::Arc;

/// One declared enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub value: i64,
    pub ident: String,
    pub label: String,
    pub blurb: String,
}

impl EnumValue {
    pub fn new(value: i64, ident: impl Into<String>) -> Self {
        Self {
            value,
            ident: ident.into(),
            label: String::new(),
            blurb: String::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_blurb(mut self, blurb: impl Into<String>) -> Self {
        self.blurb = blurb.into();
        self
    }
}

/// Lowercase, with `-` folded into `_`.
fn canonical_ident(s: &str) -> String {
    s.chars()
        .map(|c| if c == '-' { '_' } else { c.to_ascii_lowercase() })
        .collect()
}

/// `name` matches `ident` if both are equal after canonicalization, or if
/// `name` equals a `_`-separated tail of `ident` (`green` matches
/// `COLOR_GREEN`).
fn ident_matches(ident: &str, name: &str) -> bool {
    let ident = canonical_ident(ident);
    let name = canonical_ident(name);
    if name.is_empty() {
        return false;
    }
    ident == name
        || ident
            .strip_suffix(name.as_str())
            .is_some_and(|head| head.ends_with('_'))
}

/// Metadata of one enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumInfo {
    namespace: String,
    name: String,
    values: Vec<EnumValue>,
    flags: bool,
}

impl EnumInfo {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, values: Vec<EnumValue>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            values,
            flags: false,
        }
    }

    /// Mark as a flags enum (values combine bitwise).
    pub fn with_flags(mut self, flags: bool) -> Self {
        self.flags = flags;
        self
    }

    /// Build from an `Enum` type entry. A `flags=1` or `flags=true` aux
    /// string marks a flags enum.
    pub fn from_type_info(namespace: &str, info: &TypeInfo<'_>) -> IdlResult<Self> {
        let values = info
            .enum_values()?
            .into_iter()
            .map(|v| EnumValue::new(v.value, v.ident).with_label(v.label).with_blurb(v.blurb))
            .collect();
        let flags = matches!(info.aux_value("flags"), Some("1") | Some("true"));
        Ok(Self::new(namespace, info.name(), values).with_flags(flags))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `namespace::name`, or just `name` without a namespace.
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.namespace, self.name)
        }
    }

    pub fn values(&self) -> &[EnumValue] {
        &self.values
    }

    pub fn is_flags(&self) -> bool {
        self.flags
    }

    /// First declared entry with this value.
    pub fn find_value(&self, value: i64) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.value == value)
    }

    /// Entry named `name`: exact ident first, then identifier matching
    /// (case-insensitive, `-` equals `_`, tail of the ident).
    pub fn find_value_by_name(&self, name: &str) -> Option<&EnumValue> {
        let name = name.trim();
        self.values
            .iter()
            .find(|v| v.ident == name)
            .or_else(|| self.values.iter().find(|v| ident_matches(&v.ident, name)))
    }

    /// Ident of `value`, or its decimal form if undeclared.
    ///
    /// Flags enums render set bits as `A|B`, followed by any undeclared
    /// remainder in decimal.
    pub fn value_to_string(&self, value: i64) -> String {
        if let Some(entry) = self.find_value(value) {
            return entry.ident.clone();
        }
        if !self.flags || value == 0 {
            return value.to_string();
        }

        let mut parts = Vec::new();
        let mut rest = value;
        for entry in &self.values {
            if entry.value != 0 && rest & entry.value == entry.value {
                parts.push(entry.ident.clone());
                rest &= !entry.value;
            }
        }
        if rest != 0 {
            parts.push(rest.to_string());
        }
        parts.join("|")
    }

    /// Inverse of [`EnumInfo::value_to_string`].
    ///
    /// Unknown names are parsed as integers; anything else yields 0 with a
    /// warning.
    pub fn value_from_string(&self, text: &str) -> i64 {
        if self.flags {
            text.split('|')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .fold(0, |acc, token| acc | self.token_value(token))
        } else {
            self.token_value(text.trim())
        }
    }

    fn token_value(&self, token: &str) -> i64 {
        if let Some(entry) = self.find_value_by_name(token) {
            return entry.value;
        }
        match token.parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                log::warn!(
                    "[enum] {}: unknown value '{}', using 0",
                    self.full_name(),
                    token
                );
                0
            }
        }
    }
}

/// Process-wide `namespace::name -> EnumInfo` map.
///
/// Enlisting an existing name replaces the entry; the same enum may be
/// enlisted by several independent bindings.
#[derive(Debug)]
pub struct EnumRegistry {
    entries: DashMap<String, Arc<EnumInfo>>,
    overwrite_warning: bool,
}

impl Default for EnumRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EnumRegistry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            overwrite_warning: true,
        }
    }

    /// Warn when an enlist replaces an entry with a different value set.
    pub fn with_overwrite_warning(mut self, enabled: bool) -> Self {
        self.overwrite_warning = enabled;
        self
    }

    /// Insert or replace; returns the shared entry.
    pub fn enlist(&self, info: EnumInfo) -> Arc<EnumInfo> {
        let full_name = info.full_name();
        let info = Arc::new(info);
        if let Some(previous) = self.entries.insert(full_name.clone(), Arc::clone(&info)) {
            if self.overwrite_warning && previous.values != info.values {
                log::warn!(
                    "[enum] {} re-enlisted with a different value set ({} -> {} values)",
                    full_name,
                    previous.values.len(),
                    info.values.len()
                );
            } else {
                log::trace!("[enum] {} re-enlisted", full_name);
            }
        } else {
            log::debug!("[enum] enlisted {} ({} values)", full_name, info.values.len());
        }
        info
    }

    pub fn lookup(&self, full_name: &str) -> Option<Arc<EnumInfo>> {
        self.entries.get(full_name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn from_nsid(&self, namespace: &str, name: &str) -> Option<Arc<EnumInfo>> {
        if namespace.is_empty() {
            self.lookup(name)
        } else {
            self.lookup(&format!("{}::{}", namespace, name))
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Enlisted full names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idl::{EnumEntry, TypeEntry};

    fn color() -> EnumInfo {
        EnumInfo::new(
            "Paint",
            "Color",
            vec![EnumValue::new(0, "RED"), EnumValue::new(1, "GREEN")],
        )
    }

    fn anchor() -> EnumInfo {
        EnumInfo::new(
            "Layout",
            "Anchor",
            vec![
                EnumValue::new(0, "ANCHOR_NONE"),
                EnumValue::new(1, "ANCHOR_NORTH"),
                EnumValue::new(2, "ANCHOR_SOUTH"),
                EnumValue::new(4, "ANCHOR_EAST_SIDE"),
            ],
        )
        .with_flags(true)
    }

    #[test]
    fn test_lookup_by_name() {
        let info = color();
        assert_eq!(info.find_value_by_name("GREEN").unwrap().value, 1);
        assert_eq!(info.find_value_by_name("green").unwrap().value, 1);
        assert_eq!(info.find_value_by_name(" red ").unwrap().value, 0);
        assert!(info.find_value_by_name("blue").is_none());
        assert!(info.find_value_by_name("").is_none());
    }

    #[test]
    fn test_identifier_tail_matching() {
        let info = anchor();
        assert_eq!(info.find_value_by_name("north").unwrap().value, 1);
        assert_eq!(info.find_value_by_name("east-side").unwrap().value, 4);
        assert_eq!(info.find_value_by_name("anchor-south").unwrap().value, 2);
        // Tails must start at a '_' boundary.
        assert!(info.find_value_by_name("orth").is_none());
        assert!(info.find_value_by_name("side").is_some());
    }

    #[test]
    fn test_undeclared_values_round_trip() {
        let info = color();
        assert_eq!(info.value_to_string(1), "GREEN");
        assert_eq!(info.value_to_string(5), "5");
        assert_eq!(info.value_from_string("5"), 5);
        assert_eq!(info.value_from_string("green"), 1);
        assert_eq!(info.value_from_string("purple"), 0);
    }

    #[test]
    fn test_flags_strings() {
        let info = anchor();
        assert_eq!(info.value_to_string(0), "ANCHOR_NONE");
        assert_eq!(info.value_to_string(3), "ANCHOR_NORTH|ANCHOR_SOUTH");
        assert_eq!(info.value_to_string(1 | 4 | 16), "ANCHOR_NORTH|ANCHOR_EAST_SIDE|16");
        assert_eq!(info.value_from_string("north | east_side"), 5);
        assert_eq!(info.value_from_string("ANCHOR_SOUTH|8"), 10);
        assert_eq!(info.value_from_string(""), 0);
    }

    #[test]
    fn test_from_type_info() {
        let bytes = TypeEntry::enumeration(
            "Anchor",
            vec![
                EnumEntry::new("ANCHOR_NORTH", 1).label("North"),
                EnumEntry::new("ANCHOR_SOUTH", 2).blurb("Bottom edge"),
            ],
        )
        .aux("flags=1")
        .encode()
        .unwrap();
        let info = TypeInfo::from_bytes(&bytes).unwrap();
        let enum_info = EnumInfo::from_type_info("Layout", &info).unwrap();

        assert!(enum_info.is_flags());
        assert_eq!(enum_info.full_name(), "Layout::Anchor");
        assert_eq!(enum_info.values()[0].label, "North");
        assert_eq!(enum_info.values()[1].blurb, "Bottom edge");
    }

    #[test]
    fn test_registry_overwrite() {
        let registry = EnumRegistry::new();
        assert!(registry.is_empty());
        registry.enlist(color());
        registry.enlist(anchor());
        let replaced = registry.enlist(EnumInfo::new("Paint", "Color", vec![EnumValue::new(7, "BLUE")]));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["Layout::Anchor", "Paint::Color"]);
        let found = registry.from_nsid("Paint", "Color").unwrap();
        assert!(Arc::ptr_eq(&found, &replaced));
        assert_eq!(found.value_to_string(7), "BLUE");
        assert!(registry.lookup("Paint::Shade").is_none());
    }

    #[test]
    fn test_registry_shared_across_threads() {
        let registry = Arc::new(EnumRegistry::new().with_overwrite_warning(false));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry.enlist(EnumInfo::new("T", format!("E{}", i), Vec::new()));
                    registry.enlist(color());
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 5);
    }
}
