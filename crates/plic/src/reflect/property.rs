// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Named, typed accessors on host objects.
//!
//! A [`Property`] reads and writes one member of a host type `H` as an
//! [`Any`]; the string accessors are layered on top through
//! [`marshal`](super::marshal). A [`PropertyList`] aggregates properties
//! from its own array and up to [`MAX_PARENT_LISTS`] parent lists, keeping
//! each property once.

use super::enum_info::EnumInfo;
use super::marshal;
use super::PropertyError;
use crate::any::{Any, FromAny, TypeKind};
use crate::config::MAX_PARENT_LISTS;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Numeric bounds of a property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl PropertyRange {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// `true` if a `:`-separated hint token made of `r`/`w` letters contains
/// `flag`.
fn hint_flag(hints: &str, flag: char) -> bool {
    hints.split(':').any(|token| {
        !token.is_empty() && token.chars().all(|c| c == 'r' || c == 'w') && token.contains(flag)
    })
}

/// One reflected member of `H`.
pub trait Property<H: ?Sized>: Send + Sync {
    fn ident(&self) -> &str;
    fn label(&self) -> &str;
    fn blurb(&self) -> &str;

    /// `:`-separated hints; `r`/`w`/`rw` tokens grant access.
    fn hints(&self) -> &str;

    fn kind(&self) -> TypeKind;

    fn range(&self) -> Option<PropertyRange> {
        None
    }

    /// Enum metadata for `Enum` properties.
    fn enum_info(&self) -> Option<&EnumInfo> {
        None
    }

    fn readable(&self) -> bool {
        hint_flag(self.hints(), 'r')
    }

    fn writable(&self) -> bool {
        hint_flag(self.hints(), 'w')
    }

    fn get_value(&self, host: &H) -> Result<Any, PropertyError>;

    fn set_value(&self, host: &mut H, value: &Any) -> Result<(), PropertyError>;

    fn get_string(&self, host: &H) -> Result<String, PropertyError> {
        let value = self.get_value(host)?;
        Ok(marshal::any_to_string(&value, self.enum_info())?)
    }

    fn set_string(&self, host: &mut H, text: &str) -> Result<(), PropertyError> {
        let value = marshal::string_to_any(text, self.kind(), self.enum_info())?;
        self.set_value(host, &value)
    }
}

type Getter<H> = Box<dyn Fn(&H) -> Any + Send + Sync>;
type Setter<H> = Box<dyn Fn(&mut H, &Any) -> Result<(), PropertyError> + Send + Sync>;

/// Closure-backed property, built with [`PropertyBuilder`].
pub struct FnProperty<H: ?Sized> {
    ident: String,
    label: String,
    blurb: String,
    hints: String,
    kind: TypeKind,
    range: Option<PropertyRange>,
    enum_info: Option<Arc<EnumInfo>>,
    getter: Option<Getter<H>>,
    setter: Option<Setter<H>>,
}

impl<H: ?Sized> fmt::Debug for FnProperty<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProperty")
            .field("ident", &self.ident)
            .field("kind", &self.kind)
            .field("hints", &self.hints)
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}

impl<H: ?Sized> Property<H> for FnProperty<H> {
    fn ident(&self) -> &str {
        &self.ident
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn blurb(&self) -> &str {
        &self.blurb
    }

    fn hints(&self) -> &str {
        &self.hints
    }

    fn kind(&self) -> TypeKind {
        self.kind
    }

    fn range(&self) -> Option<PropertyRange> {
        self.range
    }

    fn enum_info(&self) -> Option<&EnumInfo> {
        self.enum_info.as_deref()
    }

    fn get_value(&self, host: &H) -> Result<Any, PropertyError> {
        match &self.getter {
            Some(getter) if self.readable() => Ok(getter(host)),
            _ => Err(PropertyError::WriteOnly(self.ident.clone())),
        }
    }

    fn set_value(&self, host: &mut H, value: &Any) -> Result<(), PropertyError> {
        let setter = match &self.setter {
            Some(setter) if self.writable() => setter,
            _ => return Err(PropertyError::ReadOnly(self.ident.clone())),
        };
        if let (Some(range), Some(number)) = (self.range, value.as_float()) {
            if !range.contains(number) {
                return Err(PropertyError::InvalidValue {
                    property: self.ident.clone(),
                    reason: format!("{} outside [{}, {}]", number, range.min, range.max),
                });
            }
        }
        setter(host, value)
    }
}

/// Builder for [`FnProperty`].
///
/// Without explicit hints, access follows the closures given: `r` with a
/// getter, `w` with a setter.
pub struct PropertyBuilder<H: ?Sized> {
    property: FnProperty<H>,
}

impl<H: ?Sized + 'static> PropertyBuilder<H> {
    pub fn new(ident: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            property: FnProperty {
                ident: ident.into(),
                label: String::new(),
                blurb: String::new(),
                hints: String::new(),
                kind,
                range: None,
                enum_info: None,
                getter: None,
                setter: None,
            },
        }
    }

    /// Bool property over a plain getter/setter pair.
    pub fn bool<G, S>(ident: impl Into<String>, get: G, set: S) -> Self
    where
        G: Fn(&H) -> bool + Send + Sync + 'static,
        S: Fn(&mut H, bool) + Send + Sync + 'static,
    {
        Self::typed(ident, TypeKind::Bool, get, set)
    }

    pub fn int<G, S>(ident: impl Into<String>, get: G, set: S) -> Self
    where
        G: Fn(&H) -> i64 + Send + Sync + 'static,
        S: Fn(&mut H, i64) + Send + Sync + 'static,
    {
        Self::typed(ident, TypeKind::Int64, get, set)
    }

    pub fn float<G, S>(ident: impl Into<String>, get: G, set: S) -> Self
    where
        G: Fn(&H) -> f64 + Send + Sync + 'static,
        S: Fn(&mut H, f64) + Send + Sync + 'static,
    {
        Self::typed(ident, TypeKind::Float64, get, set)
    }

    pub fn string<G, S>(ident: impl Into<String>, get: G, set: S) -> Self
    where
        G: Fn(&H) -> String + Send + Sync + 'static,
        S: Fn(&mut H, String) + Send + Sync + 'static,
    {
        Self::typed(ident, TypeKind::String, get, set)
    }

    /// Enum property storing the raw value; `info` names the values.
    pub fn enumeration<G, S>(ident: impl Into<String>, info: Arc<EnumInfo>, get: G, set: S) -> Self
    where
        G: Fn(&H) -> i64 + Send + Sync + 'static,
        S: Fn(&mut H, i64) + Send + Sync + 'static,
    {
        let type_name = info.full_name();
        Self::new(ident, TypeKind::Enum)
            .enum_info(info)
            .getter(move |host| Any::from_enum(type_name.clone(), get(host)))
            .setter(move |host, value| {
                set(host, i64::from_any(value)?);
                Ok(())
            })
    }

    fn typed<T, G, S>(ident: impl Into<String>, kind: TypeKind, get: G, set: S) -> Self
    where
        T: Into<Any> + FromAny + 'static,
        G: Fn(&H) -> T + Send + Sync + 'static,
        S: Fn(&mut H, T) + Send + Sync + 'static,
    {
        Self::new(ident, kind)
            .getter(move |host| get(host).into())
            .setter(move |host, value| {
                set(host, T::from_any(value)?);
                Ok(())
            })
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.property.label = label.into();
        self
    }

    pub fn blurb(mut self, blurb: impl Into<String>) -> Self {
        self.property.blurb = blurb.into();
        self
    }

    pub fn hints(mut self, hints: impl Into<String>) -> Self {
        self.property.hints = hints.into();
        self
    }

    pub fn range(mut self, min: f64, max: f64, step: f64) -> Self {
        self.property.range = Some(PropertyRange::new(min, max, step));
        self
    }

    pub fn enum_info(mut self, info: Arc<EnumInfo>) -> Self {
        self.property.enum_info = Some(info);
        self
    }

    pub fn getter<G>(mut self, getter: G) -> Self
    where
        G: Fn(&H) -> Any + Send + Sync + 'static,
    {
        self.property.getter = Some(Box::new(getter));
        self
    }

    pub fn setter<S>(mut self, setter: S) -> Self
    where
        S: Fn(&mut H, &Any) -> Result<(), PropertyError> + Send + Sync + 'static,
    {
        self.property.setter = Some(Box::new(setter));
        self
    }

    pub fn build(self) -> FnProperty<H> {
        let mut property = self.property;
        if property.hints.is_empty() {
            property.hints = match (property.getter.is_some(), property.setter.is_some()) {
                (true, true) => "rw",
                (true, false) => "r",
                (false, true) => "w",
                (false, false) => "",
            }
            .to_string();
        }
        property
    }

    /// Build and wrap for a [`PropertyList`].
    pub fn shared(self) -> PropertyRef<H> {
        Arc::new(self.build())
    }
}

/// Shared property handle; identity is the allocation.
pub type PropertyRef<H> = Arc<dyn Property<H>>;

type NameIndex = HashMap<String, usize>;

fn identity<H: ?Sized>(property: &PropertyRef<H>) -> *const () {
    Arc::as_ptr(property) as *const ()
}

/// Ordered, de-duplicated aggregation of properties.
///
/// Own entries come first, then each parent's in order. The name index is
/// built on first lookup and kept until the list changes.
pub struct PropertyList<H: ?Sized> {
    properties: Vec<PropertyRef<H>>,
    index: Mutex<Option<Arc<NameIndex>>>,
}

impl<H: ?Sized> Default for PropertyList<H> {
    fn default() -> Self {
        Self {
            properties: Vec::new(),
            index: Mutex::new(None),
        }
    }
}

impl<H: ?Sized> Clone for PropertyList<H> {
    fn clone(&self) -> Self {
        Self {
            properties: self.properties.clone(),
            index: Mutex::new(None),
        }
    }
}

impl<H: ?Sized> fmt::Debug for PropertyList<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyList")
            .field("properties", &self.names())
            .finish()
    }
}

impl<H: ?Sized> PropertyList<H> {
    pub fn new(properties: &[PropertyRef<H>]) -> Self {
        let mut list = Self::default();
        list.merge(properties, &[]);
        list
    }

    /// Own properties followed by those of up to `MAX_PARENT_LISTS`
    /// parents.
    pub fn with_parents(
        properties: &[PropertyRef<H>],
        parents: &[&PropertyList<H>],
    ) -> Result<Self, PropertyError> {
        let mut list = Self::default();
        list.append_properties(properties, parents)?;
        Ok(list)
    }

    /// Merge `properties` and the parents' entries, skipping any property
    /// already present.
    pub fn append_properties(
        &mut self,
        properties: &[PropertyRef<H>],
        parents: &[&PropertyList<H>],
    ) -> Result<(), PropertyError> {
        if parents.len() > MAX_PARENT_LISTS {
            return Err(PropertyError::TooManyParents {
                count: parents.len(),
            });
        }
        self.merge(properties, parents);
        Ok(())
    }

    fn merge(&mut self, properties: &[PropertyRef<H>], parents: &[&PropertyList<H>]) {
        let mut seen: HashSet<*const ()> = self.properties.iter().map(identity).collect();
        let incoming = properties
            .iter()
            .chain(parents.iter().flat_map(|parent| parent.properties.iter()));
        for property in incoming {
            if seen.insert(identity(property)) {
                self.properties.push(Arc::clone(property));
            }
        }
        *self.index.get_mut() = None;
    }

    pub fn properties(&self) -> &[PropertyRef<H>] {
        &self.properties
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.properties.iter().map(|p| p.ident()).collect()
    }

    /// The lock only guards the cache slot; `ident()` runs unlocked.
    fn name_index(&self) -> Arc<NameIndex> {
        let cached = self.index.lock().clone();
        if let Some(index) = cached {
            return index;
        }
        let mut index = NameIndex::with_capacity(self.properties.len());
        for (position, property) in self.properties.iter().enumerate() {
            index.entry(property.ident().to_string()).or_insert(position);
        }
        log::trace!("[property] indexed {} properties", index.len());
        let index = Arc::new(index);
        *self.index.lock() = Some(Arc::clone(&index));
        index
    }

    /// Property named `name`; `foo_bar` also finds `foo-bar`.
    pub fn lookup_by_name(&self, name: &str) -> Option<&PropertyRef<H>> {
        let index = self.name_index();
        let position = match index.get(name) {
            Some(position) => *position,
            None => *index.get(&name.replace('_', "-"))?,
        };
        self.properties.get(position)
    }

    fn require(&self, name: &str) -> Result<&PropertyRef<H>, PropertyError> {
        self.lookup_by_name(name).ok_or_else(|| {
            log::debug!("[property] no property named '{}'", name);
            PropertyError::NotFound(name.to_string())
        })
    }

    pub fn get_value(&self, host: &H, name: &str) -> Result<Any, PropertyError> {
        self.require(name)?.get_value(host)
    }

    pub fn set_value(&self, host: &mut H, name: &str, value: &Any) -> Result<(), PropertyError> {
        self.require(name)?.set_value(host, value)
    }

    pub fn get_string(&self, host: &H, name: &str) -> Result<String, PropertyError> {
        self.require(name)?.get_string(host)
    }

    pub fn set_string(&self, host: &mut H, name: &str, text: &str) -> Result<(), PropertyError> {
        self.require(name)?.set_string(host, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::any::AnyError;
    use crate::reflect::EnumValue;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{OnceLock, Weak};

    #[derive(Debug, Default)]
    struct Knob {
        enabled: bool,
        level: i64,
        gain: f64,
        caption: String,
        mode: i64,
    }

    fn mode_info() -> Arc<EnumInfo> {
        Arc::new(EnumInfo::new(
            "Audio",
            "Mode",
            vec![EnumValue::new(0, "MODE_MONO"), EnumValue::new(1, "MODE_STEREO")],
        ))
    }

    fn knob_properties() -> Vec<PropertyRef<Knob>> {
        vec![
            PropertyBuilder::bool("enabled", |k: &Knob| k.enabled, |k: &mut Knob, v| k.enabled = v).shared(),
            PropertyBuilder::int("level", |k: &Knob| k.level, |k: &mut Knob, v| k.level = v)
                .range(0.0, 10.0, 1.0)
                .shared(),
            PropertyBuilder::float("gain", |k: &Knob| k.gain, |k: &mut Knob, v| k.gain = v)
                .label("Gain")
                .blurb("Output gain")
                .shared(),
            PropertyBuilder::string("caption-text", |k: &Knob| k.caption.clone(), |k: &mut Knob, v| {
                k.caption = v
            })
            .shared(),
            PropertyBuilder::enumeration("mode", mode_info(), |k: &Knob| k.mode, |k: &mut Knob, v| k.mode = v)
                .shared(),
        ]
    }

    #[test]
    fn test_hint_flags() {
        assert!(hint_flag("rw", 'r'));
        assert!(hint_flag(":G:w:", 'w'));
        assert!(!hint_flag(":G:w:", 'r'));
        assert!(!hint_flag("range", 'r'));
        assert!(!hint_flag("", 'r'));
    }

    #[test]
    fn test_any_accessors() {
        let list = PropertyList::new(&knob_properties());
        let mut knob = Knob::default();

        list.set_value(&mut knob, "enabled", &Any::Bool(true)).unwrap();
        list.set_value(&mut knob, "level", &Any::Int32(7)).unwrap();
        assert!(knob.enabled);
        assert_eq!(knob.level, 7);
        assert_eq!(list.get_value(&knob, "level").unwrap(), Any::Int64(7));

        assert!(matches!(
            list.set_value(&mut knob, "gain", &Any::from("loud")),
            Err(PropertyError::Value(AnyError::TypeMismatch { .. }))
        ));
        assert!(matches!(
            list.get_value(&knob, "volume"),
            Err(PropertyError::NotFound(name)) if name == "volume"
        ));
    }

    #[test]
    fn test_string_accessors() {
        let list = PropertyList::new(&knob_properties());
        let mut knob = Knob::default();

        list.set_string(&mut knob, "gain", "0.75").unwrap();
        list.set_string(&mut knob, "caption_text", "Main").unwrap();
        list.set_string(&mut knob, "mode", "stereo").unwrap();
        list.set_string(&mut knob, "enabled", "yes").unwrap();

        assert_eq!(knob.gain, 0.75);
        assert_eq!(knob.caption, "Main");
        assert_eq!(knob.mode, 1);
        assert_eq!(list.get_string(&knob, "mode").unwrap(), "MODE_STEREO");
        assert_eq!(list.get_string(&knob, "enabled").unwrap(), "true");
        assert_eq!(
            list.get_value(&knob, "mode").unwrap(),
            Any::from_enum("Audio::Mode", 1)
        );
        assert!(matches!(
            list.set_string(&mut knob, "level", "high"),
            Err(PropertyError::Value(AnyError::Parse { .. }))
        ));
    }

    #[test]
    fn test_range_enforced() {
        let list = PropertyList::new(&knob_properties());
        let mut knob = Knob::default();
        assert!(matches!(
            list.set_value(&mut knob, "level", &Any::Int64(11)),
            Err(PropertyError::InvalidValue { .. })
        ));
        assert_eq!(knob.level, 0);
        let level = list.lookup_by_name("level").unwrap();
        assert_eq!(level.range(), Some(PropertyRange::new(0.0, 10.0, 1.0)));
    }

    #[test]
    fn test_access_hints() {
        let read_only: PropertyRef<Knob> = PropertyBuilder::new("serial", TypeKind::Int64)
            .getter(|_| Any::Int64(42))
            .shared();
        let write_only: PropertyRef<Knob> = PropertyBuilder::new("reset", TypeKind::Bool)
            .setter(|k: &mut Knob, _| {
                *k = Knob::default();
                Ok(())
            })
            .shared();
        let mut knob = Knob::default();

        assert!(read_only.readable() && !read_only.writable());
        assert!(matches!(
            read_only.set_value(&mut knob, &Any::Int64(1)),
            Err(PropertyError::ReadOnly(_))
        ));
        assert!(matches!(
            write_only.get_value(&knob),
            Err(PropertyError::WriteOnly(_))
        ));

        // Explicit hints override the closures.
        let locked: PropertyRef<Knob> =
            PropertyBuilder::bool("locked", |k: &Knob| k.enabled, |k: &mut Knob, v| k.enabled = v)
                .hints(":r:")
                .shared();
        assert!(!locked.writable());
    }

    #[test]
    fn test_parents_deduplicated() {
        let shared = knob_properties();
        let base = PropertyList::new(&shared[..3]);
        let middle = PropertyList::with_parents(&shared[2..], &[&base]).unwrap();
        let top = PropertyList::with_parents(&shared[..1], &[&middle, &base]).unwrap();

        assert_eq!(
            top.names(),
            vec!["enabled", "gain", "caption-text", "mode", "level"]
        );
        assert_eq!(top.len(), 5);
    }

    #[test]
    fn test_too_many_parents() {
        let base = PropertyList::<Knob>::new(&knob_properties());
        let parents: Vec<&PropertyList<Knob>> = (0..=MAX_PARENT_LISTS).map(|_| &base).collect();
        assert!(matches!(
            PropertyList::with_parents(&[], &parents),
            Err(PropertyError::TooManyParents { count: 11 })
        ));
        let parents = &parents[..MAX_PARENT_LISTS];
        assert_eq!(PropertyList::with_parents(&[], parents).unwrap().len(), 5);
    }

    /// Records whether the owning list's index lock is free when `ident()`
    /// is called.
    #[derive(Default)]
    struct LockWatcher {
        list: OnceLock<Weak<PropertyList<Knob>>>,
        called_locked: AtomicBool,
        called: AtomicBool,
    }

    impl Property<Knob> for LockWatcher {
        fn ident(&self) -> &str {
            if let Some(list) = self.list.get().and_then(Weak::upgrade) {
                self.called.store(true, Ordering::SeqCst);
                if list.index.try_lock().is_none() {
                    self.called_locked.store(true, Ordering::SeqCst);
                }
            }
            "watched"
        }

        fn label(&self) -> &str {
            ""
        }

        fn blurb(&self) -> &str {
            ""
        }

        fn hints(&self) -> &str {
            "r"
        }

        fn kind(&self) -> TypeKind {
            TypeKind::Bool
        }

        fn get_value(&self, _host: &Knob) -> Result<Any, PropertyError> {
            Ok(Any::Bool(true))
        }

        fn set_value(&self, _host: &mut Knob, _value: &Any) -> Result<(), PropertyError> {
            Err(PropertyError::ReadOnly("watched".into()))
        }
    }

    #[test]
    fn test_index_built_without_holding_lock() {
        let watcher = Arc::new(LockWatcher::default());
        let property: PropertyRef<Knob> = watcher.clone();
        let list = Arc::new(PropertyList::new(&[property]));
        watcher.list.set(Arc::downgrade(&list)).unwrap();

        assert!(list.lookup_by_name("watched").is_some());
        assert!(watcher.called.load(Ordering::SeqCst));
        assert!(!watcher.called_locked.load(Ordering::SeqCst));
        assert_eq!(list.get_value(&Knob::default(), "watched").unwrap(), Any::Bool(true));
    }

    #[test]
    fn test_index_refreshed_after_append() {
        let properties = knob_properties();
        let mut list = PropertyList::new(&properties[..1]);
        assert!(list.lookup_by_name("gain").is_none());
        list.append_properties(&properties[2..3], &[]).unwrap();
        assert!(list.lookup_by_name("gain").is_some());
        assert_eq!(list.lookup_by_name("gain").unwrap().label(), "Gain");
    }
}
