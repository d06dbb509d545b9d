// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object handles carried by `Instance` and `Local` values.

use std::fmt;
use std::sync::Arc;

/// An object that can travel inside an [`Any`](super::Any).
///
/// Equality is optional: types that cannot compare themselves keep the
/// default `dyn_eq`, and values holding them never compare equal.
pub trait AnyObject: Send + Sync + fmt::Debug + 'static {
    /// Name reported in diagnostics and `Display`.
    fn type_name(&self) -> &str;

    fn as_any(&self) -> &dyn std::any::Any;

    /// `Some(equal)` if this type knows how to compare with `other`.
    fn dyn_eq(&self, _other: &dyn AnyObject) -> Option<bool> {
        None
    }
}

/// `dyn_eq` helper for objects implementing `PartialEq`.
///
/// Objects of a different concrete type compare unequal.
pub fn eq_by_value<T: AnyObject + PartialEq>(this: &T, other: &dyn AnyObject) -> Option<bool> {
    Some(
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| this == other),
    )
}

/// Shared, reference-counted object handle.
///
/// Cloning shares the object; the pointee is never copied.
#[derive(Clone)]
pub struct ObjectHandle(Arc<dyn AnyObject>);

impl ObjectHandle {
    pub fn new<T: AnyObject>(object: T) -> Self {
        Self(Arc::new(object))
    }

    pub fn from_arc(object: Arc<dyn AnyObject>) -> Self {
        Self(object)
    }

    /// Handle for a remote object identified by `orbid`.
    pub fn remote(orbid: u64) -> Self {
        Self::new(RemoteHandle::new(orbid))
    }

    pub fn type_name(&self) -> &str {
        self.0.type_name()
    }

    pub fn downcast_ref<T: AnyObject>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Orbid if this handle wraps a [`RemoteHandle`].
    pub fn orbid(&self) -> Option<u64> {
        self.downcast_ref::<RemoteHandle>().map(RemoteHandle::orbid)
    }

    /// Both handles share the same object.
    pub fn ptr_eq(&self, other: &ObjectHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of handles sharing the object.
    pub fn share_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    pub fn as_object(&self) -> &dyn AnyObject {
        self.0.as_ref()
    }
}

impl PartialEq for ObjectHandle {
    /// Delegates to the pointee; objects without equality are never equal.
    fn eq(&self, other: &Self) -> bool {
        self.0.dyn_eq(other.0.as_ref()).unwrap_or(false)
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectHandle").field(&self.0).finish()
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.orbid() {
            Some(orbid) => write!(f, "<{} #{:#x}>", self.type_name(), orbid),
            None => write!(f, "<{}>", self.type_name()),
        }
    }
}

/// Reference to an object living on the other side of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RemoteHandle {
    orbid: u64,
}

impl RemoteHandle {
    pub const fn new(orbid: u64) -> Self {
        Self { orbid }
    }

    pub const fn orbid(&self) -> u64 {
        self.orbid
    }
}

impl AnyObject for RemoteHandle {
    fn type_name(&self) -> &str {
        "RemoteHandle"
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn dyn_eq(&self, other: &dyn AnyObject) -> Option<bool> {
        eq_by_value(self, other)
    }
}
