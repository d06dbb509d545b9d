// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Plic - IDL runtime core
//!
//! Decodes compiled IDL type packages, carries typed values generically
//! across a boundary that shares no static types, and classifies the
//! identifiers that correlate remote calls with their results.
//!
//! ## Quick Start
//!
//! ```rust
//! use plic::idl::{PackageBuilder, StorageKind, TypeEntry};
//! use plic::runtime::Runtime;
//! use plic::{Any, Result};
//!
//! fn main() -> Result<()> {
//!     let package = PackageBuilder::new("demo")
//!         .namespace("Demo", vec![TypeEntry::record(
//!             "Point",
//!             vec![
//!                 TypeEntry::leaf(StorageKind::Int, "x"),
//!                 TypeEntry::leaf(StorageKind::Int, "y"),
//!             ],
//!         )])
//!         .build()?;
//!
//!     let runtime = Runtime::default();
//!     let mut types = runtime.type_registry();
//!     types.register_package(package)?;
//!
//!     let point = types.find_type("Demo::Point").expect("registered");
//!     let value = Any::default_for("Demo", &point)?;
//!     assert_eq!(value.field("x")?, &Any::Int64(0));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +----------------------------------------------------------------+
//! |            broker / transport / UI layers (external)           |
//! +--------------------+--------------------+----------------------+
//! |  reflect           |  any               |  msgid               |
//! |  PropertyList      |  Any, TypeKind     |  MessageId           |
//! |  EnumInfo/Registry |  object handles    |  SignalHandlerId     |
//! +--------------------+--------------------+----------------------+
//! |  idl: TypeRegistry -> TypeNamespace -> TypeInfo                |
//! |       OffsetTable, Cursor/Writer (package format)              |
//! +----------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`idl`] - type package decoding and building
//! - [`any`] - the `Any` tagged value
//! - [`reflect`] - enum metadata and named property access
//! - [`msgid`] - message id and signal handler id codecs
//! - [`runtime`] - process-wide runtime object
//! - [`config`] - constants and runtime configuration
//!
//! ## Logging
//!
//! The crate logs through the `log` facade and never installs a logger.

use std::fmt;

/// Generic tagged values.
pub mod any;
/// Global configuration (format constants, runtime config).
pub mod config;
/// Type package decoding.
pub mod idl;
/// Message id and signal handler id codecs.
pub mod msgid;
/// Enum and property reflection.
pub mod reflect;
/// Process-wide runtime.
pub mod runtime;

pub use any::{Any, AnyError, AnyRecord, TypeKind};
pub use config::{RuntimeConfig, ValidationMode};
pub use idl::{IdlError, TypeInfo, TypeNamespace, TypeRegistry};
pub use msgid::{HandlerIdError, MessageClass, MessageId, SignalHandlerId};
pub use reflect::{EnumInfo, EnumRegistry, PropertyError, PropertyList};
pub use runtime::Runtime;

/// Crate-level error.
#[derive(Debug)]
pub enum Error {
    /// Type package decoding or encoding failed.
    Idl(IdlError),
    /// Checked access to an `Any` failed.
    Any(AnyError),
    /// Property access failed.
    Property(PropertyError),
    /// Signal handler id could not be packed.
    HandlerId(HandlerIdError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Idl(err) => write!(f, "IDL error: {}", err),
            Error::Any(err) => write!(f, "Any error: {}", err),
            Error::Property(err) => write!(f, "Property error: {}", err),
            Error::HandlerId(err) => write!(f, "Handler id error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Idl(err) => Some(err),
            Error::Any(err) => Some(err),
            Error::Property(err) => Some(err),
            Error::HandlerId(err) => Some(err),
        }
    }
}

impl From<IdlError> for Error {
    fn from(err: IdlError) -> Self {
        Error::Idl(err)
    }
}

impl From<AnyError> for Error {
    fn from(err: AnyError) -> Self {
        Error::Any(err)
    }
}

impl From<PropertyError> for Error {
    fn from(err: PropertyError) -> Self {
        Error::Property(err)
    }
}

impl From<HandlerIdError> for Error {
    fn from(err: HandlerIdError) -> Self {
        Error::HandlerId(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Idl(IdlError::Io(err))
    }
}

/// Result type for plic operations.
pub type Result<T> = std::result::Result<T, Error>;
