// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide runtime: configuration plus the enum registry.
//!
//! A [`Runtime`] can be created and passed around explicitly; [`init`] and
//! [`global`] additionally provide one shared instance for code that has
//! no handle at hand.

use crate::config::RuntimeConfig;
use crate::idl::{IdlResult, StorageKind, TypeRegistry};
use crate::reflect::{EnumInfo, EnumRegistry};
use std::sync::{Arc, OnceLock};

static GLOBAL_RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Shared state of one IDL runtime.
#[derive(Debug)]
pub struct Runtime {
    config: RuntimeConfig,
    enums: EnumRegistry,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        let enums = EnumRegistry::new().with_overwrite_warning(config.enum_overwrite_warning());
        Self { config, enums }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn enums(&self) -> &EnumRegistry {
        &self.enums
    }

    /// Empty type registry using this runtime's validation mode.
    pub fn type_registry(&self) -> TypeRegistry {
        TypeRegistry::with_validation(self.config.validation())
    }

    pub fn enlist_enum(&self, info: EnumInfo) -> Arc<EnumInfo> {
        self.enums.enlist(info)
    }

    /// Enlist every enum type of every namespace in `registry`.
    ///
    /// Returns how many were enlisted. A malformed enum body stops the scan
    /// with its parse error; enums enlisted before it stay registered.
    pub fn enlist_package_enums(&self, registry: &TypeRegistry) -> IdlResult<usize> {
        let mut count = 0;
        for namespace in registry.list_namespaces() {
            for info in namespace.list_types() {
                if info.storage() == StorageKind::Enum {
                    self.enums
                        .enlist(EnumInfo::from_type_info(namespace.fullname(), &info)?);
                    count += 1;
                }
            }
        }
        log::debug!("[runtime] enlisted {} enums from type packages", count);
        Ok(count)
    }
}

/// Install the process-wide runtime.
///
/// Only the first call installs `config`; later calls keep the existing
/// runtime and log a warning.
pub fn init(config: RuntimeConfig) -> &'static Runtime {
    let mut installed = false;
    let runtime = GLOBAL_RUNTIME.get_or_init(|| {
        installed = true;
        Runtime::new(config.clone())
    });
    if installed {
        log::debug!("[runtime] initialized: {:?}", runtime.config());
    } else if runtime.config() != &config {
        log::warn!("[runtime] already initialized, ignoring new configuration");
    }
    runtime
}

/// Process-wide runtime (creates a default one if not initialized).
pub fn global() -> &'static Runtime {
    GLOBAL_RUNTIME
        .get()
        .unwrap_or_else(|| init(RuntimeConfig::default()))
}
