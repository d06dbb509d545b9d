// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Plic Global Configuration
//!
//! This module centralizes the wire-format constants and the runtime knobs.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: Compile-time constants (package magic, field sizes,
//!   message-id bit layout, handler-id widths)
//! - **Level 2 (Dynamic)**: [`RuntimeConfig`] for behavior that embedders
//!   choose at startup (validation depth, diagnostics)
//!
//! # Example
//!
//! ```
//! use plic::config::{RuntimeConfig, ValidationMode, PACKAGE_MAGIC};
//!
//! assert_eq!(&PACKAGE_MAGIC[..12], b"PlicTypePkg_");
//!
//! let config = RuntimeConfig::new().with_validation(ValidationMode::Lazy);
//! assert_eq!(config.validation(), ValidationMode::Lazy);
//! ```

// =======================================================================
// Type Package Format
// =======================================================================

/// Package magic: format tag followed by the version line.
///
/// Every package starts with these 16 bytes, compared byte for byte.
pub const PACKAGE_MAGIC: &[u8; 16] = b"PlicTypePkg_01\r\n";

/// Size of every integer field in a package (bytes).
pub const INT_FIELD_SIZE: usize = 4;

/// String payloads are padded up to this boundary.
pub const STRING_ALIGNMENT: usize = 4;

/// Largest value the ASCII integer form can carry (four decimal digits).
pub const ASCII_INT_MAX: u32 = 9_999;

/// Largest value the packed integer form can carry.
///
/// `0x7f + (0x7f >> 1) + (0x7f >> 2) + (0x7f >> 3)`
pub const PACKED_INT_MAX: u32 = 0x7f + (0x7f >> 1) + (0x7f >> 2) + (0x7f >> 3);

/// Length of the storage tag that opens every type entry.
pub const TYPE_TAG_SIZE: usize = 4;

/// Maximum depth followed when resolving type references.
pub const MAX_REFERENCE_DEPTH: usize = 16;

// =======================================================================
// Reflection
// =======================================================================

/// Maximum number of parent lists a PropertyList may aggregate.
pub const MAX_PARENT_LISTS: usize = 10;

// =======================================================================
// Message Identifiers
// =======================================================================

/// Selects the message class byte of a message id.
pub const MSGID_CLASS_MASK: u64 = 0xFF00_0000_0000_0000;

/// Reply bit: set on every result message.
pub const MSGID_RESULT_BIT: u64 = 0x8000_0000_0000_0000;

/// Top two bits, used to detect calls that expect a result.
pub const MSGID_RESULT_CHECK_MASK: u64 = 0xC000_0000_0000_0000;

/// Top two bits of a call that expects a result (`01`).
pub const MSGID_NEEDS_RESULT_BITS: u64 = 0x4000_0000_0000_0000;

/// Bits below the class byte, free for connection/call correlation.
pub const MSGID_PAYLOAD_MASK: u64 = !MSGID_CLASS_MASK;

/// Signal handler index width (bits 0..24 of a handler id).
pub const HANDLER_INDEX_BITS: u32 = 24;

/// Connection id width (bits 24..64 of a handler id).
pub const HANDLER_CONNECTION_BITS: u32 = 40;

// =======================================================================
// Runtime Configuration
// =======================================================================

/// How much of a package is checked when it is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Validate the namespace table, every namespace entry and every type
    /// header up front. Indexing a registered package can then never hit
    /// the fatal tier.
    #[default]
    Eager,
    /// Validate only the outer namespace table. Inner entries are decoded
    /// on access and inconsistencies found there abort the process.
    Lazy,
}

impl ValidationMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "eager" | "full" => Some(Self::Eager),
            "lazy" | "outer" => Some(Self::Lazy),
            _ => None,
        }
    }
}

/// Environment variable selecting the [`ValidationMode`].
pub const ENV_VALIDATION: &str = "PLIC_VALIDATION";

/// Environment variable toggling the enum overwrite warning (`0`/`1`).
pub const ENV_ENUM_OVERWRITE_WARNING: &str = "PLIC_ENUM_OVERWRITE_WARNING";

/// Runtime configuration shared by a [`crate::runtime::Runtime`].
///
/// Cheap to clone; built with `with_*` setters.
///
/// ```
/// use plic::config::{RuntimeConfig, ValidationMode};
///
/// let config = RuntimeConfig::default().with_enum_overwrite_warning(false);
/// assert_eq!(config.validation(), ValidationMode::Eager);
/// assert!(!config.enum_overwrite_warning());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    validation: ValidationMode,
    enum_overwrite_warning: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeConfig {
    /// Create the default configuration (eager validation, warnings on).
    #[must_use]
    pub fn new() -> Self {
        Self {
            validation: ValidationMode::Eager,
            enum_overwrite_warning: true,
        }
    }

    /// Build a configuration from `PLIC_*` environment variables.
    ///
    /// Unset variables keep their default; unknown values are logged and
    /// ignored (fail-safe).
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Ok(value) = std::env::var(ENV_VALIDATION) {
            match ValidationMode::parse(&value) {
                Some(mode) => config.validation = mode,
                None => log::warn!(
                    "[config] Ignoring {}='{}' (expected 'eager' or 'lazy')",
                    ENV_VALIDATION,
                    value
                ),
            }
        }

        if let Ok(value) = std::env::var(ENV_ENUM_OVERWRITE_WARNING) {
            match value.trim() {
                "1" | "true" | "yes" | "on" => config.enum_overwrite_warning = true,
                "0" | "false" | "no" | "off" => config.enum_overwrite_warning = false,
                other => log::warn!(
                    "[config] Ignoring {}='{}' (expected 0 or 1)",
                    ENV_ENUM_OVERWRITE_WARNING,
                    other
                ),
            }
        }

        log::debug!("[config] Loaded from environment: {:?}", config);
        config
    }

    /// Set the validation mode used by registries created from this config.
    #[must_use]
    pub fn with_validation(mut self, mode: ValidationMode) -> Self {
        self.validation = mode;
        self
    }

    /// Enable or disable the warning logged when an enum registration
    /// replaces a different definition.
    #[must_use]
    pub fn with_enum_overwrite_warning(mut self, enabled: bool) -> Self {
        self.enum_overwrite_warning = enabled;
        self
    }

    #[must_use]
    pub fn validation(&self) -> ValidationMode {
        self.validation
    }

    #[must_use]
    pub fn enum_overwrite_warning(&self) -> bool {
        self.enum_overwrite_warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_layout() {
        assert_eq!(PACKAGE_MAGIC.len(), 16);
        assert_eq!(&PACKAGE_MAGIC[12..], b"01\r\n");
    }

    #[test]
    fn test_packed_int_max() {
        assert_eq!(PACKED_INT_MAX, 127 + 63 + 31 + 15);
    }

    #[test]
    fn test_msgid_masks_consistent() {
        assert_eq!(MSGID_RESULT_BIT & MSGID_CLASS_MASK, MSGID_RESULT_BIT);
        assert_eq!(MSGID_PAYLOAD_MASK, 0x00FF_FFFF_FFFF_FFFF);
        assert_eq!(HANDLER_INDEX_BITS + HANDLER_CONNECTION_BITS, 64);
    }

    #[test]
    fn test_validation_mode_parse() {
        assert_eq!(ValidationMode::parse("Lazy"), Some(ValidationMode::Lazy));
        assert_eq!(ValidationMode::parse(" eager "), Some(ValidationMode::Eager));
        assert_eq!(ValidationMode::parse("sometimes"), None);
    }

    #[test]
    fn test_builder_setters() {
        let config = RuntimeConfig::new()
            .with_validation(ValidationMode::Lazy)
            .with_enum_overwrite_warning(false);
        assert_eq!(config.validation(), ValidationMode::Lazy);
        assert!(!config.enum_overwrite_warning());
        assert_eq!(RuntimeConfig::default(), RuntimeConfig::new());
    }
}
