// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! String <-> [`Any`] marshaling for the string side of properties.

use super::enum_info::EnumInfo;
use crate::any::{Any, AnyError, TypeKind};

fn parse_error(kind: TypeKind, text: &str) -> AnyError {
    AnyError::Parse {
        kind,
        text: text.to_string(),
    }
}

/// Accepts `1/0`, `true/false`, `yes/no`, `on/off` (any case); empty is
/// false.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Render a scalar value as text.
///
/// Enum values use `info` for their idents when given. Aggregates and
/// object handles have no text form.
pub fn any_to_string(value: &Any, info: Option<&EnumInfo>) -> Result<String, AnyError> {
    match value {
        Any::Bool(v) => Ok(v.to_string()),
        Any::Enum(v) => Ok(match info {
            Some(info) => info.value_to_string(v.value),
            None => v.value.to_string(),
        }),
        Any::Any(inner) => any_to_string(inner, info),
        other => other.as_string().ok_or(AnyError::TypeMismatch {
            expected: TypeKind::String,
            got: other.kind(),
        }),
    }
}

/// Parse `text` into a value of `kind`.
pub fn string_to_any(text: &str, kind: TypeKind, info: Option<&EnumInfo>) -> Result<Any, AnyError> {
    let trimmed = text.trim();
    match kind {
        TypeKind::Bool => parse_bool(text)
            .map(Any::Bool)
            .ok_or_else(|| parse_error(kind, text)),
        TypeKind::Int32 => trimmed
            .parse::<i32>()
            .map(Any::Int32)
            .map_err(|_| parse_error(kind, text)),
        TypeKind::Int64 => trimmed
            .parse::<i64>()
            .map(Any::Int64)
            .map_err(|_| parse_error(kind, text)),
        TypeKind::Float64 => trimmed
            .parse::<f64>()
            .map(Any::Float64)
            .map_err(|_| parse_error(kind, text)),
        TypeKind::String => Ok(Any::String(text.to_string())),
        TypeKind::Enum => match info {
            Some(info) => Ok(Any::from_enum(info.full_name(), info.value_from_string(text))),
            None => trimmed
                .parse::<i64>()
                .map(|value| Any::from_enum(String::new(), value))
                .map_err(|_| parse_error(kind, text)),
        },
        other => Err(AnyError::TypeMismatch {
            expected: other,
            got: TypeKind::String,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::any::{AnyRecord, ObjectHandle};
    use crate::reflect::EnumValue;

    fn shade() -> EnumInfo {
        EnumInfo::new(
            "Paint",
            "Shade",
            vec![EnumValue::new(0, "SHADE_LIGHT"), EnumValue::new(1, "SHADE_DARK")],
        )
    }

    #[test]
    fn test_scalars_to_string() {
        assert_eq!(any_to_string(&Any::Bool(true), None).unwrap(), "true");
        assert_eq!(any_to_string(&Any::Int32(-4), None).unwrap(), "-4");
        assert_eq!(any_to_string(&Any::Float64(1.25), None).unwrap(), "1.25");
        assert_eq!(any_to_string(&Any::from("hi"), None).unwrap(), "hi");
        assert_eq!(
            any_to_string(&Any::from_enum("Paint::Shade", 1), Some(&shade())).unwrap(),
            "SHADE_DARK"
        );
        assert_eq!(any_to_string(&Any::from_enum("Paint::Shade", 1), None).unwrap(), "1");
    }

    #[test]
    fn test_aggregates_have_no_text() {
        assert!(any_to_string(&Any::Record(AnyRecord::new()), None).is_err());
        assert!(any_to_string(&Any::Local(ObjectHandle::remote(1)), None).is_err());
    }

    #[test]
    fn test_parse_by_kind() {
        assert_eq!(string_to_any("yes", TypeKind::Bool, None).unwrap(), Any::Bool(true));
        assert_eq!(string_to_any(" 12 ", TypeKind::Int32, None).unwrap(), Any::Int32(12));
        assert_eq!(string_to_any("2.5", TypeKind::Float64, None).unwrap(), Any::Float64(2.5));
        assert_eq!(string_to_any(" keep ", TypeKind::String, None).unwrap(), Any::from(" keep "));
        assert_eq!(
            string_to_any("dark", TypeKind::Enum, Some(&shade())).unwrap(),
            Any::from_enum("Paint::Shade", 1)
        );
        assert!(matches!(
            string_to_any("twelve", TypeKind::Int64, None),
            Err(AnyError::Parse { kind: TypeKind::Int64, .. })
        ));
        assert!(matches!(
            string_to_any("x", TypeKind::Sequence, None),
            Err(AnyError::TypeMismatch { .. })
        ));
    }
}
