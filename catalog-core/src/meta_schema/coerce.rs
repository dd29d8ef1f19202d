//! Type coercion for meta field values
//!
//! The same rules apply to a field's declared default and to the values a
//! product stores for that field.

use chrono::NaiveDate;
use serde_json::Value;
use shared::error::ErrorCode;
use shared::models::{MetaFieldKind, MetaFieldType};
use std::collections::HashSet;

use crate::config::CatalogConfig;
use crate::error::FieldViolation;
use crate::validation::{MAX_SHORT_TEXT_LEN, optional_text};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// A loosely-typed JSON value after coercion to a field type
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TypedValue {
    Text(Option<String>),
    Number(Option<f64>),
    Boolean(bool),
    List(Vec<String>),
    Date(Option<NaiveDate>),
    Choice(Option<String>),
}

impl TypedValue {
    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Self::Text(v) | Self::Choice(v) => v.is_none(),
            Self::Number(v) => v.is_none(),
            Self::Boolean(_) => false,
            Self::List(v) => v.is_empty(),
            Self::Date(v) => v.is_none(),
        }
    }
}

/// Coerce `value` to `field_type`, checking option membership where relevant
pub(crate) fn coerce(
    field_type: MetaFieldType,
    options: &[String],
    value: &Value,
) -> Result<TypedValue, String> {
    match field_type {
        MetaFieldType::Text => match value {
            Value::Null => Ok(TypedValue::Text(None)),
            Value::String(s) if s.is_empty() => Ok(TypedValue::Text(None)),
            Value::String(s) => Ok(TypedValue::Text(Some(s.clone()))),
            Value::Number(n) => Ok(TypedValue::Text(Some(n.to_string()))),
            Value::Bool(b) => Ok(TypedValue::Text(Some(b.to_string()))),
            _ => Err("expected a string".to_string()),
        },
        MetaFieldType::Number => match value {
            Value::Null => Ok(TypedValue::Number(None)),
            Value::Number(n) => n
                .as_f64()
                .map(|f| TypedValue::Number(Some(f)))
                .ok_or_else(|| format!("{n} is not representable as a number")),
            Value::String(s) if s.trim().is_empty() => Ok(TypedValue::Number(None)),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|f| TypedValue::Number(Some(f)))
                .ok_or_else(|| format!("{s:?} is not a number")),
            _ => Err("expected a number".to_string()),
        },
        MetaFieldType::Boolean => match value {
            Value::Null => Ok(TypedValue::Boolean(false)),
            Value::Bool(b) => Ok(TypedValue::Boolean(*b)),
            _ => Err("expected true or false".to_string()),
        },
        MetaFieldType::Array => {
            let items = match value {
                Value::Null => Vec::new(),
                Value::String(s) => vec![s.clone()],
                Value::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => Ok(s.clone()),
                        _ => Err("expected a list of strings".to_string()),
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                _ => return Err("expected a list of strings".to_string()),
            };
            if !options.is_empty()
                && let Some(bad) = items.iter().find(|item| !options.contains(item))
            {
                return Err(format!("{bad:?} is not one of the options"));
            }
            Ok(TypedValue::List(items))
        }
        MetaFieldType::Date => match value {
            Value::Null => Ok(TypedValue::Date(None)),
            Value::String(s) if s.trim().is_empty() => Ok(TypedValue::Date(None)),
            Value::String(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                .map(|d| TypedValue::Date(Some(d)))
                .map_err(|_| format!("{s:?} is not a YYYY-MM-DD date")),
            _ => Err("expected a YYYY-MM-DD date".to_string()),
        },
        MetaFieldType::Select => {
            let choice = match value {
                Value::Null => None,
                Value::String(s) if s.is_empty() => None,
                Value::String(s) => Some(s.clone()),
                Value::Array(items) if items.is_empty() => None,
                Value::Array(items) if items.len() == 1 => match &items[0] {
                    Value::String(s) => Some(s.clone()),
                    _ => return Err("expected one of the options".to_string()),
                },
                _ => return Err("expected one of the options".to_string()),
            };
            if let Some(c) = &choice
                && !options.contains(c)
            {
                return Err(format!("{c:?} is not one of the options"));
            }
            Ok(TypedValue::Choice(choice))
        }
    }
}

/// Raw type-specific inputs, before they become a [`MetaFieldKind`]
#[derive(Debug, Clone)]
pub(crate) struct KindDraft {
    pub field_type: MetaFieldType,
    pub unit: Option<String>,
    pub placeholder: Option<String>,
    pub options: Vec<String>,
    pub default_value: Value,
}

/// Build the typed kind, pushing every problem into `violations`
///
/// When violations are pushed the returned kind is a placeholder and must be discarded.
pub(crate) fn build_kind(
    draft: KindDraft,
    config: &CatalogConfig,
    violations: &mut Vec<FieldViolation>,
) -> MetaFieldKind {
    let KindDraft {
        field_type,
        mut unit,
        mut placeholder,
        mut options,
        default_value,
    } = draft;

    if field_type.supports_unit() {
        optional_text(violations, unit.as_deref(), "unit", MAX_SHORT_TEXT_LEN);
        optional_text(violations, placeholder.as_deref(), "placeholder", MAX_SHORT_TEXT_LEN);
    } else if unit.is_some() || placeholder.is_some() {
        tracing::debug!(%field_type, "Ignoring unit/placeholder for field type");
        unit = None;
        placeholder = None;
    }

    if field_type.supports_options() {
        check_options(&options, field_type, config, violations);
    } else if !options.is_empty() {
        tracing::debug!(%field_type, "Ignoring options for field type");
        options.clear();
    }

    let typed = match coerce(field_type, &options, &default_value) {
        Ok(v) => Some(v),
        Err(msg) => {
            violations.push(FieldViolation::new(
                "default_value",
                ErrorCode::MetaFieldDefaultInvalid,
                format!("{field_type} default: {msg}"),
            ));
            None
        }
    };

    match field_type {
        MetaFieldType::Text => MetaFieldKind::Text {
            unit,
            placeholder,
            default_value: match typed {
                Some(TypedValue::Text(v)) => v,
                _ => None,
            },
        },
        MetaFieldType::Number => MetaFieldKind::Number {
            unit,
            placeholder,
            default_value: match typed {
                Some(TypedValue::Number(v)) => v,
                _ => None,
            },
        },
        MetaFieldType::Boolean => MetaFieldKind::Boolean {
            default_value: matches!(typed, Some(TypedValue::Boolean(true))),
        },
        MetaFieldType::Array => MetaFieldKind::Array {
            default_value: match typed {
                Some(TypedValue::List(v)) => v,
                _ => Vec::new(),
            },
            options,
        },
        MetaFieldType::Date => MetaFieldKind::Date {
            default_value: match typed {
                Some(TypedValue::Date(v)) => v,
                _ => None,
            },
        },
        MetaFieldType::Select => MetaFieldKind::Select {
            default_value: match typed {
                Some(TypedValue::Choice(v)) => v,
                _ => None,
            },
            options,
        },
    }
}

fn check_options(
    options: &[String],
    field_type: MetaFieldType,
    config: &CatalogConfig,
    violations: &mut Vec<FieldViolation>,
) {
    if field_type == MetaFieldType::Select && options.is_empty() {
        violations.push(FieldViolation::new(
            "options",
            ErrorCode::MetaFieldOptionsRequired,
            "select fields need at least one option",
        ));
    }
    if options.len() > config.max_options {
        violations.push(FieldViolation::new(
            "options",
            ErrorCode::ValueOutOfRange,
            format!("too many options ({}, max {})", options.len(), config.max_options),
        ));
    }
    if options.iter().any(|o| o.trim().is_empty()) {
        violations.push(FieldViolation::new(
            "options",
            ErrorCode::RequiredField,
            "options must not be empty strings",
        ));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = options.iter().find(|o| !seen.insert(o.as_str())) {
        violations.push(FieldViolation::new(
            "options",
            ErrorCode::AlreadyExists,
            format!("duplicate option {dup:?}"),
        ));
    }
}

/// Drop default entries that are no longer among `options`
pub(crate) fn prune_default(default_value: Value, options: &[String]) -> Value {
    if options.is_empty() {
        return default_value;
    }
    match default_value {
        Value::String(s) if !options.contains(&s) => Value::Null,
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|item| item.as_str().is_some_and(|s| options.iter().any(|o| o == s)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn opts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_coerce_text() {
        assert_eq!(
            coerce(MetaFieldType::Text, &[], &json!(12)).unwrap(),
            TypedValue::Text(Some("12".to_string()))
        );
        assert_eq!(coerce(MetaFieldType::Text, &[], &json!("")).unwrap(), TypedValue::Text(None));
        assert!(coerce(MetaFieldType::Text, &[], &json!({"a": 1})).is_err());
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(
            coerce(MetaFieldType::Number, &[], &json!(6.1)).unwrap(),
            TypedValue::Number(Some(6.1))
        );
        assert_eq!(
            coerce(MetaFieldType::Number, &[], &json!(" 15 ")).unwrap(),
            TypedValue::Number(Some(15.0))
        );
        assert_eq!(coerce(MetaFieldType::Number, &[], &json!(null)).unwrap(), TypedValue::Number(None));
        assert!(coerce(MetaFieldType::Number, &[], &json!("big")).is_err());
        assert!(coerce(MetaFieldType::Number, &[], &json!("NaN")).is_err());
        assert!(coerce(MetaFieldType::Number, &[], &json!(true)).is_err());
    }

    #[test]
    fn test_coerce_boolean_accepts_only_bools() {
        assert_eq!(coerce(MetaFieldType::Boolean, &[], &json!(true)).unwrap(), TypedValue::Boolean(true));
        assert_eq!(coerce(MetaFieldType::Boolean, &[], &json!(null)).unwrap(), TypedValue::Boolean(false));
        assert!(coerce(MetaFieldType::Boolean, &[], &json!("true")).is_err());
        assert!(coerce(MetaFieldType::Boolean, &[], &json!(1)).is_err());
    }

    #[test]
    fn test_coerce_array_subset_of_options() {
        let options = opts(&["usb", "hdmi", "dp"]);
        assert_eq!(
            coerce(MetaFieldType::Array, &options, &json!(["usb", "dp"])).unwrap(),
            TypedValue::List(opts(&["usb", "dp"]))
        );
        assert_eq!(
            coerce(MetaFieldType::Array, &options, &json!("hdmi")).unwrap(),
            TypedValue::List(opts(&["hdmi"]))
        );
        assert_eq!(coerce(MetaFieldType::Array, &options, &json!([])).unwrap(), TypedValue::List(vec![]));
        assert!(coerce(MetaFieldType::Array, &options, &json!(["vga"])).is_err());
        assert!(coerce(MetaFieldType::Array, &options, &json!([1])).is_err());
        // free-form when no options are declared
        assert!(coerce(MetaFieldType::Array, &[], &json!(["anything"])).is_ok());
    }

    #[test]
    fn test_coerce_select() {
        let options = opts(&["red", "blue"]);
        assert_eq!(
            coerce(MetaFieldType::Select, &options, &json!("red")).unwrap(),
            TypedValue::Choice(Some("red".to_string()))
        );
        assert_eq!(
            coerce(MetaFieldType::Select, &options, &json!(["blue"])).unwrap(),
            TypedValue::Choice(Some("blue".to_string()))
        );
        assert_eq!(coerce(MetaFieldType::Select, &options, &json!([])).unwrap(), TypedValue::Choice(None));
        assert!(coerce(MetaFieldType::Select, &options, &json!("green")).is_err());
        assert!(coerce(MetaFieldType::Select, &options, &json!(["red", "blue"])).is_err());
    }

    #[test]
    fn test_coerce_date() {
        let parsed = coerce(MetaFieldType::Date, &[], &json!("2024-02-29")).unwrap();
        assert_eq!(
            parsed,
            TypedValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29))
        );
        assert!(coerce(MetaFieldType::Date, &[], &json!("2023-02-29")).is_err());
        assert!(coerce(MetaFieldType::Date, &[], &json!("29/02/2024")).is_err());
    }

    #[test]
    fn test_build_kind_select_without_options() {
        let mut violations = Vec::new();
        build_kind(
            KindDraft {
                field_type: MetaFieldType::Select,
                unit: None,
                placeholder: None,
                options: vec![],
                default_value: json!("x"),
            },
            &CatalogConfig::default(),
            &mut violations,
        );
        let codes: Vec<ErrorCode> = violations.iter().map(|v| v.code).collect();
        assert_eq!(
            codes,
            vec![ErrorCode::MetaFieldOptionsRequired, ErrorCode::MetaFieldDefaultInvalid]
        );
    }

    #[test]
    fn test_build_kind_drops_unit_for_boolean() {
        let mut violations = Vec::new();
        let kind = build_kind(
            KindDraft {
                field_type: MetaFieldType::Boolean,
                unit: Some("kg".to_string()),
                placeholder: None,
                options: opts(&["a"]),
                default_value: json!(true),
            },
            &CatalogConfig::default(),
            &mut violations,
        );
        assert!(violations.is_empty());
        assert_eq!(kind, MetaFieldKind::Boolean { default_value: true });
    }

    #[test]
    fn test_duplicate_options_rejected() {
        let mut violations = Vec::new();
        build_kind(
            KindDraft {
                field_type: MetaFieldType::Array,
                unit: None,
                placeholder: None,
                options: opts(&["a", "b", "a"]),
                default_value: json!(null),
            },
            &CatalogConfig::default(),
            &mut violations,
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, ErrorCode::AlreadyExists);
    }

    #[test]
    fn test_prune_default() {
        let options = opts(&["a", "c"]);
        assert_eq!(prune_default(json!(["a", "b", "c"]), &options), json!(["a", "c"]));
        assert_eq!(prune_default(json!("b"), &options), json!(null));
        assert_eq!(prune_default(json!("a"), &options), json!("a"));
        assert_eq!(prune_default(json!(["z"]), &[]), json!(["z"]));
    }
}
