//! Meta Field Model
//!
//! A meta field is one typed attribute definition in a category's product schema.
//! The type-specific data lives in [`MetaFieldKind`], so combinations such as a
//! boolean default on a select field cannot be represented.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Declared value type of a meta field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaFieldType {
    Text,
    Number,
    Boolean,
    Array,
    Date,
    Select,
}

impl MetaFieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Date => "date",
            Self::Select => "select",
        }
    }

    /// Whether `unit` and `placeholder` mean anything for this type
    pub fn supports_unit(&self) -> bool {
        matches!(self, Self::Text | Self::Number)
    }

    /// Whether the type carries an option list
    pub fn supports_options(&self) -> bool {
        matches!(self, Self::Array | Self::Select)
    }
}

impl fmt::Display for MetaFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-tagged payload of a meta field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetaFieldKind {
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(default)]
        default_value: Option<String>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(default)]
        default_value: Option<f64>,
    },
    Boolean {
        #[serde(default)]
        default_value: bool,
    },
    Array {
        /// Enumerated choices; empty means free-form entries
        #[serde(default)]
        options: Vec<String>,
        #[serde(default)]
        default_value: Vec<String>,
    },
    Date {
        #[serde(default)]
        default_value: Option<NaiveDate>,
    },
    Select {
        options: Vec<String>,
        #[serde(default)]
        default_value: Option<String>,
    },
}

impl MetaFieldKind {
    pub fn field_type(&self) -> MetaFieldType {
        match self {
            Self::Text { .. } => MetaFieldType::Text,
            Self::Number { .. } => MetaFieldType::Number,
            Self::Boolean { .. } => MetaFieldType::Boolean,
            Self::Array { .. } => MetaFieldType::Array,
            Self::Date { .. } => MetaFieldType::Date,
            Self::Select { .. } => MetaFieldType::Select,
        }
    }

    pub fn options(&self) -> &[String] {
        match self {
            Self::Array { options, .. } | Self::Select { options, .. } => options,
            _ => &[],
        }
    }

    pub fn unit(&self) -> Option<&str> {
        match self {
            Self::Text { unit, .. } | Self::Number { unit, .. } => unit.as_deref(),
            _ => None,
        }
    }

    pub fn placeholder(&self) -> Option<&str> {
        match self {
            Self::Text { placeholder, .. } | Self::Number { placeholder, .. } => {
                placeholder.as_deref()
            }
            _ => None,
        }
    }

    /// Default value as loosely-typed JSON (as a product form would receive it)
    pub fn default_json(&self) -> Value {
        match self {
            Self::Text { default_value, .. } => {
                default_value.clone().map(Value::String).unwrap_or(Value::Null)
            }
            Self::Number { default_value, .. } => default_value
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Boolean { default_value } => Value::Bool(*default_value),
            Self::Array { default_value, .. } => Value::Array(
                default_value.iter().cloned().map(Value::String).collect(),
            ),
            Self::Date { default_value } => default_value
                .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                .unwrap_or(Value::Null),
            Self::Select { default_value, .. } => {
                default_value.clone().map(Value::String).unwrap_or(Value::Null)
            }
        }
    }
}

/// Meta field entity (schema entry of one category)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaField {
    /// Unique within the owning category; changes only via rename
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: MetaFieldKind,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_filterable: bool,
    #[serde(default)]
    pub is_searchable: bool,
    #[serde(default = "default_true")]
    pub is_visible_on_product_page: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl MetaField {
    pub fn field_type(&self) -> MetaFieldType {
        self.kind.field_type()
    }
}

fn default_true() -> bool {
    true
}

/// Add meta field payload
///
/// `default_value` is untyped here and coerced to `field_type` on add.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaFieldCreate {
    /// Derived from `label` when absent
    #[serde(default)]
    pub key: Option<String>,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: MetaFieldType,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub default_value: Value,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_filterable: bool,
    #[serde(default)]
    pub is_searchable: bool,
    #[serde(default = "default_true")]
    pub is_visible_on_product_page: bool,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

impl MetaFieldCreate {
    /// Minimal definition with every flag at its default
    pub fn new(label: impl Into<String>, field_type: MetaFieldType) -> Self {
        Self {
            key: None,
            label: label.into(),
            field_type,
            unit: None,
            placeholder: None,
            options: Vec::new(),
            default_value: Value::Null,
            is_required: false,
            is_filterable: false,
            is_searchable: false,
            is_visible_on_product_page: true,
            sort_order: None,
        }
    }
}

/// Update meta field payload
///
/// Has no `key`: keys change only through rename.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaFieldUpdate {
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<MetaFieldType>,
    pub unit: Option<String>,
    pub placeholder: Option<String>,
    pub options: Option<Vec<String>>,
    pub default_value: Option<Value>,
    pub is_required: Option<bool>,
    pub is_filterable: Option<bool>,
    pub is_searchable: Option<bool>,
    pub is_visible_on_product_page: Option<bool>,
    pub sort_order: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_field_flattened_tag() {
        let field = MetaField {
            key: "screen_size".to_string(),
            label: "Screen Size".to_string(),
            kind: MetaFieldKind::Number {
                unit: Some("in".to_string()),
                placeholder: None,
                default_value: None,
            },
            is_required: false,
            is_filterable: true,
            is_searchable: false,
            is_visible_on_product_page: true,
            sort_order: 1,
        };

        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "number");
        assert_eq!(json["unit"], "in");
        assert!(json.get("placeholder").is_none());

        let parsed: MetaField = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, field);
    }

    #[test]
    fn test_select_requires_options_on_deserialize() {
        let json = r#"{"key":"color","label":"Color","type":"select"}"#;
        let result: Result<MetaField, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_date_default_parses() {
        let json = r#"{"key":"release","label":"Release","type":"date","default_value":"2024-03-01"}"#;
        let field: MetaField = serde_json::from_str(json).unwrap();
        assert_eq!(field.field_type(), MetaFieldType::Date);
        assert_eq!(field.kind.default_json(), Value::String("2024-03-01".to_string()));
        assert!(field.is_visible_on_product_page);
    }

    #[test]
    fn test_create_payload_uses_type_tag() {
        let json = r#"{"label":"RAM","type":"number","unit":"GB"}"#;
        let def: MetaFieldCreate = serde_json::from_str(json).unwrap();
        assert_eq!(def.field_type, MetaFieldType::Number);
        assert!(def.key.is_none());
        assert_eq!(def.default_value, Value::Null);
    }

    #[test]
    fn test_type_capabilities() {
        assert!(MetaFieldType::Number.supports_unit());
        assert!(!MetaFieldType::Select.supports_unit());
        assert!(MetaFieldType::Array.supports_options());
        assert!(!MetaFieldType::Boolean.supports_options());
        assert_eq!(MetaFieldType::Boolean.to_string(), "boolean");
    }
}
