//! Product attribute validation against a category schema

use serde_json::{Map, Value};
use shared::error::ErrorCode;

use super::MetaFieldSchema;
use super::coerce::coerce;
use crate::error::{CatalogError, CatalogResult, FieldViolation};

impl MetaFieldSchema {
    /// Check a product's attribute map
    ///
    /// Keys without a field in the schema (for instance values left behind by a
    /// removed field) are ignored.
    pub fn validate_product_values(&self, values: &Map<String, Value>) -> CatalogResult<()> {
        let mut violations = Vec::new();

        for field in self.fields() {
            let value = values.get(&field.key).unwrap_or(&Value::Null);
            match coerce(field.field_type(), field.kind.options(), value) {
                Ok(typed) if field.is_required && typed.is_empty() => {
                    violations.push(FieldViolation::new(
                        field.key.clone(),
                        ErrorCode::MetaFieldRequiredMissing,
                        format!("{} is required", field.label),
                    ));
                }
                Ok(_) => {}
                Err(msg) => violations.push(FieldViolation::new(
                    field.key.clone(),
                    ErrorCode::MetaFieldValueInvalid,
                    msg,
                )),
            }
        }

        let ignored = values.keys().filter(|k| self.get(k).is_none()).count();
        if ignored > 0 {
            tracing::debug!(ignored, "Ignoring product values outside the schema");
        }
        CatalogError::check(violations)
    }
}
