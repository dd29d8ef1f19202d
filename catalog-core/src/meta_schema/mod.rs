//! Meta field schema manager
//!
//! [`MetaFieldSchema`] owns one category's ordered attribute definitions.
//! Every operation validates completely before touching the list, so a failed
//! call leaves the schema exactly as it was. Callers must serialize writes to
//! one category's schema (single writer at a time).
//!
//! Field lifecycle: absent -> active -> (renamed) active -> removed.

mod coerce;
mod values;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::error::ErrorCode;
use shared::models::{Category, MetaField, MetaFieldCreate, MetaFieldUpdate, SortOrderUpdate};

use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult, FieldViolation};
use crate::ordering::{self, MoveDirection, Ranked};
use crate::schema_key;
use crate::validation::require_text;

use coerce::{KindDraft, build_kind, prune_default};

/// Result of removing a field from the schema
///
/// Removal only hides the field: product records keep whatever they stored
/// under the key, but the field no longer takes part in validation,
/// filtering or product forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovedField {
    pub field: MetaField,
    pub product_values_retained: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaFieldSchema {
    fields: Vec<MetaField>,
}

impl MetaFieldSchema {
    pub fn new(fields: Vec<MetaField>) -> Self {
        let mut schema = Self { fields };
        schema.sort();
        schema
    }

    pub fn from_category(category: &Category) -> Self {
        Self::new(category.meta_fields.clone())
    }

    /// Fields in display order
    pub fn fields(&self) -> &[MetaField] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<MetaField> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&MetaField> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.key.as_str()).collect()
    }

    pub fn filterable_fields(&self) -> impl Iterator<Item = &MetaField> {
        self.fields.iter().filter(|f| f.is_filterable)
    }

    pub fn searchable_fields(&self) -> impl Iterator<Item = &MetaField> {
        self.fields.iter().filter(|f| f.is_searchable)
    }

    pub fn product_page_fields(&self) -> impl Iterator<Item = &MetaField> {
        self.fields.iter().filter(|f| f.is_visible_on_product_page)
    }

    /// Add a field, deriving its key from the label when none is given
    pub fn add_field(
        &mut self,
        definition: MetaFieldCreate,
        config: &CatalogConfig,
    ) -> CatalogResult<&MetaField> {
        let mut violations = Vec::new();

        let key = match definition.key.as_deref().map(str::trim) {
            Some(explicit) if !explicit.is_empty() => explicit.to_string(),
            _ => schema_key::normalize(&definition.label).unwrap_or_default(),
        };
        if schema_key::is_valid_format(&key) {
            schema_key::validate_unique(&key, &self.keys())?;
        } else {
            violations.push(FieldViolation::new(
                "key",
                ErrorCode::MetaFieldKeyInvalid,
                format!("key {key:?} must start with a letter and use only letters, digits and _"),
            ));
        }
        check_key_len(&mut violations, &key, config);

        if self.fields.len() >= config.max_meta_fields {
            violations.push(FieldViolation::new(
                "meta_fields",
                ErrorCode::MetaFieldLimitReached,
                format!("a category holds at most {} meta fields", config.max_meta_fields),
            ));
        }

        require_text(&mut violations, &definition.label, "label", config.max_label_len);

        if let Some(sort_order) = definition.sort_order {
            self.check_sort_order_free(&mut violations, sort_order, None);
        }

        let kind = build_kind(
            KindDraft {
                field_type: definition.field_type,
                unit: definition.unit,
                placeholder: definition.placeholder,
                options: definition.options,
                default_value: definition.default_value,
            },
            config,
            &mut violations,
        );

        CatalogError::check(violations)?;

        let field = MetaField {
            sort_order: definition
                .sort_order
                .unwrap_or_else(|| ordering::next_sort_order(&self.fields)),
            key: key.clone(),
            label: definition.label.trim().to_string(),
            kind,
            is_required: definition.is_required,
            is_filterable: definition.is_filterable,
            is_searchable: definition.is_searchable,
            is_visible_on_product_page: definition.is_visible_on_product_page,
        };
        tracing::debug!(key = %field.key, field_type = %field.field_type(), sort_order = field.sort_order, "Meta field added");

        self.fields.push(field);
        self.sort();
        self.field(&key)
    }

    /// Change any property except the key
    ///
    /// A type change discards the previous options and default.
    pub fn update_field(
        &mut self,
        key: &str,
        patch: MetaFieldUpdate,
        config: &CatalogConfig,
    ) -> CatalogResult<&MetaField> {
        let idx = self.position(key)?;
        let current = &self.fields[idx];
        let current_type = current.field_type();
        let new_type = patch.field_type.unwrap_or(current_type);
        let mut violations = Vec::new();

        let draft = if new_type != current_type {
            tracing::debug!(key, from = %current_type, to = %new_type, "Meta field type changed, resetting options and default");
            let keeps_unit = new_type.supports_unit();
            KindDraft {
                field_type: new_type,
                unit: patch
                    .unit
                    .or_else(|| keeps_unit.then(|| current.kind.unit().map(String::from)).flatten()),
                placeholder: patch.placeholder.or_else(|| {
                    keeps_unit
                        .then(|| current.kind.placeholder().map(String::from))
                        .flatten()
                }),
                options: patch.options.unwrap_or_default(),
                default_value: patch.default_value.unwrap_or(Value::Null),
            }
        } else {
            let options = patch
                .options
                .unwrap_or_else(|| current.kind.options().to_vec());
            let default_value = match patch.default_value {
                Some(v) => v,
                None => prune_default(current.kind.default_json(), &options),
            };
            KindDraft {
                field_type: new_type,
                unit: patch.unit.or_else(|| current.kind.unit().map(String::from)),
                placeholder: patch
                    .placeholder
                    .or_else(|| current.kind.placeholder().map(String::from)),
                options,
                default_value,
            }
        };

        if let Some(label) = &patch.label {
            require_text(&mut violations, label, "label", config.max_label_len);
        }
        if let Some(sort_order) = patch.sort_order {
            self.check_sort_order_free(&mut violations, sort_order, Some(key));
        }
        let kind = build_kind(draft, config, &mut violations);

        CatalogError::check(violations)?;

        let field = &mut self.fields[idx];
        field.kind = kind;
        if let Some(label) = patch.label {
            field.label = label.trim().to_string();
        }
        if let Some(v) = patch.is_required {
            field.is_required = v;
        }
        if let Some(v) = patch.is_filterable {
            field.is_filterable = v;
        }
        if let Some(v) = patch.is_searchable {
            field.is_searchable = v;
        }
        if let Some(v) = patch.is_visible_on_product_page {
            field.is_visible_on_product_page = v;
        }
        if let Some(v) = patch.sort_order {
            field.sort_order = v;
        }
        tracing::debug!(key, "Meta field updated");

        self.sort();
        self.field(key)
    }

    /// The only operation that changes a key; position and every other property stay
    pub fn rename_field(
        &mut self,
        old_key: &str,
        new_key: &str,
        config: &CatalogConfig,
    ) -> CatalogResult<&MetaField> {
        let idx = self.position(old_key)?;
        let plan = schema_key::plan_rename(old_key, new_key, &self.keys())?;

        let mut violations = Vec::new();
        check_key_len(&mut violations, &plan.to, config);
        CatalogError::check(violations)?;

        if !plan.is_noop() {
            tracing::debug!(from = %plan.from, to = %plan.to, "Meta field renamed");
            self.fields[idx].key = plan.to.clone();
        }
        self.field(&plan.to)
    }

    pub fn remove_field(&mut self, key: &str) -> CatalogResult<RemovedField> {
        let idx = self.position(key)?;
        let field = self.fields.remove(idx);
        tracing::info!(key, "Meta field removed from schema, product values retained");
        Ok(RemovedField {
            field,
            product_values_retained: true,
        })
    }

    /// Apply a full permutation of the keys; returns the new rank assignment
    pub fn reorder_fields(
        &mut self,
        new_key_order: &[String],
    ) -> CatalogResult<Vec<SortOrderUpdate<String>>> {
        let updates = ordering::reorder(&self.fields, new_key_order)?;
        ordering::apply_order(&mut self.fields, &updates);
        self.sort();
        Ok(updates)
    }

    pub fn move_field(
        &mut self,
        key: &str,
        direction: MoveDirection,
    ) -> CatalogResult<Vec<SortOrderUpdate<String>>> {
        self.position(key)?;
        let updates = ordering::move_item(&self.fields, &key.to_string(), direction)?;
        ordering::apply_order(&mut self.fields, &updates);
        self.sort();
        Ok(updates)
    }

    /// Default values keyed by field, for a new product form
    pub fn product_form_defaults(&self) -> serde_json::Map<String, Value> {
        self.fields
            .iter()
            .map(|f| (f.key.clone(), f.kind.default_json()))
            .collect()
    }

    fn field(&self, key: &str) -> CatalogResult<&MetaField> {
        self.get(key)
            .ok_or_else(|| CatalogError::FieldNotFound(key.to_string()))
    }

    fn position(&self, key: &str) -> CatalogResult<usize> {
        self.fields
            .iter()
            .position(|f| f.key == key)
            .ok_or_else(|| CatalogError::FieldNotFound(key.to_string()))
    }

    fn check_sort_order_free(
        &self,
        violations: &mut Vec<FieldViolation>,
        sort_order: i32,
        except_key: Option<&str>,
    ) {
        if let Some(other) = self
            .fields
            .iter()
            .find(|f| f.sort_order == sort_order && Some(f.key.as_str()) != except_key)
        {
            violations.push(FieldViolation::new(
                "sort_order",
                ErrorCode::MetaFieldSortOrderConflict,
                format!("sort order {sort_order} is already used by {}", other.key),
            ));
        }
    }

    fn sort(&mut self) {
        self.fields.sort_by_key(Ranked::sort_order);
    }
}

fn check_key_len(violations: &mut Vec<FieldViolation>, key: &str, config: &CatalogConfig) {
    let len = key.chars().count();
    if len > config.max_key_len {
        violations.push(FieldViolation::new(
            "key",
            ErrorCode::ValueOutOfRange,
            format!("key is too long ({len} chars, max {})", config.max_key_len),
        ));
    }
}
