//! Snapshot integrity audit
//!
//! Reports every data-integrity problem in a snapshot instead of failing on
//! the first one, so an operator can fix a broken store in one pass.

use serde::{Deserialize, Serialize};
use shared::error::ErrorCode;
use shared::models::{Category, MetaFieldType};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::fallback::FallbackResolver;
use crate::schema_key;
use crate::tree::hierarchy_cycles;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub code: ErrorCode,
    pub category_id: i64,
    pub message: String,
}

impl Finding {
    fn new(code: ErrorCode, category_id: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            category_id,
            message: message.into(),
        }
    }
}

/// Audit a snapshot; an empty result means the snapshot is consistent
pub fn audit(categories: &[Category], config: &CatalogConfig) -> Vec<Finding> {
    let mut findings = Vec::new();

    check_identity(categories, &mut findings);
    check_hierarchy(categories, config, &mut findings);
    check_fallbacks(categories, &mut findings);
    for category in categories {
        check_schema(category, &mut findings);
        check_sub_categories(category, &mut findings);
    }

    if findings.is_empty() {
        tracing::debug!(categories = categories.len(), "Snapshot audit clean");
    } else {
        tracing::warn!(categories = categories.len(), findings = findings.len(), "Snapshot audit found problems");
    }
    findings
}

fn check_identity(categories: &[Category], findings: &mut Vec<Finding>) {
    let mut ids = HashSet::new();
    let mut slugs: HashMap<&str, i64> = HashMap::new();
    for c in categories {
        if !ids.insert(c.id) {
            findings.push(Finding::new(
                ErrorCode::AlreadyExists,
                c.id,
                format!("id {} appears more than once", c.id),
            ));
        }
        if let Some(first) = slugs.insert(c.slug.as_str(), c.id) {
            findings.push(Finding::new(
                ErrorCode::CategorySlugExists,
                c.id,
                format!("slug {:?} is also used by category {first}", c.slug),
            ));
        }
    }
}

fn check_hierarchy(categories: &[Category], config: &CatalogConfig, findings: &mut Vec<Finding>) {
    let by_id: HashMap<i64, &Category> = categories.iter().map(|c| (c.id, c)).collect();
    let mut ranks: HashMap<(Option<i64>, i32), i64> = HashMap::new();

    for c in categories {
        match c.parent_id {
            None if c.level != 0 => findings.push(Finding::new(
                ErrorCode::CategoryLevelMismatch,
                c.id,
                format!("root category has level {}", c.level),
            )),
            None => {}
            Some(pid) => match by_id.get(&pid) {
                None => findings.push(Finding::new(
                    ErrorCode::CategoryParentNotFound,
                    c.id,
                    format!("parent {pid} is not in the snapshot"),
                )),
                Some(parent) if c.level != parent.level + 1 => findings.push(Finding::new(
                    ErrorCode::CategoryLevelMismatch,
                    c.id,
                    format!("level {} under parent at level {}", c.level, parent.level),
                )),
                Some(_) => {}
            },
        }

        if c.level > config.max_depth {
            findings.push(Finding::new(
                ErrorCode::CategoryDepthExceeded,
                c.id,
                format!("level {} is deeper than {}", c.level, config.max_depth),
            ));
        }

        if let Some(other) = ranks.insert((c.parent_id, c.sort_order), c.id) {
            findings.push(Finding::new(
                ErrorCode::CategorySortOrderConflict,
                c.id,
                format!("sort order {} is also used by sibling {other}", c.sort_order),
            ));
        }
    }

    for cycle in hierarchy_cycles(categories) {
        let first = cycle.iter().copied().min().unwrap_or_default();
        findings.push(Finding::new(
            ErrorCode::CategoryCyclicHierarchy,
            first,
            format!("parent links form a cycle through {cycle:?}"),
        ));
    }
}

fn check_fallbacks(categories: &[Category], findings: &mut Vec<Finding>) {
    let resolver = FallbackResolver::new(categories);
    let mut cycles: BTreeSet<BTreeSet<i64>> = BTreeSet::new();

    for c in categories {
        let Some(fid) = c.fallback_category_id else {
            continue;
        };
        let direct = if fid == c.id {
            Some("fallback points at the category itself".to_string())
        } else {
            match resolver.get(fid) {
                None => Some(format!("fallback {fid} is not in the snapshot")),
                Some(target) if target.is_archived => Some(format!("fallback {fid} is archived")),
                Some(_) => None,
            }
        };
        if let Some(message) = direct {
            findings.push(Finding::new(ErrorCode::CategoryFallbackInvalid, c.id, message));
            continue;
        }

        if let Err(CatalogError::CyclicFallback(cycle)) = resolver.fallback_chain(c) {
            let members: BTreeSet<i64> = cycle.iter().copied().collect();
            if cycles.insert(members) {
                findings.push(Finding::new(
                    ErrorCode::CategoryCyclicFallback,
                    c.id,
                    format!("fallback links form a cycle through {cycle:?}"),
                ));
            }
        }
    }
}

fn check_schema(category: &Category, findings: &mut Vec<Finding>) {
    let mut keys = HashSet::new();
    let mut ranks: HashMap<i32, &str> = HashMap::new();

    for field in &category.meta_fields {
        if !schema_key::is_valid_format(&field.key) {
            findings.push(Finding::new(
                ErrorCode::MetaFieldKeyInvalid,
                category.id,
                format!("meta field key {:?} is malformed", field.key),
            ));
        }
        if !keys.insert(field.key.as_str()) {
            findings.push(Finding::new(
                ErrorCode::MetaFieldKeyExists,
                category.id,
                format!("meta field key {:?} appears more than once", field.key),
            ));
        }
        if let Some(other) = ranks.insert(field.sort_order, field.key.as_str()) {
            findings.push(Finding::new(
                ErrorCode::MetaFieldSortOrderConflict,
                category.id,
                format!("meta fields {other:?} and {:?} share sort order {}", field.key, field.sort_order),
            ));
        }
        if field.field_type() == MetaFieldType::Select && field.kind.options().is_empty() {
            findings.push(Finding::new(
                ErrorCode::MetaFieldOptionsRequired,
                category.id,
                format!("select field {:?} has no options", field.key),
            ));
        }
    }
}

fn check_sub_categories(category: &Category, findings: &mut Vec<Finding>) {
    let mut slugs = HashSet::new();
    for sub in &category.sub_categories {
        if !slugs.insert(sub.slug.as_str()) {
            findings.push(Finding::new(
                ErrorCode::SubCategorySlugExists,
                category.id,
                format!("sub-category slug {:?} appears more than once", sub.slug),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: serde_json::Value) -> Vec<Category> {
        serde_json::from_value(value).unwrap()
    }

    fn codes(findings: &[Finding]) -> Vec<ErrorCode> {
        findings.iter().map(|f| f.code).collect()
    }

    #[test]
    fn test_clean_snapshot() {
        let categories = snapshot(json!([
            {"id": 1, "name": "Electronics", "slug": "electronics", "parent_id": null},
            {"id": 2, "name": "Phones", "slug": "phones", "parent_id": 1, "level": 1,
             "fallback_category_id": 1},
        ]));
        assert!(audit(&categories, &CatalogConfig::default()).is_empty());
    }

    #[test]
    fn test_hierarchy_findings() {
        let categories = snapshot(json!([
            {"id": 1, "name": "A", "slug": "a", "parent_id": null, "level": 1},
            {"id": 2, "name": "B", "slug": "a", "parent_id": 1, "level": 1},
            {"id": 3, "name": "C", "slug": "c", "parent_id": 9, "level": 1, "sort_order": 0},
            {"id": 4, "name": "D", "slug": "d", "parent_id": 1, "level": 2, "sort_order": 0},
        ]));
        let found = codes(&audit(&categories, &CatalogConfig::default()));
        assert!(found.contains(&ErrorCode::CategorySlugExists));
        assert!(found.contains(&ErrorCode::CategoryParentNotFound));
        assert!(found.contains(&ErrorCode::CategorySortOrderConflict));
        assert_eq!(
            found.iter().filter(|c| **c == ErrorCode::CategoryLevelMismatch).count(),
            2
        );
    }

    #[test]
    fn test_cycles_reported_once() {
        let categories = snapshot(json!([
            {"id": 1, "name": "A", "slug": "a", "parent_id": 2, "level": 1, "fallback_category_id": 2},
            {"id": 2, "name": "B", "slug": "b", "parent_id": 1, "level": 1, "fallback_category_id": 1},
        ]));
        let findings = audit(&categories, &CatalogConfig::default());
        let hierarchy: Vec<&Finding> = findings
            .iter()
            .filter(|f| f.code == ErrorCode::CategoryCyclicHierarchy)
            .collect();
        assert_eq!(hierarchy.len(), 1);
        assert_eq!(hierarchy[0].category_id, 1);
        assert_eq!(
            findings
                .iter()
                .filter(|f| f.code == ErrorCode::CategoryCyclicFallback)
                .count(),
            1
        );
    }

    #[test]
    fn test_fallback_and_schema_findings() {
        let categories = snapshot(json!([
            {"id": 1, "name": "Old", "slug": "old", "parent_id": null, "is_archived": true},
            {"id": 2, "name": "B", "slug": "b", "parent_id": null, "sort_order": 1,
             "fallback_category_id": 1,
             "meta_fields": [
                {"key": "ram", "label": "RAM", "type": "number", "sort_order": 0},
                {"key": "ram", "label": "RAM again", "type": "number", "sort_order": 0},
                {"key": "Color", "label": "Color", "type": "select", "options": [], "sort_order": 1}
             ],
             "sub_categories": [
                {"name": "Cases", "slug": "cases"},
                {"name": "Cases", "slug": "cases", "sort_order": 1}
             ]},
            {"id": 3, "name": "C", "slug": "c", "parent_id": null, "sort_order": 2,
             "fallback_category_id": 3},
        ]));
        let found = codes(&audit(&categories, &CatalogConfig::default()));
        assert_eq!(
            found,
            vec![
                ErrorCode::CategoryFallbackInvalid,
                ErrorCode::CategoryFallbackInvalid,
                ErrorCode::MetaFieldKeyExists,
                ErrorCode::MetaFieldSortOrderConflict,
                ErrorCode::MetaFieldKeyInvalid,
                ErrorCode::MetaFieldOptionsRequired,
                ErrorCode::SubCategorySlugExists,
            ]
        );
    }

    #[test]
    fn test_depth_finding() {
        let categories = snapshot(json!([
            {"id": 1, "name": "A", "slug": "a", "parent_id": null},
            {"id": 2, "name": "B", "slug": "b", "parent_id": 1, "level": 1},
        ]));
        let config = CatalogConfig::default().with_max_depth(0);
        assert_eq!(codes(&audit(&categories, &config)), vec![ErrorCode::CategoryDepthExceeded]);
    }
}
