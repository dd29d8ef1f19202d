//! Category Model

use serde::{Deserialize, Serialize};

use super::meta_field::MetaField;

/// Category entity
///
/// One node of the catalog hierarchy. `level == 0` iff `parent_id` is `None`;
/// otherwise `level == parent.level + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// URL-safe identifier derived from `name`, regenerated only by rename
    pub slug: String,
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Soft-deleted, kept for history
    #[serde(default)]
    pub is_archived: bool,
    /// Where products go when this category is deleted
    #[serde(default)]
    pub fallback_category_id: Option<i64>,

    // -- Owned collections (destroyed with the category) --

    /// Attribute schema, ordered by `sort_order`
    #[serde(default)]
    pub meta_fields: Vec<MetaField>,
    /// Lightweight subsections, ordered by `sort_order`
    #[serde(default)]
    pub sub_categories: Vec<SubCategory>,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

fn default_true() -> bool {
    true
}

/// Sub-category record (not a tree node)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubCategory {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

/// Create category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub parent_id: Option<i64>,
    pub sort_order: Option<i32>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
    pub fallback_category_id: Option<i64>,
}

/// Update category payload
///
/// Name and slug change only through rename; parent only through move.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}

/// Create sub-category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubCategoryCreate {
    pub name: String,
    pub image: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

/// Update sub-category payload (slug unchanged)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubCategoryUpdate {
    pub name: Option<String>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}

/// List filter (`None` = don't care)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CategoryFilter {
    pub is_active: Option<bool>,
    pub is_archived: Option<bool>,
}

impl CategoryFilter {
    pub fn matches(&self, category: &Category) -> bool {
        self.is_active.is_none_or(|v| v == category.is_active)
            && self.is_archived.is_none_or(|v| v == category.is_archived)
    }
}
