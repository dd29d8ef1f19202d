//! Sub-category list of one category
//!
//! Sub-categories are keyed by slug, unique within their category, and ordered
//! like siblings. Like the meta field schema, a set is single-writer.

use shared::error::ErrorCode;
use shared::models::{Category, SortOrderUpdate, SubCategory, SubCategoryCreate, SubCategoryUpdate};

use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult, FieldViolation};
use crate::ordering::{self, MoveDirection, Ranked};
use crate::slug::unique_slug;
use crate::validation::{MAX_URL_LEN, optional_text, require_text};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubCategorySet {
    items: Vec<SubCategory>,
}

impl SubCategorySet {
    pub fn new(items: Vec<SubCategory>) -> Self {
        let mut set = Self { items };
        set.sort();
        set
    }

    pub fn from_category(category: &Category) -> Self {
        Self::new(category.sub_categories.clone())
    }

    pub fn items(&self) -> &[SubCategory] {
        &self.items
    }

    pub fn into_items(self) -> Vec<SubCategory> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&SubCategory> {
        self.items.iter().find(|s| s.slug == slug)
    }

    pub fn add(&mut self, payload: SubCategoryCreate, config: &CatalogConfig) -> CatalogResult<&SubCategory> {
        let mut violations = Vec::new();
        require_text(&mut violations, &payload.name, "name", config.max_name_len);
        optional_text(&mut violations, payload.image.as_deref(), "image", MAX_URL_LEN);
        if let Some(sort_order) = payload.sort_order
            && let Some(other) = self.items.iter().find(|s| s.sort_order == sort_order)
        {
            violations.push(FieldViolation::new(
                "sort_order",
                ErrorCode::CategorySortOrderConflict,
                format!("sort order {sort_order} is already used by {}", other.slug),
            ));
        }
        CatalogError::check(violations)?;

        let name = payload.name.trim().to_string();
        let slug = unique_slug(&name, &self.slugs(None));
        let item = SubCategory {
            sort_order: payload
                .sort_order
                .unwrap_or_else(|| ordering::next_sort_order(&self.items)),
            slug: slug.clone(),
            name,
            image: payload.image,
            is_active: payload.is_active.unwrap_or(true),
        };
        tracing::debug!(slug = %item.slug, sort_order = item.sort_order, "Sub-category added");

        self.items.push(item);
        self.sort();
        self.item(&slug)
    }

    /// Name, image and active flag; the slug stays
    pub fn update(
        &mut self,
        slug: &str,
        patch: SubCategoryUpdate,
        config: &CatalogConfig,
    ) -> CatalogResult<&SubCategory> {
        let idx = self.position(slug)?;

        let mut violations = Vec::new();
        if let Some(name) = &patch.name {
            require_text(&mut violations, name, "name", config.max_name_len);
        }
        optional_text(&mut violations, patch.image.as_deref(), "image", MAX_URL_LEN);
        CatalogError::check(violations)?;

        let item = &mut self.items[idx];
        if let Some(name) = patch.name {
            item.name = name.trim().to_string();
        }
        if let Some(image) = patch.image {
            item.image = Some(image).filter(|i| !i.is_empty());
        }
        if let Some(is_active) = patch.is_active {
            item.is_active = is_active;
        }
        self.item(slug)
    }

    /// Change the name and regenerate the slug
    pub fn rename(
        &mut self,
        slug: &str,
        new_name: &str,
        config: &CatalogConfig,
    ) -> CatalogResult<&SubCategory> {
        let idx = self.position(slug)?;
        let name = new_name.trim();

        let mut violations = Vec::new();
        require_text(&mut violations, name, "name", config.max_name_len);
        CatalogError::check(violations)?;

        let new_slug = unique_slug(name, &self.slugs(Some(slug)));
        let item = &mut self.items[idx];
        item.name = name.to_string();
        item.slug = new_slug.clone();
        tracing::debug!(from = slug, to = %new_slug, "Sub-category renamed");
        self.item(&new_slug)
    }

    pub fn remove(&mut self, slug: &str) -> CatalogResult<SubCategory> {
        let idx = self.position(slug)?;
        Ok(self.items.remove(idx))
    }

    pub fn reorder(&mut self, slugs: &[String]) -> CatalogResult<Vec<SortOrderUpdate<String>>> {
        let updates = ordering::reorder(&self.items, slugs)?;
        ordering::apply_order(&mut self.items, &updates);
        self.sort();
        Ok(updates)
    }

    pub fn move_item(
        &mut self,
        slug: &str,
        direction: MoveDirection,
    ) -> CatalogResult<Vec<SortOrderUpdate<String>>> {
        let updates = ordering::move_item(&self.items, &slug.to_string(), direction)
            .map_err(|_| CatalogError::SubCategoryNotFound(slug.to_string()))?;
        ordering::apply_order(&mut self.items, &updates);
        self.sort();
        Ok(updates)
    }

    fn slugs(&self, except: Option<&str>) -> Vec<&str> {
        self.items
            .iter()
            .map(|s| s.slug.as_str())
            .filter(|s| Some(*s) != except)
            .collect()
    }

    fn item(&self, slug: &str) -> CatalogResult<&SubCategory> {
        self.get(slug)
            .ok_or_else(|| CatalogError::SubCategoryNotFound(slug.to_string()))
    }

    fn position(&self, slug: &str) -> CatalogResult<usize> {
        self.items
            .iter()
            .position(|s| s.slug == slug)
            .ok_or_else(|| CatalogError::SubCategoryNotFound(slug.to_string()))
    }

    fn sort(&mut self) {
        self.items.sort_by_key(Ranked::sort_order);
    }
}
