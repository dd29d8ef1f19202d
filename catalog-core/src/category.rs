//! Category mutation planning
//!
//! Every function here works on a snapshot of all categories and returns the
//! records (or rank assignments) the store should persist. Nothing is written
//! until the whole input validates.

use serde::{Deserialize, Serialize};
use shared::error::ErrorCode;
use shared::models::{Category, CategoryCreate, CategoryFilter, CategoryUpdate, SortOrderUpdate};
use std::collections::{HashMap, HashSet};

use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult, FieldViolation};
use crate::fallback::FallbackResolver;
use crate::ordering;
use crate::slug::unique_slug;
use crate::validation::{MAX_NOTE_LEN, MAX_URL_LEN, optional_text, require_text};

/// New level for one category of a moved subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpdate {
    pub id: i64,
    pub level: u32,
}

/// Result of re-parenting a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovePlan {
    pub category: Category,
    /// The moved category and all of its descendants
    pub level_updates: Vec<LevelUpdate>,
}

pub fn find(all: &[Category], id: i64) -> CatalogResult<&Category> {
    all.iter()
        .find(|c| c.id == id)
        .ok_or(CatalogError::CategoryNotFound(id))
}

pub fn find_by_slug<'a>(all: &'a [Category], slug: &str) -> Option<&'a Category> {
    all.iter().find(|c| c.slug == slug)
}

pub fn filter_categories(all: &[Category], filter: CategoryFilter) -> Vec<&Category> {
    all.iter().filter(|c| filter.matches(c)).collect()
}

/// Children of `parent_id` (roots for `None`) in display order
pub fn siblings(all: &[Category], parent_id: Option<i64>) -> Vec<&Category> {
    let mut group: Vec<&Category> = all.iter().filter(|c| c.parent_id == parent_id).collect();
    group.sort_by(|a, b| crate::tree::sibling_order(a, b));
    group
}

/// Every descendant of `id`, breadth-first
pub fn descendant_ids(id: i64, all: &[Category]) -> Vec<i64> {
    let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
    for c in all {
        if let Some(pid) = c.parent_id {
            children.entry(pid).or_default().push(c.id);
        }
    }

    let mut seen = HashSet::from([id]);
    let mut out = Vec::new();
    let mut frontier = vec![id];
    while !frontier.is_empty() {
        let mut next = Vec::new();
        for parent in frontier {
            for &child in children.get(&parent).into_iter().flatten() {
                if seen.insert(child) {
                    out.push(child);
                    next.push(child);
                }
            }
        }
        frontier = next;
    }
    out
}

/// Validate a create payload and build the new record
pub fn prepare_create(
    id: i64,
    payload: CategoryCreate,
    all: &[Category],
    config: &CatalogConfig,
) -> CatalogResult<Category> {
    let mut violations = Vec::new();

    if all.iter().any(|c| c.id == id) {
        violations.push(FieldViolation::new(
            "id",
            ErrorCode::AlreadyExists,
            format!("category {id} already exists"),
        ));
    }
    require_text(&mut violations, &payload.name, "name", config.max_name_len);
    optional_text(&mut violations, payload.description.as_deref(), "description", MAX_NOTE_LEN);
    optional_text(&mut violations, payload.image.as_deref(), "image", MAX_URL_LEN);

    let level = match payload.parent_id {
        None => 0,
        Some(pid) => match all.iter().find(|c| c.id == pid) {
            None => {
                violations.push(FieldViolation::new(
                    "parent_id",
                    ErrorCode::CategoryParentNotFound,
                    format!("parent category {pid} does not exist"),
                ));
                0
            }
            Some(parent) => {
                check_parent(&mut violations, parent, config);
                parent.level + 1
            }
        },
    };

    let name = payload.name.trim().to_string();
    let group = siblings(all, payload.parent_id);
    check_name_free(&mut violations, &name, &group, None);
    let sort_order = match payload.sort_order {
        Some(explicit) => {
            check_sort_order_free(&mut violations, explicit, &group, None);
            explicit
        }
        None => group
            .iter()
            .map(|c| c.sort_order)
            .max()
            .map_or(0, |max| max.saturating_add(1)),
    };

    if let Some(fid) = payload.fallback_category_id {
        check_fallback(&mut violations, fid, id, all);
    }

    CatalogError::check(violations)?;

    let slugs: Vec<&str> = all.iter().map(|c| c.slug.as_str()).collect();
    let category = Category {
        id,
        slug: unique_slug(&name, &slugs),
        name,
        parent_id: payload.parent_id,
        level,
        sort_order,
        description: payload.description,
        image: payload.image,
        is_active: payload.is_active.unwrap_or(true),
        is_archived: false,
        fallback_category_id: payload.fallback_category_id,
        meta_fields: Vec::new(),
        sub_categories: Vec::new(),
    };
    tracing::debug!(id, slug = %category.slug, level, sort_order, "Category prepared");
    Ok(category)
}

/// Apply description / image / active changes
pub fn apply_update(id: i64, patch: CategoryUpdate, all: &[Category]) -> CatalogResult<Category> {
    let mut category = find(all, id)?.clone();

    let mut violations = Vec::new();
    optional_text(&mut violations, patch.description.as_deref(), "description", MAX_NOTE_LEN);
    optional_text(&mut violations, patch.image.as_deref(), "image", MAX_URL_LEN);
    CatalogError::check(violations)?;

    if let Some(description) = patch.description {
        category.description = Some(description).filter(|d| !d.is_empty());
    }
    if let Some(image) = patch.image {
        category.image = Some(image).filter(|i| !i.is_empty());
    }
    if let Some(is_active) = patch.is_active {
        category.is_active = is_active;
    }
    Ok(category)
}

/// Change the name and regenerate the slug; the id stays
pub fn rename(
    id: i64,
    new_name: &str,
    all: &[Category],
    config: &CatalogConfig,
) -> CatalogResult<Category> {
    let current = find(all, id)?;
    let name = new_name.trim();

    let mut violations = Vec::new();
    require_text(&mut violations, name, "name", config.max_name_len);
    check_name_free(&mut violations, name, &siblings(all, current.parent_id), Some(id));
    CatalogError::check(violations)?;

    let other_slugs: Vec<&str> = all
        .iter()
        .filter(|c| c.id != id)
        .map(|c| c.slug.as_str())
        .collect();
    let mut category = current.clone();
    category.name = name.to_string();
    category.slug = unique_slug(name, &other_slugs);
    tracing::debug!(id, slug = %category.slug, "Category renamed");
    Ok(category)
}

/// Re-parent `id` under `new_parent_id` (`None` makes it a root)
pub fn move_category(
    id: i64,
    new_parent_id: Option<i64>,
    all: &[Category],
    config: &CatalogConfig,
) -> CatalogResult<MovePlan> {
    let current = find(all, id)?;
    let descendants = descendant_ids(id, all);

    let new_level = match new_parent_id {
        None => 0,
        Some(pid) if pid == id || descendants.contains(&pid) => {
            tracing::warn!(id, new_parent_id = pid, "Refusing move under own subtree");
            return Err(CatalogError::CyclicHierarchy(vec![id, pid]));
        }
        Some(pid) => {
            let parent = find(all, pid).map_err(|_| {
                CatalogError::violation(
                    "parent_id",
                    ErrorCode::CategoryParentNotFound,
                    format!("parent category {pid} does not exist"),
                )
            })?;
            let mut violations = Vec::new();
            check_parent(&mut violations, parent, config);
            CatalogError::check(violations)?;
            parent.level + 1
        }
    };

    let mut violations = Vec::new();
    check_name_free(&mut violations, &current.name, &siblings(all, new_parent_id), Some(id));
    CatalogError::check(violations)?;

    let levels = subtree_levels(id, new_level, all);
    let deepest = levels.iter().map(|u| u.level).max().unwrap_or(new_level);
    if deepest > config.max_depth {
        return Err(CatalogError::violation(
            "parent_id",
            ErrorCode::CategoryDepthExceeded,
            format!("subtree would reach level {deepest}, max {}", config.max_depth),
        ));
    }

    let mut category = current.clone();
    if category.parent_id != new_parent_id {
        let group = siblings(all, new_parent_id);
        category.sort_order = group
            .iter()
            .filter(|c| c.id != id)
            .map(|c| c.sort_order)
            .max()
            .map_or(0, |max| max.saturating_add(1));
    }
    category.parent_id = new_parent_id;
    category.level = new_level;
    tracing::debug!(id, ?new_parent_id, level = new_level, moved = levels.len(), "Category moved");

    Ok(MovePlan {
        category,
        level_updates: levels,
    })
}

pub fn set_active(id: i64, is_active: bool, all: &[Category]) -> CatalogResult<Category> {
    let mut category = find(all, id)?.clone();
    category.is_active = is_active;
    Ok(category)
}

/// Archiving also hides the category
pub fn set_archived(id: i64, is_archived: bool, all: &[Category]) -> CatalogResult<Category> {
    let mut category = find(all, id)?.clone();
    category.is_archived = is_archived;
    if is_archived {
        category.is_active = false;
        let dependents = all
            .iter()
            .filter(|c| c.fallback_category_id == Some(id))
            .count();
        if dependents > 0 {
            tracing::warn!(id, dependents, "Archived category is still used as a fallback");
        }
    }
    Ok(category)
}

/// Point the category's fallback at `fallback_id` (`None` clears it)
///
/// A resulting cycle is accepted and logged; it is rejected when resolved.
pub fn set_fallback(
    id: i64,
    fallback_id: Option<i64>,
    all: &[Category],
) -> CatalogResult<Category> {
    let mut category = find(all, id)?.clone();

    if let Some(fid) = fallback_id {
        let mut violations = Vec::new();
        check_fallback(&mut violations, fid, id, all);
        CatalogError::check(violations)?;

        if FallbackResolver::new(all).leads_to(fid, id) {
            tracing::warn!(id, fallback_id = fid, "Fallback link closes a cycle");
        }
    }
    category.fallback_category_id = fallback_id;
    Ok(category)
}

/// Reorder the children of `parent_id`
pub fn reorder_siblings(
    parent_id: Option<i64>,
    new_order: &[i64],
    all: &[Category],
) -> CatalogResult<Vec<SortOrderUpdate>> {
    let group: Vec<Category> = siblings(all, parent_id).into_iter().cloned().collect();
    ordering::reorder(&group, new_order)
}

fn subtree_levels(id: i64, new_level: u32, all: &[Category]) -> Vec<LevelUpdate> {
    let mut levels = vec![LevelUpdate { id, level: new_level }];
    let mut depth_of: HashMap<i64, u32> = HashMap::from([(id, new_level)]);
    for child in descendant_ids(id, all) {
        let parent_level = find(all, child)
            .ok()
            .and_then(|c| c.parent_id)
            .and_then(|pid| depth_of.get(&pid).copied())
            .unwrap_or(new_level);
        depth_of.insert(child, parent_level + 1);
        levels.push(LevelUpdate {
            id: child,
            level: parent_level + 1,
        });
    }
    levels
}

fn check_parent(violations: &mut Vec<FieldViolation>, parent: &Category, config: &CatalogConfig) {
    if parent.is_archived {
        violations.push(FieldViolation::new(
            "parent_id",
            ErrorCode::InvalidRequest,
            format!("parent category {} is archived", parent.id),
        ));
    }
    if parent.level >= config.max_depth {
        violations.push(FieldViolation::new(
            "parent_id",
            ErrorCode::CategoryDepthExceeded,
            format!(
                "parent category {} is at level {}, children allowed up to level {}",
                parent.id, parent.level, config.max_depth
            ),
        ));
    }
}

fn check_fallback(violations: &mut Vec<FieldViolation>, fallback_id: i64, id: i64, all: &[Category]) {
    let problem = if fallback_id == id {
        Some("a category cannot fall back to itself".to_string())
    } else {
        match all.iter().find(|c| c.id == fallback_id) {
            None => Some(format!("fallback category {fallback_id} does not exist")),
            Some(target) if target.is_archived => {
                Some(format!("fallback category {fallback_id} is archived"))
            }
            Some(_) => None,
        }
    };
    if let Some(message) = problem {
        violations.push(FieldViolation::new(
            "fallback_category_id",
            ErrorCode::CategoryFallbackInvalid,
            message,
        ));
    }
}

fn check_name_free(
    violations: &mut Vec<FieldViolation>,
    name: &str,
    group: &[&Category],
    except_id: Option<i64>,
) {
    if group
        .iter()
        .any(|c| Some(c.id) != except_id && c.name.eq_ignore_ascii_case(name))
    {
        violations.push(FieldViolation::new(
            "name",
            ErrorCode::CategoryNameExists,
            format!("a sibling named {name:?} already exists"),
        ));
    }
}

fn check_sort_order_free(
    violations: &mut Vec<FieldViolation>,
    sort_order: i32,
    group: &[&Category],
    except_id: Option<i64>,
) {
    if let Some(other) = group
        .iter()
        .find(|c| Some(c.id) != except_id && c.sort_order == sort_order)
    {
        violations.push(FieldViolation::new(
            "sort_order",
            ErrorCode::CategorySortOrderConflict,
            format!("sort order {sort_order} is already used by category {}", other.id),
        ));
    }
}
