//! Fallback resolver
//!
//! Decides whether a category may be deleted and where its products go.
//! Fallback links may form cycles at rest; walking one is refused with
//! [`CatalogError::CyclicFallback`] instead of looping.

use serde::{Deserialize, Serialize};
use shared::models::Category;
use std::collections::{HashMap, HashSet};

use crate::error::{CatalogError, CatalogResult, UnsafeReason};

/// Outcome of a deletion safety check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum DeletionSafety {
    Safe,
    Unsafe(UnsafeReason),
}

impl DeletionSafety {
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Safe)
    }
}

/// A category whose fallback pointed at the deleted one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackRedirect {
    pub category_id: i64,
    /// New fallback; `None` clears it
    pub to: Option<i64>,
}

/// Everything the store has to do in one transaction to delete a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionPlan {
    pub delete_category_id: i64,
    pub product_count: u64,
    pub reassign_products_to: Option<i64>,
    /// Owned schema, destroyed with the category
    pub removed_meta_keys: Vec<String>,
    pub removed_sub_category_slugs: Vec<String>,
    /// Direct children, left for the caller to move or delete first
    pub child_category_ids: Vec<i64>,
    pub redirect_fallbacks: Vec<FallbackRedirect>,
}

/// Read-only view over one snapshot
pub struct FallbackResolver<'a> {
    categories: &'a [Category],
    by_id: HashMap<i64, &'a Category>,
}

impl<'a> FallbackResolver<'a> {
    pub fn new(categories: &'a [Category]) -> Self {
        Self {
            categories,
            by_id: categories.iter().map(|c| (c.id, c)).collect(),
        }
    }

    pub fn get(&self, id: i64) -> Option<&'a Category> {
        self.by_id.get(&id).copied()
    }

    /// Deletion with no products is always safe. Otherwise the override (or the
    /// category's own fallback) must exist, differ from the category and not be archived.
    pub fn can_delete(
        &self,
        category: &Category,
        product_count: u64,
        override_fallback: Option<i64>,
    ) -> DeletionSafety {
        if product_count == 0 {
            return DeletionSafety::Safe;
        }
        match self.check_target(category, override_fallback) {
            Ok(_) => DeletionSafety::Safe,
            Err(reason) => DeletionSafety::Unsafe(reason),
        }
    }

    /// Ids visited following fallback links from `category`, itself first
    pub fn fallback_chain(&self, category: &Category) -> CatalogResult<Vec<i64>> {
        self.walk(category, None)
    }

    /// Last category of the chain (the one with no fallback set)
    pub fn resolve_fallback_chain(&self, category: &Category) -> CatalogResult<i64> {
        let chain = self.fallback_chain(category)?;
        Ok(chain.last().copied().unwrap_or(category.id))
    }

    /// Whether following fallback links from `from` ever reaches `to`
    pub fn leads_to(&self, from: i64, to: i64) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(from);
        while let Some(id) = current {
            if id == to {
                return true;
            }
            if !seen.insert(id) {
                return false;
            }
            current = self.get(id).and_then(|c| c.fallback_category_id);
        }
        false
    }

    pub fn plan_deletion(
        &self,
        category: &Category,
        product_count: u64,
        override_fallback: Option<i64>,
    ) -> CatalogResult<DeletionPlan> {
        let target = match self.check_target(category, override_fallback) {
            Ok(target) => Some(target),
            Err(reason) if product_count > 0 => {
                tracing::warn!(category_id = category.id, product_count, %reason, "Refusing unsafe deletion");
                return Err(CatalogError::UnsafeDeletion {
                    category_id: category.id,
                    reason,
                });
            }
            Err(reason) => {
                if !matches!(reason, UnsafeReason::NoFallback) {
                    tracing::debug!(category_id = category.id, %reason, "Ignoring unusable fallback for empty category");
                }
                None
            }
        };

        // only products need a resolvable chain; the deleted category drops out of it
        if let Some(target) = target.filter(|_| product_count > 0) {
            self.walk(target, Some(category.id))?;
        }
        let target_id = target.map(|t| t.id);

        let mut children: Vec<&Category> = self
            .categories
            .iter()
            .filter(|c| c.parent_id == Some(category.id) && c.id != category.id)
            .collect();
        children.sort_by(|a, b| crate::tree::sibling_order(a, b));

        let redirect_fallbacks = self
            .categories
            .iter()
            .filter(|c| c.id != category.id && c.fallback_category_id == Some(category.id))
            .map(|c| FallbackRedirect {
                category_id: c.id,
                to: target_id.filter(|&t| t != c.id),
            })
            .collect();

        let plan = DeletionPlan {
            delete_category_id: category.id,
            product_count,
            reassign_products_to: target_id.filter(|_| product_count > 0),
            removed_meta_keys: category.meta_fields.iter().map(|f| f.key.clone()).collect(),
            removed_sub_category_slugs: category
                .sub_categories
                .iter()
                .map(|s| s.slug.clone())
                .collect(),
            child_category_ids: children.iter().map(|c| c.id).collect(),
            redirect_fallbacks,
        };

        if let Some(to) = plan.reassign_products_to {
            tracing::info!(category_id = category.id, product_count, to, "Deletion will reassign products");
        }
        Ok(plan)
    }

    fn check_target(
        &self,
        category: &Category,
        override_fallback: Option<i64>,
    ) -> Result<&'a Category, UnsafeReason> {
        let target_id = override_fallback
            .or(category.fallback_category_id)
            .ok_or(UnsafeReason::NoFallback)?;
        if target_id == category.id {
            return Err(UnsafeReason::FallbackIsSelf);
        }
        let target = self
            .get(target_id)
            .ok_or(UnsafeReason::FallbackNotFound(target_id))?;
        if target.is_archived {
            return Err(UnsafeReason::FallbackArchived(target_id));
        }
        Ok(target)
    }

    /// Follow links from `start`; a link to `stop_before` ends the chain
    fn walk(&self, start: &Category, stop_before: Option<i64>) -> CatalogResult<Vec<i64>> {
        let mut chain = vec![start.id];
        let mut current = start;

        while let Some(next_id) = current.fallback_category_id {
            if Some(next_id) == stop_before {
                break;
            }
            if let Some(pos) = chain.iter().position(|&id| id == next_id) {
                let cycle = chain[pos..].to_vec();
                tracing::warn!(?cycle, "Cyclic fallback chain");
                return Err(CatalogError::CyclicFallback(cycle));
            }
            current = self
                .get(next_id)
                .ok_or(CatalogError::CategoryNotFound(next_id))?;
            chain.push(next_id);
        }
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(id: i64, fallback: Option<i64>) -> Category {
        Category {
            id,
            name: format!("C{id}"),
            slug: format!("c{id}"),
            parent_id: None,
            level: 0,
            sort_order: id as i32,
            description: None,
            image: None,
            is_active: true,
            is_archived: false,
            fallback_category_id: fallback,
            meta_fields: Vec::new(),
            sub_categories: Vec::new(),
        }
    }

    #[test]
    fn test_can_delete_without_products() {
        let all = vec![cat(1, None)];
        let resolver = FallbackResolver::new(&all);
        assert!(resolver.can_delete(&all[0], 0, None).is_safe());
    }

    #[test]
    fn test_can_delete_reasons() {
        let mut archived = cat(4, None);
        archived.is_archived = true;
        let all = vec![cat(1, None), cat(2, Some(2)), cat(3, Some(99)), archived, cat(5, Some(4))];
        let resolver = FallbackResolver::new(&all);

        assert_eq!(
            resolver.can_delete(&all[0], 5, None),
            DeletionSafety::Unsafe(UnsafeReason::NoFallback)
        );
        assert_eq!(
            resolver.can_delete(&all[1], 5, None),
            DeletionSafety::Unsafe(UnsafeReason::FallbackIsSelf)
        );
        assert_eq!(
            resolver.can_delete(&all[2], 5, None),
            DeletionSafety::Unsafe(UnsafeReason::FallbackNotFound(99))
        );
        assert_eq!(
            resolver.can_delete(&all[4], 5, None),
            DeletionSafety::Unsafe(UnsafeReason::FallbackArchived(4))
        );
        // override wins over the stored fallback
        assert!(resolver.can_delete(&all[4], 5, Some(1)).is_safe());
    }

    #[test]
    fn test_resolve_chain_to_terminal() {
        let all = vec![cat(1, Some(2)), cat(2, Some(3)), cat(3, None)];
        let resolver = FallbackResolver::new(&all);
        assert_eq!(resolver.fallback_chain(&all[0]).unwrap(), vec![1, 2, 3]);
        assert_eq!(resolver.resolve_fallback_chain(&all[0]).unwrap(), 3);
        assert_eq!(resolver.resolve_fallback_chain(&all[2]).unwrap(), 3);
    }

    #[test]
    fn test_resolve_chain_rejects_cycle() {
        let all = vec![cat(1, Some(2)), cat(2, Some(3)), cat(3, Some(2))];
        let resolver = FallbackResolver::new(&all);
        assert_eq!(
            resolver.resolve_fallback_chain(&all[0]),
            Err(CatalogError::CyclicFallback(vec![2, 3]))
        );
    }

    #[test]
    fn test_resolve_chain_missing_link() {
        let all = vec![cat(1, Some(7))];
        let resolver = FallbackResolver::new(&all);
        assert_eq!(
            resolver.fallback_chain(&all[0]),
            Err(CatalogError::CategoryNotFound(7))
        );
    }

    #[test]
    fn test_leads_to() {
        let all = vec![cat(1, Some(2)), cat(2, Some(1)), cat(3, None)];
        let resolver = FallbackResolver::new(&all);
        assert!(resolver.leads_to(1, 2));
        assert!(resolver.leads_to(2, 1));
        assert!(!resolver.leads_to(1, 3));
    }

    #[test]
    fn test_plan_deletion_refuses_unsafe() {
        let all = vec![cat(1, None)];
        let resolver = FallbackResolver::new(&all);
        assert_eq!(
            resolver.plan_deletion(&all[0], 3, None),
            Err(CatalogError::UnsafeDeletion {
                category_id: 1,
                reason: UnsafeReason::NoFallback
            })
        );
    }

    #[test]
    fn test_plan_deletion_redirects_fallbacks() {
        let mut doomed = cat(1, Some(2));
        doomed.sub_categories.push(shared::models::SubCategory {
            name: "Cases".to_string(),
            slug: "cases".to_string(),
            image: None,
            is_active: true,
            sort_order: 0,
        });
        let mut child = cat(4, None);
        child.parent_id = Some(1);
        child.level = 1;
        // 2 points back at 1: the cycle disappears with the deletion
        let all = vec![doomed, cat(2, Some(1)), cat(3, Some(1)), child];
        let resolver = FallbackResolver::new(&all);

        let plan = resolver.plan_deletion(&all[0], 5, None).unwrap();
        assert_eq!(plan.reassign_products_to, Some(2));
        assert_eq!(plan.removed_sub_category_slugs, vec!["cases"]);
        assert_eq!(plan.child_category_ids, vec![4]);
        assert_eq!(
            plan.redirect_fallbacks,
            vec![
                FallbackRedirect { category_id: 2, to: None },
                FallbackRedirect { category_id: 3, to: Some(2) },
            ]
        );
    }

    #[test]
    fn test_plan_deletion_checks_chain_from_target() {
        let all = vec![cat(1, Some(2)), cat(2, Some(3)), cat(3, Some(2))];
        let resolver = FallbackResolver::new(&all);
        assert_eq!(
            resolver.plan_deletion(&all[0], 1, None),
            Err(CatalogError::CyclicFallback(vec![2, 3]))
        );
    }

    #[test]
    fn test_plan_deletion_of_empty_category() {
        let all = vec![cat(1, Some(1))];
        let resolver = FallbackResolver::new(&all);
        let plan = resolver.plan_deletion(&all[0], 0, None).unwrap();
        assert_eq!(plan.reassign_products_to, None);
        assert!(plan.redirect_fallbacks.is_empty());
    }

    #[test]
    fn test_plan_deletion_of_empty_category_ignores_cyclic_chain() {
        let all = vec![cat(1, Some(2)), cat(2, Some(3)), cat(3, Some(2)), cat(4, Some(1))];
        let resolver = FallbackResolver::new(&all);
        assert!(resolver.can_delete(&all[0], 0, None).is_safe());

        let plan = resolver.plan_deletion(&all[0], 0, None).unwrap();
        assert_eq!(plan.reassign_products_to, None);
        assert_eq!(
            plan.redirect_fallbacks,
            vec![FallbackRedirect { category_id: 4, to: Some(2) }]
        );
    }

    #[test]
    fn test_plan_deletion_override_wins_over_stored_fallback() {
        let mut archived = cat(2, None);
        archived.is_archived = true;
        let all = vec![cat(1, Some(2)), archived, cat(3, None), cat(4, Some(1))];
        let resolver = FallbackResolver::new(&all);

        let plan = resolver.plan_deletion(&all[0], 5, Some(3)).unwrap();
        assert_eq!(plan.reassign_products_to, Some(3));
        assert_eq!(
            plan.redirect_fallbacks,
            vec![FallbackRedirect { category_id: 4, to: Some(3) }]
        );

        let missing = vec![cat(1, Some(99)), cat(3, None)];
        let resolver = FallbackResolver::new(&missing);
        let plan = resolver.plan_deletion(&missing[0], 5, Some(3)).unwrap();
        assert_eq!(plan.reassign_products_to, Some(3));
    }

    #[test]
    fn test_plan_deletion_override_to_self_is_unsafe() {
        let all = vec![cat(1, Some(2)), cat(2, None)];
        let resolver = FallbackResolver::new(&all);
        assert_eq!(
            resolver.plan_deletion(&all[0], 5, Some(1)),
            Err(CatalogError::UnsafeDeletion {
                category_id: 1,
                reason: UnsafeReason::FallbackIsSelf
            })
        );
    }
}
