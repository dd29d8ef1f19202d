//! Ordering engine
//!
//! Turns a permutation of an ordered collection into an explicit, dense,
//! zero-based `sort_order` assignment. Used for sibling categories,
//! sub-categories and meta fields alike. Nothing here mutates the input;
//! callers persist the returned assignment (or write it back with [`apply_order`]).

use serde::{Deserialize, Serialize};
use shared::error::ErrorCode;
use shared::models::{Category, MetaField, SortOrderUpdate, SubCategory};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use crate::error::{CatalogError, CatalogResult, FieldViolation};

/// An entity with an explicit rank among its siblings
pub trait Ranked {
    type Id: Clone + Eq + Hash + fmt::Display;

    fn rank_id(&self) -> Self::Id;
    fn sort_order(&self) -> i32;
    fn set_sort_order(&mut self, sort_order: i32);
}

impl Ranked for Category {
    type Id = i64;

    fn rank_id(&self) -> i64 {
        self.id
    }
    fn sort_order(&self) -> i32 {
        self.sort_order
    }
    fn set_sort_order(&mut self, sort_order: i32) {
        self.sort_order = sort_order;
    }
}

impl Ranked for MetaField {
    type Id = String;

    fn rank_id(&self) -> String {
        self.key.clone()
    }
    fn sort_order(&self) -> i32 {
        self.sort_order
    }
    fn set_sort_order(&mut self, sort_order: i32) {
        self.sort_order = sort_order;
    }
}

impl Ranked for SubCategory {
    type Id = String;

    fn rank_id(&self) -> String {
        self.slug.clone()
    }
    fn sort_order(&self) -> i32 {
        self.sort_order
    }
    fn set_sort_order(&mut self, sort_order: i32) {
        self.sort_order = sort_order;
    }
}

/// Single-step move direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
}

/// Ids in display order (by `sort_order`, ties keep input position)
pub fn current_order<T: Ranked>(items: &[T]) -> Vec<T::Id> {
    let mut indexed: Vec<(usize, &T)> = items.iter().enumerate().collect();
    indexed.sort_by_key(|(idx, item)| (item.sort_order(), *idx));
    indexed.into_iter().map(|(_, item)| item.rank_id()).collect()
}

/// Rank for an item appended after every existing one
pub fn next_sort_order<T: Ranked>(items: &[T]) -> i32 {
    items
        .iter()
        .map(Ranked::sort_order)
        .max()
        .map_or(0, |max| max.saturating_add(1))
}

/// Dense assignment for the current display order
pub fn normalize_order<T: Ranked>(items: &[T]) -> Vec<SortOrderUpdate<T::Id>> {
    assign(current_order(items))
}

/// Assignment following `new_order`, which must be a permutation of the item ids
pub fn reorder<T: Ranked>(
    items: &[T],
    new_order: &[T::Id],
) -> CatalogResult<Vec<SortOrderUpdate<T::Id>>> {
    check_permutation(items, new_order)?;
    tracing::debug!(count = new_order.len(), "Computed new sort order");
    Ok(assign(new_order.iter().cloned()))
}

/// Swap `id` with its neighbour; moving past either end leaves the order unchanged
pub fn move_item<T: Ranked>(
    items: &[T],
    id: &T::Id,
    direction: MoveDirection,
) -> CatalogResult<Vec<SortOrderUpdate<T::Id>>> {
    let mut order = current_order(items);
    let pos = order.iter().position(|candidate| candidate == id).ok_or_else(|| {
        CatalogError::violation(
            "order",
            ErrorCode::OrderingInvalidPermutation,
            format!("unknown id {id}"),
        )
    })?;

    match direction {
        MoveDirection::Up if pos > 0 => order.swap(pos, pos - 1),
        MoveDirection::Down if pos + 1 < order.len() => order.swap(pos, pos + 1),
        _ => tracing::debug!(id = %id, ?direction, "Move past boundary ignored"),
    }

    Ok(assign(order))
}

/// Write an assignment back onto the records, returning how many changed
pub fn apply_order<T: Ranked>(items: &mut [T], updates: &[SortOrderUpdate<T::Id>]) -> usize {
    let ranks: HashMap<&T::Id, i32> = updates.iter().map(|u| (&u.id, u.sort_order)).collect();
    let mut changed = 0;
    for item in items.iter_mut() {
        if let Some(&rank) = ranks.get(&item.rank_id())
            && item.sort_order() != rank
        {
            item.set_sort_order(rank);
            changed += 1;
        }
    }
    changed
}

fn assign<Id>(order: impl IntoIterator<Item = Id>) -> Vec<SortOrderUpdate<Id>> {
    order
        .into_iter()
        .zip(0..)
        .map(|(id, rank)| SortOrderUpdate::new(id, rank))
        .collect()
}

fn check_permutation<T: Ranked>(items: &[T], new_order: &[T::Id]) -> CatalogResult<()> {
    let known: HashSet<T::Id> = items.iter().map(Ranked::rank_id).collect();
    let mut seen: HashSet<&T::Id> = HashSet::with_capacity(new_order.len());
    let mut violations = Vec::new();

    for id in new_order {
        if !known.contains(id) {
            violations.push(permutation_violation(format!("unknown id {id}")));
        } else if !seen.insert(id) {
            violations.push(permutation_violation(format!("duplicate id {id}")));
        }
    }
    for id in current_order(items) {
        if !seen.contains(&id) {
            violations.push(permutation_violation(format!("missing id {id}")));
        }
    }

    CatalogError::check(violations)
}

fn permutation_violation(message: String) -> FieldViolation {
    FieldViolation::new("order", ErrorCode::OrderingInvalidPermutation, message)
}
