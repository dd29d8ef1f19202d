//! Sort order assignment types

use serde::{Deserialize, Serialize};

/// One entry of a batch sort order update (used by categories, sub-categories and meta fields)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrderUpdate<Id = i64> {
    pub id: Id,
    pub sort_order: i32,
}

impl<Id> SortOrderUpdate<Id> {
    pub fn new(id: Id, sort_order: i32) -> Self {
        Self { id, sort_order }
    }
}

