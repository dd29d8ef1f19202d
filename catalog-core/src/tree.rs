//! Category tree builder
//!
//! Turns a flat snapshot into a forest. Siblings are ordered by
//! `(sort_order, name, id)`. A parent id that is missing from the snapshot
//! makes the category a root (logged). A parent cycle, including a category
//! that is its own parent, fails the whole build with
//! [`CatalogError::CyclicHierarchy`].
//!
//! Nodes deeper than `max_depth` are kept and flagged; [`CategoryForest::can_add_child`]
//! is what callers consult before offering "add child".

use serde::{Deserialize, Serialize};
use shared::error::ErrorCode;
use shared::models::Category;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::error::{CatalogError, CatalogResult, FieldViolation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub category: Category,
    /// Computed depth, roots are 0
    pub depth: u32,
    pub exceeds_max_depth: bool,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn id(&self) -> i64 {
        self.category.id
    }
}

// Long parent chains must not be dropped one stack frame per level
impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Row of a depth-first listing (selection dropdowns)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatEntry {
    pub id: i64,
    pub name: String,
    pub depth: u32,
}

/// A category whose stored level disagrees with its place in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelMismatch {
    pub id: i64,
    pub stored_level: u32,
    pub computed_depth: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryForest {
    roots: Vec<TreeNode>,
    max_depth: u32,
    len: usize,
}

impl CategoryForest {
    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<TreeNode> {
        self.roots
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Total node count
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pre-order traversal
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        let mut stack: Vec<&TreeNode> = self.roots.iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    pub fn find(&self, id: i64) -> Option<&TreeNode> {
        self.iter().find(|node| node.id() == id)
    }

    /// Breadcrumb from a root down to `id`
    pub fn path_to(&self, id: i64) -> Option<Vec<&Category>> {
        let mut path = Vec::new();
        for node in self.iter() {
            path.truncate(node.depth as usize);
            path.push(&node.category);
            if node.id() == id {
                return Some(path);
            }
        }
        None
    }

    pub fn flatten(&self) -> Vec<FlatEntry> {
        self.iter()
            .map(|node| FlatEntry {
                id: node.id(),
                name: node.category.name.clone(),
                depth: node.depth,
            })
            .collect()
    }

    /// Whether a child may be added under `id`
    pub fn can_add_child(&self, id: i64) -> bool {
        self.find(id).is_some_and(|node| node.depth < self.max_depth)
    }

    pub fn level_mismatches(&self) -> Vec<LevelMismatch> {
        self.iter()
            .filter(|node| node.category.level != node.depth)
            .map(|node| LevelMismatch {
                id: node.id(),
                stored_level: node.category.level,
                computed_depth: node.depth,
            })
            .collect()
    }
}

/// Build the forest for a flat snapshot
pub fn build(flat: &[Category], max_depth: u32) -> CatalogResult<CategoryForest> {
    let by_id = index_unique(flat)?;

    if let Some(cycle) = hierarchy_cycles(flat).into_iter().next() {
        tracing::warn!(?cycle, "Cyclic category hierarchy");
        return Err(CatalogError::CyclicHierarchy(cycle));
    }

    let mut children: ChildIndex<'_> = HashMap::new();
    for category in flat {
        let parent = match category.parent_id {
            Some(pid) if by_id.contains_key(&pid) => Some(pid),
            Some(pid) => {
                tracing::warn!(id = category.id, parent_id = pid, "Parent not in snapshot, treating as root");
                None
            }
            None => None,
        };
        children.entry(parent).or_default().push(category);
    }
    for group in children.values_mut() {
        group.sort_by(|a, b| sibling_order(a, b));
    }

    let roots = attach(&children, max_depth);
    let forest = CategoryForest {
        roots,
        max_depth,
        len: flat.len(),
    };

    let mismatches = forest.level_mismatches();
    if !mismatches.is_empty() {
        tracing::warn!(count = mismatches.len(), ?mismatches, "Stored levels disagree with hierarchy");
    }
    tracing::debug!(nodes = forest.len(), roots = forest.roots.len(), "Category tree built");
    Ok(forest)
}

/// Fail listing every category whose stored level disagrees with its depth
pub fn validate_levels(flat: &[Category]) -> CatalogResult<()> {
    let forest = build(flat, u32::MAX)?;
    let violations = forest
        .level_mismatches()
        .into_iter()
        .map(|m| {
            FieldViolation::new(
                "level",
                ErrorCode::CategoryLevelMismatch,
                format!(
                    "category {} has level {} but sits at depth {}",
                    m.id, m.stored_level, m.computed_depth
                ),
            )
        })
        .collect();
    CatalogError::check(violations)
}

/// Sibling display order
pub fn sibling_order(a: &Category, b: &Category) -> Ordering {
    a.sort_order
        .cmp(&b.sort_order)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

type ChildIndex<'a> = HashMap<Option<i64>, Vec<&'a Category>>;

struct Frame<'m, 'a> {
    category: Option<&'a Category>,
    child_depth: u32,
    group: &'m [&'a Category],
    next: usize,
    built: Vec<TreeNode>,
}

fn group<'m, 'a>(children: &'m ChildIndex<'a>, parent: Option<i64>) -> &'m [&'a Category] {
    children.get(&parent).map(Vec::as_slice).unwrap_or(&[])
}

/// Assemble nodes depth-first with an explicit stack, children before parents
fn attach(children: &ChildIndex<'_>, max_depth: u32) -> Vec<TreeNode> {
    let mut stack = vec![Frame {
        category: None,
        child_depth: 0,
        group: group(children, None),
        next: 0,
        built: Vec::new(),
    }];

    loop {
        let next = match stack.last_mut() {
            Some(frame) => {
                let next = frame.group.get(frame.next).copied();
                if next.is_some() {
                    frame.next += 1;
                }
                next.map(|category| (category, frame.child_depth))
            }
            None => return Vec::new(),
        };

        if let Some((category, depth)) = next {
            stack.push(Frame {
                category: Some(category),
                child_depth: depth + 1,
                group: group(children, Some(category.id)),
                next: 0,
                built: Vec::new(),
            });
            continue;
        }

        let Some(done) = stack.pop() else {
            return Vec::new();
        };
        let Some(category) = done.category else {
            return done.built;
        };
        let depth = done.child_depth - 1;
        let node = TreeNode {
            category: category.clone(),
            depth,
            exceeds_max_depth: depth > max_depth,
            children: done.built,
        };
        if let Some(parent) = stack.last_mut() {
            parent.built.push(node);
        }
    }
}

fn index_unique(flat: &[Category]) -> CatalogResult<HashMap<i64, &Category>> {
    let mut by_id = HashMap::with_capacity(flat.len());
    let mut violations = Vec::new();
    for category in flat {
        if by_id.insert(category.id, category).is_some() {
            violations.push(FieldViolation::new(
                "id",
                ErrorCode::AlreadyExists,
                format!("duplicate category id {}", category.id),
            ));
        }
    }
    CatalogError::check(violations)?;
    Ok(by_id)
}

/// Every parent cycle in the snapshot, each listed from its first-reached member
///
/// Missing parents end a chain. With duplicate ids the last record wins.
pub(crate) fn hierarchy_cycles(flat: &[Category]) -> Vec<Vec<i64>> {
    let parent_of: HashMap<i64, Option<i64>> =
        flat.iter().map(|c| (c.id, c.parent_id)).collect();
    let mut done: HashSet<i64> = HashSet::new();
    let mut cycles = Vec::new();

    for category in flat {
        let mut path: Vec<i64> = Vec::new();
        let mut on_path: HashSet<i64> = HashSet::new();
        let mut current = Some(category.id);

        while let Some(id) = current {
            if done.contains(&id) {
                break;
            }
            if !on_path.insert(id) {
                if let Some(start) = path.iter().position(|&p| p == id) {
                    cycles.push(path[start..].to_vec());
                }
                break;
            }
            path.push(id);
            current = parent_of.get(&id).copied().flatten();
            if current.is_some_and(|pid| !parent_of.contains_key(&pid)) {
                current = None;
            }
        }
        done.extend(path);
    }
    cycles
}
