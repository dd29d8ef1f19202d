//! Catalog core - category hierarchy and product attribute schema
//!
//! Pure computations over records supplied by an external catalog store.
//! Nothing here performs I/O; every operation either returns the records the
//! store should persist or a typed [`CatalogError`].
//!
//! # Module layout
//!
//! ```text
//! catalog-core/src/
//! ├── ordering.rs      # dense zero-based rank assignment
//! ├── schema_key.rs    # meta field key format, uniqueness, rename
//! ├── meta_schema/     # per-category field schema, coercion, product values
//! ├── tree.rs          # flat list -> forest, cycle detection
//! ├── fallback.rs      # deletion safety, fallback chains, deletion plans
//! ├── category.rs      # category create / rename / move planning
//! ├── subcategory.rs   # sub-category list of one category
//! ├── audit.rs         # snapshot integrity report
//! ├── slug.rs
//! ├── validation.rs
//! ├── config.rs
//! └── error.rs
//! ```
//!
//! Tree building and fallback resolution are read-only and may run
//! concurrently over one snapshot. Schema and sub-category edits on the same
//! category must be serialized by the caller.

pub mod audit;
pub mod category;
pub mod config;
pub mod error;
pub mod fallback;
pub mod meta_schema;
pub mod ordering;
pub mod schema_key;
pub mod slug;
pub mod subcategory;
pub mod tree;
pub mod validation;

// Re-export 公共类型
pub use audit::{Finding, audit};
pub use config::CatalogConfig;
pub use error::{CatalogError, CatalogResult, FieldViolation, UnsafeReason};
pub use fallback::{DeletionPlan, DeletionSafety, FallbackRedirect, FallbackResolver};
pub use meta_schema::{MetaFieldSchema, RemovedField};
pub use ordering::{MoveDirection, Ranked};
pub use subcategory::SubCategorySet;
pub use tree::{CategoryForest, TreeNode};
