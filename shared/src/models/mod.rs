//! Data models
//!
//! Records supplied by and returned to the catalog store.
//! Category IDs are `i64`; meta fields are keyed by `key`, sub-categories by `slug`.

pub mod category;
pub mod meta_field;
pub mod sort_order;

// Re-exports
pub use category::*;
pub use meta_field::*;
pub use sort_order::*;
