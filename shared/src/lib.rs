//! Shared types for the catalog workspace
//!
//! Plain records exchanged with the catalog store (categories, sub-categories,
//! meta fields, payloads) and the unified error-code system.

pub mod error;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, ErrorCategory, ErrorCode};
