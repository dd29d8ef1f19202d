//! Catalog errors
//!
//! Every core operation returns [`CatalogResult`]. Failures are typed and carry
//! structured data; nothing is rendered to text until it reaches [`AppError`].
//!
//! | Variant | Raised by | Recovery |
//! |---------|-----------|----------|
//! | `Validation` | any input check | fix the listed fields |
//! | `DuplicateKey` / `InvalidKeyFormat` | key policy | choose another key |
//! | `CyclicHierarchy` / `CyclicFallback` | tree builder, fallback resolver | manual data correction |
//! | `UnsafeDeletion` | fallback resolver | set a fallback or move products first |

use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use std::fmt;

/// One field-level violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Input field the violation refers to (`label`, `options`, `order`, ...)
    pub field: String,
    pub code: ErrorCode,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Why a deletion was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "category_id", rename_all = "snake_case")]
pub enum UnsafeReason {
    /// Products exist and neither the category nor the request names a fallback
    NoFallback,
    /// The fallback points at the category being deleted
    FallbackIsSelf,
    /// The fallback id is not in the snapshot
    FallbackNotFound(i64),
    /// The fallback category is archived
    FallbackArchived(i64),
}

impl fmt::Display for UnsafeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFallback => f.write_str("products exist and no fallback category is set"),
            Self::FallbackIsSelf => f.write_str("fallback category is the category itself"),
            Self::FallbackNotFound(id) => write!(f, "fallback category {id} does not exist"),
            Self::FallbackArchived(id) => write!(f, "fallback category {id} is archived"),
        }
    }
}

/// Catalog error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("Validation failed: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Invalid key format: {0:?}")]
    InvalidKeyFormat(String),

    #[error("Cyclic category hierarchy through {0:?}")]
    CyclicHierarchy(Vec<i64>),

    #[error("Cyclic fallback chain through {0:?}")]
    CyclicFallback(Vec<i64>),

    #[error("Unsafe deletion of category {category_id}: {reason}")]
    UnsafeDeletion {
        category_id: i64,
        reason: UnsafeReason,
    },

    #[error("Category not found: {0}")]
    CategoryNotFound(i64),

    #[error("Meta field not found: {0}")]
    FieldNotFound(String),

    #[error("Sub-category not found: {0}")]
    SubCategoryNotFound(String),
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl CatalogError {
    /// Single-violation validation error
    pub fn violation(field: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldViolation::new(field, code, message)])
    }

    /// Fail with every collected violation, or succeed if there are none
    pub fn check(violations: Vec<FieldViolation>) -> CatalogResult<()> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self::Validation(violations))
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::DuplicateKey(_) => ErrorCode::MetaFieldKeyExists,
            Self::InvalidKeyFormat(_) => ErrorCode::MetaFieldKeyInvalid,
            Self::CyclicHierarchy(_) => ErrorCode::CategoryCyclicHierarchy,
            Self::CyclicFallback(_) => ErrorCode::CategoryCyclicFallback,
            Self::UnsafeDeletion { .. } => ErrorCode::CategoryHasProducts,
            Self::CategoryNotFound(_) => ErrorCode::CategoryNotFound,
            Self::FieldNotFound(_) => ErrorCode::MetaFieldNotFound,
            Self::SubCategoryNotFound(_) => ErrorCode::SubCategoryNotFound,
        }
    }

    /// Violations carried by a validation error (empty otherwise)
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Validation(v) => v,
            _ => &[],
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        let app = AppError::with_message(err.code(), err.to_string());
        match err {
            CatalogError::Validation(violations) => app.with_detail(
                "violations",
                serde_json::to_value(&violations).unwrap_or_default(),
            ),
            CatalogError::DuplicateKey(key) | CatalogError::InvalidKeyFormat(key) => {
                app.with_detail("key", key)
            }
            CatalogError::CyclicHierarchy(ids) | CatalogError::CyclicFallback(ids) => {
                app.with_detail("cycle", ids)
            }
            CatalogError::UnsafeDeletion {
                category_id,
                reason,
            } => app.with_detail("category_id", category_id).with_detail(
                "reason",
                serde_json::to_value(reason).unwrap_or_default(),
            ),
            CatalogError::CategoryNotFound(id) => app.with_detail("category_id", id),
            CatalogError::FieldNotFound(key) => app.with_detail("key", key),
            CatalogError::SubCategoryNotFound(slug) => app.with_detail("slug", slug),
        }
    }
}

/// Type alias for Result with CatalogError
pub type CatalogResult<T> = Result<T, CatalogError>;
