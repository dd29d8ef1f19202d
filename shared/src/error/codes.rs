//! Unified error codes for the catalog workspace
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Category and sub-category errors
//! - 2xxx: Meta-field schema errors
//! - 3xxx: Ordering errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Category ====================
    /// Category not found
    CategoryNotFound = 1001,
    /// Category has products and no usable fallback
    CategoryHasProducts = 1002,
    /// Category name already exists
    CategoryNameExists = 1003,
    /// Category slug already exists
    CategorySlugExists = 1004,
    /// Category is its own ancestor
    CategoryCyclicHierarchy = 1005,
    /// Fallback chain loops back on itself
    CategoryCyclicFallback = 1006,
    /// Fallback target is missing, archived or the category itself
    CategoryFallbackInvalid = 1007,
    /// Category would sit deeper than the configured maximum
    CategoryDepthExceeded = 1008,
    /// Stored level disagrees with the parent chain
    CategoryLevelMismatch = 1009,
    /// Parent reference cannot be resolved
    CategoryParentNotFound = 1010,
    /// Sibling sort orders collide
    CategorySortOrderConflict = 1011,
    /// Sub-category not found
    SubCategoryNotFound = 1101,
    /// Sub-category slug already exists
    SubCategorySlugExists = 1102,

    // ==================== 2xxx: Meta Field Schema ====================
    /// Meta field not found
    MetaFieldNotFound = 2001,
    /// Meta field key already exists in the category
    MetaFieldKeyExists = 2002,
    /// Meta field key has an invalid format
    MetaFieldKeyInvalid = 2003,
    /// Select field declared without options
    MetaFieldOptionsRequired = 2004,
    /// Default value does not fit the field type
    MetaFieldDefaultInvalid = 2005,
    /// Product value does not fit the field type
    MetaFieldValueInvalid = 2006,
    /// Required product value is missing
    MetaFieldRequiredMissing = 2007,
    /// Too many meta fields on one category
    MetaFieldLimitReached = 2008,
    /// Meta field sort orders collide
    MetaFieldSortOrderConflict = 2009,

    // ==================== 3xxx: Ordering ====================
    /// New order is not a permutation of the current items
    OrderingInvalidPermutation = 3001,

    // ==================== 9xxx: System ====================
    /// Snapshot could not be read or parsed
    SnapshotInvalid = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Success",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field missing",
            ErrorCode::ValueOutOfRange => "Value out of range",

            // Category
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryHasProducts => "Category has products without a usable fallback",
            ErrorCode::CategoryNameExists => "Category name already exists",
            ErrorCode::CategorySlugExists => "Category slug already exists",
            ErrorCode::CategoryCyclicHierarchy => "Category hierarchy contains a cycle",
            ErrorCode::CategoryCyclicFallback => "Fallback chain contains a cycle",
            ErrorCode::CategoryFallbackInvalid => "Fallback category is not usable",
            ErrorCode::CategoryDepthExceeded => "Category depth limit exceeded",
            ErrorCode::CategoryLevelMismatch => "Category level does not match its parent",
            ErrorCode::CategoryParentNotFound => "Parent category not found",
            ErrorCode::CategorySortOrderConflict => "Sibling sort order already used",
            ErrorCode::SubCategoryNotFound => "Sub-category not found",
            ErrorCode::SubCategorySlugExists => "Sub-category slug already exists",

            // Schema
            ErrorCode::MetaFieldNotFound => "Meta field not found",
            ErrorCode::MetaFieldKeyExists => "Meta field key already exists",
            ErrorCode::MetaFieldKeyInvalid => "Meta field key has an invalid format",
            ErrorCode::MetaFieldOptionsRequired => "Options are required for this field type",
            ErrorCode::MetaFieldDefaultInvalid => "Default value does not match the field type",
            ErrorCode::MetaFieldValueInvalid => "Value does not match the field type",
            ErrorCode::MetaFieldRequiredMissing => "Required value missing",
            ErrorCode::MetaFieldLimitReached => "Meta field limit reached",
            ErrorCode::MetaFieldSortOrderConflict => "Meta field sort order already used",

            // Ordering
            ErrorCode::OrderingInvalidPermutation => "New order is not a permutation of the items",

            // System
            ErrorCode::SnapshotInvalid => "Snapshot could not be read",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Category
            1001 => Ok(ErrorCode::CategoryNotFound),
            1002 => Ok(ErrorCode::CategoryHasProducts),
            1003 => Ok(ErrorCode::CategoryNameExists),
            1004 => Ok(ErrorCode::CategorySlugExists),
            1005 => Ok(ErrorCode::CategoryCyclicHierarchy),
            1006 => Ok(ErrorCode::CategoryCyclicFallback),
            1007 => Ok(ErrorCode::CategoryFallbackInvalid),
            1008 => Ok(ErrorCode::CategoryDepthExceeded),
            1009 => Ok(ErrorCode::CategoryLevelMismatch),
            1010 => Ok(ErrorCode::CategoryParentNotFound),
            1011 => Ok(ErrorCode::CategorySortOrderConflict),
            1101 => Ok(ErrorCode::SubCategoryNotFound),
            1102 => Ok(ErrorCode::SubCategorySlugExists),

            // Schema
            2001 => Ok(ErrorCode::MetaFieldNotFound),
            2002 => Ok(ErrorCode::MetaFieldKeyExists),
            2003 => Ok(ErrorCode::MetaFieldKeyInvalid),
            2004 => Ok(ErrorCode::MetaFieldOptionsRequired),
            2005 => Ok(ErrorCode::MetaFieldDefaultInvalid),
            2006 => Ok(ErrorCode::MetaFieldValueInvalid),
            2007 => Ok(ErrorCode::MetaFieldRequiredMissing),
            2008 => Ok(ErrorCode::MetaFieldLimitReached),
            2009 => Ok(ErrorCode::MetaFieldSortOrderConflict),

            // Ordering
            3001 => Ok(ErrorCode::OrderingInvalidPermutation),

            // System
            9006 => Ok(ErrorCode::SnapshotInvalid),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::CategoryNotFound.code(), 1001);
        assert_eq!(ErrorCode::SubCategoryNotFound.code(), 1101);
        assert_eq!(ErrorCode::MetaFieldKeyExists.code(), 2002);
        assert_eq!(ErrorCode::OrderingInvalidPermutation.code(), 3001);
        assert_eq!(ErrorCode::SnapshotInvalid.code(), 9006);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::ValidationFailed.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(1005), Ok(ErrorCode::CategoryCyclicHierarchy));
        assert_eq!(ErrorCode::try_from(2004), Ok(ErrorCode::MetaFieldOptionsRequired));
        assert_eq!(ErrorCode::try_from(9006), Ok(ErrorCode::SnapshotInvalid));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(9999), Err(InvalidErrorCode(9999)));
        assert_eq!(ErrorCode::try_from(1999), Err(InvalidErrorCode(1999)));
        assert_eq!(ErrorCode::try_from(3), Err(InvalidErrorCode(3)));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::MetaFieldKeyExists).unwrap();
        assert_eq!(json, "2002");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("1006").unwrap();
        assert_eq!(code, ErrorCode::CategoryCyclicFallback);
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("4242");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::CategoryHasProducts.to_string(), "1002");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::AlreadyExists.message(), "Resource already exists");
        assert_eq!(
            ErrorCode::MetaFieldKeyInvalid.message(),
            "Meta field key has an invalid format"
        );
    }

    #[test]
    fn test_every_code_roundtrips_through_u16() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::RequiredField,
            ErrorCode::CategorySortOrderConflict,
            ErrorCode::SubCategorySlugExists,
            ErrorCode::MetaFieldSortOrderConflict,
            ErrorCode::OrderingInvalidPermutation,
            ErrorCode::SnapshotInvalid,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(u16::from(code)), Ok(code));
        }
    }
}
