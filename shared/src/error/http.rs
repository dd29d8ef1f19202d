//! HTTP status code mapping for error codes
//!
//! Used by the transport collaborator; the catalog core never looks at status codes.

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::CategoryNotFound
            | Self::SubCategoryNotFound
            | Self::MetaFieldNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::CategoryNameExists
            | Self::CategorySlugExists
            | Self::CategoryHasProducts
            | Self::SubCategorySlugExists
            | Self::MetaFieldKeyExists => StatusCode::CONFLICT,

            // 422 Unprocessable (data needs manual correction)
            Self::CategoryCyclicHierarchy
            | Self::CategoryCyclicFallback
            | Self::CategoryLevelMismatch => StatusCode::UNPROCESSABLE_ENTITY,

            // 500 Internal Server Error
            Self::SnapshotInvalid => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
