//! Input validation helpers
//!
//! Text checks push into a violation list instead of returning early, so a
//! payload reports every problem at once.

use shared::error::ErrorCode;

use crate::error::FieldViolation;

/// Image paths / URLs
pub const MAX_URL_LEN: usize = 2048;

/// Descriptions
pub const MAX_NOTE_LEN: usize = 500;

/// Units and placeholders
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Validate that a required string is non-empty and within the length limit.
pub fn require_text(violations: &mut Vec<FieldViolation>, value: &str, field: &str, max_len: usize) {
    if value.trim().is_empty() {
        violations.push(FieldViolation::new(
            field,
            ErrorCode::RequiredField,
            format!("{field} must not be empty"),
        ));
        return;
    }
    check_len(violations, value, field, max_len);
}

/// Validate that an optional string, if present, is within the length limit.
pub fn optional_text(
    violations: &mut Vec<FieldViolation>,
    value: Option<&str>,
    field: &str,
    max_len: usize,
) {
    if let Some(v) = value {
        check_len(violations, v, field, max_len);
    }
}

fn check_len(violations: &mut Vec<FieldViolation>, value: &str, field: &str, max_len: usize) {
    let len = value.chars().count();
    if len > max_len {
        violations.push(FieldViolation::new(
            field,
            ErrorCode::ValueOutOfRange,
            format!("{field} is too long ({len} chars, max {max_len})"),
        ));
    }
}
