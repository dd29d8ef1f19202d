//! Meta field key policy
//!
//! Keys match `^[a-z][a-zA-Z0-9_]*$` and are unique within one category.
//! [`normalize`] derives a key from a free-text label; [`plan_rename`] approves
//! a key change without touching anything else about the field.

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// Derive a key from a label: lower-case, runs of anything outside `[a-z0-9]`
/// collapse to one `_`, leading/trailing separators dropped.
///
/// Applying it to its own output is a no-op.
pub fn normalize(raw_label: &str) -> CatalogResult<String> {
    let lowered = raw_label.to_lowercase();
    let key = lowered
        .split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    validate_format(&key)?;
    Ok(key)
}

/// Whether `key` matches `^[a-z][a-zA-Z0-9_]*$`
pub fn is_valid_format(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

pub fn validate_format(key: &str) -> CatalogResult<()> {
    if is_valid_format(key) {
        Ok(())
    } else {
        Err(CatalogError::InvalidKeyFormat(key.to_string()))
    }
}

pub fn validate_unique<S: AsRef<str>>(key: &str, existing_keys: &[S]) -> CatalogResult<()> {
    if existing_keys.iter().any(|k| k.as_ref() == key) {
        Err(CatalogError::DuplicateKey(key.to_string()))
    } else {
        Ok(())
    }
}

/// Approved key change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePlan {
    pub from: String,
    pub to: String,
}

impl RenamePlan {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Check a rename of `old_key` to `new_key` against the category's other keys
///
/// `existing_keys` may include `old_key` itself.
pub fn plan_rename<S: AsRef<str>>(
    old_key: &str,
    new_key: &str,
    existing_keys: &[S],
) -> CatalogResult<RenamePlan> {
    validate_format(new_key)?;
    if new_key != old_key {
        validate_unique(new_key, existing_keys)?;
    }
    Ok(RenamePlan {
        from: old_key.to_string(),
        to: new_key.to_string(),
    })
}
