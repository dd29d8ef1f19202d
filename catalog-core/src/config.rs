//! Catalog limits
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | CATALOG_MAX_DEPTH | 3 | Deepest level that may receive children |
//! | CATALOG_MAX_NAME_LEN | 200 | Category / sub-category name limit |
//! | CATALOG_MAX_LABEL_LEN | 100 | Meta field label limit |
//! | CATALOG_MAX_KEY_LEN | 64 | Meta field key limit |
//! | CATALOG_MAX_OPTIONS | 100 | Options per select/array field |
//! | CATALOG_MAX_META_FIELDS | 64 | Meta fields per category |

use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Levels are zero-based; a node at `max_depth` may exist but may not get children
    pub max_depth: u32,
    pub max_name_len: usize,
    pub max_label_len: usize,
    pub max_key_len: usize,
    pub max_options: usize,
    pub max_meta_fields: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_name_len: 200,
            max_label_len: 100,
            max_key_len: 64,
            max_options: 100,
            max_meta_fields: 64,
        }
    }
}

impl CatalogConfig {
    /// Load from environment variables
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_depth: env_or("CATALOG_MAX_DEPTH", defaults.max_depth),
            max_name_len: env_or("CATALOG_MAX_NAME_LEN", defaults.max_name_len),
            max_label_len: env_or("CATALOG_MAX_LABEL_LEN", defaults.max_label_len),
            max_key_len: env_or("CATALOG_MAX_KEY_LEN", defaults.max_key_len),
            max_options: env_or("CATALOG_MAX_OPTIONS", defaults.max_options),
            max_meta_fields: env_or("CATALOG_MAX_META_FIELDS", defaults.max_meta_fields),
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_meta_fields(mut self, max_meta_fields: usize) -> Self {
        self.max_meta_fields = max_meta_fields;
        self
    }

    pub fn with_max_options(mut self, max_options: usize) -> Self {
        self.max_options = max_options;
        self
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(variable = name, value = %raw, "Ignoring unparsable config value");
            default
        }),
        Err(_) => default,
    }
}
