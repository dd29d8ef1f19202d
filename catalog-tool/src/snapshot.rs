//! Category snapshot files

use anyhow::{Context, Result};
use shared::models::Category;
use std::fs;
use std::path::Path;

/// Load a snapshot: a JSON array of categories
pub fn load(path: &Path) -> Result<Vec<Category>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let categories: Vec<Category> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;

    tracing::info!(path = %path.display(), categories = categories.len(), "Snapshot loaded");
    Ok(categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_snapshot() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":1,"name":"Electronics","slug":"electronics","parent_id":null}},
               {{"id":2,"name":"Phones","slug":"phones","parent_id":1,"level":1}}]"#
        )
        .unwrap();

        let categories = load(file.path()).unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[1].parent_id, Some(1));
    }

    #[test]
    fn test_load_reports_path_on_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"id":1}}"#).unwrap();

        let err = load(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse snapshot"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read snapshot"));
    }
}
