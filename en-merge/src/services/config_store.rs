use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{Result, SyncError};
use crate::model::config::SyncConfig;
use crate::services::storage::write_atomic;

/// Loads and validates the sync config.
///
/// A missing file, or a document without a `repositories` list, is
/// [`SyncError::ConfigurationMissing`].
pub fn load(path: &Path) -> Result<SyncConfig> {
    if !path.exists() {
        return Err(SyncError::ConfigurationMissing {
            path: path.to_path_buf(),
        });
    }

    let data = fs::read_to_string(path).map_err(|e| SyncError::io(path, e))?;

    let value: Value = serde_json::from_str(&data).map_err(|e| SyncError::InvalidConfig {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let has_repositories = value
        .get("repositories")
        .map(|v| !v.is_null())
        .unwrap_or(false);
    if !has_repositories {
        return Err(SyncError::ConfigurationMissing {
            path: path.to_path_buf(),
        });
    }

    serde_json::from_value(value).map_err(|e| SyncError::InvalidConfig {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

pub fn save(path: &Path, config: &SyncConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config).map_err(|e| SyncError::InvalidConfig {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    write_atomic(path, json.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::{parse_timestamp, RepositoryConfig};
    use tempfile::TempDir;

    fn write(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("config.json");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn missing_file_is_configuration_missing() {
        let dir = TempDir::new().unwrap();
        let err = load(&dir.path().join("config.json")).unwrap_err();
        assert!(matches!(err, SyncError::ConfigurationMissing { .. }));
    }

    #[test]
    fn document_without_repositories_is_configuration_missing() {
        let dir = TempDir::new().unwrap();
        for body in ["{}", r#"{"repositories":null}"#, r#"{"repos":[]}"#] {
            let path = write(&dir, body);
            let err = load(&path).unwrap_err();
            assert!(matches!(err, SyncError::ConfigurationMissing { .. }), "{body}");
        }
    }

    #[test]
    fn bad_json_and_bad_timestamps_are_invalid_config() {
        let dir = TempDir::new().unwrap();

        let path = write(&dir, "{ not json");
        assert!(matches!(load(&path).unwrap_err(), SyncError::InvalidConfig { .. }));

        let path = write(
            &dir,
            r#"{"repositories":[{"repo_url":"a/b","file_paths":["x"],"last_update":"2024/01/01"}]}"#,
        );
        assert!(matches!(load(&path).unwrap_err(), SyncError::InvalidConfig { .. }));
    }

    #[test]
    fn save_then_load_keeps_repositories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut repo = RepositoryConfig::new("iDvel/rime-ice", &["en_dicts/en.dict.yaml"]);
        repo.last_update = parse_timestamp("2024-01-02T03:04:05Z");
        let config = SyncConfig {
            repositories: vec![repo.clone()],
            ..Default::default()
        };

        save(&path, &config).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded.repositories, vec![repo]);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"repositories\""));
    }
}
