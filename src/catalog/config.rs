//! Catalog configuration
//!
//! Loaded from a JSON file. Only `data_dir` is required:
//!
//! ```json
//! { "data_dir": "./catalog", "candidate_limit": 10, "log_level": "info" }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{CatalogError, CatalogResult};
use crate::observability::Severity;
use crate::query::DEFAULT_CANDIDATE_LIMIT;

/// Data file name inside `data_dir`
pub const DATA_FILE: &str = "mangas.dat";
/// Primary index file name inside `data_dir`
pub const PRIMARY_INDEX_FILE: &str = "primary_index.dat";
/// Secondary index file name inside `data_dir`
pub const SECONDARY_INDEX_FILE: &str = "secondary_index.dat";

/// Catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory holding the data file and both index files (required)
    pub data_dir: PathBuf,

    /// Maximum candidates returned for an ambiguous search (default 10)
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,

    /// Minimum log severity: trace, info, warn, error or fatal (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_candidate_limit() -> usize {
    DEFAULT_CANDIDATE_LIMIT
}

fn default_log_level() -> String {
    "info".to_string()
}

impl CatalogConfig {
    /// Configuration with defaults for everything but the data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            candidate_limit: default_candidate_limit(),
            log_level: default_log_level(),
        }
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> CatalogResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CatalogError::config(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config: CatalogConfig = serde_json::from_str(&content)
            .map_err(|e| CatalogError::config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> CatalogResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(CatalogError::config("data_dir must not be empty"));
        }

        if self.candidate_limit == 0 {
            return Err(CatalogError::config("candidate_limit must be >= 1"));
        }

        self.log_severity()?;

        Ok(())
    }

    /// Parsed `log_level`
    pub fn log_severity(&self) -> CatalogResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            CatalogError::config(format!(
                "Invalid log_level: '{}'. Expected trace, info, warn, error or fatal.",
                self.log_level
            ))
        })
    }

    /// Path of the record data file
    pub fn data_file(&self) -> PathBuf {
        self.data_dir.join(DATA_FILE)
    }

    /// Path of the primary index file
    pub fn primary_index_file(&self) -> PathBuf {
        self.data_dir.join(PRIMARY_INDEX_FILE)
    }

    /// Path of the secondary index file
    pub fn secondary_index_file(&self) -> PathBuf {
        self.data_dir.join(SECONDARY_INDEX_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogErrorCode;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("mangastore.json");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_defaults_applied() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"data_dir": "/tmp/catalog"}"#);

        let config = CatalogConfig::load(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/catalog"));
        assert_eq!(config.candidate_limit, 10);
        assert_eq!(config.log_severity().unwrap(), Severity::Info);
    }

    #[test]
    fn test_file_paths() {
        let config = CatalogConfig::new("/srv/manga");
        assert_eq!(config.data_file(), PathBuf::from("/srv/manga/mangas.dat"));
        assert_eq!(
            config.primary_index_file(),
            PathBuf::from("/srv/manga/primary_index.dat")
        );
        assert_eq!(
            config.secondary_index_file(),
            PathBuf::from("/srv/manga/secondary_index.dat")
        );
    }

    #[test]
    fn test_zero_candidate_limit_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"data_dir": "x", "candidate_limit": 0}"#);
        let err = CatalogConfig::load(&path).unwrap_err();
        assert_eq!(err.code(), CatalogErrorCode::ConfigInvalid);
    }

    #[test]
    fn test_missing_data_dir_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"candidate_limit": 5}"#);
        assert!(CatalogConfig::load(&path).is_err());

        let path = write_config(&dir, r#"{"data_dir": ""}"#);
        assert!(CatalogConfig::load(&path).is_err());
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let mut config = CatalogConfig::new("x");
        config.log_level = "verbose".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = CatalogConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.code(), CatalogErrorCode::ConfigInvalid);
    }
}
