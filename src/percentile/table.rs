//! Percentile table providers.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::PercentileTable;
use crate::error::TableError;

/// Supplies the percentile reference table on each completed intake.
#[async_trait]
pub trait TableProvider: Send + Sync {
    async fn load(&self) -> Result<PercentileTable, TableError>;
}

/// Reads the table from a JSON file every time it is asked.
///
/// Re-reading lets the file be fixed or replaced while conversations are in
/// flight; a user who hit a table error just resends the height.
pub struct JsonFileTableProvider {
    path: PathBuf,
}

impl JsonFileTableProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TableProvider for JsonFileTableProvider {
    async fn load(&self) -> Result<PercentileTable, TableError> {
        let path = self.path.display().to_string();

        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| {
                warn!(path = %path, error = %e, "Failed to read percentile table");
                match e.kind() {
                    ErrorKind::NotFound => TableError::NotFound { path: path.clone() },
                    ErrorKind::PermissionDenied => {
                        TableError::PermissionDenied { path: path.clone() }
                    }
                    ErrorKind::InvalidData => TableError::Malformed {
                        path: path.clone(),
                        reason: e.to_string(),
                    },
                    _ => TableError::Unreadable {
                        path: path.clone(),
                        reason: e.to_string(),
                    },
                }
            })?;

        let table: PercentileTable =
            serde_json::from_str(&raw).map_err(|e| TableError::Malformed {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        if table.is_empty() {
            return Err(TableError::Malformed {
                path,
                reason: "table has no entries".to_string(),
            });
        }
        table
            .validate()
            .map_err(|reason| TableError::Malformed {
                path: path.clone(),
                reason,
            })?;

        debug!(path = %path, "Percentile table loaded");
        Ok(table)
    }
}

/// Serves a table already held in memory.
pub struct StaticTableProvider {
    table: Arc<PercentileTable>,
}

impl StaticTableProvider {
    pub fn new(table: PercentileTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }
}

#[async_trait]
impl TableProvider for StaticTableProvider {
    async fn load(&self) -> Result<PercentileTable, TableError> {
        Ok(self.table.as_ref().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::Sex;

    const VALID: &str = r#"{"niño": {"5": {"p5": 14.5, "p85": 17.0, "p95": 18.5}}}"#;

    #[tokio::test]
    async fn loads_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tablas.json");
        std::fs::write(&path, VALID).unwrap();

        let table = JsonFileTableProvider::new(&path).load().await.unwrap();
        assert_eq!(table.lookup(Sex::Male, 5).unwrap().p95, 18.5);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let provider = JsonFileTableProvider::new(dir.path().join("missing.json"));
        let err = provider.load().await.unwrap_err();
        assert!(matches!(err, TableError::NotFound { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn invalid_json_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tablas.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileTableProvider::new(&path).load().await.unwrap_err();
        assert!(matches!(err, TableError::Malformed { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn unordered_thresholds_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tablas.json");
        std::fs::write(
            &path,
            r#"{"niña": {"4": {"p5": 18.0, "p85": 16.0, "p95": 19.0}}}"#,
        )
        .unwrap();

        let err = JsonFileTableProvider::new(&path).load().await.unwrap_err();
        assert!(matches!(err, TableError::Malformed { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn empty_table_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tablas.json");
        std::fs::write(&path, "{}").unwrap();

        let err = JsonFileTableProvider::new(&path).load().await.unwrap_err();
        assert!(matches!(err, TableError::Malformed { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn directory_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonFileTableProvider::new(dir.path()).load().await.unwrap_err();
        assert!(!matches!(err, TableError::NotFound { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn static_provider_returns_table() {
        let table: PercentileTable = serde_json::from_str(VALID).unwrap();
        let provider = StaticTableProvider::new(table.clone());
        assert_eq!(provider.load().await.unwrap(), table);
    }
}
