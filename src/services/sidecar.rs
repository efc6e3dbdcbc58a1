// Sidecar schema files stored next to table data
//
// A sidecar captures a previously known column schema so that connecting a
// catalog does not have to re-read file footers. The file is plain JSON and
// is parsed, never executed.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConnectError;
use crate::models::Column;
use crate::services::storage::{join_path, StorageClient};

/// File name of the schema sidecar inside a table's root directory.
/// Starts with `_` so discovery and engines treat it as hidden.
pub const SIDECAR_FILE_NAME: &str = "_schema.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSidecar {
    pub captured_at: DateTime<Utc>,
    pub columns: Vec<Column>,
}

impl SchemaSidecar {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            captured_at: Utc::now(),
            columns,
        }
    }
}

/// Reads the sidecar of a table, if one exists.
///
/// A sidecar that exists but cannot be parsed is logged and treated as
/// absent so the caller falls back to sniffing the data files.
pub async fn read_schema_sidecar(
    storage: &dyn StorageClient,
    table_path: &str,
) -> Result<Option<Vec<Column>>, ConnectError> {
    let file = join_path(table_path, SIDECAR_FILE_NAME);
    if !storage.exists(&file).await? {
        return Ok(None);
    }

    let content = storage.read(&file).await?;
    match serde_json::from_slice::<SchemaSidecar>(&content) {
        Ok(sidecar) if !sidecar.columns.is_empty() => {
            debug!(path = %file, columns = sidecar.columns.len(), "loaded schema sidecar");
            Ok(Some(sidecar.columns))
        }
        Ok(_) => {
            warn!(path = %file, "skipping schema sidecar: no columns defined");
            Ok(None)
        }
        Err(e) => {
            warn!(path = %file, error = %e, "skipping unreadable schema sidecar");
            Ok(None)
        }
    }
}

/// Writes a table's column schema as a sidecar file.
pub async fn write_schema_sidecar(
    storage: &dyn StorageClient,
    table_path: &str,
    columns: Vec<Column>,
) -> Result<(), ConnectError> {
    let file = join_path(table_path, SIDECAR_FILE_NAME);
    let sidecar = SchemaSidecar::new(columns);
    let content = serde_json::to_vec_pretty(&sidecar)
        .map_err(|e| ConnectError::Validation(format!("Failed to serialize sidecar: {}", e)))?;
    storage.write(&file, &content).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenericSqlType;
    use crate::services::storage::LocalStorage;

    #[tokio::test]
    async fn test_sidecar_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let columns = vec![
            Column::new("id", GenericSqlType::BigInt),
            Column::new("payload", GenericSqlType::JsonLikeString),
        ];
        write_schema_sidecar(&storage, "sales/orders", columns.clone())
            .await
            .unwrap();

        let loaded = read_schema_sidecar(&storage, "sales/orders").await.unwrap();
        assert_eq!(loaded, Some(columns));
    }

    #[tokio::test]
    async fn test_missing_sidecar_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        let loaded = read_schema_sidecar(&storage, "sales/orders").await.unwrap();
        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn test_unparseable_sidecar_falls_back_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage
            .write("sales/orders/_schema.json", b"metadata = MetaData()")
            .await
            .unwrap();

        let loaded = read_schema_sidecar(&storage, "sales/orders").await.unwrap();
        assert_eq!(loaded, None);
    }
}
