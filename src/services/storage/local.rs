// Local filesystem storage client, mainly used for development and tests
use std::path::{Path, PathBuf};

use crate::error::ConnectError;
use crate::services::storage::{StorageClient, StorageEntry};

/// Storage client backed by a directory on the local filesystem.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            self.root.clone()
        } else {
            path.split('/').fold(self.root.clone(), |p, part| p.join(part))
        }
    }
}

#[async_trait::async_trait]
impl StorageClient for LocalStorage {
    async fn list_children(&self, path: &str) -> Result<Vec<StorageEntry>, ConnectError> {
        let dir = self.resolve(path);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        let mut read_dir = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| ConnectError::Storage(format!("Failed to list {}: {}", dir.display(), e)))?;

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| ConnectError::Storage(format!("Failed to list {}: {}", dir.display(), e)))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| ConnectError::Storage(e.to_string()))?;
            entries.push(StorageEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                is_directory: file_type.is_dir(),
            });
        }

        // directory listing order is platform dependent
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn exists(&self, path: &str) -> Result<bool, ConnectError> {
        Ok(self.resolve(path).exists())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, ConnectError> {
        let file = self.resolve(path);
        tokio::fs::read(&file)
            .await
            .map_err(|e| ConnectError::Storage(format!("Failed to read {}: {}", file.display(), e)))
    }

    async fn write(&self, path: &str, content: &[u8]) -> Result<(), ConnectError> {
        let file = self.resolve(path);
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ConnectError::Storage(e.to_string()))?;
        }
        tokio::fs::write(&file, content)
            .await
            .map_err(|e| ConnectError::Storage(format!("Failed to write {}: {}", file.display(), e)))
    }
}

impl LocalStorage {
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_read_write_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.write("sales/orders/data.parquet", b"x").await.unwrap();
        assert!(storage.exists("sales/orders/data.parquet").await.unwrap());
        assert_eq!(storage.read("sales/orders/data.parquet").await.unwrap(), b"x");

        let children = storage.list_children("sales").await.unwrap();
        assert_eq!(
            children,
            vec![StorageEntry {
                name: "orders".to_string(),
                is_directory: true
            }]
        );
    }

    #[tokio::test]
    async fn test_missing_path_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        assert!(storage.list_children("nope").await.unwrap().is_empty());
        assert!(!storage.exists("nope").await.unwrap());
    }
}
