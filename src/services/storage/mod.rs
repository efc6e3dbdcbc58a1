// Storage abstraction layer for catalog discovery and sidecar files
pub mod local;

pub use local::LocalStorage;

use crate::error::ConnectError;

/// One direct child of a storage path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub name: String,
    pub is_directory: bool,
}

/// Client giving listing and byte access to a storage container.
///
/// Blob store clients (Azure, S3, ...) are provided by callers; the crate
/// ships only the local filesystem implementation. Paths are `/`-separated
/// and relative to the container root; the empty path is the root itself.
#[async_trait::async_trait]
pub trait StorageClient: Send + Sync {
    /// List the immediate children of a path, distinguishing files from
    /// directories. Listing a missing path yields an empty sequence.
    async fn list_children(&self, path: &str) -> Result<Vec<StorageEntry>, ConnectError>;

    /// Whether a file or directory exists at the path.
    async fn exists(&self, path: &str) -> Result<bool, ConnectError>;

    /// Read a whole file.
    async fn read(&self, path: &str) -> Result<Vec<u8>, ConnectError>;

    /// Write a whole file, creating parent directories as needed.
    async fn write(&self, path: &str, content: &[u8]) -> Result<(), ConnectError>;
}

/// Placeholder client for storages declared in configuration without an
/// attached client. DDL rendering works from the descriptor alone; any
/// data access fails until a real client is registered.
pub struct UnboundStorage {
    alias: String,
}

impl UnboundStorage {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
        }
    }

    fn unbound(&self) -> ConnectError {
        ConnectError::Storage(format!(
            "Storage {} has no client attached; register one to discover tables",
            self.alias
        ))
    }
}

#[async_trait::async_trait]
impl StorageClient for UnboundStorage {
    async fn list_children(&self, _path: &str) -> Result<Vec<StorageEntry>, ConnectError> {
        Err(self.unbound())
    }

    async fn exists(&self, _path: &str) -> Result<bool, ConnectError> {
        Err(self.unbound())
    }

    async fn read(&self, _path: &str) -> Result<Vec<u8>, ConnectError> {
        Err(self.unbound())
    }

    async fn write(&self, _path: &str, _content: &[u8]) -> Result<(), ConnectError> {
        Err(self.unbound())
    }
}

/// Joins two `/`-separated storage path segments, ignoring empty parts.
pub fn join_path(base: &str, child: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        child.to_string()
    } else if child.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, child)
    }
}
