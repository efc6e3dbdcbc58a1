use serde::{Deserialize, Serialize};

/// Which Azure storage endpoint a container lives behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AzureService {
    #[default]
    Blob,
    Dfs,
}

impl AzureService {
    pub fn as_str(&self) -> &'static str {
        match self {
            AzureService::Blob => "blob",
            AzureService::Dfs => "dfs",
        }
    }
}

/// Description of a storage account holding table data.
///
/// Only the shape needed to render DDL credentials and location URLs; the
/// actual byte/listing access goes through the `StorageClient` trait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageDescriptor {
    Azure {
        account_name: String,
        container_name: String,
        #[serde(default)]
        service: AzureService,
        #[serde(default)]
        sas_token: Option<String>,
    },
    Local {
        root: String,
    },
}

impl StorageDescriptor {
    pub fn kind_name(&self) -> &'static str {
        match self {
            StorageDescriptor::Azure { .. } => "azure",
            StorageDescriptor::Local { .. } => "local",
        }
    }

    /// The https base URI of the storage, as used for e.g. an external data
    /// source LOCATION clause.
    pub fn base_uri(&self) -> String {
        match self {
            StorageDescriptor::Azure {
                account_name,
                container_name,
                service,
                ..
            } => format!(
                "https://{}.{}.core.windows.net/{}",
                account_name,
                service.as_str(),
                container_name
            ),
            StorageDescriptor::Local { root } => format!("file://{}", root),
        }
    }
}
