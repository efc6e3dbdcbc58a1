use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use crate::error::ConnectError;
use crate::models::{Format, StorageDescriptor, TableDescriptor};
use crate::services::catalog::{Catalog, CatalogRegistry};
use crate::services::database::{DialectCapabilities, OfflineAdapter, PostgresAdapter};
use crate::services::storage::LocalStorage;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub connect: ConnectConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectConfig {
    /// Alias of the database catalogs are connected to by default.
    pub default_db_alias: String,
    /// Path of the registry file listing storages, databases and catalogs.
    pub registry_file: String,
    /// Print rendered statements instead of executing them.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Try to load from .env file
        let _ = dotenv::dotenv();

        let mut builder = config::Config::builder()
            .set_default("connect.default_db_alias", "dwh")?
            .set_default("connect.registry_file", "./catalogs.json")?
            .set_default("connect.dry_run", false)?
            .set_default("logging.level", "info")?;

        // Load from environment variables
        if let Ok(db_alias) = env::var("DEFAULT_DB_ALIAS") {
            builder = builder.set_override("connect.default_db_alias", db_alias)?;
        }

        if let Ok(registry_file) = env::var("REGISTRY_FILE") {
            builder = builder.set_override("connect.registry_file", registry_file)?;
        }

        if let Ok(dry_run) = env::var("DRY_RUN") {
            builder =
                builder.set_override("connect.dry_run", dry_run.parse::<bool>().unwrap_or(false))?;
        }

        if let Ok(log_level) = env::var("RUST_LOG") {
            builder = builder.set_override("logging.level", log_level)?;
        }

        builder.build()?.try_deserialize()
    }
}

/// Declarative registry contents, read from a JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub storages: HashMap<String, StorageDescriptor>,
    #[serde(default)]
    pub databases: HashMap<String, DatabaseTargetConfig>,
    #[serde(default)]
    pub catalogs: HashMap<String, CatalogConfig>,
}

/// A database target: either a connectable URL or a dialect name for
/// render-only use.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseTargetConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub dialect: Option<String>,
    /// The target is a serverless Synapse pool. Only meaningful for
    /// render-only SQL Server targets; live connections report this
    /// through their capability probe.
    #[serde(default)]
    pub serverless: bool,
}

fn default_schema_name() -> String {
    "public".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CatalogConfig {
    Storage {
        storage_alias: String,
        #[serde(default)]
        base_path: String,
        #[serde(default)]
        has_schemas: bool,
        #[serde(default = "default_schema_name")]
        default_schema: String,
        #[serde(default)]
        default_format: Option<Format>,
        /// Explicit table list, skipping discovery when non-empty.
        #[serde(default)]
        tables: Vec<TableDescriptor>,
    },
    Database {
        db_alias: String,
        #[serde(default)]
        has_schemas: bool,
        #[serde(default = "default_schema_name")]
        default_schema: String,
        #[serde(default)]
        include_schemas: Option<Vec<String>>,
    },
}

impl RegistryConfig {
    pub fn from_json(content: &str) -> Result<Self, ConnectError> {
        serde_json::from_str(content)
            .map_err(|e| ConnectError::Validation(format!("Invalid registry file: {}", e)))
    }

    /// Builds the runtime registry from the declarative configuration.
    ///
    /// Local storages get a filesystem client; blob storages are registered
    /// for DDL rendering only until a client is attached programmatically.
    pub fn build_registry(&self) -> Result<CatalogRegistry, ConnectError> {
        let mut registry = CatalogRegistry::new();

        for (alias, descriptor) in &self.storages {
            let client: Arc<dyn crate::services::storage::StorageClient> = match descriptor {
                StorageDescriptor::Local { root } => Arc::new(LocalStorage::new(root.clone())),
                StorageDescriptor::Azure { .. } => {
                    Arc::new(crate::services::storage::UnboundStorage::new(alias.clone()))
                }
            };
            registry.add_storage(alias.clone(), descriptor.clone(), client);
        }

        for (alias, target) in &self.databases {
            match (&target.url, &target.dialect) {
                (Some(url), _) => {
                    registry.add_database(alias.clone(), Arc::new(PostgresAdapter::new(url)?));
                }
                (None, Some(dialect)) => {
                    let adapter = OfflineAdapter::new(dialect.clone()).with_capabilities(
                        DialectCapabilities {
                            serverless: target.serverless,
                        },
                    );
                    registry.add_database(alias.clone(), Arc::new(adapter));
                }
                (None, None) => {
                    return Err(ConnectError::Validation(format!(
                        "Database {} needs either a url or a dialect",
                        alias
                    )));
                }
            }
        }

        for (alias, catalog_config) in &self.catalogs {
            let catalog = match catalog_config {
                CatalogConfig::Storage {
                    storage_alias,
                    base_path,
                    has_schemas,
                    default_schema,
                    default_format,
                    tables,
                } => {
                    let mut catalog = Catalog::storage(storage_alias.clone(), base_path.clone())
                        .with_schemas(*has_schemas)
                        .with_default_schema(default_schema.clone());
                    if let Some(format) = default_format {
                        catalog = catalog.with_default_format(format.clone());
                    }
                    if !tables.is_empty() {
                        catalog.set_tables(tables.clone())?;
                    }
                    catalog
                }
                CatalogConfig::Database {
                    db_alias,
                    has_schemas,
                    default_schema,
                    include_schemas,
                } => {
                    let mut catalog = Catalog::database(db_alias.clone())
                        .with_schemas(*has_schemas)
                        .with_default_schema(default_schema.clone());
                    if let Some(schemas) = include_schemas {
                        catalog = catalog.with_include_schemas(schemas.clone());
                    }
                    catalog
                }
            };
            registry.add_catalog(alias.clone(), catalog);
        }

        Ok(registry)
    }
}
