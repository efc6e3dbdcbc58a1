// Catalog model and registry
//
// A catalog is the bridge between a table source (a storage path or a
// database) and the tables it contains. Discovery is memoized: the table
// list is computed at most once per catalog and reused afterwards.
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::info;

use crate::error::ConnectError;
use crate::models::{Format, StorageDescriptor, TableDescriptor};
use crate::services::database::DatabaseAdapter;
use crate::services::discovery::{discover_tables_from_db, discover_tables_from_storage};
use crate::services::schema_map::SchemaDecoder;
use crate::services::storage::StorageClient;

/// A registered storage: its description plus the client used to reach it.
#[derive(Clone)]
pub struct StorageBinding {
    pub descriptor: StorageDescriptor,
    pub client: Arc<dyn StorageClient>,
}

/// Where a catalog's tables come from.
#[derive(Clone)]
pub enum CatalogSource {
    Storage {
        storage_alias: String,
        base_path: String,
        default_format: Option<Format>,
    },
    Database {
        db_alias: String,
        include_schemas: Option<Vec<String>>,
    },
}

/// A named collection of tables backed by a storage path or a database.
#[derive(Clone)]
pub struct Catalog {
    source: CatalogSource,
    has_schemas: bool,
    default_schema: String,
    tables: Option<Vec<TableDescriptor>>,
}

impl Catalog {
    pub fn storage(storage_alias: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            source: CatalogSource::Storage {
                storage_alias: storage_alias.into(),
                base_path: base_path.into(),
                default_format: None,
            },
            has_schemas: false,
            default_schema: "public".to_string(),
            tables: None,
        }
    }

    pub fn database(db_alias: impl Into<String>) -> Self {
        Self {
            source: CatalogSource::Database {
                db_alias: db_alias.into(),
                include_schemas: None,
            },
            has_schemas: false,
            default_schema: "public".to_string(),
            tables: None,
        }
    }

    pub fn with_schemas(mut self, has_schemas: bool) -> Self {
        self.has_schemas = has_schemas;
        self
    }

    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = schema.into();
        self
    }

    pub fn with_default_format(mut self, format: Format) -> Self {
        if let CatalogSource::Storage { default_format, .. } = &mut self.source {
            *default_format = Some(format);
        }
        self
    }

    pub fn with_include_schemas(mut self, schemas: Vec<String>) -> Self {
        if let CatalogSource::Database { include_schemas, .. } = &mut self.source {
            *include_schemas = Some(schemas);
        }
        self
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    pub fn has_schemas(&self) -> bool {
        self.has_schemas
    }

    pub fn default_schema(&self) -> &str {
        &self.default_schema
    }

    pub fn storage_alias(&self) -> Option<&str> {
        match &self.source {
            CatalogSource::Storage { storage_alias, .. } => Some(storage_alias),
            CatalogSource::Database { .. } => None,
        }
    }

    pub fn base_path(&self) -> &str {
        match &self.source {
            CatalogSource::Storage { base_path, .. } => base_path,
            CatalogSource::Database { .. } => "",
        }
    }

    pub fn is_populated(&self) -> bool {
        self.tables.is_some()
    }

    /// The discovered tables, empty while the catalog is unpopulated.
    pub fn tables(&self) -> &[TableDescriptor] {
        self.tables.as_deref().unwrap_or(&[])
    }

    /// Tables grouped by schema name. Without schema folders all tables
    /// collapse into the single default schema; otherwise tables group by
    /// their own schema, the default filling in for tables without one.
    pub fn schemas(&self) -> BTreeMap<&str, Vec<&TableDescriptor>> {
        let mut schemas: BTreeMap<&str, Vec<&TableDescriptor>> = BTreeMap::new();
        if !self.has_schemas {
            schemas.insert(self.default_schema.as_str(), self.tables().iter().collect());
            return schemas;
        }
        for table in self.tables() {
            let schema = table.schema.as_deref().unwrap_or(&self.default_schema);
            schemas.entry(schema).or_default().push(table);
        }
        schemas
    }

    /// Replaces the table list, e.g. with a hand-curated one. Table names
    /// must be non-empty and unique within their schema.
    pub fn set_tables(&mut self, tables: Vec<TableDescriptor>) -> Result<(), ConnectError> {
        validate_tables(&tables)?;
        self.tables = Some(tables);
        Ok(())
    }

    async fn ensure_discovered(
        &mut self,
        storages: &HashMap<String, StorageBinding>,
        databases: &HashMap<String, Arc<dyn DatabaseAdapter>>,
    ) -> Result<(), ConnectError> {
        if self.tables.is_some() {
            return Ok(());
        }

        let tables = match &self.source {
            CatalogSource::Storage {
                storage_alias,
                base_path,
                default_format,
            } => {
                let binding = storages.get(storage_alias).ok_or_else(|| {
                    ConnectError::StorageNotConfigured(storage_alias.clone())
                })?;
                discover_tables_from_storage(
                    binding.client.as_ref(),
                    base_path,
                    self.has_schemas,
                    default_format.as_ref(),
                )
                .await?
            }
            CatalogSource::Database {
                db_alias,
                include_schemas,
            } => {
                let db = databases
                    .get(db_alias)
                    .ok_or_else(|| ConnectError::DatabaseNotConfigured(db_alias.clone()))?;
                discover_tables_from_db(db.as_ref(), include_schemas.as_deref()).await?
            }
        };

        info!(tables = tables.len(), "catalog discovery finished");
        validate_tables(&tables)?;
        self.tables = Some(tables);
        Ok(())
    }
}

fn validate_tables(tables: &[TableDescriptor]) -> Result<(), ConnectError> {
    let mut seen: BTreeMap<(Option<&str>, &str), ()> = BTreeMap::new();
    for table in tables {
        if table.name.is_empty() {
            return Err(ConnectError::Validation(
                "Table names must not be empty".to_string(),
            ));
        }
        if seen
            .insert((table.schema.as_deref(), table.name.as_str()), ())
            .is_some()
        {
            return Err(ConnectError::Validation(format!(
                "Duplicate table {}{}",
                table
                    .schema
                    .as_deref()
                    .map(|s| format!("{}.", s))
                    .unwrap_or_default(),
                table.name
            )));
        }
    }
    Ok(())
}

/// Holds the configured storages, databases and catalogs of a deployment.
///
/// All lookups go through aliases; an unknown alias is an error rather
/// than an implicit default.
#[derive(Default)]
pub struct CatalogRegistry {
    storages: HashMap<String, StorageBinding>,
    databases: HashMap<String, Arc<dyn DatabaseAdapter>>,
    catalogs: HashMap<String, Catalog>,
    schema_decoder: Option<Arc<dyn SchemaDecoder>>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_storage(
        &mut self,
        alias: impl Into<String>,
        descriptor: StorageDescriptor,
        client: Arc<dyn StorageClient>,
    ) {
        self.storages
            .insert(alias.into(), StorageBinding { descriptor, client });
    }

    pub fn add_database(&mut self, alias: impl Into<String>, adapter: Arc<dyn DatabaseAdapter>) {
        self.databases.insert(alias.into(), adapter);
    }

    pub fn add_catalog(&mut self, alias: impl Into<String>, catalog: Catalog) {
        self.catalogs.insert(alias.into(), catalog);
    }

    pub fn set_schema_decoder(&mut self, decoder: Arc<dyn SchemaDecoder>) {
        self.schema_decoder = Some(decoder);
    }

    pub fn schema_decoder(&self) -> Option<&Arc<dyn SchemaDecoder>> {
        self.schema_decoder.as_ref()
    }

    pub fn storage(&self, alias: &str) -> Result<&StorageBinding, ConnectError> {
        self.storages
            .get(alias)
            .ok_or_else(|| ConnectError::StorageNotConfigured(alias.to_string()))
    }

    pub fn database(&self, alias: &str) -> Result<&Arc<dyn DatabaseAdapter>, ConnectError> {
        self.databases
            .get(alias)
            .ok_or_else(|| ConnectError::DatabaseNotConfigured(alias.to_string()))
    }

    pub fn catalog(&self, alias: &str) -> Result<&Catalog, ConnectError> {
        self.catalogs
            .get(alias)
            .ok_or_else(|| ConnectError::CatalogNotConfigured(alias.to_string()))
    }

    pub fn catalog_mut(&mut self, alias: &str) -> Result<&mut Catalog, ConnectError> {
        self.catalogs
            .get_mut(alias)
            .ok_or_else(|| ConnectError::CatalogNotConfigured(alias.to_string()))
    }

    pub fn catalog_aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = self.catalogs.keys().map(String::as_str).collect();
        aliases.sort_unstable();
        aliases
    }

    /// The tables of a catalog, discovering them on first access.
    pub async fn catalog_tables(
        &mut self,
        alias: &str,
    ) -> Result<&[TableDescriptor], ConnectError> {
        let catalog = self
            .catalogs
            .get_mut(alias)
            .ok_or_else(|| ConnectError::CatalogNotConfigured(alias.to_string()))?;
        catalog
            .ensure_discovered(&self.storages, &self.databases)
            .await?;
        Ok(catalog.tables())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AzureService;
    use crate::services::storage::{LocalStorage, StorageEntry};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn local_descriptor(root: &std::path::Path) -> StorageDescriptor {
        StorageDescriptor::Local {
            root: root.to_string_lossy().to_string(),
        }
    }

    #[tokio::test]
    async fn test_catalog_tables_discovers_from_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage.write("lake/orders/part-0.parquet", b"").await.unwrap();

        let mut registry = CatalogRegistry::new();
        registry.add_storage(
            "lake",
            local_descriptor(dir.path()),
            Arc::new(LocalStorage::new(dir.path())),
        );
        registry.add_catalog("raw", Catalog::storage("lake", "lake"));

        let tables = registry.catalog_tables("raw").await.unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "orders");
        assert!(registry.catalog("raw").unwrap().is_populated());
    }

    #[tokio::test]
    async fn test_unknown_aliases_are_errors() {
        let mut registry = CatalogRegistry::new();
        assert!(matches!(
            registry.catalog_tables("nope").await,
            Err(ConnectError::CatalogNotConfigured(_))
        ));
        assert!(matches!(
            registry.storage("nope"),
            Err(ConnectError::StorageNotConfigured(_))
        ));
        assert!(matches!(
            registry.database("nope"),
            Err(ConnectError::DatabaseNotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn test_catalog_with_missing_storage_alias() {
        let mut registry = CatalogRegistry::new();
        registry.add_catalog("raw", Catalog::storage("lake", ""));
        assert!(matches!(
            registry.catalog_tables("raw").await,
            Err(ConnectError::StorageNotConfigured(_))
        ));
    }

    struct CountingStorage {
        inner: LocalStorage,
        list_calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl StorageClient for CountingStorage {
        async fn list_children(&self, path: &str) -> Result<Vec<StorageEntry>, ConnectError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.list_children(path).await
        }

        async fn exists(&self, path: &str) -> Result<bool, ConnectError> {
            self.inner.exists(path).await
        }

        async fn read(&self, path: &str) -> Result<Vec<u8>, ConnectError> {
            self.inner.read(path).await
        }

        async fn write(&self, path: &str, content: &[u8]) -> Result<(), ConnectError> {
            self.inner.write(path, content).await
        }
    }

    #[tokio::test]
    async fn test_discovery_is_memoized() {
        let dir = tempfile::tempdir().unwrap();
        LocalStorage::new(dir.path())
            .write("orders/part-0.parquet", b"")
            .await
            .unwrap();

        let counting = Arc::new(CountingStorage {
            inner: LocalStorage::new(dir.path()),
            list_calls: AtomicUsize::new(0),
        });
        let mut registry = CatalogRegistry::new();
        registry.add_storage(
            "lake",
            StorageDescriptor::Azure {
                account_name: "acct".to_string(),
                container_name: "lake".to_string(),
                service: AzureService::Blob,
                sas_token: None,
            },
            counting.clone(),
        );
        registry.add_catalog("raw", Catalog::storage("lake", ""));

        registry.catalog_tables("raw").await.unwrap();
        let calls_after_first = counting.list_calls.load(Ordering::SeqCst);
        assert!(calls_after_first > 0);

        registry.catalog_tables("raw").await.unwrap();
        assert_eq!(counting.list_calls.load(Ordering::SeqCst), calls_after_first);
    }

    #[tokio::test]
    async fn test_set_tables_rejects_duplicates() {
        let mut catalog = Catalog::storage("lake", "");
        let result = catalog.set_tables(vec![
            TableDescriptor::new("orders"),
            TableDescriptor::new("orders"),
        ]);
        assert!(matches!(result, Err(ConnectError::Validation(_))));
    }

    #[tokio::test]
    async fn test_set_tables_skips_discovery() {
        let mut registry = CatalogRegistry::new();
        let mut catalog = Catalog::storage("lake", "");
        catalog
            .set_tables(vec![TableDescriptor::new("orders")])
            .unwrap();
        registry.add_catalog("raw", catalog);

        // no storage registered under "lake"; memoized tables are used as-is
        let tables = registry.catalog_tables("raw").await.unwrap();
        assert_eq!(tables.len(), 1);
    }

    #[test]
    fn test_schemas_grouping_uses_default_schema() {
        let mut catalog = Catalog::storage("lake", "")
            .with_schemas(true)
            .with_default_schema("dbo");
        catalog
            .set_tables(vec![
                TableDescriptor::new("orders").with_schema("sales"),
                TableDescriptor::new("misc"),
            ])
            .unwrap();

        let schemas = catalog.schemas();
        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas["dbo"].len(), 1);
        assert_eq!(schemas["sales"][0].name, "orders");
    }

    #[test]
    fn test_catalog_defaults() {
        let catalog = Catalog::storage("lake", "base");
        assert!(!catalog.has_schemas());
        assert_eq!(catalog.default_schema(), "public");

        let catalog = Catalog::database("dwh");
        assert!(!catalog.has_schemas());
        assert_eq!(catalog.default_schema(), "public");
    }

    #[test]
    fn test_schemas_collapse_without_schema_folders() {
        let mut catalog = Catalog::storage("lake", "");
        catalog
            .set_tables(vec![
                TableDescriptor::new("orders").with_schema("sales"),
                TableDescriptor::new("misc"),
            ])
            .unwrap();

        // explicit per-table schemas do not split the view
        let schemas = catalog.schemas();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas["public"].len(), 2);
    }
}
