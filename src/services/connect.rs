// Connect orchestration: turns a discovered catalog into DDL steps
//
// `prepare_storage_steps` renders the one-time objects (external storage,
// file formats) and `connect_catalog` renders one external table statement
// per discovered table. Rendering is fail-fast: the first table that cannot
// be expressed on the target aborts the whole run with no partial output.
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::ConnectError;
use crate::models::{Column, Compression, StorageDescriptor, TableDescriptor};
use crate::services::catalog::CatalogRegistry;
use crate::services::database::{DatabaseAdapter, DialectCapabilities};
use crate::services::ddl::{
    create_external_storage, create_external_table, create_file_format, format_to_ddl, Dialect,
    ExternalTableRequest,
};
use crate::services::schema_map::{map_source_schema, SchemaDecoder};
use crate::services::sidecar::read_schema_sidecar;
use crate::services::storage::{join_path, StorageClient};

/// One executable DDL step bound to a target database.
#[derive(Debug, Clone)]
pub struct ConnectStep {
    /// Stable identifier of the step, e.g. `sales_orders`.
    pub id: String,
    pub db_alias: String,
    pub sql: String,
}

struct ConnectTarget {
    db_alias: String,
    dialect: Dialect,
    capabilities: DialectCapabilities,
    storage_alias: String,
    storage: StorageDescriptor,
    client: Arc<dyn StorageClient>,
    tables: Vec<TableDescriptor>,
    has_schemas: bool,
    default_schema: String,
    base_path: String,
}

/// Resolves everything both entry points need: target dialect and
/// capabilities, the catalog's storage binding and its discovered tables.
async fn resolve_target(
    registry: &mut CatalogRegistry,
    catalog_alias: &str,
    db_alias: &str,
) -> Result<ConnectTarget, ConnectError> {
    let db = registry.database(db_alias)?.clone();
    let dialect = Dialect::from_name(db.dialect_name())?;
    // only SQL Server deployments come in shapes the renderer must know about
    let capabilities = if dialect == Dialect::SqlServer {
        db.capability_probe().await?
    } else {
        DialectCapabilities::default()
    };

    let tables = registry.catalog_tables(catalog_alias).await?.to_vec();
    let catalog = registry.catalog(catalog_alias)?;
    let storage_alias = catalog
        .storage_alias()
        .ok_or_else(|| {
            ConnectError::Validation(format!(
                "Catalog {} is not backed by a storage and cannot be connected",
                catalog_alias
            ))
        })?
        .to_string();
    let has_schemas = catalog.has_schemas();
    let default_schema = catalog.default_schema().to_string();
    let base_path = catalog.base_path().to_string();

    let binding = registry.storage(&storage_alias)?;

    Ok(ConnectTarget {
        db_alias: db_alias.to_string(),
        dialect,
        capabilities,
        storage_alias,
        storage: binding.descriptor.clone(),
        client: binding.client.clone(),
        tables,
        has_schemas,
        default_schema,
        base_path,
    })
}

fn step_id(schema: &str, table: &str) -> String {
    format!("{}_{}", schema, table).to_lowercase()
}

/// Data path of a table relative to the storage root.
fn table_path(target: &ConnectTarget, schema: &str, location: &str) -> String {
    if target.has_schemas {
        join_path(&join_path(&target.base_path, schema), location)
    } else {
        join_path(&target.base_path, location)
    }
}

/// Resolves the column list for one table: explicitly configured columns
/// win, then a schema sidecar next to the data, then schemaless for engines
/// that can infer, then sniffing the data files through the decoder.
async fn resolve_columns(
    target: &ConnectTarget,
    decoder: Option<&Arc<dyn SchemaDecoder>>,
    table: &TableDescriptor,
    path: &str,
) -> Result<Vec<Column>, ConnectError> {
    if !table.columns.is_empty() {
        return Ok(table.columns.clone());
    }

    if let Some(columns) = read_schema_sidecar(target.client.as_ref(), path).await? {
        return Ok(columns);
    }

    let format = table.format.as_ref().ok_or_else(|| {
        ConnectError::UnsupportedFormat(format!("Table {} has no format", table.name))
    })?;
    if target.dialect.supports_schemaless(format) {
        return Ok(Vec::new());
    }

    let decoder = decoder.ok_or_else(|| {
        ConnectError::Validation(format!(
            "No schema decoder registered; cannot read the columns of table {}",
            table.name
        ))
    })?;
    info!(table = %table.name, path = %path, "reading column schema from data files");
    let fields = decoder
        .sniff_schema(target.client.as_ref(), path, format)
        .await?;
    Ok(map_source_schema(&fields))
}

/// Renders the storage-level DDL a catalog's tables depend on: the external
/// storage object plus one file format per distinct format (for dialects
/// with standalone file format objects).
pub async fn prepare_storage_steps(
    registry: &mut CatalogRegistry,
    catalog_alias: &str,
    db_alias: &str,
    or_replace: bool,
) -> Result<Vec<ConnectStep>, ConnectError> {
    let target = resolve_target(registry, catalog_alias, db_alias).await?;

    let mut steps = Vec::new();
    let storage_sql = create_external_storage(
        target.dialect,
        &target.storage_alias,
        &target.storage,
        or_replace,
        !or_replace,
        None,
    )?;
    steps.push(ConnectStep {
        id: format!("storage_{}", target.storage_alias.to_lowercase()),
        db_alias: target.db_alias.clone(),
        sql: storage_sql,
    });

    let mut rendered_formats: Vec<String> = Vec::new();
    for table in &target.tables {
        let format = match &table.format {
            Some(format) => format,
            None => continue,
        };
        let (format_name, _) = format_to_ddl(target.dialect, format)?;
        if rendered_formats.contains(&format_name) {
            continue;
        }

        if let Some(sql) = create_file_format(
            target.dialect,
            &format_name,
            format,
            Compression::None,
            or_replace,
            !or_replace,
        )? {
            steps.push(ConnectStep {
                id: format!("file_format_{}", format_name.to_lowercase()),
                db_alias: target.db_alias.clone(),
                sql,
            });
        }
        rendered_formats.push(format_name);
    }

    Ok(steps)
}

/// Renders one external table statement per table of the catalog.
///
/// Tables inherit the catalog's default schema when discovery yielded none;
/// a table without a location or format fails the whole run.
pub async fn connect_catalog(
    registry: &mut CatalogRegistry,
    catalog_alias: &str,
    db_alias: &str,
    or_replace: bool,
) -> Result<Vec<ConnectStep>, ConnectError> {
    let target = resolve_target(registry, catalog_alias, db_alias).await?;
    let decoder = registry.schema_decoder().cloned();

    let mut steps = Vec::new();
    for table in &target.tables {
        let schema = table.schema.as_deref().unwrap_or(&target.default_schema);
        let location = table.location.as_deref().ok_or_else(|| {
            ConnectError::MissingLocation(format!("{}.{}", schema, table.name))
        })?;
        let format = table.format.as_ref().ok_or_else(|| {
            ConnectError::UnsupportedFormat(format!(
                "Table {}.{} has no format",
                schema, table.name
            ))
        })?;

        let (format_name, options) = format_to_ddl(target.dialect, format)?;
        let path = table_path(&target, schema, location);
        let columns = resolve_columns(&target, decoder.as_ref(), table, &path).await?;

        let sql = create_external_table(
            target.dialect,
            &ExternalTableRequest {
                schema: Some(schema),
                table: &table.name,
                columns: &columns,
                storage_name: &target.storage_alias,
                storage: &target.storage,
                path: &path,
                format_name: &format_name,
                partition_by: &[],
                or_replace,
                if_not_exists: false,
                options,
                capabilities: target.capabilities,
            },
        )?;

        debug!(table = %table.name, schema = %schema, format = %format_name, "rendered external table");
        steps.push(ConnectStep {
            id: step_id(schema, &table.name),
            db_alias: target.db_alias.clone(),
            sql,
        });
    }

    info!(
        catalog = %catalog_alias,
        db = %db_alias,
        steps = steps.len(),
        "connect statements rendered"
    );
    Ok(steps)
}
