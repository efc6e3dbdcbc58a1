// Table discovery from storage trees and database system catalogs
use tracing::debug;

use crate::error::ConnectError;
use crate::models::{Format, TableDescriptor};
use crate::services::database::DatabaseAdapter;
use crate::services::storage::{join_path, StorageClient};

/// Names starting with `_` or `.` are hidden by the hadoop convention and
/// never become schemas, tables or sniff candidates.
fn is_hidden(name: &str) -> bool {
    name.starts_with('_') || name.starts_with('.')
}

fn format_from_extension(file_name: &str) -> Option<Format> {
    if file_name.ends_with(".parquet") {
        Some(Format::Parquet)
    } else if file_name.ends_with(".avro") {
        Some(Format::Avro)
    } else if file_name.ends_with(".orc") {
        Some(Format::Orc)
    } else if file_name.ends_with(".csv") {
        Some(Format::csv())
    } else if file_name.ends_with(".tsv") {
        Some(Format::tsv())
    } else {
        None
    }
}

/// Sniffs the format of a table directory from its direct children.
///
/// Lakehouse marker directories always win over file extensions and over
/// the default format; an empty directory never resolves to a format.
async fn sniff_table_format(
    storage: &dyn StorageClient,
    table_path: &str,
    default_format: Option<&Format>,
) -> Result<Option<Format>, ConnectError> {
    let children = storage.list_children(table_path).await?;
    if children.is_empty() {
        return Ok(None);
    }

    if children
        .iter()
        .any(|c| c.is_directory && c.name == "_delta_log")
    {
        return Ok(Some(Format::Delta));
    }
    if children.iter().any(|c| c.is_directory && c.name == ".hoodie") {
        return Ok(Some(Format::Hudi));
    }

    let sniffed = children
        .iter()
        .find(|c| !c.is_directory && !is_hidden(&c.name))
        .and_then(|c| format_from_extension(&c.name));

    Ok(sniffed.or_else(|| default_format.cloned()))
}

/// Discovers tables from a storage path by directory convention.
///
/// With `with_schema_folders` the first directory level is taken as schema
/// names and the second as tables; otherwise `base_path` itself is the sole
/// unnamed schema. Candidates without a recognizable format are silently
/// skipped.
pub async fn discover_tables_from_storage(
    storage: &dyn StorageClient,
    base_path: &str,
    with_schema_folders: bool,
    default_format: Option<&Format>,
) -> Result<Vec<TableDescriptor>, ConnectError> {
    let schemas: Vec<Option<String>> = if with_schema_folders {
        storage
            .list_children(base_path)
            .await?
            .into_iter()
            .filter(|c| c.is_directory && !is_hidden(&c.name))
            .map(|c| Some(c.name))
            .collect()
    } else {
        vec![None]
    };

    let mut tables = Vec::new();
    for schema in schemas {
        let schema_path = match &schema {
            Some(name) => join_path(base_path, name),
            None => base_path.to_string(),
        };

        for candidate in storage
            .list_children(&schema_path)
            .await?
            .into_iter()
            .filter(|c| c.is_directory && !is_hidden(&c.name))
        {
            let table_path = join_path(&schema_path, &candidate.name);
            match sniff_table_format(storage, &table_path, default_format).await? {
                Some(format) => {
                    debug!(
                        table = %candidate.name,
                        schema = schema.as_deref().unwrap_or(""),
                        format = format.name(),
                        "discovered table"
                    );
                    tables.push(TableDescriptor {
                        name: candidate.name.clone(),
                        schema: schema.clone(),
                        location: Some(candidate.name),
                        format: Some(format),
                        columns: Vec::new(),
                    });
                }
                None => {
                    debug!(path = %table_path, "no table format detected, skipping directory");
                }
            }
        }
    }

    Ok(tables)
}

/// Discovers tables and views from a database's system catalog.
///
/// Without an allow-list all user schemas are taken (the adapter excludes
/// system schemas). Format and location are not knowable from a relational
/// catalog and stay unset.
pub async fn discover_tables_from_db(
    db: &dyn DatabaseAdapter,
    include_schemas: Option<&[String]>,
) -> Result<Vec<TableDescriptor>, ConnectError> {
    let schemas = match include_schemas {
        Some(schemas) => schemas.to_vec(),
        None => db.list_schemas().await?,
    };

    let mut tables = Vec::new();
    for schema in schemas {
        for name in db.list_relations(&schema).await? {
            tables.push(TableDescriptor {
                name,
                schema: Some(schema.clone()),
                location: None,
                format: None,
                columns: Vec::new(),
            });
        }
    }

    Ok(tables)
}
