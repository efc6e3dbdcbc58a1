// Dialect DDL generators
//
// Pure renderers from generic table/format/storage descriptions to
// engine-specific DDL text. Each target engine gets its own renderer so the
// engine's quirks stay isolated and independently testable; the entry
// points below validate the cross-dialect flag rules and dispatch on the
// closed `Dialect` enum.
pub mod databricks;
pub mod snowflake;
pub mod sqlserver;

pub use databricks::DatabricksRenderer;
pub use snowflake::SnowflakeRenderer;
pub use sqlserver::SqlServerRenderer;

use crate::error::ConnectError;
use crate::models::{Column, Compression, Format, GenericSqlType, StorageDescriptor};
use crate::services::database::DialectCapabilities;

/// Target SQL dialect for DDL generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Snowflake,
    SqlServer,
    Databricks,
}

impl Dialect {
    pub fn from_name(name: &str) -> Result<Self, ConnectError> {
        match name.to_lowercase().as_str() {
            "snowflake" => Ok(Dialect::Snowflake),
            "mssql" | "sqlserver" | "sql_server" | "synapse" => Ok(Dialect::SqlServer),
            "databricks" => Ok(Dialect::Databricks),
            _ => Err(ConnectError::UnsupportedDialect(name.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Snowflake => "snowflake",
            Dialect::SqlServer => "mssql",
            Dialect::Databricks => "databricks",
        }
    }

    fn renderer(&self) -> &'static dyn DialectRenderer {
        match self {
            Dialect::Snowflake => &SnowflakeRenderer,
            Dialect::SqlServer => &SqlServerRenderer,
            Dialect::Databricks => &DatabricksRenderer,
        }
    }

    /// Whether the engine can read external data of this format without a
    /// declared column list.
    pub fn supports_schemaless(&self, format: &Format) -> bool {
        matches!(self, Dialect::Databricks) && matches!(format, Format::Delta | Format::Parquet)
    }
}

/// Literal SQL fragments keyed by option name, in insertion order.
///
/// Rendered verbatim into WITH/OPTIONS clauses; insertion order is kept so
/// the statement text is stable across runs.
pub type DdlOptions = Vec<(String, String)>;

pub(crate) fn options_contain(options: &DdlOptions, key: &str) -> bool {
    options.iter().any(|(k, _)| k == key)
}

pub struct FileFormatRequest<'a> {
    pub name: &'a str,
    pub format: &'a Format,
    pub compression: Compression,
    pub or_replace: bool,
    pub if_not_exists: bool,
}

pub struct ExternalStorageRequest<'a> {
    pub name: &'a str,
    pub storage: &'a StorageDescriptor,
    pub or_replace: bool,
    pub if_not_exists: bool,
    /// Update mutable metadata (credentials) when the object already exists.
    pub or_update: bool,
}

pub struct ExternalTableRequest<'a> {
    pub schema: Option<&'a str>,
    pub table: &'a str,
    pub columns: &'a [Column],
    pub storage_name: &'a str,
    pub storage: &'a StorageDescriptor,
    /// Path of the table data relative to the storage root.
    pub path: &'a str,
    /// Engine-side name of the file format, e.g. `PARQUET`.
    pub format_name: &'a str,
    pub partition_by: &'a [String],
    pub or_replace: bool,
    pub if_not_exists: bool,
    pub options: DdlOptions,
    pub capabilities: DialectCapabilities,
}

/// Per-dialect DDL renderer.
///
/// Implementations are pure: the only inputs are the request structs and
/// the capability flags read beforehand by the caller.
pub trait DialectRenderer: Sync {
    /// Quote an identifier according to the dialect's rules.
    fn quote_identifier(&self, name: &str) -> String;

    /// Render a generic SQL type in the dialect's native type syntax,
    /// remapping types the engine cannot express 1:1.
    fn render_type(&self, data_type: &GenericSqlType) -> String;

    /// Convert a format into the dialect's format name and table options.
    fn format_to_ddl(&self, format: &Format) -> Result<(String, DdlOptions), ConnectError>;

    /// Render a standalone file format object, or `None` for dialects that
    /// declare the format inline in the table statement.
    fn render_file_format(&self, req: &FileFormatRequest) -> Result<Option<String>, ConnectError>;

    /// Render the external storage object (data source, stage, location).
    fn render_external_storage(&self, req: &ExternalStorageRequest) -> Result<String, ConnectError>;

    /// Render the external table statement.
    fn render_external_table(&self, req: &ExternalTableRequest) -> Result<String, ConnectError>;

    /// `"schema"."table"` in the dialect's quoting.
    fn format_table(&self, schema: Option<&str>, table: &str) -> String {
        match schema {
            Some(schema) => format!(
                "{}.{}",
                self.quote_identifier(schema),
                self.quote_identifier(table)
            ),
            None => self.quote_identifier(table),
        }
    }
}

/// Renders a CREATE (EXTERNAL) FILE FORMAT statement.
///
/// Returns `None` when the dialect has no standalone file format object.
pub fn create_file_format(
    dialect: Dialect,
    name: &str,
    format: &Format,
    compression: Compression,
    or_replace: bool,
    if_not_exists: bool,
) -> Result<Option<String>, ConnectError> {
    if or_replace && if_not_exists {
        return Err(ConnectError::InvalidOptionCombination(
            "or_replace and if_not_exists cannot be used at the same time".to_string(),
        ));
    }

    dialect.renderer().render_file_format(&FileFormatRequest {
        name,
        format,
        compression,
        or_replace,
        if_not_exists,
    })
}

/// Renders the statement connecting an external storage to the engine
/// (CREATE EXTERNAL DATA SOURCE, CREATE STAGE, CREATE EXTERNAL LOCATION).
///
/// `or_update` defaults to `!or_replace` when unspecified.
pub fn create_external_storage(
    dialect: Dialect,
    name: &str,
    storage: &StorageDescriptor,
    or_replace: bool,
    if_not_exists: bool,
    or_update: Option<bool>,
) -> Result<String, ConnectError> {
    if or_replace && if_not_exists {
        return Err(ConnectError::InvalidOptionCombination(
            "or_replace and if_not_exists cannot be used at the same time".to_string(),
        ));
    }
    if or_replace && or_update == Some(true) {
        return Err(ConnectError::InvalidOptionCombination(
            "or_replace and or_update cannot be used at the same time".to_string(),
        ));
    }

    dialect
        .renderer()
        .render_external_storage(&ExternalStorageRequest {
            name,
            storage,
            or_replace,
            if_not_exists,
            or_update: or_update.unwrap_or(!or_replace),
        })
}

/// Renders a CREATE EXTERNAL TABLE statement (or the engine's equivalent).
pub fn create_external_table(
    dialect: Dialect,
    req: &ExternalTableRequest,
) -> Result<String, ConnectError> {
    if req.or_replace && req.if_not_exists {
        return Err(ConnectError::InvalidOptionCombination(
            "or_replace and if_not_exists cannot be used at the same time".to_string(),
        ));
    }

    dialect.renderer().render_external_table(req)
}

/// Converts a format into a dialect-specific format name and option list.
pub fn format_to_ddl(
    dialect: Dialect,
    format: &Format,
) -> Result<(String, DdlOptions), ConnectError> {
    dialect.renderer().format_to_ddl(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_DIALECTS: [Dialect; 3] = [Dialect::Snowflake, Dialect::SqlServer, Dialect::Databricks];

    fn azure_storage() -> StorageDescriptor {
        StorageDescriptor::Azure {
            account_name: "acct".to_string(),
            container_name: "lake".to_string(),
            service: Default::default(),
            sas_token: Some("sv=2024&sig=abc".to_string()),
        }
    }

    #[test]
    fn test_dialect_from_name() {
        assert_eq!(Dialect::from_name("snowflake").unwrap(), Dialect::Snowflake);
        assert_eq!(Dialect::from_name("mssql").unwrap(), Dialect::SqlServer);
        assert_eq!(Dialect::from_name("Databricks").unwrap(), Dialect::Databricks);
        assert!(matches!(
            Dialect::from_name("postgresql"),
            Err(ConnectError::UnsupportedDialect(_))
        ));
    }

    #[test]
    fn test_file_format_rejects_conflicting_flags_for_every_dialect() {
        for dialect in ALL_DIALECTS {
            let result =
                create_file_format(dialect, "fmt", &Format::Parquet, Compression::None, true, true);
            assert!(
                matches!(result, Err(ConnectError::InvalidOptionCombination(_))),
                "dialect {:?} accepted conflicting flags",
                dialect
            );
        }
    }

    #[test]
    fn test_external_storage_rejects_conflicting_flags_for_every_dialect() {
        for dialect in ALL_DIALECTS {
            let storage = azure_storage();
            let result = create_external_storage(dialect, "lake", &storage, true, true, None);
            assert!(matches!(
                result,
                Err(ConnectError::InvalidOptionCombination(_))
            ));

            let result = create_external_storage(dialect, "lake", &storage, true, false, Some(true));
            assert!(matches!(
                result,
                Err(ConnectError::InvalidOptionCombination(_))
            ));
        }
    }

    #[test]
    fn test_schemaless_support() {
        assert!(Dialect::Databricks.supports_schemaless(&Format::Delta));
        assert!(Dialect::Databricks.supports_schemaless(&Format::Parquet));
        assert!(!Dialect::Databricks.supports_schemaless(&Format::csv()));
        assert!(!Dialect::Snowflake.supports_schemaless(&Format::Delta));
        assert!(!Dialect::SqlServer.supports_schemaless(&Format::Parquet));
    }
}
