// Databricks DDL renderer
//
// Databricks has no standalone file format object; the format is declared
// inline via `USING <format>` on the table statement.
use crate::error::ConnectError;
use crate::models::{AzureService, Format, GenericSqlType, StorageDescriptor};
use crate::services::ddl::{
    options_contain, DdlOptions, DialectRenderer, ExternalStorageRequest, ExternalTableRequest,
    FileFormatRequest,
};

pub struct DatabricksRenderer;

impl DatabricksRenderer {
    /// Filesystem URL of an Azure container for LOCATION clauses.
    fn location_url(storage: &StorageDescriptor) -> Result<String, ConnectError> {
        match storage {
            StorageDescriptor::Azure {
                account_name,
                container_name,
                service,
                ..
            } => Ok(match service {
                AzureService::Dfs => format!(
                    "abfss://{}@{}.dfs.core.windows.net/",
                    container_name, account_name
                ),
                AzureService::Blob => format!(
                    "wasbs://{}@{}.blob.core.windows.net/",
                    container_name, account_name
                ),
            }),
            other => Err(ConnectError::UnsupportedStorageKind(format!(
                "The storage kind {} is not supported for Databricks",
                other.kind_name()
            ))),
        }
    }
}

impl DialectRenderer for DatabricksRenderer {
    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn render_type(&self, data_type: &GenericSqlType) -> String {
        match data_type {
            GenericSqlType::Boolean => "BOOLEAN".to_string(),
            GenericSqlType::SmallInt => "SMALLINT".to_string(),
            GenericSqlType::Integer => "INT".to_string(),
            GenericSqlType::BigInt => "BIGINT".to_string(),
            GenericSqlType::Decimal { precision, scale } => {
                format!("DECIMAL({}, {})", precision, scale)
            }
            GenericSqlType::Float => "FLOAT".to_string(),
            GenericSqlType::DoubleAsDecimal => "DOUBLE".to_string(),
            GenericSqlType::UnicodeString | GenericSqlType::JsonLikeString => "STRING".to_string(),
            GenericSqlType::Date => "DATE".to_string(),
            GenericSqlType::DateTime => "TIMESTAMP".to_string(),
            // Spark BINARY takes no length parameter
            GenericSqlType::Binary => "BINARY".to_string(),
        }
    }

    fn format_to_ddl(&self, format: &Format) -> Result<(String, DdlOptions), ConnectError> {
        match format {
            Format::Parquet => Ok(("PARQUET".to_string(), Vec::new())),
            Format::Orc => Ok(("ORC".to_string(), Vec::new())),
            Format::JsonLines => Ok(("JSON".to_string(), Vec::new())),
            Format::Delta => Ok(("DELTA".to_string(), Vec::new())),
            Format::Csv {
                delimiter,
                quote,
                header,
                null_token,
            } => {
                let mut options: DdlOptions = Vec::new();
                options.push((
                    "header".to_string(),
                    if *header { "true" } else { "false" }.to_string(),
                ));
                options.push(("sep".to_string(), format!("'{}'", delimiter)));
                match quote {
                    Some('\'') => options.push(("quote".to_string(), "'\\''".to_string())),
                    Some(quote) => options.push(("quote".to_string(), format!("'{}'", quote))),
                    None => options.push(("quote".to_string(), "null".to_string())),
                }
                if let Some(null_token) = null_token {
                    options.push(("nullValue".to_string(), format!("'{}'", null_token)));
                }
                Ok(("CSV".to_string(), options))
            }
            other => Err(ConnectError::UnsupportedFormat(format!(
                "The format {} is not supported for Databricks",
                other.name()
            ))),
        }
    }

    fn render_file_format(&self, _req: &FileFormatRequest) -> Result<Option<String>, ConnectError> {
        // no standalone file format object; declared inline with USING
        Ok(None)
    }

    fn render_external_storage(
        &self,
        req: &ExternalStorageRequest,
    ) -> Result<String, ConnectError> {
        let url = Self::location_url(req.storage)?;
        let credential_name = format!("{}__CREDENTIALS", req.name);

        Ok(format!(
            "CREATE EXTERNAL LOCATION {}{} URL '{}' WITH (STORAGE CREDENTIAL {});",
            if req.if_not_exists { "IF NOT EXISTS " } else { "" },
            self.quote_identifier(req.name),
            url,
            credential_name
        ))
    }

    fn render_external_table(&self, req: &ExternalTableRequest) -> Result<String, ConnectError> {
        let location_path = format!("{}{}", Self::location_url(req.storage)?, req.path);

        let mut options = req.options.clone();
        if req.format_name.eq_ignore_ascii_case("CSV") && !options_contain(&options, "header") {
            options.push(("header".to_string(), "false".to_string()));
        }

        let column_definitions: Vec<String> = req
            .columns
            .iter()
            .map(|c| {
                format!(
                    "{} {}",
                    self.quote_identifier(&c.name),
                    self.render_type(&c.data_type)
                )
            })
            .collect();

        let full_name = self.format_table(req.schema, req.table);

        let mut sql = String::new();
        if req.or_replace {
            sql.push_str(&format!("DROP TABLE IF EXISTS {};\n", full_name));
        }
        sql.push_str("CREATE TABLE ");
        if req.if_not_exists {
            sql.push_str("IF NOT EXISTS ");
        }
        sql.push_str(&full_name);
        if !column_definitions.is_empty() {
            sql.push_str(&format!(" (\n\t{}\n)\n", column_definitions.join(",\n\t")));
        }
        sql.push_str(&format!("\n  USING {}", req.format_name));
        if !options.is_empty() {
            let option_clause = options
                .iter()
                .map(|(k, v)| format!("{} = {}", k, v))
                .collect::<Vec<_>>()
                .join(",\n\t");
            sql.push_str(&format!("\n  OPTIONS (\n\t{}\n)", option_clause));
        }
        if !req.partition_by.is_empty() {
            sql.push_str(&format!(
                "\n  PARTITIONED BY ({})",
                req.partition_by.join(", ")
            ));
        }
        sql.push_str(&format!("\n  LOCATION '{}';", location_path));

        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Column;
    use crate::services::database::DialectCapabilities;

    fn dfs_storage() -> StorageDescriptor {
        StorageDescriptor::Azure {
            account_name: "acct".to_string(),
            container_name: "lake".to_string(),
            service: AzureService::Dfs,
            sas_token: None,
        }
    }

    #[test]
    fn test_no_standalone_file_format() {
        let result = DatabricksRenderer
            .render_file_format(&FileFormatRequest {
                name: "fmt",
                format: &Format::Parquet,
                compression: Default::default(),
                or_replace: false,
                if_not_exists: false,
            })
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_external_location_url() {
        let storage = dfs_storage();
        let sql = DatabricksRenderer
            .render_external_storage(&ExternalStorageRequest {
                name: "lake",
                storage: &storage,
                or_replace: false,
                if_not_exists: true,
                or_update: false,
            })
            .unwrap();
        assert_eq!(
            sql,
            "CREATE EXTERNAL LOCATION IF NOT EXISTS `lake` URL 'abfss://lake@acct.dfs.core.windows.net/' WITH (STORAGE CREDENTIAL lake__CREDENTIALS);"
        );
    }

    #[test]
    fn test_external_location_rejects_local_storage() {
        let storage = StorageDescriptor::Local {
            root: "/data".to_string(),
        };
        let result = DatabricksRenderer.render_external_storage(&ExternalStorageRequest {
            name: "lake",
            storage: &storage,
            or_replace: false,
            if_not_exists: false,
            or_update: false,
        });
        assert!(matches!(
            result,
            Err(ConnectError::UnsupportedStorageKind(_))
        ));
    }

    #[test]
    fn test_schemaless_table_omits_column_clause() {
        let storage = dfs_storage();
        let sql = DatabricksRenderer
            .render_external_table(&ExternalTableRequest {
                schema: Some("public"),
                table: "orders",
                columns: &[],
                storage_name: "lake",
                storage: &storage,
                path: "orders",
                format_name: "PARQUET",
                partition_by: &[],
                or_replace: false,
                if_not_exists: false,
                options: Vec::new(),
                capabilities: DialectCapabilities::default(),
            })
            .unwrap();

        assert!(sql.starts_with("CREATE TABLE `public`.`orders`"));
        assert!(!sql.contains("(\n\t"));
        assert!(sql.contains("USING PARQUET"));
        assert!(sql.contains("LOCATION 'abfss://lake@acct.dfs.core.windows.net/orders';"));
    }

    #[test]
    fn test_or_replace_drops_first() {
        let storage = dfs_storage();
        let columns = vec![Column::new("id", GenericSqlType::BigInt)];
        let sql = DatabricksRenderer
            .render_external_table(&ExternalTableRequest {
                schema: Some("public"),
                table: "orders",
                columns: &columns,
                storage_name: "lake",
                storage: &storage,
                path: "orders",
                format_name: "DELTA",
                partition_by: &[],
                or_replace: true,
                if_not_exists: false,
                options: Vec::new(),
                capabilities: DialectCapabilities::default(),
            })
            .unwrap();
        assert!(sql.starts_with("DROP TABLE IF EXISTS `public`.`orders`;\n"));
        assert!(sql.contains("`id` BIGINT"));
        assert!(sql.contains("USING DELTA"));
    }

    #[test]
    fn test_csv_table_gets_header_default() {
        let storage = dfs_storage();
        let columns = vec![Column::new("id", GenericSqlType::Integer)];
        let sql = DatabricksRenderer
            .render_external_table(&ExternalTableRequest {
                schema: None,
                table: "raw",
                columns: &columns,
                storage_name: "lake",
                storage: &storage,
                path: "raw",
                format_name: "CSV",
                partition_by: &[],
                or_replace: false,
                if_not_exists: false,
                options: Vec::new(),
                capabilities: DialectCapabilities::default(),
            })
            .unwrap();
        assert!(sql.contains("OPTIONS (\n\theader = false\n)"));
    }

    #[test]
    fn test_csv_format_options() {
        let (name, options) = DatabricksRenderer
            .format_to_ddl(&Format::Csv {
                delimiter: ';',
                quote: None,
                header: true,
                null_token: Some("\\N".to_string()),
            })
            .unwrap();
        assert_eq!(name, "CSV");
        assert_eq!(
            options,
            vec![
                ("header".to_string(), "true".to_string()),
                ("sep".to_string(), "';'".to_string()),
                ("quote".to_string(), "null".to_string()),
                ("nullValue".to_string(), "'\\N'".to_string()),
            ]
        );
    }

    #[test]
    fn test_hudi_unsupported() {
        assert!(matches!(
            DatabricksRenderer.format_to_ddl(&Format::Hudi),
            Err(ConnectError::UnsupportedFormat(_))
        ));
    }
}
