// SQL Server / Azure Synapse DDL renderer
//
// Covers Polybase external file formats and data sources, dedicated-pool
// external tables and the serverless OPENROWSET view form for Delta.
use crate::error::ConnectError;
use crate::models::{Compression, Format, GenericSqlType, StorageDescriptor};
use crate::services::ddl::{
    DdlOptions, DialectRenderer, ExternalStorageRequest, ExternalTableRequest, FileFormatRequest,
};

pub struct SqlServerRenderer;

impl SqlServerRenderer {
    /// Hadoop compression codec names accepted by CREATE EXTERNAL FILE FORMAT.
    fn compression_codec(compression: Compression) -> Result<Option<&'static str>, ConnectError> {
        match compression {
            Compression::None => Ok(None),
            Compression::Gzip => Ok(Some("org.apache.hadoop.io.compress.GzipCodec")),
            Compression::Snappy => Ok(Some("org.apache.hadoop.io.compress.SnappyCodec")),
            other => Err(ConnectError::UnsupportedCombination(format!(
                "Compression {} is not supported for SQL Server file formats",
                other.as_str()
            ))),
        }
    }
}

impl DialectRenderer for SqlServerRenderer {
    fn quote_identifier(&self, name: &str) -> String {
        format!("[{}]", name.replace(']', "]]"))
    }

    fn render_type(&self, data_type: &GenericSqlType) -> String {
        match data_type {
            GenericSqlType::Boolean => "BIT".to_string(),
            GenericSqlType::SmallInt => "SMALLINT".to_string(),
            GenericSqlType::Integer => "INT".to_string(),
            GenericSqlType::BigInt => "BIGINT".to_string(),
            // Polybase rejects NUMERIC; DECIMAL is equivalent
            GenericSqlType::Decimal { precision, scale } => {
                format!("DECIMAL({}, {})", precision, scale)
            }
            GenericSqlType::Float | GenericSqlType::DoubleAsDecimal => "FLOAT".to_string(),
            // Polybase does not support NVARCHAR(max); clamp to the widest
            // fixed length the engine accepts
            GenericSqlType::UnicodeString | GenericSqlType::JsonLikeString => {
                "NVARCHAR(4000)".to_string()
            }
            GenericSqlType::Date => "DATE".to_string(),
            // DATETIMEOFFSET is not readable from external data; timestamps
            // are stored as UTC DATETIME2
            GenericSqlType::DateTime => "DATETIME2".to_string(),
            // rowversion columns surface as fixed 8-byte binaries
            GenericSqlType::Binary => "BINARY(8)".to_string(),
        }
    }

    fn format_to_ddl(&self, format: &Format) -> Result<(String, DdlOptions), ConnectError> {
        match format {
            Format::Parquet => Ok(("PARQUET".to_string(), Vec::new())),
            Format::Orc => Ok(("ORC".to_string(), Vec::new())),
            Format::Delta => Ok(("DELTA".to_string(), Vec::new())),
            Format::Csv {
                delimiter, header, ..
            } => {
                if *header {
                    return Err(ConnectError::UnsupportedCombination(
                        "A CSV format with header is not supported for SQL Server".to_string(),
                    ));
                }
                match delimiter {
                    ',' => Ok(("CSV".to_string(), Vec::new())),
                    '\t' => Ok(("TSV".to_string(), Vec::new())),
                    _ => Err(ConnectError::UnsupportedCombination(
                        "Only CSV with delimiter ',' or '\\t' is supported for SQL Server"
                            .to_string(),
                    )),
                }
            }
            other => Err(ConnectError::UnsupportedFormat(format!(
                "The format {} is not supported for SQL Server",
                other.name()
            ))),
        }
    }

    fn render_file_format(
        &self,
        req: &FileFormatRequest,
    ) -> Result<Option<String>, ConnectError> {
        let mut format_options: Option<String> = None;

        let format_type = match req.format {
            Format::Csv {
                delimiter,
                quote,
                header,
                ..
            } => {
                if !matches!(req.compression, Compression::None | Compression::Gzip) {
                    return Err(ConnectError::UnsupportedCombination(format!(
                        "Compression {} is not supported for a SQL Server delimited text format",
                        req.compression.as_str()
                    )));
                }

                let mut options = Vec::new();
                if *delimiter == '\t' {
                    options.push("FIELD_TERMINATOR = '\\t'".to_string());
                } else {
                    options.push(format!("FIELD_TERMINATOR = '{}'", delimiter));
                }
                if let Some(quote) = quote {
                    if *quote == '"' {
                        options.push("STRING_DELIMITER = '0x22'".to_string());
                    } else {
                        options.push(format!("STRING_DELIMITER = '{}'", quote));
                    }
                }
                if *header {
                    options.push("FIRST_ROW = 2".to_string());
                }
                options.push("ENCODING = 'UTF8'".to_string());
                options.push("USE_TYPE_DEFAULT = FALSE".to_string());
                format_options = Some(options.join(", "));

                "DELIMITEDTEXT"
            }
            Format::Orc | Format::Parquet => {
                if !matches!(req.compression, Compression::None | Compression::Snappy) {
                    return Err(ConnectError::UnsupportedCombination(format!(
                        "Compression {} is not supported for format {} on SQL Server",
                        req.compression.as_str(),
                        req.format.name()
                    )));
                }
                if matches!(req.format, Format::Orc) {
                    "ORC"
                } else {
                    "PARQUET"
                }
            }
            Format::Delta => "DELTA",
            other => {
                return Err(ConnectError::UnsupportedFormat(format!(
                    "The format {} is not supported for SQL Server file formats",
                    other.name()
                )))
            }
        };

        let compression_codec = Self::compression_codec(req.compression)?;
        let quoted = self.quote_identifier(req.name);

        let mut sql = String::new();
        if req.or_replace {
            sql.push_str(&format!(
                "IF EXISTS (SELECT * FROM sys.external_file_formats WHERE name = '{}')\n\tDROP EXTERNAL FILE FORMAT {};\n",
                req.name, quoted
            ));
        }
        if req.if_not_exists {
            sql.push_str(&format!(
                "IF NOT EXISTS (SELECT * FROM sys.external_file_formats WHERE name = '{}')\n",
                req.name
            ));
        }
        sql.push_str(&format!(
            "CREATE EXTERNAL FILE FORMAT {}\nWITH (\n\tFORMAT_TYPE = {}",
            quoted, format_type
        ));
        if let Some(options) = format_options {
            sql.push_str(&format!("\n\t, FORMAT_OPTIONS({})", options));
        }
        if let Some(codec) = compression_codec {
            sql.push_str(&format!("\n\t, DATA_COMPRESSION = '{}'", codec));
        }
        sql.push_str("\n);");

        Ok(Some(sql))
    }

    fn render_external_storage(
        &self,
        req: &ExternalStorageRequest,
    ) -> Result<String, ConnectError> {
        let sas = match req.storage {
            StorageDescriptor::Azure { sas_token, .. } => match sas_token {
                Some(sas) => sas.clone(),
                None => {
                    return Err(ConnectError::MissingCredential(
                        "External data sources currently require an Azure storage with SAS token"
                            .to_string(),
                    ))
                }
            },
            other => {
                return Err(ConnectError::UnsupportedStorageKind(format!(
                    "The storage kind {} is not supported for SQL Server data sources",
                    other.kind_name()
                )))
            }
        };

        let identity = "SHARED ACCESS SIGNATURE";
        let credential_name = format!("{}__CREDENTIALS", req.name);
        let quoted_name = self.quote_identifier(req.name);
        let quoted_credential = self.quote_identifier(&credential_name);

        let mut sql = String::new();
        if req.or_replace {
            sql.push_str(&format!(
                "IF EXISTS (SELECT * FROM sys.external_data_sources WHERE name = '{}')\n\tDROP EXTERNAL DATA SOURCE {};\n",
                req.name, quoted_name
            ));
            sql.push_str(&format!(
                "IF EXISTS (SELECT * FROM sys.database_credentials WHERE name = '{}')\n\tDROP DATABASE SCOPED CREDENTIAL {};\n",
                credential_name, quoted_credential
            ));
        }
        if req.if_not_exists || req.or_update {
            sql.push_str(&format!(
                "IF NOT EXISTS (SELECT * FROM sys.database_credentials WHERE name = '{}')\n",
                credential_name
            ));
        }
        sql.push_str(&format!(
            "CREATE DATABASE SCOPED CREDENTIAL {}\nWITH\n\tIDENTITY = '{}',\n\tSECRET = '{}'\n",
            quoted_credential, identity, sas
        ));
        if req.or_update {
            sql.push_str(&format!(
                "ELSE\nALTER DATABASE SCOPED CREDENTIAL {}\nWITH\n\tIDENTITY = '{}',\n\tSECRET = '{}'\n",
                quoted_credential, identity, sas
            ));
        }
        sql.push('\n');
        if req.if_not_exists {
            sql.push_str(&format!(
                "IF NOT EXISTS (SELECT * FROM sys.external_data_sources WHERE name = '{}')\n",
                req.name
            ));
        }
        sql.push_str(&format!(
            "CREATE EXTERNAL DATA SOURCE {} WITH (LOCATION = '{}', CREDENTIAL = {});",
            quoted_name,
            req.storage.base_uri(),
            quoted_credential
        ));

        Ok(sql)
    }

    fn render_external_table(&self, req: &ExternalTableRequest) -> Result<String, ConnectError> {
        let full_name = self.format_table(req.schema, req.table);

        let columns: Vec<String> = req
            .columns
            .iter()
            .map(|c| self.quote_identifier(&c.name))
            .collect();
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

        // Serverless pools cannot create external tables over Delta; a view
        // with OPENROWSET is the supported shape there.
        if req.capabilities.serverless && req.format_name.eq_ignore_ascii_case("DELTA") {
            let mut rowset_options: Vec<String> = vec![
                format!("BULK '{}'", req.path),
                format!("DATA_SOURCE = '{}'", req.storage_name),
                format!("FORMAT = '{}'", req.format_name),
            ];
            rowset_options.extend(req.options.iter().map(|(k, v)| format!("{} = {}", k, v)));

            let mut sql = String::new();
            if req.or_replace {
                sql.push_str(&format!(
                    "IF EXISTS (SELECT * FROM sys.external_tables WHERE object_id = OBJECT_ID('{}'))\n\tDROP EXTERNAL TABLE {};\nGO\n",
                    full_name, full_name
                ));
                sql.push_str(&format!(
                    "IF EXISTS (SELECT * FROM sys.views WHERE object_id = OBJECT_ID('{}'))\n\tDROP VIEW {};\nGO\n",
                    full_name, full_name
                ));
            }
            if req.if_not_exists {
                sql.push_str(&format!(
                    "IF NOT EXISTS (SELECT * FROM sys.views WHERE object_id = OBJECT_ID('{}'))\n",
                    full_name
                ));
            }
            sql.push_str(&format!(
                "CREATE VIEW {}\nAS\nSELECT\n\t{}\nFROM OPENROWSET(\n\t{}\n)\nWITH\n(\n\t{}\n) AS src;",
                full_name,
                columns.join(",\n\t"),
                rowset_options.join(",\n\t"),
                column_definitions.join(",\n\t")
            ));
            return Ok(sql);
        }

        let mut options = req.options.clone();
        options.push(("LOCATION".to_string(), format!("'{}'", req.path)));
        options.push((
            "DATA_SOURCE".to_string(),
            self.quote_identifier(req.storage_name),
        ));
        options.push((
            "FILE_FORMAT".to_string(),
            self.quote_identifier(req.format_name),
        ));
        let option_clause = options
            .iter()
            .map(|(k, v)| format!("{} = {}", k, v))
            .collect::<Vec<_>>()
            .join(",\n\t");

        let mut sql = String::new();
        if req.or_replace {
            sql.push_str(&format!(
                "IF EXISTS (SELECT * FROM sys.external_tables WHERE object_id = OBJECT_ID('{}'))\n\tDROP EXTERNAL TABLE {};\nGO\n",
                full_name, full_name
            ));
        }
        if req.if_not_exists {
            sql.push_str(&format!(
                "IF NOT EXISTS (SELECT * FROM sys.external_tables WHERE object_id = OBJECT_ID('{}'))\n",
                full_name
            ));
        }
        sql.push_str(&format!(
            "CREATE EXTERNAL TABLE {}\n(\n\t{}\n)\nWITH (\n\t{}\n);",
            full_name,
            column_definitions.join(",\n\t"),
            option_clause
        ));

        Ok(sql)
    }
}
