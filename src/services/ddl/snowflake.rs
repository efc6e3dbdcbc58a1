// Snowflake DDL renderer (FILE FORMAT, STAGE, EXTERNAL TABLE)
use crate::error::ConnectError;
use crate::models::{Format, GenericSqlType, StorageDescriptor};
use crate::services::ddl::{
    options_contain, DdlOptions, DialectRenderer, ExternalStorageRequest, ExternalTableRequest,
    FileFormatRequest,
};

pub struct SnowflakeRenderer;

impl DialectRenderer for SnowflakeRenderer {
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn render_type(&self, data_type: &GenericSqlType) -> String {
        match data_type {
            GenericSqlType::Boolean => "BOOLEAN".to_string(),
            GenericSqlType::SmallInt => "SMALLINT".to_string(),
            GenericSqlType::Integer => "INTEGER".to_string(),
            GenericSqlType::BigInt => "BIGINT".to_string(),
            GenericSqlType::Decimal { precision, scale } => {
                format!("DECIMAL({}, {})", precision, scale)
            }
            GenericSqlType::Float | GenericSqlType::DoubleAsDecimal => "FLOAT".to_string(),
            GenericSqlType::UnicodeString | GenericSqlType::JsonLikeString => "VARCHAR".to_string(),
            GenericSqlType::Date => "DATE".to_string(),
            GenericSqlType::DateTime => "TIMESTAMP_NTZ".to_string(),
            GenericSqlType::Binary => "BINARY".to_string(),
        }
    }

    fn format_to_ddl(&self, format: &Format) -> Result<(String, DdlOptions), ConnectError> {
        match format {
            Format::Csv {
                delimiter,
                quote,
                header,
                null_token,
            } => {
                let mut file_format: DdlOptions = vec![("TYPE".to_string(), "CSV".to_string())];
                if *header {
                    file_format.push(("SKIP_HEADER".to_string(), "1".to_string()));
                }
                file_format.push(("FIELD_DELIMITER".to_string(), format!("'{}'", delimiter)));
                if let Some(quote) = quote {
                    if *quote == '\'' {
                        file_format.push(("QUOTE".to_string(), "0x27".to_string()));
                    } else {
                        file_format.push(("QUOTE".to_string(), format!("'{}'", quote)));
                    }
                }
                if let Some(null_token) = null_token {
                    file_format.push(("NULL_IF".to_string(), format!("('{}')", null_token)));
                }

                let inline = file_format
                    .iter()
                    .map(|(k, v)| format!("{} = {}", k, v))
                    .collect::<Vec<_>>()
                    .join(", ");
                Ok((
                    "CSV".to_string(),
                    vec![("FILE_FORMAT".to_string(), format!("( {} )", inline))],
                ))
            }
            Format::JsonLines => Ok(("JSON".to_string(), Vec::new())),
            Format::Avro => Ok(("AVRO".to_string(), Vec::new())),
            Format::Orc => Ok(("ORC".to_string(), Vec::new())),
            Format::Parquet => Ok(("PARQUET".to_string(), Vec::new())),
            _ => Err(ConnectError::UnsupportedFormat(format!(
                "The format {} is not supported for Snowflake",
                format.name()
            ))),
        }
    }

    fn render_file_format(
        &self,
        req: &FileFormatRequest,
    ) -> Result<Option<String>, ConnectError> {
        let format_type = match req.format {
            Format::Csv { .. } => "CSV",
            Format::Avro => "AVRO",
            Format::Parquet => "PARQUET",
            Format::Orc => "ORC",
            // JSON and XML file format objects are not implemented
            other => {
                return Err(ConnectError::UnsupportedFormat(format!(
                    "The format {} is not supported for Snowflake file formats",
                    other.name()
                )))
            }
        };

        Ok(Some(format!(
            "CREATE {}FILE FORMAT {}public.{}\n\tTYPE = '{}';",
            if req.or_replace { "OR REPLACE " } else { "" },
            if req.if_not_exists { "IF NOT EXISTS " } else { "" },
            self.quote_identifier(req.name),
            format_type
        )))
    }

    fn render_external_storage(
        &self,
        req: &ExternalStorageRequest,
    ) -> Result<String, ConnectError> {
        let mut params: Vec<String> = Vec::new();

        match req.storage {
            StorageDescriptor::Azure {
                account_name,
                container_name,
                service,
                sas_token,
            } => {
                params.push(format!(
                    "URL = 'azure://{}.{}.core.windows.net/{}'",
                    account_name,
                    service.as_str(),
                    container_name
                ));
                match sas_token {
                    Some(sas) => {
                        params.push(format!("CREDENTIALS = (AZURE_SAS_TOKEN = '{}')", sas))
                    }
                    None => {
                        return Err(ConnectError::MissingCredential(
                            "The Azure storage must have a SAS token to be used with Snowflake"
                                .to_string(),
                        ))
                    }
                }
            }
            other => {
                return Err(ConnectError::UnsupportedStorageKind(format!(
                    "The storage kind {} is not supported for Snowflake stages",
                    other.kind_name()
                )))
            }
        }

        Ok(format!(
            "CREATE {}STAGE {}public.{}\n\t{};",
            if req.or_replace { "OR REPLACE " } else { "" },
            if req.if_not_exists { "IF NOT EXISTS " } else { "" },
            self.quote_identifier(req.name),
            params.join("\n\t")
        ))
    }

    fn render_external_table(&self, req: &ExternalTableRequest) -> Result<String, ConnectError> {
        let mut column_definitions = Vec::new();
        for column in req.columns {
            // `value` is reserved for the raw record in Snowflake external
            // tables; such a column gets renamed while the extraction
            // expression still references the original field.
            let quoted = if column.name.eq_ignore_ascii_case("value") {
                self.quote_identifier(&format!("{}_", column.name))
            } else {
                self.quote_identifier(&column.name)
            };
            let native_type = self.render_type(&column.data_type);
            column_definitions.push(format!(
                "{} {} AS (value:{}::{})",
                quoted,
                native_type,
                self.quote_identifier(&column.name),
                native_type
            ));
        }

        let mut options = req.options.clone();
        options.push((
            "LOCATION".to_string(),
            format!(
                "@public.{}/{}",
                self.quote_identifier(req.storage_name),
                req.path.replace(' ', "%20")
            ),
        ));
        if !options_contain(&options, "FILE_FORMAT") {
            options.push((
                "FILE_FORMAT".to_string(),
                format!("(FORMAT_NAME='{}')", req.format_name),
            ));
        }

        let option_clause = options
            .iter()
            .map(|(k, v)| format!("{} = {}", k, v))
            .collect::<Vec<_>>()
            .join("\n\t");

        Ok(format!(
            "CREATE {}EXTERNAL TABLE {}{} (\n\t{}\n)\n{}WITH\n\t{};",
            if req.or_replace { "OR REPLACE " } else { "" },
            if req.if_not_exists { "IF NOT EXISTS " } else { "" },
            self.format_table(req.schema, req.table),
            column_definitions.join(",\n\t"),
            if req.partition_by.is_empty() {
                String::new()
            } else {
                format!("PARTITION BY ({})\n", req.partition_by.join(","))
            },
            option_clause
        ))
    }
}
