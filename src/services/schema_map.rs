// Maps columnar source schemas (file footer metadata) to generic SQL types
use crate::error::ConnectError;
use crate::models::{Column, Format, GenericSqlType};
use crate::services::storage::StorageClient;

/// Column type tag as reported by a tabular format decoder.
///
/// The closed union of tags the supported decoders can produce; a decoder
/// reporting anything else fails at `SourceType::parse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceType {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    Null,
    Decimal { precision: u8, scale: u8 },
    Float32,
    Float64,
    String,
    Date32,
    Date64,
    Date,
    Timestamp,
    Binary,
    Struct,
    List,
}

impl SourceType {
    /// Parses a decoder's type tag.
    pub fn parse(tag: &str) -> Result<Self, ConnectError> {
        Ok(match tag {
            "boolean" | "bool" => SourceType::Boolean,
            "int8" => SourceType::Int8,
            "int16" => SourceType::Int16,
            "int32" => SourceType::Int32,
            "int64" => SourceType::Int64,
            "null" => SourceType::Null,
            "float32" => SourceType::Float32,
            "float64" => SourceType::Float64,
            "string" | "utf8" => SourceType::String,
            "date32" => SourceType::Date32,
            "date64" => SourceType::Date64,
            "date" => SourceType::Date,
            "timestamp" => SourceType::Timestamp,
            "binary" => SourceType::Binary,
            "struct" => SourceType::Struct,
            "list" => SourceType::List,
            _ => return Err(ConnectError::UnsupportedSourceType(tag.to_string())),
        })
    }
}

/// Converts a source column type into the generic SQL type model.
///
/// Total over `SourceType`. int8 widens to SMALLINT (no narrower generic
/// type exists), null degrades to INTEGER, struct and list degrade to a
/// JSON-like string column, and timestamps map to a plain datetime since
/// timezone awareness is not distinguished.
pub fn map_source_type(source: &SourceType) -> GenericSqlType {
    match source {
        SourceType::Boolean => GenericSqlType::Boolean,
        SourceType::Int8 | SourceType::Int16 => GenericSqlType::SmallInt,
        SourceType::Int32 | SourceType::Null => GenericSqlType::Integer,
        SourceType::Int64 => GenericSqlType::BigInt,
        SourceType::Decimal { precision, scale } => GenericSqlType::Decimal {
            precision: *precision,
            scale: *scale,
        },
        SourceType::Float32 => GenericSqlType::Float,
        SourceType::Float64 => GenericSqlType::DoubleAsDecimal,
        SourceType::String => GenericSqlType::UnicodeString,
        SourceType::Date32 | SourceType::Date => GenericSqlType::Date,
        SourceType::Date64 | SourceType::Timestamp => GenericSqlType::DateTime,
        SourceType::Binary => GenericSqlType::Binary,
        SourceType::Struct | SourceType::List => GenericSqlType::JsonLikeString,
    }
}

/// One field of a source schema as reported by a decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceField {
    pub name: String,
    pub source_type: SourceType,
}

impl SourceField {
    pub fn new(name: impl Into<String>, source_type: SourceType) -> Self {
        Self {
            name: name.into(),
            source_type,
        }
    }
}

/// Maps a whole source schema to generic SQL columns, preserving order.
pub fn map_source_schema(fields: &[SourceField]) -> Vec<Column> {
    fields
        .iter()
        .map(|field| Column::new(field.name.clone(), map_source_type(&field.source_type)))
        .collect()
}

/// Tabular format decoder - reads column schemas from data file metadata.
///
/// Implemented outside this crate (parquet/Delta footer parsing is not
/// replicated here); registered on the catalog registry.
#[async_trait::async_trait]
pub trait SchemaDecoder: Send + Sync {
    async fn sniff_schema(
        &self,
        storage: &dyn StorageClient,
        path: &str,
        format: &Format,
    ) -> Result<Vec<SourceField>, ConnectError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_widths() {
        assert_eq!(map_source_type(&SourceType::Int8), GenericSqlType::SmallInt);
        assert_eq!(map_source_type(&SourceType::Int16), GenericSqlType::SmallInt);
        assert_eq!(map_source_type(&SourceType::Int32), GenericSqlType::Integer);
        assert_eq!(map_source_type(&SourceType::Null), GenericSqlType::Integer);
        assert_eq!(map_source_type(&SourceType::Int64), GenericSqlType::BigInt);
    }

    #[test]
    fn test_nested_types_degrade_to_json_string() {
        assert_eq!(
            map_source_type(&SourceType::Struct),
            GenericSqlType::JsonLikeString
        );
        assert_eq!(
            map_source_type(&SourceType::List),
            GenericSqlType::JsonLikeString
        );
    }

    #[test]
    fn test_temporal_types() {
        assert_eq!(map_source_type(&SourceType::Date32), GenericSqlType::Date);
        assert_eq!(map_source_type(&SourceType::Date), GenericSqlType::Date);
        assert_eq!(map_source_type(&SourceType::Date64), GenericSqlType::DateTime);
        // timezone awareness is not distinguished
        assert_eq!(
            map_source_type(&SourceType::Timestamp),
            GenericSqlType::DateTime
        );
    }

    #[test]
    fn test_parse_unknown_tag() {
        let err = SourceType::parse("uuid").unwrap_err();
        assert!(matches!(err, ConnectError::UnsupportedSourceType(tag) if tag == "uuid"));
    }

    #[test]
    fn test_map_source_schema_preserves_order() {
        let fields = vec![
            SourceField::new("id", SourceType::Int64),
            SourceField::new("price", SourceType::Decimal { precision: 10, scale: 2 }),
            SourceField::new("tags", SourceType::List),
        ];
        let columns = map_source_schema(&fields);
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0], Column::new("id", GenericSqlType::BigInt));
        assert_eq!(
            columns[1],
            Column::new("price", GenericSqlType::Decimal { precision: 10, scale: 2 })
        );
        assert_eq!(columns[2], Column::new("tags", GenericSqlType::JsonLikeString));
    }
}
