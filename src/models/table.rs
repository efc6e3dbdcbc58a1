use serde::{Deserialize, Serialize};

use crate::models::Format;

/// Engine-agnostic SQL column type.
///
/// The universal intermediate representation between a source schema read
/// from file metadata and any target dialect's native type syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenericSqlType {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Decimal { precision: u8, scale: u8 },
    Float,
    /// A double precision float which downstream engines read as decimal.
    DoubleAsDecimal,
    UnicodeString,
    Date,
    DateTime,
    Binary,
    /// Nested data (structs, lists) degraded to a string column; consumers
    /// are expected to parse such columns as JSON text.
    JsonLikeString,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(flatten)]
    pub data_type: GenericSqlType,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: GenericSqlType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// One discovered or explicitly configured table.
///
/// `location` is a path relative to the catalog's base path (and schema
/// folder, when the catalog has schema folders). It may be unset during
/// discovery but is required before DDL generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub format: Option<Format>,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            location: None,
            format: None,
            columns: Vec::new(),
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_serde_round_trip() {
        let column = Column::new(
            "amount",
            GenericSqlType::Decimal {
                precision: 12,
                scale: 2,
            },
        );
        let json = serde_json::to_string(&column).unwrap();
        assert!(json.contains("\"type\":\"decimal\""));

        let back: Column = serde_json::from_str(&json).unwrap();
        assert_eq!(back, column);
    }

    #[test]
    fn test_table_descriptor_builder() {
        let table = TableDescriptor::new("orders")
            .with_schema("sales")
            .with_location("orders")
            .with_format(Format::Parquet);
        assert_eq!(table.name, "orders");
        assert_eq!(table.schema.as_deref(), Some("sales"));
        assert_eq!(table.location.as_deref(), Some("orders"));
        assert_eq!(table.format, Some(Format::Parquet));
        assert!(table.columns.is_empty());
    }
}
