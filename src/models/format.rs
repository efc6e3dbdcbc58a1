use serde::{Deserialize, Serialize};

fn default_delimiter() -> char {
    ','
}

fn default_quote() -> Option<char> {
    Some('"')
}

/// Storage format of a table's data files.
///
/// A closed set: adding a variant forces every dialect mapping and the
/// discovery sniffer to be updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Format {
    Parquet,
    Csv {
        #[serde(default = "default_delimiter")]
        delimiter: char,
        #[serde(default = "default_quote")]
        quote: Option<char>,
        #[serde(default)]
        header: bool,
        #[serde(default)]
        null_token: Option<String>,
    },
    Orc,
    Avro,
    JsonLines,
    Delta,
    Hudi,
    Iceberg,
}

impl Format {
    /// A comma separated CSV format with default parameters.
    pub fn csv() -> Self {
        Format::Csv {
            delimiter: default_delimiter(),
            quote: default_quote(),
            header: false,
            null_token: None,
        }
    }

    /// A tab separated CSV format with default parameters.
    pub fn tsv() -> Self {
        Format::Csv {
            delimiter: '\t',
            quote: default_quote(),
            header: false,
            null_token: None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::Parquet => "parquet",
            Format::Csv { .. } => "csv",
            Format::Orc => "orc",
            Format::Avro => "avro",
            Format::JsonLines => "jsonl",
            Format::Delta => "delta",
            Format::Hudi => "hudi",
            Format::Iceberg => "iceberg",
        }
    }
}

/// Compression applied to a table's data files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Snappy,
    Zstd,
}

impl Compression {
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
            Compression::Snappy => "snappy",
            Compression::Zstd => "zstd",
        }
    }
}
