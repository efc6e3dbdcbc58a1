pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use error::ConnectError;
pub use models::{
    AzureService, Column, Compression, Format, GenericSqlType, StorageDescriptor, TableDescriptor,
};
pub use services::{
    catalog::{Catalog, CatalogRegistry, CatalogSource, StorageBinding},
    connect::{connect_catalog, prepare_storage_steps, ConnectStep},
    database::{DatabaseAdapter, DialectCapabilities, OfflineAdapter, PostgresAdapter},
    ddl::{Dialect, DialectRenderer},
    schema_map::{SchemaDecoder, SourceField, SourceType},
    storage::{LocalStorage, StorageClient, StorageEntry},
};
