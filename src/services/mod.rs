pub mod catalog;
pub mod connect;
pub mod database;
pub mod ddl;
pub mod discovery;
pub mod schema_map;
pub mod sidecar;
pub mod storage;

pub use catalog::{Catalog, CatalogRegistry, CatalogSource, StorageBinding};
pub use connect::{connect_catalog, prepare_storage_steps, ConnectStep};
pub use database::{DatabaseAdapter, DialectCapabilities, OfflineAdapter, PostgresAdapter};
pub use ddl::{Dialect, DialectRenderer};
pub use discovery::{discover_tables_from_db, discover_tables_from_storage};
pub use schema_map::{map_source_schema, map_source_type, SchemaDecoder, SourceField, SourceType};
pub use sidecar::{read_schema_sidecar, write_schema_sidecar, SchemaSidecar};
pub use storage::{LocalStorage, StorageClient, StorageEntry, UnboundStorage};
