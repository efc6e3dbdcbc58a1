// Database abstraction layer for catalog discovery and DDL execution
pub mod offline;
pub mod postgres;

pub use offline::OfflineAdapter;
pub use postgres::PostgresAdapter;

use crate::error::ConnectError;

/// Dialect capability metadata read from a live connection.
///
/// Only consulted by renderers that change statement shape based on the
/// server flavor (currently Synapse serverless detection).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DialectCapabilities {
    /// The target is a serverless SQL pool (`*-ondemand.sql.azuresynapse.net`).
    pub serverless: bool,
}

/// Database adapter trait - abstraction layer for different database engines.
///
/// Connections are acquired per call and released immediately; the adapter
/// holds a pool, never an open session.
#[async_trait::async_trait]
pub trait DatabaseAdapter: Send + Sync {
    /// The SQL dialect name of the engine (e.g. "snowflake", "postgresql").
    fn dialect_name(&self) -> &str;

    /// Execute a statement, discarding any result rows.
    async fn execute(&self, sql: &str) -> Result<(), ConnectError>;

    /// List user schemas ascending by name, excluding system schemas.
    async fn list_schemas(&self) -> Result<Vec<String>, ConnectError>;

    /// List user tables and views of a schema ascending by name.
    async fn list_relations(&self, schema: &str) -> Result<Vec<String>, ConnectError>;

    /// Read dialect capability metadata from the server.
    async fn capability_probe(&self) -> Result<DialectCapabilities, ConnectError>;

    /// Test connection
    async fn test_connection(&self) -> Result<(), ConnectError>;
}
