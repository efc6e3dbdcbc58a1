// Render-only database target without a live connection
use crate::error::ConnectError;
use crate::services::database::{DatabaseAdapter, DialectCapabilities};

/// A database target configured by dialect name only.
///
/// Used for dry runs against engines the crate cannot connect to directly
/// (Snowflake, Databricks, Synapse): DDL is rendered and printed, any
/// attempt to execute or introspect fails.
pub struct OfflineAdapter {
    dialect: String,
    capabilities: DialectCapabilities,
}

impl OfflineAdapter {
    pub fn new(dialect: impl Into<String>) -> Self {
        Self {
            dialect: dialect.into(),
            capabilities: DialectCapabilities::default(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: DialectCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    fn offline(&self, operation: &str) -> ConnectError {
        ConnectError::Database(format!(
            "Cannot {}: the {} target has no connection configured",
            operation, self.dialect
        ))
    }
}

#[async_trait::async_trait]
impl DatabaseAdapter for OfflineAdapter {
    fn dialect_name(&self) -> &str {
        &self.dialect
    }

    async fn execute(&self, _sql: &str) -> Result<(), ConnectError> {
        Err(self.offline("execute statements"))
    }

    async fn list_schemas(&self) -> Result<Vec<String>, ConnectError> {
        Err(self.offline("list schemas"))
    }

    async fn list_relations(&self, _schema: &str) -> Result<Vec<String>, ConnectError> {
        Err(self.offline("list tables"))
    }

    async fn capability_probe(&self) -> Result<DialectCapabilities, ConnectError> {
        Ok(self.capabilities)
    }

    async fn test_connection(&self) -> Result<(), ConnectError> {
        Err(self.offline("test the connection"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_execution_fails_offline() {
        let adapter = OfflineAdapter::new("snowflake");
        assert_eq!(adapter.dialect_name(), "snowflake");
        assert!(matches!(
            adapter.execute("SELECT 1").await,
            Err(ConnectError::Database(_))
        ));
    }

    #[tokio::test]
    async fn test_capabilities_are_configurable() {
        let adapter = OfflineAdapter::new("mssql")
            .with_capabilities(DialectCapabilities { serverless: true });
        assert!(adapter.capability_probe().await.unwrap().serverless);
    }
}
