// PostgreSQL adapter using connection pooling for optimal resource management
use deadpool_postgres::{Config as PoolConfig, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;
use url::Url;

use crate::error::ConnectError;
use crate::services::database::{DatabaseAdapter, DialectCapabilities};

pub struct PostgresAdapter {
    pool: Pool,
}

impl PostgresAdapter {
    pub fn new(connection_url: &str) -> Result<Self, ConnectError> {
        // Validate PostgreSQL URL format
        let url = Url::parse(connection_url)
            .map_err(|e| ConnectError::Validation(format!("Invalid PostgreSQL URL: {}", e)))?;

        if url.scheme() != "postgresql" && url.scheme() != "postgres" {
            return Err(ConnectError::Validation(
                "URL must use postgresql:// or postgres:// scheme".to_string(),
            ));
        }

        let mut cfg = PoolConfig::new();
        cfg.url = Some(connection_url.to_string());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let pool = cfg
            .create_pool(Some(deadpool_postgres::Runtime::Tokio1), NoTls)
            .map_err(|e| {
                ConnectError::Database(format!("Failed to create connection pool: {}", e))
            })?;

        Ok(Self { pool })
    }

    async fn client(&self) -> Result<deadpool_postgres::Object, ConnectError> {
        self.pool.get().await.map_err(|e| {
            ConnectError::Database(format!("Failed to get connection from pool: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl DatabaseAdapter for PostgresAdapter {
    fn dialect_name(&self) -> &str {
        "postgresql"
    }

    async fn execute(&self, sql: &str) -> Result<(), ConnectError> {
        let client = self.client().await?;
        client
            .batch_execute(sql)
            .await
            .map_err(|e| ConnectError::Database(format!("Statement execution failed: {}", e)))
    }

    async fn list_schemas(&self) -> Result<Vec<String>, ConnectError> {
        let client = self.client().await?;
        let rows = client
            .query(
                "SELECT schema_name FROM information_schema.schemata \
                 WHERE schema_name NOT IN ('pg_catalog', 'information_schema', 'pg_toast') \
                 ORDER BY schema_name ASC",
                &[],
            )
            .await
            .map_err(|e| ConnectError::Database(format!("Failed to get schemas: {}", e)))?;

        Ok(rows.iter().map(|row| row.get::<_, String>(0)).collect())
    }

    async fn list_relations(&self, schema: &str) -> Result<Vec<String>, ConnectError> {
        let client = self.client().await?;
        let rows = client
            .query(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = $1 AND table_type IN ('BASE TABLE', 'VIEW') \
                 ORDER BY table_name ASC",
                &[&schema],
            )
            .await
            .map_err(|e| ConnectError::Database(format!("Failed to get tables: {}", e)))?;

        Ok(rows.iter().map(|row| row.get::<_, String>(0)).collect())
    }

    async fn capability_probe(&self) -> Result<DialectCapabilities, ConnectError> {
        Ok(DialectCapabilities::default())
    }

    async fn test_connection(&self) -> Result<(), ConnectError> {
        let _client = self.client().await?;
        Ok(())
    }
}
