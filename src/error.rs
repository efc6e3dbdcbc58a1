use thiserror::Error;

/// Errors raised while discovering catalogs or rendering external-table DDL.
///
/// All variants are raised at the point of detection and propagate up to the
/// caller unchanged; a failure for one table aborts the whole connect run.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Unsupported combination: {0}")]
    UnsupportedCombination(String),

    #[error("Unsupported storage kind: {0}")]
    UnsupportedStorageKind(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Invalid option combination: {0}")]
    InvalidOptionCombination(String),

    #[error("Missing location for table {0}")]
    MissingLocation(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Unsupported source type: {0}")]
    UnsupportedSourceType(String),

    #[error("Catalog alias \"{0}\" not configured")]
    CatalogNotConfigured(String),

    #[error("Storage alias \"{0}\" not configured")]
    StorageNotConfigured(String),

    #[error("Database alias \"{0}\" not configured")]
    DatabaseNotConfigured(String),

    #[error("Unsupported SQL dialect: {0}")]
    UnsupportedDialect(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
