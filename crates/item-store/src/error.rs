use thiserror::Error;

/// Errors that can occur when reading or writing items.
#[derive(Debug, Error)]
pub enum ItemStoreError {
    /// A write would leave two documents with the same unique key.
    #[error("Duplicate key: {field} = {value}")]
    DuplicateKey { field: &'static str, value: String },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be read back as a document.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),
}

/// Result type for item store operations.
pub type Result<T> = std::result::Result<T, ItemStoreError>;
