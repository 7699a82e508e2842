use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    Document, ITEM_ID_FIELD, ItemStoreError, Result, document::unique_key_of, store::ItemStore,
};

/// PostgreSQL-backed item store.
///
/// Each item is one JSONB row. Filters are evaluated with JSONB containment
/// (`@>`), which gives the same equality semantics as [`crate::matches`].
#[derive(Clone)]
pub struct PostgresItemStore {
    pool: PgPool,
}

impl PostgresItemStore {
    /// Creates a new PostgreSQL item store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and wraps the resulting pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_document(row: PgRow) -> Result<Document> {
        match row.try_get::<Value, _>("data")? {
            Value::Object(map) => Ok(map),
            other => Err(ItemStoreError::MalformedDocument(format!(
                "expected object, found {other}"
            ))),
        }
    }

    fn map_write_error(e: sqlx::Error, written: &Document) -> ItemStoreError {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return ItemStoreError::DuplicateKey {
                field: ITEM_ID_FIELD,
                value: unique_key_of(written).unwrap_or_default(),
            };
        }
        ItemStoreError::Database(e)
    }
}

fn as_json(document: &Document) -> Value {
    Value::Object(document.clone())
}

#[async_trait]
impl ItemStore for PostgresItemStore {
    #[tracing::instrument(skip(self))]
    async fn find_one(&self, filter: &Document) -> Result<Option<Document>> {
        let row = sqlx::query(
            r#"
            SELECT data FROM items
            WHERE data @> $1
            ORDER BY data->'timestamp' DESC NULLS LAST, id ASC
            LIMIT 1
            "#,
        )
        .bind(as_json(filter))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_document).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn find(&self, filter: &Document) -> Result<Vec<Document>> {
        let rows = sqlx::query(
            r#"
            SELECT data FROM items
            WHERE data @> $1
            ORDER BY data->'timestamp' DESC NULLS LAST, id ASC
            "#,
        )
        .bind(as_json(filter))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_document).collect()
    }

    async fn insert_one(&self, record: Document) -> Result<()> {
        sqlx::query("INSERT INTO items (data) VALUES ($1)")
            .bind(as_json(&record))
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_write_error(e, &record))?;
        Ok(())
    }

    async fn update_many(&self, filter: &Document, patch: &Document) -> Result<u64> {
        // A single statement, so a unique violation rolls back every row
        let result = sqlx::query("UPDATE items SET data = data || $2 WHERE data @> $1")
            .bind(as_json(filter))
            .bind(as_json(patch))
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_write_error(e, patch))?;
        Ok(result.rows_affected())
    }

    async fn delete_many(&self, filter: &Document) -> Result<u64> {
        let result = sqlx::query("DELETE FROM items WHERE data @> $1")
            .bind(as_json(filter))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
