use async_trait::async_trait;

use crate::{Document, Result};

/// Document collection holding the materialized items.
///
/// Implementations enforce uniqueness of [`ITEM_ID_FIELD`](crate::ITEM_ID_FIELD)
/// and return query results newest first by
/// [`TIMESTAMP_FIELD`](crate::TIMESTAMP_FIELD). All implementations must be
/// thread-safe (Send + Sync).
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Returns the first document matching `filter`, if any.
    async fn find_one(&self, filter: &Document) -> Result<Option<Document>>;

    /// Returns every document matching `filter`.
    async fn find(&self, filter: &Document) -> Result<Vec<Document>>;

    /// Inserts a new document.
    ///
    /// Fails with `DuplicateKey` if another document has the same item ID.
    async fn insert_one(&self, record: Document) -> Result<()>;

    /// Sets every key of `patch` on each document matching `filter`.
    ///
    /// Returns the number of matched documents. Either all matches are
    /// updated or, on a uniqueness violation, none are.
    async fn update_many(&self, filter: &Document, patch: &Document) -> Result<u64>;

    /// Deletes every document matching `filter` and returns how many were removed.
    async fn delete_many(&self, filter: &Document) -> Result<u64>;
}

/// Extension trait providing convenience methods for item stores.
#[async_trait]
pub trait ItemStoreExt: ItemStore {
    /// Checks if any document matches `filter`.
    async fn exists(&self, filter: &Document) -> Result<bool> {
        Ok(self.find_one(filter).await?.is_some())
    }

    /// Counts the documents matching `filter`.
    async fn count(&self, filter: &Document) -> Result<usize> {
        Ok(self.find(filter).await?.len())
    }
}

// Blanket implementation for all ItemStore implementations
impl<T: ItemStore + ?Sized> ItemStoreExt for T {}

#[async_trait]
impl<T: ItemStore + ?Sized> ItemStore for std::sync::Arc<T> {
    async fn find_one(&self, filter: &Document) -> Result<Option<Document>> {
        (**self).find_one(filter).await
    }

    async fn find(&self, filter: &Document) -> Result<Vec<Document>> {
        (**self).find(filter).await
    }

    async fn insert_one(&self, record: Document) -> Result<()> {
        (**self).insert_one(record).await
    }

    async fn update_many(&self, filter: &Document, patch: &Document) -> Result<u64> {
        (**self).update_many(filter, patch).await
    }

    async fn delete_many(&self, filter: &Document) -> Result<u64> {
        (**self).delete_many(filter).await
    }
}
