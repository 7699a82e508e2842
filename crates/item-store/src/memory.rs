use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    Document, ITEM_ID_FIELD, ItemStoreError, Result,
    document::{matches, timestamp_of, unique_key_of},
    store::ItemStore,
};

/// In-memory item store implementation for testing.
///
/// This implementation keeps all documents in memory and provides
/// the same interface as the PostgreSQL implementation, including the
/// unique item ID and newest-first ordering.
#[derive(Clone, Default)]
pub struct InMemoryItemStore {
    documents: Arc<RwLock<Vec<Document>>>,
}

impl InMemoryItemStore {
    /// Creates a new empty in-memory item store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of documents stored.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Returns true if no documents are stored.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// Clears all documents.
    pub async fn clear(&self) {
        self.documents.write().await.clear();
    }
}

fn duplicate(value: String) -> ItemStoreError {
    ItemStoreError::DuplicateKey {
        field: ITEM_ID_FIELD,
        value,
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn find_one(&self, filter: &Document) -> Result<Option<Document>> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    async fn find(&self, filter: &Document) -> Result<Vec<Document>> {
        let store = self.documents.read().await;
        let mut found: Vec<_> = store
            .iter()
            .filter(|doc| matches(doc, filter))
            .cloned()
            .collect();

        // Newest first; documents without a timestamp last, insertion order otherwise
        found.sort_by(|a, b| timestamp_of(b).cmp(&timestamp_of(a)));
        Ok(found)
    }

    async fn insert_one(&self, record: Document) -> Result<()> {
        let mut store = self.documents.write().await;

        if let Some(key) = unique_key_of(&record)
            && store.iter().any(|doc| unique_key_of(doc).as_ref() == Some(&key))
        {
            return Err(duplicate(key));
        }

        store.push(record);
        Ok(())
    }

    async fn update_many(&self, filter: &Document, patch: &Document) -> Result<u64> {
        let mut store = self.documents.write().await;

        // Stage the updated copies so a uniqueness violation leaves the store untouched
        let mut staged = store.clone();
        let mut matched = 0u64;
        for doc in staged.iter_mut().filter(|doc| matches(doc, filter)) {
            for (key, value) in patch {
                doc.insert(key.clone(), value.clone());
            }
            matched += 1;
        }

        let mut seen = std::collections::HashSet::new();
        for key in staged.iter().filter_map(unique_key_of) {
            if !seen.insert(key.clone()) {
                return Err(duplicate(key));
            }
        }

        *store = staged;
        Ok(matched)
    }

    async fn delete_many(&self, filter: &Document) -> Result<u64> {
        let mut store = self.documents.write().await;
        let before = store.len();
        store.retain(|doc| !matches(doc, filter));
        Ok((before - store.len()) as u64)
    }
}
