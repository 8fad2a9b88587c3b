use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use models::StorageKey;

use super::{Datastore, Document, Namespace, Query, QueryPage};
use crate::errors::StoreResult;

/// In-process datastore keeping every record in native key order.
///
/// Intended for development and tests. Writes happen under the write lock
/// with no await in between, so a cancelled caller never leaves half a put.
#[derive(Clone, Default)]
pub struct MemoryDatastore {
    inner: Arc<RwLock<Namespace>>,
}

impl MemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Datastore for MemoryDatastore {
    async fn get(&self, key: &StorageKey) -> StoreResult<Option<Document>> {
        let map = self.inner.read().await;
        Ok(map.get(key).cloned())
    }

    async fn put(&self, key: StorageKey, doc: Document) -> StoreResult<()> {
        let mut map = self.inner.write().await;
        map.insert(key, doc);
        Ok(())
    }

    async fn delete(&self, key: &StorageKey) -> StoreResult<()> {
        let mut map = self.inner.write().await;
        map.remove(key);
        Ok(())
    }

    async fn run_query(&self, query: &Query) -> StoreResult<QueryPage> {
        self.inner.read().await.scan(query)
    }
}

impl std::fmt::Debug for MemoryDatastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDatastore").finish_non_exhaustive()
    }
}
