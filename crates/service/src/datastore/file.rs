use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::{fs, sync::Mutex};
use uuid::Uuid;

use models::{PathElement, StorageKey};

use super::{Datastore, Document, Namespace, Query, QueryPage};
use crate::errors::{StoreError, StoreResult};

#[derive(Serialize, Deserialize)]
struct Record {
    key: Vec<PathElement>,
    doc: Document,
}

/// JSON file-backed datastore holding one namespace.
///
/// Every write serializes the next state to a temp file and renames it over
/// the data file before the in-memory view is swapped. The commit runs on its
/// own task, so a caller dropping the future mid-write cannot split disk and
/// memory apart.
#[derive(Clone)]
pub struct FileDatastore {
    inner: Arc<RwLock<Namespace>>,
    write_gate: Arc<Mutex<()>>,
    file_path: PathBuf,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("datastore lock poisoned".into())
}

impl FileDatastore {
    /// Open the namespace file at `path`, creating it empty if missing.
    pub async fn open<P: Into<PathBuf>>(path: P) -> StoreResult<Arc<Self>> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(StoreError::unavailable)?;
        }

        let ns = match fs::read(&file_path).await {
            Ok(bytes) => decode(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty = Namespace::default();
                persist(&file_path, &empty).await?;
                empty
            }
            Err(e) => return Err(StoreError::unavailable(e)),
        };

        Ok(Arc::new(Self {
            inner: Arc::new(RwLock::new(ns)),
            write_gate: Arc::new(Mutex::new(())),
            file_path,
        }))
    }

    fn snapshot(&self) -> StoreResult<Namespace> {
        Ok(self.inner.read().map_err(poisoned)?.clone())
    }

    fn publish(&self, next: Namespace) -> StoreResult<()> {
        *self.inner.write().map_err(poisoned)? = next;
        Ok(())
    }

    /// Apply `f` to a copy of the current state, persist it, then publish it.
    ///
    /// Runs detached from the caller; the caller only awaits the outcome.
    async fn update_map<F>(&self, f: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Namespace) + Send + 'static,
    {
        let store = self.clone();
        let commit = tokio::spawn(async move {
            let _gate = store.write_gate.lock().await;
            let mut next = store.snapshot()?;
            f(&mut next);
            persist(&store.file_path, &next).await?;
            store.publish(next)
        });
        commit.await.map_err(StoreError::unavailable)?
    }
}

fn decode(bytes: &[u8]) -> StoreResult<Namespace> {
    let records: Vec<Record> = serde_json::from_slice(bytes)
        .map_err(|e| StoreError::Unavailable(format!("corrupt datastore file: {e}")))?;
    records
        .into_iter()
        .map(|record| {
            StorageKey::from_path(&record.key)
                .map(|key| (key, record.doc))
                .ok_or_else(|| StoreError::Unavailable("corrupt datastore file: empty key".into()))
        })
        .collect()
}

async fn persist(path: &Path, ns: &Namespace) -> StoreResult<()> {
    let records: Vec<Record> = ns
        .iter()
        .map(|(key, doc)| Record { key: key.path(), doc: doc.clone() })
        .collect();
    let data = serde_json::to_vec(&records).map_err(StoreError::unavailable)?;
    // one temp file per write; a lagging writer never shares it
    let tmp = path.with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));
    let written = match fs::write(&tmp, data).await {
        Ok(()) => fs::rename(&tmp, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp).await;
        return Err(StoreError::unavailable(e));
    }
    Ok(())
}

#[async_trait]
impl Datastore for FileDatastore {
    async fn get(&self, key: &StorageKey) -> StoreResult<Option<Document>> {
        let ns = self.inner.read().map_err(poisoned)?;
        Ok(ns.get(key).cloned())
    }

    async fn put(&self, key: StorageKey, doc: Document) -> StoreResult<()> {
        self.update_map(move |ns| ns.insert(key, doc)).await
    }

    async fn delete(&self, key: &StorageKey) -> StoreResult<()> {
        if self.get(key).await?.is_none() {
            return Ok(());
        }
        let key = key.clone();
        self.update_map(move |ns| {
            ns.remove(&key);
        })
        .await
    }

    async fn run_query(&self, query: &Query) -> StoreResult<QueryPage> {
        self.inner.read().map_err(poisoned)?.scan(query)
    }
}
