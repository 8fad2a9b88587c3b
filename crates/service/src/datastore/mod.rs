//! Backing document store contract.
//!
//! The entity stores consume this trait; they never reach past it. Keys are
//! exact-match for get/put/delete, and queries walk the native key order of
//! one kind, optionally restricted to the descendants of an ancestor key.

use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;

use models::StorageKey;

use crate::errors::{StoreError, StoreResult};

pub mod cursor;
pub mod file;
pub mod memory;

pub use cursor::Cursor;
pub use file::FileDatastore;
pub use memory::MemoryDatastore;

/// Stored record body.
pub type Document = serde_json::Value;

/// Ordered scan over one kind.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub kind: String,
    pub ancestor: Option<StorageKey>,
    /// Opaque resume token from a previous page.
    pub start: Option<String>,
    /// Maximum records in this page; `None` reads to the end.
    pub limit: Option<usize>,
}

impl Query {
    pub fn kind(kind: &str) -> Self {
        Self { kind: kind.to_string(), ancestor: None, start: None, limit: None }
    }

    pub fn ancestor(mut self, ancestor: StorageKey) -> Self {
        self.ancestor = Some(ancestor);
        self
    }

    pub fn start(mut self, cursor: impl Into<String>) -> Self {
        self.start = Some(cursor.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One page of query results plus the token to fetch the next one.
#[derive(Clone, Debug, Default)]
pub struct QueryPage {
    pub entries: Vec<(StorageKey, Document)>,
    /// `None` once the scan is exhausted.
    pub next_cursor: Option<String>,
}

#[async_trait]
pub trait Datastore: Send + Sync {
    /// Exact-key read. `Ok(None)` when the key is absent.
    async fn get(&self, key: &StorageKey) -> StoreResult<Option<Document>>;

    /// Upsert; the write lands whole or not at all.
    async fn put(&self, key: StorageKey, doc: Document) -> StoreResult<()>;

    /// Remove the key. Absent keys are not an error.
    async fn delete(&self, key: &StorageKey) -> StoreResult<()>;

    async fn run_query(&self, query: &Query) -> StoreResult<QueryPage>;
}

/// Records of one namespace, partitioned by kind.
///
/// Each partition keeps native key order, so a kind scan never walks other
/// kinds and an ancestor's descendants stay contiguous inside it.
#[derive(Clone, Debug, Default)]
pub(crate) struct Namespace {
    kinds: BTreeMap<String, BTreeMap<StorageKey, Document>>,
}

impl Namespace {
    pub(crate) fn get(&self, key: &StorageKey) -> Option<&Document> {
        self.kinds.get(key.kind())?.get(key)
    }

    pub(crate) fn insert(&mut self, key: StorageKey, doc: Document) {
        self.kinds.entry(key.kind().to_string()).or_default().insert(key, doc);
    }

    pub(crate) fn remove(&mut self, key: &StorageKey) -> Option<Document> {
        let records = self.kinds.get_mut(key.kind())?;
        let doc = records.remove(key);
        if records.is_empty() {
            self.kinds.remove(key.kind());
        }
        doc
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&StorageKey, &Document)> {
        self.kinds.values().flat_map(|records| records.iter())
    }

    /// Evaluate `query` against this snapshot.
    pub(crate) fn scan(&self, query: &Query) -> StoreResult<QueryPage> {
        let resume_after = match query.start.as_deref().filter(|s| !s.is_empty()) {
            Some(token) => {
                let cursor = Cursor::decode(token)?;
                if cursor.kind() != query.kind {
                    return Err(StoreError::BadCursor(format!(
                        "cursor belongs to a {} scan, not {}",
                        cursor.kind(),
                        query.kind
                    )));
                }
                let last = cursor.last_key()?;
                if let Some(ancestor) = &query.ancestor {
                    if !last.has_ancestor(ancestor) {
                        return Err(StoreError::BadCursor(format!("cursor is outside ancestor {ancestor}")));
                    }
                }
                Some(last)
            }
            None => None,
        };

        let Some(records) = self.kinds.get(&query.kind) else {
            return Ok(QueryPage::default());
        };

        let lower = match (&resume_after, &query.ancestor) {
            (Some(last), _) => Bound::Excluded(last),
            (None, Some(ancestor)) => Bound::Included(ancestor),
            (None, None) => Bound::Unbounded,
        };

        let in_scope = |key: &StorageKey| match &query.ancestor {
            Some(ancestor) => key == ancestor || key.has_ancestor(ancestor),
            None => true,
        };

        let mut matching = records
            .range::<StorageKey, _>((lower, Bound::Unbounded))
            .take_while(|entry| in_scope(entry.0));

        let limit = query.limit.map(|l| l.max(1)).unwrap_or(usize::MAX);
        let entries: Vec<(StorageKey, Document)> = matching
            .by_ref()
            .take(limit)
            .map(|(key, doc)| (key.clone(), doc.clone()))
            .collect();
        let next_cursor = match entries.last() {
            Some((last, _)) if entries.len() == limit && matching.next().is_some() => {
                Some(Cursor::after(&query.kind, last).encode())
            }
            _ => None,
        };
        Ok(QueryPage { entries, next_cursor })
    }
}

impl FromIterator<(StorageKey, Document)> for Namespace {
    fn from_iter<I: IntoIterator<Item = (StorageKey, Document)>>(iter: I) -> Self {
        let mut ns = Namespace::default();
        for (key, doc) in iter {
            ns.insert(key, doc);
        }
        ns
    }
}
