//! Entity stores: typed Get/Put/Delete/List over a [`Datastore`].
//!
//! One generic store is instantiated per kind. Keys come from
//! [`Entity::key`]; list scans are scoped by the owner's ancestor key.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::info;

use models::{Book, Entity, Scope, User};

use crate::datastore::{Datastore, Document, Query};
use crate::errors::{StoreError, StoreResult};
use crate::pagination::{ListOptions, Page};

pub type UserStore = EntityStore<User>;
pub type BookStore = EntityStore<Book>;

pub struct EntityStore<E: Entity> {
    datastore: Arc<dyn Datastore>,
    debug: bool,
    _kind: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for EntityStore<E> {
    fn clone(&self) -> Self {
        Self { datastore: Arc::clone(&self.datastore), debug: self.debug, _kind: PhantomData }
    }
}

impl<E: Entity> EntityStore<E> {
    /// `debug` logs every fetched or listed record.
    pub fn new(datastore: Arc<dyn Datastore>, debug: bool) -> Self {
        Self { datastore, debug, _kind: PhantomData }
    }

    /// Exact-key read of `id` under `owner`.
    pub async fn get(&self, owner: &E::Owner, id: &E::Id) -> StoreResult<E> {
        let key = E::key(owner, id);
        let doc = self.datastore.get(&key).await?.ok_or_else(|| StoreError::NotFound(key.clone()))?;
        let entity: E = serde_json::from_value(doc)
            .map_err(|e| StoreError::Codec { key: key.clone(), reason: e.to_string() })?;
        if self.debug {
            info!(kind = E::KIND, %key, record = ?entity, "fetched record");
        }
        Ok(entity)
    }

    /// Upsert `entity` under `owner`. Last writer wins.
    pub async fn put(&self, owner: &E::Owner, entity: &E) -> StoreResult<()> {
        let key = E::key(owner, entity.id());
        let doc: Document = serde_json::to_value(entity)
            .map_err(|e| StoreError::Codec { key: key.clone(), reason: e.to_string() })?;
        self.datastore.put(key, doc).await
    }

    /// Remove `id` under `owner`; a missing record is not an error.
    pub async fn delete(&self, owner: &E::Owner, id: &E::Id) -> StoreResult<()> {
        self.datastore.delete(&E::key(owner, id)).await
    }

    /// One page of the owner's records in native key order.
    pub async fn list(&self, owner: &E::Owner, opts: &ListOptions) -> StoreResult<Page<E>> {
        let mut query = Query::kind(E::KIND);
        if let Some(ancestor) = owner.ancestor_key() {
            query = query.ancestor(ancestor);
        }
        if let Some(cursor) = opts.cursor() {
            query = query.start(cursor);
        }
        if let Some(limit) = opts.normalized_limit() {
            query = query.limit(limit);
        }

        let page = self.datastore.run_query(&query).await?;
        let items = page
            .entries
            .into_iter()
            .map(|(key, doc)| {
                serde_json::from_value::<E>(doc).map_err(|e| StoreError::Codec { key, reason: e.to_string() })
            })
            .collect::<StoreResult<Vec<E>>>()?;

        if self.debug {
            for (i, entity) in items.iter().enumerate() {
                info!(kind = E::KIND, index = i, record = ?entity, "listed record");
            }
        }
        Ok(Page { items, next_cursor: page.next_cursor })
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use async_trait::async_trait;
    use models::{BookId, StorageKey, UserId};

    use crate::datastore::{MemoryDatastore, QueryPage};

    fn stores() -> (UserStore, BookStore) {
        let ds: Arc<dyn Datastore> = Arc::new(MemoryDatastore::new());
        (UserStore::new(Arc::clone(&ds), false), BookStore::new(ds, false))
    }

    fn user(id: &str, name: &str) -> User {
        User { id: id.into(), name: name.into() }
    }

    fn book(owner: &str, id: &str, name: &str) -> Book {
        Book { id: id.into(), user_id: owner.into(), name: name.into() }
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let (users, books) = stores();
        let u = user("u1", "Alice");
        users.put(&(), &u).await.unwrap();
        assert_eq!(users.get(&(), &u.id).await.unwrap(), u);

        let b = book("u1", "b1", "Dune");
        books.put(&u.id, &b).await.unwrap();
        assert_eq!(books.get(&u.id, &b.id).await.unwrap(), b);
    }

    #[tokio::test]
    async fn put_overwrites_existing_record() {
        let (users, _) = stores();
        users.put(&(), &user("u1", "Alice")).await.unwrap();
        users.put(&(), &user("u1", "Alicia")).await.unwrap();
        assert_eq!(users.get(&(), &"u1".into()).await.unwrap().name, "Alicia");
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let (users, books) = stores();
        let err = users.get(&(), &UserId::from("nobody")).await.unwrap_err();
        assert!(err.is_not_found());
        let err = books.get(&"u1".into(), &BookId::from("b1")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn same_book_id_under_two_owners_stays_separate() {
        let (_, books) = stores();
        let (u1, u2) = (UserId::from("u1"), UserId::from("u2"));
        books.put(&u1, &book("u1", "b1", "first")).await.unwrap();
        books.put(&u2, &book("u2", "b1", "second")).await.unwrap();

        let id = BookId::from("b1");
        assert_eq!(books.get(&u1, &id).await.unwrap().name, "first");
        assert_eq!(books.get(&u2, &id).await.unwrap().name, "second");

        books.delete(&u1, &id).await.unwrap();
        assert!(books.get(&u1, &id).await.unwrap_err().is_not_found());
        assert_eq!(books.get(&u2, &id).await.unwrap().name, "second");
    }

    #[tokio::test]
    async fn delete_twice_is_fine() {
        let (users, _) = stores();
        users.put(&(), &user("u1", "Alice")).await.unwrap();
        users.delete(&(), &"u1".into()).await.unwrap();
        users.delete(&(), &"u1".into()).await.unwrap();
        users.delete(&(), &"never".into()).await.unwrap();
    }

    #[tokio::test]
    async fn deleting_user_leaves_books_behind() {
        let (users, books) = stores();
        let owner = UserId::from("u1");
        users.put(&(), &user("u1", "Alice")).await.unwrap();
        books.put(&owner, &book("u1", "b1", "Dune")).await.unwrap();
        users.delete(&(), &owner).await.unwrap();
        assert_eq!(books.list(&owner, &ListOptions::default()).await.unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn pages_of_ten_cover_twenty_five_books() {
        let (_, books) = stores();
        let owner = UserId::from("u1");
        for i in 0..25 {
            books.put(&owner, &book("u1", &format!("b{i:02}"), "x")).await.unwrap();
        }
        // a neighbour's books must not show up
        books.put(&"u2".into(), &book("u2", "b00", "other")).await.unwrap();

        let mut opts = ListOptions::page(10);
        let mut sizes = Vec::new();
        let mut seen = HashSet::new();
        loop {
            let page = books.list(&owner, &opts).await.unwrap();
            sizes.push(page.items.len());
            for b in &page.items {
                assert_eq!(b.user_id, owner);
                assert!(seen.insert(b.id.clone()), "duplicate {}", b.id);
            }
            match page.next_cursor {
                Some(c) => opts.cursor = Some(c),
                None => break,
            }
        }
        assert_eq!(sizes, vec![10, 10, 5]);
        assert_eq!(seen.len(), 25);
    }

    #[tokio::test]
    async fn malformed_cursor_is_rejected_not_empty() {
        let (users, _) = stores();
        users.put(&(), &user("u1", "Alice")).await.unwrap();
        let opts = ListOptions::page(10).with_cursor("definitely not a cursor!");
        let err = users.list(&(), &opts).await.unwrap_err();
        assert!(matches!(err, StoreError::BadCursor(_)));
    }

    #[tokio::test]
    async fn undecodable_record_is_a_codec_error() {
        let ds = Arc::new(MemoryDatastore::new());
        ds.put(User::key(&(), &"u1".into()), serde_json::json!({"unexpected": true})).await.unwrap();
        let users = UserStore::new(ds, false);
        let err = users.get(&(), &"u1".into()).await.unwrap_err();
        assert!(matches!(err, StoreError::Codec { .. }));
    }

    struct OfflineDatastore;

    #[async_trait]
    impl Datastore for OfflineDatastore {
        async fn get(&self, _key: &StorageKey) -> StoreResult<Option<Document>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn put(&self, _key: StorageKey, _doc: Document) -> StoreResult<()> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn delete(&self, _key: &StorageKey) -> StoreResult<()> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn run_query(&self, _query: &Query) -> StoreResult<QueryPage> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn backend_failures_surface_as_unavailable() {
        let books = BookStore::new(Arc::new(OfflineDatastore), false);
        let owner = UserId::from("u1");
        let b = book("u1", "b1", "Dune");
        assert!(matches!(books.get(&owner, &b.id).await, Err(StoreError::Unavailable(_))));
        assert!(matches!(books.put(&owner, &b).await, Err(StoreError::Unavailable(_))));
        assert!(matches!(books.delete(&owner, &b.id).await, Err(StoreError::Unavailable(_))));
        assert!(matches!(books.list(&owner, &ListOptions::default()).await, Err(StoreError::Unavailable(_))));
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Run a get and a list of two books with the given debug flag and return what was logged.
    async fn logged_with_debug(debug: bool) -> String {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt().with_writer(buffer.clone()).with_ansi(false).finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let ds: Arc<dyn Datastore> = Arc::new(MemoryDatastore::new());
        let books = BookStore::new(ds, debug);
        let owner = UserId::from("u1");
        books.put(&owner, &book("u1", "b1", "Dune")).await.unwrap();
        books.put(&owner, &book("u1", "b2", "Emma")).await.unwrap();
        books.get(&owner, &"b1".into()).await.unwrap();
        books.list(&owner, &ListOptions::default()).await.unwrap();

        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[tokio::test]
    async fn debug_flag_logs_each_record() {
        let logs = logged_with_debug(true).await;
        assert_eq!(logs.matches("fetched record").count(), 1, "{logs}");
        assert_eq!(logs.matches("listed record").count(), 2, "{logs}");
        assert!(logs.contains("Dune") && logs.contains("Emma"), "{logs}");
    }

    #[tokio::test]
    async fn records_stay_out_of_logs_without_debug() {
        let logs = logged_with_debug(false).await;
        assert!(!logs.contains("fetched record"), "{logs}");
        assert!(!logs.contains("listed record"), "{logs}");
        assert!(!logs.contains("Dune"), "{logs}");
    }
}
