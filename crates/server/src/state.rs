use std::sync::Arc;

use service::{datastore::Datastore, BookStore, IdGenerator, UserStore, UuidGenerator};

/// Shared, read-only handles every request works through.
#[derive(Clone)]
pub struct AppState {
    pub users: UserStore,
    pub books: BookStore,
    pub ids: Arc<dyn IdGenerator>,
}

impl AppState {
    pub fn new(datastore: Arc<dyn Datastore>, debug: bool) -> Self {
        Self {
            users: UserStore::new(Arc::clone(&datastore), debug),
            books: BookStore::new(datastore, debug),
            ids: Arc::new(UuidGenerator),
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }
}
