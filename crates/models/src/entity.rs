//! Binding between record types and their place in the key hierarchy.

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

use crate::key::{derive_key, StorageKey};

/// Owner context an entity is stored under.
///
/// Root kinds use `()`; child kinds use the identifier of their parent.
pub trait Scope: Send + Sync {
    /// Key every record in this scope is a descendant of, if any.
    fn ancestor_key(&self) -> Option<StorageKey>;
}

impl Scope for () {
    fn ancestor_key(&self) -> Option<StorageKey> {
        None
    }
}

/// A record type persisted by an entity store.
pub trait Entity: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Kind name used in storage keys.
    const KIND: &'static str;

    type Id: AsRef<str> + Clone + Debug + Send + Sync;
    type Owner: Scope;

    fn id(&self) -> &Self::Id;

    /// Key of the record `id` under `owner`.
    fn key(owner: &Self::Owner, id: &Self::Id) -> StorageKey {
        derive_key(Self::KIND, id.as_ref(), owner.ancestor_key())
    }
}
