use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::errors::ModelError;
use crate::ids::{BookId, UserId};
use crate::user::{user_key, validate_name};
use crate::key::{derive_key, StorageKey};

pub const KIND: &str = "Book";

/// Child record of a `User`. `user_id` is a convenience copy; ownership is
/// decided by the key hierarchy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub user_id: UserId,
    pub name: String,
}

impl Book {
    pub fn new(id: BookId, owner: &UserId, name: &str) -> Result<Self, ModelError> {
        validate_name(name)?;
        Ok(Self { id, user_id: owner.clone(), name: name.to_string() })
    }
}

pub fn book_key(owner: &UserId, id: &BookId) -> StorageKey {
    derive_key(KIND, id.as_str(), Some(user_key(owner)))
}

impl Entity for Book {
    const KIND: &'static str = KIND;
    type Id = BookId;
    type Owner = UserId;

    fn id(&self) -> &BookId {
        &self.id
    }
}
