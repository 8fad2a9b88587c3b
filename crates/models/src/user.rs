use serde::{Deserialize, Serialize};

use crate::entity::{Entity, Scope};
use crate::errors::ModelError;
use crate::ids::UserId;
use crate::key::{derive_key, StorageKey};

pub const KIND: &str = "User";
pub const MAX_NAME_LEN: usize = 256;

/// Root record; owns zero or more books.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

impl User {
    pub fn new(id: UserId, name: &str) -> Result<Self, ModelError> {
        validate_name(name)?;
        Ok(Self { id, name: name.to_string() })
    }
}

/// Key of the user `id`. Users have no parent.
pub fn user_key(id: &UserId) -> StorageKey {
    derive_key(KIND, id.as_str(), None)
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ModelError::Validation(format!("name longer than {MAX_NAME_LEN} characters")));
    }
    Ok(())
}

impl Entity for User {
    const KIND: &'static str = KIND;
    type Id = UserId;
    type Owner = ();

    fn id(&self) -> &UserId {
        &self.id
    }
}

/// Books are stored under their owning user's key.
impl Scope for UserId {
    fn ancestor_key(&self) -> Option<StorageKey> {
        Some(user_key(self))
    }
}
