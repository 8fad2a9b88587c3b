//! Identifier minting for new records.

use rand::{rngs::OsRng, RngCore};

use models::{BookId, UserId};

use crate::errors::{StoreError, StoreResult};

/// Source of fresh, globally unique identifiers.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> StoreResult<String>;

    fn user_id(&self) -> StoreResult<UserId> {
        self.generate().map(UserId::from)
    }

    fn book_id(&self) -> StoreResult<BookId> {
        self.generate().map(BookId::from)
    }
}

/// Random (v4) UUIDs drawn from the OS entropy source.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> StoreResult<String> {
        let mut bytes = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| StoreError::IdentifierGeneration(e.to_string()))?;
        Ok(uuid::Builder::from_random_bytes(bytes).into_uuid().to_string())
    }
}
