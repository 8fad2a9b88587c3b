//! Record types and key derivation for the user/book hierarchy.

pub mod errors;
pub mod ids;
pub mod key;
pub mod entity;
pub mod user;
pub mod book;

pub use book::Book;
pub use entity::{Entity, Scope};
pub use ids::{BookId, UserId};
pub use key::{derive_key, PathElement, StorageKey};
pub use user::User;
