//! Store layer for the user/book hierarchy.
//! - `datastore`: the backing document store contract and its backends.
//! - `store`: typed entity stores keyed through `models::Entity`.
//! - Failures share one taxonomy, `errors::StoreError`.

pub mod errors;
pub mod datastore;
pub mod ids;
pub mod pagination;
pub mod runtime;
pub mod store;

pub use errors::{StoreError, StoreResult};
pub use ids::{IdGenerator, UuidGenerator};
pub use pagination::{ListOptions, Page};
pub use store::{BookStore, EntityStore, UserStore};
