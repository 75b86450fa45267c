pub mod bookstore;
pub mod dealership;
pub mod entity;
pub mod error;
pub mod id;
pub mod mapper;
pub mod pagination;
pub mod relation;
pub mod resolve;
pub mod store;
pub mod validation;

pub use bookstore::Bookstore;
pub use dealership::Dealership;
pub use entity::EntityKind;
pub use error::{CoreError, Result};
pub use id::{CandidateId, ObjectId};
pub use resolve::ReferenceResolver;
pub use store::{Collection, DocumentStore, Filter, MemoryStore, StoreError, Update};
pub use validation::{ValidationError, ValidationErrors};
