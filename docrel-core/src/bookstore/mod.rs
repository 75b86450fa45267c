//! Bookstore domain: users, authors and books
//!
//! Authors own the author <-> book relation through `bookIDs`; books point back at
//! their author through `authorID`. Users own their cart as `cartBookIDs`.

pub mod input;
pub mod model;
pub mod password;
pub mod records;
pub mod relations;
pub mod service;

pub use model::{Author, Book, User};
pub use relations::{BookRelation, BookstoreRelations, UserRelation};
pub use service::Bookstore;
