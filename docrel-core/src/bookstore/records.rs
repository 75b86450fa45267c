//! Storage shape of bookstore documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::ObjectId;
use crate::mapper::serialize_number;

/// Author's list of books (authoritative side of author <-> book).
pub const BOOK_IDS_FIELD: &str = "bookIDs";

/// User's cart (authoritative side of user <-> book).
pub const CART_FIELD: &str = "cartBookIDs";

/// `Authors` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorDoc {
    pub name: String,
    #[serde(rename = "bookIDs", default)]
    pub book_ids: Vec<ObjectId>,
}

/// `Books` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDoc {
    pub title: String,
    #[serde(rename = "authorID")]
    pub author_id: ObjectId,
    #[serde(serialize_with = "serialize_number")]
    pub pages: f64,
    #[serde(rename = "ISBN")]
    pub isbn: String,
}

/// `Users` document. `password` holds a PHC hash string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDoc {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "cartBookIDs", default)]
    pub cart_book_ids: Vec<ObjectId>,
}
