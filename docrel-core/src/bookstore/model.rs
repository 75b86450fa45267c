//! External bookstore entities
//!
//! A user's password hash stays in storage. Relation fields follow the dealership
//! convention: `None` until requested.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::records::{AuthorDoc, BookDoc, UserDoc};
use crate::mapper::{serialize_number, Stored};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub books: Option<Vec<Book>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    #[serde(serialize_with = "serialize_number")]
    pub pages: f64,
    #[serde(rename = "ISBN")]
    pub isbn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Option<Author>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart: Option<Vec<Book>>,
}

impl From<Stored<AuthorDoc>> for Author {
    fn from(record: Stored<AuthorDoc>) -> Self {
        Self {
            id: record.id.to_external(),
            name: record.body.name,
            books: None,
        }
    }
}

impl From<Stored<BookDoc>> for Book {
    fn from(record: Stored<BookDoc>) -> Self {
        Self {
            id: record.id.to_external(),
            title: record.body.title,
            pages: record.body.pages,
            isbn: record.body.isbn,
            author: None,
        }
    }
}

impl From<Stored<UserDoc>> for User {
    fn from(record: Stored<UserDoc>) -> Self {
        Self {
            id: record.id.to_external(),
            name: record.body.name,
            email: record.body.email,
            created_at: record.body.created_at,
            cart: None,
        }
    }
}
