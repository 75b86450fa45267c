//! Validated bookstore requests

use serde_json::Value;

use super::relations::{BookRelation, UserRelation};
use crate::id::CandidateId;
use crate::pagination::{Pagination, BOOKS_PER_PAGE};
use crate::store::Filter;
use crate::validation::{ValidationErrors, Validator};

const MIN_NAME_LEN: usize = 2;
const MIN_TITLE_LEN: usize = 1;
const MIN_PASSWORD_LEN: usize = 8;

/// New user. `password` is still plaintext here.
#[derive(Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl NewUser {
    pub fn parse(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut v = Validator::strict(payload);
        let name = v.string("name", MIN_NAME_LEN);
        let email = v.email("email");
        let password = v.raw_string("password", MIN_PASSWORD_LEN);
        v.finish(|| {
            Some(Self {
                name: name?,
                email: email?,
                password: password?,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAuthor {
    pub name: String,
}

impl NewAuthor {
    pub fn parse(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut v = Validator::strict(payload);
        let name = v.string("name", MIN_NAME_LEN);
        v.finish(|| Some(Self { name: name? }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: CandidateId,
    pub pages: f64,
}

impl NewBook {
    pub fn parse(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut v = Validator::strict(payload);
        let title = v.string("title", MIN_TITLE_LEN);
        let author = v.id("author_id");
        let pages = v.non_negative("pages");
        v.finish(|| {
            Some(Self {
                title: title?,
                author: author?,
                pages: pages?,
            })
        })
    }
}

/// Single user lookup, optionally with the cart resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct UserLookup {
    pub id: CandidateId,
    pub include: Vec<UserRelation>,
}

impl UserLookup {
    pub fn parse(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut v = Validator::strict(payload);
        let id = v.id("id");
        let include = v.optional_variants("include");
        v.finish(|| {
            Some(Self {
                id: id?,
                include: include.unwrap_or_default(),
            })
        })
    }
}

/// Book listing: ten per page, optionally by exact title.
#[derive(Debug, Clone, PartialEq)]
pub struct BookQuery {
    pub page: Pagination,
    pub title: Option<String>,
    pub include: Vec<BookRelation>,
}

impl BookQuery {
    pub fn parse(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut v = Validator::strict(payload).coerce_numbers();
        let page = v.non_negative("page");
        let title = v.optional_string("title", MIN_TITLE_LEN);
        let include = v.optional_variants("include");
        v.finish(|| {
            Some(Self {
                page: Pagination::page(page?, BOOKS_PER_PAGE),
                title,
                include: include.unwrap_or_default(),
            })
        })
    }

    pub fn filter(&self) -> Filter {
        match &self.title {
            Some(title) => Filter::eq("title", title.as_str()),
            None => Filter::All,
        }
    }
}

/// Append a book to a user's cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartAddition {
    pub book: CandidateId,
    pub user: CandidateId,
}

impl CartAddition {
    pub fn parse(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut v = Validator::strict(payload);
        let book = v.id("id_book");
        let user = v.id("id_user");
        v.finish(|| {
            Some(Self {
                book: book?,
                user: user?,
            })
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserRemoval {
    pub id: CandidateId,
}

impl UserRemoval {
    pub fn parse(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut v = Validator::lenient(payload);
        let id = v.id("id");
        v.finish(|| Some(Self { id: id? }))
    }
}
