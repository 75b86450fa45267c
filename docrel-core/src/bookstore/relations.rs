//! Bookstore relationship resolution
//!
//! `Author.bookIDs` and `User.cartBookIDs` are lists owned by the author and user;
//! `Book.authorID` is a reference. A cart keeps duplicates, so a book added twice
//! resolves twice.

use std::str::FromStr;

use futures::future::try_join_all;

use super::model::{Author, Book, User};
use super::records::{AuthorDoc, BookDoc, UserDoc};
use crate::error::Result;
use crate::mapper::{parse_external, Records};
use crate::relation::{listed, referenced};
use crate::validation::ValidationError;

/// Relations reachable from a book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookRelation {
    Author,
}

/// Relations reachable from a user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRelation {
    Cart,
}

impl FromStr for BookRelation {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "author" => Ok(Self::Author),
            other => Err(ValidationError::InvalidVariant {
                value: other.to_owned(),
            }),
        }
    }
}

impl FromStr for UserRelation {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "cart" => Ok(Self::Cart),
            other => Err(ValidationError::InvalidVariant {
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Clone)]
pub struct BookstoreRelations {
    authors: Records<AuthorDoc>,
    books: Records<BookDoc>,
    users: Records<UserDoc>,
}

impl BookstoreRelations {
    pub fn new(authors: Records<AuthorDoc>, books: Records<BookDoc>, users: Records<UserDoc>) -> Self {
        Self {
            authors,
            books,
            users,
        }
    }

    /// Books in the author's list, in list order.
    pub async fn author_books(&self, author: &Author) -> Result<Vec<Book>> {
        let id = parse_external("id", &author.id)?.handle();
        let Some(record) = self.authors.get(id).await? else {
            return Ok(Vec::new());
        };
        let books = listed(&self.books, &record.body.book_ids).await?;
        Ok(books.into_iter().map(Book::from).collect())
    }

    pub async fn book_author(&self, book: &Book) -> Result<Option<Author>> {
        let id = parse_external("id", &book.id)?.handle();
        let author_id = self.books.get(id).await?.map(|r| r.body.author_id);
        Ok(referenced(&self.authors, author_id).await?.map(Author::from))
    }

    /// Books in the user's cart, repeated as often as they were added.
    pub async fn user_cart(&self, user: &User) -> Result<Vec<Book>> {
        let id = parse_external("id", &user.id)?.handle();
        let Some(record) = self.users.get(id).await? else {
            return Ok(Vec::new());
        };
        let books = listed(&self.books, &record.body.cart_book_ids).await?;
        Ok(books.into_iter().map(Book::from).collect())
    }

    pub async fn expand_book(&self, mut book: Book, include: &[BookRelation]) -> Result<Book> {
        for relation in include {
            match relation {
                BookRelation::Author => book.author = Some(self.book_author(&book).await?),
            }
        }
        Ok(book)
    }

    pub async fn expand_books(&self, books: Vec<Book>, include: &[BookRelation]) -> Result<Vec<Book>> {
        if include.is_empty() {
            return Ok(books);
        }
        try_join_all(books.into_iter().map(|b| self.expand_book(b, include))).await
    }

    pub async fn expand_user(&self, mut user: User, include: &[UserRelation]) -> Result<User> {
        for relation in include {
            match relation {
                UserRelation::Cart => user.cart = Some(self.user_cart(&user).await?),
            }
        }
        Ok(user)
    }
}
