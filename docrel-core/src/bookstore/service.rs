//! Bookstore operations

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::input::{BookQuery, CartAddition, NewAuthor, NewBook, NewUser, UserLookup, UserRemoval};
use super::model::{Author, Book, User};
use super::password::hash_password;
use super::records::{AuthorDoc, BookDoc, UserDoc, BOOK_IDS_FIELD, CART_FIELD};
use super::relations::BookstoreRelations;
use crate::entity::EntityKind;
use crate::error::{CoreError, Result};
use crate::mapper::Records;
use crate::resolve::ReferenceResolver;
use crate::store::{DocumentStore, Update};

/// Users, authors and books over one document store.
#[derive(Clone)]
pub struct Bookstore {
    authors: Records<AuthorDoc>,
    books: Records<BookDoc>,
    users: Records<UserDoc>,
    resolver: ReferenceResolver,
    relations: BookstoreRelations,
}

impl Bookstore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let authors = Records::new(store.collection(EntityKind::Author.collection()));
        let books = Records::new(store.collection(EntityKind::Book.collection()));
        let users = Records::new(store.collection(EntityKind::User.collection()));
        let relations = BookstoreRelations::new(authors.clone(), books.clone(), users.clone());

        Self {
            authors,
            books,
            users,
            resolver: ReferenceResolver::new(store),
            relations,
        }
    }

    pub fn relations(&self) -> &BookstoreRelations {
        &self.relations
    }

    #[instrument(skip_all)]
    pub async fn add_user(&self, payload: &Value) -> Result<User> {
        let input = NewUser::parse(payload)?;
        let password = hash_password(input.password).await?;

        let stored = self
            .users
            .insert(UserDoc {
                name: input.name,
                email: input.email,
                password,
                created_at: Utc::now(),
                cart_book_ids: Vec::new(),
            })
            .await?;

        info!(user_id = %stored.id, "created user");
        Ok(User::from(stored))
    }

    #[instrument(skip_all)]
    pub async fn add_author(&self, payload: &Value) -> Result<Author> {
        let input = NewAuthor::parse(payload)?;

        let stored = self
            .authors
            .insert(AuthorDoc {
                name: input.name,
                book_ids: Vec::new(),
            })
            .await?;

        info!(author_id = %stored.id, "created author");
        Ok(Author::from(stored))
    }

    /// Insert a book with a fresh ISBN, then append it to its author's list.
    #[instrument(skip_all)]
    pub async fn add_book(&self, payload: &Value) -> Result<Book> {
        let input = NewBook::parse(payload)?;
        let author = self.resolver.resolve(EntityKind::Author, input.author).await?;

        let stored = self
            .books
            .insert(BookDoc {
                title: input.title,
                author_id: author,
                pages: input.pages,
                isbn: Uuid::new_v4().to_string(),
            })
            .await?;
        debug!(book_id = %stored.id, "inserted book");

        self.authors
            .update(author, Update::push(BOOK_IDS_FIELD, stored.id))
            .await?;

        info!(book_id = %stored.id, author_id = %author, "created book");
        Ok(Book::from(stored))
    }

    #[instrument(skip_all)]
    pub async fn get_user(&self, payload: &Value) -> Result<User> {
        let input = UserLookup::parse(payload)?;

        let user = self
            .users
            .get(input.id.handle())
            .await?
            .map(User::from)
            .ok_or_else(|| CoreError::not_found(EntityKind::User))?;

        self.relations.expand_user(user, &input.include).await
    }

    /// One page of books. An empty page is reported as [`CoreError::NoMatches`].
    #[instrument(skip_all)]
    pub async fn list_books(&self, payload: &Value) -> Result<Vec<Book>> {
        let query = BookQuery::parse(payload)?;

        let books: Vec<Book> = self
            .books
            .find(&query.filter(), query.page)
            .await?
            .into_iter()
            .map(Book::from)
            .collect();
        debug!(count = books.len(), skip = query.page.skip, "listed books");

        if books.is_empty() {
            return Err(CoreError::NoMatches {
                kind: EntityKind::Book,
            });
        }
        self.relations.expand_books(books, &query.include).await
    }

    /// Append a book to a user's cart. Adding the same book again appends again.
    #[instrument(skip_all)]
    pub async fn update_cart(&self, payload: &Value) -> Result<()> {
        let input = CartAddition::parse(payload)?;

        let user = self.resolver.resolve(EntityKind::User, input.user).await?;
        let book = self.resolver.resolve(EntityKind::Book, input.book).await?;

        let outcome = self.users.update(user, Update::push(CART_FIELD, book)).await?;
        if outcome.matched == 0 {
            return Err(CoreError::not_found(EntityKind::User));
        }

        info!(user_id = %user, book_id = %book, "added book to cart");
        Ok(())
    }

    /// Remove a user. Books in the cart are untouched.
    #[instrument(skip_all)]
    pub async fn delete_user(&self, payload: &Value) -> Result<()> {
        let input = UserRemoval::parse(payload)?;
        let id = input.id.handle();

        if self.users.delete(id).await? == 0 {
            return Err(CoreError::not_found(EntityKind::User));
        }

        info!(user_id = %id, "deleted user");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ObjectId;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn service() -> (MemoryStore, Bookstore) {
        let store = MemoryStore::new();
        let service = Bookstore::new(Arc::new(store.clone()));
        (store, service)
    }

    #[tokio::test]
    async fn add_book_requires_author() {
        let (store, service) = service();
        let err = service
            .add_book(&json!({
                "title": "Dune",
                "author_id": ObjectId::generate().to_external(),
                "pages": 412,
            }))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "author not found");
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn add_book_appends_to_author() {
        let (_, service) = service();
        let author = service.add_author(&json!({ "name": "Frank" })).await.unwrap();
        let book = service
            .add_book(&json!({ "title": "Dune", "author_id": author.id, "pages": 412 }))
            .await
            .unwrap();

        assert!(Uuid::parse_str(&book.isbn).is_ok());
        let books = service.relations().author_books(&author).await.unwrap();
        assert_eq!(books, vec![book.clone()]);

        let found = service.relations().book_author(&book).await.unwrap();
        assert_eq!(found.map(|a| a.name), Some("Frank".to_owned()));
    }

    #[tokio::test]
    async fn add_book_keeps_fractional_pages() {
        let (_, service) = service();
        let author = service.add_author(&json!({ "name": "Frank" })).await.unwrap();
        let book = service
            .add_book(&json!({ "title": "Dune", "author_id": author.id, "pages": 12.5 }))
            .await
            .unwrap();
        assert_eq!(book.pages, 12.5);

        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(value["pages"].to_string(), "12.5");
    }

    #[tokio::test]
    async fn empty_page_is_no_matches() {
        let (_, service) = service();
        let err = service.list_books(&json!({ "page": 0 })).await.unwrap_err();
        assert_eq!(err.to_string(), "no books found");
    }

    #[tokio::test]
    async fn delete_missing_user() {
        let (_, service) = service();
        let err = service
            .delete_user(&json!({ "id": ObjectId::generate().to_external() }))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { kind: EntityKind::User }));
    }

    #[tokio::test]
    async fn cart_checks_user_before_book() {
        let (_, service) = service();
        let err = service
            .update_cart(&json!({
                "id_book": ObjectId::generate().to_external(),
                "id_user": ObjectId::generate().to_external(),
            }))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "user not found");
    }
}
