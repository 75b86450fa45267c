//! Bookstore endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use docrel_core::bookstore::{Author, Book, User};

use crate::http::error::ApiError;
use crate::http::extractors::{JsonPayload, QueryPayload};
use crate::state::AppState;

/// POST /addUser - `{ name, email, password }`
async fn add_user(
    State(state): State<Arc<AppState>>,
    JsonPayload(payload): JsonPayload,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.bookstore.add_user(&payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /addAuthor - `{ name }`
async fn add_author(
    State(state): State<Arc<AppState>>,
    JsonPayload(payload): JsonPayload,
) -> Result<(StatusCode, Json<Author>), ApiError> {
    let author = state.bookstore.add_author(&payload).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// POST /addBook - `{ title, author_id, pages }`
async fn add_book(
    State(state): State<Arc<AppState>>,
    JsonPayload(payload): JsonPayload,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let book = state.bookstore.add_book(&payload).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// GET /getUser/{id} - `?include=cart` resolves the cart
async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: QueryPayload,
) -> Result<Json<User>, ApiError> {
    let user = state.bookstore.get_user(&query.with("id", id)).await?;
    Ok(Json(user))
}

/// GET /getBooks - `?page=N[&title=..][&include=author]`
async fn get_books(
    State(state): State<Arc<AppState>>,
    query: QueryPayload,
) -> Result<Json<Vec<Book>>, ApiError> {
    let books = state.bookstore.list_books(&query.into_value()).await?;
    Ok(Json(books))
}

/// PUT /updateCart - `{ id_book, id_user }`
async fn update_cart(
    State(state): State<Arc<AppState>>,
    JsonPayload(payload): JsonPayload,
) -> Result<StatusCode, ApiError> {
    state.bookstore.update_cart(&payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /deleteUser/{id}
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: QueryPayload,
) -> Result<StatusCode, ApiError> {
    state.bookstore.delete_user(&query.with("id", id)).await?;
    Ok(StatusCode::OK)
}

/// Bookstore routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/addUser", post(add_user))
        .route("/addAuthor", post(add_author))
        .route("/addBook", post(add_book))
        .route("/getUser/{id}", get(get_user))
        .route("/getBooks", get(get_books))
        .route("/updateCart", put(update_cart))
        .route("/deleteUser/{id}", delete(delete_user))
}
