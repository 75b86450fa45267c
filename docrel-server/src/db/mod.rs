//! Database layer: connection pool, schema and the Postgres document store
//!
//! - One pool, shared by every collection handle
//! - One `documents` table; collections are a column, bodies are JSONB
//! - Schema is created idempotently at startup

pub mod migrations;
pub mod pool;
pub mod store;

pub use pool::{create_pool, create_pool_with_options, DEFAULT_MAX_CONNECTIONS};
pub use store::{PgCollection, PgDocumentStore};
