//! docrel-server: HTTP surface and Postgres document store for docrel
//!
//! Serves the dealership and bookstore operations of `docrel-core` over REST,
//! backed by either Postgres (JSONB documents) or the in-memory store.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod state;

use std::sync::Arc;

pub use config::{ServerConfig, StoreBackend};
pub use error::{ServerError, ServerResult};
pub use http::{build_router, run_server};
pub use state::AppState;

use db::PgDocumentStore;
use docrel_core::MemoryStore;

/// Open the configured store, preparing its schema when it has one.
pub async fn open_state(backend: &StoreBackend) -> ServerResult<AppState> {
    match backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store - data is lost on exit");
            Ok(AppState::new(Arc::new(MemoryStore::new()), backend.name()))
        }
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = db::create_pool_with_options(database_url, *max_connections).await?;
            db::migrations::run(&pool).await?;
            Ok(AppState::new(
                Arc::new(PgDocumentStore::new(pool)),
                backend.name(),
            ))
        }
    }
}

/// Start the HTTP server
pub async fn serve(config: ServerConfig) -> ServerResult<()> {
    let state = open_state(&config.store).await?;
    run_server(state, &config).await?;
    Ok(())
}
