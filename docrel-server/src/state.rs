//! Application state shared across handlers

use std::sync::Arc;

use docrel_core::{Bookstore, Dealership, DocumentStore, MemoryStore};

/// Shared application state. Both domains hold the same store handle.
#[derive(Clone)]
pub struct AppState {
    pub dealership: Dealership,
    pub bookstore: Bookstore,
    /// Backend name reported by `/health`
    pub backend: &'static str,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, backend: &'static str) -> Self {
        Self {
            dealership: Dealership::new(Arc::clone(&store)),
            bookstore: Bookstore::new(store),
            backend,
        }
    }

    /// State over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), "memory")
    }
}
