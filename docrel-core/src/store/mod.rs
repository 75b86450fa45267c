//! Document store interface
//!
//! The core only sees collections through [`Collection`]. Every call is one round
//! trip and is atomic for the single document it touches; nothing spans documents.
//!
//! Documents are JSON objects. The store owns the `_id` field: it is generated on
//! insert and present on every document returned.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::id::ObjectId;
use crate::pagination::Pagination;

pub use memory::MemoryStore;

/// A stored document.
pub type Document = Map<String, Value>;

/// Field holding the document handle.
pub const ID_FIELD: &str = "_id";

/// Selection of documents within one collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document
    All,
    /// The document with this handle
    Id(ObjectId),
    /// Documents whose handle is in the list
    IdIn(Vec<ObjectId>),
    /// Field equals value. `Null` also matches a missing field.
    Eq(String, Value),
    /// List field has an element equal to value
    Contains(String, Value),
    /// Numeric field within the inclusive bounds
    Range {
        field: String,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Every sub-filter matches
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Contains(field.into(), value.into())
    }

    /// Conjunction, collapsing trivial cases.
    pub fn all_of(filters: Vec<Filter>) -> Self {
        let mut filters: Vec<Filter> = filters
            .into_iter()
            .filter(|f| !matches!(f, Filter::All))
            .collect();
        match filters.len() {
            0 => Self::All,
            1 => filters.remove(0),
            _ => Self::And(filters),
        }
    }
}

/// Mutation applied to one document.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Overwrite a field
    Set { field: String, value: Value },
    /// Append to a list field, creating it when absent
    Push { field: String, value: Value },
}

impl Update {
    pub fn set(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Set {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn push(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Push {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Result of an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Documents the filter selected (0 or 1)
    pub matched: u64,
}

/// Store failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("document in '{collection}' could not be decoded: {source}")]
    Decode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("document for '{collection}' could not be encoded: {reason}")]
    Encode { collection: String, reason: String },

    #[error("field '{field}' in '{collection}' is not a list")]
    NotAList { collection: String, field: String },
}

impl StoreError {
    pub fn backend(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(error))
    }
}

/// One named collection of documents.
#[async_trait]
pub trait Collection: Send + Sync {
    fn name(&self) -> &str;

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, StoreError>;

    /// Matching documents in insertion order, windowed.
    async fn find(&self, filter: &Filter, page: Pagination) -> Result<Vec<Document>, StoreError>;

    /// Number of matches, stopping at `limit` when given.
    async fn count(&self, filter: &Filter, limit: Option<u64>) -> Result<u64, StoreError>;

    /// Insert and return the generated handle. Any `_id` in `doc` is replaced.
    async fn insert_one(&self, doc: Document) -> Result<ObjectId, StoreError>;

    /// Apply `update` to the first match.
    async fn update_one(&self, filter: &Filter, update: &Update)
        -> Result<UpdateOutcome, StoreError>;

    /// Delete the first match, returning how many were deleted.
    async fn delete_one(&self, filter: &Filter) -> Result<u64, StoreError>;
}

/// Process-wide store handle.
pub trait DocumentStore: Send + Sync {
    fn collection(&self, name: &str) -> Arc<dyn Collection>;
}
