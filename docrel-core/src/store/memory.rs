//! In-memory document store
//!
//! Backs tests and `docrel serve --memory`. Each collection is a vector of documents
//! in insertion order behind a `tokio` lock. Every call takes the lock once, so a
//! single call is atomic just like a real backend's single-document operation.
//!
//! Calls are recorded in a journal so tests can check which round trips an
//! operation issued.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Collection, Document, DocumentStore, Filter, StoreError, Update, UpdateOutcome, ID_FIELD};
use crate::id::ObjectId;
use crate::pagination::Pagination;

/// Kind of a recorded store call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FindOne,
    Find,
    Count,
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Insert | Self::Update | Self::Delete)
    }
}

/// One journal entry: collection name and call kind.
pub type JournalEntry = (String, Operation);

type Journal = Arc<Mutex<Vec<JournalEntry>>>;

/// In-memory [`DocumentStore`]
#[derive(Default, Clone)]
pub struct MemoryStore {
    collections: Arc<Mutex<HashMap<String, Arc<MemoryCollection>>>>,
    journal: Journal,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call issued so far, oldest first.
    pub fn journal(&self) -> Vec<JournalEntry> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget recorded calls.
    pub fn clear_journal(&self) {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of writes recorded so far.
    pub fn write_count(&self) -> usize {
        self.journal().iter().filter(|(_, op)| op.is_write()).count()
    }
}

impl DocumentStore for MemoryStore {
    fn collection(&self, name: &str) -> Arc<dyn Collection> {
        let mut collections = self
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        collections
            .entry(name.to_owned())
            .or_insert_with(|| {
                Arc::new(MemoryCollection {
                    name: name.to_owned(),
                    docs: RwLock::new(Vec::new()),
                    journal: Arc::clone(&self.journal),
                })
            })
            .clone()
    }
}

/// One in-memory collection
pub struct MemoryCollection {
    name: String,
    docs: RwLock<Vec<Document>>,
    journal: Journal,
}

impl MemoryCollection {
    fn record(&self, op: Operation) {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((self.name.clone(), op));
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn id_of(doc: &Document) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}

fn matches(doc: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::All => true,
        Filter::Id(id) => id_of(doc) == Some(id.to_external().as_str()),
        Filter::IdIn(ids) => id_of(doc).is_some_and(|own| ids.iter().any(|id| id.to_external() == own)),
        Filter::Eq(field, Value::Null) => doc.get(field).map_or(true, Value::is_null),
        Filter::Eq(field, value) => doc.get(field).is_some_and(|v| values_equal(v, value)),
        Filter::Contains(field, value) => doc
            .get(field)
            .and_then(Value::as_array)
            .is_some_and(|items| items.iter().any(|item| values_equal(item, value))),
        Filter::Range { field, min, max } => {
            let Some(n) = doc.get(field).and_then(Value::as_f64) else {
                return false;
            };
            min.map_or(true, |min| n >= min) && max.map_or(true, |max| n <= max)
        }
        Filter::And(filters) => filters.iter().all(|f| matches(doc, f)),
    }
}

#[async_trait]
impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, StoreError> {
        self.record(Operation::FindOne);
        let docs = self.docs.read().await;
        Ok(docs.iter().find(|doc| matches(doc, filter)).cloned())
    }

    async fn find(&self, filter: &Filter, page: Pagination) -> Result<Vec<Document>, StoreError> {
        self.record(Operation::Find);
        let docs = self.docs.read().await;
        Ok(page.apply(docs.iter().filter(|doc| matches(doc, filter)).cloned()))
    }

    async fn count(&self, filter: &Filter, limit: Option<u64>) -> Result<u64, StoreError> {
        self.record(Operation::Count);
        let docs = self.docs.read().await;
        let matching = docs.iter().filter(|doc| matches(doc, filter));
        let count = match limit {
            Some(limit) => matching.take(usize::try_from(limit).unwrap_or(usize::MAX)).count(),
            None => matching.count(),
        };
        Ok(count as u64)
    }

    async fn insert_one(&self, mut doc: Document) -> Result<ObjectId, StoreError> {
        self.record(Operation::Insert);
        let id = ObjectId::generate();
        doc.insert(ID_FIELD.to_owned(), Value::String(id.to_external()));
        self.docs.write().await.push(doc);
        Ok(id)
    }

    async fn update_one(
        &self,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateOutcome, StoreError> {
        self.record(Operation::Update);
        let mut docs = self.docs.write().await;
        let Some(doc) = docs.iter_mut().find(|doc| matches(doc, filter)) else {
            return Ok(UpdateOutcome { matched: 0 });
        };

        match update {
            Update::Set { field, value } => {
                doc.insert(field.clone(), value.clone());
            }
            Update::Push { field, value } => {
                let slot = doc
                    .entry(field.clone())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if slot.is_null() {
                    *slot = Value::Array(Vec::new());
                }
                match slot.as_array_mut() {
                    Some(items) => items.push(value.clone()),
                    None => {
                        return Err(StoreError::NotAList {
                            collection: self.name.clone(),
                            field: field.clone(),
                        })
                    }
                }
            }
        }

        Ok(UpdateOutcome { matched: 1 })
    }

    async fn delete_one(&self, filter: &Filter) -> Result<u64, StoreError> {
        self.record(Operation::Delete);
        let mut docs = self.docs.write().await;
        match docs.iter().position(|doc| matches(doc, filter)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test document must be an object"),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id() {
        let store = MemoryStore::new();
        let cars = store.collection("cars");
        let id = cars.insert_one(doc(json!({ "model": "Civic" }))).await.unwrap();

        let found = cars.find_one(&Filter::Id(id)).await.unwrap().unwrap();
        assert_eq!(found[ID_FIELD], json!(id.to_external()));
        assert_eq!(found["model"], json!("Civic"));
    }

    #[tokio::test]
    async fn same_name_same_collection() {
        let store = MemoryStore::new();
        store
            .collection("cars")
            .insert_one(doc(json!({ "model": "Civic" })))
            .await
            .unwrap();
        let count = store.collection("cars").count(&Filter::All, None).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn count_respects_limit() {
        let store = MemoryStore::new();
        let cars = store.collection("cars");
        for _ in 0..3 {
            cars.insert_one(doc(json!({ "model": "Civic" }))).await.unwrap();
        }
        assert_eq!(cars.count(&Filter::All, Some(1)).await.unwrap(), 1);
        assert_eq!(cars.count(&Filter::All, None).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn filters() {
        let store = MemoryStore::new();
        let cars = store.collection("cars");
        let a = cars
            .insert_one(doc(json!({ "price": 100.0, "dealerID": null, "tags": ["x"] })))
            .await
            .unwrap();
        let b = cars
            .insert_one(doc(json!({ "price": 200, "tags": ["y", "x"] })))
            .await
            .unwrap();

        let all = Pagination::unbounded();
        assert_eq!(cars.find(&Filter::eq("price", 200.0), all).await.unwrap().len(), 1);
        assert_eq!(cars.find(&Filter::eq("dealerID", Value::Null), all).await.unwrap().len(), 2);
        assert_eq!(cars.find(&Filter::contains("tags", "x"), all).await.unwrap().len(), 2);
        assert_eq!(cars.find(&Filter::contains("tags", "y"), all).await.unwrap().len(), 1);
        assert_eq!(cars.find(&Filter::IdIn(vec![a, b]), all).await.unwrap().len(), 2);

        let range = Filter::Range {
            field: "price".into(),
            min: Some(150.0),
            max: None,
        };
        let found = cars.find(&range, all).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0][ID_FIELD], json!(b.to_external()));
    }

    #[tokio::test]
    async fn push_creates_and_appends() {
        let store = MemoryStore::new();
        let people = store.collection("salespeople");
        let id = people.insert_one(doc(json!({ "name": "Ana" }))).await.unwrap();

        let filter = Filter::Id(id);
        people.update_one(&filter, &Update::push("carIDs", "a")).await.unwrap();
        people.update_one(&filter, &Update::push("carIDs", "a")).await.unwrap();

        let found = people.find_one(&filter).await.unwrap().unwrap();
        assert_eq!(found["carIDs"], json!(["a", "a"]));
    }

    #[tokio::test]
    async fn push_to_scalar_fails() {
        let store = MemoryStore::new();
        let people = store.collection("salespeople");
        let id = people.insert_one(doc(json!({ "name": "Ana" }))).await.unwrap();

        let err = people
            .update_one(&Filter::Id(id), &Update::push("name", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotAList { .. }));
    }

    #[tokio::test]
    async fn update_without_match() {
        let store = MemoryStore::new();
        let people = store.collection("salespeople");
        let outcome = people
            .update_one(&Filter::Id(ObjectId::generate()), &Update::set("name", "x"))
            .await
            .unwrap();
        assert_eq!(outcome.matched, 0);
    }

    #[tokio::test]
    async fn delete_one_removes_first_match() {
        let store = MemoryStore::new();
        let users = store.collection("users");
        let id = users.insert_one(doc(json!({ "name": "Ana" }))).await.unwrap();

        assert_eq!(users.delete_one(&Filter::Id(id)).await.unwrap(), 1);
        assert_eq!(users.delete_one(&Filter::Id(id)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn journal_records_calls() {
        let store = MemoryStore::new();
        let users = store.collection("users");
        users.count(&Filter::All, Some(1)).await.unwrap();
        users.insert_one(Document::new()).await.unwrap();

        assert_eq!(
            store.journal(),
            vec![
                ("users".to_owned(), Operation::Count),
                ("users".to_owned(), Operation::Insert),
            ]
        );
        assert_eq!(store.write_count(), 1);
        store.clear_journal();
        assert!(store.journal().is_empty());
    }
}
