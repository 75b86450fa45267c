//! Storage <-> external mapping
//!
//! Storage shape is `_id` plus the document body, with references kept as handles
//! under their storage names (`dealerID`, `carIDs`, ...). [`Stored`] carries that
//! shape; [`Records`] is a typed view over a raw [`Collection`] that encodes and
//! decodes it. External types convert from `Stored<_>` in each domain's `model`
//! module and never see the handle except as its string form.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::CoreError;
use crate::id::{CandidateId, ObjectId};
use crate::pagination::Pagination;
use crate::store::{Collection, Document, Filter, StoreError, Update, UpdateOutcome, ID_FIELD};

/// A document body together with its handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<T> {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(flatten)]
    pub body: T,
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::String(id.to_external())
    }
}

/// Storage value of an optional reference.
pub fn reference_value(id: Option<ObjectId>) -> Value {
    id.map_or(Value::Null, Value::from)
}

/// JSON number for `n`, integral when `n` is whole and fits in an `i64`.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

/// `serialize_with` form of [`number_value`].
pub fn serialize_number<S: Serializer>(n: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    number_value(*n).serialize(serializer)
}

/// Parse an external id into a candidate, reporting failure against `field`.
pub fn parse_external(field: &str, external: &str) -> Result<CandidateId, CoreError> {
    CandidateId::parse(external).map_err(|e| CoreError::invalid_field(field, e))
}

/// Encode a body for insertion.
pub fn encode<T: Serialize>(collection: &str, body: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(body) {
        Ok(Value::Object(mut map)) => {
            map.remove(ID_FIELD);
            Ok(map)
        }
        Ok(_) => Err(StoreError::Encode {
            collection: collection.to_owned(),
            reason: "body does not serialize to an object".to_owned(),
        }),
        Err(e) => Err(StoreError::Encode {
            collection: collection.to_owned(),
            reason: e.to_string(),
        }),
    }
}

/// Decode a stored document.
pub fn decode<T: DeserializeOwned>(collection: &str, doc: Document) -> Result<Stored<T>, StoreError> {
    serde_json::from_value(Value::Object(doc)).map_err(|source| StoreError::Decode {
        collection: collection.to_owned(),
        source,
    })
}

/// Typed view of a collection.
pub struct Records<T> {
    collection: Arc<dyn Collection>,
    _body: PhantomData<fn() -> T>,
}

impl<T> Clone for Records<T> {
    fn clone(&self) -> Self {
        Self {
            collection: Arc::clone(&self.collection),
            _body: PhantomData,
        }
    }
}

impl<T> Records<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(collection: Arc<dyn Collection>) -> Self {
        Self {
            collection,
            _body: PhantomData,
        }
    }

    pub fn raw(&self) -> &dyn Collection {
        self.collection.as_ref()
    }

    fn name(&self) -> &str {
        self.collection.name()
    }

    pub async fn find_one(&self, filter: &Filter) -> Result<Option<Stored<T>>, StoreError> {
        self.collection
            .find_one(filter)
            .await?
            .map(|doc| decode(self.name(), doc))
            .transpose()
    }

    pub async fn get(&self, id: ObjectId) -> Result<Option<Stored<T>>, StoreError> {
        self.find_one(&Filter::Id(id)).await
    }

    pub async fn find(&self, filter: &Filter, page: Pagination) -> Result<Vec<Stored<T>>, StoreError> {
        self.collection
            .find(filter, page)
            .await?
            .into_iter()
            .map(|doc| decode(self.name(), doc))
            .collect()
    }

    /// Insert `body`; the returned record carries the generated handle.
    pub async fn insert(&self, body: T) -> Result<Stored<T>, StoreError> {
        let doc = encode(self.name(), &body)?;
        let id = self.collection.insert_one(doc).await?;
        Ok(Stored { id, body })
    }

    pub async fn update(&self, id: ObjectId, update: Update) -> Result<UpdateOutcome, StoreError> {
        self.collection.update_one(&Filter::Id(id), &update).await
    }

    pub async fn delete(&self, id: ObjectId) -> Result<u64, StoreError> {
        self.collection.delete_one(&Filter::Id(id)).await
    }
}
