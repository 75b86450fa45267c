//! Relation lookups shared by both domains
//!
//! Two storage conventions exist, and every relation names which side is
//! authoritative:
//! - reference: the child stores one handle to its parent (`Car.dealerID`).
//!   Parent -> children is derived with [`referencing`]; child -> parent is
//!   [`referenced`].
//! - list: the owner stores a list of handles (`Salesperson.carIDs`).
//!   Owner -> members is [`listed`]; member -> owners is derived with [`containing`].
//!
//! A handle pointing at a document that no longer exists is skipped (lists) or read
//! as absent (references). It is never an error.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::id::ObjectId;
use crate::mapper::{Records, Stored};
use crate::pagination::Pagination;
use crate::store::{Filter, StoreError};

/// Documents whose reference `field` points at `id`.
pub async fn referencing<T>(
    records: &Records<T>,
    field: &str,
    id: ObjectId,
) -> Result<Vec<Stored<T>>, StoreError>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    records
        .find(&Filter::eq(field, id), Pagination::unbounded())
        .await
}

/// Documents whose list `field` contains `id`.
pub async fn containing<T>(
    records: &Records<T>,
    field: &str,
    id: ObjectId,
) -> Result<Vec<Stored<T>>, StoreError>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    records
        .find(&Filter::contains(field, id), Pagination::unbounded())
        .await
}

/// The documents a list of handles names, fetched in one query.
///
/// Output follows list order, and a handle listed twice yields its document twice.
pub async fn listed<T>(records: &Records<T>, ids: &[ObjectId]) -> Result<Vec<Stored<T>>, StoreError>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut distinct: Vec<ObjectId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !distinct.contains(id) {
            distinct.push(*id);
        }
    }

    let found = records
        .find(&Filter::IdIn(distinct), Pagination::unbounded())
        .await?;

    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        match found.iter().find(|record| record.id == *id) {
            Some(record) => out.push(record.clone()),
            None => warn!(collection = records.raw().name(), %id, "dangling list entry"),
        }
    }
    Ok(out)
}

/// The document a reference names, or `None` when unset or dangling.
pub async fn referenced<T>(
    records: &Records<T>,
    id: Option<ObjectId>,
) -> Result<Option<Stored<T>>, StoreError>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    let Some(id) = id else {
        return Ok(None);
    };

    let record = records.get(id).await?;
    if record.is_none() {
        warn!(collection = records.raw().name(), %id, "dangling reference");
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DocumentStore, MemoryStore};
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        label: String,
    }

    async fn items(labels: &[&str]) -> (Records<Item>, Vec<ObjectId>) {
        let store = MemoryStore::new();
        let records = Records::new(store.collection("Items"));
        let mut ids = Vec::new();
        for label in labels {
            let stored = records
                .insert(Item {
                    label: label.to_string(),
                })
                .await
                .unwrap();
            ids.push(stored.id);
        }
        (records, ids)
    }

    #[tokio::test]
    async fn listed_keeps_order_and_repeats() {
        let (records, ids) = items(&["a", "b"]).await;
        let wanted = [ids[1], ids[0], ids[1]];

        let labels: Vec<_> = listed(&records, &wanted)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.body.label)
            .collect();
        assert_eq!(labels, vec!["b", "a", "b"]);
    }

    #[tokio::test]
    async fn listed_skips_dangling() {
        let (records, ids) = items(&["a"]).await;
        let found = listed(&records, &[ObjectId::generate(), ids[0]]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, ids[0]);
    }

    #[tokio::test]
    async fn referenced_tolerates_missing() {
        let (records, ids) = items(&["a"]).await;
        assert!(referenced(&records, None).await.unwrap().is_none());
        assert!(referenced(&records, Some(ObjectId::generate())).await.unwrap().is_none());
        assert_eq!(
            referenced(&records, Some(ids[0])).await.unwrap().unwrap().body.label,
            "a"
        );
    }
}
