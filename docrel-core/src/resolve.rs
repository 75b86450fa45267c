//! Reference resolution
//!
//! Turns a [`CandidateId`] into a live [`ObjectId`] once the referenced document is
//! known to exist. Existence costs one `count` with limit 1; the document itself is
//! never fetched.

use std::sync::Arc;

use tracing::debug;

use crate::entity::EntityKind;
use crate::error::{CoreError, Result};
use crate::id::{CandidateId, ObjectId};
use crate::store::{DocumentStore, Filter};

/// Confirms references against the store.
#[derive(Clone)]
pub struct ReferenceResolver {
    store: Arc<dyn DocumentStore>,
}

impl ReferenceResolver {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Whether a document of `kind` with this handle exists.
    pub async fn exists(&self, kind: EntityKind, id: ObjectId) -> Result<bool> {
        let n = self
            .store
            .collection(kind.collection())
            .count(&Filter::Id(id), Some(1))
            .await?;
        Ok(n > 0)
    }

    /// Resolve one reference or fail with not-found naming `kind`.
    pub async fn resolve(&self, kind: EntityKind, candidate: CandidateId) -> Result<ObjectId> {
        let id = candidate.handle();
        if !self.exists(kind, id).await? {
            debug!(kind = %kind, id = %candidate, "reference does not resolve");
            return Err(CoreError::not_found(kind));
        }
        Ok(id)
    }

    pub async fn resolve_optional(
        &self,
        kind: EntityKind,
        candidate: Option<CandidateId>,
    ) -> Result<Option<ObjectId>> {
        match candidate {
            Some(candidate) => self.resolve(kind, candidate).await.map(Some),
            None => Ok(None),
        }
    }

    /// Resolve a batch in one round trip.
    ///
    /// Repeated candidates are checked once. The result holds each distinct handle
    /// once, in first-seen order.
    pub async fn resolve_all(
        &self,
        kind: EntityKind,
        candidates: &[CandidateId],
    ) -> Result<Vec<ObjectId>> {
        let mut ids: Vec<ObjectId> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let id = candidate.handle();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        if ids.is_empty() {
            return Ok(ids);
        }

        let wanted = ids.len() as u64;
        let found = self
            .store
            .collection(kind.collection())
            .count(&Filter::IdIn(ids.clone()), Some(wanted))
            .await?;

        if found != wanted {
            debug!(kind = %kind, wanted, found, "batch reference does not resolve");
            return Err(CoreError::not_found(kind));
        }
        Ok(ids)
    }
}
