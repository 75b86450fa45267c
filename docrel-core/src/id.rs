//! Document identifiers
//!
//! Two stages:
//! - [`CandidateId`]: an external string that is syntactically a valid handle.
//!   Produced by validation, never touches the store.
//! - [`ObjectId`]: a live internal handle. Obtained from the store (insert results,
//!   decoded documents) or from [`crate::resolve::ReferenceResolver`] once the
//!   referenced document is confirmed to exist.
//!
//! The external form is the lowercase hyphenated UUID. Only that exact form is
//! accepted, so `external -> internal -> external` yields the identical string.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::ValidationError;

/// Store-generated handle of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Fresh handle. Only stores call this.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a handle produced by a store backend.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// External string form.
    pub fn to_external(&self) -> String {
        self.0.hyphenated().to_string()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Syntactically valid external identifier, existence unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CandidateId(Uuid);

impl CandidateId {
    /// Parse an external identifier.
    ///
    /// # Example
    /// ```
    /// use docrel_core::id::CandidateId;
    ///
    /// assert!(CandidateId::parse("6f1c2a3e-8d0b-4e4f-9a51-2b7c9d0e1f23").is_ok());
    /// assert!(CandidateId::parse("6F1C2A3E-8D0B-4E4F-9A51-2B7C9D0E1F23").is_err()); // not canonical
    /// assert!(CandidateId::parse("not-an-id").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let uuid = Uuid::parse_str(s).map_err(|e| ValidationError::InvalidId {
            reason: e.to_string(),
        })?;

        if uuid.hyphenated().to_string() != s {
            return Err(ValidationError::InvalidId {
                reason: "must be a lowercase hyphenated UUID".to_owned(),
            });
        }

        Ok(Self(uuid))
    }

    /// The handle this candidate would name, without any existence claim.
    ///
    /// Used for filters on read paths, where a missing document simply matches nothing.
    pub fn handle(&self) -> ObjectId {
        ObjectId(self.0)
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl From<ObjectId> for CandidateId {
    fn from(id: ObjectId) -> Self {
        Self(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_round_trip() {
        let id = ObjectId::generate();
        let external = id.to_external();
        let candidate = CandidateId::parse(&external).unwrap();
        assert_eq!(candidate.handle(), id);
        assert_eq!(candidate.to_string(), external);
    }

    #[test]
    fn rejects_simple_form() {
        let id = ObjectId::generate();
        let simple = id.as_uuid().simple().to_string();
        let err = CandidateId::parse(&simple).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidId { .. }));
    }

    #[test]
    fn rejects_garbage() {
        assert!(CandidateId::parse("").is_err());
        assert!(CandidateId::parse("123").is_err());
        assert!(CandidateId::parse("zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz").is_err());
    }

    #[test]
    fn serializes_as_string() {
        let id = ObjectId::generate();
        let value = serde_json::to_value(id).unwrap();
        assert_eq!(value, serde_json::Value::String(id.to_external()));
    }
}
