//! Error types for docrel-core
//!
//! Three outcomes reach callers:
//! - validation failures, reported before any store access
//! - a referenced entity that doesn't exist, reported before any write
//! - everything else, which callers must not echo back

use thiserror::Error;

use crate::entity::EntityKind;
use crate::store::StoreError;
use crate::validation::{ValidationError, ValidationErrors};

#[derive(Error, Debug)]
pub enum CoreError {
    /// Input broke one or more constraints
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// A referenced entity doesn't exist
    #[error("{kind} not found")]
    NotFound { kind: EntityKind },

    /// A listing matched nothing where emptiness is reported as absence
    #[error("no {} found", .kind.plural())]
    NoMatches { kind: EntityKind },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("password hashing failed: {reason}")]
    PasswordHash { reason: String },
}

/// Result type alias for docrel-core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn not_found(kind: EntityKind) -> Self {
        Self::NotFound { kind }
    }

    /// Validation failure on a single field.
    pub fn invalid_field(field: impl Into<String>, error: ValidationError) -> Self {
        Self::Validation(ValidationErrors::field(field, error))
    }

    /// Caller-side problem (validation or not-found), as opposed to a server fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound { .. } | Self::NoMatches { .. }
        )
    }
}
