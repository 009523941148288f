//! Error taxonomy shared by every compliance engine
//!
//! Absence of a match or trigger is never an error; those outcomes are
//! typed `false`/`None` results. Errors carry enough context (field name,
//! conflicting id, current state) for the caller to act without re-reading
//! the store.

use thiserror::Error;
use uuid::Uuid;

/// Compliance engine error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed or missing required input; the caller's fault, never retried
    #[error("validation failed on `{field}`: {message}")]
    Validation {
        /// Input field that failed validation
        field: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// A uniqueness constraint already holds for another record; the caller
    /// should read the referenced entity and merge rather than retry
    #[error("conflict on {resource}: existing record {existing_id}")]
    Conflict {
        /// Resource kind (e.g. "customer", "investigation")
        resource: &'static str,
        /// Identity of the record that already holds the constraint
        existing_id: Uuid,
    },

    /// Operation not legal in the entity's current state
    #[error("invalid state for {operation}: currently {current}")]
    InvalidState {
        /// Operation that was attempted
        operation: &'static str,
        /// State the entity was found in
        current: String,
    },

    /// Malformed regional calendar or thresholds; fatal, surfaces at startup
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A screening source could not produce its snapshot; non-fatal,
    /// screening proceeds with the remaining sources
    #[error("screening source unavailable: {source_name}")]
    SourceUnavailable {
        /// Name of the unavailable source
        source_name: String,
    },

    /// A regulator report payload could not be serialized
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Underlying repository failure
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Validation error for a named input field
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }

    /// Conflict referencing the record that already exists
    pub fn conflict(resource: &'static str, existing_id: Uuid) -> Self {
        Error::Conflict {
            resource,
            existing_id,
        }
    }

    /// Invalid-state error naming the attempted operation
    pub fn invalid_state(operation: &'static str, current: impl Into<String>) -> Self {
        Error::InvalidState {
            operation,
            current: current.into(),
        }
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
