//! Error types for the repository layer.
//!
//! All errors raised by the resolver, the statement builder and the facade
//! are represented by the [`Error`] enum. These errors are:
//! - **Structured**: each variant has typed fields for error details
//! - **Serializable**: can be converted to/from JSON
//! - **Final**: none of them are retried internally — they represent
//!   caller-side misuse, not transient failures
//!
//! Transient store-level failures (timeouts, index errors) are not produced
//! here; they arrive from the external store client and are passed through
//! unmodified as [`Error::Store`].

use serde::{Deserialize, Serialize};

/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Repository layer errors.
///
/// # Categories
///
/// | Category | Variants | Description |
/// |----------|----------|-------------|
/// | Dispatch | `NoSuchOperation`, `AmbiguousContextArgument` | Call resolution failed |
/// | Statement | `UnsupportedSort`, `ParameterKindConflict` | Statement assembly failed |
/// | Routing | `NamespaceMismatch` | Keyspace resolution failed |
/// | Input | `InvalidInput`, `Serialization` | Bad caller input |
/// | Pass-through | `Store`, `DocumentNotFound` | Surfaced from the store client |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Dispatch ====================
    /// Call resolution exhausted all candidate signatures.
    ///
    /// `probes` carries one entry per attempted signature so callers can see
    /// every lookup that was tried.
    #[error("no such operation: {method} ({} probes failed)", probes.len())]
    NoSuchOperation { method: String, probes: Vec<String> },

    /// More than one argument of the same context kind was supplied
    /// positionally on a single call.
    #[error("ambiguous context argument: {kind} supplied more than once")]
    AmbiguousContextArgument { kind: String },

    // ==================== Statement assembly ====================
    /// Case-insensitive ordering was requested; the statement dialect has no
    /// rendering for it, so this fails before any statement text is built.
    #[error("unsupported sort: ignore-case ordering requested for {property}")]
    UnsupportedSort { property: String },

    /// Positional and named parameters were mixed on one query.
    #[error("parameter kind conflict: {detail}")]
    ParameterKindConflict { detail: String },

    // ==================== Routing ====================
    /// An explicit sub-namespace is not a member of the declared namespace.
    #[error("namespace mismatch: {sub_namespace} is not a member of {namespace}")]
    NamespaceMismatch {
        namespace: String,
        sub_namespace: String,
    },

    // ==================== Input ====================
    /// Invalid caller input.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Document encode/decode failure from the mapping collaborator.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    // ==================== Pass-through ====================
    /// Document not found by id.
    #[error("document not found: {id}")]
    DocumentNotFound { id: String },

    /// Error surfaced unmodified from the external store client.
    #[error("store error: {reason}")]
    Store { reason: String },
}

impl Error {
    /// Shorthand for an [`Error::InvalidInput`].
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`Error::Store`] pass-through.
    pub fn store(reason: impl Into<String>) -> Self {
        Error::Store {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization {
            reason: e.to_string(),
        }
    }
}
