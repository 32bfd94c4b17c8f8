//! Core types and traits for the Fathom repository layer
//!
//! This crate defines the foundational types used throughout the system:
//! - Routing: `NamespaceName`, `SubNamespaceName`, `NamespaceSpec`, `KeyspaceRef`
//! - Options: `QueryOptions`, `WriteOptions`, the tagged `CallOptions` sum type
//! - Consistency: `ScanConsistency`, `ConsistencyVector`, `VersionToken`
//! - Error: the repository error taxonomy
//! - Traits: the external collaborator seams (`StoreClient`, `EntityMapper`)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod options;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use options::{
    CallOptions, DurabilityLevel, ProfileMode, QueryOptions, ScanConsistency, WriteOptions,
};
pub use traits::{EntityMapper, StoreClient};
pub use types::{
    ConsistencyToken, ConsistencyVector, EntityInfo, KeyspaceRef, NamespaceName, NamespaceSpec,
    SubNamespaceName, SubNamespaceSpec, VersionToken, DEFAULT_NAME,
};
