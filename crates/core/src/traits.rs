//! External collaborator traits.
//!
//! The repository layer does not talk to the network or map documents
//! itself. Two collaborators are consumed by contract only:
//!
//! - [`StoreClient`]: executes statements and key-level mutations against
//!   the document store, owns the wire protocol and the actual network
//!   deadlines.
//! - [`EntityMapper`]: converts between in-memory entities and stored
//!   documents and resolves per-type metadata.

use serde_json::Value;

use crate::error::Result;
use crate::options::{QueryOptions, WriteOptions};
use crate::types::{EntityInfo, KeyspaceRef, VersionToken};

/// Client connection to the document store.
///
/// Implementations are expected to be `Send + Sync`; repository facades are
/// shared across threads and issue calls concurrently. Errors returned here
/// are passed through to callers unmodified.
pub trait StoreClient: Send + Sync {
    /// Name of the store this client is connected to. Used as the root of
    /// the statement keyspace.
    fn store_name(&self) -> &str;

    /// The connection's current namespace, used when a sub-namespace is
    /// resolved without an accompanying namespace.
    fn current_namespace(&self) -> &str;

    /// Execute a query statement, returning the decoded row stream.
    fn query(
        &self,
        statement: &str,
        options: &QueryOptions,
        keyspace: &KeyspaceRef,
    ) -> Result<Vec<Value>>;

    /// Fetch a document by id. `Ok(None)` when the document does not exist.
    /// The options bundle carries the common per-request settings (timeout,
    /// consistency) of the originating call.
    fn get(&self, id: &str, options: &QueryOptions, keyspace: &KeyspaceRef)
        -> Result<Option<Value>>;

    /// Existence probe by id.
    fn exists(&self, id: &str, options: &QueryOptions, keyspace: &KeyspaceRef) -> Result<bool>;

    /// Insert-or-update a document.
    fn upsert(
        &self,
        id: &str,
        document: &Value,
        options: &WriteOptions,
        keyspace: &KeyspaceRef,
    ) -> Result<VersionToken>;

    /// Replace an existing document.
    fn replace(
        &self,
        id: &str,
        document: &Value,
        options: &WriteOptions,
        keyspace: &KeyspaceRef,
    ) -> Result<VersionToken>;

    /// Remove a document by id.
    fn remove(&self, id: &str, options: &WriteOptions, keyspace: &KeyspaceRef)
        -> Result<VersionToken>;
}

impl<S: StoreClient + ?Sized> StoreClient for std::sync::Arc<S> {
    fn store_name(&self) -> &str {
        (**self).store_name()
    }

    fn current_namespace(&self) -> &str {
        (**self).current_namespace()
    }

    fn query(
        &self,
        statement: &str,
        options: &QueryOptions,
        keyspace: &KeyspaceRef,
    ) -> Result<Vec<Value>> {
        (**self).query(statement, options, keyspace)
    }

    fn get(
        &self,
        id: &str,
        options: &QueryOptions,
        keyspace: &KeyspaceRef,
    ) -> Result<Option<Value>> {
        (**self).get(id, options, keyspace)
    }

    fn exists(&self, id: &str, options: &QueryOptions, keyspace: &KeyspaceRef) -> Result<bool> {
        (**self).exists(id, options, keyspace)
    }

    fn upsert(
        &self,
        id: &str,
        document: &Value,
        options: &WriteOptions,
        keyspace: &KeyspaceRef,
    ) -> Result<VersionToken> {
        (**self).upsert(id, document, options, keyspace)
    }

    fn replace(
        &self,
        id: &str,
        document: &Value,
        options: &WriteOptions,
        keyspace: &KeyspaceRef,
    ) -> Result<VersionToken> {
        (**self).replace(id, document, options, keyspace)
    }

    fn remove(
        &self,
        id: &str,
        options: &WriteOptions,
        keyspace: &KeyspaceRef,
    ) -> Result<VersionToken> {
        (**self).remove(id, options, keyspace)
    }
}

/// Conversion layer between entities and stored documents.
///
/// The repository never inspects entity types directly; id, version and
/// discriminator handling all go through the mapper.
pub trait EntityMapper<T>: Send + Sync {
    /// Per-type metadata (discriminator key/value, id and version fields).
    fn info(&self) -> &EntityInfo;

    /// Encode an entity into its stored document form. The discriminator
    /// field is expected to be present in the output.
    fn to_document(&self, entity: &T) -> Result<Value>;

    /// Decode a stored document into an entity.
    fn from_document(&self, document: Value) -> Result<T>;

    /// The entity's id.
    fn id_of(&self, entity: &T) -> Result<String>;

    /// The entity's optimistic-locking version, if the type declares one
    /// and the value is set.
    fn version_of(&self, entity: &T) -> Option<u64>;
}
