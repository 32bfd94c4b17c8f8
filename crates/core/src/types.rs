//! Routing and metadata types.
//!
//! A query or mutation targets a two-level routing address inside the store:
//! an outer [`NamespaceName`] and an inner [`SubNamespaceName`]. Both have a
//! store-implicit default; a default/default pair is equivalent to sending no
//! routing context at all.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the store's implicit default namespace and sub-namespace.
pub const DEFAULT_NAME: &str = "_default";

/// Outer routing namespace name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NamespaceName(String);

impl NamespaceName {
    /// Wrap a namespace name.
    pub fn new(name: impl Into<String>) -> Self {
        NamespaceName(name.into())
    }

    /// The raw name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this is the store's implicit default namespace.
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_NAME
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NamespaceName {
    fn from(s: &str) -> Self {
        NamespaceName::new(s)
    }
}

/// Inner routing sub-namespace name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubNamespaceName(String);

impl SubNamespaceName {
    /// Wrap a sub-namespace name.
    pub fn new(name: impl Into<String>) -> Self {
        SubNamespaceName(name.into())
    }

    /// The raw name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this is the store's implicit default sub-namespace.
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_NAME
    }
}

impl fmt::Display for SubNamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubNamespaceName {
    fn from(s: &str) -> Self {
        SubNamespaceName::new(s)
    }
}

/// Structured namespace declaration with its known sub-namespace members.
///
/// When a query carries both an explicit sub-namespace and a structured
/// namespace, the sub-namespace must be one of the declared members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceSpec {
    /// Namespace name.
    pub name: NamespaceName,
    /// Known sub-namespace member names. Empty means "members unknown",
    /// which disables the membership check.
    pub members: BTreeSet<String>,
}

impl NamespaceSpec {
    /// Declare a namespace with no known members.
    pub fn new(name: impl Into<String>) -> Self {
        NamespaceSpec {
            name: NamespaceName::new(name),
            members: BTreeSet::new(),
        }
    }

    /// Declare a namespace with known sub-namespace members.
    pub fn with_members<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NamespaceSpec {
            name: NamespaceName::new(name),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `sub` is an allowed member of this namespace.
    ///
    /// Namespaces with an empty member set accept any sub-namespace.
    pub fn contains(&self, sub: &SubNamespaceName) -> bool {
        self.members.is_empty() || self.members.contains(sub.as_str())
    }
}

/// Structured sub-namespace declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubNamespaceSpec {
    /// Sub-namespace name.
    pub name: SubNamespaceName,
}

impl SubNamespaceSpec {
    /// Declare a sub-namespace.
    pub fn new(name: impl Into<String>) -> Self {
        SubNamespaceSpec {
            name: SubNamespaceName::new(name),
        }
    }
}

/// The routing context handed to the store client with each request.
///
/// `None`/`None` means "no explicit routing" — the client executes against
/// its connection defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyspaceRef {
    /// Effective namespace, if any.
    pub namespace: Option<NamespaceName>,
    /// Effective sub-namespace, if any.
    pub sub_namespace: Option<SubNamespaceName>,
}

impl KeyspaceRef {
    /// An unset routing context.
    pub fn unset() -> Self {
        KeyspaceRef::default()
    }

    /// A fully specified routing context.
    pub fn of(namespace: NamespaceName, sub_namespace: SubNamespaceName) -> Self {
        KeyspaceRef {
            namespace: Some(namespace),
            sub_namespace: Some(sub_namespace),
        }
    }

    /// True if no routing context is set.
    pub fn is_unset(&self) -> bool {
        self.namespace.is_none() && self.sub_namespace.is_none()
    }
}

/// Consistency token for a single partition, produced by a mutation ack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyToken {
    /// Partition the mutation landed on.
    pub partition: u16,
    /// Epoch identifier of the partition.
    pub partition_uuid: u64,
    /// Sequence number of the mutation within the partition.
    pub sequence: u64,
}

/// A set of consistency tokens a read can be bounded by ("at plus").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyVector(pub Vec<ConsistencyToken>);

impl ConsistencyVector {
    /// Build a vector from mutation tokens.
    pub fn from_tokens(tokens: impl IntoIterator<Item = ConsistencyToken>) -> Self {
        ConsistencyVector(tokens.into_iter().collect())
    }

    /// True if the vector carries no tokens.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Acknowledgement of a mutation: the new version plus an optional
/// consistency token usable for vector-bounded reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionToken {
    /// Compare-and-swap version of the document after the mutation.
    pub cas: u64,
    /// Consistency token, when the store reports one.
    pub token: Option<ConsistencyToken>,
}

/// Entity metadata resolved by the external mapping collaborator.
///
/// The statement builder uses `type_key`/`type_value` for the discriminator
/// filter; the save dispatcher reads `version_field` off the encoded
/// document to decide between insert-or-upsert and replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInfo {
    /// Document field holding the stored type discriminator.
    pub type_key: String,
    /// Discriminator value for this entity type.
    pub type_value: String,
    /// Document field holding the entity id.
    pub id_field: String,
    /// Document field holding the optimistic-locking version, if the entity
    /// type declares one.
    pub version_field: Option<String>,
}

impl EntityInfo {
    /// Metadata with the conventional `_type` discriminator key.
    pub fn new(type_value: impl Into<String>) -> Self {
        EntityInfo {
            type_key: "_type".to_string(),
            type_value: type_value.into(),
            id_field: "id".to_string(),
            version_field: None,
        }
    }

    /// Override the version field name.
    pub fn versioned(mut self, field: impl Into<String>) -> Self {
        self.version_field = Some(field.into());
        self
    }
}
