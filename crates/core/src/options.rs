//! Request-execution options bundles.
//!
//! An options bundle is an opaque set of per-request settings (timeout,
//! consistency, serializer, parameters, free-form raw settings) attached to
//! one request. Read-family calls carry a [`QueryOptions`]; the save and
//! delete families carry a [`WriteOptions`]. [`CallOptions`] tags a bundle
//! with the call family it is meant for, so dispatch never has to sniff the
//! bundle's runtime type.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::types::ConsistencyVector;

/// How strongly a read reflects prior writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanConsistency {
    /// No consistency guarantee; the fastest option.
    NotBounded,
    /// The read observes all writes acknowledged before the request.
    RequestPlus,
    /// The read is bounded by an explicit consistency vector.
    AtPlus,
}

impl ScanConsistency {
    /// Wire-level name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanConsistency::NotBounded => "not_bounded",
            ScanConsistency::RequestPlus => "request_plus",
            ScanConsistency::AtPlus => "at_plus",
        }
    }
}

/// Query profiling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileMode {
    /// No profiling output.
    Off,
    /// Per-phase execution counts.
    Phases,
    /// Per-phase execution timings.
    Timings,
}

/// Options bundle for read-family (query) requests.
///
/// Every recognized field is independently optional; unrecognized settings
/// travel in `raw` and are forwarded to the store untouched. Setters consume
/// and return `self` so bundles can be assembled fluently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Whether the statement is ad hoc (not prepared).
    pub adhoc: Option<bool>,
    /// Client-supplied request correlation id.
    pub client_context_id: Option<String>,
    /// Consistency vector for `at_plus` reads.
    pub consistent_with: Option<ConsistencyVector>,
    /// Maximum index-scan parallelism.
    pub max_parallelism: Option<u32>,
    /// Whether to return execution metrics.
    pub metrics: Option<bool>,
    /// Positional statement parameters.
    pub positional_parameters: Option<Vec<Value>>,
    /// Named statement parameters.
    pub named_parameters: Option<BTreeMap<String, Value>>,
    /// Pipeline batch size.
    pub pipeline_batch: Option<u32>,
    /// Profiling mode.
    pub profile: Option<ProfileMode>,
    /// Whether the request is read-only.
    pub readonly: Option<bool>,
    /// Maximum time to wait for index scans to satisfy consistency.
    pub scan_wait: Option<Duration>,
    /// Maximum buffered scan items.
    pub scan_cap: Option<u64>,
    /// Scan consistency mode.
    pub scan_consistency: Option<ScanConsistency>,
    /// Whether to allow serving the query from a full-text-search index.
    pub flex_index: Option<bool>,
    /// Request timeout, forwarded to the store client which owns the actual
    /// network deadline.
    pub timeout: Option<Duration>,
    /// Name of the row serializer to use.
    pub serializer: Option<String>,
    /// Free-form settings forwarded untouched.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub raw: BTreeMap<String, Value>,
}

impl QueryOptions {
    /// An empty options bundle.
    pub fn new() -> Self {
        QueryOptions::default()
    }

    /// Bundle with a generated request correlation id.
    pub fn generated_client_context_id() -> Self {
        QueryOptions::default().client_context_id(Uuid::new_v4().to_string())
    }

    /// Set the ad hoc flag.
    pub fn adhoc(mut self, adhoc: bool) -> Self {
        self.adhoc = Some(adhoc);
        self
    }

    /// Set the client context id.
    pub fn client_context_id(mut self, id: impl Into<String>) -> Self {
        self.client_context_id = Some(id.into());
        self
    }

    /// Bound the read by a consistency vector. Implies `at_plus`.
    pub fn consistent_with(mut self, vector: ConsistencyVector) -> Self {
        self.consistent_with = Some(vector);
        self.scan_consistency = Some(ScanConsistency::AtPlus);
        self
    }

    /// Set maximum scan parallelism.
    pub fn max_parallelism(mut self, n: u32) -> Self {
        self.max_parallelism = Some(n);
        self
    }

    /// Request execution metrics.
    pub fn metrics(mut self, metrics: bool) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Set positional parameters.
    pub fn positional_parameters(mut self, params: Vec<Value>) -> Self {
        self.positional_parameters = Some(params);
        self
    }

    /// Set named parameters.
    pub fn named_parameters(mut self, params: BTreeMap<String, Value>) -> Self {
        self.named_parameters = Some(params);
        self
    }

    /// Set the pipeline batch size.
    pub fn pipeline_batch(mut self, n: u32) -> Self {
        self.pipeline_batch = Some(n);
        self
    }

    /// Set the profiling mode.
    pub fn profile(mut self, mode: ProfileMode) -> Self {
        self.profile = Some(mode);
        self
    }

    /// Mark the request read-only.
    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = Some(readonly);
        self
    }

    /// Set the scan wait bound.
    pub fn scan_wait(mut self, wait: Duration) -> Self {
        self.scan_wait = Some(wait);
        self
    }

    /// Set the scan cap.
    pub fn scan_cap(mut self, cap: u64) -> Self {
        self.scan_cap = Some(cap);
        self
    }

    /// Set the scan consistency mode.
    pub fn scan_consistency(mut self, consistency: ScanConsistency) -> Self {
        self.scan_consistency = Some(consistency);
        self
    }

    /// Allow serving from a full-text-search index.
    pub fn flex_index(mut self, flex: bool) -> Self {
        self.flex_index = Some(flex);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the row serializer.
    pub fn serializer(mut self, name: impl Into<String>) -> Self {
        self.serializer = Some(name.into());
        self
    }

    /// Attach a free-form setting forwarded untouched to the store.
    pub fn raw(mut self, name: impl Into<String>, value: Value) -> Self {
        self.raw.insert(name.into(), value);
        self
    }

    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == QueryOptions::default()
    }
}

/// Durability requirement for mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurabilityLevel {
    /// Acknowledged when received in memory.
    None,
    /// Replicated to a majority of nodes.
    Majority,
    /// Replicated to a majority and persisted on the active node.
    MajorityAndPersistToActive,
    /// Persisted on a majority of nodes.
    PersistToMajority,
}

/// Options bundle for mutation-family (save/delete) requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Request timeout.
    pub timeout: Option<Duration>,
    /// Document expiry.
    pub expiry: Option<Duration>,
    /// Durability requirement.
    pub durability: Option<DurabilityLevel>,
    /// Expected version for compare-and-swap replaces.
    pub cas: Option<u64>,
}

impl WriteOptions {
    /// An empty bundle.
    pub fn new() -> Self {
        WriteOptions::default()
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the document expiry.
    pub fn expiry(mut self, expiry: Duration) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// Set the durability requirement.
    pub fn durability(mut self, level: DurabilityLevel) -> Self {
        self.durability = Some(level);
        self
    }

    /// Set the expected version for compare-and-swap.
    pub fn cas(mut self, cas: u64) -> Self {
        self.cas = Some(cas);
        self
    }
}

/// An options bundle tagged with the call family it targets.
///
/// The tag replaces runtime type probing: a save call either carries an
/// `Upsert` or a `Replace` bundle, a delete call carries a `Remove` bundle,
/// and every read-family call carries a `Query` bundle. The dispatcher
/// checks the tag against the method family instead of hunting for
/// alternate signatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "options", rename_all = "snake_case")]
pub enum CallOptions {
    /// Read-family bundle.
    Query(QueryOptions),
    /// Save bundle requesting insert-or-upsert semantics.
    Upsert(WriteOptions),
    /// Save bundle requesting replace semantics.
    Replace(WriteOptions),
    /// Delete-family bundle.
    Remove(WriteOptions),
}

impl CallOptions {
    /// Name of the options kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            CallOptions::Query(_) => "QueryOptions",
            CallOptions::Upsert(_) => "UpsertOptions",
            CallOptions::Replace(_) => "ReplaceOptions",
            CallOptions::Remove(_) => "RemoveOptions",
        }
    }

    /// The query bundle, if this is a read-family bundle.
    pub fn as_query(&self) -> Option<&QueryOptions> {
        match self {
            CallOptions::Query(q) => Some(q),
            _ => None,
        }
    }

    /// The write bundle, if this is a mutation-family bundle.
    pub fn as_write(&self) -> Option<&WriteOptions> {
        match self {
            CallOptions::Upsert(w) | CallOptions::Replace(w) | CallOptions::Remove(w) => Some(w),
            CallOptions::Query(_) => None,
        }
    }
}
