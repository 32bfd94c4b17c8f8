//! Shared test utilities for the repository integration suites.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use fathom::{
    EntityInfo, EntityMapper, Error, KeyspaceRef, QueryOptions, Repository, Result, StoreClient,
    VersionToken, WriteOptions,
};

/// One recorded statement execution.
#[derive(Debug, Clone)]
pub struct RecordedQuery {
    pub statement: String,
    pub options: QueryOptions,
    pub keyspace: KeyspaceRef,
}

/// One recorded key-level mutation.
#[derive(Debug, Clone)]
pub struct RecordedMutation {
    pub kind: &'static str,
    pub id: String,
    pub options: WriteOptions,
    pub keyspace: KeyspaceRef,
}

/// One recorded key-level read (get or exists).
#[derive(Debug, Clone)]
pub struct RecordedLookup {
    pub kind: &'static str,
    pub id: String,
    pub options: QueryOptions,
    pub keyspace: KeyspaceRef,
}

/// In-memory store client that records every call it receives.
///
/// Statement execution returns canned rows; key-level operations run against
/// an in-memory document map.
pub struct RecordingClient {
    docs: Mutex<BTreeMap<String, Value>>,
    rows: Mutex<Vec<Value>>,
    pub queries: Mutex<Vec<RecordedQuery>>,
    pub mutations: Mutex<Vec<RecordedMutation>>,
    pub lookups: Mutex<Vec<RecordedLookup>>,
    next_cas: AtomicU64,
}

impl RecordingClient {
    pub fn new() -> Self {
        RecordingClient {
            docs: Mutex::new(BTreeMap::new()),
            rows: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            mutations: Mutex::new(Vec::new()),
            lookups: Mutex::new(Vec::new()),
            next_cas: AtomicU64::new(1),
        }
    }

    /// Preload a stored document.
    pub fn seed(&self, id: &str, doc: Value) {
        self.docs.lock().insert(id.to_string(), doc);
    }

    /// Set the rows the next statement executions return.
    pub fn canned_rows(&self, rows: Vec<Value>) {
        *self.rows.lock() = rows;
    }

    pub fn recorded_queries(&self) -> Vec<RecordedQuery> {
        self.queries.lock().clone()
    }

    pub fn recorded_mutations(&self) -> Vec<RecordedMutation> {
        self.mutations.lock().clone()
    }

    pub fn recorded_lookups(&self) -> Vec<RecordedLookup> {
        self.lookups.lock().clone()
    }

    pub fn stored(&self, id: &str) -> Option<Value> {
        self.docs.lock().get(id).cloned()
    }

    fn token(&self) -> VersionToken {
        VersionToken {
            cas: self.next_cas.fetch_add(1, Ordering::SeqCst),
            token: None,
        }
    }
}

impl StoreClient for RecordingClient {
    fn store_name(&self) -> &str {
        "travel"
    }

    fn current_namespace(&self) -> &str {
        "inventory"
    }

    fn query(
        &self,
        statement: &str,
        options: &QueryOptions,
        keyspace: &KeyspaceRef,
    ) -> Result<Vec<Value>> {
        self.queries.lock().push(RecordedQuery {
            statement: statement.to_string(),
            options: options.clone(),
            keyspace: keyspace.clone(),
        });
        Ok(self.rows.lock().clone())
    }

    fn get(
        &self,
        id: &str,
        options: &QueryOptions,
        keyspace: &KeyspaceRef,
    ) -> Result<Option<Value>> {
        self.lookups.lock().push(RecordedLookup {
            kind: "get",
            id: id.to_string(),
            options: options.clone(),
            keyspace: keyspace.clone(),
        });
        Ok(self.docs.lock().get(id).cloned())
    }

    fn exists(&self, id: &str, options: &QueryOptions, keyspace: &KeyspaceRef) -> Result<bool> {
        self.lookups.lock().push(RecordedLookup {
            kind: "exists",
            id: id.to_string(),
            options: options.clone(),
            keyspace: keyspace.clone(),
        });
        Ok(self.docs.lock().contains_key(id))
    }

    fn upsert(
        &self,
        id: &str,
        document: &Value,
        options: &WriteOptions,
        keyspace: &KeyspaceRef,
    ) -> Result<VersionToken> {
        self.mutations.lock().push(RecordedMutation {
            kind: "upsert",
            id: id.to_string(),
            options: options.clone(),
            keyspace: keyspace.clone(),
        });
        self.docs.lock().insert(id.to_string(), document.clone());
        Ok(self.token())
    }

    fn replace(
        &self,
        id: &str,
        document: &Value,
        options: &WriteOptions,
        keyspace: &KeyspaceRef,
    ) -> Result<VersionToken> {
        self.mutations.lock().push(RecordedMutation {
            kind: "replace",
            id: id.to_string(),
            options: options.clone(),
            keyspace: keyspace.clone(),
        });
        let mut docs = self.docs.lock();
        if !docs.contains_key(id) {
            return Err(Error::DocumentNotFound { id: id.to_string() });
        }
        docs.insert(id.to_string(), document.clone());
        Ok(self.token())
    }

    fn remove(
        &self,
        id: &str,
        options: &WriteOptions,
        keyspace: &KeyspaceRef,
    ) -> Result<VersionToken> {
        self.mutations.lock().push(RecordedMutation {
            kind: "remove",
            id: id.to_string(),
            options: options.clone(),
            keyspace: keyspace.clone(),
        });
        if self.docs.lock().remove(id).is_none() {
            return Err(Error::DocumentNotFound { id: id.to_string() });
        }
        Ok(self.token())
    }
}

/// Test entity with an optimistic-locking version field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub id: String,
    pub iata: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

impl Airport {
    pub fn new(id: &str, iata: &str) -> Self {
        Airport {
            id: id.to_string(),
            iata: iata.to_string(),
            version: None,
        }
    }

    pub fn versioned(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }
}

/// JSON mapper for [`Airport`] documents.
pub struct AirportMapper {
    info: EntityInfo,
}

impl AirportMapper {
    pub fn new() -> Self {
        AirportMapper {
            info: EntityInfo::new("Airport").versioned("version"),
        }
    }
}

impl EntityMapper<Airport> for AirportMapper {
    fn info(&self) -> &EntityInfo {
        &self.info
    }

    fn to_document(&self, entity: &Airport) -> Result<Value> {
        let mut doc = serde_json::to_value(entity)?;
        if let Value::Object(map) = &mut doc {
            map.insert(
                self.info.type_key.clone(),
                Value::String(self.info.type_value.clone()),
            );
        }
        Ok(doc)
    }

    fn from_document(&self, document: Value) -> Result<Airport> {
        let mut document = document;
        if let Value::Object(map) = &mut document {
            map.remove(&self.info.type_key);
        }
        Ok(serde_json::from_value(document)?)
    }

    fn id_of(&self, entity: &Airport) -> Result<String> {
        Ok(entity.id.clone())
    }

    fn version_of(&self, entity: &Airport) -> Option<u64> {
        entity.version
    }
}

static INIT_TRACING: std::sync::Once = std::sync::Once::new();

/// Install a test-writer subscriber once per test binary.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// A repository over a fresh recording client, plus a handle to the client
/// for assertions.
pub fn airport_repo() -> (
    Repository<Airport, Arc<RecordingClient>, AirportMapper>,
    Arc<RecordingClient>,
) {
    init_tracing();
    let client = Arc::new(RecordingClient::new());
    let repo = Repository::new(Arc::clone(&client), AirportMapper::new());
    (repo, client)
}

/// The stored-document form of an airport.
pub fn airport_doc(id: &str, iata: &str) -> Value {
    serde_json::json!({ "_type": "Airport", "id": id, "iata": iata })
}
