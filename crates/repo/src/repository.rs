//! The repository facade.
//!
//! A [`Repository`] wraps a store client and an entity mapper behind the
//! stable CRUD surface, with an immutable [`CallOverlay`] bound to each
//! facade value. The `with_*` mutators derive a new facade sharing the same
//! inner collaborators; operations come in a bare shape and a `_with` shape
//! taking an explicit [`CallContext`], and the dynamic path enters through
//! [`Repository::invoke`] with a [`PendingCall`].

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use fathom_core::{
    CallOptions, EntityMapper, Error, KeyspaceRef, NamespaceName, QueryOptions, Result,
    StoreClient, SubNamespaceName, VersionToken, WriteOptions,
};
use fathom_query::{merge_query_options, Query, StatementContext};
use serde_json::Value;

use crate::call::{CallContext, PendingCall};
use crate::operation::{Operation, Output};
use crate::overlay::CallOverlay;
use crate::resolve::{check_options_kind, resolve, MethodFamily};

/// Which concrete mutation a save dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Insert-or-update; used when the entity carries no version.
    Upsert,
    /// Compare-and-swap replace; used when the entity carries a version.
    Replace,
}

struct Inner<C, M> {
    client: C,
    mapper: M,
}

/// Repository facade for entity type `T`.
///
/// Cheap to clone and to derive; all clones share the same client and
/// mapper, while each carries its own overlay.
pub struct Repository<T, C, M> {
    inner: Arc<Inner<C, M>>,
    overlay: CallOverlay,
    _entity: PhantomData<fn() -> T>,
}

impl<T, C, M> Clone for Repository<T, C, M> {
    fn clone(&self) -> Self {
        Repository {
            inner: Arc::clone(&self.inner),
            overlay: self.overlay.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T, C, M> Repository<T, C, M>
where
    C: StoreClient,
    M: EntityMapper<T>,
{
    /// A facade with an empty overlay.
    pub fn new(client: C, mapper: M) -> Self {
        Repository {
            inner: Arc::new(Inner { client, mapper }),
            overlay: CallOverlay::new(),
            _entity: PhantomData,
        }
    }

    /// The overlay bound to this facade value.
    pub fn overlay(&self) -> &CallOverlay {
        &self.overlay
    }

    // ==================== overlay mutators ====================

    /// Derived facade with a default options bundle.
    pub fn with_options(&self, options: CallOptions) -> Self {
        self.derive(self.overlay.with_options(options))
    }

    /// Derived facade with a default routing namespace.
    pub fn with_namespace(&self, namespace: impl Into<NamespaceName>) -> Self {
        self.derive(self.overlay.with_namespace(namespace.into()))
    }

    /// Derived facade with a default routing sub-namespace.
    pub fn with_sub_namespace(&self, sub_namespace: impl Into<SubNamespaceName>) -> Self {
        self.derive(self.overlay.with_sub_namespace(sub_namespace.into()))
    }

    fn derive(&self, overlay: CallOverlay) -> Self {
        Repository {
            inner: Arc::clone(&self.inner),
            overlay,
            _entity: PhantomData,
        }
    }

    // ==================== context plumbing ====================

    /// Reconcile an explicit call context against the bound overlay:
    /// explicit fields win, unset fields take the overlay's value.
    fn resolved(&self, ctx: &CallContext) -> CallContext {
        CallContext {
            options: ctx.options.clone().or_else(|| self.overlay.options.clone()),
            namespace: ctx
                .namespace
                .clone()
                .or_else(|| self.overlay.namespace.clone()),
            sub_namespace: ctx
                .sub_namespace
                .clone()
                .or_else(|| self.overlay.sub_namespace.clone()),
        }
    }

    fn keyspace(&self, query: &Query, ctx: &CallContext) -> Result<KeyspaceRef> {
        query.resolve_keyspace(
            ctx.namespace.as_ref(),
            ctx.sub_namespace.as_ref(),
            self.inner.client.current_namespace(),
        )
    }

    fn statement_context(&self, keyspace: KeyspaceRef) -> StatementContext {
        StatementContext::new(
            self.inner.client.store_name(),
            keyspace,
            self.inner.mapper.info().clone(),
        )
    }

    /// Per-call query options, validated for the read family.
    fn read_options(&self, method: &str, ctx: &CallContext) -> Result<Option<QueryOptions>> {
        match &ctx.options {
            None => Ok(None),
            Some(opts) => {
                check_options_kind(method, MethodFamily::Read, opts)?;
                Ok(opts.as_query().cloned())
            }
        }
    }

    /// Per-call write options, validated for the delete family.
    fn remove_options(&self, method: &str, ctx: &CallContext) -> Result<WriteOptions> {
        match &ctx.options {
            None => Ok(WriteOptions::new()),
            Some(opts) => {
                check_options_kind(method, MethodFamily::Delete, opts)?;
                Ok(opts.as_write().cloned().unwrap_or_default())
            }
        }
    }

    /// Pick the save mode: an explicit `Upsert`/`Replace` bundle forces its
    /// mode; otherwise the entity's version field decides, and a versioned
    /// replace carries the version as its compare-and-swap value.
    fn save_mode(
        &self,
        version: Option<u64>,
        ctx: &CallContext,
    ) -> Result<(SaveMode, WriteOptions)> {
        match &ctx.options {
            Some(CallOptions::Upsert(write)) => Ok((SaveMode::Upsert, write.clone())),
            Some(CallOptions::Replace(write)) => Ok((SaveMode::Replace, write.clone())),
            Some(other) => {
                check_options_kind("save", MethodFamily::Save, other)?;
                unreachable!("save accepts only upsert and replace bundles")
            }
            None => match version {
                Some(v) if v != 0 => Ok((SaveMode::Replace, WriteOptions::new().cas(v))),
                _ => Ok((SaveMode::Upsert, WriteOptions::new())),
            },
        }
    }

    fn attach_options(query: Query, per_call: Option<QueryOptions>) -> Result<Query> {
        match per_call {
            None => Ok(query),
            Some(opts) => {
                let merged = match query.options() {
                    Some(existing) => merge_query_options(existing.clone(), &opts)?,
                    None => opts,
                };
                Ok(query.with_options(merged))
            }
        }
    }

    // ==================== document-level handlers ====================
    //
    // These take an already-resolved context; the typed `_with` shapes and
    // the dynamic path both land here, so overlay reconciliation happens
    // exactly once per call.

    fn get_doc(&self, method: &str, id: &str, ctx: &CallContext) -> Result<Option<Value>> {
        let options = self.read_options(method, ctx)?.unwrap_or_default();
        let keyspace = self.keyspace(&Query::new(), ctx)?;
        self.inner.client.get(id, &options, &keyspace)
    }

    fn doc_exists(&self, method: &str, id: &str, ctx: &CallContext) -> Result<bool> {
        let options = self.read_options(method, ctx)?.unwrap_or_default();
        let keyspace = self.keyspace(&Query::new(), ctx)?;
        self.inner.client.exists(id, &options, &keyspace)
    }

    fn docs_for_query(&self, method: &str, query: Query, ctx: &CallContext) -> Result<Vec<Value>> {
        let per_call = self.read_options(method, ctx)?;
        let query = Self::attach_options(query, per_call)?;
        let keyspace = self.keyspace(&query, ctx)?;
        let rendered = query.render(&self.statement_context(keyspace), None)?;
        debug!(method, statement = %rendered.statement, "query");
        self.inner
            .client
            .query(&rendered.statement, &rendered.options, &rendered.keyspace)
    }

    fn count_docs(&self, query: Query, ctx: &CallContext) -> Result<u64> {
        let per_call = self.read_options("count", ctx)?;
        let query = Self::attach_options(query, per_call)?;
        let keyspace = self.keyspace(&query, ctx)?;
        let rendered = query.render_count(&self.statement_context(keyspace), None)?;
        debug!(statement = %rendered.statement, "count");
        let rows = self
            .inner
            .client
            .query(&rendered.statement, &rendered.options, &rendered.keyspace)?;
        rows.first()
            .and_then(|row| row.get("__count"))
            .and_then(Value::as_u64)
            .ok_or_else(|| Error::store("count result missing __count row"))
    }

    fn delete_docs(&self, query: Query, ctx: &CallContext) -> Result<u64> {
        let per_call = self.read_options("delete_all", ctx)?;
        let query = Self::attach_options(query, per_call)?;
        let keyspace = self.keyspace(&query, ctx)?;
        let rendered = query.render_delete(&self.statement_context(keyspace), None)?;
        debug!(statement = %rendered.statement, "delete_all");
        let rows = self
            .inner
            .client
            .query(&rendered.statement, &rendered.options, &rendered.keyspace)?;
        Ok(rows.len() as u64)
    }

    fn save_doc(
        &self,
        id: &str,
        document: &Value,
        version: Option<u64>,
        ctx: &CallContext,
    ) -> Result<VersionToken> {
        let (mode, write) = self.save_mode(version, ctx)?;
        let keyspace = self.keyspace(&Query::new(), ctx)?;
        debug!(id, ?mode, "save");
        match mode {
            SaveMode::Upsert => self.inner.client.upsert(id, document, &write, &keyspace),
            SaveMode::Replace => self.inner.client.replace(id, document, &write, &keyspace),
        }
    }

    fn remove_doc(&self, method: &str, id: &str, ctx: &CallContext) -> Result<()> {
        let write = self.remove_options(method, ctx)?;
        let keyspace = self.keyspace(&Query::new(), ctx)?;
        debug!(method, id, "remove");
        self.inner.client.remove(id, &write, &keyspace)?;
        Ok(())
    }

    // ==================== read operations ====================

    /// Fetch one entity by id.
    pub fn find_by_id(&self, id: &str) -> Result<Option<T>> {
        self.find_by_id_with(id, &CallContext::new())
    }

    /// Fetch one entity by id with an explicit call context.
    pub fn find_by_id_with(&self, id: &str, ctx: &CallContext) -> Result<Option<T>> {
        let ctx = self.resolved(ctx);
        self.get_doc("find_by_id", id, &ctx)?
            .map(|doc| self.inner.mapper.from_document(doc))
            .transpose()
    }

    /// Fetch all entities of this repository's type.
    pub fn find_all(&self) -> Result<Vec<T>> {
        self.find_all_with(&CallContext::new())
    }

    /// Fetch all entities with an explicit call context.
    pub fn find_all_with(&self, ctx: &CallContext) -> Result<Vec<T>> {
        self.find_all_query_with(Query::new(), ctx)
    }

    /// Fetch the entities matching `query`.
    pub fn find_all_query(&self, query: Query) -> Result<Vec<T>> {
        self.find_all_query_with(query, &CallContext::new())
    }

    /// Fetch the entities matching `query` with an explicit call context.
    pub fn find_all_query_with(&self, query: Query, ctx: &CallContext) -> Result<Vec<T>> {
        let ctx = self.resolved(ctx);
        self.docs_for_query("find_all", query, &ctx)?
            .into_iter()
            .map(|doc| self.inner.mapper.from_document(doc))
            .collect()
    }

    /// Fetch the entities whose ids are listed; missing ids are skipped.
    pub fn find_all_by_id(&self, ids: &[String]) -> Result<Vec<T>> {
        self.find_all_by_id_with(ids, &CallContext::new())
    }

    /// Fetch by id list with an explicit call context.
    pub fn find_all_by_id_with(&self, ids: &[String], ctx: &CallContext) -> Result<Vec<T>> {
        let ctx = self.resolved(ctx);
        let mut found = Vec::new();
        for id in ids {
            if let Some(doc) = self.get_doc("find_all_by_id", id, &ctx)? {
                found.push(self.inner.mapper.from_document(doc)?);
            }
        }
        Ok(found)
    }

    /// Existence probe by id.
    pub fn exists_by_id(&self, id: &str) -> Result<bool> {
        self.exists_by_id_with(id, &CallContext::new())
    }

    /// Existence probe with an explicit call context.
    pub fn exists_by_id_with(&self, id: &str, ctx: &CallContext) -> Result<bool> {
        let ctx = self.resolved(ctx);
        self.doc_exists("exists_by_id", id, &ctx)
    }

    /// Count entities of this repository's type.
    pub fn count(&self) -> Result<u64> {
        self.count_with(&CallContext::new())
    }

    /// Count with an explicit call context.
    pub fn count_with(&self, ctx: &CallContext) -> Result<u64> {
        let ctx = self.resolved(ctx);
        self.count_docs(Query::new(), &ctx)
    }

    // ==================== save operations ====================

    /// Persist one entity, upserting or replacing by its version field.
    pub fn save(&self, entity: &T) -> Result<VersionToken> {
        self.save_with(entity, &CallContext::new())
    }

    /// Persist one entity with an explicit call context.
    pub fn save_with(&self, entity: &T, ctx: &CallContext) -> Result<VersionToken> {
        let ctx = self.resolved(ctx);
        let id = self.inner.mapper.id_of(entity)?;
        let document = self.inner.mapper.to_document(entity)?;
        let version = self.inner.mapper.version_of(entity);
        self.save_doc(&id, &document, version, &ctx)
    }

    /// Persist each entity in order, stopping at the first failure.
    pub fn save_all(&self, entities: &[T]) -> Result<Vec<VersionToken>> {
        self.save_all_with(entities, &CallContext::new())
    }

    /// Bulk save with an explicit call context.
    pub fn save_all_with(&self, entities: &[T], ctx: &CallContext) -> Result<Vec<VersionToken>> {
        let ctx = self.resolved(ctx);
        let mut tokens = Vec::with_capacity(entities.len());
        for entity in entities {
            let id = self.inner.mapper.id_of(entity)?;
            let document = self.inner.mapper.to_document(entity)?;
            let version = self.inner.mapper.version_of(entity);
            tokens.push(self.save_doc(&id, &document, version, &ctx)?);
        }
        Ok(tokens)
    }

    // ==================== delete operations ====================

    /// Delete the document with `entity`'s id.
    pub fn delete(&self, entity: &T) -> Result<()> {
        self.delete_with(entity, &CallContext::new())
    }

    /// Delete by entity with an explicit call context.
    pub fn delete_with(&self, entity: &T, ctx: &CallContext) -> Result<()> {
        let id = self.inner.mapper.id_of(entity)?;
        self.delete_by_id_with(&id, ctx)
    }

    /// Delete one document by id.
    pub fn delete_by_id(&self, id: &str) -> Result<()> {
        self.delete_by_id_with(id, &CallContext::new())
    }

    /// Delete by id with an explicit call context.
    pub fn delete_by_id_with(&self, id: &str, ctx: &CallContext) -> Result<()> {
        let ctx = self.resolved(ctx);
        self.remove_doc("delete_by_id", id, &ctx)
    }

    /// Delete each listed id in order, stopping at the first failure.
    pub fn delete_all_by_id(&self, ids: &[String]) -> Result<()> {
        self.delete_all_by_id_with(ids, &CallContext::new())
    }

    /// Bulk delete by id with an explicit call context.
    pub fn delete_all_by_id_with(&self, ids: &[String], ctx: &CallContext) -> Result<()> {
        let ctx = self.resolved(ctx);
        for id in ids {
            self.remove_doc("delete_all_by_id", id, &ctx)?;
        }
        Ok(())
    }

    /// Delete the document of each listed entity in order, stopping at the
    /// first failure.
    pub fn delete_all_entities(&self, entities: &[T]) -> Result<()> {
        self.delete_all_entities_with(entities, &CallContext::new())
    }

    /// Bulk delete by entity with an explicit call context.
    pub fn delete_all_entities_with(&self, entities: &[T], ctx: &CallContext) -> Result<()> {
        let ctx = self.resolved(ctx);
        for entity in entities {
            let id = self.inner.mapper.id_of(entity)?;
            self.remove_doc("delete_all_entities", &id, &ctx)?;
        }
        Ok(())
    }

    /// Delete every document of this repository's type with one statement,
    /// returning the number of deleted documents.
    pub fn delete_all(&self) -> Result<u64> {
        self.delete_all_with(&CallContext::new())
    }

    /// Delete-all with an explicit call context.
    pub fn delete_all_with(&self, ctx: &CallContext) -> Result<u64> {
        let ctx = self.resolved(ctx);
        self.delete_docs(Query::new(), &ctx)
    }

    // ==================== dynamic path ====================

    /// Dispatch a dynamic call by name.
    ///
    /// The raw arguments are reconciled against the bound overlay first;
    /// the reconciled context then drives the same handlers as the typed
    /// operations. The `with_*` overlay mutators derive new facade values
    /// and are not dispatchable by name.
    pub fn invoke(&self, call: &PendingCall) -> Result<Output> {
        if matches!(
            call.method.as_str(),
            "with_options" | "with_namespace" | "with_sub_namespace"
        ) {
            return Err(Error::invalid_input(format!(
                "{} derives a new facade and cannot be dispatched by name",
                call.method
            )));
        }

        let (_, canonical) = resolve(&self.overlay, call)?;
        let operation = Operation::from_call(&call.method, &canonical.base)?;
        let ctx = canonical.context();
        debug!(method = operation.name(), write = operation.is_write(), "dispatch");

        match operation {
            Operation::FindById { id } => {
                Ok(Output::MaybeEntity(self.get_doc("find_by_id", &id, &ctx)?))
            }
            Operation::FindAll => Ok(Output::Entities(self.docs_for_query(
                "find_all",
                Query::new(),
                &ctx,
            )?)),
            Operation::FindAllById { ids } => {
                let mut found = Vec::new();
                for id in &ids {
                    if let Some(doc) = self.get_doc("find_all_by_id", id, &ctx)? {
                        found.push(doc);
                    }
                }
                Ok(Output::Entities(found))
            }
            Operation::ExistsById { id } => {
                Ok(Output::Bool(self.doc_exists("exists_by_id", &id, &ctx)?))
            }
            Operation::Count => Ok(Output::Count(self.count_docs(Query::new(), &ctx)?)),
            Operation::Save { entity } => {
                let entity = self.inner.mapper.from_document(entity)?;
                let id = self.inner.mapper.id_of(&entity)?;
                let document = self.inner.mapper.to_document(&entity)?;
                let version = self.inner.mapper.version_of(&entity);
                Ok(Output::Version(self.save_doc(&id, &document, version, &ctx)?))
            }
            Operation::SaveAll { entities } => {
                let mut tokens = Vec::with_capacity(entities.len());
                for document in entities {
                    let entity = self.inner.mapper.from_document(document)?;
                    let id = self.inner.mapper.id_of(&entity)?;
                    let document = self.inner.mapper.to_document(&entity)?;
                    let version = self.inner.mapper.version_of(&entity);
                    tokens.push(self.save_doc(&id, &document, version, &ctx)?);
                }
                Ok(Output::Versions(tokens))
            }
            Operation::Delete { entity } => {
                let entity = self.inner.mapper.from_document(entity)?;
                let id = self.inner.mapper.id_of(&entity)?;
                self.remove_doc("delete", &id, &ctx)?;
                Ok(Output::Unit)
            }
            Operation::DeleteById { id } => {
                self.remove_doc("delete_by_id", &id, &ctx)?;
                Ok(Output::Unit)
            }
            Operation::DeleteAllById { ids } => {
                for id in &ids {
                    self.remove_doc("delete_all_by_id", id, &ctx)?;
                }
                Ok(Output::Unit)
            }
            Operation::DeleteAllEntities { entities } => {
                for document in entities {
                    let entity = self.inner.mapper.from_document(document)?;
                    let id = self.inner.mapper.id_of(&entity)?;
                    self.remove_doc("delete_all_entities", &id, &ctx)?;
                }
                Ok(Output::Unit)
            }
            Operation::DeleteAll => Ok(Output::Count(self.delete_docs(Query::new(), &ctx)?)),
        }
    }
}
