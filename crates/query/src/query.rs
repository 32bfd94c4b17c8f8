//! The query builder.
//!
//! [`Query`] is a persistent builder: every `with`-style mutator consumes
//! the value and returns a new one, so a query handed to another task is
//! never mutated underneath it. A query is consumed once per render; the
//! render itself is pure and yields identical output when repeated.

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use fathom_core::{
    Error, KeyspaceRef, NamespaceName, NamespaceSpec, QueryOptions, Result, ScanConsistency,
    SubNamespaceName, SubNamespaceSpec,
};

use crate::criteria::Criteria;
use crate::merge::merge_query_options;
use crate::params::Parameters;
use crate::sort::Sort;
use crate::statement::{append_where_or_and, StatementContext};

/// A rendered query: statement text, the merged options bundle, and the
/// routing context it executes against.
#[derive(Debug, Clone)]
pub struct RenderedQuery {
    /// Final statement text.
    pub statement: String,
    /// Merged options bundle to send with the statement.
    pub options: QueryOptions,
    /// Routing context the statement targets.
    pub keyspace: KeyspaceRef,
}

/// Builder for one logical query operation.
#[derive(Debug, Clone, Default)]
pub struct Query {
    criteria: Vec<Criteria>,
    parameters: Parameters,
    skip: u64,
    limit: u64,
    sort: Sort,
    scan_consistency: Option<ScanConsistency>,
    options_override: Option<QueryOptions>,
    namespace_spec: Option<NamespaceSpec>,
    sub_namespace_spec: Option<SubNamespaceSpec>,
}

impl Query {
    /// An empty query.
    pub fn new() -> Self {
        Query::default()
    }

    /// A query with one initial criterion.
    pub fn query(criteria: Criteria) -> Self {
        Query::new().with_criteria(criteria)
    }

    /// Append a filter criterion.
    pub fn with_criteria(mut self, criteria: Criteria) -> Self {
        self.criteria.push(criteria);
        self
    }

    /// Seed the positional parameter store. Replaces any named seed; a query
    /// is exclusively positional or exclusively named.
    pub fn positional_parameters(mut self, values: Vec<Value>) -> Self {
        self.parameters = Parameters::Positional(values);
        self
    }

    /// Seed the named parameter store. Replaces any positional seed.
    pub fn named_parameters(mut self, values: BTreeMap<String, Value>) -> Self {
        self.parameters = Parameters::Named(values);
        self
    }

    /// Number of documents to skip.
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    /// Maximum number of documents to return.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Append a sort specification.
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = self.sort.and(sort);
        self
    }

    /// Set the scan consistency for this query.
    pub fn scan_consistency(mut self, consistency: ScanConsistency) -> Self {
        self.scan_consistency = Some(consistency);
        self
    }

    /// Attach an explicit per-call options bundle; its fields win over the
    /// request-built bundle at render time.
    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options_override = Some(options);
        self
    }

    /// The explicit per-call options bundle, if one is attached.
    pub fn options(&self) -> Option<&QueryOptions> {
        self.options_override.as_ref()
    }

    /// Route this query to an explicit namespace.
    pub fn within_namespace(mut self, spec: NamespaceSpec) -> Self {
        self.namespace_spec = Some(spec);
        self
    }

    /// Route this query to an explicit sub-namespace.
    pub fn within_sub_namespace(mut self, spec: SubNamespaceSpec) -> Self {
        self.sub_namespace_spec = Some(spec);
        self
    }

    fn append_where(&self, statement: &mut String, params: &mut Parameters) -> Result<()> {
        if self.criteria.is_empty() {
            return Ok(());
        }
        append_where_or_and(statement);
        let mut first = true;
        for criteria in &self.criteria {
            if !first {
                statement.push_str(" AND ");
            }
            first = false;
            statement.push_str(&criteria.export(params)?);
        }
        Ok(())
    }

    fn append_sort(&self, statement: &mut String) -> Result<()> {
        if self.sort.is_unsorted() {
            return Ok(());
        }
        statement.push_str(" ORDER BY ");
        let mut first = true;
        for order in self.sort.orders() {
            if order.ignore_case {
                return Err(Error::UnsupportedSort {
                    property: order.property.clone(),
                });
            }
            if !first {
                statement.push_str(", ");
            }
            first = false;
            statement.push_str(&order.property);
            statement.push_str(if order.ascending { " ASC" } else { " DESC" });
        }
        Ok(())
    }

    fn append_skip_and_limit(&self, statement: &mut String) {
        if self.limit > 0 {
            statement.push_str(&format!(" LIMIT {}", self.limit));
        }
        if self.skip > 0 {
            statement.push_str(&format!(" OFFSET {}", self.skip));
        }
    }

    /// Render only the filter/sort/pagination suffix of this query, plus the
    /// bound parameter store.
    pub fn export(&self) -> Result<(String, Parameters)> {
        let mut statement = String::new();
        let mut params = self.parameters.clone();
        self.append_where(&mut statement, &mut params)?;
        self.append_sort(&mut statement)?;
        self.append_skip_and_limit(&mut statement);
        Ok((statement, params))
    }

    /// Render the full select statement against `ctx`.
    pub fn to_select_statement(&self, ctx: &StatementContext) -> Result<(String, Parameters)> {
        let mut statement = ctx.select_entity();
        let mut params = self.parameters.clone();
        append_where_or_and(&mut statement);
        statement.push_str(&ctx.type_filter());
        self.append_where(&mut statement, &mut params)?;
        self.append_sort(&mut statement)?;
        self.append_skip_and_limit(&mut statement);
        Ok((statement, params))
    }

    /// Render the count statement against `ctx`.
    pub fn to_count_statement(&self, ctx: &StatementContext) -> Result<(String, Parameters)> {
        let mut statement = ctx.count_prefix();
        let mut params = self.parameters.clone();
        append_where_or_and(&mut statement);
        statement.push_str(&ctx.type_filter());
        self.append_where(&mut statement, &mut params)?;
        Ok((statement, params))
    }

    /// Render the delete statement against `ctx`.
    pub fn to_delete_statement(&self, ctx: &StatementContext) -> Result<(String, Parameters)> {
        let mut statement = ctx.delete_prefix();
        let mut params = self.parameters.clone();
        append_where_or_and(&mut statement);
        statement.push_str(&ctx.type_filter());
        self.append_where(&mut statement, &mut params)?;
        statement.push_str(ctx.returning());
        Ok((statement, params))
    }

    /// Build the options bundle for this query: bound parameters and the
    /// effective consistency, then the explicit per-call override merged
    /// field-by-field on top.
    pub fn build_query_options(
        &self,
        consistency: Option<ScanConsistency>,
        params: &Parameters,
    ) -> Result<QueryOptions> {
        let mut options = QueryOptions::new();
        match params {
            Parameters::Positional(values) => {
                options.positional_parameters = Some(values.clone());
            }
            Parameters::Named(values) => {
                options.named_parameters = Some(values.clone());
            }
            Parameters::None => {}
        }
        if let Some(consistency) = consistency.or(self.scan_consistency) {
            options.scan_consistency = Some(consistency);
        }
        match &self.options_override {
            Some(overlay) => merge_query_options(options, overlay),
            None => Ok(options),
        }
    }

    /// Resolve the routing context this query executes against.
    ///
    /// Precedence, highest first: the explicit sub-namespace on the query,
    /// the explicit namespace on the query, then the call-site overlay. A
    /// default/default pair resolves to unset. A sub-namespace without any
    /// namespace falls back to the client connection's current namespace.
    pub fn resolve_keyspace(
        &self,
        overlay_namespace: Option<&NamespaceName>,
        overlay_sub_namespace: Option<&SubNamespaceName>,
        current_namespace: &str,
    ) -> Result<KeyspaceRef> {
        let sub = self
            .sub_namespace_spec
            .as_ref()
            .map(|s| s.name.clone())
            .or_else(|| overlay_sub_namespace.cloned());
        let namespace = self
            .namespace_spec
            .as_ref()
            .map(|s| s.name.clone())
            .or_else(|| overlay_namespace.cloned());

        if let (Some(spec), Some(sub)) = (&self.namespace_spec, &sub) {
            if !spec.contains(sub) {
                return Err(Error::NamespaceMismatch {
                    namespace: spec.name.as_str().to_string(),
                    sub_namespace: sub.as_str().to_string(),
                });
            }
        }

        let resolved = match (namespace, sub) {
            (None, None) => KeyspaceRef::unset(),
            (Some(ns), Some(sub)) => {
                if ns.is_default() && sub.is_default() {
                    KeyspaceRef::unset()
                } else {
                    KeyspaceRef::of(ns, sub)
                }
            }
            (None, Some(sub)) => {
                let ns = NamespaceName::new(current_namespace);
                if ns.is_default() && sub.is_default() {
                    KeyspaceRef::unset()
                } else {
                    KeyspaceRef::of(ns, sub)
                }
            }
            (Some(ns), None) => {
                if ns.is_default() {
                    KeyspaceRef::unset()
                } else {
                    // A non-default namespace has no implicit default
                    // sub-namespace; a lone declared member is the only
                    // unambiguous choice.
                    let lone = self
                        .namespace_spec
                        .as_ref()
                        .filter(|s| s.members.len() == 1)
                        .and_then(|s| s.members.iter().next().cloned());
                    match lone {
                        Some(member) => KeyspaceRef::of(ns, SubNamespaceName::new(member)),
                        None => {
                            return Err(Error::invalid_input(format!(
                                "namespace {ns} requires an explicit sub-namespace"
                            )))
                        }
                    }
                }
            }
        };
        debug!(keyspace = ?resolved, "keyspace resolved");
        Ok(resolved)
    }

    /// Render the full select form: statement text, merged options and the
    /// routing context from `ctx`.
    pub fn render(
        &self,
        ctx: &StatementContext,
        consistency: Option<ScanConsistency>,
    ) -> Result<RenderedQuery> {
        let (statement, params) = self.to_select_statement(ctx)?;
        let options = self.build_query_options(consistency, &params)?;
        Ok(RenderedQuery {
            statement,
            options,
            keyspace: ctx.keyspace().clone(),
        })
    }

    /// Render the count form.
    pub fn render_count(
        &self,
        ctx: &StatementContext,
        consistency: Option<ScanConsistency>,
    ) -> Result<RenderedQuery> {
        let (statement, params) = self.to_count_statement(ctx)?;
        let options = self.build_query_options(consistency, &params)?;
        Ok(RenderedQuery {
            statement,
            options,
            keyspace: ctx.keyspace().clone(),
        })
    }

    /// Render the delete form.
    pub fn render_delete(
        &self,
        ctx: &StatementContext,
        consistency: Option<ScanConsistency>,
    ) -> Result<RenderedQuery> {
        let (statement, params) = self.to_delete_statement(ctx)?;
        let options = self.build_query_options(consistency, &params)?;
        Ok(RenderedQuery {
            statement,
            options,
            keyspace: ctx.keyspace().clone(),
        })
    }
}
