//! Fathom - a generic repository layer for multi-tenant document stores
//!
//! Fathom maps typed data-access calls onto dynamically assembled query
//! statements, with per-call overriding of execution context (routing
//! namespace pair, options bundle, consistency) that never changes the
//! repository's declared interface.
//!
//! # Quick Start
//!
//! ```ignore
//! use fathom::{Criteria, Query, Repository};
//!
//! // Wrap a store client and an entity mapper
//! let airports = Repository::new(client, mapper);
//!
//! // Route every call through one sub-namespace by default
//! let airports = airports.with_sub_namespace("airport");
//!
//! // Fetch with a filter; the derived context applies automatically
//! let hits = airports.find_all_query(
//!     Query::query(Criteria::eq("iata", "JFK")).limit(2),
//! )?;
//! ```
//!
//! # Architecture
//!
//! Statement assembly lives in `fathom-query` (criteria, sort, pagination,
//! options merging, keyspace resolution); call resolution and the facade
//! live in `fathom-repo`. The store client and the entity mapper are
//! external collaborators consumed through the traits in `fathom-core`.

pub use fathom_core::*;
pub use fathom_query::{
    merge_query_options, CompareOp, Criteria, DeferredValue, Order, ParamValue, Parameters, Query,
    RenderedQuery, Sort, StatementContext,
};
pub use fathom_repo::{
    method_family, resolve, CallArg, CallContext, CallOverlay, CanonicalArgs, MethodFamily,
    Operation, Output, PendingCall, Repository, SaveMode,
};
