//! Query construction for the document repository layer.
//!
//! This crate turns composable [`Criteria`] predicates, [`Sort`] specs and
//! pagination into statement text plus a merged options bundle, and resolves
//! the keyspace a statement routes to. The [`Query`] builder is persistent:
//! mutators consume and return, shared builders are never mutated in place,
//! and rendering the same builder twice yields identical output.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod criteria;
pub mod merge;
pub mod params;
pub mod query;
pub mod sort;
pub mod statement;

pub use criteria::{CompareOp, Criteria};
pub use merge::merge_query_options;
pub use params::{DeferredValue, ParamValue, Parameters};
pub use query::{Query, RenderedQuery};
pub use sort::{Order, Sort};
pub use statement::StatementContext;
