//! Context overlay, call resolution and the repository facade.
//!
//! This crate is the dispatch half of the repository layer: an immutable
//! per-facade [`CallOverlay`] supplies default context, the resolver
//! reconciles dynamic calls against it, and [`Repository`] exposes the CRUD
//! surface in typed (`CallContext`) and dynamic ([`PendingCall`]) shapes,
//! both landing on the same handlers.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod call;
pub mod operation;
pub mod overlay;
pub mod repository;
pub mod resolve;

pub use call::{CallArg, CallContext, CanonicalArgs, PendingCall};
pub use operation::{Operation, Output};
pub use overlay::CallOverlay;
pub use repository::{Repository, SaveMode};
pub use resolve::{method_family, resolve, MethodFamily};
