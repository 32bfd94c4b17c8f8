//! Dynamic call resolution.
//!
//! [`resolve`] reconciles a raw [`PendingCall`] against the facade's bound
//! [`CallOverlay`]: payload arguments are copied through, then each of the
//! three context kinds gets exactly one slot, filled from an explicit
//! argument when the caller supplied one and from the overlay otherwise.
//! The options kind is then checked against the operation's family; save
//! operations probe both accepted kinds before giving up, and every failed
//! probe is carried on the resulting error.

use serde_json::Value;
use tracing::debug;

use fathom_core::{CallOptions, Error, NamespaceName, Result, SubNamespaceName};

use crate::call::{CallArg, CanonicalArgs, PendingCall};
use crate::overlay::CallOverlay;

/// Which options kind an operation's signature accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodFamily {
    /// Accepts a `Query` bundle (find/exists/count, and the statement-backed
    /// delete-all).
    Read,
    /// Accepts an `Upsert` or `Replace` bundle.
    Save,
    /// Accepts a `Remove` bundle.
    Delete,
}

/// Family of a known operation name, `None` for unknown names.
pub fn method_family(method: &str) -> Option<MethodFamily> {
    match method {
        "find_by_id" | "find_all" | "find_all_by_id" | "exists_by_id" | "count" | "delete_all" => {
            Some(MethodFamily::Read)
        }
        "save" | "save_all" => Some(MethodFamily::Save),
        "delete" | "delete_by_id" | "delete_all_by_id" | "delete_all_entities" => {
            Some(MethodFamily::Delete)
        }
        _ => None,
    }
}

fn ambiguous(kind: &str) -> Error {
    Error::AmbiguousContextArgument {
        kind: kind.to_string(),
    }
}

/// Check a resolved options bundle against the operation family, probing
/// every accepted kind and aggregating the failures.
pub fn check_options_kind(
    method: &str,
    family: MethodFamily,
    options: &CallOptions,
) -> Result<()> {
    let accepted: &[&str] = match family {
        MethodFamily::Read => &["QueryOptions"],
        MethodFamily::Save => &["UpsertOptions", "ReplaceOptions"],
        MethodFamily::Delete => &["RemoveOptions"],
    };
    if accepted.contains(&options.kind_name()) {
        return Ok(());
    }
    let probes = accepted
        .iter()
        .map(|kind| format!("{method}(.., {kind}): options kind was {}", options.kind_name()))
        .collect();
    Err(Error::NoSuchOperation {
        method: method.to_string(),
        probes,
    })
}

/// Resolve `call` against `overlay` into canonical arguments.
///
/// Payload arguments are copied left-to-right until the first context-kind
/// argument. A `Null` carries no type information and is treated as a
/// payload value, with one exception: a `Null` sitting directly before a
/// namespace-kind argument is an explicit empty options slot, so the
/// overlay's options are not spliced in for it.
pub fn resolve(overlay: &CallOverlay, call: &PendingCall) -> Result<(MethodFamily, CanonicalArgs)> {
    let family = method_family(&call.method).ok_or_else(|| Error::NoSuchOperation {
        method: call.method.clone(),
        probes: vec![format!("no operation named {}", call.method)],
    })?;

    let args = &call.args;
    let mut base: Vec<Value> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match &args[i] {
            CallArg::Value(v) => {
                base.push(v.clone());
                i += 1;
            }
            CallArg::Null => {
                let next_is_namespace_kind = matches!(
                    args.get(i + 1),
                    Some(
                        CallArg::Namespace(_)
                            | CallArg::SubNamespace(_)
                            | CallArg::SubNamespaces(_)
                    )
                );
                if next_is_namespace_kind {
                    debug!(
                        method = %call.method,
                        "null argument before a namespace argument treated as an empty options slot"
                    );
                    break;
                }
                base.push(Value::Null);
                i += 1;
            }
            _ => break,
        }
    }

    // Options slot.
    let mut options: Option<CallOptions> = None;
    let mut options_filled = false;
    match args.get(i) {
        Some(CallArg::Null) => {
            // Explicit empty slot; the overlay does not fill it.
            options_filled = true;
            i += 1;
        }
        Some(CallArg::Options(o)) => {
            options = Some(o.clone());
            options_filled = true;
            i += 1;
        }
        Some(CallArg::OptionsList(list)) => match list.len() {
            0 => i += 1,
            1 => {
                options = Some(list[0].clone());
                options_filled = true;
                i += 1;
            }
            _ => return Err(ambiguous("options")),
        },
        _ => {}
    }
    if options.is_none() && !options_filled {
        options = overlay.options.clone();
    }

    // Namespace slot.
    let mut namespace: Option<NamespaceName> = None;
    let mut namespace_filled = false;
    if let Some(CallArg::Namespace(ns)) = args.get(i) {
        namespace = Some(ns.clone());
        namespace_filled = true;
        i += 1;
    }
    if namespace.is_none() {
        namespace = overlay.namespace.clone();
    }

    // Sub-namespace slot: zero or one entries.
    let mut sub_namespaces: Vec<SubNamespaceName> = Vec::new();
    let mut subs_filled = false;
    match args.get(i) {
        Some(CallArg::SubNamespace(sub)) => {
            sub_namespaces.push(sub.clone());
            subs_filled = true;
            i += 1;
        }
        Some(CallArg::SubNamespaces(list)) => {
            if list.len() > 1 {
                return Err(ambiguous("sub-namespace"));
            }
            sub_namespaces.extend(list.iter().cloned());
            subs_filled = true;
            i += 1;
        }
        _ => {}
    }
    if sub_namespaces.is_empty() && !subs_filled {
        if let Some(sub) = &overlay.sub_namespace {
            sub_namespaces.push(sub.clone());
        }
    }

    // Anything left over failed to claim a slot.
    if let Some(arg) = args.get(i) {
        let duplicate = match arg {
            CallArg::Options(_) | CallArg::OptionsList(_) => options_filled,
            CallArg::Namespace(_) => namespace_filled,
            CallArg::SubNamespace(_) | CallArg::SubNamespaces(_) => subs_filled,
            CallArg::Null | CallArg::Value(_) => false,
        };
        if duplicate {
            return Err(ambiguous(arg.kind_name()));
        }
        return Err(Error::NoSuchOperation {
            method: call.method.clone(),
            probes: vec![format!(
                "unexpected trailing {} argument at position {i}",
                arg.kind_name()
            )],
        });
    }

    if let Some(opts) = &options {
        check_options_kind(&call.method, family, opts)?;
    }

    Ok((
        family,
        CanonicalArgs {
            base,
            options,
            namespace,
            sub_namespaces,
        },
    ))
}
