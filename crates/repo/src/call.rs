//! Call representations.
//!
//! Two ways to address the facade coexist:
//!
//! - the typed path: operations take a [`CallContext`] with named,
//!   independently optional fields;
//! - the dynamic path: a [`PendingCall`] carries a method name and a raw
//!   [`CallArg`] list, for callers assembling calls from the wire or from a
//!   scripting layer. The resolver reconciles it against the facade's
//!   overlay into [`CanonicalArgs`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use fathom_core::{CallOptions, NamespaceName, SubNamespaceName};

/// Explicit per-call context for the typed path.
///
/// Every field is independently optional; an unset field falls back to the
/// facade's bound overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallContext {
    /// Per-call options bundle.
    pub options: Option<CallOptions>,
    /// Per-call routing namespace.
    pub namespace: Option<NamespaceName>,
    /// Per-call routing sub-namespace.
    pub sub_namespace: Option<SubNamespaceName>,
}

impl CallContext {
    /// The empty context: every field falls back to the overlay.
    pub fn new() -> Self {
        CallContext::default()
    }

    /// Set the options bundle.
    pub fn options(mut self, options: CallOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the routing namespace.
    pub fn namespace(mut self, namespace: impl Into<NamespaceName>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the routing sub-namespace.
    pub fn sub_namespace(mut self, sub_namespace: impl Into<SubNamespaceName>) -> Self {
        self.sub_namespace = Some(sub_namespace.into());
        self
    }
}

/// One raw argument on a dynamic call.
///
/// Context-kind arguments (options, namespace, sub-namespace) are tagged
/// explicitly; plain payload values travel as [`CallArg::Value`]. The
/// variadic forms mirror trailing rest-arguments: zero elements means "not
/// supplied", one element is unwrapped to the element itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CallArg {
    /// An explicit null. Carries no type information; the resolver treats
    /// it as a payload value unless it sits directly before a
    /// namespace-kind argument.
    Null,
    /// Payload argument (entity document, id, id list).
    Value(Value),
    /// An options bundle.
    Options(CallOptions),
    /// Variadic options arguments.
    OptionsList(Vec<CallOptions>),
    /// A routing namespace.
    Namespace(NamespaceName),
    /// A routing sub-namespace.
    SubNamespace(SubNamespaceName),
    /// Variadic sub-namespace arguments.
    SubNamespaces(Vec<SubNamespaceName>),
}

impl CallArg {
    /// True for context-kind arguments.
    pub fn is_context(&self) -> bool {
        !matches!(self, CallArg::Null | CallArg::Value(_))
    }

    /// Context-kind label, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            CallArg::Null => "null",
            CallArg::Value(_) => "value",
            CallArg::Options(_) | CallArg::OptionsList(_) => "options",
            CallArg::Namespace(_) => "namespace",
            CallArg::SubNamespace(_) | CallArg::SubNamespaces(_) => "sub-namespace",
        }
    }
}

/// A dynamic call as the caller supplied it: method name plus raw argument
/// list. Transient; lives for the duration of one dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCall {
    /// Requested operation name.
    pub method: String,
    /// Raw arguments, context-kind arguments trailing in any subset.
    #[serde(default)]
    pub args: Vec<CallArg>,
}

impl PendingCall {
    /// A call with no arguments.
    pub fn new(method: impl Into<String>) -> Self {
        PendingCall {
            method: method.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument.
    pub fn arg(mut self, arg: CallArg) -> Self {
        self.args.push(arg);
        self
    }
}

/// Resolver output: payload arguments plus exactly one slot per context
/// kind. The sub-namespace slot holds zero or one entries; a call overrides
/// at most one sub-namespace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalArgs {
    /// Payload arguments in caller order.
    pub base: Vec<Value>,
    /// Resolved options slot.
    pub options: Option<CallOptions>,
    /// Resolved namespace slot.
    pub namespace: Option<NamespaceName>,
    /// Resolved sub-namespace slot (zero or one entries).
    pub sub_namespaces: Vec<SubNamespaceName>,
}

impl CanonicalArgs {
    /// The resolved context portion as a [`CallContext`].
    pub fn context(&self) -> CallContext {
        CallContext {
            options: self.options.clone(),
            namespace: self.namespace.clone(),
            sub_namespace: self.sub_namespaces.first().cloned(),
        }
    }
}
