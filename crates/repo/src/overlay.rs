//! The per-facade call context overlay.
//!
//! A [`CallOverlay`] holds the default execution context a facade applies to
//! calls that do not supply their own: an options bundle, a routing
//! namespace and a routing sub-namespace. Overlays are immutable; each
//! `with_*` produces a derived overlay with exactly one field replaced, and
//! the facade that carries the original is untouched.

use serde::{Deserialize, Serialize};

use fathom_core::{CallOptions, NamespaceName, SubNamespaceName};

/// Immutable default context bound to one facade value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallOverlay {
    /// Default options bundle, if any.
    pub options: Option<CallOptions>,
    /// Default routing namespace, if any.
    pub namespace: Option<NamespaceName>,
    /// Default routing sub-namespace, if any.
    pub sub_namespace: Option<SubNamespaceName>,
}

impl CallOverlay {
    /// The empty overlay.
    pub fn new() -> Self {
        CallOverlay::default()
    }

    /// Derived overlay with the options bundle replaced.
    pub fn with_options(&self, options: CallOptions) -> CallOverlay {
        CallOverlay {
            options: Some(options),
            ..self.clone()
        }
    }

    /// Derived overlay with the namespace replaced.
    pub fn with_namespace(&self, namespace: NamespaceName) -> CallOverlay {
        CallOverlay {
            namespace: Some(namespace),
            ..self.clone()
        }
    }

    /// Derived overlay with the sub-namespace replaced.
    pub fn with_sub_namespace(&self, sub_namespace: SubNamespaceName) -> CallOverlay {
        CallOverlay {
            sub_namespace: Some(sub_namespace),
            ..self.clone()
        }
    }
}
