//! Statement parameter stores.
//!
//! A query binds its criteria values into a shared parameter store that is
//! exclusively positional (ordered sequence) or exclusively named (mapping).
//! Mixing the two kinds on one query is an error.
//!
//! A parameter value itself may arrive asynchronously: [`DeferredValue`] is
//! a set-once cell whose accessor blocks the calling thread until the value
//! is supplied. Resolution happens at bind time, before any statement text
//! is assembled.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use serde_json::Value;

use fathom_core::{Error, Result};

/// Parameter store for one query: positional, named, or not yet decided.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Parameters {
    /// No parameters bound yet; the first bind decides the kind.
    #[default]
    None,
    /// Positional parameters, bound as `$1`, `$2`, ...
    Positional(Vec<Value>),
    /// Named parameters, bound as `$name`.
    Named(BTreeMap<String, Value>),
}

impl Parameters {
    /// Bind a positional parameter, returning its 1-based placeholder index.
    ///
    /// Fails if the store already holds named parameters.
    pub fn push_positional(&mut self, value: Value) -> Result<usize> {
        match self {
            Parameters::None => {
                *self = Parameters::Positional(vec![value]);
                Ok(1)
            }
            Parameters::Positional(values) => {
                values.push(value);
                Ok(values.len())
            }
            Parameters::Named(_) => Err(Error::ParameterKindConflict {
                detail: "cannot bind a positional parameter on a named-parameter query".into(),
            }),
        }
    }

    /// Bind a named parameter.
    ///
    /// Fails if the store already holds positional parameters.
    pub fn insert_named(&mut self, key: impl Into<String>, value: Value) -> Result<()> {
        match self {
            Parameters::None => {
                let mut map = BTreeMap::new();
                map.insert(key.into(), value);
                *self = Parameters::Named(map);
                Ok(())
            }
            Parameters::Named(map) => {
                map.insert(key.into(), value);
                Ok(())
            }
            Parameters::Positional(_) => Err(Error::ParameterKindConflict {
                detail: "cannot bind a named parameter on a positional-parameter query".into(),
            }),
        }
    }

    /// True if nothing is bound.
    pub fn is_empty(&self) -> bool {
        match self {
            Parameters::None => true,
            Parameters::Positional(v) => v.is_empty(),
            Parameters::Named(m) => m.is_empty(),
        }
    }

    /// The positional values, if this is a positional store.
    pub fn as_positional(&self) -> Option<&Vec<Value>> {
        match self {
            Parameters::Positional(v) => Some(v),
            _ => None,
        }
    }

    /// The named values, if this is a named store.
    pub fn as_named(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Parameters::Named(m) => Some(m),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct DeferredInner {
    slot: Mutex<Option<Value>>,
    ready: Condvar,
}

/// A parameter value supplied after the query is constructed.
///
/// `wait` blocks the calling thread until `set` runs; it must not be called
/// from a context that cannot block. Clones share the same cell.
#[derive(Debug, Clone, Default)]
pub struct DeferredValue {
    inner: Arc<DeferredInner>,
}

impl DeferredValue {
    /// A new, unset cell.
    pub fn new() -> Self {
        DeferredValue::default()
    }

    /// Supply the value and wake all waiters. The first set wins; later
    /// calls are ignored.
    pub fn set(&self, value: Value) {
        let mut slot = self.inner.slot.lock();
        if slot.is_none() {
            *slot = Some(value);
            self.inner.ready.notify_all();
        }
    }

    /// Block the calling thread until the value is available.
    pub fn wait(&self) -> Value {
        let mut slot = self.inner.slot.lock();
        while slot.is_none() {
            self.inner.ready.wait(&mut slot);
        }
        slot.clone().expect("slot checked non-empty")
    }

    /// The value if it is already available, without blocking.
    pub fn try_get(&self) -> Option<Value> {
        self.inner.slot.lock().clone()
    }
}

/// A value to be bound into the parameter store: either present now, or
/// deferred until execution.
#[derive(Debug, Clone)]
pub enum ParamValue {
    /// Plain value.
    Ready(Value),
    /// Value arriving later; resolved (blocking) at bind time.
    Deferred(DeferredValue),
}

impl ParamValue {
    /// The plain value, blocking on a deferred source if necessary.
    pub fn resolve(&self) -> Value {
        match self {
            ParamValue::Ready(v) => v.clone(),
            ParamValue::Deferred(d) => d.wait(),
        }
    }
}

impl From<Value> for ParamValue {
    fn from(v: Value) -> Self {
        ParamValue::Ready(v)
    }
}

impl From<DeferredValue> for ParamValue {
    fn from(d: DeferredValue) -> Self {
        ParamValue::Deferred(d)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Ready(Value::String(s.to_string()))
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Ready(Value::String(s))
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Ready(Value::from(n))
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        ParamValue::Ready(Value::from(n))
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Ready(Value::Bool(b))
    }
}
