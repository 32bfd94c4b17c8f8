//! Composable filter predicates.
//!
//! A [`Criteria`] node renders itself into one WHERE-clause fragment and
//! binds its value into the query's shared parameter store. Nodes default to
//! positional binding (`field = $1`); calling [`Criteria::named`] switches a
//! node to named binding (`field = $key`). The store enforces that one query
//! never mixes the two kinds.

use fathom_core::Result;

use crate::params::{ParamValue, Parameters};

/// Comparison operator of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `LIKE`
    Like,
}

impl CompareOp {
    /// Statement-text form of the operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Like => "LIKE",
        }
    }
}

/// One filter predicate: `field <op> <bound value>`.
#[derive(Debug, Clone)]
pub struct Criteria {
    field: String,
    op: CompareOp,
    value: ParamValue,
    named_key: Option<String>,
}

impl Criteria {
    fn new(field: impl Into<String>, op: CompareOp, value: impl Into<ParamValue>) -> Self {
        Criteria {
            field: field.into(),
            op,
            value: value.into(),
            named_key: None,
        }
    }

    /// `field = value`
    pub fn eq(field: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Criteria::new(field, CompareOp::Eq, value)
    }

    /// `field != value`
    pub fn ne(field: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Criteria::new(field, CompareOp::Ne, value)
    }

    /// `field > value`
    pub fn gt(field: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Criteria::new(field, CompareOp::Gt, value)
    }

    /// `field >= value`
    pub fn gte(field: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Criteria::new(field, CompareOp::Ge, value)
    }

    /// `field < value`
    pub fn lt(field: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Criteria::new(field, CompareOp::Lt, value)
    }

    /// `field <= value`
    pub fn lte(field: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Criteria::new(field, CompareOp::Le, value)
    }

    /// `field LIKE value`
    pub fn like(field: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Criteria::new(field, CompareOp::Like, value)
    }

    /// Switch this node to named binding under `key`.
    pub fn named(mut self, key: impl Into<String>) -> Self {
        self.named_key = Some(key.into());
        self
    }

    /// The filtered field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Render the fragment and bind the value into `params`.
    ///
    /// Blocks if the value is deferred and not yet supplied.
    pub fn export(&self, params: &mut Parameters) -> Result<String> {
        let value = self.value.resolve();
        let placeholder = match &self.named_key {
            Some(key) => {
                params.insert_named(key.clone(), value)?;
                format!("${key}")
            }
            None => {
                let index = params.push_positional(value)?;
                format!("${index}")
            }
        };
        Ok(format!("{} {} {}", self.field, self.op.symbol(), placeholder))
    }
}
