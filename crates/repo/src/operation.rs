//! Operation enum for the dynamic dispatch path.
//!
//! Every facade operation reachable by name is represented as a variant of
//! [`Operation`]. Operations are:
//! - **Self-contained**: all payload arguments live in the variant
//! - **Serializable**: convertible to/from JSON for cross-language callers
//! - **Pure data**: no closures or executable code
//!
//! Context (options, namespace, sub-namespace) is not part of an operation;
//! it is resolved separately and travels alongside the operation during
//! dispatch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use fathom_core::{Error, Result, VersionToken};

use crate::resolve::{method_family, MethodFamily};

/// A facade operation with its payload arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Operation {
    // ==================== Read (5) ====================
    /// Fetch one entity by id.
    /// Returns: `Output::MaybeEntity`
    FindById { id: String },

    /// Fetch all entities of the repository's type.
    /// Returns: `Output::Entities`
    FindAll,

    /// Fetch the entities whose ids are in the list; missing ids are
    /// skipped.
    /// Returns: `Output::Entities`
    FindAllById { ids: Vec<String> },

    /// Existence probe by id.
    /// Returns: `Output::Bool`
    ExistsById { id: String },

    /// Count entities of the repository's type.
    /// Returns: `Output::Count`
    Count,

    // ==================== Save (2) ====================
    /// Persist one entity document.
    /// Returns: `Output::Version`
    Save { entity: Value },

    /// Persist each entity document in order.
    /// Returns: `Output::Versions`
    SaveAll { entities: Vec<Value> },

    // ==================== Delete (5) ====================
    /// Delete the document with the entity's id.
    /// Returns: `Output::Unit`
    Delete { entity: Value },

    /// Delete one document by id.
    /// Returns: `Output::Unit`
    DeleteById { id: String },

    /// Delete each id in order.
    /// Returns: `Output::Unit`
    DeleteAllById { ids: Vec<String> },

    /// Delete the document of each listed entity in order.
    /// Returns: `Output::Unit`
    DeleteAllEntities { entities: Vec<Value> },

    /// Delete every document of the repository's type with one statement.
    /// Returns: `Output::Count`
    DeleteAll,
}

fn expect_string(method: &str, arg: Option<&Value>) -> Result<String> {
    match arg {
        Some(Value::String(s)) => Ok(s.clone()),
        other => Err(Error::invalid_input(format!(
            "{method} expects a string id argument, got {other:?}"
        ))),
    }
}

fn expect_string_list(method: &str, arg: Option<&Value>) -> Result<Vec<String>> {
    match arg {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(Error::invalid_input(format!(
                    "{method} expects string ids, got {other:?}"
                ))),
            })
            .collect(),
        other => Err(Error::invalid_input(format!(
            "{method} expects a list of ids, got {other:?}"
        ))),
    }
}

fn expect_document(method: &str, arg: Option<&Value>) -> Result<Value> {
    match arg {
        Some(doc @ Value::Object(_)) => Ok(doc.clone()),
        other => Err(Error::invalid_input(format!(
            "{method} expects an entity document, got {other:?}"
        ))),
    }
}

fn expect_document_list(method: &str, arg: Option<&Value>) -> Result<Vec<Value>> {
    match arg {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                doc @ Value::Object(_) => Ok(doc.clone()),
                other => Err(Error::invalid_input(format!(
                    "{method} expects entity documents, got {other:?}"
                ))),
            })
            .collect(),
        other => Err(Error::invalid_input(format!(
            "{method} expects a list of entity documents, got {other:?}"
        ))),
    }
}

fn expect_arity(method: &str, base: &[Value], arity: usize) -> Result<()> {
    if base.len() == arity {
        Ok(())
    } else {
        Err(Error::invalid_input(format!(
            "{method} takes {arity} payload argument(s), got {}",
            base.len()
        )))
    }
}

impl Operation {
    /// Build an operation from a resolved method name and payload arguments.
    pub fn from_call(method: &str, base: &[Value]) -> Result<Operation> {
        match method {
            "find_by_id" => {
                expect_arity(method, base, 1)?;
                Ok(Operation::FindById {
                    id: expect_string(method, base.first())?,
                })
            }
            "find_all" => {
                expect_arity(method, base, 0)?;
                Ok(Operation::FindAll)
            }
            "find_all_by_id" => {
                expect_arity(method, base, 1)?;
                Ok(Operation::FindAllById {
                    ids: expect_string_list(method, base.first())?,
                })
            }
            "exists_by_id" => {
                expect_arity(method, base, 1)?;
                Ok(Operation::ExistsById {
                    id: expect_string(method, base.first())?,
                })
            }
            "count" => {
                expect_arity(method, base, 0)?;
                Ok(Operation::Count)
            }
            "save" => {
                expect_arity(method, base, 1)?;
                Ok(Operation::Save {
                    entity: expect_document(method, base.first())?,
                })
            }
            "save_all" => {
                expect_arity(method, base, 1)?;
                Ok(Operation::SaveAll {
                    entities: expect_document_list(method, base.first())?,
                })
            }
            "delete" => {
                expect_arity(method, base, 1)?;
                Ok(Operation::Delete {
                    entity: expect_document(method, base.first())?,
                })
            }
            "delete_by_id" => {
                expect_arity(method, base, 1)?;
                Ok(Operation::DeleteById {
                    id: expect_string(method, base.first())?,
                })
            }
            "delete_all_by_id" => {
                expect_arity(method, base, 1)?;
                Ok(Operation::DeleteAllById {
                    ids: expect_string_list(method, base.first())?,
                })
            }
            "delete_all_entities" => {
                expect_arity(method, base, 1)?;
                Ok(Operation::DeleteAllEntities {
                    entities: expect_document_list(method, base.first())?,
                })
            }
            "delete_all" => {
                expect_arity(method, base, 0)?;
                Ok(Operation::DeleteAll)
            }
            other => Err(Error::NoSuchOperation {
                method: other.to_string(),
                probes: vec![format!("no operation named {other}")],
            }),
        }
    }

    /// Operation name, matching the dynamic-call method names.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::FindById { .. } => "find_by_id",
            Operation::FindAll => "find_all",
            Operation::FindAllById { .. } => "find_all_by_id",
            Operation::ExistsById { .. } => "exists_by_id",
            Operation::Count => "count",
            Operation::Save { .. } => "save",
            Operation::SaveAll { .. } => "save_all",
            Operation::Delete { .. } => "delete",
            Operation::DeleteById { .. } => "delete_by_id",
            Operation::DeleteAllById { .. } => "delete_all_by_id",
            Operation::DeleteAllEntities { .. } => "delete_all_entities",
            Operation::DeleteAll => "delete_all",
        }
    }

    /// True for operations that mutate the store.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Operation::Save { .. }
                | Operation::SaveAll { .. }
                | Operation::Delete { .. }
                | Operation::DeleteById { .. }
                | Operation::DeleteAllById { .. }
                | Operation::DeleteAllEntities { .. }
                | Operation::DeleteAll
        )
    }

    /// The options family this operation's signature accepts.
    ///
    /// Delegates to the resolver's name table so the two stay in lockstep;
    /// every variant's [`Operation::name`] is a registered method name.
    pub fn family(&self) -> MethodFamily {
        match method_family(self.name()) {
            Some(family) => family,
            None => unreachable!("operation name {} not in the method table", self.name()),
        }
    }
}

/// Result of one dynamic dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Output {
    /// Zero or one entity documents.
    MaybeEntity(Option<Value>),
    /// A list of entity documents.
    Entities(Vec<Value>),
    /// A boolean probe result.
    Bool(bool),
    /// A count.
    Count(u64),
    /// The version token of one mutation.
    Version(VersionToken),
    /// Version tokens of a bulk mutation, in input order.
    Versions(Vec<VersionToken>),
    /// No payload.
    Unit,
}
