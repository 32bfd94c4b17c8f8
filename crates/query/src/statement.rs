//! Statement contexts and clause stitching.
//!
//! A [`StatementContext`] holds the fixed prefixes of the statements a
//! repository issues for one entity type against one keyspace: the entity
//! select, the count probe and the delete, plus the type-discriminator
//! filter appended to all of them.
//!
//! Clause stitching has one subtlety: whether to emit `WHERE` or `AND`
//! depends on whether the statement so far already contains a WHERE token —
//! and a token inside a quoted literal does not count.

use fathom_core::{EntityInfo, KeyspaceRef};

/// Byte spans of quoted literals (single or double quoted) in `text`.
///
/// A backslash escapes the next character inside a literal. An unterminated
/// literal spans to the end of the text.
pub(crate) fn quote_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut open: Option<(usize, char)> = None;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match open {
            Some((start, quote)) => {
                if c == '\\' {
                    escaped = true;
                } else if c == quote {
                    spans.push((start, i + c.len_utf8()));
                    open = None;
                }
            }
            None => {
                if c == '\'' || c == '"' {
                    open = Some((i, c));
                }
            }
        }
    }
    if let Some((start, _)) = open {
        spans.push((start, text.len()));
    }
    spans
}

/// Whether `statement` already contains a `WHERE` keyword outside of any
/// quoted literal.
pub(crate) fn has_unquoted_where(statement: &str) -> bool {
    let upper = statement.to_uppercase();
    let quotes = quote_spans(&upper);
    for (start, _) in upper.match_indices(" WHERE ") {
        let end = start + " WHERE ".len();
        let quoted = quotes.iter().any(|&(qs, qe)| qs <= start && qe >= end);
        if !quoted {
            return true;
        }
    }
    false
}

/// Append `" WHERE "` on the first filter clause, `" AND "` thereafter.
pub(crate) fn append_where_or_and(statement: &mut String) {
    if has_unquoted_where(statement) {
        statement.push_str(" AND ");
    } else {
        statement.push_str(" WHERE ");
    }
}

/// Fixed statement prefixes for one entity type against one keyspace.
#[derive(Debug, Clone)]
pub struct StatementContext {
    store_name: String,
    keyspace: KeyspaceRef,
    info: EntityInfo,
}

impl StatementContext {
    /// Context for `info` documents in `keyspace` of the named store.
    pub fn new(store_name: impl Into<String>, keyspace: KeyspaceRef, info: EntityInfo) -> Self {
        StatementContext {
            store_name: store_name.into(),
            keyspace,
            info,
        }
    }

    /// The resolved keyspace this context targets.
    pub fn keyspace(&self) -> &KeyspaceRef {
        &self.keyspace
    }

    /// Entity metadata in effect.
    pub fn info(&self) -> &EntityInfo {
        &self.info
    }

    /// The quoted keyspace path: `` `store` `` or `` `store`.`ns`.`sub` ``.
    pub fn keyspace_path(&self) -> String {
        match (&self.keyspace.namespace, &self.keyspace.sub_namespace) {
            (Some(ns), Some(sub)) => format!("`{}`.`{}`.`{}`", self.store_name, ns, sub),
            _ => format!("`{}`", self.store_name),
        }
    }

    /// Select prefix projecting the document plus its id and version.
    pub fn select_entity(&self) -> String {
        format!(
            "SELECT META(d).id AS __id, META(d).cas AS __cas, d.* FROM {} d",
            self.keyspace_path()
        )
    }

    /// Count prefix.
    pub fn count_prefix(&self) -> String {
        format!("SELECT COUNT(*) AS __count FROM {} d", self.keyspace_path())
    }

    /// Delete prefix.
    pub fn delete_prefix(&self) -> String {
        format!("DELETE FROM {} d", self.keyspace_path())
    }

    /// `RETURNING` clause for delete statements.
    pub fn returning(&self) -> &'static str {
        " RETURNING META(d).id"
    }

    /// Type-discriminator filter: `` d.`type_key` = "type_value" ``.
    pub fn type_filter(&self) -> String {
        format!("d.`{}` = \"{}\"", self.info.type_key, self.info.type_value)
    }
}
