//! Domain repositories built on [`ResourceStore`](crate::ResourceStore).
//!
//! Each repository owns the Cypher for its resources and turns shaped
//! records into domain types. Listing operations return an empty vector
//! when nothing matches; single-resource lookups return `NotFound`.

mod locations;
mod persons;
mod users;

pub use locations::Locations;
pub use persons::Persons;
pub use users::Users;

use archive_core::error::Result;
use archive_core::{NodeRecord, PersonName, RawRecord, Record};
use serde::de::DeserializeOwned;

use crate::backend::{counter, Statement};
use crate::record::RecordShape;
use crate::translate;

/// The node at `index` of a shaped record.
fn node_at(record: &Record, index: usize) -> Result<&NodeRecord> {
    record
        .node(index)
        .ok_or_else(|| translate::unprepared(format!("entity {index} is not a node")))
}

/// Decode the properties of the node at `index`.
fn decode_at<T: DeserializeOwned>(record: &Record, index: usize) -> Result<T> {
    node_at(record, index)?
        .decode()
        .map_err(|e| translate::unprepared(e.to_string()))
}

/// Shape every raw row and decode its first node.
fn decode_all<T: DeserializeOwned>(found: &[RawRecord], shape: &RecordShape) -> Result<Vec<T>> {
    found
        .iter()
        .map(|raw| decode_at(&shape.prepare(raw)?, 0))
        .collect()
}

/// First record of a lookup that `get` guarantees is non-empty.
fn first(records: Vec<Record>) -> Result<Record> {
    records
        .into_iter()
        .next()
        .ok_or_else(|| translate::unprepared("lookup returned no records"))
}

/// Bind the name parts as `$lastName`, `$firstName`, `$secondName`.
fn with_name(statement: Statement, name: &PersonName) -> Statement {
    statement
        .param("lastName", name.last_name.as_str())
        .param("firstName", name.first_name.as_str())
        .param("secondName", name.second_name.as_str())
}

/// `pattern` followed by a delete of `var` that counts what it removed.
fn counted_delete(pattern: &str, var: &str) -> Statement {
    Statement::new(format!(
        "{pattern} DELETE {var} RETURN count({var}) AS {}",
        counter::NODES_DELETED
    ))
}
