//! Record shapes: which columns of a raw row an operation exposes.

use archive_core::error::Result;
use archive_core::{Entity, GraphValue, RawRecord, Record};

use crate::translate;

/// Ordered column names to expose from each returned row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordShape(Vec<String>);

impl RecordShape {
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(columns.into_iter().map(Into::into).collect())
    }

    /// Expose a single column.
    pub fn single(column: impl Into<String>) -> Self {
        Self(vec![column.into()])
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Extract the shaped entities from `raw`.
    ///
    /// Fails when a column is missing or holds something other than a node
    /// or relationship.
    pub fn prepare(&self, raw: &RawRecord) -> Result<Record> {
        let mut entities = Vec::with_capacity(self.0.len());
        for column in &self.0 {
            let entity = match raw.get(column) {
                Some(GraphValue::Node(node)) => Entity::Node(node.clone()),
                Some(GraphValue::Relationship(rel)) => Entity::Relationship(rel.clone()),
                Some(_) => {
                    return Err(translate::unprepared(format!(
                        "column {column} is not a node or relationship"
                    )))
                }
                None => return Err(translate::unprepared(format!("column {column} missing"))),
            };
            entities.push(entity);
        }
        Ok(Record::new(entities))
    }
}
