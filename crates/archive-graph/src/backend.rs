//! The seam between the resource-access layer and a concrete graph driver.
//!
//! A backend opens sessions bound to one logical database; a session runs
//! auto-commit statements and begins transactions. The Neo4j adapter in
//! [`crate::neo4j`] is the production implementation.

use archive_core::{MutationSummary, RawRecord};

/// Named statement parameters.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Query text plus its parameters and the result columns to materialize.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    text: String,
    params: Params,
    returns: Vec<String>,
}

impl Statement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Params::new(),
            returns: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Columns the driver should materialize from each row, in order.
    pub fn returns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.returns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Same query text and columns, different parameters.
    pub fn with_params(&self, params: Params) -> Self {
        Self {
            text: self.text.clone(),
            params,
            returns: self.returns.clone(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn columns(&self) -> &[String] {
        &self.returns
    }
}

/// Result columns a mutating statement uses to report its own counters,
/// for example `DELETE p RETURN count(p) AS nodesDeleted`.
pub mod counter {
    pub const NODES_CREATED: &str = "nodesCreated";
    pub const NODES_DELETED: &str = "nodesDeleted";
    pub const RELATIONSHIPS_CREATED: &str = "relationshipsCreated";
    pub const RELATIONSHIPS_DELETED: &str = "relationshipsDeleted";
}

/// Rows returned by one statement plus its mutation counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutcome {
    pub records: Vec<RawRecord>,
    pub summary: MutationSummary,
}

impl QueryOutcome {
    pub fn rows(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            summary: MutationSummary::default(),
        }
    }

    pub fn with_summary(mut self, summary: MutationSummary) -> Self {
        self.summary = summary;
        self
    }
}

/// Failures reported by a driver adapter, already classified.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DriverError {
    #[error("Graph connection error: {0}")]
    Connection(String),

    /// A node could not be deleted because relationships still reference it.
    #[error("Node still has relationships: {0}")]
    StillHasRelationships(String),

    #[error("Graph query error: {0}")]
    Query(String),
}

/// A graph database reachable by name.
#[allow(async_fn_in_trait)]
pub trait GraphBackend: Send + Sync {
    type Session: GraphSession;

    /// Open a session bound to `database`.
    async fn open(&self, database: &str) -> Result<Self::Session, DriverError>;
}

/// A connection context bound to one database.
#[allow(async_fn_in_trait)]
pub trait GraphSession: Send {
    type Transaction: GraphTransaction;

    /// Run one auto-commit statement and collect every row.
    async fn run(&mut self, statement: &Statement) -> Result<QueryOutcome, DriverError>;

    async fn begin(&mut self) -> Result<Self::Transaction, DriverError>;

    /// Release the session and its connection.
    async fn close(self) -> Result<(), DriverError>;
}

/// An open explicit transaction.
#[allow(async_fn_in_trait)]
pub trait GraphTransaction: Send {
    async fn run(&mut self, statement: &Statement) -> Result<QueryOutcome, DriverError>;

    async fn commit(self) -> Result<(), DriverError>;

    async fn rollback(self) -> Result<(), DriverError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn statement_builder_keeps_params_and_columns() {
        let stmt = Statement::new("MATCH (u:USER {email: $email}) RETURN u")
            .param("email", "a@b.com")
            .returns(["u"]);
        assert_eq!(stmt.params().get("email"), Some(&json!("a@b.com")));
        assert_eq!(stmt.columns(), ["u".to_string()]);

        let mut other = Params::new();
        other.insert("email".into(), json!("c@d.com"));
        let rematch = stmt.with_params(other);
        assert_eq!(rematch.text(), stmt.text());
        assert_eq!(rematch.columns(), stmt.columns());
        assert_eq!(rematch.params().get("email"), Some(&json!("c@d.com")));
    }
}
