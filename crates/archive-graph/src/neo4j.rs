//! Neo4j adapter over `neo4rs`.
//!
//! Each session owns a single-connection `Graph` bound to one database, so
//! a session is one connection and nothing is pooled across operations.
//! Driver failures are classified here into [`DriverError`] and nowhere
//! else.

use archive_core::config::Neo4jSettings;
use archive_core::{
    GraphPath, GraphValue, MutationSummary, NodeRecord, Properties, RawRecord, RelationshipRecord,
};
use neo4rs::{
    BoltList, BoltMap, BoltNull, BoltString, BoltType, ConfigBuilder, Graph, Query, Row, Txn,
};

use crate::backend::{
    counter, DriverError, GraphBackend, GraphSession, GraphTransaction, QueryOutcome, Statement,
};

/// Status code Neo4j reports when a schema rule rejects a write.
const CONSTRAINT_VALIDATION_FAILED: &str = "Neo.ClientError.Schema.ConstraintValidationFailed";

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self::from(&Neo4jSettings::default())
    }
}

impl From<&Neo4jSettings> for GraphConfig {
    fn from(settings: &Neo4jSettings) -> Self {
        Self {
            uri: settings.uri.clone(),
            user: settings.user.clone(),
            password: settings.password.clone(),
            fetch_size: settings.fetch_size,
        }
    }
}

/// Opens one Bolt connection per session.
#[derive(Debug, Clone)]
pub struct Neo4jBackend {
    config: GraphConfig,
}

impl Neo4jBackend {
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }
}

impl GraphBackend for Neo4jBackend {
    type Session = Neo4jSession;

    async fn open(&self, database: &str) -> Result<Neo4jSession, DriverError> {
        let neo_config = ConfigBuilder::default()
            .uri(&self.config.uri)
            .user(&self.config.user)
            .password(&self.config.password)
            .db(database)
            .max_connections(1)
            .fetch_size(self.config.fetch_size)
            .build()
            .map_err(|e| DriverError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| DriverError::Connection(e.to_string()))?;

        tracing::info!(uri = %self.config.uri, database, "Connected to Neo4j");
        Ok(Neo4jSession { graph })
    }
}

/// A single-connection graph handle bound to one database.
pub struct Neo4jSession {
    graph: Graph,
}

impl GraphSession for Neo4jSession {
    type Transaction = Neo4jTransaction;

    async fn run(&mut self, statement: &Statement) -> Result<QueryOutcome, DriverError> {
        let mut stream = self.graph.execute(to_query(statement)).await.map_err(classify)?;
        let mut records = Vec::new();
        while let Some(row) = stream.next().await.map_err(classify)? {
            records.push(to_raw(&row, statement.columns())?);
        }
        Ok(QueryOutcome::rows(records))
    }

    async fn begin(&mut self) -> Result<Neo4jTransaction, DriverError> {
        let txn = self.graph.start_txn().await.map_err(classify)?;
        Ok(Neo4jTransaction { txn })
    }

    async fn close(self) -> Result<(), DriverError> {
        // Dropping the last handle closes the connection.
        drop(self.graph);
        Ok(())
    }
}

/// An explicit Bolt transaction.
pub struct Neo4jTransaction {
    txn: Txn,
}

impl GraphTransaction for Neo4jTransaction {
    async fn run(&mut self, statement: &Statement) -> Result<QueryOutcome, DriverError> {
        let mut stream = self.txn.execute(to_query(statement)).await.map_err(classify)?;
        let mut outcome = QueryOutcome::default();
        while let Some(row) = stream.next(self.txn.handle()).await.map_err(classify)? {
            add_counters(&mut outcome.summary, &row);
            outcome.records.push(to_raw(&row, statement.columns())?);
        }
        Ok(outcome)
    }

    async fn commit(self) -> Result<(), DriverError> {
        self.txn.commit().await.map_err(classify)
    }

    async fn rollback(self) -> Result<(), DriverError> {
        self.txn.rollback().await.map_err(classify)
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn classify(err: neo4rs::Error) -> DriverError {
    match &err {
        neo4rs::Error::IOError { .. } | neo4rs::Error::ConnectionError => {
            DriverError::Connection(err.to_string())
        }
        neo4rs::Error::Neo4j(e)
            if e.code() == CONSTRAINT_VALIDATION_FAILED
                && e.message().contains("still has relationships") =>
        {
            DriverError::StillHasRelationships(e.message().to_string())
        }
        _ => DriverError::Query(err.to_string()),
    }
}

fn to_query(statement: &Statement) -> Query {
    statement
        .params()
        .iter()
        .fold(neo4rs::query(statement.text()), |q, (key, value)| {
            q.param(key, to_bolt(value))
        })
}

fn to_bolt(value: &serde_json::Value) -> BoltType {
    match value {
        serde_json::Value::Null => BoltType::Null(BoltNull),
        serde_json::Value::Bool(b) => BoltType::from(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => BoltType::from(i),
            None => BoltType::from(n.as_f64().unwrap_or_default()),
        },
        serde_json::Value::String(s) => BoltType::from(s.as_str()),
        serde_json::Value::Array(items) => {
            BoltType::List(BoltList::from(items.iter().map(to_bolt).collect::<Vec<_>>()))
        }
        serde_json::Value::Object(map) => {
            let mut bolt = BoltMap::new();
            for (key, value) in map {
                bolt.put(BoltString::from(key.as_str()), to_bolt(value));
            }
            BoltType::Map(bolt)
        }
    }
}

/// Sum the counter columns a statement reports about itself. The 0.8
/// driver does not surface the server's result summary.
fn add_counters(summary: &mut MutationSummary, row: &Row) {
    let count = |column: &str| {
        row.get::<i64>(column)
            .ok()
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or_default()
    };
    summary.nodes_created += count(counter::NODES_CREATED);
    summary.nodes_deleted += count(counter::NODES_DELETED);
    summary.relationships_created += count(counter::RELATIONSHIPS_CREATED);
    summary.relationships_deleted += count(counter::RELATIONSHIPS_DELETED);
}

fn to_raw(row: &Row, columns: &[String]) -> Result<RawRecord, DriverError> {
    let mut raw = RawRecord::new();
    for column in columns {
        if let Some(value) = column_value(row, column)? {
            raw.push(column.clone(), value);
        }
    }
    Ok(raw)
}

fn column_value(row: &Row, column: &str) -> Result<Option<GraphValue>, DriverError> {
    if let Ok(node) = row.get::<neo4rs::Node>(column) {
        return Ok(Some(GraphValue::Node(node_record(&node))));
    }
    if let Ok(rel) = row.get::<neo4rs::Relation>(column) {
        let properties = collect_properties(rel.keys(), |k| rel.get(k).ok());
        let record = RelationshipRecord::new(rel.typ(), properties);
        return Ok(Some(GraphValue::Relationship(record)));
    }
    if let Ok(path) = row.get::<neo4rs::Path>(column) {
        return Ok(Some(GraphValue::Path(path_record(&path)?)));
    }
    Ok(row.get::<serde_json::Value>(column).ok().map(GraphValue::Scalar))
}

fn node_record(node: &neo4rs::Node) -> NodeRecord {
    let properties = collect_properties(node.keys(), |k| node.get(k).ok());
    NodeRecord::new(node.labels(), properties)
}

fn path_record(path: &neo4rs::Path) -> Result<GraphPath, DriverError> {
    let nodes: Vec<NodeRecord> = path.nodes().iter().map(node_record).collect();
    let rels: Vec<RelationshipRecord> = path
        .rels()
        .iter()
        .map(|rel| {
            let properties = collect_properties(rel.keys(), |k| rel.get(k).ok());
            RelationshipRecord::new(rel.typ(), properties)
        })
        .collect();
    let (nodes, relationships) = walk(&nodes, &rels, &path.indices()).ok_or_else(|| {
        DriverError::Query("path index sequence does not match its nodes".into())
    })?;
    Ok(GraphPath {
        nodes,
        relationships,
    })
}

/// Replay a Bolt path into the walk it describes.
///
/// Bolt sends each distinct node and relationship once, plus an index
/// sequence of `(relationship, node)` pairs starting from `nodes[0]`.
/// Relationship indices are 1-based and negative when the step runs
/// against the relationship's direction; node indices are 0-based.
/// Segments keep traversal order either way.
fn walk<N: Clone, R: Clone>(
    nodes: &[N],
    rels: &[R],
    indices: &[i64],
) -> Option<(Vec<N>, Vec<R>)> {
    if indices.len() % 2 != 0 {
        return None;
    }
    let mut walked_nodes = vec![nodes.first()?.clone()];
    let mut walked_rels = Vec::with_capacity(indices.len() / 2);
    for step in indices.chunks_exact(2) {
        let rel = usize::try_from(step[0].unsigned_abs()).ok()?.checked_sub(1)?;
        let node = usize::try_from(step[1]).ok()?;
        walked_rels.push(rels.get(rel)?.clone());
        walked_nodes.push(nodes.get(node)?.clone());
    }
    Some((walked_nodes, walked_rels))
}

fn collect_properties<'a>(
    keys: Vec<&'a str>,
    get: impl Fn(&'a str) -> Option<serde_json::Value>,
) -> Properties {
    keys.into_iter()
        .filter_map(|key| Some((key.to_string(), get(key)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn scalar_params_convert_to_bolt() {
        assert_eq!(to_bolt(&json!(true)), BoltType::from(true));
        assert_eq!(to_bolt(&json!(42)), BoltType::from(42_i64));
        assert_eq!(to_bolt(&json!("Toklas")), BoltType::from("Toklas"));
        assert_eq!(to_bolt(&json!(null)), BoltType::Null(BoltNull));
    }

    #[test]
    fn nested_params_convert_to_bolt() {
        let list = to_bolt(&json!(["a", "b"]));
        assert!(matches!(list, BoltType::List(ref l) if l.len() == 2));

        let map = to_bolt(&json!({"name": "Paris"}));
        assert!(matches!(map, BoltType::Map(_)));
    }

    #[test]
    fn walk_replays_revisited_nodes() {
        // a-[r1]->b-[r2]->a-[r3]->c
        let (nodes, rels) =
            walk(&["a", "b", "c"], &["r1", "r2", "r3"], &[1, 1, 2, 0, 3, 2]).unwrap();
        assert_eq!(nodes, ["a", "b", "a", "c"]);
        assert_eq!(rels, ["r1", "r2", "r3"]);
    }

    #[test]
    fn walk_follows_relationships_against_their_direction() {
        // one relationship walked out and back
        let (nodes, rels) = walk(&["a", "b"], &["r1"], &[-1, 1, 1, 0]).unwrap();
        assert_eq!(nodes, ["a", "b", "a"]);
        assert_eq!(rels, ["r1", "r1"]);
    }

    #[test]
    fn zero_length_walk_is_its_start_node() {
        let (nodes, rels) = walk::<_, &str>(&["a"], &[], &[]).unwrap();
        assert_eq!(nodes, ["a"]);
        assert!(rels.is_empty());
    }

    #[test]
    fn malformed_index_sequence_is_rejected() {
        assert!(walk(&["a", "b"], &["r1"], &[1]).is_none());
        assert!(walk(&["a", "b"], &["r1"], &[0, 1]).is_none());
        assert!(walk(&["a", "b"], &["r1"], &[2, 1]).is_none());
        assert!(walk(&["a", "b"], &["r1"], &[1, 5]).is_none());
        assert!(walk::<&str, &str>(&[], &[], &[]).is_none());
    }

    #[test]
    fn graph_config_from_settings() {
        let config = GraphConfig::default();
        assert_eq!(config.uri, "bolt://localhost:7687");
        assert_eq!(config.fetch_size, 256);
    }
}
