//! Scripted in-process backend for exercising the resource store without
//! a database.
//!
//! Responses are keyed by a fragment of the statement text; the first
//! registered fragment contained in a statement wins. Each fragment holds a
//! queue of responses and its last response repeats. Statements matching no
//! fragment return an empty outcome. Every backend call is recorded as an
//! [`Event`].

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use archive_core::config::DatabaseSettings;
use archive_core::{
    GraphPath, GraphValue, MutationSummary, NodeRecord, Properties, RawRecord, RelationshipRecord,
};
use archive_graph::{
    ConnectionProvider, DriverError, GraphBackend, GraphSession, GraphTransaction, QueryOutcome,
    Statement,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Open(String),
    Run { text: String, in_txn: bool },
    Begin,
    Commit,
    Rollback,
    Close,
}

type Response = Result<QueryOutcome, DriverError>;

#[derive(Default)]
struct Script {
    responses: Vec<(String, VecDeque<Response>)>,
    events: Vec<Event>,
    runs: Vec<Statement>,
    fail_open: Option<DriverError>,
    fail_commit: Option<DriverError>,
}

impl Script {
    fn respond(&mut self, statement: &Statement) -> Response {
        self.runs.push(statement.clone());
        let text = statement.text();
        let Some((_, queue)) = self
            .responses
            .iter_mut()
            .find(|(fragment, _)| text.contains(fragment.as_str()))
        else {
            return Ok(QueryOutcome::default());
        };
        if queue.len() > 1 {
            queue.pop_front().unwrap_or_else(|| Ok(QueryOutcome::default()))
        } else {
            queue.front().cloned().unwrap_or_else(|| Ok(QueryOutcome::default()))
        }
    }
}

#[derive(Clone, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }

    fn push(&self, fragment: &str, response: Response) -> &Self {
        let mut script = self.script();
        match script.responses.iter_mut().find(|(f, _)| f == fragment) {
            Some((_, queue)) => queue.push_back(response),
            None => script
                .responses
                .push((fragment.to_string(), VecDeque::from([response]))),
        }
        drop(script);
        self
    }

    /// Answer statements containing `fragment` with `outcome`.
    pub fn on(&self, fragment: &str, outcome: QueryOutcome) -> &Self {
        self.push(fragment, Ok(outcome))
    }

    /// Fail statements containing `fragment` with `err`.
    pub fn fail(&self, fragment: &str, err: DriverError) -> &Self {
        self.push(fragment, Err(err))
    }

    pub fn fail_open(&self, err: DriverError) {
        self.script().fail_open = Some(err);
    }

    pub fn fail_commit(&self, err: DriverError) {
        self.script().fail_commit = Some(err);
    }

    pub fn events(&self) -> Vec<Event> {
        self.script().events.clone()
    }

    pub fn count(&self, event: &Event) -> usize {
        self.script().events.iter().filter(|e| *e == event).count()
    }

    /// Texts of every statement run, in order.
    pub fn statements(&self) -> Vec<String> {
        self.script()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Run { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every statement run, with its parameters, in order.
    pub fn runs(&self) -> Vec<Statement> {
        self.script().runs.clone()
    }

    /// A provider over this backend. Clones share one script.
    pub fn provider(&self) -> ConnectionProvider<ScriptedBackend> {
        let databases = DatabaseSettings {
            users: "users".into(),
            archive: "archive".into(),
            environment: Some("test".into()),
        };
        ConnectionProvider::new(self.clone(), databases)
    }

    fn record(&self, event: Event) {
        self.script().events.push(event);
    }
}

impl GraphBackend for ScriptedBackend {
    type Session = ScriptedSession;

    async fn open(&self, database: &str) -> Result<ScriptedSession, DriverError> {
        if let Some(err) = self.script().fail_open.clone() {
            return Err(err);
        }
        self.record(Event::Open(database.to_string()));
        Ok(ScriptedSession {
            backend: self.clone(),
        })
    }
}

pub struct ScriptedSession {
    backend: ScriptedBackend,
}

impl GraphSession for ScriptedSession {
    type Transaction = ScriptedTransaction;

    async fn run(&mut self, statement: &Statement) -> Result<QueryOutcome, DriverError> {
        self.backend.record(Event::Run {
            text: statement.text().to_string(),
            in_txn: false,
        });
        self.backend.script().respond(statement)
    }

    async fn begin(&mut self) -> Result<ScriptedTransaction, DriverError> {
        self.backend.record(Event::Begin);
        Ok(ScriptedTransaction {
            backend: self.backend.clone(),
        })
    }

    async fn close(self) -> Result<(), DriverError> {
        self.backend.record(Event::Close);
        Ok(())
    }
}

pub struct ScriptedTransaction {
    backend: ScriptedBackend,
}

impl GraphTransaction for ScriptedTransaction {
    async fn run(&mut self, statement: &Statement) -> Result<QueryOutcome, DriverError> {
        self.backend.record(Event::Run {
            text: statement.text().to_string(),
            in_txn: true,
        });
        self.backend.script().respond(statement)
    }

    async fn commit(self) -> Result<(), DriverError> {
        self.backend.record(Event::Commit);
        match self.backend.script().fail_commit.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn rollback(self) -> Result<(), DriverError> {
        self.backend.record(Event::Rollback);
        Ok(())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────

pub fn props(value: serde_json::Value) -> Properties {
    value.as_object().cloned().unwrap_or_default()
}

pub fn node(label: &str, properties: serde_json::Value) -> NodeRecord {
    NodeRecord::new([label], props(properties))
}

pub fn rel(rel_type: &str) -> RelationshipRecord {
    RelationshipRecord::new(rel_type, Properties::new())
}

/// One row with a single node column.
pub fn node_row(column: &str, node: NodeRecord) -> RawRecord {
    RawRecord::new().with(column, GraphValue::Node(node))
}

pub fn path_row(column: &str, nodes: Vec<NodeRecord>, relationships: Vec<RelationshipRecord>) -> RawRecord {
    RawRecord::new().with(column, GraphValue::Path(GraphPath { nodes, relationships }))
}

pub fn rows(records: Vec<RawRecord>) -> QueryOutcome {
    QueryOutcome::rows(records)
}

pub fn created(nodes: u64) -> MutationSummary {
    MutationSummary {
        nodes_created: nodes,
        ..Default::default()
    }
}

pub fn deleted(nodes: u64) -> MutationSummary {
    MutationSummary {
        nodes_deleted: nodes,
        ..Default::default()
    }
}
