//! Finder against the scripted backend.

mod common;

use archive_core::{ErrorKind, Partition};
use archive_graph::{DriverError, RecordShape, Statement};
use common::{node, node_row, rows, Event, ScriptedBackend};
use serde_json::json;

fn persons() -> Statement {
    Statement::new("MATCH (p:PERSON) RETURN p").returns(["p"])
}

#[tokio::test]
async fn find_opens_and_closes_its_own_session() {
    let backend = ScriptedBackend::new();
    backend.on(
        "MATCH (p:PERSON)",
        rows(vec![
            node_row("p", node("PERSON", json!({"id": "p1", "lastName": "Toklas"}))),
            node_row("p", node("PERSON", json!({"id": "p2", "lastName": "Stein"}))),
        ]),
    );
    let store = backend.provider().store(Partition::Archive);

    let found = store.find(&persons()).await.unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(
        backend.events(),
        vec![
            Event::Open("archivetest".into()),
            Event::Run {
                text: persons().text().to_string(),
                in_txn: false
            },
            Event::Close,
        ]
    );
}

#[tokio::test]
async fn find_on_caller_session_leaves_it_open() {
    let backend = ScriptedBackend::new();
    let provider = backend.provider();
    let store = provider.store(Partition::Archive);

    let mut session = provider.open("archivetest").await.unwrap();
    store.find_in(&mut session, &persons()).await.unwrap();
    store.find_in(&mut session, &persons()).await.unwrap();
    assert_eq!(backend.count(&Event::Close), 0);

    provider.close(session).await;
    assert_eq!(backend.count(&Event::Open("archivetest".into())), 1);
    assert_eq!(backend.count(&Event::Close), 1);
}

#[tokio::test]
async fn search_failure_is_classified() {
    let backend = ScriptedBackend::new();
    backend.fail("MATCH (p:PERSON)", DriverError::Query("unknown function".into()));
    let store = backend.provider().store(Partition::Archive);

    let err = store.find(&persons()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Search);
    assert_eq!(err.code(), 1002);
    assert_eq!(backend.count(&Event::Close), 1);
}

#[tokio::test]
async fn search_transport_failure_stays_connection() {
    let backend = ScriptedBackend::new();
    backend.fail("MATCH (p:PERSON)", DriverError::Connection("broken pipe".into()));
    let store = backend.provider().store(Partition::Archive);

    let err = store.find(&persons()).await.unwrap_err();
    assert_eq!(err.code(), 1001);
}

#[tokio::test]
async fn get_without_match_is_not_found() {
    let backend = ScriptedBackend::new();
    let store = backend.provider().store(Partition::Archive);

    let err = store
        .get(&persons(), &RecordShape::single("p"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), 2007);
    assert_eq!(backend.count(&Event::Close), 1);
}

#[tokio::test]
async fn get_shapes_every_match() {
    let backend = ScriptedBackend::new();
    backend.on(
        "MATCH (p:PERSON)",
        rows(vec![node_row("p", node("PERSON", json!({"id": "p1"})))]),
    );
    let store = backend.provider().store(Partition::Archive);

    let records = store.get(&persons(), &RecordShape::single("p")).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].node(0).unwrap().id(), Some("p1"));
}
