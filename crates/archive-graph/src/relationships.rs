//! Relationship creation between existing resources.

use archive_core::error::{code, message, Result};
use archive_core::{ArchiveError, Mutated, Record};

use crate::backend::{GraphBackend, Statement};
use crate::provider::ResourceStore;
use crate::record::RecordShape;
use crate::translate;
use crate::unit_of_work::UnitOfWork;

/// Match statements identifying both endpoints and the relationship itself.
#[derive(Debug, Clone)]
pub struct RelationshipMatch<'a> {
    pub start: &'a Statement,
    pub end: &'a Statement,
    pub existing: &'a Statement,
}

impl<B: GraphBackend> ResourceStore<B> {
    /// Create a relationship between two resources that must both exist,
    /// unless `matches.existing` already finds it.
    pub async fn add_relationship(
        &self,
        matches: RelationshipMatch<'_>,
        creation: &Statement,
        shape: &RecordShape,
    ) -> Result<Record> {
        let mut session = self.open().await?;
        let added = self
            .add_relationship_in(&mut session, matches, creation, shape)
            .await;
        self.close(session).await;
        added
    }

    async fn add_relationship_in(
        &self,
        session: &mut B::Session,
        matches: RelationshipMatch<'_>,
        creation: &Statement,
        shape: &RecordShape,
    ) -> Result<Record> {
        if self.find_in(session, matches.start).await?.is_empty() {
            return Err(ArchiveError::not_found(code::START_MISSING));
        }
        if self.find_in(session, matches.end).await?.is_empty() {
            return Err(ArchiveError::not_found(code::END_MISSING));
        }
        if !self.find_in(session, matches.existing).await?.is_empty() {
            return Err(ArchiveError::already_exists(code::RELATIONSHIP_EXISTS));
        }

        let relate_fault = |e| {
            translate::fault(
                e,
                code::RELATIONSHIP_FAILED,
                message::COULD_NOT_CREATE_RELATIONSHIP,
            )
        };
        let mut uow = UnitOfWork::begin(session).await.map_err(relate_fault)?;
        let outcome: Result<Record> = async {
            let result = uow.run(creation).await.map_err(relate_fault)?;
            match result.records.as_slice() {
                [only] => shape.prepare(only),
                other => Err(translate::record_count(
                    code::RELATIONSHIP_RECORD_COUNT,
                    message::COULD_NOT_CREATE_RELATIONSHIP,
                    other.len(),
                )),
            }
        }
        .await;
        let record = uow.finish(outcome, relate_fault).await?;

        tracing::info!(database = %self.database(), "Created relationship");
        Ok(record)
    }

    /// Attach a child to an existing parent, unless `duplicate` shows the
    /// same attachment already exists. The attach statement may return
    /// several rows; every row is shaped.
    pub async fn add_child_to_parent(
        &self,
        parent: &Statement,
        duplicate: &Statement,
        attach: &Statement,
        shape: &RecordShape,
    ) -> Result<Mutated<Vec<Record>>> {
        let mut session = self.open().await?;
        let attached = self
            .add_child_in(&mut session, parent, duplicate, attach, shape)
            .await;
        self.close(session).await;
        attached
    }

    async fn add_child_in(
        &self,
        session: &mut B::Session,
        parent: &Statement,
        duplicate: &Statement,
        attach: &Statement,
        shape: &RecordShape,
    ) -> Result<Mutated<Vec<Record>>> {
        if self.find_in(session, parent).await?.is_empty() {
            return Err(ArchiveError::not_found(code::PARENT_MISSING));
        }
        if !self.find_in(session, duplicate).await?.is_empty() {
            return Err(ArchiveError::already_exists(code::CHILD_ALREADY_ATTACHED));
        }

        let attach_fault = |e| translate::fault(e, code::ATTACH_FAILED, message::COULD_NOT_ATTACH);
        let mut uow = UnitOfWork::begin(session).await.map_err(attach_fault)?;
        let outcome: Result<Mutated<Vec<Record>>> = async {
            let result = uow.run(attach).await.map_err(attach_fault)?;
            if result.records.is_empty() {
                return Err(translate::record_count(
                    code::ATTACH_RETURNED_NOTHING,
                    message::COULD_NOT_ATTACH,
                    0,
                ));
            }
            let records = result
                .records
                .iter()
                .map(|raw| shape.prepare(raw))
                .collect::<Result<Vec<_>>>()?;
            Ok(Mutated {
                record: records,
                summary: result.summary,
            })
        }
        .await;
        uow.finish(outcome, attach_fault).await
    }
}
