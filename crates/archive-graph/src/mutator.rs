//! Create, update, and delete with pre-checks and verified outcomes.
//!
//! Each operation matches before it mutates, mutates inside one unit of
//! work, and checks the shape of what the database reports before
//! committing. The uniqueness pre-check is best-effort: two concurrent
//! creates can both observe no match, so a unique constraint in the
//! database remains the authoritative guard.

use archive_core::error::{code, message, Result};
use archive_core::{ArchiveError, MutationSummary, Mutated, RawRecord, Record};

use crate::backend::{GraphBackend, Params, Statement};
use crate::provider::ResourceStore;
use crate::record::RecordShape;
use crate::translate;
use crate::unit_of_work::UnitOfWork;

/// Counters a deletion must report exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedDeletion {
    pub nodes: u64,
    /// `None` accepts any number of deleted relationships.
    pub relationships: Option<u64>,
}

impl ExpectedDeletion {
    pub fn nodes(nodes: u64) -> Self {
        Self {
            nodes,
            relationships: None,
        }
    }

    pub fn with_relationships(mut self, relationships: u64) -> Self {
        self.relationships = Some(relationships);
        self
    }

    fn verify(&self, summary: &MutationSummary) -> Result<()> {
        if summary.nodes_deleted != self.nodes {
            return Err(ArchiveError::unexpected_delete_count(
                self.nodes,
                summary.nodes_deleted,
            ));
        }
        match self.relationships {
            Some(expected) if expected != summary.relationships_deleted => {
                Err(ArchiveError::count_mismatch(
                    "relationshipsDeleted",
                    expected,
                    summary.relationships_deleted,
                ))
            }
            _ => Ok(()),
        }
    }
}

impl Default for ExpectedDeletion {
    fn default() -> Self {
        Self::nodes(1)
    }
}

impl<B: GraphBackend> ResourceStore<B> {
    // ── Create ───────────────────────────────────────────────────

    /// Create a resource unless `matching` already finds one.
    pub async fn create(
        &self,
        matching: Option<&Statement>,
        creation: &Statement,
        shape: &RecordShape,
    ) -> Result<Mutated<Record>> {
        let mut session = self.open().await?;
        let created = self.create_in(&mut session, matching, creation, shape).await;
        self.close(session).await;
        created
    }

    async fn create_in(
        &self,
        session: &mut B::Session,
        matching: Option<&Statement>,
        creation: &Statement,
        shape: &RecordShape,
    ) -> Result<Mutated<Record>> {
        if let Some(matching) = matching {
            if !self.find_in(session, matching).await?.is_empty() {
                return Err(ArchiveError::already_exists(code::ALREADY_EXISTS));
            }
        }

        let create_fault = |e| translate::fault(e, code::CREATE_FAILED, message::COULD_NOT_CREATE);
        let mut uow = UnitOfWork::begin(session).await.map_err(create_fault)?;
        let outcome: Result<Mutated<Record>> = async {
            let result = uow.run(creation).await.map_err(create_fault)?;
            let raw = exactly_one(&result.records, message::COULD_NOT_CREATE)?;
            Ok(Mutated {
                record: shape.prepare(raw)?,
                summary: result.summary,
            })
        }
        .await;
        let created = uow.finish(outcome, create_fault).await?;

        tracing::info!(database = %self.database(), nodes_created = created.summary.nodes_created, "Created resource");
        Ok(created)
    }

    // ── Update ───────────────────────────────────────────────────

    /// Update the resource `matching` finds.
    ///
    /// When `conflict_params` is given, `matching` is re-run with them first
    /// (typically a new value of a unique key) and any hit is a conflict.
    pub async fn update(
        &self,
        matching: &Statement,
        conflict_params: Option<Params>,
        update: &Statement,
        shape: &RecordShape,
    ) -> Result<Mutated<Record>> {
        let mut session = self.open().await?;
        let updated = self
            .update_in(&mut session, matching, conflict_params, update, shape)
            .await;
        self.close(session).await;
        updated
    }

    async fn update_in(
        &self,
        session: &mut B::Session,
        matching: &Statement,
        conflict_params: Option<Params>,
        update: &Statement,
        shape: &RecordShape,
    ) -> Result<Mutated<Record>> {
        if self.find_in(session, matching).await?.is_empty() {
            return Err(ArchiveError::not_found(code::UPDATE_TARGET_MISSING));
        }
        if let Some(params) = conflict_params {
            let rematch = matching.with_params(params);
            if !self.find_in(session, &rematch).await?.is_empty() {
                return Err(ArchiveError::already_exists(code::UPDATE_CONFLICT));
            }
        }

        let update_fault = |e| translate::fault(e, code::UPDATE_FAILED, message::COULD_NOT_UPDATE);
        let mut uow = UnitOfWork::begin(session).await.map_err(update_fault)?;
        let outcome: Result<Mutated<Record>> = async {
            let result = uow.run(update).await.map_err(update_fault)?;
            let raw = exactly_one(&result.records, message::COULD_NOT_UPDATE)?;
            Ok(Mutated {
                record: shape.prepare(raw)?,
                summary: result.summary,
            })
        }
        .await;
        uow.finish(outcome, update_fault).await
    }

    // ── Delete ───────────────────────────────────────────────────

    /// Delete what `matching` finds, committing only if the database reports
    /// exactly the `expected` counts.
    pub async fn delete(
        &self,
        matching: &Statement,
        deletion: &Statement,
        expected: ExpectedDeletion,
    ) -> Result<()> {
        let mut session = self.open().await?;
        let deleted = self
            .delete_in(&mut session, matching, deletion, expected)
            .await;
        self.close(session).await;
        deleted
    }

    async fn delete_in(
        &self,
        session: &mut B::Session,
        matching: &Statement,
        deletion: &Statement,
        expected: ExpectedDeletion,
    ) -> Result<()> {
        if self.find_in(session, matching).await?.is_empty() {
            return Err(ArchiveError::not_found(code::NOT_FOUND));
        }

        let mut uow = UnitOfWork::begin(session)
            .await
            .map_err(translate::deletion)?;
        let outcome: Result<()> = async {
            let result = uow.run(deletion).await.map_err(translate::deletion)?;
            expected.verify(&result.summary)
        }
        .await;
        uow.finish(outcome, translate::deletion).await?;

        tracing::info!(database = %self.database(), nodes_deleted = expected.nodes, "Deleted resource");
        Ok(())
    }
}

/// The only row of a mutation that must produce exactly one.
fn exactly_one<'a>(records: &'a [RawRecord], message: &str) -> Result<&'a RawRecord> {
    match records {
        [only] => Ok(only),
        _ => Err(translate::record_count(
            code::UNEXPECTED_RECORD_COUNT,
            message,
            records.len(),
        )),
    }
}
