//! Read operations.

use archive_core::error::{code, Result};
use archive_core::{ArchiveError, RawRecord, Record};

use crate::backend::{GraphBackend, GraphSession, Statement};
use crate::provider::ResourceStore;
use crate::record::RecordShape;
use crate::translate;

impl<B: GraphBackend> ResourceStore<B> {
    /// Run a read statement in a short-lived session of its own.
    pub async fn find(&self, statement: &Statement) -> Result<Vec<RawRecord>> {
        let mut session = self.open().await?;
        let found = self.find_in(&mut session, statement).await;
        self.close(session).await;
        found
    }

    /// Run a read statement on a session the caller owns. The session is
    /// left open.
    pub async fn find_in(
        &self,
        session: &mut B::Session,
        statement: &Statement,
    ) -> Result<Vec<RawRecord>> {
        tracing::debug!(database = %self.database(), query = statement.text(), "Finding resources");
        let outcome = session.run(statement).await.map_err(translate::search)?;
        Ok(outcome.records)
    }

    /// Fetch every matching resource, shaped.
    ///
    /// Returns at least one record; no match is `NotFound`.
    pub async fn get(&self, statement: &Statement, shape: &RecordShape) -> Result<Vec<Record>> {
        let found = self.find(statement).await?;
        if found.is_empty() {
            return Err(ArchiveError::not_found(code::NOT_FOUND));
        }
        found.iter().map(|raw| shape.prepare(raw)).collect()
    }
}
