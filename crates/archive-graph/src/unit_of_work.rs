//! Transaction boundary around one session.

use archive_core::error::Result;
use archive_core::ArchiveError;

use crate::backend::{DriverError, GraphSession, GraphTransaction, QueryOutcome, Statement};

/// An open transaction that must end in exactly one commit or rollback.
///
/// `commit` and `rollback` consume the guard, so neither can happen twice.
/// A guard dropped while still open logs a warning; the server discards
/// the transaction when its connection is released.
pub struct UnitOfWork<T: GraphTransaction> {
    txn: Option<T>,
}

impl<T: GraphTransaction> UnitOfWork<T> {
    pub async fn begin<S>(session: &mut S) -> std::result::Result<Self, DriverError>
    where
        S: GraphSession<Transaction = T>,
    {
        let txn = session.begin().await?;
        Ok(Self { txn: Some(txn) })
    }

    pub async fn run(&mut self, statement: &Statement) -> std::result::Result<QueryOutcome, DriverError> {
        let txn = self
            .txn
            .as_mut()
            .ok_or_else(|| DriverError::Query("transaction already finished".to_string()))?;
        tracing::debug!(query = statement.text(), "Running statement in transaction");
        txn.run(statement).await
    }

    pub async fn commit(mut self) -> std::result::Result<(), DriverError> {
        match self.txn.take() {
            Some(txn) => txn.commit().await,
            None => Ok(()),
        }
    }

    /// Roll back. A failed rollback is logged; the transaction is abandoned
    /// either way.
    pub async fn rollback(mut self) {
        if let Some(txn) = self.txn.take() {
            tracing::warn!("Rolling back transaction");
            if let Err(e) = txn.rollback().await {
                tracing::warn!(error = %e, "Rollback failed");
            }
        }
    }

    /// Commit when `outcome` is `Ok`, roll back when it is `Err`.
    ///
    /// The domain error in `outcome` is returned unchanged after rollback. A
    /// failed commit is classified by `on_commit_fault`.
    pub async fn finish<V>(
        self,
        outcome: Result<V>,
        on_commit_fault: impl FnOnce(DriverError) -> ArchiveError,
    ) -> Result<V> {
        match outcome {
            Ok(value) => {
                self.commit().await.map_err(on_commit_fault)?;
                Ok(value)
            }
            Err(err) => {
                self.rollback().await;
                Err(err)
            }
        }
    }
}

impl<T: GraphTransaction> Drop for UnitOfWork<T> {
    fn drop(&mut self) {
        if self.txn.is_some() {
            tracing::warn!("Unit of work dropped without commit or rollback");
        }
    }
}
