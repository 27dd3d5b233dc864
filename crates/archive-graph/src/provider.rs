//! Connection provider and the per-database resource store.

use std::sync::Arc;

use archive_core::config::DatabaseSettings;
use archive_core::error::Result;
use archive_core::Partition;

use crate::backend::{GraphBackend, GraphSession};
use crate::translate;

/// Opens and releases sessions against a backend.
///
/// Holds the configuration it was built with; nothing is read from the
/// environment per call. Clone is cheap (inner Arc).
pub struct ConnectionProvider<B> {
    backend: Arc<B>,
    databases: Arc<DatabaseSettings>,
}

impl<B> Clone for ConnectionProvider<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            databases: Arc::clone(&self.databases),
        }
    }
}

impl<B: GraphBackend> ConnectionProvider<B> {
    pub fn new(backend: B, databases: DatabaseSettings) -> Self {
        Self {
            backend: Arc::new(backend),
            databases: Arc::new(databases),
        }
    }

    /// Physical database name for a partition.
    pub fn database(&self, partition: Partition) -> String {
        self.databases.name(partition)
    }

    /// Open a session bound to `database`.
    pub async fn open(&self, database: &str) -> Result<B::Session> {
        let session = self
            .backend
            .open(database)
            .await
            .map_err(translate::connection)?;
        tracing::debug!(database, "Opened graph session");
        Ok(session)
    }

    /// Release a session. A failure to close is logged, never returned, so
    /// that it cannot mask the outcome of the operation that used it.
    pub async fn close(&self, session: B::Session) {
        if let Err(e) = session.close().await {
            tracing::warn!(error = %e, "Failed to close graph session");
        }
    }

    /// A store bound to one partition.
    pub fn store(&self, partition: Partition) -> ResourceStore<B> {
        ResourceStore {
            provider: self.clone(),
            database: self.database(partition),
        }
    }
}

/// Finder, mutator, relationship builder, and path collector for one
/// database.
///
/// Every exported operation opens its own session on entry and closes it
/// before returning, on every path.
pub struct ResourceStore<B> {
    provider: ConnectionProvider<B>,
    database: String,
}

impl<B> Clone for ResourceStore<B> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            database: self.database.clone(),
        }
    }
}

impl<B: GraphBackend> ResourceStore<B> {
    pub fn database(&self) -> &str {
        &self.database
    }

    pub(crate) async fn open(&self) -> Result<B::Session> {
        self.provider.open(&self.database).await
    }

    pub(crate) async fn close(&self, session: B::Session) {
        self.provider.close(session).await;
    }
}
