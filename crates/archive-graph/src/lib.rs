//! Archive Graph: resource access over a Neo4j property graph.
//!
//! Every read and write against the archive's graph databases flows through
//! this crate. A [`ConnectionProvider`] opens sessions against a
//! [`GraphBackend`]; a [`ResourceStore`] bound to one database runs
//! finder, mutator, relationship, and path operations, each in its own
//! session and each ending in exactly one commit or rollback. Failures
//! leave as [`archive_core::ArchiveError`] with a stable code.

pub mod backend;
pub mod finder;
pub mod mutator;
pub mod neo4j;
pub mod paths;
pub mod provider;
pub mod record;
pub mod relationships;
pub mod repo;
pub mod translate;
pub mod unit_of_work;

pub use backend::{
    DriverError, GraphBackend, GraphSession, GraphTransaction, Params, QueryOutcome, Statement,
};
pub use mutator::ExpectedDeletion;
pub use neo4j::{GraphConfig, Neo4jBackend};
pub use paths::collect_links;
pub use provider::{ConnectionProvider, ResourceStore};
pub use record::RecordShape;
pub use relationships::RelationshipMatch;
pub use repo::{Locations, Persons, Users};
pub use unit_of_work::UnitOfWork;
