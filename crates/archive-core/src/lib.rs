//! archive-core: Shared types, configuration, and error handling for the Archive.
//!
//! This crate provides the foundational types used across all Archive components:
//! - Graph values (nodes, relationships, paths, links) as immutable snapshots
//! - Domain resources (users, persons, locations)
//! - The error envelope and its stable code table
//! - Configuration management

pub mod config;
pub mod domain;
pub mod error;
pub mod types;

pub use config::{ArchiveConfig, Partition};
pub use domain::*;
pub use error::{ArchiveError, ErrorKind};
pub use types::*;
