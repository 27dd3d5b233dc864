//! Classification of driver failures into the domain error taxonomy.
//!
//! Every [`DriverError`] leaving this crate passes through one of these
//! functions. A transport failure is always a connection error, whatever
//! step it interrupted.

use archive_core::error::{code, message};
use archive_core::ArchiveError;

use crate::backend::DriverError;

/// Failure to open a session.
pub fn connection(err: DriverError) -> ArchiveError {
    ArchiveError::connection(err)
}

/// Failure of a read or pre-check.
pub fn search(err: DriverError) -> ArchiveError {
    match err {
        DriverError::Connection(_) => ArchiveError::connection(err),
        other => ArchiveError::search(other),
    }
}

/// Failure of a write step, reported under the operation's own code.
pub fn fault(err: DriverError, code: u16, message: &str) -> ArchiveError {
    match err {
        DriverError::Connection(_) => ArchiveError::connection(err),
        other => ArchiveError::internal(code, message).with_cause(other),
    }
}

/// Failure of a deletion, which may be blocked by dependent relationships.
pub fn deletion(err: DriverError) -> ArchiveError {
    match err {
        DriverError::StillHasRelationships(_) => ArchiveError::has_relationships().with_cause(err),
        other => fault(other, code::DELETE_FAILED, message::COULD_NOT_DELETE),
    }
}

/// A returned row did not have the shape the caller asked for.
pub fn unprepared(reason: impl Into<String>) -> ArchiveError {
    let reason: String = reason.into();
    ArchiveError::internal(code::CREATE_FAILED, message::COULD_NOT_PREP_RECORD).with_cause(reason)
}

/// A mutation returned a number of rows the operation does not accept.
pub fn record_count(code: u16, message: &str, found: usize) -> ArchiveError {
    ArchiveError::internal(code, message).with_detail("records", format!("record length: {found}"))
}
