//! The error envelope every Archive operation returns.
//!
//! Codes are partitioned by range so the API boundary can map them to a
//! transport status without inspecting messages:
//! - 1000–1999: internal or connection failures (500)
//! - 2000–2999: domain conflicts (409) and missing resources (404)
//! - 3000–3999: caller input validation, owned by the layer above this one

use std::fmt;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Boxed cause carried inside an [`ArchiveError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Stable numeric codes.
pub mod code {
    pub const COULD_NOT_CONNECT: u16 = 1001;
    pub const SEARCH_FAILED: u16 = 1002;
    pub const DELETE_FAILED: u16 = 1004;
    pub const UPDATE_FAILED: u16 = 1005;
    /// Creation fault or record-shape extraction failure.
    pub const CREATE_FAILED: u16 = 1006;
    pub const ATTACH_FAILED: u16 = 1007;
    pub const UNEXPECTED_DELETE_COUNT: u16 = 1008;
    pub const ATTACH_RETURNED_NOTHING: u16 = 1009;
    pub const UNEXPECTED_RECORD_COUNT: u16 = 1010;
    pub const RELATIONSHIP_FAILED: u16 = 1016;
    pub const RELATIONSHIP_RECORD_COUNT: u16 = 1017;

    pub const ALREADY_EXISTS: u16 = 2001;
    pub const UPDATE_TARGET_MISSING: u16 = 2003;
    pub const UPDATE_CONFLICT: u16 = 2004;
    pub const NOT_FOUND: u16 = 2007;
    pub const HAS_RELATIONSHIPS: u16 = 2008;
    pub const PARENT_MISSING: u16 = 2009;
    pub const START_MISSING: u16 = 2011;
    pub const CHILD_ALREADY_ATTACHED: u16 = 2011;
    pub const END_MISSING: u16 = 2012;
    pub const RELATIONSHIP_EXISTS: u16 = 2013;
    pub const PATH_NOT_FOUND: u16 = 2014;
}

/// Human messages paired with the codes above.
pub mod message {
    pub const COULD_NOT_CONNECT: &str = "Could Not Connect to Database";
    pub const SEARCH_FAILED: &str = "Resource Search Error";
    pub const COULD_NOT_CREATE: &str = "Could Not Create Resource";
    pub const COULD_NOT_FIND: &str = "Could Not Find Resource";
    pub const COULD_NOT_DELETE: &str = "Could Not Delete Resource";
    pub const COULD_NOT_UPDATE: &str = "Could Not Update Resource";
    pub const ALREADY_EXISTS: &str = "Resource Already Exists";
    pub const HAS_RELATIONSHIPS: &str = "Resource Has Existing Relationships";
    pub const COULD_NOT_PREP_RECORD: &str = "Could Not Prep Record";
    pub const UNEXPECTED_DELETE_COUNT: &str = "Nodes Tried To Delete Unexpected Number";
    pub const COULD_NOT_ATTACH: &str = "Could Not Attach Child to Parent Resource";
    pub const COULD_NOT_CREATE_RELATIONSHIP: &str = "Could Not Create Relationship";
}

/// Discriminates how a failure should be treated by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// The database could not be reached. Fatal for the operation.
    Connection,
    /// A read failed unexpectedly.
    Search,
    /// A pre-check required presence and found nothing.
    NotFound,
    /// A pre-check required absence and found a match, or a delete was
    /// blocked by dependent relationships.
    Conflict,
    /// A mutation touched an unexpected number of records.
    CountMismatch,
    Internal,
}

impl ErrorKind {
    /// Transport status the API boundary reports for this kind.
    pub fn status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Connection | Self::Search | Self::CountMismatch | Self::Internal => 500,
        }
    }
}

/// Field-level detail attached to an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDetail {
    pub field: String,
    pub message: String,
}

/// Domain error returned across the resource-access boundary.
#[derive(Debug, Error)]
#[error("{message} ({code})")]
pub struct ArchiveError {
    kind: ErrorKind,
    code: u16,
    message: String,
    details: Vec<FieldDetail>,
    #[source]
    cause: Option<BoxError>,
}

impl ArchiveError {
    pub fn new(kind: ErrorKind, code: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
            details: Vec::new(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn with_detail(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.details.push(FieldDetail {
            field: field.into(),
            message: message.into(),
        });
        self
    }

    pub fn connection(cause: impl Into<BoxError>) -> Self {
        Self::new(
            ErrorKind::Connection,
            code::COULD_NOT_CONNECT,
            message::COULD_NOT_CONNECT,
        )
        .with_cause(cause)
    }

    pub fn search(cause: impl Into<BoxError>) -> Self {
        Self::new(ErrorKind::Search, code::SEARCH_FAILED, message::SEARCH_FAILED).with_cause(cause)
    }

    pub fn not_found(code: u16) -> Self {
        Self::new(ErrorKind::NotFound, code, message::COULD_NOT_FIND)
    }

    pub fn already_exists(code: u16) -> Self {
        Self::new(ErrorKind::Conflict, code, message::ALREADY_EXISTS)
    }

    pub fn has_relationships() -> Self {
        Self::new(
            ErrorKind::Conflict,
            code::HAS_RELATIONSHIPS,
            message::HAS_RELATIONSHIPS,
        )
    }

    pub fn internal(code: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, code, message)
    }

    /// A deletion reported `actual` nodes removed where `expected` were.
    pub fn unexpected_delete_count(expected: u64, actual: u64) -> Self {
        Self::count_mismatch("nodesDeleted", expected, actual)
    }

    /// A mutation counter named `counter` did not match its expected value.
    pub fn count_mismatch(counter: &str, expected: u64, actual: u64) -> Self {
        Self::new(
            ErrorKind::CountMismatch,
            code::UNEXPECTED_DELETE_COUNT,
            message::UNEXPECTED_DELETE_COUNT,
        )
        .with_detail(counter, format!("expected: {expected}, tried: {actual}"))
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &[FieldDetail] {
        &self.details
    }

    pub fn status(&self) -> u16 {
        self.kind.status()
    }

    /// Whether the caller should see an opaque reference instead of detail.
    pub fn is_internal(&self) -> bool {
        self.status() >= 500
    }

    /// Log this error server-side and hand back the reference the caller sees.
    pub fn report(&self) -> ErrorReference {
        let reference = ErrorReference::new();
        let cause = self.cause.as_ref().map(|c| c.to_string()).unwrap_or_default();
        tracing::error!(
            code = self.code,
            kind = ?self.kind,
            reference = %reference.uuid,
            cause = %cause,
            "{}",
            self.message
        );
        reference
    }

    /// Serializable body for the transport layer.
    pub fn body(&self, reference: Option<&ErrorReference>) -> ErrorBody {
        ErrorBody {
            code: self.code,
            message: self.message.clone(),
            errors: self.details.clone(),
            reference: reference.map(ToString::to_string),
        }
    }
}

/// Opaque reference to an error logged server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReference {
    pub uuid: Uuid,
    pub date: String,
}

impl ErrorReference {
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            date: Utc::now().format("%Y-%m-%d").to_string(),
        }
    }
}

impl Default for ErrorReference {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "REF: {} DATE: {}", self.uuid, self.date)
    }
}

/// JSON shape of an error as the API boundary returns it.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
