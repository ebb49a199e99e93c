//! Error type shared by every inventory repository.

use crate::db::DbError;
use crate::model::entity::{EntityId, EntityKind, EntityValidationError};
use crate::search::SearchError;
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for inventory persistence, containment and listing.
#[derive(Debug)]
pub enum RepoError {
    /// Entity fields failed validation before any SQL ran.
    Validation(EntityValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Entity (or requested parent) does not exist.
    NotFound { kind: EntityKind, id: EntityId },
    /// Create was called with an id already in use.
    AlreadyExists { kind: EntityKind, id: EntityId },
    /// Container still holds children and cannot be deleted.
    NotEmpty { kind: EntityKind, id: EntityId },
    /// Reparenting would break the containment hierarchy.
    InvalidMove {
        kind: EntityKind,
        id: EntityId,
        reason: String,
    },
    /// A single-row write touched zero or several rows.
    UnexpectedRowCount {
        table: &'static str,
        id: EntityId,
        operation: &'static str,
        affected: usize,
    },
    /// Listing query cannot be parsed by FTS5.
    InvalidQuery { query: String, message: String },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
}

impl RepoError {
    pub fn not_found(kind: EntityKind, id: EntityId) -> Self {
        Self::NotFound { kind, id }
    }

    pub fn invalid_move(kind: EntityKind, id: EntityId, reason: impl Into<String>) -> Self {
        Self::InvalidMove {
            kind,
            id,
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::AlreadyExists { kind, id } => write!(f, "{kind} already exists: {id}"),
            Self::NotEmpty { kind, id } => write!(f, "{kind} {id} still contains entities"),
            Self::InvalidMove { kind, id, reason } => {
                write!(f, "cannot move {kind} {id}: {reason}")
            }
            Self::UnexpectedRowCount {
                table,
                id,
                operation,
                affected,
            } => write!(
                f,
                "{operation} on `{table}` for {id} affected {affected} rows, expected 1"
            ),
            Self::InvalidQuery { query, message } => {
                write!(f, "invalid list query `{query}`: {message}")
            }
            Self::InvalidData(message) => write!(f, "invalid inventory data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "inventory repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "inventory repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EntityValidationError> for RepoError {
    fn from(value: EntityValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<SearchError> for RepoError {
    fn from(value: SearchError) -> Self {
        match value {
            SearchError::InvalidQuery { query, message } => Self::InvalidQuery { query, message },
            SearchError::Db(err) => Self::Db(err),
            SearchError::InvalidData(message) => Self::InvalidData(message),
        }
    }
}

/// Fails with `UnexpectedRowCount` unless exactly one row was touched.
pub(crate) fn expect_single_row(
    affected: usize,
    table: &'static str,
    id: EntityId,
    operation: &'static str,
) -> RepoResult<()> {
    if affected == 1 {
        return Ok(());
    }
    error!(
        "event=row_count_check module=repo status=error table={table} operation={operation} affected={affected}"
    );
    Err(RepoError::UnexpectedRowCount {
        table,
        id,
        operation,
        affected,
    })
}

/// Projection row a read relied on is absent.
///
/// Reported as an `UnexpectedRowCount` on `search_rows` with zero rows.
pub(crate) fn missing_projection_row(
    kind: EntityKind,
    id: EntityId,
    operation: &'static str,
) -> RepoError {
    error!(
        "event=projection_check module=repo status=error kind={kind} operation={operation} affected=0"
    );
    RepoError::UnexpectedRowCount {
        table: "search_rows",
        id,
        operation,
        affected: 0,
    }
}
