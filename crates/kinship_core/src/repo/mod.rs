//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Write paths normalize names/labels before SQL mutations.
//! - Name uniqueness and owner existence are decided by storage constraints
//!   in the same statement as the write.
//! - Repository APIs return semantic errors (`NotFound`, `RestrictedDeletion`)
//!   in addition to DB transport errors.

use crate::db::DbError;
use crate::model::entity::ValidationError;
use crate::model::relation::Table;
use thiserror::Error;
use uuid::Uuid;

pub mod cascade;
pub mod collection_repo;
pub mod entity_repo;
pub mod parent_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every table in the entity graph.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Delete refused because a restrict relation still has rows.
    #[error("cannot delete {table} row {id}: {count} dependent {relation} exist")]
    RestrictedDeletion {
        table: Table,
        id: Uuid,
        relation: &'static str,
        count: u64,
    },
    #[error("{table} row not found: {id}")]
    NotFound { table: Table, id: Uuid },
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl RepoError {
    /// Stable machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::RestrictedDeletion { .. } => "restricted_deletion",
            Self::NotFound { .. } => "not_found",
            Self::Db(_) => "db",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}
